//! Genre preference weights.
//!
//! Combines two signals into one genre name → weight map:
//! - how often each genre shows up in the user's review history, and
//! - the genres the user pinned manually, weighted by rank.
//!
//! The map is rebuilt on every request and never stored.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::models::{Movie, PreferredGenreSummary, Review};

/// Manual weight floor. Unreachable while users are capped at three preferred
/// genres; kept so a higher cap degrades gracefully.
const MANUAL_WEIGHT_FLOOR_TENTHS: usize = 6;

/// Weight of the preferred genre at `rank` (0-indexed): 1.0, 0.8, 0.6, then 0.6 onwards
pub fn manual_weight(rank: usize) -> f64 {
    // Tenths keep the decay exact: 1.0 - 0.2 * rank
    let tenths = 10usize
        .saturating_sub(2 * rank)
        .max(MANUAL_WEIGHT_FLOOR_TENTHS);
    tenths as f64 / 10.0
}

/// Genre name → preference weight in [0, 1]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GenrePreferenceMap {
    weights: HashMap<String, f64>,
}

impl GenrePreferenceMap {
    /// Share of reviews touching each genre. A movie listing a genre twice counts once.
    pub fn from_reviews(reviews: &[Review]) -> Self {
        if reviews.is_empty() {
            return Self::default();
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for review in reviews {
            let genres: HashSet<&str> = review.movie.genre_names().collect();
            for genre in genres {
                *counts.entry(genre).or_insert(0) += 1;
            }
        }

        let total = reviews.len() as f64;
        let weights = counts
            .into_iter()
            .map(|(genre, count)| (genre.to_string(), count as f64 / total))
            .collect();

        Self { weights }
    }

    /// Rank-decayed weights for manually chosen genres, in selection order
    pub fn from_preferred<S: AsRef<str>>(genres: &[S]) -> Self {
        let mut weights = HashMap::with_capacity(genres.len());
        for (rank, genre) in genres.iter().enumerate() {
            weights
                .entry(genre.as_ref().to_string())
                .or_insert_with(|| manual_weight(rank));
        }
        Self { weights }
    }

    /// Starts from `self` and overwrites every genre present in `overrides`
    pub fn merged_with(mut self, overrides: GenrePreferenceMap) -> Self {
        self.weights.extend(overrides.weights);
        self
    }

    /// Review history merged with preferred genres; manual weights win
    pub fn build(reviews: &[Review], preferred: &[PreferredGenreSummary]) -> Self {
        let names: Vec<&str> = preferred.iter().map(|g| g.name.as_str()).collect();
        Self::from_reviews(reviews).merged_with(Self::from_preferred(&names))
    }

    pub fn weight(&self, genre: &str) -> Option<f64> {
        self.weights.get(genre).copied()
    }

    /// Sum of weights over the movie's genres that appear in the map
    pub fn affinity(&self, movie: &Movie) -> f64 {
        movie.genre_names().filter_map(|g| self.weight(g)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(genre, weight)| (genre.as_str(), *weight))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for GenrePreferenceMap {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            weights: iter
                .into_iter()
                .map(|(genre, weight)| (genre.into(), weight.max(0.0)))
                .collect(),
        }
    }
}
