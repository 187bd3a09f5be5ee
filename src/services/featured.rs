//! Featured movie selection.
//!
//! Picks the hero movie for the landing page. Anonymous callers (or callers
//! with no genre signal) get a uniform pick; otherwise each movie's chance
//! grows with how well its genres match the caller's preference map.

use rand::Rng;
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Movie, PreferredGenreSummary, Review},
    services::{
        backend::{CatalogBackend, MovieQuery},
        genre_preferences::GenrePreferenceMap,
        session::{AccessToken, SessionContext},
    },
};

/// Every movie keeps at least this weight so none is ever unreachable
pub const BASE_WEIGHT: f64 = 0.1;

/// Multiplier applied to a movie's summed genre preference
pub const PREFERENCE_MULTIPLIER: f64 = 2.0;

/// Source of uniform draws in [0, 1)
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// Thread-local RNG backed source
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Selection weight for each movie, in input order
pub fn selection_weights(movies: &[Movie], preferences: &GenrePreferenceMap) -> Vec<f64> {
    movies
        .iter()
        .map(|movie| BASE_WEIGHT + PREFERENCE_MULTIPLIER * preferences.affinity(movie))
        .collect()
}

/// Picks one movie. `None` only when `movies` is empty.
pub fn select_featured<'a, R>(
    movies: &'a [Movie],
    preferences: &GenrePreferenceMap,
    authenticated: bool,
    rng: &mut R,
) -> Option<&'a Movie>
where
    R: RandomSource + ?Sized,
{
    if movies.is_empty() {
        return None;
    }

    if !authenticated || preferences.is_empty() {
        let index = (rng.next_unit() * movies.len() as f64) as usize;
        return movies.get(index.min(movies.len() - 1));
    }

    let weights = selection_weights(movies, preferences);
    let total: f64 = weights.iter().sum();
    let draw = rng.next_unit();

    let mut cumulative = 0.0;
    for (movie, weight) in movies.iter().zip(&weights) {
        cumulative += weight / total;
        if cumulative >= draw {
            return Some(movie);
        }
    }

    // Rounding left the last cumulative value just under the draw
    movies.first()
}

/// Result of a featured pick
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeaturedPick {
    pub movie: Option<Movie>,
    /// Whether genre preferences shaped the draw
    pub personalized: bool,
    pub preferences: GenrePreferenceMap,
}

/// Loads candidates and the caller's genre signal, then draws the featured movie
#[derive(Clone)]
pub struct FeaturedPicker {
    backend: Arc<dyn CatalogBackend>,
    pool_size: usize,
}

impl FeaturedPicker {
    pub fn new(backend: Arc<dyn CatalogBackend>, pool_size: usize) -> Self {
        Self {
            backend,
            pool_size: pool_size.max(1),
        }
    }

    pub async fn pick<S, R>(&self, session: &S, rng: &mut R) -> AppResult<FeaturedPick>
    where
        S: SessionContext + ?Sized,
        R: RandomSource + Send + ?Sized,
    {
        let candidates = self
            .backend
            .list_movies(&MovieQuery::newest(self.pool_size))
            .await?
            .results;

        let preferences = match session.access_token() {
            Some(token) => self.load_preferences(token).await,
            None => GenrePreferenceMap::default(),
        };

        let authenticated = session.is_authenticated();
        let movie = select_featured(&candidates, &preferences, authenticated, rng).cloned();

        tracing::info!(
            candidates = candidates.len(),
            preference_genres = preferences.len(),
            movie_id = ?movie.as_ref().map(|m| m.id),
            "Featured movie selected"
        );

        Ok(FeaturedPick {
            movie,
            personalized: authenticated && !preferences.is_empty(),
            preferences,
        })
    }

    /// Missing review history or preferred genres only weaken the signal
    async fn load_preferences(&self, token: &AccessToken) -> GenrePreferenceMap {
        let reviews = self.load_reviews(token).await;

        let preferred: Vec<PreferredGenreSummary> =
            match self.backend.preferred_genres(token).await {
                Ok(prefs) => prefs.preferred_genres,
                Err(e) => {
                    tracing::warn!(error = %e, "Preferred genres unavailable for featured pick");
                    Vec::new()
                }
            };

        GenrePreferenceMap::build(&reviews, &preferred)
    }

    /// Review history of the signed-in user, looked up by username
    async fn load_reviews(&self, token: &AccessToken) -> Vec<Review> {
        let profile = match self.backend.current_user(token).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, "Could not resolve current user for featured pick");
                return Vec::new();
            }
        };

        match self.backend.user_reviews(token, &profile.username).await {
            Ok(reviews) => reviews,
            Err(e) => {
                tracing::warn!(
                    user_id = profile.id,
                    username = %profile.username,
                    error = %e,
                    "Review history unavailable for featured pick"
                );
                Vec::new()
            }
        }
    }
}
