use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{GenreId, Movie, MovieId, PreferredGenreSummary};

/// Ranking algorithm requested from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Hybrid,
    Collaborative,
    Content,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Hybrid => "hybrid",
            Algorithm::Collaborative => "collaborative",
            Algorithm::Content => "content",
        }
    }
}

/// A ranked suggestion. Carries only display fields; the full movie must be
/// fetched separately.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RecommendationItem {
    #[serde(default)]
    pub movie_id: Option<MovieId>,
    /// Some endpoints (similar movies) use `id` instead of `movie_id`
    #[serde(default)]
    pub id: Option<MovieId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub avg_rating: Option<f64>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub similarity_score: Option<f64>,
    #[serde(default)]
    pub predicted_rating: Option<f64>,
    #[serde(default)]
    pub hybrid_score: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
}

impl RecommendationItem {
    pub fn for_movie(movie_id: MovieId) -> Self {
        Self {
            movie_id: Some(movie_id),
            ..Default::default()
        }
    }

    pub fn target_id(&self) -> Option<MovieId> {
        self.movie_id.or(self.id)
    }
}

/// Response of the backend's personalized recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PersonalizedRecommendations {
    #[serde(default)]
    pub recommendations: Vec<RecommendationItem>,
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub ml_enabled: bool,
    #[serde(default)]
    pub preferences_applied: bool,
    #[serde(default)]
    pub preferred_genre_ids: Vec<GenreId>,
    #[serde(default)]
    pub preferred_genres: Vec<PreferredGenreSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SourceMovie {
    pub id: MovieId,
    pub title: String,
}

/// Response of the backend's similar movies endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SimilarMovies {
    #[serde(default)]
    pub source_movie: Option<SourceMovie>,
    #[serde(default)]
    pub similar_movies: Vec<RecommendationItem>,
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub ml_enabled: bool,
}

/// Outcome of the showcase resolution; the variant records which fallback step produced it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum RecommendationResult {
    Personalized {
        movies: Vec<Movie>,
        genres_used: Vec<PreferredGenreSummary>,
        algorithm: Option<String>,
    },
    GenreBased {
        movies: Vec<Movie>,
        genre_ids: Vec<GenreId>,
        genres_used: Vec<PreferredGenreSummary>,
    },
    TopRated {
        movies: Vec<Movie>,
    },
}

impl RecommendationResult {
    pub fn movies(&self) -> &[Movie] {
        match self {
            RecommendationResult::Personalized { movies, .. }
            | RecommendationResult::GenreBased { movies, .. }
            | RecommendationResult::TopRated { movies } => movies,
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            RecommendationResult::Personalized { .. } => "personalized",
            RecommendationResult::GenreBased { .. } => "genre-based",
            RecommendationResult::TopRated { .. } => "top-rated",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteGenre {
    pub genre: String,
    #[serde(default)]
    pub avg_rating: f64,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteDecade {
    pub decade: String,
    #[serde(default)]
    pub count: u32,
}

/// Server-computed summary of a user's review history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TasteProfile {
    #[serde(default)]
    pub total_reviews: u32,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub rating_distribution: BTreeMap<String, u32>,
    #[serde(default)]
    pub favorite_genres: Vec<FavoriteGenre>,
    #[serde(default)]
    pub favorite_decades: Vec<FavoriteDecade>,
    #[serde(default)]
    pub most_lenient: bool,
}
