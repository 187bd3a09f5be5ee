//! FlixReview backend abstraction
//!
//! The recommendation services only talk to the backend through `CatalogBackend`,
//! so the live HTTP client, the redis-cached decorator and test doubles are
//! interchangeable.
use crate::{
    error::AppResult,
    models::{
        Algorithm, Feed, GenreId, Movie, MovieId, Page, PersonalizedRecommendations,
        PreferredGenres, Review, SimilarMovies, TasteProfile, UserProfile,
    },
    services::session::AccessToken,
};

pub mod cached;
pub mod http;

pub use cached::CachedBackend;
pub use http::HttpBackend;

/// Ordering used when filtering movies by genre: best rated first, newest among ties
pub const GENRE_ORDERING: &str = "-avg_rating,-created_at";

/// Filters for the backend's movie listing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MovieQuery {
    pub genre_ids: Vec<GenreId>,
    pub page_size: Option<usize>,
    pub ordering: Option<String>,
}

impl MovieQuery {
    pub fn by_genres(genre_ids: Vec<GenreId>, page_size: usize) -> Self {
        Self {
            genre_ids,
            page_size: Some(page_size),
            ordering: Some(GENRE_ORDERING.to_string()),
        }
    }

    pub fn newest(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size),
            ordering: Some("-created_at".to_string()),
            ..Default::default()
        }
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.genre_ids.is_empty() {
            let ids: Vec<String> = self.genre_ids.iter().map(|id| id.to_string()).collect();
            pairs.push(("genres", ids.join(",")));
        }
        if let Some(page_size) = self.page_size {
            pairs.push(("page_size", page_size.to_string()));
        }
        if let Some(ordering) = &self.ordering {
            pairs.push(("ordering", ordering.clone()));
        }
        pairs
    }
}

/// Operations the recommendation flow needs from the backend
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Fetch one full movie record
    async fn get_movie(&self, movie_id: MovieId) -> AppResult<Movie>;

    /// Paginated movie listing with genre filter and ordering
    async fn list_movies(&self, query: &MovieQuery) -> AppResult<Page<Movie>>;

    /// Non-personalized list (top-rated, trending, ...)
    async fn feed(&self, feed: Feed, limit: usize) -> AppResult<Vec<Movie>>;

    /// Ranked suggestions for the signed-in user
    async fn personalized(
        &self,
        token: &AccessToken,
        limit: usize,
        algorithm: Algorithm,
    ) -> AppResult<PersonalizedRecommendations>;

    /// The signed-in user's manually selected genres
    async fn preferred_genres(&self, token: &AccessToken) -> AppResult<PreferredGenres>;

    /// Replace the signed-in user's preferred genres; subject to a server-side cooldown
    async fn update_preferred_genres(
        &self,
        token: &AccessToken,
        genre_ids: Vec<GenreId>,
    ) -> AppResult<PreferredGenres>;

    async fn similar_movies(&self, movie_id: MovieId, limit: usize) -> AppResult<SimilarMovies>;

    async fn taste_profile(&self, token: &AccessToken) -> AppResult<TasteProfile>;

    async fn current_user(&self, token: &AccessToken) -> AppResult<UserProfile>;

    /// Reviews written by the given user. The backend filters reviews by username.
    async fn user_reviews(&self, token: &AccessToken, username: &str) -> AppResult<Vec<Review>>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}
