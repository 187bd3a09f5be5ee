//! Redis read-through cache in front of another backend
//!
//! Only anonymous list reads are cached. Movie records, personalized results
//! and anything user-scoped always go to the wrapped backend.
use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    models::{
        Algorithm, Feed, GenreId, Movie, MovieId, Page, PersonalizedRecommendations,
        PreferredGenres, Review, SimilarMovies, TasteProfile, UserProfile,
    },
    services::{
        backend::{CatalogBackend, MovieQuery},
        session::AccessToken,
    },
};

const FEED_CACHE_TTL: u64 = 300; // 5 minutes
const SIMILAR_CACHE_TTL: u64 = 1800; // 30 minutes

pub struct CachedBackend {
    inner: Arc<dyn CatalogBackend>,
    cache: Cache,
}

impl CachedBackend {
    pub fn new(inner: Arc<dyn CatalogBackend>, cache: Cache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait::async_trait]
impl CatalogBackend for CachedBackend {
    async fn get_movie(&self, movie_id: MovieId) -> AppResult<Movie> {
        self.inner.get_movie(movie_id).await
    }

    async fn list_movies(&self, query: &MovieQuery) -> AppResult<Page<Movie>> {
        self.inner.list_movies(query).await
    }

    async fn feed(&self, feed: Feed, limit: usize) -> AppResult<Vec<Movie>> {
        cached!(
            self.cache,
            CacheKey::Feed(feed, limit),
            FEED_CACHE_TTL,
            async move { self.inner.feed(feed, limit).await }
        )
    }

    async fn personalized(
        &self,
        token: &AccessToken,
        limit: usize,
        algorithm: Algorithm,
    ) -> AppResult<PersonalizedRecommendations> {
        self.inner.personalized(token, limit, algorithm).await
    }

    async fn preferred_genres(&self, token: &AccessToken) -> AppResult<PreferredGenres> {
        self.inner.preferred_genres(token).await
    }

    async fn update_preferred_genres(
        &self,
        token: &AccessToken,
        genre_ids: Vec<GenreId>,
    ) -> AppResult<PreferredGenres> {
        self.inner.update_preferred_genres(token, genre_ids).await
    }

    async fn similar_movies(&self, movie_id: MovieId, limit: usize) -> AppResult<SimilarMovies> {
        cached!(
            self.cache,
            CacheKey::SimilarMovies(movie_id, limit),
            SIMILAR_CACHE_TTL,
            async move { self.inner.similar_movies(movie_id, limit).await }
        )
    }

    async fn taste_profile(&self, token: &AccessToken) -> AppResult<TasteProfile> {
        self.inner.taste_profile(token).await
    }

    async fn current_user(&self, token: &AccessToken) -> AppResult<UserProfile> {
        self.inner.current_user(token).await
    }

    async fn user_reviews(&self, token: &AccessToken, username: &str) -> AppResult<Vec<Review>> {
        self.inner.user_reviews(token, username).await
    }

    fn name(&self) -> &'static str {
        "cached"
    }
}
