//! Showcase recommendation resolution.
//!
//! Resolves the movies shown in the recommendations showcase by walking an
//! ordered fallback chain:
//!
//! 1. personalized recommendations from the backend ranking engine,
//! 2. movies filtered by the user's preferred genres,
//! 3. the global top-rated list.
//!
//! Only a top-rated failure reaches the caller; every earlier failure is
//! logged and replaced by the next step.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{
        Algorithm, Feed, GenreId, Movie, MovieId, PreferredGenreSummary, RecommendationItem,
        RecommendationResult,
    },
    services::{
        backend::{CatalogBackend, MovieQuery},
        fallback::{first_successful, Attempt, Strategy},
        session::{AccessToken, SessionContext},
    },
};

/// Genre-filtered movies below this average rating are dropped
pub const MIN_GENRE_RATING: f64 = 3.5;

/// Largest result size the backend will serve
pub const MAX_LIMIT: usize = 50;

/// Genre-filtered fetches ask for this many times the requested size to survive the rating floor
const GENRE_OVERFETCH_FACTOR: usize = 2;

/// What the showcase asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowcaseRequest {
    pub limit: usize,
    pub personalized: bool,
    pub force_genre_based: bool,
}

impl ShowcaseRequest {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: clamp_limit(limit),
            personalized: true,
            force_genre_based: false,
        }
    }

    pub fn personalized(mut self, personalized: bool) -> Self {
        self.personalized = personalized;
        self
    }

    pub fn force_genre_based(mut self, force: bool) -> Self {
        self.force_genre_based = force;
        self
    }
}

pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_LIMIT)
}

/// State shared by the strategies of one resolution
pub struct ResolutionContext {
    backend: Arc<dyn CatalogBackend>,
    token: Option<AccessToken>,
    limit: usize,
    genre_ids: Vec<GenreId>,
    genres: Vec<PreferredGenreSummary>,
}

impl ResolutionContext {
    pub fn new(backend: Arc<dyn CatalogBackend>, token: Option<AccessToken>, limit: usize) -> Self {
        Self {
            backend,
            token,
            limit,
            genre_ids: Vec::new(),
            genres: Vec::new(),
        }
    }

    pub fn genre_ids(&self) -> &[GenreId] {
        &self.genre_ids
    }

    fn carry_genres(&mut self, genre_ids: Vec<GenreId>, genres: Vec<PreferredGenreSummary>) {
        self.genre_ids = genre_ids;
        self.genres = genres;
    }

    /// Loads the user's stored preferred genres into the context
    async fn load_stored_genres(&mut self, token: &AccessToken) -> AppResult<()> {
        let prefs = self.backend.preferred_genres(token).await?;
        let ids = prefs.genre_ids();
        self.carry_genres(ids, prefs.preferred_genres);
        Ok(())
    }

    /// Like `load_stored_genres`, but a failure just leaves the context empty
    async fn try_load_stored_genres(&mut self, token: &AccessToken) {
        if let Err(e) = self.load_stored_genres(token).await {
            tracing::warn!(error = %e, "Stored preferred genres unavailable");
        }
    }
}

type ShowcaseStrategy = Box<dyn Strategy<ResolutionContext, RecommendationResult>>;

/// Step 1: the backend ranking engine
pub struct PersonalizedStrategy {
    algorithm: Algorithm,
}

impl PersonalizedStrategy {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }
}

#[async_trait::async_trait]
impl Strategy<ResolutionContext, RecommendationResult> for PersonalizedStrategy {
    fn name(&self) -> &'static str {
        "personalized"
    }

    async fn attempt(
        &self,
        ctx: &mut ResolutionContext,
    ) -> AppResult<Attempt<RecommendationResult>> {
        let Some(token) = ctx.token.clone() else {
            return Ok(Attempt::Next);
        };

        let response = match ctx
            .backend
            .personalized(&token, ctx.limit, self.algorithm)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Personalized recommendations failed");
                ctx.try_load_stored_genres(&token).await;
                return Ok(Attempt::Next);
            }
        };

        let mut movies = hydrate(ctx.backend.as_ref(), &response.recommendations).await;
        movies.truncate(ctx.limit);

        if !movies.is_empty() {
            let genres_used = if response.preferences_applied {
                response.preferred_genres
            } else {
                Vec::new()
            };
            return Ok(Attempt::Resolved(RecommendationResult::Personalized {
                movies,
                genres_used,
                algorithm: response.algorithm,
            }));
        }

        if response.preferred_genre_ids.is_empty() {
            ctx.try_load_stored_genres(&token).await;
        } else {
            ctx.carry_genres(response.preferred_genre_ids, response.preferred_genres);
        }

        Ok(Attempt::Next)
    }
}

/// Where the genre-based step gets its genre ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreSource {
    /// Ids left in the context by the personalized step
    Carried,
    /// The user's stored preferred genres
    Stored,
}

/// Step 2: best-rated movies in the user's genres
pub struct GenreBasedStrategy {
    source: GenreSource,
}

impl GenreBasedStrategy {
    pub fn new(source: GenreSource) -> Self {
        Self { source }
    }
}

#[async_trait::async_trait]
impl Strategy<ResolutionContext, RecommendationResult> for GenreBasedStrategy {
    fn name(&self) -> &'static str {
        "genre-based"
    }

    async fn attempt(
        &self,
        ctx: &mut ResolutionContext,
    ) -> AppResult<Attempt<RecommendationResult>> {
        if self.source == GenreSource::Stored {
            if let Some(token) = ctx.token.clone() {
                ctx.load_stored_genres(&token).await?;
            }
        }

        if ctx.genre_ids.is_empty() {
            return Ok(Attempt::Next);
        }

        let query = MovieQuery::by_genres(ctx.genre_ids.clone(), ctx.limit * GENRE_OVERFETCH_FACTOR);
        let page = ctx.backend.list_movies(&query).await?;
        let movies = apply_rating_floor(page.results, MIN_GENRE_RATING, ctx.limit);

        // A successful fetch always resolves here, even when the floor leaves nothing
        if movies.is_empty() {
            tracing::info!(genres = ?ctx.genre_ids, "No genre matches above the rating floor");
        }

        Ok(Attempt::Resolved(RecommendationResult::GenreBased {
            movies,
            genre_ids: ctx.genre_ids.clone(),
            genres_used: ctx.genres.clone(),
        }))
    }
}

/// Step 3: the global top-rated list
pub struct TopRatedStrategy;

#[async_trait::async_trait]
impl Strategy<ResolutionContext, RecommendationResult> for TopRatedStrategy {
    fn name(&self) -> &'static str {
        "top-rated"
    }

    async fn attempt(
        &self,
        ctx: &mut ResolutionContext,
    ) -> AppResult<Attempt<RecommendationResult>> {
        let mut movies = ctx.backend.feed(Feed::TopRated, ctx.limit).await?;
        movies.truncate(ctx.limit);
        Ok(Attempt::Resolved(RecommendationResult::TopRated { movies }))
    }
}

/// Keeps movies rated at least `min_rating`, in fetched order, up to `limit`
pub fn apply_rating_floor(movies: Vec<Movie>, min_rating: f64, limit: usize) -> Vec<Movie> {
    movies
        .into_iter()
        .filter(|movie| movie.avg_rating >= min_rating)
        .take(limit)
        .collect()
}

/// Re-fetches full movie records for recommendation items, in item order.
/// Items that fail to load are logged and dropped.
pub async fn hydrate(backend: &dyn CatalogBackend, items: &[RecommendationItem]) -> Vec<Movie> {
    let mut movies = Vec::with_capacity(items.len());

    for item in items {
        let Some(movie_id) = item.target_id() else {
            tracing::debug!(title = ?item.title, "Skipping recommendation without a movie id");
            continue;
        };

        match backend.get_movie(movie_id).await {
            Ok(movie) => movies.push(movie),
            Err(e) => {
                tracing::warn!(movie_id, error = %e, "Dropping recommendation that failed to load");
            }
        }
    }

    movies
}

/// Hydrated personalized recommendations
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PersonalizedMovies {
    pub movies: Vec<Movie>,
    pub algorithm: Option<String>,
    pub cached: bool,
    pub ml_enabled: bool,
    pub preferences_applied: bool,
    pub preferred_genres: Vec<PreferredGenreSummary>,
    pub preferred_genre_ids: Vec<GenreId>,
}

/// Resolves showcase movies and the other recommendation lists
#[derive(Clone)]
pub struct RecommendationResolver {
    backend: Arc<dyn CatalogBackend>,
    algorithm: Algorithm,
}

impl RecommendationResolver {
    pub fn new(backend: Arc<dyn CatalogBackend>, algorithm: Algorithm) -> Self {
        Self { backend, algorithm }
    }

    /// Strategy chain for a request, in the order it will run
    pub fn plan<S>(&self, session: &S, request: &ShowcaseRequest) -> Vec<ShowcaseStrategy>
    where
        S: SessionContext + ?Sized,
    {
        let mut strategies: Vec<ShowcaseStrategy> = Vec::with_capacity(3);

        if session.is_authenticated() {
            if request.force_genre_based {
                strategies.push(Box::new(GenreBasedStrategy::new(GenreSource::Stored)));
            } else if request.personalized {
                strategies.push(Box::new(PersonalizedStrategy::new(self.algorithm)));
                strategies.push(Box::new(GenreBasedStrategy::new(GenreSource::Carried)));
            }
        }

        strategies.push(Box::new(TopRatedStrategy));
        strategies
    }

    /// Walks the fallback chain. Fails only when the top-rated list cannot be loaded.
    pub async fn resolve<S>(
        &self,
        session: &S,
        request: &ShowcaseRequest,
    ) -> AppResult<RecommendationResult>
    where
        S: SessionContext + ?Sized,
    {
        let limit = clamp_limit(request.limit);
        let strategies = self.plan(session, request);
        let mut ctx = ResolutionContext::new(
            self.backend.clone(),
            session.access_token().cloned(),
            limit,
        );

        let result = first_successful(&mut ctx, &strategies)
            .await
            .map_err(|e| AppError::RecommendationsUnavailable(e.to_string()))?;

        tracing::info!(
            mode = result.mode(),
            movies = result.movies().len(),
            limit,
            "Showcase resolved"
        );

        Ok(result)
    }

    /// Personalized recommendations without fallback; requires a signed-in session
    pub async fn personalized<S>(
        &self,
        session: &S,
        limit: usize,
        algorithm: Option<Algorithm>,
    ) -> AppResult<PersonalizedMovies>
    where
        S: SessionContext + ?Sized,
    {
        let token = session
            .access_token()
            .ok_or_else(|| AppError::Unauthorized("Sign in to see recommendations".to_string()))?;
        let algorithm = algorithm.unwrap_or(self.algorithm);

        let response = self
            .backend
            .personalized(token, clamp_limit(limit), algorithm)
            .await?;
        let movies = hydrate(self.backend.as_ref(), &response.recommendations).await;

        Ok(PersonalizedMovies {
            movies,
            algorithm: response.algorithm,
            cached: response.cached,
            ml_enabled: response.ml_enabled,
            preferences_applied: response.preferences_applied,
            preferred_genres: response.preferred_genres,
            preferred_genre_ids: response.preferred_genre_ids,
        })
    }

    /// Movies similar to `movie_id`, hydrated
    pub async fn similar(&self, movie_id: MovieId, limit: usize) -> AppResult<Vec<Movie>> {
        let similar = self
            .backend
            .similar_movies(movie_id, clamp_limit(limit))
            .await?;
        Ok(hydrate(self.backend.as_ref(), &similar.similar_movies).await)
    }
}
