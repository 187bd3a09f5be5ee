use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{require_token, AppState, DEFAULT_LIST_LIMIT};
use crate::{
    error::AppResult,
    models::{Algorithm, Movie, MovieId, RecommendationResult, TasteProfile},
    services::{
        featured::{FeaturedPick, ThreadRandom},
        recommendations::{PersonalizedMovies, ShowcaseRequest},
        session::Session,
    },
};

#[derive(Debug, Deserialize)]
pub struct ShowcaseQuery {
    limit: Option<usize>,
    #[serde(default)]
    force_genre_based: bool,
}

#[derive(Debug, Deserialize)]
pub struct ForYouQuery {
    limit: Option<usize>,
    algorithm: Option<Algorithm>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<usize>,
}

/// Handler for the recommendations showcase
///
/// Resolves movies through the personalized → genre-based → top-rated chain.
/// Anonymous callers are allowed and always get top-rated. The response's
/// `mode` field tells which step produced the movies.
pub async fn showcase(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(params): Query<ShowcaseQuery>,
) -> AppResult<Json<RecommendationResult>> {
    let request = ShowcaseRequest::new(params.limit.unwrap_or(state.showcase_limit))
        .force_genre_based(params.force_genre_based);

    let result = state.resolver.resolve(&session, &request).await?;
    Ok(Json(result))
}

/// Handler for the featured (hero) movie
///
/// Draws one movie from the newest movies. Signed-in callers get a draw
/// weighted by their review history and preferred genres; `movie` is `null`
/// only when the backend has no movies.
pub async fn featured(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> AppResult<Json<FeaturedPick>> {
    let pick = state.featured.pick(&session, &mut ThreadRandom).await?;
    Ok(Json(pick))
}

/// Handler for the signed-in user's personalized recommendations
///
/// No fallback here: anonymous callers get 401 and backend failures are
/// returned as-is. Items that fail to load are left out of `movies`.
pub async fn for_you(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(params): Query<ForYouQuery>,
) -> AppResult<Json<PersonalizedMovies>> {
    let recommendations = state
        .resolver
        .personalized(
            &session,
            params.limit.unwrap_or(DEFAULT_LIST_LIMIT),
            params.algorithm,
        )
        .await?;
    Ok(Json(recommendations))
}

/// Handler for movies similar to `movie_id`
///
/// Public; results are hydrated to full movie records in similarity order.
pub async fn similar(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<MovieId>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let movies = state
        .resolver
        .similar(movie_id, params.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .await?;
    Ok(Json(movies))
}

/// Handler for the signed-in user's taste profile
///
/// Passed through from the backend unchanged; 401 for anonymous callers.
pub async fn taste_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> AppResult<Json<TasteProfile>> {
    let token = require_token(&session)?;
    let profile = state.backend.taste_profile(token).await?;
    Ok(Json(profile))
}
