use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{AppState, DEFAULT_LIST_LIMIT};
use crate::{
    error::{AppError, AppResult},
    models::{Feed, Movie},
    services::recommendations::clamp_limit,
};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    limit: Option<usize>,
}

/// Handler for the public movie feeds (top-rated, trending, most-reviewed, recent)
pub async fn feed(
    State(state): State<Arc<AppState>>,
    Path(feed): Path<String>,
    Query(params): Query<FeedQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let feed: Feed = feed.parse().map_err(AppError::NotFound)?;
    let limit = clamp_limit(params.limit.unwrap_or(DEFAULT_LIST_LIMIT));

    let mut movies = state.backend.feed(feed, limit).await?;
    movies.truncate(limit);
    Ok(Json(movies))
}
