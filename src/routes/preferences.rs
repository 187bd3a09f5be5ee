use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use super::{require_token, AppState};
use crate::{
    error::{AppError, AppResult},
    models::{PreferredGenres, PreferredGenresUpdate},
    services::session::Session,
};

/// Preferred genres plus the seconds left before they can be changed again
#[derive(Debug, Serialize)]
pub struct PreferredGenresResponse {
    #[serde(flatten)]
    pub preferences: PreferredGenres,
    pub cooldown_remaining_seconds: Option<i64>,
}

impl From<PreferredGenres> for PreferredGenresResponse {
    fn from(preferences: PreferredGenres) -> Self {
        let cooldown_remaining_seconds = preferences
            .cooldown_remaining(Utc::now())
            .map(|remaining| remaining.num_seconds());
        Self {
            preferences,
            cooldown_remaining_seconds,
        }
    }
}

/// Handler for reading the signed-in user's preferred genres
///
/// Adds `cooldown_remaining_seconds`, or `null` when the genres can be
/// changed right away.
pub async fn get_genres(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> AppResult<Json<PreferredGenresResponse>> {
    let token = require_token(&session)?;
    let preferences = state.backend.preferred_genres(token).await?;
    Ok(Json(preferences.into()))
}

/// Handler for replacing the preferred genres
///
/// Duplicate ids are dropped and more than three distinct ids is a 400. An
/// empty list clears the selection. The backend enforces the change cooldown.
pub async fn update_genres(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(update): Json<PreferredGenresUpdate>,
) -> AppResult<Json<PreferredGenresResponse>> {
    let token = require_token(&session)?;
    let genre_ids = update.normalized().map_err(AppError::InvalidInput)?;

    tracing::info!(genres = ?genre_ids, "Updating preferred genres");

    let preferences = state
        .backend
        .update_preferred_genres(token, genre_ids)
        .await?;
    Ok(Json(preferences.into()))
}
