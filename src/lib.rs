//! Recommendation gateway for the FlixReview movie review platform.
//!
//! Sits between the FlixReview frontend and its backend API and decides what
//! to show: the recommendations showcase (with its personalized, genre-based
//! and top-rated fallbacks), the featured movie, and the pass-through
//! recommendation, feed and preference endpoints.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use routes::{create_router, AppState};
