//! Ordered fallback strategies.
//!
//! A fallback chain is a list of strategies tried in order against a shared
//! context. Each strategy either resolves the request or hands over to the
//! next one; earlier strategies can leave data in the context for later ones.

use crate::error::{AppError, AppResult};

/// Outcome of a single strategy
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    Resolved(T),
    Next,
}

#[async_trait::async_trait]
pub trait Strategy<C, T>: Send + Sync
where
    C: Send,
    T: Send,
{
    /// Strategy name for logging
    fn name(&self) -> &'static str;

    async fn attempt(&self, ctx: &mut C) -> AppResult<Attempt<T>>;
}

/// Runs `strategies` in order and returns the first resolved value.
///
/// Errors from every strategy except the last are logged and treated as
/// `Attempt::Next`. The last strategy's error is returned to the caller.
pub async fn first_successful<C, T>(
    ctx: &mut C,
    strategies: &[Box<dyn Strategy<C, T>>],
) -> AppResult<T>
where
    C: Send,
    T: Send,
{
    let Some((last, fallbacks)) = strategies.split_last() else {
        return Err(AppError::Internal("No fallback strategies configured".to_string()));
    };

    for strategy in fallbacks {
        match strategy.attempt(ctx).await {
            Ok(Attempt::Resolved(value)) => {
                tracing::debug!(strategy = strategy.name(), "Strategy resolved");
                return Ok(value);
            }
            Ok(Attempt::Next) => {
                tracing::debug!(strategy = strategy.name(), "Strategy deferred to next");
            }
            Err(e) => {
                tracing::warn!(strategy = strategy.name(), error = %e, "Strategy failed, falling back");
            }
        }
    }

    match last.attempt(ctx).await? {
        Attempt::Resolved(value) => {
            tracing::debug!(strategy = last.name(), "Strategy resolved");
            Ok(value)
        }
        Attempt::Next => Err(AppError::Internal(format!(
            "Final strategy '{}' did not resolve",
            last.name()
        ))),
    }
}
