use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::services::session::Session;

/// Builds the caller's session from the `Authorization` header.
///
/// Never rejects: a missing or malformed header is an anonymous session, and
/// handlers that need a signed-in user check for a token themselves.
#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        Ok(Session::from_authorization(header))
    }
}
