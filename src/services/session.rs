use serde::{Deserialize, Serialize};
use std::fmt;

/// Bearer token forwarded to the backend
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep tokens out of logs
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// What the recommendation services need to know about the caller.
///
/// The caller's identity beyond the token (username, id) lives in the
/// backend and is fetched through `CatalogBackend::current_user` when needed.
pub trait SessionContext: Send + Sync {
    fn access_token(&self) -> Option<&AccessToken>;

    fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }
}

/// Per-request session built from the `Authorization` header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<AccessToken>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn bearer(token: AccessToken) -> Self {
        Self { token: Some(token) }
    }

    /// Parses an `Authorization` header value. Anything but a non-empty bearer
    /// token yields an anonymous session.
    pub fn from_authorization(header: Option<&str>) -> Self {
        header
            .and_then(|value| {
                let (scheme, token) = value.trim().split_once(' ')?;
                if !scheme.eq_ignore_ascii_case("bearer") {
                    return None;
                }
                let token = token.trim();
                (!token.is_empty()).then(|| AccessToken::new(token))
            })
            .map(Session::bearer)
            .unwrap_or_default()
    }
}

impl SessionContext for Session {
    fn access_token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }
}
