use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::debug;

use crate::error::AppError;

/// Header the upstream authentication layer fills in with the verified user id.
pub const OWNER_HEADER: &str = "x-user-id";

/// The resolved identity of the caller. Every store operation is scoped to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub String);

impl Owner {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let owner = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match owner {
            Some(owner) => Ok(Owner(owner.to_string())),
            None => {
                debug!("rejecting {} {}: no resolved identity", parts.method, parts.uri);
                Err(AppError::Unauthorized)
            }
        }
    }
}
