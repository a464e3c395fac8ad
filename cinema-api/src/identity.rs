use axum::extract::FromRequestParts;
use axum::http::{request::Parts, HeaderMap};
use cinema_core::UserId;
use crate::error::AppError;

/// Header carrying the caller identity resolved upstream
pub const USER_HEADER: &str = "x-user-id";

/// The acting user, taken as an opaque identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser(pub UserId);

impl ActingUser {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| ActingUser(v.to_string()))
    }
}

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
            .ok_or_else(|| AppError::AuthenticationError(format!("Missing {} header", USER_HEADER)))
    }
}
