use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::validation::validate_session_key;

pub const SESSION_HEADER: &str = "x-session-id";

/// Identifies the anonymous shopper whose cart a request touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartKey(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CartKey
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .ok_or_else(|| AppError::BadRequest(format!("{} header is required", SESSION_HEADER)))?
            .to_str()
            .map_err(|_| AppError::BadRequest(format!("{} header is not valid text", SESSION_HEADER)))?
            .trim();

        validate_session_key(raw)?;
        Ok(CartKey(raw.to_string()))
    }
}
