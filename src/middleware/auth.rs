use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Bearer key guarding the `/admin` routes.
#[derive(Clone)]
pub struct AdminKey(pub Arc<str>);

impl AdminKey {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    /// Compares MACs of both keys so the check runs in constant time and
    /// does not leak the key length.
    fn matches(&self, presented: &str) -> bool {
        let expected = self.0.as_bytes();
        if expected.is_empty() {
            return false;
        }
        let Ok(mut reference) = HmacSha256::new_from_slice(expected) else {
            return false;
        };
        reference.update(expected);
        let tag = reference.finalize().into_bytes();

        let Ok(mut mac) = HmacSha256::new_from_slice(expected) else {
            return false;
        };
        mac.update(presented.as_bytes());
        mac.verify_slice(&tag).is_ok()
    }
}

pub async fn admin_auth(State(key): State<AdminKey>, req: Request, next: Next) -> Response {
    let presented = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);

    match presented {
        Some(token) if key.matches(token) => next.run(req).await,
        _ => {
            tracing::warn!(path = %req.uri().path(), "Rejected admin request");
            AppError::Unauthorized("missing or invalid admin key".to_string()).into_response()
        }
    }
}
