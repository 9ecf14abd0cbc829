use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::error::ApiError;
use crate::session::Session;

pub const CSRF_HEADER: &str = "x-csrf-token";

/// Extractor guarding mutating handlers with the double-submit check.
/// Handlers take it as their first argument so the check runs before the body is read.
#[derive(Debug, Clone, Copy)]
pub struct CsrfGuard;

#[async_trait]
impl<S> FromRequestParts<S> for CsrfGuard
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| ApiError::internal_server_error("Session unavailable"))?;

        let supplied = parts
            .headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok());

        if session.verify_csrf(supplied).await {
            Ok(CsrfGuard)
        } else {
            warn!("CSRF validation failed for {} {}", parts.method, parts.uri.path());
            Err(ApiError::forbidden("Invalid CSRF token."))
        }
    }
}
