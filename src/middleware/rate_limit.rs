use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::client_ip::ClientIp;
use crate::error::ApiError;
use crate::security::RateLimiter;

/// Limiter plus the endpoint label its buckets are keyed under
#[derive(Clone, Debug)]
pub struct RateLimitScope {
    pub limiter: RateLimiter,
    pub label: &'static str,
}

pub async fn rate_limit(
    State(scope): State<RateLimitScope>,
    request: Request,
    next: Next,
) -> Response {
    let ip = request
        .extensions()
        .get::<ClientIp>()
        .map(|ClientIp(ip)| ip.clone())
        .unwrap_or_else(|| "0.0.0.0".to_string());

    match scope.limiter.hit(&ip, scope.label).await {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            warn!(
                "Rate limit exceeded for {} on {} (retry in {}s)",
                ip, scope.label, retry_after
            );
            ApiError::too_many_requests(retry_after).into_response()
        }
    }
}
