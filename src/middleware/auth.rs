use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::ApiError;
use crate::session::Session;

/// Authenticated user context taken from the session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Session authentication middleware: rejects requests whose session has no user
pub async fn require_auth(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let session = request
        .extensions()
        .get::<Session>()
        .cloned()
        .ok_or_else(|| ApiError::internal_server_error("Session unavailable"))?;

    let user_id = session
        .user_id()
        .await
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    // Inject the user so handlers can attribute their work
    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}
