use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde_json::Value;
use sqlx::PgPool;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{AuthUser, ClientIp};
use crate::session::Session;

/// Explicit per-request context: shared state, the caller's session,
/// their address and, behind `require_auth`, the logged-in user.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub state: AppState,
    pub session: Session,
    pub client_ip: String,
    pub user: Option<AuthUser>,
}

impl RequestContext {
    pub fn db(&self) -> &PgPool {
        &self.state.db
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.map(|u| u.user_id)
    }

    /// Append to the activity log without waiting on the write
    pub fn record(&self, action: &str, context: Value) {
        self.state
            .activity
            .record(self.user_id(), &self.client_ip, action, context);
    }

    pub fn record_as(&self, user_id: Option<i64>, action: &str, context: Value) {
        self.state
            .activity
            .record(user_id, &self.client_ip, action, context);
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| ApiError::internal_server_error("Session unavailable"))?;

        let client_ip = parts
            .extensions
            .get::<ClientIp>()
            .map(|ClientIp(ip)| ip.clone())
            .unwrap_or_else(|| "0.0.0.0".to_string());

        Ok(Self {
            state: state.clone(),
            session,
            client_ip,
            user: parts.extensions.get::<AuthUser>().copied(),
        })
    }
}
