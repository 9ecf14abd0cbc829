// handlers/public/contact.rs - GET/POST /contact: public lead intake

use axum::{http::StatusCode, response::{IntoResponse, Json, Response}};
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{debug, error};

use crate::api::{Payload, RequestContext};
use crate::database::repository::contact;
use crate::error::{ApiError, ApiResult};
use crate::middleware::CsrfGuard;
use crate::validation::contact::{honeypot_tripped, ContactRequest};

const FOLLOW_UP_DAYS: i64 = 2;

/// GET /contact - CSRF token for the form
pub async fn token(ctx: RequestContext) -> Json<serde_json::Value> {
    Json(json!({ "csrf_token": ctx.session.csrf_token().await }))
}

/// POST /contact - upsert the prospect and queue a follow-up task
pub async fn submit(
    _csrf: CsrfGuard,
    ctx: RequestContext,
    payload: Payload,
) -> ApiResult<Response> {
    if honeypot_tripped(payload.map()) {
        debug!("Contact honeypot tripped from {}", ctx.client_ip);
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let request: ContactRequest = payload.into_input()?;

    let submission = request.validate().map_err(|details| ApiError::Validation {
        message: "Invalid contact data.".to_string(),
        details,
    })?;

    let due = Utc::now().date_naive() + Duration::days(FOLLOW_UP_DAYS);
    let record = contact::create(ctx.db(), &submission, due)
        .await
        .map_err(|e| {
            error!("Contact submission failed: {}", e);
            ApiError::internal_server_error("Unable to create contact.")
        })?;

    ctx.record(
        "contact_created",
        json!({
            "client_id": record.client_id,
            "task_id": record.task_id,
            "email": submission.email,
            "new_client": record.new_client,
        }),
    );

    Ok(Json(json!({ "status": "ok" })).into_response())
}
