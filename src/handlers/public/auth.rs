// handlers/public/auth.rs - GET/POST /auth: session status, login and logout

use axum::response::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::{Payload, RequestContext};
use crate::auth::{attempt_login, LoginOutcome};
use crate::error::{ApiError, ApiResult};
use crate::middleware::CsrfGuard;

/// GET /auth - whether the session is logged in, plus its CSRF token
pub async fn status(ctx: RequestContext) -> ApiResult<Json<Value>> {
    let authenticated = ctx.session.user_id().await.is_some();
    let csrf_token = ctx.session.csrf_token().await;

    Ok(Json(json!({
        "authenticated": authenticated,
        "csrf_token": csrf_token,
    })))
}

/**
 * POST /auth - `action` is `login` (default) or `logout`
 *
 * Login input: `{ "email": "...", "password": "..." }`
 * Unknown email and wrong password answer the same 401; a locked account
 * answers 423 until its lock expires, without counting the attempt.
 */
pub async fn submit(
    _csrf: CsrfGuard,
    ctx: RequestContext,
    payload: Payload,
) -> ApiResult<Json<Value>> {
    match payload.get_str("action").unwrap_or("login") {
        "login" => login(&ctx, &payload).await,
        "logout" => logout(&ctx).await,
        other => Err(ApiError::unprocessable(format!("Unknown action: {}", other))),
    }
}

async fn logout(ctx: &RequestContext) -> ApiResult<Json<Value>> {
    let user_id = ctx.session.user_id().await;
    ctx.session.destroy().await;
    ctx.record_as(user_id, "logout", json!({}));

    Ok(Json(json!({ "status": "logged_out" })))
}

async fn login(ctx: &RequestContext, payload: &Payload) -> ApiResult<Json<Value>> {
    let email = payload.get_str("email").unwrap_or_default();
    // Passwords are taken verbatim, surrounding spaces included
    let password = payload
        .map()
        .get("password")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::unprocessable("Missing credentials."));
    }

    let policy = ctx.state.config.security.lockout_policy();
    let outcome = attempt_login(ctx.db(), &policy, email, password, Utc::now()).await?;

    match outcome {
        LoginOutcome::Authenticated { user_id } => {
            ctx.session.authenticate(user_id).await;
            ctx.record_as(Some(user_id), "login_success", json!({ "email": email }));
            info!("User {} logged in from {}", user_id, ctx.client_ip);
            Ok(Json(json!({ "status": "authenticated" })))
        }
        LoginOutcome::UnknownEmail => {
            ctx.record_as(
                None,
                "login_failed",
                json!({ "email": email, "reason": "unknown_email", "locked": false }),
            );
            Err(ApiError::unauthorized("Invalid credentials."))
        }
        LoginOutcome::Locked { user_id, until } => {
            ctx.record_as(
                Some(user_id),
                "login_locked",
                json!({ "email": email, "locked_until": until }),
            );
            Err(ApiError::locked("Account locked. Try later."))
        }
        LoginOutcome::WrongPassword {
            user_id,
            attempts,
            locked,
        } => {
            if locked {
                warn!(
                    "Account {} locked after repeated failures from {}",
                    user_id, ctx.client_ip
                );
            }
            ctx.record_as(
                Some(user_id),
                "login_failed",
                json!({
                    "email": email,
                    "reason": "wrong_password",
                    "attempts": attempts,
                    "locked": locked,
                }),
            );
            Err(ApiError::unauthorized("Invalid credentials."))
        }
    }
}
