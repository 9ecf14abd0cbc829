use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::session::{cookie, CookieAction};

/// Resolve the session for every request and emit its cookie on the way out
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let security = &state.config.security;
    let cookie_id = cookie::get_cookie(request.headers(), &security.session_name);
    let secure = security.cookie_secure || arrived_over_tls(request.headers());

    let session = state.sessions.resolve(cookie_id.as_deref()).await;
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    let (id, action) = session.cookie_action().await;
    let value = match action {
        CookieAction::Keep => None,
        CookieAction::Set => cookie::session_cookie(&security.session_name, &id, secure),
        CookieAction::Clear => cookie::clear_cookie(&security.session_name, secure),
    };
    if let Some(value) = value {
        response.headers_mut().append(header::SET_COOKIE, value);
    }

    response
}

fn arrived_over_tls(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}
