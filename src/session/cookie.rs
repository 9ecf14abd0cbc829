use axum::http::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

/// Extract cookie value by name
pub fn get_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all("cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let mut parts = cookie.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            let value = parts.next()?.trim();
            if name == cookie_name && !value.is_empty() {
                Some(value.to_string())
            } else {
                None
            }
        })
}

/// Session cookie: HttpOnly, SameSite=Strict, Path=/, optionally Secure
pub fn session_cookie(name: &str, value: &str, secure: bool) -> Option<HeaderValue> {
    build(name, value, None, secure)
}

/// Expire the cookie in the browser
pub fn clear_cookie(name: &str, secure: bool) -> Option<HeaderValue> {
    build(name, "", Some(0), secure)
}

fn build(name: &str, value: &str, max_age: Option<u64>, secure: bool) -> Option<HeaderValue> {
    let mut cookie = format!("{}={}; Path=/", name, value);

    if let Some(age) = max_age {
        cookie.push_str(&format!("; Max-Age={}", age));
    }

    cookie.push_str("; HttpOnly");

    if secure {
        cookie.push_str("; Secure");
    }

    cookie.push_str("; SameSite=Strict");

    debug!("Setting cookie: {}", name);

    HeaderValue::from_str(&cookie)
        .map_err(|e| warn!("Failed to create cookie header for {}: {}", name, e))
        .ok()
}
