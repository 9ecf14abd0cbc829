use async_trait::async_trait;
use axum::{
    body::to_bytes,
    extract::{FromRequest, Request},
    http::header,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Request body as a JSON object. Accepts `application/json` and
/// `application/x-www-form-urlencoded`; an empty body is an empty object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(pub Map<String, Value>);

impl Payload {
    pub fn parse(content_type: Option<&str>, body: &[u8]) -> Result<Self, ApiError> {
        let is_form = content_type
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        if is_form {
            let map = url::form_urlencoded::parse(body)
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect();
            return Ok(Self(map));
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Err(ApiError::unprocessable("Request body must be a JSON object")),
            Err(_) => Err(ApiError::unprocessable("Invalid JSON body")),
        }
    }

    pub fn map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Deserialize into a typed input; wrong JSON types are rejected here
    pub fn into_input<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| ApiError::unprocessable(format!("Invalid payload: {}", e)))
    }

    /// Trimmed string field; blank reads as absent
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Positive `id` from the body, as a number or a numeric string
    pub fn require_id(&self, label: &str) -> Result<i64, ApiError> {
        let id = match self.0.get("id") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        id.filter(|id| *id > 0)
            .ok_or_else(|| ApiError::unprocessable(format!("{} ID is required", label)))
    }
}

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let content_type = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);

        let body = to_bytes(request.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|_| ApiError::unprocessable("Unable to read request body"))?;

        Self::parse(content_type.as_deref(), &body)
    }
}
