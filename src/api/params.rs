use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::collections::HashMap;
use std::convert::Infallible;

use crate::database::list_query::Page;

/// Query-string parameters, leniently parsed: malformed values read as absent
#[derive(Debug, Clone, Default)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub fn from_query(query: Option<&str>) -> Self {
        let map = query
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self(map)
    }

    /// `Some` when an `id` was asked for. Unparseable ids become 0, which matches nothing.
    pub fn id(&self) -> Option<i64> {
        self.0
            .get("id")
            .map(|raw| raw.trim().parse::<i64>().unwrap_or(0))
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(|raw| raw.trim().parse::<i64>().ok())
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|raw| raw.trim())
            .filter(|raw| !raw.is_empty())
    }

    pub fn page(&self, default_limit: i64, max_limit: i64) -> Page {
        Page::resolve(self.int("limit"), self.int("offset"), default_limit, max_limit)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_query(parts.uri.query()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_filters_and_page() {
        let params = QueryParams::from_query(Some("status=active&search=Ac%20me&limit=20&offset=40"));
        assert_eq!(params.str("status"), Some("active"));
        assert_eq!(params.str("search"), Some("Ac me"));
        assert_eq!(params.page(100, 500), Page { limit: 20, offset: 40 });
        assert_eq!(params.id(), None);
    }

    #[test]
    fn page_is_clamped() {
        let params = QueryParams::from_query(Some("limit=100000&offset=-5"));
        assert_eq!(params.page(50, 500), Page { limit: 500, offset: 0 });

        let params = QueryParams::from_query(Some("limit=0"));
        assert_eq!(params.page(50, 500).limit, 1);

        let params = QueryParams::from_query(Some("limit=abc"));
        assert_eq!(params.page(50, 500).limit, 50);
    }

    #[test]
    fn malformed_id_matches_nothing() {
        assert_eq!(QueryParams::from_query(Some("id=12")).id(), Some(12));
        assert_eq!(QueryParams::from_query(Some("id=x1")).id(), Some(0));
        assert_eq!(QueryParams::from_query(None).id(), None);
    }

    #[test]
    fn blank_values_are_absent() {
        let params = QueryParams::from_query(Some("status=&search=%20"));
        assert_eq!(params.str("status"), None);
        assert_eq!(params.str("search"), None);
    }
}
