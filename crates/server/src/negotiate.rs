//! Content negotiation and request-derived URL details.
//!
//! A client wants JSON when its `Accept` header mentions
//! `application/json` or the query carries `json=true`. Everything else
//! gets the raw file.

use crate::state::ServerState;
use axum::extract::{FromRequestParts, Query};
use axum::http::header::{ACCEPT, HOST};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Uri};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

/// Query key that forces a JSON response.
pub const JSON_QUERY_KEY: &str = "json";

/// Query key that switches the random image to a transparent one.
pub const TRANSPARENT_QUERY_KEY: &str = "transparent";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Binary,
    Json,
}

impl Format {
    pub fn from_request(headers: &HeaderMap, query: &HashMap<String, String>) -> Self {
        let accepts_json = headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.to_ascii_lowercase().contains("application/json"));

        if accepts_json || flag(query, JSON_QUERY_KEY) {
            Format::Json
        } else {
            Format::Binary
        }
    }

    pub fn is_json(self) -> bool {
        self == Format::Json
    }
}

/// Query pairs of a request URI; an unparsable query reads as empty.
pub fn query_map(uri: &Uri) -> HashMap<String, String> {
    Query::<HashMap<String, String>>::try_from_uri(uri)
        .map(|Query(q)| q)
        .unwrap_or_default()
}

/// `key=true` (case-insensitive) in the query string.
pub fn flag(query: &HashMap<String, String>, key: &str) -> bool {
    query
        .get(key)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// `<scheme>://<host>` for building canonical links.
///
/// Uses the configured public URL when set, otherwise `X-Forwarded-Proto`
/// and `Host`, otherwise `fallback`.
pub fn base_url(headers: &HeaderMap, public_url: Option<&str>, fallback: &str) -> String {
    if let Some(url) = public_url {
        return url.trim_end_matches('/').to_string();
    }

    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(HOST))
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty());

    match host {
        Some(host) => {
            let scheme = headers
                .get("x-forwarded-proto")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("http");
            format!("{scheme}://{host}")
        }
        None => fallback.to_string(),
    }
}

/// Per-request client preferences, extracted once per handler.
#[derive(Debug, Clone)]
pub struct ClientPrefs {
    pub format: Format,
    pub base_url: String,
    pub query: HashMap<String, String>,
}

impl ClientPrefs {
    pub fn flag(&self, key: &str) -> bool {
        flag(&self.query, key)
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

impl FromRequestParts<Arc<ServerState>> for ClientPrefs {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ServerState>,
    ) -> Result<Self, Self::Rejection> {
        let query = query_map(&parts.uri);

        let format = Format::from_request(&parts.headers, &query);
        let base_url = base_url(
            &parts.headers,
            state.config.public_url.as_deref(),
            &state.config.fallback_base_url(),
        );

        Ok(Self {
            format,
            base_url,
            query,
        })
    }
}
