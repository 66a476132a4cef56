//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use quillpost_common::AppError;
use serde::Deserialize;

use crate::middleware::AppState;

/// Admin authentication via the shared bearer token.
///
/// Moderation endpoints add this extractor; a missing or wrong token is
/// rejected before the handler body runs.
#[derive(Debug, Clone)]
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        match token {
            Some(token) if token == state.admin_token.as_ref() => Ok(Self),
            _ => Err(AppError::Unauthorized),
        }
    }
}

/// Client IP, as reported by the reverse proxy.
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(client_ip(&parts.headers)))
    }
}

fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .unwrap_or("unknown")
        .to_string()
}

/// Cookie-backed opaque browser token used to deduplicate reactions.
#[derive(Debug, Clone)]
pub struct VisitorKey(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for VisitorKey {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get("x-visitor-key")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string);
        Ok(Self(key))
    }
}

/// Pagination query parameters shared by every listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub size: u64,
}

const fn default_page_size() -> u64 {
    quillpost_common::page::DEFAULT_PAGE_SIZE
}

impl PageParams {
    /// Page size clamped into the allowed range.
    #[must_use]
    pub const fn size(&self) -> u64 {
        quillpost_common::page::clamp_page_size(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers), "203.0.113.9");
    }

    #[test]
    fn test_real_ip_is_the_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.7"));
        assert_eq!(client_ip(&headers), "198.51.100.7");
    }

    #[test]
    fn test_no_headers_is_unknown() {
        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
