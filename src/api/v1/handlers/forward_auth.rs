//! Forward-auth endpoint for reverse proxies.
//!
//! The proxy replays the client's headers here; the envelope is built from
//! them, so header-name casing is already normalized by `http`.

use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::middleware::http::REQUEST_ID_HEADER;
use crate::services::authz::RequestEnvelope;
use crate::services::authz::types::{HttpContext, RequestContext};
use crate::state::AppState;

pub const PRINCIPAL_HEADER: HeaderName = HeaderName::from_static("x-auth-principal-id");
const FORWARDED_URI_HEADER: &str = "x-forwarded-uri";

pub async fn forward_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let envelope = envelope_from_headers(&headers);
    let decision = state.authorizer.decide_guarded(&envelope);

    if !decision.is_authorized {
        return Err(AppError::Unauthorized);
    }

    let mut res = StatusCode::NO_CONTENT.into_response();
    if let Some(v) = decision
        .principal_id()
        .and_then(|p| HeaderValue::from_str(p).ok())
    {
        res.headers_mut().insert(PRINCIPAL_HEADER, v);
    }
    Ok(res)
}

fn envelope_from_headers(headers: &HeaderMap) -> RequestEnvelope {
    let mut map = BTreeMap::new();
    for (name, value) in headers {
        // Non-UTF-8 values are skipped; a skipped authorization header is a denial.
        if let Ok(v) = value.to_str() {
            map.entry(name.as_str().to_string())
                .or_insert_with(|| v.to_string());
        }
    }

    let text = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    RequestEnvelope {
        headers: Some(map),
        request_context: Some(RequestContext {
            request_id: text(REQUEST_ID_HEADER),
            http: Some(HttpContext {
                path: text(FORWARDED_URI_HEADER),
            }),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_keeps_first_value_and_context() {
        let mut headers = HeaderMap::new();
        headers.append("authorization", HeaderValue::from_static("first"));
        headers.append("authorization", HeaderValue::from_static("second"));
        headers.insert("x-request-id", HeaderValue::from_static("rid-1"));
        headers.insert("x-forwarded-uri", HeaderValue::from_static("/orders"));

        let env = envelope_from_headers(&headers);
        let map = env.headers.as_ref().unwrap();
        assert_eq!(map.get("authorization").map(String::as_str), Some("first"));
        assert_eq!(env.request_id(), Some("rid-1"));
        assert_eq!(env.path(), Some("/orders"));
    }

    #[test]
    fn envelope_skips_non_utf8_values() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_bytes(b"tok\xff").unwrap(),
        );
        let env = envelope_from_headers(&headers);
        assert!(env.headers.unwrap().get("authorization").is_none());
    }
}
