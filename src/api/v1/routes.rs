/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /authorize (gateway callback), /forward-auth (reverse proxy 用)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{authorize::authorize, forward_auth::forward_auth, health::health};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/authorize", post(authorize))
        .route("/forward-auth", get(forward_auth))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::api::v1::handlers::forward_auth::PRINCIPAL_HEADER;
    use crate::services::authz::{
        AcceptedCredentials, Authorizer, SuccessContext, ValidationMode,
    };

    fn app() -> Router {
        let authorizer = Authorizer::new(
            AcceptedCredentials::new(["test-token"]),
            ValidationMode::Allowlist,
            SuccessContext::default(),
        );
        routes().with_state(AppState::new(Arc::new(authorizer)))
    }

    async fn post_authorize(body: impl Into<Body>) -> (StatusCode, Value) {
        let res = app()
            .oneshot(
                Request::post("/authorize")
                    .header("content-type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_validation_mode() {
        let res = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let v: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v, json!({"status": "ok", "validation": "allowlist"}));
    }

    #[tokio::test]
    async fn authorize_allows_bearer_token() {
        let body = json!({
            "headers": {"authorization": "Bearer test-token"},
            "requestContext": {"requestId": "r1", "http": {"path": "/x"}}
        });
        let (status, v) = post_authorize(body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["isAuthorized"], json!(true));
        assert_eq!(v["context"]["principalId"], json!("user"));
    }

    #[tokio::test]
    async fn authorize_denies_without_context() {
        let (status, v) = post_authorize(json!({"headers": {}}).to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v, json!({"isAuthorized": false}));
    }

    #[tokio::test]
    async fn authorize_denies_malformed_body_with_200() {
        for body in ["", "{", r#"{"headers": 7}"#, "[]"] {
            let (status, v) = post_authorize(body).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(v, json!({"isAuthorized": false}));
        }
    }

    #[tokio::test]
    async fn forward_auth_allows_and_sets_principal() {
        let res = app()
            .oneshot(
                Request::get("/forward-auth")
                    .header("Authorization", "Bearer test-token")
                    .header("x-forwarded-uri", "/orders")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(res.headers().get(PRINCIPAL_HEADER).unwrap(), "user");
    }

    #[tokio::test]
    async fn forward_auth_rejects_lowercase_bearer() {
        let res = app()
            .oneshot(
                Request::get("/forward-auth")
                    .header("authorization", "bearer test-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let v: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["error"]["code"], json!("UNAUTHORIZED"));
    }

    #[tokio::test]
    async fn forward_auth_rejects_missing_header() {
        let res = app()
            .oneshot(Request::get("/forward-auth").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().get(PRINCIPAL_HEADER).is_none());
    }
}
