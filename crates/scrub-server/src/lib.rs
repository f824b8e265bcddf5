pub mod auth;
pub mod error;
pub mod server;

pub use server::{AppState, ScrubServer, router};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use scrub_config::ServerConfig;
    use scrub_connectors::{ConnectorRegistry, MemoryConnector};
    use scrub_core::{CoreError, Detection, PiiDetector, Strategy};
    use scrub_detect::PatternDetector;
    use scrub_engine::{RedactionPipeline, TicketRedactor};
    use scrub_security::RedactionEngine;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct BrokenDetector;

    #[async_trait]
    impl PiiDetector for BrokenDetector {
        fn name(&self) -> &str {
            "broken"
        }

        async fn detect(&self, _text: &str) -> scrub_core::Result<Detection> {
            Err(CoreError::DetectionFailure("model unavailable".to_string()))
        }
    }

    fn test_config() -> ServerConfig {
        ServerConfig {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    fn test_app(detector: Arc<dyn PiiDetector>, config: &ServerConfig) -> axum::Router {
        let registry = ConnectorRegistry::new()
            .with(Arc::new(MemoryConnector::with_fixtures()))
            .unwrap();
        let pipeline = RedactionPipeline::new(
            registry,
            TicketRedactor::new(detector, RedactionEngine::new()),
            Strategy::Mask,
        );
        router(Arc::new(pipeline), config)
    }

    fn post(uri: &str, key: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(key) = key {
            builder = builder.header(auth::API_KEY_HEADER, key);
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = test_app(Arc::new(PatternDetector::new()), &test_config());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_or_wrong_key_is_forbidden() {
        let config = test_config();

        for key in [None, Some("wrong")] {
            let app = test_app(Arc::new(PatternDetector::new()), &config);
            let response = app
                .oneshot(post("/ticket-redaction/demo/101", key, None))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            assert_eq!(
                json_body(response).await["error"],
                "Could not validate API key"
            );
        }
    }

    #[tokio::test]
    async fn test_no_configured_key_refuses_everything() {
        let app = test_app(Arc::new(PatternDetector::new()), &ServerConfig::default());

        let response = app
            .oneshot(post("/ticket-redaction/demo/101", Some(""), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_blank_configured_key_refuses_blank_header() {
        let config = ServerConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        let app = test_app(Arc::new(PatternDetector::new()), &config);

        let response = app
            .oneshot(post("/ticket-redaction/demo/101", Some(""), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_redact_ticket() {
        let app = test_app(Arc::new(PatternDetector::new()), &test_config());

        let response = app
            .oneshot(post(
                "/ticket-redaction/demo/101?strategy=tokenize",
                Some("test-key"),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["ticket_id"], "101");
        assert_eq!(json["source"], "demo");
        let interactions = json["interactions"].as_array().unwrap();
        assert_eq!(interactions.len(), 2);
        assert!(
            interactions[0]["body"]
                .as_str()
                .unwrap()
                .contains("{{email:")
        );
        assert_eq!(interactions[0]["entities"][0]["label"], "email");
    }

    #[tokio::test]
    async fn test_redact_ticket_errors() {
        let config = test_config();
        let cases = [
            ("/ticket-redaction/jira/1", StatusCode::NOT_FOUND),
            ("/ticket-redaction/salesforce/1", StatusCode::NOT_FOUND),
            ("/ticket-redaction/demo/999", StatusCode::INTERNAL_SERVER_ERROR),
            (
                "/ticket-redaction/demo/101?strategy=rot13",
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (uri, status) in cases {
            let app = test_app(Arc::new(PatternDetector::new()), &config);
            let response = app.oneshot(post(uri, Some("test-key"), None)).await.unwrap();
            assert_eq!(response.status(), status, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_partial_failure_shortens_interactions() {
        let app = test_app(Arc::new(BrokenDetector), &test_config());

        let response = app
            .oneshot(post("/ticket-redaction/demo/105", Some("test-key"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert!(json["interactions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_redact_text() {
        let app = test_app(Arc::new(PatternDetector::new()), &test_config());

        let response = app
            .oneshot(post(
                "/redact",
                Some("test-key"),
                Some(serde_json::json!({"text": "mail a@b.com", "strategy": "tokenize"})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["body"], "mail {{email:1022b0c3}}");
        assert_eq!(
            json["entities"],
            serde_json::json!([{"start": 5, "end": 12, "label": "email"}])
        );
    }

    #[tokio::test]
    async fn test_redact_text_detection_failure_is_500() {
        let app = test_app(Arc::new(BrokenDetector), &test_config());

        let response = app
            .oneshot(post(
                "/redact",
                Some("test-key"),
                Some(serde_json::json!({"text": "anything"})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert!(json["error"].as_str().unwrap().contains("model unavailable"));
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let app = test_app(Arc::new(PatternDetector::new()), &test_config());

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/redact")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:3000"
        );
    }
}
