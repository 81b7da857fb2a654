pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::generation::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::handle_index))
        .route("/health", get(health::health_handler))
        .route("/api/v1/status", get(handlers::handle_status))
        .route("/api/v1/models", get(handlers::handle_models))
        .route("/api/v1/generate", post(handlers::handle_generate))
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::generation::orchestrator::{
        HF_TOKEN_ENV, NOT_READY_FIELD, NOT_READY_MESSAGE, TOKEN_REQUIRED_MESSAGE,
    };
    use crate::llm_client::testing::StubChatModel;
    use crate::llm_client::DecodingParams;
    use crate::prompt::composer::TemplatePair;
    use crate::prompt::template::Template;
    use crate::prompt::{BoundPipeline, PipelineStatus};

    fn uninitialized_state(llm: Arc<StubChatModel>) -> AppState {
        AppState {
            pipeline: None,
            pipeline_status: PipelineStatus {
                ready: false,
                message: "Initialization error: missing templates".to_string(),
            },
            llm,
            decoding: DecodingParams::default(),
        }
    }

    fn ready_state(llm: Arc<StubChatModel>) -> AppState {
        let templates = TemplatePair {
            system: Template::parse("Speeches:\n{examples}").unwrap(),
            user: Template::parse("{topic}|{event}|{requirements}").unwrap(),
        };
        AppState {
            pipeline: Some(Arc::new(BoundPipeline::new(templates, "EX".to_string()))),
            pipeline_status: PipelineStatus {
                ready: true,
                message: "System initialized successfully".to_string(),
            },
            llm,
            decoding: DecodingParams::default(),
        }
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let router = build_router(uninitialized_state(Arc::new(StubChatModel::replying("x"))));
        let (status, body) = send(router, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "orator");
    }

    #[tokio::test]
    async fn test_status_reports_initialization_result() {
        let router = build_router(uninitialized_state(Arc::new(StubChatModel::replying("x"))));
        let (status, body) = send(router, get_request("/api/v1/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ready"], false);
        assert_eq!(body["message"], "Initialization error: missing templates");
    }

    #[tokio::test]
    async fn test_models_lists_supported_ids() {
        let router = build_router(uninitialized_state(Arc::new(StubChatModel::replying("x"))));
        let (_, body) = send(router, get_request("/api/v1/models")).await;
        assert_eq!(body["default"], "Qwen/Qwen2.5-72B-Instruct");
        assert_eq!(body["models"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_generate_without_pipeline_returns_not_ready_triple() {
        let llm = Arc::new(StubChatModel::replying("x"));
        let router = build_router(uninitialized_state(llm.clone()));
        let body = json!({"topic": "T", "event": "E", "requirements": "R"}).to_string();

        let (status, body) = send(router, post_json("/api/v1/generate", &body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "system_prompt": NOT_READY_MESSAGE,
                "user_prompt": NOT_READY_FIELD,
                "result": NOT_READY_FIELD
            })
        );
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_generate_reads_credential_from_environment() {
        std::env::remove_var(HF_TOKEN_ENV);
        let llm = Arc::new(StubChatModel::replying("x"));
        let router = build_router(ready_state(llm.clone()));
        let body = json!({"topic": "T", "event": "E", "requirements": "R"}).to_string();

        let (status, body) = send(router, post_json("/api/v1/generate", &body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "system_prompt": "Speeches:\nEX",
                "user_prompt": "T|E|R",
                "result": TOKEN_REQUIRED_MESSAGE
            })
        );
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_index_renders_reply_as_markdown() {
        let router = build_router(uninitialized_state(Arc::new(StubChatModel::replying("x"))));
        let response = router.oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(r#"<div id="result" class="markdown">"#));
        assert!(html.contains("marked.parse(markdown)"));
        assert!(html.contains("DOMPurify.sanitize"));
    }

    #[tokio::test]
    async fn test_generate_rejects_unknown_model() {
        let router = build_router(uninitialized_state(Arc::new(StubChatModel::replying("x"))));
        let body = json!({
            "model": "not-a-model",
            "topic": "T",
            "event": "E",
            "requirements": "R"
        })
        .to_string();

        let (status, body) = send(router, post_json("/api/v1/generate", &body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let router = build_router(uninitialized_state(Arc::new(StubChatModel::replying("x"))));
        let (status, body) = send(router, get_request("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
