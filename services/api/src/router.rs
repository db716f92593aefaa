//! Axum Router Configuration
//!
//! HTTP routing for the bot's message endpoint, the operator endpoints and
//! the OpenAPI documentation.

use crate::{
    handlers,
    models::{
        CommandName, ErrorResponse, HealthResponse, InboundMessagePayload, InputPayload,
        OptionPayload, ReplyPayload, WordView,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::post_message,
        handlers::list_user_words,
        handlers::health,
    ),
    components(
        schemas(InboundMessagePayload, InputPayload, CommandName, ReplyPayload, OptionPayload, WordView, HealthResponse, ErrorResponse)
    ),
    tags(
        (name = "Vocabot API", description = "Conversation endpoint of the vocabulary drill bot")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/messages", post(handlers::post_message))
        .route("/users/{external_id}/words", get(handlers::list_user_words))
        .route("/health", get(handlers::health))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, StoreBackend};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use vocabot_core::seed::COMMON_WORDS;
    use vocabot_core::{InMemoryStore, Settings, VocabularyStore};

    async fn app() -> Router {
        let store = Arc::new(InMemoryStore::new());
        store.seed_common_words(COMMON_WORDS).await.unwrap();
        let config = Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            store_backend: StoreBackend::Memory,
            database_url: None,
            db_max_connections: 1,
            log_level: tracing::Level::INFO,
            settings: Settings::default(),
        };
        create_router(Arc::new(AppState::new(store, config)))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn post_message(app: &Router, input: Value) -> (StatusCode, Value) {
        let body = json!({"external_id": 77, "display_name": "alice", "input": input});
        let request = Request::post("/messages")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    #[tokio::test]
    async fn test_health() {
        let app = app().await;
        let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_conversation_over_http() {
        let app = app().await;

        let (status, reply) = post_message(&app, json!({"type": "text", "text": "/start"})).await;
        assert_eq!(status, StatusCode::OK);
        assert!(reply["text"].as_str().unwrap().starts_with("Hi, alice!"));
        assert_eq!(reply["options"].as_array().unwrap().len(), 4);

        post_message(&app, json!({"type": "command", "name": "add_word"})).await;
        post_message(&app, json!({"type": "text", "text": "стол"})).await;
        let (_, reply) = post_message(&app, json!({"type": "text", "text": "table"})).await;
        assert!(reply["text"].as_str().unwrap().contains("11 words"));

        let request = Request::get("/users/77/words").body(Body::empty()).unwrap();
        let (status, words) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let words = words.as_array().unwrap();
        assert_eq!(words.len(), 11);
        assert_eq!(words[10]["target_term"], "table");
    }

    #[tokio::test]
    async fn test_deletion_option_round_trips() {
        let app = app().await;
        post_message(&app, json!({"type": "text", "text": "/start"})).await;

        let (_, reply) = post_message(&app, json!({"type": "command", "name": "delete_word"})).await;
        let first = reply["options"][0]["input"].clone();
        assert_eq!(first["type"], "select_word");

        let (_, reply) = post_message(&app, first).await;
        assert_eq!(reply["text"], "✅ The word was deleted!");
    }

    #[tokio::test]
    async fn test_unknown_user_words_is_not_found() {
        let app = app().await;
        let request = Request::get("/users/5/words").body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_malformed_message_is_rejected() {
        let app = app().await;
        let request = Request::post("/messages")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"external_id": "abc"}"#))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_overlong_display_name_is_bad_request() {
        let app = app().await;
        let body = json!({
            "external_id": 1,
            "display_name": "x".repeat(300),
            "input": {"type": "text", "text": "/start"}
        });
        let request = Request::post("/messages")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_openapi_lists_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/messages"));
        assert!(paths.iter().any(|p| p.as_str() == "/users/{external_id}/words"));
    }
}
