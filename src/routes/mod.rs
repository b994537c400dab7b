//! Router assembly: question endpoint, profile endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - `POST /api/generate-question` (the path the frontend already calls)
/// - REST-ish profile API under `/api/v1/profiles`
/// - CORS (allow any origin/method/headers); adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/generate-question", post(http::http_generate_question))
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/profiles", post(http::http_register_profile))
        .route(
            "/api/v1/profiles/:id",
            get(http::http_get_profile).put(http::http_put_profile),
        )
        .route("/api/v1/profiles/:id/progress", post(http::http_post_progress))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::profile::InMemoryProfileStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(
            &AgentConfig::default(),
            None,
            Arc::new(InMemoryProfileStore::new()),
            CancellationToken::new(),
        );
        build_router(Arc::new(state))
    }

    async fn send(app: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }

    #[tokio::test]
    async fn health_reports_remote_disabled() {
        let (status, body) = send(app(), "GET", "/api/v1/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["remote"], false);
    }

    #[tokio::test]
    async fn single_question_shape() {
        let (status, body) = send(
            app(),
            "POST",
            "/api/generate-question",
            r#"{"subject":"Mathematics","difficulty":4,"gameType":"math-quest","grade":5,"count":1}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["options"].as_array().unwrap().len(), 4);
        assert_eq!(body["difficulty"], 4);
        let correct = body["correct"].clone();
        assert!(body["options"].as_array().unwrap().contains(&correct));
    }

    #[tokio::test]
    async fn batch_shape() {
        let (status, body) = send(
            app(),
            "POST",
            "/api/generate-question",
            r#"{"subject":"Science","difficulty":2,"count":3,"previousQuestions":["How many legs does a spider have?"]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["questions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn word_builder_shape() {
        let (status, body) = send(
            app(),
            "POST",
            "/api/generate-question",
            r#"{"subject":"English","difficulty":10,"gameType":"word-builder","grade":8}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let word = body["word"].as_str().unwrap();
        let mut a: Vec<char> = word.chars().collect();
        let mut b: Vec<char> = body["scrambled"].as_str().unwrap().chars().collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
        assert!(body["hint"].as_str().unwrap().ends_with(&format!("{} letters", word.len())));
    }

    #[tokio::test]
    async fn malformed_body_is_an_error_with_fallback() {
        let (status, body) = send(app(), "POST", "/api/generate-question", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));
        assert_eq!(body["fallback"]["difficulty"], 1);
        assert_eq!(body["fallback"]["options"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn profile_lifecycle() {
        let app = app();
        let (status, created) = send(
            app.clone(),
            "POST",
            "/api/v1/profiles",
            r#"{"name":"Ada","email":"ada@example.com","grade":7}"#,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["level"], 1);

        let (status, updated) = send(
            app.clone(),
            "POST",
            &format!("/api/v1/profiles/{id}/progress"),
            r#"{"xpGained":260,"lessonId":"photosynthesis","subject":"Science"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["level"], 2);
        assert_eq!(updated["currentSubject"], "Science");

        let (status, fetched) = send(app.clone(), "GET", &format!("/api/v1/profiles/{id}"), "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["xp"], 260);
        assert_eq!(fetched["completedLessons"][0], "photosynthesis");
    }

    #[tokio::test]
    async fn unknown_profile_is_404() {
        let (status, body) = send(app(), "GET", "/api/v1/profiles/nobody", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("nobody"));
    }

    #[tokio::test]
    async fn put_with_mismatched_id_is_rejected() {
        let body = r#"{"id":"b","name":"Bo","email":"bo@example.com","grade":3}"#;
        let (status, _) = send(app(), "PUT", "/api/v1/profiles/a", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
