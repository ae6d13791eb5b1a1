use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use super::AppState;
use crate::models::{ConversationTurn, Role};
use crate::providers::types::{ChatRequest, ProviderError, DEFAULT_TIMEOUT};
use crate::services::prompt::{self, DEFAULT_MAX_HISTORY};
use crate::services::settings::PROXY_API_KEY_ENV;
use crate::services::ChatError;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/warriorbot",
            post(proxy_chat)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/chat",
            post(full_chat)
                .options(preflight)
                .fallback(method_not_allowed),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct ProxyChatRequest {
    pub model: Option<String>,
    pub system: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryEntry {
    pub sender: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatFlowRequest {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    pub message: Option<String>,
}

fn turns_from(history: &[HistoryEntry]) -> Vec<ConversationTurn> {
    history
        .iter()
        .map(|h| ConversationTurn::new(Role::from_sender(&h.sender), h.message.clone()))
        .collect()
}

/// Preflight response for clients whose OPTIONS request carries no Origin
/// header and therefore bypasses the CORS layer.
async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                "Content-Type, Authorization",
            ),
        ],
    )
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

/// Thin server-side proxy: assemble, call the one configured provider with
/// the server-held credential, relay the result. No canned-response tier on
/// this route; the provider's error is surfaced to the caller instead.
async fn proxy_chat(
    State(state): State<Arc<AppState>>,
    body: Option<Json<ProxyChatRequest>>,
) -> Response {
    let Some(api_key) = state.proxy_api_key.clone().filter(|k| !k.is_empty()) else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Missing {} server env var", PROXY_API_KEY_ENV) })),
        )
            .into_response();
    };

    let Json(body) = body.unwrap_or_default();
    let turns = turns_from(&body.history);
    let system = body
        .system
        .unwrap_or_else(|| state.system_prompt.clone());

    let message = body.message.unwrap_or_default();
    let prompt = match prompt::assemble(&system, &turns, &message, DEFAULT_MAX_HISTORY) {
        Ok(p) => p,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
                .into_response()
        }
    };

    let request = ChatRequest {
        api_key,
        model: body.model.unwrap_or_else(|| state.proxy_model.clone()),
        messages: prompt.messages,
        base_url: state.proxy_base_url.clone(),
        temperature: None,
        system_prompt: Some(prompt.system_prompt),
        max_tokens: None,
        timeout: DEFAULT_TIMEOUT,
    };

    match state.proxy_provider.send_message(request).await {
        Ok(response) => {
            (StatusCode::OK, Json(json!({ "reply": response.content }))).into_response()
        }
        Err(e) => provider_error_response(e),
    }
}

/// Full resilient flow: crisis check, then the fallback chain, then the
/// canned table. The caller always receives some text unless the input
/// itself was invalid.
async fn full_chat(
    State(state): State<Arc<AppState>>,
    body: Option<Json<ChatFlowRequest>>,
) -> Response {
    let Json(body) = body.unwrap_or_default();
    let turns = turns_from(&body.history);
    let message = body.message.unwrap_or_default();

    match state
        .selector
        .respond(&message, &turns, &CancellationToken::new())
        .await
    {
        Ok(reply) => (StatusCode::OK, Json(json!({ "reply": reply }))).into_response(),
        Err(ChatError::InvalidInput(msg)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
        }
        Err(ChatError::Cancelled) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Request cancelled" })),
        )
            .into_response(),
    }
}

/// The proxy relays the upstream status where it has one; everything else is
/// reported as a proxy failure without leaking internals.
fn provider_error_response(e: ProviderError) -> Response {
    match e {
        ProviderError::RequestFailed { status, message } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(json!({ "error": message }))).into_response()
        }
        ProviderError::AuthError(message) => {
            (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
        }
        ProviderError::RateLimited { .. } => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "Rate limited by upstream provider" })),
        )
            .into_response(),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Proxy failure", "details": other.to_string() })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::providers::types::ChatResponse;
    use crate::providers::ChatProvider;
    use crate::services::chat::FallbackSelector;
    use crate::services::{safety, settings};

    struct FakeProvider {
        result: Result<&'static str, u16>,
    }

    #[async_trait]
    impl ChatProvider for FakeProvider {
        async fn send_message(
            &self,
            request: ChatRequest,
        ) -> Result<ChatResponse, ProviderError> {
            match self.result {
                Ok(text) => Ok(ChatResponse {
                    content: text.to_string(),
                    model: request.model,
                    tokens_in: None,
                    tokens_out: None,
                }),
                Err(status) => Err(ProviderError::RequestFailed {
                    status,
                    message: "upstream unhappy".to_string(),
                }),
            }
        }
    }

    fn app(api_key: Option<&str>, provider: FakeProvider) -> Router {
        let state = Arc::new(AppState {
            proxy_api_key: api_key.map(String::from),
            proxy_model: "llama-3.1-8b-instant".to_string(),
            proxy_base_url: None,
            system_prompt: settings::DEFAULT_SYSTEM_PROMPT.to_string(),
            proxy_provider: Arc::new(provider),
            selector: FallbackSelector::with_candidates(
                settings::DEFAULT_SYSTEM_PROMPT,
                DEFAULT_MAX_HISTORY,
                Vec::new(),
            ),
        });
        crate::routes::router(state)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_options_is_200_even_without_credential() {
        let app = app(None, FakeProvider { result: Ok("hi") });
        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/warriorbot")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_get_is_405_with_error_body() {
        let app = app(Some("key"), FakeProvider { result: Ok("hi") });
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/warriorbot")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_missing_credential_is_500_even_without_body() {
        let app = app(None, FakeProvider { result: Ok("hi") });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/warriorbot")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Missing WARRIORBOT_API_KEY server env var");
    }

    #[tokio::test]
    async fn test_successful_proxy_round_trip() {
        let app = app(Some("key"), FakeProvider { result: Ok("hi there") });
        let response = app
            .oneshot(post_json("/api/warriorbot", r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["reply"], "hi there");
    }

    #[tokio::test]
    async fn test_proxy_accepts_history_with_foreign_senders() {
        let app = app(Some("key"), FakeProvider { result: Ok("hi there") });
        let body = r#"{
            "message": "and now?",
            "history": [
                {"sender": "user", "message": "hi"},
                {"sender": "bot", "message": "hello!"}
            ]
        }"#;
        let response = app
            .oneshot(post_json("/api/warriorbot", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_message_is_400() {
        let app = app(Some("key"), FakeProvider { result: Ok("hi") });
        let response = app
            .oneshot(post_json("/api/warriorbot", r#"{"message":"   "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn test_upstream_status_is_relayed() {
        let app = app(Some("key"), FakeProvider { result: Err(503) });
        let response = app
            .oneshot(post_json("/api/warriorbot", r#"{"message":"hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"], "upstream unhappy");
    }

    #[tokio::test]
    async fn test_full_flow_crisis_short_circuits() {
        // Provider would error; the crisis path must not care.
        let app = app(None, FakeProvider { result: Err(500) });
        let response = app
            .oneshot(post_json(
                "/api/chat",
                r#"{"message":"chest pain, can't breathe"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["reply"], safety::CRISIS_RESPONSE);
    }

    #[tokio::test]
    async fn test_full_flow_degrades_to_canned_topic() {
        let app = app(None, FakeProvider { result: Err(500) });
        let response = app
            .oneshot(post_json("/api/chat", r#"{"message":"I need encouragement"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let reply = body["reply"].as_str().unwrap();
        assert!(reply.contains("warrior"));
        assert!(!reply.contains("Pain episodes"));
    }

    #[tokio::test]
    async fn test_health_route() {
        let app = app(None, FakeProvider { result: Ok("hi") });
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
    }
}
