pub mod chat;
pub mod health;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::providers::ChatProvider;
use crate::services::chat::FallbackSelector;

pub struct AppState {
    /// Credential for the proxy route, read from the server environment.
    /// `None` means the route answers 500 until the operator configures it.
    pub proxy_api_key: Option<String>,
    pub proxy_model: String,
    pub proxy_base_url: Option<String>,
    pub system_prompt: String,
    pub proxy_provider: Arc<dyn ChatProvider>,
    pub selector: FallbackSelector,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .merge(chat::router())
        .merge(health::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
