mod models;
mod providers;
mod routes;
mod services;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use models::ProviderKind;
use providers::openai::OpenAiProvider;
use routes::AppState;
use services::chat::FallbackSelector;
use services::settings::{AppSettings, PROXY_API_KEY_ENV};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = AppSettings::load();
    let selector = FallbackSelector::from_configs(
        settings.system_prompt.clone(),
        settings.max_history,
        &settings.providers,
    );
    tracing::info!(
        candidates = selector.candidate_count(),
        "fallback chain configured"
    );

    let proxy_api_key = std::env::var(PROXY_API_KEY_ENV).ok();
    if proxy_api_key.is_none() {
        tracing::warn!(
            "{} is not set; /api/warriorbot will answer 500 until it is",
            PROXY_API_KEY_ENV
        );
    }

    let state = Arc::new(AppState {
        proxy_api_key,
        proxy_model: ProviderKind::Groq.default_model().to_string(),
        proxy_base_url: Some(ProviderKind::Groq.default_base_url().to_string()),
        system_prompt: settings.system_prompt,
        proxy_provider: Arc::new(OpenAiProvider::new()),
        selector,
    });

    let app = routes::router(state);

    let bind = std::env::var("WARRIORBOT_BIND").unwrap_or_else(|_| "0.0.0.0:8787".to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(%bind, "warriorbot listening");
    axum::serve(listener, app).await?;

    Ok(())
}
