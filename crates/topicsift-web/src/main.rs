use std::net::SocketAddr;
use std::sync::Arc;

use topicsift_core::{LlmConfig, OpenAiChat, TopicExtractor, config_file};
use topicsift_web::{AppState, router};

const DEFAULT_PORT: u16 = 5001;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let file = config_file::load_config();
    let llm = resolve_llm_config(file.llm_config());
    if llm.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; requests to the model will likely fail");
    }
    tracing::info!(?llm, "model backend configured");

    let backend = Arc::new(OpenAiChat::new(&llm)?);
    let extractor = TopicExtractor::new(backend, file.extraction_settings());
    let state = Arc::new(AppState::new(extractor));

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

/// Environment variables override the config file.
fn resolve_llm_config(file: LlmConfig) -> LlmConfig {
    LlmConfig {
        api_key: std::env::var("OPENAI_API_KEY").ok().or(file.api_key),
        base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(file.base_url),
        model: std::env::var("TOPICSIFT_MODEL").unwrap_or(file.model),
        timeout_secs: std::env::var("TOPICSIFT_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(file.timeout_secs),
    }
}
