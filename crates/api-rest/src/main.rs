//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! This binary is what the browser front end talks to (`POST /ask`, `/annotate`, `/classify`).
//! The workspace's main `llamaid-run` binary runs both gRPC and REST concurrently.

use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use llamaid_assistant::{AssistantConfig, OllamaAssistant};
use llamaid_core::config::{keyword_tables_from_path, overlap_policy_from_env_value};
use llamaid_core::constants::{KEYWORDS_FILE_ENV, OVERLAP_POLICY_ENV};
use llamaid_core::{CoreConfig, TextEngine};

/// Main entry point for the LLaMAid REST API server
///
/// # Environment Variables
/// - `LLAMAID_REST_ADDR`: Server address (default: "0.0.0.0:8000")
/// - `LLAMAID_OVERLAP_POLICY`: `drop-intersecting` (default) or `leftmost-first`
/// - `LLAMAID_KEYWORDS_FILE`: Optional YAML keyword-table override
/// - `LLAMAID_ASSISTANT_URL`, `LLAMAID_MODEL`, `LLAMAID_ASSISTANT_TIMEOUT_MS`: Upstream assistant
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the core or assistant configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("LLAMAID_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

    tracing::info!("-- Starting LLaMAid REST API on {}", addr);

    let cfg = CoreConfig::new(
        overlap_policy_from_env_value(std::env::var(OVERLAP_POLICY_ENV).ok())?,
        keyword_tables_from_path(std::env::var(KEYWORDS_FILE_ENV).ok().map(PathBuf::from))?,
    );

    let assistant = OllamaAssistant::new(AssistantConfig::from_env_values(
        std::env::var("LLAMAID_ASSISTANT_URL").ok(),
        std::env::var("LLAMAID_MODEL").ok(),
        std::env::var("LLAMAID_ASSISTANT_TIMEOUT_MS").ok(),
    )?)?;
    tracing::info!(
        "-- Assistant: {} via {}",
        assistant.config().model,
        assistant.config().url
    );

    let state = AppState {
        engine: Arc::new(TextEngine::new(&cfg)?),
        assistant: Arc::new(assistant),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
