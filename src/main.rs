use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tonic::transport::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_grpc::{LlamaidService, auth_interceptor};
use api_rest::{AppState, router};
use api_shared::FILE_DESCRIPTOR_SET;
use api_shared::pb::llamaid_server::LlamaidServer;
use llamaid_assistant::{Assistant, AssistantConfig, OllamaAssistant};
use llamaid_core::config::{keyword_tables_from_path, overlap_policy_from_env_value};
use llamaid_core::constants::{KEYWORDS_FILE_ENV, OVERLAP_POLICY_ENV};
use llamaid_core::{CoreConfig, TextEngine};

/// Main entry point for LLaMAid
///
/// Starts both gRPC and REST servers concurrently, sharing one text engine and one
/// assistant client:
/// - gRPC server on port 50051 (configurable via LLAMAID_ADDR)
/// - REST server on port 8000 (configurable via LLAMAID_REST_ADDR)
///
/// The gRPC server requires authentication via x-api-key header.
/// The REST server is open so the browser front end can call it directly.
///
/// # Environment Variables
/// - `LLAMAID_ADDR`: gRPC server address (default: "0.0.0.0:50051")
/// - `LLAMAID_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `LLAMAID_OVERLAP_POLICY`: `drop-intersecting` (default) or `leftmost-first`
/// - `LLAMAID_KEYWORDS_FILE`: Optional YAML keyword-table override
/// - `LLAMAID_ASSISTANT_URL`, `LLAMAID_MODEL`, `LLAMAID_ASSISTANT_TIMEOUT_MS`: Upstream assistant
/// - `API_KEY`: API key for gRPC authentication
/// - `LLAMAID_ENABLE_REFLECTION`: Set to `true` to expose gRPC reflection
///
/// # Returns
/// * `Ok(())` - If servers start and run successfully
/// * `Err(anyhow::Error)` - If configuration is invalid or either server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("llamaid=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let grpc_addr: SocketAddr = std::env::var("LLAMAID_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:50051".into())
        .parse()?;
    let rest_addr = std::env::var("LLAMAID_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

    tracing::info!("++ Starting LLaMAid gRPC on {}", grpc_addr);
    tracing::info!("++ Starting LLaMAid REST on {}", rest_addr);

    let cfg = CoreConfig::new(
        overlap_policy_from_env_value(std::env::var(OVERLAP_POLICY_ENV).ok())?,
        keyword_tables_from_path(std::env::var(KEYWORDS_FILE_ENV).ok().map(PathBuf::from))?,
    );
    tracing::info!("++ Overlap policy: {}", cfg.overlap_policy().as_str());
    let engine = Arc::new(TextEngine::new(&cfg)?);

    let assistant: Arc<dyn Assistant> = Arc::new(OllamaAssistant::new(
        AssistantConfig::from_env_values(
            std::env::var("LLAMAID_ASSISTANT_URL").ok(),
            std::env::var("LLAMAID_MODEL").ok(),
            std::env::var("LLAMAID_ASSISTANT_TIMEOUT_MS").ok(),
        )?,
    )?);

    // Start REST server
    let rest_app = router(AppState {
        engine: engine.clone(),
        assistant: assistant.clone(),
    });
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    let rest_server = tokio::spawn(async move { axum::serve(listener, rest_app).await });

    // Start gRPC server
    let interceptor = auth_interceptor(std::env::var("API_KEY").ok());
    let mut grpc_builder = Server::builder().add_service(LlamaidServer::with_interceptor(
        LlamaidService::new(engine, assistant),
        interceptor,
    ));
    if std::env::var("LLAMAID_ENABLE_REFLECTION").is_ok_and(|v| v == "true") {
        let reflection_service = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()?;
        grpc_builder = grpc_builder.add_service(reflection_service);
        tracing::info!("gRPC server reflection enabled");
    }
    let grpc_server = grpc_builder.serve(grpc_addr);

    // Run both
    let (rest_result, grpc_result) = tokio::join!(rest_server, grpc_server);
    rest_result??;
    grpc_result?;

    Ok(())
}
