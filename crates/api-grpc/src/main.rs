use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tonic::transport::Server;
use tonic_reflection::server::Builder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_grpc::{auth_interceptor, pb::llamaid_server::LlamaidServer, LlamaidService};
use api_shared::FILE_DESCRIPTOR_SET;
use llamaid_assistant::{AssistantConfig, OllamaAssistant};
use llamaid_core::config::{keyword_tables_from_path, overlap_policy_from_env_value};
use llamaid_core::constants::{KEYWORDS_FILE_ENV, OVERLAP_POLICY_ENV};
use llamaid_core::{CoreConfig, TextEngine};

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

    let addr: SocketAddr = std::env::var("LLAMAID_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:50051".into())
        .parse()?;

    tracing::info!("-- Starting LLaMAid gRPC on {}", addr);

    let cfg = CoreConfig::new(
        overlap_policy_from_env_value(std::env::var(OVERLAP_POLICY_ENV).ok())?,
        keyword_tables_from_path(std::env::var(KEYWORDS_FILE_ENV).ok().map(PathBuf::from))?,
    );
    let engine = Arc::new(TextEngine::new(&cfg)?);

    let assistant = OllamaAssistant::new(AssistantConfig::from_env_values(
        std::env::var("LLAMAID_ASSISTANT_URL").ok(),
        std::env::var("LLAMAID_MODEL").ok(),
        std::env::var("LLAMAID_ASSISTANT_TIMEOUT_MS").ok(),
    )?)?;

    let svc = LlamaidService::new(engine, Arc::new(assistant));
    let interceptor = auth_interceptor(std::env::var("API_KEY").ok());
    let mut server_builder =
        Server::builder().add_service(LlamaidServer::with_interceptor(svc, interceptor));

    if std::env::var("LLAMAID_ENABLE_REFLECTION").unwrap_or_else(|_| "false".to_string()) == "true"
    {
        let reflection_service = Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()?;
        server_builder = server_builder.add_service(reflection_service);
        tracing::info!("gRPC server reflection enabled");
    } else {
        tracing::info!("gRPC server reflection disabled");
    }

    server_builder.serve(addr).await?;

    Ok(())
}
