mod config;
mod errors;
mod generation;
mod llm_client;
mod prompt;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::HfChatClient;
use crate::prompt::PipelineStatus;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Orator v{}", env!("CARGO_PKG_VERSION"));

    // Load templates and examples once; a failure is kept as status, not fatal.
    let (pipeline, pipeline_status) = PipelineStatus::initialize(&config.prompt_dir);
    if pipeline_status.ready {
        info!("Server status: {}", pipeline_status.message);
    } else {
        warn!("Server status: {}", pipeline_status.message);
    }

    let llm = HfChatClient::new(
        &config.hf_api_base,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    info!(
        "Inference client initialized (endpoint: {}, timeout: {}s)",
        config.hf_api_base, config.request_timeout_secs
    );

    let state = AppState {
        pipeline,
        pipeline_status,
        llm: Arc::new(llm),
        decoding: config.decoding,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
