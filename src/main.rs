//! NeuroPilot API server

use neuropilot::api::{create_router, AppState, ChatGateway};
use neuropilot::config::AppConfig;
use neuropilot::llm::ModelRegistry;
use neuropilot::tools::ToolRegistry;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neuropilot=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env()?;

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;

    let llm_registry = Arc::new(ModelRegistry::new(&config.llm, &http));
    tracing::info!(
        models = ?llm_registry.available_model_info().iter().map(|m| m.id).collect::<Vec<_>>(),
        default = %llm_registry.default_model_id(),
        "LLM registry initialized"
    );

    let mut gateway = ChatGateway::new(
        llm_registry,
        config.generation_settings(),
        config.pipeline_cache,
    );
    if config.enable_tools {
        let tools = ToolRegistry::from_config(&config.search, &http);
        tracing::info!(
            tools = ?tools.specs(),
            max_rounds = config.max_tool_rounds,
            "Tool calling enabled"
        );
        gateway = gateway.with_tools(tools, config.max_tool_rounds);
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new().gzip(true).br(true);

    let app = create_router(AppState::new(gateway))
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("NeuroPilot server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
