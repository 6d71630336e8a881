mod config;
mod errors;
mod inference;
mod models;
mod pipeline;
mod routes;
mod scrape;
mod state;
mod trace;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::inference::InferenceClient;
use crate::pipeline::parser::MarkerConfig;
use crate::pipeline::runner::Pipeline;
use crate::routes::build_router;
use crate::scrape::ScrapeClient;
use crate::state::AppState;
use crate::trace::TraceRecorder;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on any missing provider secret)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let crate_name = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{crate_name}={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobScout API v{}", env!("CARGO_PKG_VERSION"));

    // Provider clients — constructed once, shared read-only by every request
    let scrape = ScrapeClient::new(
        config.scraper_api_key.clone(),
        config.scraper_base_url.clone(),
        config.request_timeout,
    );
    info!("Scrape client initialized ({})", config.scraper_base_url);

    let inference = InferenceClient::new(
        config.inference_api_key.clone(),
        config.inference_model_url.clone(),
        config.prompt_char_budget,
        config.request_timeout,
    );
    info!("Inference client initialized");

    let tracer = TraceRecorder::new(
        config.trace_api_key.clone(),
        config.trace_base_url.clone(),
        config.request_timeout,
    );
    info!("Trace recorder initialized");

    let pipeline = Pipeline::new(
        Arc::new(scrape),
        Arc::new(inference),
        Arc::new(tracer),
        config.prompt_char_budget,
        MarkerConfig::default(),
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
