mod analysis;
mod config;
mod errors;
mod form;
mod llm_client;
mod resume;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::pipeline::Analyzer;
use crate::config::Config;
use crate::form::controller::FormController;
use crate::llm_client::GeminiClient;
use crate::resume::encoder::PageEncoder;
use crate::resume::rasterizer::PdfiumRasterizer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS API v{}", env!("CARGO_PKG_VERSION"));

    if config.google_api_key.is_none() {
        warn!("GOOGLE_API_KEY is not set; every analysis will fail until it is configured");
    }

    // Initialize model client
    let model = GeminiClient::new(
        config.google_api_key.clone(),
        config.gemini_api_base.clone(),
        config.gemini_model.clone(),
    )?;
    info!("Model client initialized (model: {})", model.model());

    // Initialize first-page encoder (pdfium is bound per render)
    let rasterizer = PdfiumRasterizer::new(config.pdfium_library_path.clone(), config.render_dpi);
    let encoder = PageEncoder::new(Arc::new(rasterizer), config.jpeg_quality);
    info!(
        "Page encoder initialized ({} dpi, JPEG quality {})",
        config.render_dpi, config.jpeg_quality
    );

    let analyzer = Analyzer::new(encoder, Arc::new(model));
    let controller = FormController::new(
        analyzer,
        chrono::Duration::seconds(config.session_idle_timeout_secs),
    );

    // Build app state
    let state = AppState {
        controller,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
