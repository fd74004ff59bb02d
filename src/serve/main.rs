//! Geocoding query server.
//!
//! Loads the gazetteer once at startup and serves forward geocoding
//! over HTTP. Requests share the read-only index; no state is written
//! after initialization.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use blackthorn::config::Config;
use blackthorn::models::Tier;
use blackthorn::resolve::TokenRewrites;
use blackthorn::{gazetteer, GeocodeResult, Geocoder};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "serve")]
#[command(about = "Geocoding query server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Counties gazetteer CSV
    #[arg(long)]
    counties: PathBuf,

    /// Townlands gazetteer CSV
    #[arg(long)]
    townlands: PathBuf,

    /// Optional TOML config for thresholds and synonyms
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Application state shared across handlers
struct AppState {
    geocoder: Geocoder,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Blackthorn Query Server");

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let (index, stats) = gazetteer::load(&args.counties, &args.townlands)
        .context("Failed to load gazetteer")?;
    info!(
        "Gazetteer ready: {} counties, {} townlands ({} rows skipped)",
        index.tier_len(Tier::County),
        index.tier_len(Tier::Townland),
        stats.skipped
    );

    let mut rewrites = TokenRewrites::builtin();
    if let Some(path) = &config.synonyms_file {
        rewrites.load_from_file(path)?;
    }

    let geocoder = Geocoder::with_settings(Arc::new(index), rewrites, config.thresholds());
    let state = Arc::new(AppState { geocoder });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/geocode", get(geocode_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let index = state.geocoder.index();
    Json(HealthResponse {
        status: "ok",
        counties: index.tier_len(Tier::County),
        townlands: index.tier_len(Tier::Townland),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    counties: usize,
    townlands: usize,
}

/// Forward geocoding. Unmatched addresses come back as a normal result
/// with `tier = none`; callers branch on the tier, not on the status.
async fn geocode_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeQueryParams>,
) -> Json<GeocodeResult> {
    Json(state.geocoder.geocode(&params.address))
}

#[derive(Deserialize)]
struct GeocodeQueryParams {
    /// Free-text postal address
    address: String,
}
