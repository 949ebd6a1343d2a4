//! Agri Advisor - crop recommendation and water-use advisory service
//!
//! Loads the trained models once at startup and serves predictions,
//! health probes and Prometheus metrics over HTTP.

use advisor_lib::{
    health::HealthRegistry,
    observability::{ServiceMetrics, StructuredLogger},
    ModelStore,
};
use agri_advisor::{api, config::ServiceConfig};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting agri-advisor");

    let config = ServiceConfig::load()?;
    info!(
        service_name = %config.service_name,
        artifact_dir = %config.artifact_dir.display(),
        top_k = config.top_k,
        "Service configured"
    );

    let health_registry = HealthRegistry::new();
    let metrics = ServiceMetrics::new();
    let logger = StructuredLogger::new(&config.service_name);

    // Startup fails if the artifacts are missing or invalid
    let store = match ModelStore::load(&config.artifact_dir, config.top_k) {
        Ok(store) => store,
        Err(e) => {
            logger.log_startup_failure(&e.to_string());
            return Err(e).context("Failed to load model artifacts");
        }
    };

    metrics.set_model_info(store.version(), store.crop().schema().as_str());
    logger.log_startup(SERVICE_VERSION, store.version());
    health_registry.mark_loaded(store.version()).await;

    let app_state = Arc::new(api::AppState::new(
        store,
        health_registry,
        metrics,
        logger.clone(),
    ));

    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::select! {
        result = api_handle => {
            result.context("API server task panicked")??;
        }
        _ = tokio::signal::ctrl_c() => {
            logger.log_shutdown("SIGINT received");
            info!("Shutting down");
        }
    }

    Ok(())
}
