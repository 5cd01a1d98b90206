pub mod api;
pub mod classify;
pub mod config;
pub mod db;
pub mod error;
pub mod lexicon;
pub mod ml;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod text;
pub mod worker;
pub mod youtube;

use std::sync::Arc;

use config::{AppConfig, BackendKind};
use ml::{NlpBackend, SidecarBackend};

/// Builds the inference backend selected by the configuration.
pub fn build_backend(config: &AppConfig) -> anyhow::Result<Arc<dyn NlpBackend>> {
    Ok(match config.backend {
        BackendKind::Sidecar => Arc::new(SidecarBackend::new(config.ml_service_url.clone())?),
        BackendKind::Lexicon => Arc::new(lexicon::LexiconBackend::new()),
    })
}

/// Installs the `tracing` subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
