use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use common::{Config, HistoryProvider};
use engine::{Predictor, PredictorConfig, YahooClient};
use strategy::DetectorConfig;

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(mode = %cfg.signal_mode, interval = %cfg.history_interval, "Fimathe predictor starting");

    // ── Detector parameters ───────────────────────────────────────────────────
    let detector = match &cfg.strategy_config_path {
        Some(path) => {
            let loaded = DetectorConfig::load(path)
                .unwrap_or_else(|e| panic!("Failed to load strategy config '{path}': {e}"));
            info!(%path, ?loaded, "Detector parameters loaded");
            loaded
        }
        None => DetectorConfig::default(),
    };

    // ── History source ────────────────────────────────────────────────────────
    let provider: Arc<dyn HistoryProvider> = match &cfg.yahoo_base_url {
        Some(url) => {
            info!(%url, "Using custom Yahoo endpoint");
            Arc::new(YahooClient::with_base_url(url.as_str()))
        }
        None => Arc::new(YahooClient::new()),
    };

    // ── Predictor ─────────────────────────────────────────────────────────────
    let predictor = Predictor::new(provider, PredictorConfig::from_config(&cfg, detector));
    let state = api::AppState {
        predictor: Arc::new(predictor),
    };

    // ── HTTP API ──────────────────────────────────────────────────────────────
    let port = cfg.port;
    tokio::select! {
        result = api::serve(state, port) => {
            if let Err(e) = result {
                panic!("HTTP server failed on port {port}: {e}");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting.");
        }
    }
}
