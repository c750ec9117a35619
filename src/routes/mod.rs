// HTTP routes

mod http;

use axum::{Router, routing::get};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::collector::Collector;
use crate::config::AppConfig;
use crate::metrics::Metrics;

#[derive(Clone)]
pub(crate) struct AppState {
    /// One collector per configured endpoint, keyed by endpoint name.
    pub(crate) collectors: Arc<HashMap<String, Collector>>,
    pub(crate) metrics: Arc<Metrics>,
    pub(crate) config: AppConfig,
}

/// `collectors` should record into the same `metrics` (see `Collector::with_metrics`).
pub fn app(collectors: Vec<Collector>, metrics: Arc<Metrics>, config: AppConfig) -> Router {
    let collectors = collectors
        .into_iter()
        .map(|c| (c.endpoint().to_string(), c))
        .collect();
    let state = AppState {
        collectors: Arc::new(collectors),
        metrics,
        config,
    };
    Router::new()
        .route("/ping", get(http::ping_handler)) // GET /ping
        .route("/status", get(http::status_handler)) // GET /status
        .route("/version", get(http::version_handler)) // GET /version
        .route("/config", get(http::config_handler)) // GET /config
        .route("/metrics", get(http::metrics_handler)) // GET /metrics
        .route("/data/{endpoint}", get(http::payload_handler)) // GET /data/{endpoint}
        .route("/data/{endpoint}/{subject}", get(http::subject_handler)) // GET /data/{endpoint}/{subject}
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
