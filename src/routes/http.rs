// GET handlers: health, version, config, collected data

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::AppState;
use crate::collector::{CollectError, Collection};
use crate::version::VersionInfo;

/// Envelope for every data response.
#[derive(Serialize)]
struct Results<T> {
    data: T,
}

pub(super) enum ApiError {
    UnknownEndpoint(String),
    UnknownSubject(String),
    Collect(CollectError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::UnknownEndpoint(name) => {
                (StatusCode::NOT_FOUND, format!("unknown endpoint {name:?}"))
            }
            ApiError::UnknownSubject(subject) => {
                (StatusCode::NOT_FOUND, format!("unknown subject {subject:?}"))
            }
            ApiError::Collect(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// GET /ping
pub(super) async fn ping_handler() -> &'static str {
    "pong"
}

/// GET /status
pub(super) async fn status_handler() -> &'static str {
    "OK"
}

/// GET /version — service name and version (from Cargo.toml at build time) plus platform.
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(VersionInfo::current())
}

/// GET /config — running config with credentials masked.
pub(super) async fn config_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.config.redacted())
}

/// GET /metrics — Prometheus text format.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "metrics encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// GET /data/{endpoint} — the whole payload of a fresh poll cycle.
pub(super) async fn payload_handler(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
) -> Result<Response, ApiError> {
    let collection = collect(&state, &endpoint).await?;
    Ok(Json(Results {
        data: &collection.payload,
    })
    .into_response())
}

/// GET /data/{endpoint}/{subject} — one list of a fresh poll cycle.
pub(super) async fn subject_handler(
    State(state): State<AppState>,
    Path((endpoint, subject)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    if !matches!(
        subject.as_str(),
        "vms" | "hosts" | "datastores" | "networks" | "skipped"
    ) {
        return Err(ApiError::UnknownSubject(subject));
    }
    let collection = collect(&state, &endpoint).await?;
    let payload = &collection.payload;
    let response = match subject.as_str() {
        "vms" => Json(Results { data: &payload.vms }).into_response(),
        "hosts" => Json(Results {
            data: &payload.hosts,
        })
        .into_response(),
        "datastores" => Json(Results {
            data: &payload.data_stores,
        })
        .into_response(),
        "networks" => Json(Results {
            data: &payload.networks,
        })
        .into_response(),
        _ => Json(Results {
            data: &collection.skipped,
        })
        .into_response(),
    };
    Ok(response)
}

async fn collect(state: &AppState, endpoint: &str) -> Result<Arc<Collection>, ApiError> {
    let collector = state
        .collectors
        .get(endpoint)
        .ok_or_else(|| ApiError::UnknownEndpoint(endpoint.to_string()))?;
    collector.collect().await.map_err(|e| {
        tracing::info!(endpoint, error = %e, "collection failed");
        ApiError::Collect(e)
    })
}
