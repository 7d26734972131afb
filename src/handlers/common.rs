//! Operational handlers: root greeting, liveness, storage readiness, build info.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct Greeting {
    message: &'static str,
}

#[derive(Serialize)]
pub struct Liveness {
    status: &'static str,
}

/// Readiness of the configured storage backend.
#[derive(Serialize)]
pub struct StorageReadiness {
    status: &'static str,
    storage: &'static str,
    reachable: bool,
}

#[derive(Serialize)]
pub struct BuildInfo {
    name: &'static str,
    version: &'static str,
}

pub async fn root() -> Json<Greeting> {
    Json(Greeting { message: "Hello World" })
}

pub async fn health() -> Json<Liveness> {
    Json(Liveness { status: "ok" })
}

pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<StorageReadiness>) {
    let storage = state.repo.backend();
    match state.repo.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(StorageReadiness {
                status: "ok",
                storage,
                reachable: true,
            }),
        ),
        Err(e) => {
            tracing::warn!(storage, error = %e, "storage not reachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(StorageReadiness {
                    status: "degraded",
                    storage,
                    reachable: false,
                }),
            )
        }
    }
}

pub async fn version() -> Json<BuildInfo> {
    Json(BuildInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
