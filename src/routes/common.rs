use crate::handlers::common::{health, ready, root, version};
use crate::state::AppState;
use axum::{routing::get, Router};

/// GET /, /health, /ready (store ping), /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
