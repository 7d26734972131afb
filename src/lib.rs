//! Users and addresses REST backend: validated CRUD, nested aggregation, PostgreSQL storage.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod openapi;
pub mod repository;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use config::{AppConfig, StorageBackend};
pub use error::{AppError, ConfigError, ErrorKind};
pub use repository::{ensure_database_exists, ensure_tables, MemoryRepository, PgRepository, Repository};
pub use routes::{address_routes, common_routes, user_routes};
pub use state::AppState;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Request bodies above this size are rejected before reaching a handler.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Full application router: operational routes, `/api` resources, and the OpenAPI document.
pub fn app(state: AppState) -> Router {
    let api = user_routes(state.clone()).merge(address_routes(state.clone()));
    Router::new()
        .merge(common_routes(state))
        .nest("/api", api)
        .merge(openapi::openapi_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES)),
        )
}
