//! Shared application state for all routes. The repository is built once at startup.

use crate::repository::{MemoryRepository, PgRepository, Repository};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
}

impl AppState {
    pub fn new(repo: impl Repository + 'static) -> Self {
        Self { repo: Arc::new(repo) }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::new(PgRepository::new(pool))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryRepository::new())
    }
}
