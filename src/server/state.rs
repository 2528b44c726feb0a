use axum::extract::FromRef;

use crate::library_store::LibraryStore;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use super::{ApiError, ServerConfig};

/// Readers share the lock, every mutating store call holds the write lock
/// from its existence check to the end of its cascade.
pub type GuardedLibraryStore = Arc<RwLock<Box<dyn LibraryStore>>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub store: GuardedLibraryStore,
}

impl ServerState {
    pub fn new(config: ServerConfig, store: Box<dyn LibraryStore>) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            store: Arc::new(RwLock::new(store)),
        }
    }
}

impl FromRef<ServerState> for GuardedLibraryStore {
    fn from_ref(input: &ServerState) -> Self {
        input.store.clone()
    }
}

pub fn read_store(
    store: &GuardedLibraryStore,
) -> Result<RwLockReadGuard<'_, Box<dyn LibraryStore>>, ApiError> {
    store.read().map_err(|_| ApiError::PoisonedStore)
}

pub fn write_store(
    store: &GuardedLibraryStore,
) -> Result<RwLockWriteGuard<'_, Box<dyn LibraryStore>>, ApiError> {
    store.write().map_err(|_| ApiError::PoisonedStore)
}
