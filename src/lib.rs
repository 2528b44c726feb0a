//! Music Library Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod library_store;
pub mod server;

// Re-export commonly used types for convenience
pub use library_store::{InMemoryLibraryStore, LibraryStore, StoreError};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
