//! Track Catalog Server Library
//!
//! This library exposes the internal modules for the binaries and the
//! end-to-end tests.

pub mod catalog_import;
pub mod catalog_store;
pub mod config;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use catalog_import::{run_import, ImportOutcome, ImportReport, ImportSettings};
pub use catalog_store::{CatalogStore, SqliteCatalogStore};
pub use server::{run_server, RequestsLoggingLevel};
