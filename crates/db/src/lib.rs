//! JSON document persistence for projects and uploads.
//!
//! Documents live behind the [`store::DocumentBackend`] trait so the
//! service can run against the on-disk [`store::FileBackend`] in
//! production and [`store::MemoryBackend`] in tests.

pub mod models;
pub mod repositories;
pub mod store;

use std::path::PathBuf;
use std::sync::Arc;

pub use store::StoreError;

pub type DbPool = store::Store;

/// Open the file-backed store rooted at `data_dir`, creating the
/// directory if needed.
pub async fn create_pool(data_dir: impl Into<PathBuf>) -> Result<DbPool, StoreError> {
    let backend = store::FileBackend::open(data_dir).await?;
    Ok(store::Store::new(Arc::new(backend)))
}

/// Verify the store is reachable and writable.
pub async fn health_check(pool: &DbPool) -> Result<(), StoreError> {
    pool.ping().await
}
