// fraud-core/src/interfaces/object_store.rs
// ============================================================================
// Module: Object Store
// Description: Backend-agnostic content-addressed object storage interface.
// Purpose: Let the auditor persist evidence bundles without an S3 dependency.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Evidence bundles are written once to `bucket/<YYYY>/<MM>/<DD>/<uuid>.json`
//! (§4.5) and never mutated. This trait is the backend-agnostic boundary;
//! `fraud-store-sqlite::FsObjectStore` is the filesystem-backed
//! implementation; a remote object-storage backend can implement the same
//! trait without the rest of the pipeline changing.

use thiserror::Error;

/// Object store errors.
#[derive(Debug, Error)]
pub enum ObjectStoreError {
    /// The object store is unreachable or the write/read failed.
    #[error("object store io error: {0}")]
    Io(String),
    /// The requested object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),
}

/// Content-addressed, append-only object storage for evidence bundles.
pub trait ObjectStore {
    /// Writes `bytes` at `key`, failing if an object already exists there
    /// (objects are named by UUID, so a collision indicates a bug upstream).
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError`] when the write fails.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), ObjectStoreError>;

    /// Reads the bytes stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::NotFound`] when no object exists at `key`,
    /// or [`ObjectStoreError::Io`] on a backend failure.
    fn get(&self, key: &str) -> Result<Vec<u8>, ObjectStoreError>;
}
