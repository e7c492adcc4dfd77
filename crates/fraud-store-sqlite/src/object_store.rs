// fraud-store-sqlite/src/object_store.rs
// ============================================================================
// Module: Filesystem Object Store
// Description: Content-addressed, append-only filesystem evidence store.
// Purpose: Back fraud_core::ObjectStore without an S3 dependency.
// Dependencies: fraud-core, thiserror, std::fs
// ============================================================================

//! ## Overview
//! Evidence bundles are written once to `<root>/<YYYY>/<MM>/<DD>/<uuid>.json`
//! (§4.5, §6 "Object-store layout") and never mutated; [`FsObjectStore`] is
//! a local, write-once content store, with the same path-safety checks
//! the sqlite store applies to its own database
//! path. A write is rejected outright if an object already exists at `key`:
//! keys are UUIDs, so a collision means a caller is replaying a bug, not a
//! legitimate retry.

use std::fs;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use fraud_core::ObjectStore;
use fraud_core::ObjectStoreError;
use thiserror::Error;

/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total key length.
const MAX_KEY_LENGTH: usize = 1024;

/// Errors specific to the filesystem object store, convertible to
/// [`ObjectStoreError`] at the trait boundary.
#[derive(Debug, Error)]
pub enum FsObjectStoreError {
    /// Filesystem I/O error.
    #[error("fs object store io error: {0}")]
    Io(String),
    /// The requested object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),
    /// The key failed path-safety validation.
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    /// An object already exists at this key.
    #[error("object already exists: {0}")]
    AlreadyExists(String),
}

impl From<FsObjectStoreError> for ObjectStoreError {
    fn from(error: FsObjectStoreError) -> Self {
        match error {
            FsObjectStoreError::NotFound(key) => Self::NotFound(key),
            other => Self::Io(other.to_string()),
        }
    }
}

/// Filesystem-backed, content-addressed object store rooted at a single
/// directory (the "bucket").
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    /// Root directory objects are written under.
    root: PathBuf,
}

impl FsObjectStore {
    /// Opens (creating if absent) a filesystem object store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`FsObjectStoreError::Io`] if `root` cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, FsObjectStoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| FsObjectStoreError::Io(err.to_string()))?;
        Ok(Self { root })
    }

    /// Resolves `key` to a path under `root`, rejecting traversal and
    /// overlong components.
    fn resolve(&self, key: &str) -> Result<PathBuf, FsObjectStoreError> {
        if key.is_empty() || key.len() > MAX_KEY_LENGTH {
            return Err(FsObjectStoreError::InvalidKey(
                "key must be non-empty and within length limits".to_string(),
            ));
        }
        let candidate = Path::new(key);
        if candidate.is_absolute() {
            return Err(FsObjectStoreError::InvalidKey("key must be relative".to_string()));
        }
        for component in candidate.components() {
            match component {
                Component::Normal(part) => {
                    if part.len() > MAX_PATH_COMPONENT_LENGTH {
                        return Err(FsObjectStoreError::InvalidKey(
                            "key contains an overlong component".to_string(),
                        ));
                    }
                }
                _ => {
                    return Err(FsObjectStoreError::InvalidKey(
                        "key must not contain '.', '..', or root components".to_string(),
                    ));
                }
            }
        }
        Ok(self.root.join(candidate))
    }

    /// Writes `bytes` at `key`, failing if an object already exists there.
    ///
    /// # Errors
    ///
    /// Returns [`FsObjectStoreError`] on an invalid key, an existing object,
    /// or a filesystem failure.
    pub fn put_bytes(&self, key: &str, bytes: &[u8]) -> Result<(), FsObjectStoreError> {
        let path = self.resolve(key)?;
        if path.exists() {
            return Err(FsObjectStoreError::AlreadyExists(key.to_string()));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| FsObjectStoreError::Io(err.to_string()))?;
        }
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, bytes).map_err(|err| FsObjectStoreError::Io(err.to_string()))?;
        fs::rename(&temp_path, &path).map_err(|err| FsObjectStoreError::Io(err.to_string()))?;
        Ok(())
    }

    /// Reads the bytes stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`FsObjectStoreError::NotFound`] when no object exists at
    /// `key`, or [`FsObjectStoreError::Io`] on a filesystem failure.
    pub fn get_bytes(&self, key: &str) -> Result<Vec<u8>, FsObjectStoreError> {
        let path = self.resolve(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(FsObjectStoreError::NotFound(key.to_string()))
            }
            Err(err) => Err(FsObjectStoreError::Io(err.to_string())),
        }
    }
}

impl ObjectStore for FsObjectStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), ObjectStoreError> {
        self.put_bytes(key, bytes).map_err(ObjectStoreError::from)
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        self.get_bytes(key).map_err(ObjectStoreError::from)
    }
}
