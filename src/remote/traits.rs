//! Object store trait and error types
//!
//! The harvester persists opaque JSON documents by path. "Not found" is a
//! normal outcome (an empty baseline for a comic nobody has stored yet) and
//! is therefore modeled as `Ok(None)`, distinct from transport errors.

use crate::FetchError;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during object store operations
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Fetch(#[from] FetchError),

    #[error("store returned HTTP {status} for {path}")]
    Status { path: String, status: u16 },

    #[error("undecodable store response for {path}: {message}")]
    Decode { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for object store operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// One entry of a store listing
#[derive(Debug, Clone)]
pub struct ObjectEntry {
    /// Name relative to the listed prefix
    pub name: String,

    /// True for folder-like entries (a comic's document directory)
    pub is_prefix: bool,
}

/// Trait for object store backends
///
/// Implementations must be safe to share across worker tasks.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Downloads an object; `Ok(None)` means the object does not exist
    async fn get(&self, path: &str) -> RemoteResult<Option<Vec<u8>>>;

    /// Uploads an object, overwriting any existing content (upsert)
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> RemoteResult<()>;

    /// Lists entries directly under a prefix ("" for the bucket root)
    async fn list(&self, prefix: &str) -> RemoteResult<Vec<ObjectEntry>>;
}
