//! Remote state reading and writing
//!
//! This module handles persistence of the harvested documents, including:
//! - The `ObjectStore` trait the pipeline writes through
//! - A Supabase Storage backend for production runs
//! - A directory-backed backend for local-only runs and tests
//! - Typed JSON helpers on top of the byte-level store

mod local;
mod supabase;
mod traits;

pub use local::LocalStore;
pub use supabase::SupabaseStore;
pub use traits::{ObjectEntry, ObjectStore, RemoteError, RemoteResult};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Downloads and decodes a JSON document; `Ok(None)` when absent
///
/// A document that exists but does not decode is a `Decode` error, not an
/// absent document: treating it as absent would overwrite good data on the
/// next write.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn ObjectStore,
    path: &str,
) -> RemoteResult<Option<T>> {
    let bytes = match store.get(path).await? {
        Some(b) => b,
        None => return Ok(None),
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| RemoteError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
}

/// Encodes and uploads a JSON document
pub async fn put_json<T: Serialize>(
    store: &dyn ObjectStore,
    path: &str,
    value: &T,
) -> RemoteResult<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    store.put(path, bytes, "application/json").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        put_json(&store, "foo/list.json", &vec!["a", "b"]).await.unwrap();
        let loaded: Option<Vec<String>> = get_json(&store, "foo/list.json").await.unwrap();
        assert_eq!(loaded.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_get_json_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let loaded: Option<Vec<String>> = get_json(&store, "missing.json").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_get_json_undecodable_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store
            .put("bad.json", b"not json".to_vec(), "application/json")
            .await
            .unwrap();

        let result: RemoteResult<Option<Vec<String>>> = get_json(&store, "bad.json").await;
        assert!(matches!(result, Err(RemoteError::Decode { .. })));
    }
}
