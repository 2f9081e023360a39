//! Directory-backed object store
//!
//! Used when remote upload is disabled: documents land under a local root
//! with the same `{slug}/{doc}.json` layout the remote bucket would have.
//! Also the storage backend of the integration tests.

use crate::remote::traits::{ObjectEntry, ObjectStore, RemoteResult};
use async_trait::async_trait;
use std::path::PathBuf;

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn get(&self, path: &str) -> RemoteResult<Option<Vec<u8>>> {
        match tokio::fs::read(self.resolve(path)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> RemoteResult<()> {
        let target = self.resolve(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write-then-rename so a crash never leaves a torn document
        let tmp = target.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &target).await?;

        Ok(())
    }

    async fn list(&self, prefix: &str) -> RemoteResult<Vec<ObjectEntry>> {
        let dir = if prefix.is_empty() {
            self.root.clone()
        } else {
            self.resolve(prefix)
        };

        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_prefix = entry.file_type().await?.is_dir();
            entries.push(ObjectEntry { name, is_prefix });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_absent_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        assert!(store.get("foo/chapters.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        store
            .put("foo/chapters.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();

        let bytes = store.get("foo/chapters.json").await.unwrap();
        assert_eq!(bytes.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        store
            .put("foo/metadata.json", b"old".to_vec(), "application/json")
            .await
            .unwrap();
        store
            .put("foo/metadata.json", b"new".to_vec(), "application/json")
            .await
            .unwrap();

        assert_eq!(store.get("foo/metadata.json").await.unwrap().unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_list_root_marks_folders() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        store
            .put("beta/chapters.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();
        store
            .put("alpha/chapters.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();
        store
            .put("comics-list.json", b"[]".to_vec(), "application/json")
            .await
            .unwrap();

        let entries = store.list("").await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "comics-list.json"]);
        assert!(entries[0].is_prefix);
        assert!(!entries[2].is_prefix);
    }

    #[tokio::test]
    async fn test_list_missing_prefix_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        assert!(store.list("nothing-here").await.unwrap().is_empty());
    }
}
