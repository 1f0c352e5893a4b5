//! Content-addressed blob storage for report images and PDFs.
//!
//! A blob id is the lowercase hex SHA-256 of its bytes, so storing the same
//! file twice yields the same id and a single copy.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("blob I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Compute the content id of a blob
pub fn content_id(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn is_content_id(id: &str) -> bool {
    id.len() == 64 && id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes and return their content id
    async fn put(&self, bytes: Bytes) -> Result<String, BlobError>;

    async fn get(&self, id: &str) -> Result<Bytes, BlobError>;
}

/// Blob store backed by a directory, one file per content id
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    base_dir: PathBuf,
}

impl FsBlobStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    fn blob_path(&self, id: &str) -> PathBuf {
        self.base_dir.join(id)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, bytes: Bytes) -> Result<String, BlobError> {
        let id = content_id(&bytes);
        let path = self.blob_path(&id);
        if fs::try_exists(&path).await? {
            return Ok(id);
        }

        fs::create_dir_all(&self.base_dir).await?;
        // Write to a temp name first so readers never see a partial blob
        let tmp = self.base_dir.join(format!("{}.tmp-{}", id, uuid::Uuid::new_v4().simple()));
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &path).await?;

        tracing::debug!("Stored blob {} ({} bytes)", id, bytes.len());
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Bytes, BlobError> {
        // Ids are hex digests; anything else could escape the base directory
        if !is_content_id(id) {
            return Err(BlobError::NotFound(id.to_string()));
        }

        match fs::read(self.blob_path(id)).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BlobError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory blob store
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, bytes: Bytes) -> Result<String, BlobError> {
        let id = content_id(&bytes);
        self.blobs.write().await.entry(id.clone()).or_insert(bytes);
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Bytes, BlobError> {
        self.blobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_content_id() {
        assert_eq!(
            content_id(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(is_content_id(&content_id(b"abc")));
        assert!(!is_content_id("../etc/passwd"));
    }

    #[tokio::test]
    async fn test_fs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().join("blobs"));

        let id = store.put(Bytes::from_static(b"%PDF-1.4 report")).await.unwrap();
        assert_eq!(store.put(Bytes::from_static(b"%PDF-1.4 report")).await.unwrap(), id);
        assert_eq!(store.get(&id).await.unwrap(), Bytes::from_static(b"%PDF-1.4 report"));
    }

    #[tokio::test]
    async fn test_fs_missing_and_invalid_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        assert_matches!(store.get(&content_id(b"never stored")).await, Err(BlobError::NotFound(_)));
        assert_matches!(store.get("../secret").await, Err(BlobError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryBlobStore::new();
        let id = store.put(Bytes::from_static(b"jpeg")).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap(), Bytes::from_static(b"jpeg"));
        assert_matches!(store.get("nope").await, Err(BlobError::NotFound(_)));
    }
}
