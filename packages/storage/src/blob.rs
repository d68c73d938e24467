// ABOUTME: On-disk blob store for RFQ item attachments
// ABOUTME: put/read/delete with sha256 checksums; files are immutable

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use procura_core::generate_id;

use crate::error::StorageError;

/// Result of storing a blob
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// Path relative to the store root, persisted in attachment metadata
    pub rel_path: String,
    pub checksum: String,
    pub size: i64,
}

#[derive(Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Write bytes under the given RFQ item's subdirectory
    pub async fn put(
        &self,
        rfq_item_id: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<StoredBlob, StorageError> {
        let safe_name = sanitize_filename(filename);
        let rel_path = format!("{}/{}_{}", rfq_item_id, generate_id(), safe_name);
        let full_path = self.root.join(&rel_path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&full_path, bytes).await?;

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let checksum = hex::encode(hasher.finalize());

        debug!(path = %rel_path, size = bytes.len(), "Stored attachment blob");

        Ok(StoredBlob {
            rel_path,
            checksum,
            size: bytes.len() as i64,
        })
    }

    pub async fn read(&self, rel_path: &str) -> Result<Vec<u8>, StorageError> {
        let bytes = fs::read(self.root.join(rel_path)).await?;
        Ok(bytes)
    }

    /// Best-effort delete. A missing file is not an error; the metadata row
    /// is the source of truth.
    pub async fn delete(&self, rel_path: &str) {
        if let Err(e) = fs::remove_file(self.root.join(rel_path)).await {
            warn!(path = %rel_path, error = %e, "Failed to remove attachment blob");
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_read_delete() {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::new(dir.path().to_path_buf());

        let stored = store
            .put("item-1", "spec.pdf", b"%PDF-1.4 example")
            .await
            .unwrap();
        assert_eq!(stored.size, 16);
        assert_eq!(stored.checksum.len(), 64);

        let bytes = store.read(&stored.rel_path).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.4 example");

        store.delete(&stored.rel_path).await;
        assert!(store.read(&stored.rel_path).await.is_err());
    }

    #[tokio::test]
    async fn test_filename_is_sanitized() {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::new(dir.path().to_path_buf());

        let stored = store
            .put("item-1", "../../../etc/passwd", b"data")
            .await
            .unwrap();
        assert!(!stored.rel_path.contains(".."));
        assert!(store.read(&stored.rel_path).await.is_ok());
    }
}
