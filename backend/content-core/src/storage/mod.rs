//! Blob storage gateway.
//!
//! The object store holding media referenced by content. The capability
//! surface is deliberately narrow, and a successful `put_object` does not
//! guarantee the object is immediately readable; blob storage is eventually
//! consistent, and callers poll `object_exists` when they care.

pub mod s3;

use crate::error::Result;
use crate::models::BlobReference;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

pub use s3::S3BlobStorage;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<BlobReference>;

    async fn object_exists(&self, key: &str) -> Result<bool>;

    /// Time-limited download URL for a stored object.
    async fn presigned_download_url(&self, key: &str, expires_in: Duration) -> Result<String>;
}

/// In-memory blob store for tests and single-node development.
#[derive(Default)]
pub struct MemoryBlobStorage {
    objects: RwLock<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<BlobReference> {
        let size = bytes.len() as i64;
        self.objects
            .write()
            .expect("blob store lock poisoned")
            .insert(key.to_string(), (bytes, content_type.to_string()));

        Ok(BlobReference {
            key: key.to_string(),
            content_type: content_type.to_string(),
            size,
        })
    }

    async fn object_exists(&self, key: &str) -> Result<bool> {
        Ok(self
            .objects
            .read()
            .expect("blob store lock poisoned")
            .contains_key(key))
    }

    async fn presigned_download_url(&self, key: &str, expires_in: Duration) -> Result<String> {
        Ok(format!(
            "memory://{}?expires_in={}",
            key,
            expires_in.as_secs()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_exists() {
        let store = MemoryBlobStorage::new();

        let reference = store
            .put_object("content/cover.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();

        assert_eq!(reference.key, "content/cover.jpg");
        assert_eq!(reference.size, 3);
        assert!(store.object_exists("content/cover.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn missing_object_is_not_an_error() {
        let store = MemoryBlobStorage::new();
        // Absence is an eventual-consistency condition, reported as false
        assert!(!store.object_exists("content/missing.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn callers_can_poll_an_eventually_consistent_gateway() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        // A put that has not propagated yet reads as absent, then appears
        let mut mock = MockBlobStorage::new();
        let calls = AtomicUsize::new(0);
        mock.expect_object_exists().returning(move |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok(n >= 2)
        });

        assert!(!mock.object_exists("content/a").await.unwrap());
        assert!(!mock.object_exists("content/a").await.unwrap());
        assert!(mock.object_exists("content/a").await.unwrap());
    }
}
