/// S3-backed blob storage
use super::BlobStorage;
use crate::config::StorageSettings;
use crate::error::{ContentError, Result};
use crate::models::BlobReference;
use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub struct S3BlobStorage {
    client: Arc<Client>,
    bucket: String,
    op_timeout: Duration,
}

impl S3BlobStorage {
    pub fn new(client: Arc<Client>, settings: &StorageSettings) -> Self {
        Self {
            client,
            bucket: settings.bucket.clone(),
            op_timeout: settings.operation_timeout(),
        }
    }

    /// Build a client from the ambient AWS environment.
    pub async fn from_env(settings: &StorageSettings) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(Arc::new(Client::new(&config)), settings)
    }
}

async fn bounded<T, E, F>(deadline: Duration, fut: F) -> Result<T>
where
    E: std::fmt::Display,
    F: Future<Output = std::result::Result<T, E>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result.map_err(|e| ContentError::Storage(e.to_string())),
        Err(_) => Err(ContentError::Unavailable),
    }
}

#[async_trait]
impl BlobStorage for S3BlobStorage {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<BlobReference> {
        let size = bytes.len() as i64;

        bounded(
            self.op_timeout,
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .content_type(content_type)
                .body(ByteStream::from(bytes))
                .send(),
        )
        .await?;

        tracing::info!(key = %key, size = size, "object stored");

        Ok(BlobReference {
            key: key.to_string(),
            content_type: content_type.to_string(),
            size,
        })
    }

    async fn object_exists(&self, key: &str) -> Result<bool> {
        let result = tokio::time::timeout(
            self.op_timeout,
            self.client
                .head_object()
                .bucket(&self.bucket)
                .key(key)
                .send(),
        )
        .await
        .map_err(|_| ContentError::Unavailable)?;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                // A missing object is the eventual-consistency case, not a
                // storage failure
                if err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false)
                {
                    Ok(false)
                } else {
                    Err(ContentError::Storage(err.to_string()))
                }
            }
        }
    }

    async fn presigned_download_url(&self, key: &str, expires_in: Duration) -> Result<String> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| ContentError::Internal(format!("presigning config: {}", e)))?;

        let request = bounded(
            self.op_timeout,
            self.client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .presigned(presigning),
        )
        .await?;

        Ok(request.uri().to_string())
    }
}
