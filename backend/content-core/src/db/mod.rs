//! Content storage collaborators.

pub mod content_repo;
pub mod memory;

use crate::error::{ContentError, Result};
use crate::models::{ContentItem, PageKey};
use crate::pagination::QuerySignature;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

pub use content_repo::PgContentStore;
pub use memory::MemoryContentStore;

/// The relational store holding content rows.
///
/// `query_page` must honor the keyset semantics of the pagination engine:
/// results strictly after `after` in the signature's `(created_at, id)`
/// ordering, soft-deleted rows excluded.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn query_page(
        &self,
        signature: &QuerySignature,
        after: Option<&PageKey>,
        limit: i64,
    ) -> Result<Vec<ContentItem>>;

    async fn insert(&self, item: &ContentItem) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentItem>>;

    async fn soft_delete(&self, id: Uuid) -> Result<()>;

    /// Items whose ordering key is older than `cutoff`, for the external
    /// retention sweep. Scheduling and deletion policy live with the caller.
    async fn find_expired(&self, cutoff: DateTime<Utc>, limit: i64) -> Result<Vec<ContentItem>>;
}

/// Run a storage future under a deadline; expiry surfaces as `Unavailable`,
/// never partial success.
pub(crate) async fn bounded<T, F>(deadline: Duration, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(ContentError::Unavailable),
    }
}
