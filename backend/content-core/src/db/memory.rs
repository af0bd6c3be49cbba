//! In-memory content store.
//!
//! Backs the pagination property tests and single-node deployments. Ordering
//! matches the Postgres implementation exactly: `(created_at, id)` with
//! soft-deleted rows excluded.

use super::ContentStore;
use crate::error::Result;
use crate::models::{ContentItem, PageKey};
use crate::pagination::{QuerySignature, SortOrder};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryContentStore {
    items: RwLock<Vec<ContentItem>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(item: &ContentItem, signature: &QuerySignature) -> bool {
    if item.deleted_at.is_some() {
        return false;
    }
    if let Some(owner_id) = signature.filter.owner_id {
        if item.owner_id != owner_id {
            return false;
        }
    }
    if let Some(status) = signature.filter.status {
        if item.status != status {
            return false;
        }
    }
    true
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn query_page(
        &self,
        signature: &QuerySignature,
        after: Option<&PageKey>,
        limit: i64,
    ) -> Result<Vec<ContentItem>> {
        let items = self.items.read().expect("content store lock poisoned");

        let mut page: Vec<ContentItem> = items
            .iter()
            .filter(|item| matches_filter(item, signature))
            .filter(|item| match after {
                Some(cursor) => signature.comes_after(&item.page_key(), cursor),
                None => true,
            })
            .cloned()
            .collect();

        page.sort_by(|a, b| match signature.sort {
            SortOrder::NewestFirst => b.page_key().cmp(&a.page_key()),
            SortOrder::OldestFirst => a.page_key().cmp(&b.page_key()),
        });
        page.truncate(limit as usize);

        Ok(page)
    }

    async fn insert(&self, item: &ContentItem) -> Result<()> {
        self.items
            .write()
            .expect("content store lock poisoned")
            .push(item.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentItem>> {
        Ok(self
            .items
            .read()
            .expect("content store lock poisoned")
            .iter()
            .find(|item| item.id == id && item.deleted_at.is_none())
            .cloned())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        let mut items = self.items.write().expect("content store lock poisoned");
        if let Some(item) = items.iter_mut().find(|item| item.id == id) {
            if item.deleted_at.is_none() {
                item.deleted_at = Some(Utc::now());
                item.updated_at = Utc::now();
                item.status = crate::models::ContentStatus::Deleted;
            }
        }
        Ok(())
    }

    async fn find_expired(&self, cutoff: DateTime<Utc>, limit: i64) -> Result<Vec<ContentItem>> {
        let items = self.items.read().expect("content store lock poisoned");

        let mut expired: Vec<ContentItem> = items
            .iter()
            .filter(|item| item.deleted_at.is_none() && item.created_at < cutoff)
            .cloned()
            .collect();

        expired.sort_by(|a, b| a.page_key().cmp(&b.page_key()));
        expired.truncate(limit as usize);

        Ok(expired)
    }
}
