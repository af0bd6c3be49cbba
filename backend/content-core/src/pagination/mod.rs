//! Keyset pagination over the content collection.
//!
//! Pages are addressed by the last-seen ordering key `(created_at, id)`, not
//! an offset, so concurrent inserts and deletes elsewhere in the table can
//! neither skip nor duplicate rows across pages. Cursors are scoped to the
//! exact query shape they were issued from.

pub mod cursor;

use crate::config::PaginationSettings;
use crate::db::ContentStore;
use crate::error::{ContentError, Result};
use crate::models::{ContentStatus, Page, PageKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

pub use cursor::CursorCodec;

/// Sort direction over the `(created_at, id)` ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "created_desc",
            SortOrder::OldestFirst => "created_asc",
        }
    }
}

/// Listing filter. Every field participates in the query signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFilter {
    pub owner_id: Option<Uuid>,
    pub status: Option<ContentStatus>,
}

/// The (filter, sort) combination a listing and its cursors are scoped
/// to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySignature {
    pub filter: ContentFilter,
    pub sort: SortOrder,
}

impl QuerySignature {
    pub fn new(filter: ContentFilter, sort: SortOrder) -> Self {
        Self { filter, sort }
    }

    /// Canonical fingerprint of the query shape, embedded in every cursor.
    pub fn fingerprint(&self) -> String {
        let owner = self
            .filter
            .owner_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = self.filter.status.map(|s| s.as_str()).unwrap_or("-");
        let canonical = format!("owner={};status={};sort={}", owner, status, self.sort.as_str());

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Whether `key` sorts strictly after `cursor` in this signature's
    /// ordering.
    pub fn comes_after(&self, key: &PageKey, cursor: &PageKey) -> bool {
        match self.sort {
            SortOrder::NewestFirst => key < cursor,
            SortOrder::OldestFirst => key > cursor,
        }
    }
}

/// Builds stable pages against a content store.
pub struct PageBuilder {
    store: Arc<dyn ContentStore>,
    codec: CursorCodec,
    default_page_size: i64,
    max_page_size: i64,
}

impl PageBuilder {
    pub fn new(store: Arc<dyn ContentStore>, settings: &PaginationSettings) -> Self {
        Self {
            store,
            codec: CursorCodec::new(&settings.cursor_secret),
            default_page_size: settings.default_page_size,
            max_page_size: settings.max_page_size,
        }
    }

    pub fn codec(&self) -> &CursorCodec {
        &self.codec
    }

    /// Fetch up to `limit` items strictly after `cursor`, plus the cursor
    /// for the following page when one exists.
    pub async fn build_page(
        &self,
        signature: &QuerySignature,
        cursor: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Page> {
        let limit = match limit {
            None => self.default_page_size,
            Some(l) if l <= 0 => return Err(ContentError::InvalidLimit),
            Some(l) => l.min(self.max_page_size),
        };

        let after = cursor
            .map(|token| self.codec.decode(token, signature))
            .transpose()?;

        // One extra row answers "is there a next page" without a count query
        let mut items = self
            .store
            .query_page(signature, after.as_ref(), limit + 1)
            .await?;

        let next_cursor = if items.len() as i64 > limit {
            items.truncate(limit as usize);
            items
                .last()
                .map(|item| self.codec.encode(&item.page_key(), signature))
        } else {
            None
        };

        Ok(Page { items, next_cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_deterministic() {
        let sig = QuerySignature::new(ContentFilter::default(), SortOrder::NewestFirst);
        assert_eq!(sig.fingerprint(), sig.fingerprint());
    }

    #[test]
    fn fingerprint_distinguishes_filter_and_sort() {
        let base = QuerySignature::new(ContentFilter::default(), SortOrder::NewestFirst);
        let sorted = QuerySignature::new(ContentFilter::default(), SortOrder::OldestFirst);
        let filtered = QuerySignature::new(
            ContentFilter {
                owner_id: Some(Uuid::new_v4()),
                status: None,
            },
            SortOrder::NewestFirst,
        );

        assert_ne!(base.fingerprint(), sorted.fingerprint());
        assert_ne!(base.fingerprint(), filtered.fingerprint());
    }

    #[test]
    fn comes_after_respects_the_tie_break() {
        let sig = QuerySignature::new(ContentFilter::default(), SortOrder::NewestFirst);
        let now = chrono::Utc::now();
        let low = PageKey {
            created_at: now,
            id: Uuid::from_u128(1),
        };
        let high = PageKey {
            created_at: now,
            id: Uuid::from_u128(2),
        };

        // Same timestamp: the id orders them totally
        assert!(sig.comes_after(&low, &high));
        assert!(!sig.comes_after(&high, &low));
    }
}
