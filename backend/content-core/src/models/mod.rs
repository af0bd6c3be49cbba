/// Data models for content items and pagination
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Content lifecycle status, matching the database content_status type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "content_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Pending,
    Published,
    Deleted,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Pending => "pending",
            ContentStatus::Published => "published",
            ContentStatus::Deleted => "deleted",
        }
    }
}

/// Pointer to an object held by the blob store.
///
/// The reference existing in the content table does not imply the object is
/// already readable; blob storage is eventually consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobReference {
    pub key: String,
    pub content_type: String,
    pub size: i64,
}

/// A published piece of content.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContentItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub body: String,
    pub status: ContentStatus,
    pub blobs: Json<Vec<BlobReference>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ContentItem {
    pub fn page_key(&self) -> PageKey {
        PageKey {
            created_at: self.created_at,
            id: self.id,
        }
    }
}

/// Payload for creating content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContentItem {
    pub title: String,
    pub body: String,
    pub blobs: Vec<BlobReference>,
}

/// Ordering key for keyset pagination: primary sort key plus a unique
/// tie-break, so rows sharing a timestamp are still totally ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageKey {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

/// One page of a listing plus the cursor for the next one.
/// `next_cursor` is absent on the final page.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub items: Vec<ContentItem>,
    pub next_cursor: Option<String>,
}
