/// Content storage backed by Postgres.
///
/// Page queries use tuple comparison over the `(created_at, id)` index so
/// the planner can walk it directly; no OFFSET anywhere.
use super::{bounded, ContentStore};
use crate::error::Result;
use crate::models::{ContentItem, PageKey};
use crate::pagination::{QuerySignature, SortOrder};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

const COLUMNS: &str =
    "id, owner_id, title, body, status, blobs, created_at, updated_at, deleted_at";

pub struct PgContentStore {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgContentStore {
    pub fn new(pool: PgPool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn query_page(
        &self,
        signature: &QuerySignature,
        after: Option<&PageKey>,
        limit: i64,
    ) -> Result<Vec<ContentItem>> {
        let sql = match signature.sort {
            SortOrder::NewestFirst => format!(
                r#"
                SELECT {COLUMNS}
                FROM content_items
                WHERE deleted_at IS NULL
                  AND ($1::uuid IS NULL OR owner_id = $1)
                  AND ($2::content_status IS NULL OR status = $2)
                  AND ($3::timestamptz IS NULL OR (created_at, id) < ($3, $4))
                ORDER BY created_at DESC, id DESC
                LIMIT $5
                "#
            ),
            SortOrder::OldestFirst => format!(
                r#"
                SELECT {COLUMNS}
                FROM content_items
                WHERE deleted_at IS NULL
                  AND ($1::uuid IS NULL OR owner_id = $1)
                  AND ($2::content_status IS NULL OR status = $2)
                  AND ($3::timestamptz IS NULL OR (created_at, id) > ($3, $4))
                ORDER BY created_at ASC, id ASC
                LIMIT $5
                "#
            ),
        };

        let items = bounded(
            self.op_timeout,
            sqlx::query_as::<_, ContentItem>(&sql)
                .bind(signature.filter.owner_id)
                .bind(signature.filter.status)
                .bind(after.map(|key| key.created_at))
                .bind(after.map(|key| key.id))
                .bind(limit)
                .fetch_all(&self.pool),
        )
        .await?;

        Ok(items)
    }

    async fn insert(&self, item: &ContentItem) -> Result<()> {
        bounded(
            self.op_timeout,
            sqlx::query(
                r#"
                INSERT INTO content_items (id, owner_id, title, body, status, blobs, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(item.id)
            .bind(item.owner_id)
            .bind(&item.title)
            .bind(&item.body)
            .bind(item.status)
            .bind(&item.blobs)
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentItem>> {
        let item = bounded(
            self.op_timeout,
            sqlx::query_as::<_, ContentItem>(&format!(
                r#"
                SELECT {COLUMNS}
                FROM content_items
                WHERE id = $1 AND deleted_at IS NULL
                "#
            ))
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(item)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        bounded(
            self.op_timeout,
            sqlx::query(
                r#"
                UPDATE content_items
                SET deleted_at = $1, updated_at = $1, status = 'deleted'
                WHERE id = $2 AND deleted_at IS NULL
                "#,
            )
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn find_expired(&self, cutoff: DateTime<Utc>, limit: i64) -> Result<Vec<ContentItem>> {
        let items = bounded(
            self.op_timeout,
            sqlx::query_as::<_, ContentItem>(&format!(
                r#"
                SELECT {COLUMNS}
                FROM content_items
                WHERE deleted_at IS NULL AND created_at < $1
                ORDER BY created_at ASC, id ASC
                LIMIT $2
                "#
            ))
            .bind(cutoff)
            .bind(limit)
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(items)
    }
}
