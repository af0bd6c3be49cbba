/// Session storage backed by Postgres
use super::{bounded, SessionStore};
use crate::error::Result;
use crate::models::{RotationOutcome, Session};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

pub struct PgSessionStore {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgSessionStore {
    pub fn new(pool: PgPool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: &Session) -> Result<()> {
        bounded(
            self.op_timeout,
            sqlx::query(
                r#"
                INSERT INTO sessions (id, user_id, refresh_jti, created_at, last_rotated_at, revoked_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(session.id)
            .bind(session.user_id)
            .bind(&session.refresh_jti)
            .bind(session.created_at)
            .bind(session.last_rotated_at)
            .bind(session.revoked_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Session>> {
        let session = bounded(
            self.op_timeout,
            sqlx::query_as::<_, Session>(
                r#"
                SELECT id, user_id, refresh_jti, created_at, last_rotated_at, revoked_at
                FROM sessions
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(session)
    }

    async fn advance_rotation(
        &self,
        id: Uuid,
        expected_jti: &str,
        next_jti: &str,
    ) -> Result<RotationOutcome> {
        // The conditional UPDATE is the atomic step: the row-level lock
        // serializes concurrent rotations, so at most one matches the
        // expected marker.
        let updated = bounded(
            self.op_timeout,
            sqlx::query(
                r#"
                UPDATE sessions
                SET refresh_jti = $1, last_rotated_at = $2
                WHERE id = $3 AND refresh_jti = $4 AND revoked_at IS NULL
                "#,
            )
            .bind(next_jti)
            .bind(Utc::now())
            .bind(id)
            .bind(expected_jti)
            .execute(&self.pool),
        )
        .await?;

        if updated.rows_affected() == 1 {
            return Ok(RotationOutcome::Rotated);
        }

        match self.find(id).await? {
            None => Ok(RotationOutcome::SessionMissing),
            Some(session) if session.is_revoked() => Ok(RotationOutcome::SessionRevoked),
            Some(_) => Ok(RotationOutcome::ReplayDetected),
        }
    }

    async fn mark_revoked(&self, id: Uuid) -> Result<()> {
        bounded(
            self.op_timeout,
            sqlx::query(
                r#"
                UPDATE sessions
                SET revoked_at = $1
                WHERE id = $2 AND revoked_at IS NULL
                "#,
            )
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }
}
