/// Account storage backed by Postgres
use super::{bounded, AccountStore};
use crate::error::Result;
use crate::models::UserAccount;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

pub struct PgAccountStore {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgAccountStore {
    pub fn new(pool: PgPool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, account: &UserAccount) -> Result<()> {
        bounded(
            self.op_timeout,
            sqlx::query(
                r#"
                INSERT INTO users (id, username, email, role, password_hash, disabled, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(account.id)
            .bind(&account.username)
            .bind(&account.email)
            .bind(&account.role)
            .bind(&account.password_hash)
            .bind(account.disabled)
            .bind(account.created_at)
            .bind(account.updated_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>> {
        let account = bounded(
            self.op_timeout,
            sqlx::query_as::<_, UserAccount>(
                r#"
                SELECT id, username, email, role, password_hash, disabled, created_at, updated_at
                FROM users
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(account)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
        let account = bounded(
            self.op_timeout,
            sqlx::query_as::<_, UserAccount>(
                r#"
                SELECT id, username, email, role, password_hash, disabled, created_at, updated_at
                FROM users
                WHERE username = $1
                "#,
            )
            .bind(username)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(account)
    }

    async fn set_password_hash(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        bounded(
            self.op_timeout,
            sqlx::query(
                r#"
                UPDATE users
                SET password_hash = $1, updated_at = $2
                WHERE id = $3
                "#,
            )
            .bind(password_hash)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn set_disabled(&self, user_id: Uuid, disabled: bool) -> Result<()> {
        bounded(
            self.op_timeout,
            sqlx::query(
                r#"
                UPDATE users
                SET disabled = $1, updated_at = $2
                WHERE id = $3
                "#,
            )
            .bind(disabled)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }
}
