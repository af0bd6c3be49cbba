//! Storage collaborators for accounts, sessions, and roles.
//!
//! The Postgres implementations run every query under the configured
//! deadline; the in-memory implementations back tests and single-node
//! deployments.

pub mod accounts;
pub mod memory;
pub mod roles;
pub mod sessions;

use crate::error::{IdentityError, Result};
use crate::models::{RotationOutcome, Session, UserAccount};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

pub use accounts::PgAccountStore;
pub use memory::{MemoryAccountStore, MemorySessionStore};
pub use sessions::PgSessionStore;

/// User account storage.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create(&self, account: &UserAccount) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>>;

    /// Replace the account's credential wholesale.
    async fn set_password_hash(&self, user_id: Uuid, password_hash: &str) -> Result<()>;

    /// Accounts referenced by content are disabled, never deleted.
    async fn set_disabled(&self, user_id: Uuid, disabled: bool) -> Result<()>;
}

/// Session (token family) storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session: &Session) -> Result<()>;

    async fn find(&self, id: Uuid) -> Result<Option<Session>>;

    /// Atomically advance the rotation marker from `expected_jti` to
    /// `next_jti`. The compare-and-swap is the whole point: of two
    /// concurrent calls with the same `expected_jti`, exactly one observes
    /// `Rotated`.
    async fn advance_rotation(
        &self,
        id: Uuid,
        expected_jti: &str,
        next_jti: &str,
    ) -> Result<RotationOutcome>;

    async fn mark_revoked(&self, id: Uuid) -> Result<()>;
}

/// Run a storage future under a deadline; expiry surfaces as `Unavailable`,
/// never partial success.
pub(crate) async fn bounded<T, F>(deadline: Duration, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(IdentityError::Unavailable),
    }
}
