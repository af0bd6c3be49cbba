//! In-memory account and session stores.
//!
//! Used by the test suites and by single-node deployments that have no
//! Postgres. The session store's rotation step takes the shard's write lock
//! for the whole compare-and-swap, giving the same one-winner guarantee as
//! the conditional UPDATE in the Postgres implementation.

use super::{AccountStore, SessionStore};
use crate::error::Result;
use crate::models::{RotationOutcome, Session, UserAccount};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: DashMap<Uuid, UserAccount>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, account: &UserAccount) -> Result<()> {
        self.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>> {
        Ok(self.accounts.get(&id).map(|entry| entry.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
        Ok(self
            .accounts
            .iter()
            .find(|entry| entry.username == username)
            .map(|entry| entry.clone()))
    }

    async fn set_password_hash(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        if let Some(mut entry) = self.accounts.get_mut(&user_id) {
            entry.password_hash = password_hash.to_string();
            entry.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_disabled(&self, user_id: Uuid, disabled: bool) -> Result<()> {
        if let Some(mut entry) = self.accounts.get_mut(&user_id) {
            entry.disabled = disabled;
            entry.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<Uuid, Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: &Session) -> Result<()> {
        self.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Session>> {
        Ok(self.sessions.get(&id).map(|entry| entry.clone()))
    }

    async fn advance_rotation(
        &self,
        id: Uuid,
        expected_jti: &str,
        next_jti: &str,
    ) -> Result<RotationOutcome> {
        // get_mut holds the shard write lock across the compare-and-swap
        match self.sessions.get_mut(&id) {
            None => Ok(RotationOutcome::SessionMissing),
            Some(mut session) => {
                if session.is_revoked() {
                    Ok(RotationOutcome::SessionRevoked)
                } else if session.refresh_jti != expected_jti {
                    Ok(RotationOutcome::ReplayDetected)
                } else {
                    session.refresh_jti = next_jti.to_string();
                    session.last_rotated_at = Utc::now();
                    Ok(RotationOutcome::Rotated)
                }
            }
        }
    }

    async fn mark_revoked(&self, id: Uuid) -> Result<()> {
        if let Some(mut session) = self.sessions.get_mut(&id) {
            if session.revoked_at.is_none() {
                session.revoked_at = Some(Utc::now());
            }
        }
        Ok(())
    }
}
