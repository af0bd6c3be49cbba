//! Session revocation registry.
//!
//! The registry is the only mutable shared structure in this core. Entries
//! live as long as the longest refresh TTL; once a session's tokens have all
//! expired the entry can lapse, since an expired token can never verify
//! anyway. `revoke` is idempotent, and once it returns every subsequent
//! `is_revoked` from any task observes `true`.

use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use redis_utils::{with_timeout, SharedConnectionManager};
use std::time::{Duration, Instant};
use uuid::Uuid;

#[async_trait]
pub trait RevocationRegistry: Send + Sync {
    /// Mark the session revoked. Revoking an already-revoked or unknown
    /// session is a no-op success.
    async fn revoke(&self, session_id: Uuid) -> Result<()>;

    /// Whether the session has been revoked (explicitly or by reuse
    /// detection).
    async fn is_revoked(&self, session_id: Uuid) -> Result<bool>;
}

fn registry_key(session_id: Uuid) -> String {
    format!("quill:revoked:session:{}", session_id)
}

/// Redis-backed registry shared by every service replica.
///
/// Redis serializes commands, so a `SET` acknowledged here is visible to
/// every later `EXISTS` regardless of which replica issues it.
pub struct RedisRevocationRegistry {
    redis: SharedConnectionManager,
    entry_ttl: Duration,
    command_timeout: Duration,
}

impl RedisRevocationRegistry {
    pub fn new(
        redis: SharedConnectionManager,
        entry_ttl: Duration,
        command_timeout: Duration,
    ) -> Self {
        Self {
            redis,
            entry_ttl,
            command_timeout,
        }
    }
}

#[async_trait]
impl RevocationRegistry for RedisRevocationRegistry {
    async fn revoke(&self, session_id: Uuid) -> Result<()> {
        let key = registry_key(session_id);
        let ttl = self.entry_ttl.as_secs();

        let mut conn = self.redis.lock().await.clone();
        with_timeout(self.command_timeout, async {
            redis::cmd("SET")
                .arg(&key)
                .arg("1")
                .arg("EX")
                .arg(ttl)
                .query_async::<_, ()>(&mut conn)
                .await
        })
        .await?;

        tracing::info!(session_id = %session_id, "session revoked");
        Ok(())
    }

    async fn is_revoked(&self, session_id: Uuid) -> Result<bool> {
        let key = registry_key(session_id);

        let mut conn = self.redis.lock().await.clone();
        let exists: bool = with_timeout(self.command_timeout, async {
            redis::cmd("EXISTS").arg(&key).query_async(&mut conn).await
        })
        .await?;

        Ok(exists)
    }
}

/// In-process registry for single-node deployments and tests.
///
/// A sharded concurrent map keyed by session id; revoked entries carry their
/// natural expiry and are evicted lazily on read.
pub struct MemoryRevocationRegistry {
    entries: DashMap<Uuid, Instant>,
    entry_ttl: Duration,
}

impl MemoryRevocationRegistry {
    pub fn new(entry_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            entry_ttl,
        }
    }
}

#[async_trait]
impl RevocationRegistry for MemoryRevocationRegistry {
    async fn revoke(&self, session_id: Uuid) -> Result<()> {
        self.entries.insert(session_id, Instant::now() + self.entry_ttl);
        tracing::info!(session_id = %session_id, "session revoked");
        Ok(())
    }

    async fn is_revoked(&self, session_id: Uuid) -> Result<bool> {
        if let Some(entry) = self.entries.get(&session_id) {
            if *entry > Instant::now() {
                return Ok(true);
            }
            drop(entry);
            self.entries.remove(&session_id);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn unknown_session_is_not_revoked() {
        let registry = MemoryRevocationRegistry::new(Duration::from_secs(60));
        assert!(!registry.is_revoked(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn revoke_is_visible_and_idempotent() {
        let registry = MemoryRevocationRegistry::new(Duration::from_secs(60));
        let sid = Uuid::new_v4();

        registry.revoke(sid).await.unwrap();
        assert!(registry.is_revoked(sid).await.unwrap());

        // Second revoke is a no-op success with the same observable effect
        registry.revoke(sid).await.unwrap();
        assert!(registry.is_revoked(sid).await.unwrap());
    }

    #[tokio::test]
    async fn entries_lapse_after_ttl() {
        let registry = MemoryRevocationRegistry::new(Duration::from_millis(10));
        let sid = Uuid::new_v4();

        registry.revoke(sid).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(!registry.is_revoked(sid).await.unwrap());
    }

    #[tokio::test]
    async fn revocation_is_visible_across_tasks() {
        let registry = Arc::new(MemoryRevocationRegistry::new(Duration::from_secs(60)));
        let sid = Uuid::new_v4();

        let writer = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.revoke(sid).await })
        };
        writer.await.unwrap().unwrap();

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.is_revoked(sid).await })
            })
            .collect();

        for reader in readers {
            assert!(reader.await.unwrap().unwrap());
        }
    }
}
