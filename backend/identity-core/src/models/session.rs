/// Session model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One session (token family) per login.
///
/// `refresh_jti` is the monotonically advancing last-used marker: exactly one
/// refresh token per session carries the current value, and rotation swaps it
/// atomically. A presented refresh token whose `jti` no longer matches is a
/// replay.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_jti: String,
    pub created_at: DateTime<Utc>,
    pub last_rotated_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user_id: Uuid, refresh_jti: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            refresh_jti,
            created_at: now,
            last_rotated_at: now,
            revoked_at: None,
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

/// Result of the atomic rotation step on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationOutcome {
    /// The last-used marker matched and was advanced; exactly one of any
    /// concurrent rotation attempts observes this.
    Rotated,
    /// The marker had already moved on: the presented refresh token was used
    /// before. Evidence of theft; the whole session must be revoked.
    ReplayDetected,
    /// The session was already revoked.
    SessionRevoked,
    /// No such session.
    SessionMissing,
}
