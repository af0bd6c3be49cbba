use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User account - core identity entity.
///
/// `password_hash` holds a single PHC-formatted credential (algorithm, cost,
/// salt, and digest in one string); replacing it replaces the credential
/// wholesale. Accounts are disabled, never hard-deleted, while content still
/// references them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAccount {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn is_active(&self) -> bool {
        !self.disabled
    }
}
