//! Configuration for the identity core
//!
//! Loads settings from environment variables, with a `.env` file for local
//! development. Token lifetimes and password policy are configurable; the
//! defaults below are conventional, not contractual.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Identity core settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub redis: RedisSettings,
    pub jwt: JwtSettings,
    pub password: PasswordSettings,
}

impl Settings {
    pub fn load() -> Result<Self> {
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
        }

        Ok(Settings {
            database: DatabaseSettings::from_env()?,
            redis: RedisSettings::from_env()?,
            jwt: JwtSettings::from_env()?,
            password: PasswordSettings::from_env()?,
        })
    }
}

/// Database connection settings
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    /// Deadline applied to every storage call issued by this core.
    pub operation_timeout_secs: u64,
}

impl DatabaseSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,
            operation_timeout_secs: env::var("DATABASE_OPERATION_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid DATABASE_OPERATION_TIMEOUT_SECS")?,
        })
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

/// Redis settings for the revocation registry
#[derive(Debug, Clone)]
pub struct RedisSettings {
    pub url: String,
    pub command_timeout_secs: u64,
}

impl RedisSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("REDIS_URL").context("REDIS_URL must be set")?,
            command_timeout_secs: env::var("REDIS_COMMAND_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid REDIS_COMMAND_TIMEOUT_SECS")?,
        })
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Token signing settings
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl JwtSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            // 15 minutes
            access_ttl_secs: env::var("JWT_ACCESS_TTL_SECS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()
                .context("Invalid JWT_ACCESS_TTL_SECS")?,
            // 30 days
            refresh_ttl_secs: env::var("JWT_REFRESH_TTL_SECS")
                .unwrap_or_else(|_| "2592000".to_string())
                .parse()
                .context("Invalid JWT_REFRESH_TTL_SECS")?,
        })
    }
}

/// Password hashing and policy settings
#[derive(Debug, Clone)]
pub struct PasswordSettings {
    pub min_length: usize,
    /// Deadline for a single Argon2 hash or verification.
    pub hash_timeout_secs: u64,
}

impl PasswordSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            min_length: env::var("PASSWORD_MIN_LENGTH")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .context("Invalid PASSWORD_MIN_LENGTH")?,
            hash_timeout_secs: env::var("PASSWORD_HASH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid PASSWORD_HASH_TIMEOUT_SECS")?,
        })
    }

    pub fn hash_timeout(&self) -> Duration {
        Duration::from_secs(self.hash_timeout_secs)
    }
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            min_length: 8,
            hash_timeout_secs: 5,
        }
    }
}
