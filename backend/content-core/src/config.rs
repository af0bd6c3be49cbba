//! Configuration for the content core

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Content core settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub pagination: PaginationSettings,
    pub storage: StorageSettings,
}

impl Settings {
    pub fn load() -> Result<Self> {
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
        }

        Ok(Settings {
            pagination: PaginationSettings::from_env()?,
            storage: StorageSettings::from_env()?,
        })
    }
}

/// Pagination limits and cursor signing material
#[derive(Debug, Clone)]
pub struct PaginationSettings {
    /// Secret for the cursor HMAC. Rotating it invalidates outstanding
    /// cursors, which clients recover from by restarting the listing.
    pub cursor_secret: String,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl PaginationSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            cursor_secret: env::var("CURSOR_SECRET").context("CURSOR_SECRET must be set")?,
            default_page_size: env::var("PAGE_SIZE_DEFAULT")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("Invalid PAGE_SIZE_DEFAULT")?,
            max_page_size: env::var("PAGE_SIZE_MAX")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .context("Invalid PAGE_SIZE_MAX")?,
        })
    }
}

/// Blob storage settings
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub bucket: String,
    pub presign_ttl_secs: u64,
    pub operation_timeout_secs: u64,
}

impl StorageSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            bucket: env::var("S3_BUCKET").unwrap_or_else(|_| "quill-media".to_string()),
            presign_ttl_secs: env::var("S3_PRESIGN_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .context("Invalid S3_PRESIGN_TTL_SECS")?,
            operation_timeout_secs: env::var("S3_OPERATION_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid S3_OPERATION_TIMEOUT_SECS")?,
        })
    }

    pub fn presign_ttl(&self) -> Duration {
        Duration::from_secs(self.presign_ttl_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}
