use identity_core::IdentityError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContentError>;

/// Error taxonomy for the content core.
///
/// Cursor problems are always rejected, never silently clamped; a stale
/// cursor replayed against a different query shape is `InvalidCursor`, not a
/// wrong page.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("invalid cursor")]
    InvalidCursor,

    #[error("invalid limit")]
    InvalidLimit,

    #[error("permission denied")]
    PermissionDenied,

    #[error("content not found")]
    NotFound,

    #[error("storage unavailable")]
    Unavailable,

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ContentError {
    /// Only collaborator outages are eligible for caller-level retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ContentError::Unavailable | ContentError::Storage(_) => true,
            ContentError::Identity(inner) => inner.is_retryable(),
            _ => false,
        }
    }
}

impl From<sqlx::Error> for ContentError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("database error: {}", err);
        match err {
            sqlx::Error::PoolTimedOut => ContentError::Unavailable,
            other => ContentError::Storage(other.to_string()),
        }
    }
}
