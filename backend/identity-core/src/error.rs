use thiserror::Error;

pub type Result<T> = std::result::Result<T, IdentityError>;

/// Error taxonomy for the identity core.
///
/// Credential failures are deliberately uniform: callers never learn whether
/// the account exists. `ReuseDetected` carries the same caller-facing message
/// as `SessionRevoked`; the distinction exists so the revocation side effect
/// is observable to the embedding service and its tests.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid credentials")]
    AuthenticationFailed,

    #[error("password too weak: {0}")]
    WeakPassword(String),

    #[error("malformed token")]
    TokenMalformed,

    #[error("invalid token signature")]
    SignatureInvalid,

    #[error("token expired")]
    TokenExpired,

    #[error("unexpected token kind")]
    TokenKindMismatch,

    #[error("session revoked")]
    SessionRevoked,

    #[error("session revoked")]
    ReuseDetected,

    #[error("permission denied")]
    PermissionDenied,

    #[error("storage unavailable")]
    Unavailable,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Only collaborator outages are eligible for caller-level retry.
    /// Everything else is terminal for the current request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, IdentityError::Unavailable | IdentityError::Storage(_))
    }
}

// Conversions from external error types

impl From<sqlx::Error> for IdentityError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("database error: {}", err);
        match err {
            sqlx::Error::PoolTimedOut => IdentityError::Unavailable,
            other => IdentityError::Storage(other.to_string()),
        }
    }
}

impl From<redis::RedisError> for IdentityError {
    fn from(err: redis::RedisError) -> Self {
        tracing::error!("redis error: {}", err);
        if err.is_timeout() || err.is_io_error() {
            IdentityError::Unavailable
        } else {
            IdentityError::Storage(err.to_string())
        }
    }
}

impl From<jsonwebtoken::errors::Error> for IdentityError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => IdentityError::TokenExpired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName => IdentityError::SignatureInvalid,
            _ => IdentityError::TokenMalformed,
        }
    }
}
