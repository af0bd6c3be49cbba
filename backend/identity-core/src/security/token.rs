//! Token issuance and verification.
//!
//! A `TokenService` owns its signing material and lifetimes; there is no
//! process-global key state. Verification checks signature, expiry, and
//! structure only; revocation is the caller's concern (access tokens are
//! intentionally never checked against the registry, so a revoked session can
//! keep using an outstanding access token until that token's own short
//! expiry).

use crate::config::JwtSettings;
use crate::error::{IdentityError, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Token kind: access tokens are short-lived and stateless; refresh tokens
/// are long-lived and bound to a session's rotation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Signed claims carried by every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Session (token family) id
    pub sid: String,
    /// Unique token id; for refresh tokens this is the session's
    /// last-used marker
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// "access" or "refresh"
    pub token_type: String,
}

impl Claims {
    pub fn subject_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| IdentityError::TokenMalformed)
    }

    pub fn session_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sid).map_err(|_| IdentityError::TokenMalformed)
    }
}

/// Access + refresh token pair returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Issues and verifies signed tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            access_ttl_secs: settings.access_ttl_secs,
            refresh_ttl_secs: settings.refresh_ttl_secs,
        }
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }

    /// Mint a short-lived access token. Stateless; never persisted.
    pub fn issue_access_token(&self, user_id: Uuid, session_id: Uuid) -> Result<String> {
        self.issue(
            TokenKind::Access,
            user_id,
            session_id,
            &Uuid::new_v4().to_string(),
            self.access_ttl_secs,
        )
    }

    /// Mint a refresh token whose `jti` the caller persists on the session
    /// as the rotation marker.
    pub fn issue_refresh_token(&self, user_id: Uuid, session_id: Uuid, jti: &str) -> Result<String> {
        self.issue(
            TokenKind::Refresh,
            user_id,
            session_id,
            jti,
            self.refresh_ttl_secs,
        )
    }

    fn issue(
        &self,
        kind: TokenKind,
        user_id: Uuid,
        session_id: Uuid,
        jti: &str,
        ttl_secs: i64,
    ) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            sid: session_id.to_string(),
            jti: jti.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + ttl_secs,
            token_type: kind.as_str().to_string(),
        };

        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Validate signature, expiry, and structure, then check the kind.
    pub fn verify(&self, token: &str, expected_kind: TokenKind) -> Result<Claims> {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        if data.claims.token_type != expected_kind.as_str() {
            return Err(IdentityError::TokenKindMismatch);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&JwtSettings {
            secret: "unit-test-signing-secret".to_string(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 2_592_000,
        })
    }

    /// TTLs in the past produce already-expired tokens.
    fn expired_service() -> TokenService {
        TokenService::new(&JwtSettings {
            secret: "unit-test-signing-secret".to_string(),
            access_ttl_secs: -120,
            refresh_ttl_secs: -120,
        })
    }

    #[test]
    fn issue_and_verify_access_token() {
        let svc = service();
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();

        let token = svc.issue_access_token(user_id, session_id).unwrap();
        assert_eq!(token.matches('.').count(), 2); // JWT has 3 parts

        let claims = svc.verify(&token, TokenKind::Access).unwrap();
        assert_eq!(claims.subject_id().unwrap(), user_id);
        assert_eq!(claims.session_id().unwrap(), session_id);
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn refresh_token_carries_the_supplied_jti() {
        let svc = service();
        let token = svc
            .issue_refresh_token(Uuid::new_v4(), Uuid::new_v4(), "marker-1")
            .unwrap();

        let claims = svc.verify(&token, TokenKind::Refresh).unwrap();
        assert_eq!(claims.jti, "marker-1");
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let svc = service();
        let token = svc
            .issue_refresh_token(Uuid::new_v4(), Uuid::new_v4(), "marker-1")
            .unwrap();

        let result = svc.verify(&token, TokenKind::Access);
        assert!(matches!(result, Err(IdentityError::TokenKindMismatch)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = expired_service();
        let token = svc
            .issue_access_token(Uuid::new_v4(), Uuid::new_v4())
            .unwrap();

        let result = service().verify(&token, TokenKind::Access);
        assert!(matches!(result, Err(IdentityError::TokenExpired)));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let svc = service();
        let token = svc
            .issue_access_token(Uuid::new_v4(), Uuid::new_v4())
            .unwrap();

        // Flip a character in the payload segment
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let mut payload: Vec<char> = parts[1].chars().collect();
        payload[0] = if payload[0] == 'A' { 'B' } else { 'A' };
        parts[1] = payload.into_iter().collect();
        let tampered = parts.join(".");

        assert!(svc.verify(&tampered, TokenKind::Access).is_err());
    }

    #[test]
    fn garbage_is_malformed() {
        let svc = service();
        let result = svc.verify("not.a.token", TokenKind::Access);
        assert!(matches!(result, Err(IdentityError::TokenMalformed)));
    }

    #[test]
    fn wrong_secret_fails_signature_check() {
        let svc = service();
        let other = TokenService::new(&JwtSettings {
            secret: "a-different-secret".to_string(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 2_592_000,
        });

        let token = svc
            .issue_access_token(Uuid::new_v4(), Uuid::new_v4())
            .unwrap();

        let result = other.verify(&token, TokenKind::Access);
        assert!(matches!(result, Err(IdentityError::SignatureInvalid)));
    }
}
