//! Login, refresh, and logout flows.
//!
//! The service wires the credential store, token service, session store, and
//! revocation registry together. Nothing here retries internally: a timed-out
//! password check or rotation surfaces as `Unavailable`, and retry policy
//! belongs to the caller.

use crate::db::{AccountStore, SessionStore};
use crate::error::{IdentityError, Result};
use crate::models::{RotationOutcome, Session};
use crate::revocation::RevocationRegistry;
use crate::security::{Claims, CredentialStore, PasswordVerdict, TokenKind, TokenPair, TokenService};
use std::sync::Arc;
use uuid::Uuid;

pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<dyn SessionStore>,
    revocations: Arc<dyn RevocationRegistry>,
    credentials: CredentialStore,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        sessions: Arc<dyn SessionStore>,
        revocations: Arc<dyn RevocationRegistry>,
        credentials: CredentialStore,
        tokens: TokenService,
    ) -> Self {
        Self {
            accounts,
            sessions,
            revocations,
            credentials,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Authenticate a username/password pair and open a new session.
    ///
    /// Unknown user, wrong password, and disabled account all surface as the
    /// same `AuthenticationFailed`, and all three walk the same Argon2
    /// verification path first.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair> {
        let account = self.accounts.find_by_username(username).await?;

        let stored_hash = account.as_ref().map(|a| a.password_hash.clone());
        let verdict = self.credentials.verify_against(stored_hash, password).await?;

        let account = match (verdict, account) {
            (PasswordVerdict::Match, Some(account)) if account.is_active() => account,
            _ => return Err(IdentityError::AuthenticationFailed),
        };

        let refresh_jti = Uuid::new_v4().to_string();
        let session = Session::new(account.id, refresh_jti.clone());
        self.sessions.create(&session).await?;

        tracing::info!(user_id = %account.id, session_id = %session.id, "login succeeded");

        self.issue_pair(account.id, session.id, &refresh_jti)
    }

    /// Rotate a refresh token: same session, new token generation.
    ///
    /// Verification, the revocation check, and the atomic marker swap run in
    /// that order. A marker mismatch on a live session means the presented
    /// token was already rotated once, the standard signature of a stolen
    /// refresh token, so the whole session is revoked before the error is
    /// reported.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;
        let session_id = claims.session_id()?;
        let user_id = claims.subject_id()?;

        if self.revocations.is_revoked(session_id).await? {
            return Err(IdentityError::SessionRevoked);
        }

        let next_jti = Uuid::new_v4().to_string();
        let outcome = self
            .sessions
            .advance_rotation(session_id, &claims.jti, &next_jti)
            .await?;

        match outcome {
            RotationOutcome::Rotated => self.issue_pair(user_id, session_id, &next_jti),
            RotationOutcome::ReplayDetected => {
                tracing::warn!(
                    user_id = %user_id,
                    session_id = %session_id,
                    "refresh token reuse detected, revoking session"
                );
                self.sessions.mark_revoked(session_id).await?;
                self.revocations.revoke(session_id).await?;
                Err(IdentityError::ReuseDetected)
            }
            RotationOutcome::SessionRevoked | RotationOutcome::SessionMissing => {
                Err(IdentityError::SessionRevoked)
            }
        }
    }

    /// Revoke the session behind a refresh token. Idempotent; a token that
    /// has already expired is a no-op success, since it can never verify
    /// again anyway.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let claims = match self.tokens.verify(refresh_token, TokenKind::Refresh) {
            Ok(claims) => claims,
            Err(IdentityError::TokenExpired) => return Ok(()),
            Err(err) => return Err(err),
        };

        let session_id = claims.session_id()?;
        self.sessions.mark_revoked(session_id).await?;
        self.revocations.revoke(session_id).await?;

        Ok(())
    }

    /// Gate a request on an access token.
    ///
    /// Deliberately does not consult the revocation registry: an access
    /// token outlives its session's revocation by at most its own short TTL.
    pub fn authenticate(&self, access_token: &str) -> Result<Claims> {
        self.tokens.verify(access_token, TokenKind::Access)
    }

    fn issue_pair(&self, user_id: Uuid, session_id: Uuid, refresh_jti: &str) -> Result<TokenPair> {
        let access_token = self.tokens.issue_access_token(user_id, session_id)?;
        let refresh_token = self
            .tokens
            .issue_refresh_token(user_id, session_id, refresh_jti)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.access_ttl_secs(),
        })
    }
}
