/// Password hashing and verification using Argon2id
use crate::config::PasswordSettings;
use crate::db::AccountStore;
use crate::error::{IdentityError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use zxcvbn::zxcvbn;

/// Outcome of a password check against a stored credential.
///
/// `NoSuchUser` and `Mismatch` exist so the embedding service can collapse
/// them into one uniform `AuthenticationFailed` deliberately rather than by
/// accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordVerdict {
    Match,
    Mismatch,
    NoSuchUser,
}

/// Reference hash verified against when the account does not exist, so the
/// missing-user path costs the same Argon2 work as a mismatch.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    hash_password_unchecked("quill-credential-padding").expect("hashing a fixed string succeeds")
});

/// Hash a password with a fresh random salt, enforcing the strength policy.
///
/// Returns a PHC-formatted string safe for database storage; the algorithm
/// tag, cost parameters, and salt all ride along in it.
pub fn hash_password(password: &str, min_length: usize) -> Result<String> {
    validate_password_strength(password, min_length)?;
    hash_password_unchecked(password)
}

fn hash_password_unchecked(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| IdentityError::Internal(format!("password hashing failed: {}", e)))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against its stored PHC hash.
///
/// The comparison inside Argon2 is constant-time; a malformed stored hash is
/// an internal error, never a `Mismatch`.
pub fn verify_password_hash(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| IdentityError::Internal(format!("invalid password hash format: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(IdentityError::Internal(format!(
            "password verification failed: {}",
            e
        ))),
    }
}

/// Validate password strength using composition rules and zxcvbn.
fn validate_password_strength(password: &str, min_length: usize) -> Result<()> {
    if password.len() < min_length {
        return Err(IdentityError::WeakPassword(format!(
            "password must be at least {} characters",
            min_length
        )));
    }

    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if !has_uppercase {
        return Err(IdentityError::WeakPassword(
            "password must contain at least one uppercase letter".to_string(),
        ));
    }

    if !has_lowercase {
        return Err(IdentityError::WeakPassword(
            "password must contain at least one lowercase letter".to_string(),
        ));
    }

    if !has_digit {
        return Err(IdentityError::WeakPassword(
            "password must contain at least one digit".to_string(),
        ));
    }

    if !has_special {
        return Err(IdentityError::WeakPassword(
            "password must contain at least one special character".to_string(),
        ));
    }

    let entropy = zxcvbn(password, &[])
        .map_err(|e| IdentityError::Internal(format!("password entropy calculation failed: {}", e)))?;

    if entropy.score() < 3 {
        return Err(IdentityError::WeakPassword(
            "password is too predictable".to_string(),
        ));
    }

    Ok(())
}

/// Owns credential writes and checks against the account store.
///
/// Argon2 is deliberately slow, so both operations run on the blocking pool
/// under the configured deadline; deadline expiry reports `Unavailable`.
#[derive(Clone)]
pub struct CredentialStore {
    accounts: Arc<dyn AccountStore>,
    settings: PasswordSettings,
}

impl CredentialStore {
    pub fn new(accounts: Arc<dyn AccountStore>, settings: PasswordSettings) -> Self {
        Self { accounts, settings }
    }

    /// Replace the user's credential wholesale with a hash of `plaintext`.
    pub async fn set_password(&self, user_id: Uuid, plaintext: &str) -> Result<()> {
        let password = plaintext.to_string();
        let min_length = self.settings.min_length;
        let phc = run_hashing(self.settings.hash_timeout(), move || {
            hash_password(&password, min_length)
        })
        .await?;

        self.accounts.set_password_hash(user_id, &phc).await
    }

    /// Check `plaintext` against the stored credential.
    ///
    /// When the account is missing, a verification against a fixed reference
    /// hash runs anyway so the timing profile matches the mismatch path.
    pub async fn verify_password(&self, user_id: Uuid, plaintext: &str) -> Result<PasswordVerdict> {
        let stored = self
            .accounts
            .find_by_id(user_id)
            .await?
            .map(|account| account.password_hash);

        self.verify_against(stored, plaintext).await
    }

    pub(crate) async fn verify_against(
        &self,
        stored_hash: Option<String>,
        plaintext: &str,
    ) -> Result<PasswordVerdict> {
        let password = plaintext.to_string();
        let deadline = self.settings.hash_timeout();

        match stored_hash {
            Some(phc) => {
                let matched =
                    run_hashing(deadline, move || verify_password_hash(&password, &phc)).await?;
                if matched {
                    Ok(PasswordVerdict::Match)
                } else {
                    Ok(PasswordVerdict::Mismatch)
                }
            }
            None => {
                let _ = run_hashing(deadline, move || {
                    verify_password_hash(&password, &DUMMY_HASH)
                })
                .await?;
                Ok(PasswordVerdict::NoSuchUser)
            }
        }
    }
}

async fn run_hashing<T, F>(deadline: Duration, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(f);
    match tokio::time::timeout(deadline, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(IdentityError::Internal(format!(
            "hashing task failed: {}",
            join_err
        ))),
        Err(_) => Err(IdentityError::Unavailable),
    }
}
