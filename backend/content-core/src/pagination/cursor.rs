//! Opaque pagination cursors.
//!
//! A cursor is a versioned, HMAC-signed encoding of the query-signature
//! fingerprint and the last-seen ordering key:
//!
//! `base64("v1:<fingerprint>:<timestamp_micros>:<id>:<hmac_hex>")`
//!
//! Clients must treat the token as opaque. Tampering, truncation, or replay
//! under a different filter/sort shape all fail structurally with
//! `InvalidCursor`; decode never guesses.

use super::QuerySignature;
use crate::error::{ContentError, Result};
use crate::models::PageKey;
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const CURSOR_VERSION: &str = "v1";

/// Encodes and decodes signed cursors.
#[derive(Clone)]
pub struct CursorCodec {
    secret: Vec<u8>,
}

impl CursorCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    /// Encode an ordering key, bound to the query shape it was read under.
    pub fn encode(&self, key: &PageKey, signature: &QuerySignature) -> String {
        let payload = format!(
            "{}:{}:{}:{}",
            CURSOR_VERSION,
            signature.fingerprint(),
            key.created_at.timestamp_micros(),
            key.id
        );
        let mac = self.compute_mac(&payload);
        general_purpose::STANDARD.encode(format!("{}:{}", payload, hex::encode(mac)))
    }

    /// Recover the ordering key, rejecting anything not issued for exactly
    /// this query shape.
    pub fn decode(&self, token: &str, signature: &QuerySignature) -> Result<PageKey> {
        let decoded = general_purpose::STANDARD
            .decode(token)
            .map_err(|_| ContentError::InvalidCursor)?;
        let cursor_str = String::from_utf8(decoded).map_err(|_| ContentError::InvalidCursor)?;

        let parts: Vec<&str> = cursor_str.split(':').collect();
        let [version, fingerprint, micros, id, mac_hex] = parts.as_slice() else {
            return Err(ContentError::InvalidCursor);
        };

        if *version != CURSOR_VERSION {
            return Err(ContentError::InvalidCursor);
        }

        // A cursor issued under a different filter/sort combination would
        // silently land the client on a wrong page; reject it instead.
        if *fingerprint != signature.fingerprint() {
            return Err(ContentError::InvalidCursor);
        }

        let payload = format!("{}:{}:{}:{}", version, fingerprint, micros, id);
        let mac_bytes = hex::decode(mac_hex).map_err(|_| ContentError::InvalidCursor)?;
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| ContentError::Internal(format!("HMAC error: {}", e)))?;
        mac.update(payload.as_bytes());
        // verify_slice is constant-time
        mac.verify_slice(&mac_bytes)
            .map_err(|_| ContentError::InvalidCursor)?;

        let micros: i64 = micros.parse().map_err(|_| ContentError::InvalidCursor)?;
        let created_at =
            chrono::DateTime::from_timestamp_micros(micros).ok_or(ContentError::InvalidCursor)?;
        let id = Uuid::parse_str(id).map_err(|_| ContentError::InvalidCursor)?;

        Ok(PageKey { created_at, id })
    }

    fn compute_mac(&self, payload: &str) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}
