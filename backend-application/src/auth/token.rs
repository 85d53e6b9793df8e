use anyhow::anyhow;
use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use thiserror::Error;

use crate::AppError;

const TOKEN_PREFIX: &str = "rollcall";
const TOKEN_VERSION: &str = "v1";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

/// Stateless bearer tokens: `rollcall.v1.<hex email>.<expiry secs>.<hex hmac>`.
/// There is no revocation list; a token is valid until it expires.
pub struct TokenSigner {
    secret: String,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: impl Into<String>, ttl_minutes: u64) -> Self {
        let minutes = i64::try_from(ttl_minutes).unwrap_or(i64::MAX / 60_000);
        Self {
            secret: secret.into(),
            ttl: Duration::minutes(minutes),
        }
    }

    pub fn issue(&self, email: &str) -> Result<IssuedToken, AppError> {
        self.issue_at(email, Utc::now())
    }

    pub fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<IssuedToken, AppError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal(anyhow!("token expiry out of range")))?;
        let expiry = expires_at.timestamp();
        let signature = self
            .sign(email, expiry)
            .map_err(|_| AppError::Internal(anyhow!("hmac init failed")))?;
        let access_token = format!(
            "{}.{}.{}.{}.{}",
            TOKEN_PREFIX,
            TOKEN_VERSION,
            encode_hex(email.as_bytes()),
            expiry,
            encode_hex(&signature)
        );
        Ok(IssuedToken {
            access_token,
            token_type: "bearer".to_string(),
            expires_at,
        })
    }

    /// Returns the email claim of a well-signed, unexpired token.
    pub fn validate(&self, token: &str) -> Result<String, TokenError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let parts = token.trim().split('.').collect::<Vec<_>>();
        let [prefix, version, email_hex, expiry, signature_hex] = parts.as_slice() else {
            return Err(TokenError::Invalid);
        };
        if *prefix != TOKEN_PREFIX || *version != TOKEN_VERSION {
            return Err(TokenError::Invalid);
        }
        let email = decode_hex(email_hex)
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or(TokenError::Invalid)?;
        let expiry = expiry.parse::<i64>().map_err(|_| TokenError::Invalid)?;
        let signature = decode_hex(signature_hex).ok_or(TokenError::Invalid)?;

        let mut mac = self.mac().map_err(|_| TokenError::Invalid)?;
        mac.update(signing_payload(&email, expiry).as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::Invalid)?;

        let expires_at = Utc
            .timestamp_opt(expiry, 0)
            .single()
            .ok_or(TokenError::Invalid)?;
        if now >= expires_at {
            return Err(TokenError::Expired);
        }
        Ok(email)
    }

    fn sign(&self, email: &str, expiry: i64) -> Result<Vec<u8>, hmac::digest::InvalidLength> {
        let mut mac = self.mac()?;
        mac.update(signing_payload(email, expiry).as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn mac(&self) -> Result<HmacSha256, hmac::digest::InvalidLength> {
        HmacSha256::new_from_slice(self.secret.as_bytes())
    }
}

fn signing_payload(email: &str, expiry: i64) -> String {
    format!("{}|{}|{}|{}", TOKEN_PREFIX, TOKEN_VERSION, email, expiry)
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

fn decode_hex(value: &str) -> Option<Vec<u8>> {
    if value.len() % 2 != 0 || !value.is_ascii() {
        return None;
    }
    (0..value.len())
        .step_by(2)
        .map(|idx| u8::from_str_radix(&value[idx..idx + 2], 16).ok())
        .collect()
}
