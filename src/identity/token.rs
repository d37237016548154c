//! Credential token decoding.
//!
//! The backend issues compact JWTs (`header.payload.signature`). The client
//! never verifies the signature; it only reads the claims it needs to know who
//! is logged in. A token that fails any step here is treated as absent.

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

use super::principal::{Identity, Role};
use crate::error::AppError;

pub type CredentialToken = String;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is empty")]
    Empty,
    #[error("token has {0} segments, expected 3")]
    Segments(usize),
    #[error("token payload is not base64url")]
    Base64,
    #[error("token payload is not a JSON claims object: {0}")]
    Claims(String),
    #[error("token expired at {exp}")]
    Expired { exp: i64 },
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        let code = match err {
            TokenError::Empty | TokenError::Segments(_) | TokenError::Base64 => "malformed_token",
            TokenError::Claims(_) => "invalid_claims",
            TokenError::Expired { .. } => "expired_token",
        };
        AppError::Decode { code: code.into(), message: err.to_string() }
    }
}

/// Claims the client cares about. Unknown claims are ignored; an unknown role
/// fails deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub exp: Option<i64>,
}

fn decode_segment(seg: &str) -> Result<Vec<u8>, TokenError> {
    // Issuers differ on padding; accept both forms
    URL_SAFE_NO_PAD
        .decode(seg)
        .or_else(|_| URL_SAFE.decode(seg))
        .map_err(|_| TokenError::Base64)
}

/// Decode the claims of `token` without checking expiry.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::Empty);
    }
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::Segments(parts.len()));
    }
    let payload = decode_segment(parts[1])?;
    serde_json::from_slice::<Claims>(&payload).map_err(|e| TokenError::Claims(e.to_string()))
}

/// Decode `token` into an identity, rejecting tokens whose `exp` is not in the
/// future relative to `now` (seconds since epoch).
pub fn decode_identity_at(token: &str, now: i64) -> Result<Identity, TokenError> {
    let claims = decode_claims(token)?;
    if let Some(exp) = claims.exp {
        if exp <= now {
            return Err(TokenError::Expired { exp });
        }
    }
    Ok(Identity { username: claims.username, role: claims.role })
}

pub fn decode_identity(token: &str) -> Result<Identity, TokenError> {
    decode_identity_at(token, chrono::Utc::now().timestamp())
}
