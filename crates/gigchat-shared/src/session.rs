//! Session identity: the authenticated user's token and numeric id.
//!
//! The session is an explicit value handed to the messaging core, never a
//! process-wide global. It is created at sign-in (or restored from stored
//! credentials), read-only afterwards, and re-checked for expiry before
//! every network operation.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chrono::Utc;
use serde::Deserialize;

use crate::error::SessionError;
use crate::types::UserId;

/// An authenticated session: bearer token plus the user's numeric id.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    pub user_id: UserId,
}

/// The only claim the client reads out of the access token.
#[derive(Deserialize)]
struct Claims {
    exp: i64,
}

impl Session {
    /// Create a session from freshly issued credentials.
    pub fn new(token: impl Into<String>, user_id: UserId) -> Result<Self, SessionError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SessionError::MissingToken);
        }
        Ok(Self { token, user_id })
    }

    /// Restore a session from stored credentials (both kept as strings by
    /// whoever persists them). Rejects non-numeric user ids and tokens that
    /// are already expired, so a restored session is immediately usable.
    pub fn restore(token: &str, user_id: &str) -> Result<Self, SessionError> {
        let user_id = user_id
            .trim()
            .parse::<i64>()
            .map_err(|_| SessionError::InvalidUserId(user_id.to_string()))?;
        let session = Self::new(token, UserId(user_id))?;
        if session.is_expired() {
            return Err(SessionError::Expired);
        }
        Ok(session)
    }

    /// The bearer token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether the token's `exp` claim is in the past.
    ///
    /// A token whose payload cannot be decoded counts as expired: the
    /// backend would reject it anyway, and treating it as dead keeps the
    /// sign-in-required path deterministic.
    pub fn is_expired(&self) -> bool {
        match token_expiry(&self.token) {
            Some(exp) => Utc::now().timestamp() >= exp,
            None => true,
        }
    }
}

/// Extract the `exp` claim (Unix seconds) from a JWT-shaped token.
fn token_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    // Tokens are minted base64url without padding; tolerate the standard
    // alphabet too since that is what some issuers emit.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD.decode(payload))
        .ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    Some(claims.exp)
}
