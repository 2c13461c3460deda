use thiserror::Error;

/// Errors raised while establishing or restoring a session identity.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No access token was provided.
    #[error("Missing access token")]
    MissingToken,

    /// The stored user id is not a number.
    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    /// The access token has expired (or is too malformed to tell).
    #[error("Access token expired")]
    Expired,
}
