use thiserror::Error;

use gigchat_net::ApiError;

/// User-visible failures of the messaging core.
///
/// The `Display` strings are exactly what the presentation layer shows, so
/// they double as the fixed error messages; underlying causes stay attached
/// as sources for logging.
#[derive(Debug, Error)]
pub enum ChatError {
    /// No session, or the token has expired. Terminal until sign-in.
    #[error("You are not logged in. Please log in to view your inbox.")]
    NotAuthenticated,

    /// The conversation directory could not be fetched.
    #[error("Could not load your conversations.")]
    Conversations(#[source] ApiError),

    /// The message history could not be fetched.
    #[error("Could not load messages.")]
    History(#[source] ApiError),

    /// A send was attempted with no open, ready stream.
    #[error("Real-time connection not established.")]
    StreamUnavailable,

    /// The draft exceeds the backend's content limit.
    #[error("Message must be less than 1000 characters")]
    ContentTooLong,
}
