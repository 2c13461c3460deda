// Shared domain types, wire protocol, and session identity for GigChat.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod session;
pub mod types;

pub use error::SessionError;
pub use protocol::{ChatMessage, Conversation, OutboundFrame};
pub use session::Session;
pub use types::{ConversationId, JobId, MessageId, UserId};
