// Network boundary: REST API client and the chat stream task.

pub mod api;
pub mod config;
pub mod stream;

pub use api::{ApiClient, ApiError};
pub use config::ClientConfig;
pub use stream::{spawn_chat_stream, StreamCommand, StreamNotification};
