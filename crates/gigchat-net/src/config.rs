//! Client network configuration loaded from environment variables.
//!
//! Both endpoints default to a local backend so the client runs with zero
//! configuration for development.

use gigchat_shared::constants::{DEFAULT_API_URL, DEFAULT_WS_URL};
use gigchat_shared::types::ConversationId;

/// Endpoint configuration for the REST API and the chat stream.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API.
    /// Env: `GIGCHAT_API_URL`
    /// Default: `http://localhost:8000`
    pub api_url: String,

    /// Base URL of the WebSocket endpoint.
    /// Env: `GIGCHAT_WS_URL`
    /// Default: `ws://localhost:8000`
    pub ws_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("GIGCHAT_API_URL") {
            if url.trim().is_empty() {
                tracing::warn!("Empty GIGCHAT_API_URL, using default");
            } else {
                config.api_url = normalize(&url);
            }
        }

        if let Ok(url) = std::env::var("GIGCHAT_WS_URL") {
            if url.trim().is_empty() {
                tracing::warn!("Empty GIGCHAT_WS_URL, using default");
            } else {
                config.ws_url = normalize(&url);
            }
        }

        config
    }

    /// `GET` endpoint listing the current user's conversations.
    pub fn conversations_url(&self) -> String {
        format!("{}/conversations", self.api_url)
    }

    /// `GET` endpoint for a conversation's persisted message history.
    pub fn messages_url(&self, conversation: ConversationId) -> String {
        format!("{}/conversations/{}/messages", self.api_url, conversation)
    }

    /// WebSocket endpoint for a conversation's live stream.
    pub fn chat_stream_url(&self, conversation: ConversationId) -> String {
        format!("{}/ws/chat/{}", self.ws_url, conversation)
    }
}

fn normalize(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
