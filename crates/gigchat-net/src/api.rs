//! REST API client for the conversation directory and message history.
//!
//! Every request carries the session's bearer token. Failures collapse into
//! [`ApiError`]; the caller decides how to surface them.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use gigchat_shared::protocol::{ChatMessage, Conversation};
use gigchat_shared::session::Session;
use gigchat_shared::types::ConversationId;

use crate::config::ClientConfig;

/// Errors produced by the API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure or a response body that did not decode.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),
}

/// Thin wrapper over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch the conversations visible to the current user, in server order.
    pub async fn list_conversations(
        &self,
        session: &Session,
    ) -> Result<Vec<Conversation>, ApiError> {
        let conversations: Vec<Conversation> = self
            .get_json(self.config.conversations_url(), session)
            .await?;
        debug!(count = conversations.len(), "Fetched conversation list");
        Ok(conversations)
    }

    /// Fetch the persisted message history of one conversation, in server order.
    pub async fn conversation_messages(
        &self,
        session: &Session,
        conversation: ConversationId,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        let messages: Vec<ChatMessage> = self
            .get_json(self.config.messages_url(conversation), session)
            .await?;
        debug!(
            conversation = %conversation,
            count = messages.len(),
            "Fetched message history"
        );
        Ok(messages)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        session: &Session,
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .get(&url)
            .bearer_auth(session.token())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        Ok(response.json::<T>().await?)
    }
}
