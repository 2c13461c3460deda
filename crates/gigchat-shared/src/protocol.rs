use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ConversationId, JobId, MessageId, UserId};

/// A conversation between a client and a freelancer, optionally tied to a job.
///
/// The backend only guarantees the `id`; the participant fields vary by
/// endpoint version, so everything else is optional. Once an id is known it
/// alone addresses the history and stream endpoints — the (job, counterpart)
/// pair is used purely to discover a conversation from navigation params.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub id: ConversationId,
    pub job_id: Option<JobId>,
    pub client_id: Option<UserId>,
    pub freelancer_id: Option<UserId>,
    pub other_user_id: Option<UserId>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Conversation {
    /// Resolve the participant a message from `me` should be addressed to.
    ///
    /// When both role ids are known the recipient is whichever of the two is
    /// not `me`; otherwise the generic counterpart id is used if present.
    pub fn counterpart_of(&self, me: UserId) -> Option<UserId> {
        if let (Some(client), Some(freelancer)) = (self.client_id, self.freelancer_id) {
            return Some(if client == me { freelancer } else { client });
        }
        self.other_user_id
    }

    /// Whether `user` appears in the client/freelancer participant pair.
    pub fn has_participant(&self, user: UserId) -> bool {
        self.client_id == Some(user) || self.freelancer_id == Some(user)
    }
}

/// A single chat message as delivered by the backend.
///
/// Two wire spellings exist: persisted history rows use snake_case ids
/// (`conversation_id`, `sender_id`, `receiver_id`) while frames echoed over
/// the live stream carry the compact spellings the client itself sends
/// (`conversationid`, `senderid`, `receiverid`) and no message id, since the
/// echo happens before persistence. The aliases accept both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: Option<MessageId>,
    #[serde(alias = "conversationid")]
    pub conversation_id: Option<ConversationId>,
    #[serde(alias = "senderid")]
    pub sender_id: UserId,
    #[serde(alias = "receiverid")]
    pub receiver_id: Option<UserId>,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Parse one inbound stream frame or history row.
    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }
}

/// The client-to-server frame written to an open chat stream.
///
/// Field names are the exact wire spellings the backend broadcasts back out
/// verbatim; `sent_at` is stamped by the sending client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboundFrame {
    #[serde(rename = "conversationid")]
    pub conversation_id: ConversationId,
    #[serde(rename = "senderid")]
    pub sender_id: UserId,
    #[serde(rename = "receiverid")]
    pub receiver_id: Option<UserId>,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl OutboundFrame {
    /// Serialize for the wire.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
