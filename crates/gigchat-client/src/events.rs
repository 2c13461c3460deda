//! Ordered events emitted by the messaging core.
//!
//! Presentation layers subscribe to the receiver handed out by
//! [`ChatClient::new`](crate::client::ChatClient::new) instead of hooking
//! callbacks into the networking layer.

use tokio::sync::mpsc;

use gigchat_shared::protocol::ChatMessage;
use gigchat_shared::types::ConversationId;

#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// The conversation directory was (re)loaded.
    ConversationsLoaded { count: usize },
    /// A conversation was selected.
    ConversationOpened(ConversationId),
    /// The selection was cleared.
    ConversationClosed,
    /// The selected conversation's history replaced the timeline.
    HistoryLoaded {
        conversation_id: ConversationId,
        count: usize,
    },
    /// An inbound frame was appended to the timeline.
    MessageReceived(ChatMessage),
    /// The live stream is connected and ready for sends.
    StreamOpened(ConversationId),
    /// The live stream is gone; reselecting is the only recovery.
    StreamClosed(ConversationId),
    /// A user-visible error was recorded.
    Error(String),
}

pub type EventSender = mpsc::UnboundedSender<ChatEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ChatEvent>;

pub(crate) fn emit(events: &EventSender, event: ChatEvent) {
    if events.send(event).is_err() {
        tracing::debug!("Event receiver dropped, discarding event");
    }
}
