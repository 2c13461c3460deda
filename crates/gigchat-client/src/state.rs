//! Client state shared between the command surface and the stream bridge.
//!
//! [`ChatState`] is wrapped in `Arc<tokio::sync::Mutex<_>>`; the selected
//! conversation, its timeline, and the single stream handle are replaced as
//! a unit on every selection change, never left mixed.

use tokio::sync::mpsc;

use gigchat_net::StreamCommand;
use gigchat_shared::protocol::{ChatMessage, Conversation};
use gigchat_shared::types::ConversationId;

/// Handle to the one live chat stream task, scoped to the selected
/// conversation.
#[derive(Debug)]
pub struct StreamHandle {
    /// The conversation this stream is addressed to.
    pub conversation_id: ConversationId,

    /// Generation counter distinguishing this stream from any earlier one
    /// opened for the same conversation.
    pub(crate) seq: u64,

    /// Whether the connection is established and accepts sends.
    pub ready: bool,

    /// Sender half of the stream task's command channel.
    pub(crate) cmd_tx: mpsc::Sender<StreamCommand>,
}

/// Central messaging state.
#[derive(Debug)]
pub struct ChatState {
    /// Conversations visible to the current user, in server order.
    pub conversations: Vec<Conversation>,

    /// The currently open conversation, if any. Drives history loading and
    /// stream setup/teardown.
    pub selected: Option<Conversation>,

    /// Timeline of the selected conversation: history followed by live
    /// frames in receipt order. Append-only between selection changes.
    pub timeline: Vec<ChatMessage>,

    /// The user's composed-but-unsent text. Preserved on send failure.
    pub draft: String,

    /// Whether a history fetch for the selected conversation is in flight.
    pub loading: bool,

    /// Last user-visible error, if any.
    pub error: Option<String>,

    /// Generation counter for history fetches; completions carrying an older
    /// value are stale and discarded.
    pub(crate) fetch_seq: u64,

    /// Generation counter for stream handles.
    pub(crate) stream_seq: u64,

    /// The single live stream, owned by the selected conversation.
    /// `None` when nothing is selected or the stream was torn down.
    pub stream: Option<StreamHandle>,
}

impl ChatState {
    /// Create a new, empty state.
    pub fn new() -> Self {
        Self {
            conversations: Vec::new(),
            selected: None,
            timeline: Vec::new(),
            draft: String::new(),
            loading: false,
            error: None,
            fetch_seq: 0,
            stream_seq: 0,
            stream: None,
        }
    }

    pub(crate) fn next_fetch_seq(&mut self) -> u64 {
        self.fetch_seq += 1;
        self.fetch_seq
    }

    pub(crate) fn next_stream_seq(&mut self) -> u64 {
        self.stream_seq += 1;
        self.stream_seq
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}
