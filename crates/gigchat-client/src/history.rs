//! History write-back with stale-completion discard.
//!
//! Every history fetch is tagged with the `fetch_seq` current at issue time.
//! By the time the response arrives the user may have switched or closed the
//! conversation; a completion whose tag no longer matches is dropped without
//! touching the timeline.

use tracing::debug;

use gigchat_net::ApiError;
use gigchat_shared::protocol::ChatMessage;
use gigchat_shared::types::ConversationId;

use crate::error::ChatError;
use crate::events::{emit, ChatEvent, EventSender};
use crate::state::ChatState;

/// Apply a finished history fetch to the state.
///
/// Returns the user-visible error on a live (non-stale) failure; the caller
/// decides whether to propagate it.
pub(crate) fn apply(
    state: &mut ChatState,
    conversation_id: ConversationId,
    fetch_seq: u64,
    result: Result<Vec<ChatMessage>, ApiError>,
    events: &EventSender,
) -> Option<ChatError> {
    if state.fetch_seq != fetch_seq
        || state.selected.as_ref().map(|c| c.id) != Some(conversation_id)
    {
        debug!(
            conversation = %conversation_id,
            "Discarding stale history completion"
        );
        return None;
    }

    state.loading = false;
    match result {
        Ok(messages) => {
            let count = messages.len();
            state.timeline = messages;
            debug!(conversation = %conversation_id, count, "History loaded");
            emit(
                events,
                ChatEvent::HistoryLoaded {
                    conversation_id,
                    count,
                },
            );
            None
        }
        Err(e) => {
            state.timeline.clear();
            let err = ChatError::History(e);
            state.error = Some(err.to_string());
            Some(err)
        }
    }
}
