//! Bridges one chat stream's notifications into the shared state.
//!
//! One bridge task runs per spawned stream. Inbound frames append to the
//! timeline only while both the stream generation and the selected
//! conversation still match the context the stream was opened for, so a
//! superseded stream can never write into the wrong timeline.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use gigchat_net::StreamNotification;
use gigchat_shared::protocol::ChatMessage;
use gigchat_shared::types::ConversationId;

use crate::events::{emit, ChatEvent, EventSender};
use crate::state::ChatState;

/// Spawn the notification-processing loop for one stream.
pub(crate) fn spawn(
    state: Arc<Mutex<ChatState>>,
    events: EventSender,
    conversation_id: ConversationId,
    stream_seq: u64,
    notif_rx: mpsc::Receiver<StreamNotification>,
) {
    tokio::spawn(async move {
        bridge_loop(state, events, conversation_id, stream_seq, notif_rx).await;
    });
}

async fn bridge_loop(
    state: Arc<Mutex<ChatState>>,
    events: EventSender,
    conversation_id: ConversationId,
    stream_seq: u64,
    mut notif_rx: mpsc::Receiver<StreamNotification>,
) {
    debug!(conversation = %conversation_id, "Stream bridge started");

    while let Some(notification) = notif_rx.recv().await {
        match notification {
            StreamNotification::Opened => {
                let mut guard = state.lock().await;
                if !is_current_stream(&guard, stream_seq) {
                    continue;
                }
                if let Some(handle) = guard.stream.as_mut() {
                    handle.ready = true;
                }
                drop(guard);
                info!(conversation = %conversation_id, "Live stream ready");
                emit(&events, ChatEvent::StreamOpened(conversation_id));
            }

            StreamNotification::MessageReceived(message) => {
                append_inbound(&state, &events, conversation_id, stream_seq, message).await;
            }

            StreamNotification::Closed => {
                let mut guard = state.lock().await;
                if is_current_stream(&guard, stream_seq) {
                    if let Some(handle) = guard.stream.as_mut() {
                        handle.ready = false;
                    }
                }
                drop(guard);
                // Terminal for this connection; reselecting the conversation
                // is the only recovery path.
                info!(conversation = %conversation_id, "Live stream closed");
                emit(&events, ChatEvent::StreamClosed(conversation_id));
                break;
            }
        }
    }

    debug!(conversation = %conversation_id, "Stream bridge terminated");
}

/// Append one inbound frame to the timeline, if its stream is still the
/// active one and its conversation is still selected.
pub(crate) async fn append_inbound(
    state: &Arc<Mutex<ChatState>>,
    events: &EventSender,
    conversation_id: ConversationId,
    stream_seq: u64,
    message: ChatMessage,
) {
    let mut guard = state.lock().await;

    if !is_current_stream(&guard, stream_seq) {
        debug!(conversation = %conversation_id, "Dropping frame from superseded stream");
        return;
    }
    if guard.selected.as_ref().map(|c| c.id) != Some(conversation_id) {
        debug!(conversation = %conversation_id, "Dropping frame for non-selected conversation");
        return;
    }

    guard.timeline.push(message.clone());
    drop(guard);

    emit(events, ChatEvent::MessageReceived(message));
}

fn is_current_stream(state: &ChatState, stream_seq: u64) -> bool {
    state.stream.as_ref().map(|h| h.seq) == Some(stream_seq)
}
