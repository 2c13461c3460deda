//! Outbound send path.
//!
//! A send is validated, addressed, and written to the open stream's command
//! channel. The timeline itself is never touched here: the message appears
//! once the server echoes it back over the stream, so there is exactly one
//! append path and nothing to de-duplicate.

use chrono::Utc;
use tracing::{debug, warn};

use gigchat_net::StreamCommand;
use gigchat_shared::constants::MAX_MESSAGE_CHARS;
use gigchat_shared::protocol::OutboundFrame;

use crate::client::ChatClient;
use crate::error::ChatError;
use crate::events::{emit, ChatEvent};

pub(crate) async fn send_draft(client: &ChatClient) -> Result<(), ChatError> {
    let session = match client.require_session() {
        Ok(session) => session,
        Err(e) => return Err(client.fail(e).await),
    };

    let (frame, cmd_tx) = {
        let mut state = client.state.lock().await;

        let content = state.draft.trim().to_string();
        if content.is_empty() {
            return Ok(());
        }
        let conversation = match state.selected.clone() {
            Some(conversation) => conversation,
            None => return Ok(()),
        };

        if content.chars().count() > MAX_MESSAGE_CHARS {
            let err = ChatError::ContentTooLong;
            state.error = Some(err.to_string());
            drop(state);
            emit(&client.events, ChatEvent::Error(err.to_string()));
            return Err(err);
        }

        // Only a ready stream addressed to the selected conversation may
        // carry the frame; otherwise the draft stays put for a manual retry.
        let cmd_tx = state
            .stream
            .as_ref()
            .filter(|handle| handle.ready && handle.conversation_id == conversation.id)
            .map(|handle| handle.cmd_tx.clone());
        let cmd_tx = match cmd_tx {
            Some(cmd_tx) => cmd_tx,
            None => {
                let err = ChatError::StreamUnavailable;
                state.error = Some(err.to_string());
                drop(state);
                emit(&client.events, ChatEvent::Error(err.to_string()));
                return Err(err);
            }
        };

        let frame = OutboundFrame {
            conversation_id: conversation.id,
            sender_id: session.user_id,
            receiver_id: conversation.counterpart_of(session.user_id),
            content,
            sent_at: Utc::now(),
        };
        (frame, cmd_tx)
    };

    if cmd_tx.send(StreamCommand::SendFrame(frame)).await.is_err() {
        warn!("Stream task gone, rejecting send");
        let mut state = client.state.lock().await;
        if let Some(handle) = state.stream.as_mut() {
            handle.ready = false;
        }
        let err = ChatError::StreamUnavailable;
        state.error = Some(err.to_string());
        drop(state);
        emit(&client.events, ChatEvent::Error(err.to_string()));
        return Err(err);
    }

    debug!("Outbound frame dispatched");
    let mut state = client.state.lock().await;
    state.draft.clear();
    state.error = None;
    Ok(())
}
