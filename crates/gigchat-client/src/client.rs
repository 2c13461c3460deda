//! The messaging core's command surface.
//!
//! `ChatClient` owns the session context, the API client, and the shared
//! state, and enforces the lifecycle invariants: one live stream at a time,
//! teardown strictly before the next setup, and selection + timeline +
//! stream replaced as a unit.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use gigchat_net::{spawn_chat_stream, ApiClient, ClientConfig, StreamCommand};
use gigchat_shared::protocol::{ChatMessage, Conversation};
use gigchat_shared::session::Session;
use gigchat_shared::types::{ConversationId, JobId, UserId};

use crate::directory;
use crate::error::ChatError;
use crate::events::{emit, ChatEvent, EventReceiver, EventSender};
use crate::history;
use crate::messaging;
use crate::state::{ChatState, StreamHandle};
use crate::stream_bridge;

/// Navigation parameters this view may be entered with. Used only to
/// discover a conversation to auto-select, never to address anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavTarget {
    pub job_id: Option<JobId>,
    pub other_user_id: Option<UserId>,
}

/// Handle to the messaging core. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct ChatClient {
    pub(crate) session: Option<Session>,
    pub(crate) nav: NavTarget,
    pub(crate) api: ApiClient,
    pub(crate) config: ClientConfig,
    pub(crate) state: Arc<Mutex<ChatState>>,
    pub(crate) events: EventSender,
}

impl ChatClient {
    /// Create a client and the receiver for its ordered event stream.
    ///
    /// `session` is the explicitly-scoped identity for this client instance;
    /// `None` means not signed in, and every operation will refuse to run.
    pub fn new(
        config: ClientConfig,
        session: Option<Session>,
        nav: NavTarget,
    ) -> (Self, EventReceiver) {
        let (events, event_rx) = mpsc::unbounded_channel();
        let client = Self {
            api: ApiClient::new(config.clone()),
            config,
            session,
            nav,
            state: Arc::new(Mutex::new(ChatState::new())),
            events,
        };
        (client, event_rx)
    }

    /// The signed-in user's id, if a session is present.
    pub fn user_id(&self) -> Option<UserId> {
        self.session.as_ref().map(|s| s.user_id)
    }

    pub async fn conversations(&self) -> Vec<Conversation> {
        self.state.lock().await.conversations.clone()
    }

    pub async fn selected(&self) -> Option<Conversation> {
        self.state.lock().await.selected.clone()
    }

    pub async fn timeline(&self) -> Vec<ChatMessage> {
        self.state.lock().await.timeline.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }

    pub async fn draft(&self) -> String {
        self.state.lock().await.draft.clone()
    }

    /// Replace the composed-but-unsent text.
    pub async fn set_draft(&self, text: impl Into<String>) {
        self.state.lock().await.draft = text.into();
    }

    /// Fetch the conversation directory, then auto-select from the
    /// navigation params if nothing is selected yet and the match is
    /// unambiguous. Any failure leaves an empty directory and a visible
    /// error; there are no retries.
    pub async fn refresh_conversations(&self) -> Result<(), ChatError> {
        let session = match self.require_session() {
            Ok(session) => session,
            Err(e) => return Err(self.fail(e).await),
        };

        match self.api.list_conversations(&session).await {
            Ok(conversations) => {
                let count = conversations.len();
                let target = {
                    let mut state = self.state.lock().await;
                    state.conversations = conversations;
                    state.error = None;
                    directory::navigation_target(&state, &self.nav).cloned()
                };
                emit(&self.events, ChatEvent::ConversationsLoaded { count });

                if let Some(conversation) = target {
                    debug!(
                        conversation = %conversation.id,
                        "Auto-selecting conversation from navigation params"
                    );
                    self.select(conversation).await?;
                }
                Ok(())
            }
            Err(e) => {
                self.state.lock().await.conversations.clear();
                Err(self.fail(ChatError::Conversations(e)).await)
            }
        }
    }

    /// Open a conversation from the fetched directory by id.
    pub async fn open_conversation(&self, id: ConversationId) -> Result<(), ChatError> {
        let conversation = {
            let state = self.state.lock().await;
            state.conversations.iter().find(|c| c.id == id).cloned()
        };
        match conversation {
            Some(conversation) => self.select(conversation).await,
            None => {
                warn!(conversation = %id, "Unknown conversation id, ignoring selection");
                Ok(())
            }
        }
    }

    /// Clear the selection: tear down the stream, drop the timeline, and
    /// invalidate any in-flight history fetch.
    pub async fn close_conversation(&self) {
        {
            let mut state = self.state.lock().await;
            if let Some(previous) = state.stream.take() {
                debug!(
                    conversation = %previous.conversation_id,
                    "Tearing down chat stream"
                );
                let _ = previous.cmd_tx.try_send(StreamCommand::Shutdown);
            }
            if state.selected.take().is_none() {
                return;
            }
            state.timeline.clear();
            state.loading = false;
            state.next_fetch_seq();
        }
        emit(&self.events, ChatEvent::ConversationClosed);
    }

    /// Send the current draft over the open stream.
    pub async fn send_draft(&self) -> Result<(), ChatError> {
        messaging::send_draft(self).await
    }

    /// Make `conversation` the selection: previous stream torn down first,
    /// timeline replaced by its history, then a fresh stream attached — all
    /// guarded so a selection change mid-flight wins.
    pub(crate) async fn select(&self, conversation: Conversation) -> Result<(), ChatError> {
        let session = match self.require_session() {
            Ok(session) => session,
            Err(e) => return Err(self.fail(e).await),
        };

        let fetch_seq = {
            let mut state = self.state.lock().await;
            // Teardown of the previous stream strictly precedes setup of
            // the next one.
            if let Some(previous) = state.stream.take() {
                debug!(
                    conversation = %previous.conversation_id,
                    "Tearing down previous chat stream"
                );
                let _ = previous.cmd_tx.try_send(StreamCommand::Shutdown);
            }
            state.selected = Some(conversation.clone());
            state.timeline.clear();
            state.loading = true;
            state.error = None;
            state.next_fetch_seq()
        };
        emit(&self.events, ChatEvent::ConversationOpened(conversation.id));

        // One-shot history load; the write-back discards stale completions.
        let result = self
            .api
            .conversation_messages(&session, conversation.id)
            .await;
        let history_error = {
            let mut state = self.state.lock().await;
            history::apply(&mut state, conversation.id, fetch_seq, result, &self.events)
        };
        if let Some(ref e) = history_error {
            emit(&self.events, ChatEvent::Error(e.to_string()));
        }

        // The live stream attaches only if this selection is still current.
        // A failed history load does not block it: the user can still chat.
        {
            let mut state = self.state.lock().await;
            if state.fetch_seq == fetch_seq
                && state.selected.as_ref().map(|c| c.id) == Some(conversation.id)
            {
                let url = self.config.chat_stream_url(conversation.id);
                let (cmd_tx, notif_rx) = spawn_chat_stream(url);
                let stream_seq = state.next_stream_seq();
                state.stream = Some(StreamHandle {
                    conversation_id: conversation.id,
                    seq: stream_seq,
                    ready: false,
                    cmd_tx,
                });
                stream_bridge::spawn(
                    self.state.clone(),
                    self.events.clone(),
                    conversation.id,
                    stream_seq,
                    notif_rx,
                );
            } else {
                debug!(
                    conversation = %conversation.id,
                    "Selection changed during history load, skipping stream setup"
                );
            }
        }

        match history_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// The session, if present and not expired. Checked before every
    /// network operation.
    pub(crate) fn require_session(&self) -> Result<Session, ChatError> {
        match self.session.as_ref() {
            Some(session) if !session.is_expired() => Ok(session.clone()),
            _ => Err(ChatError::NotAuthenticated),
        }
    }

    /// Record a user-visible error and hand it back.
    pub(crate) async fn fail(&self, err: ChatError) -> ChatError {
        self.state.lock().await.error = Some(err.to_string());
        emit(&self.events, ChatEvent::Error(err.to_string()));
        err
    }
}
