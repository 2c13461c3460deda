//! In-process fake backend: the REST routes plus the `/ws/chat/{id}`
//! broadcast hub the production server exposes, with per-conversation
//! socket counters for lifecycle assertions.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use gigchat_client::events::{ChatEvent, EventReceiver};
use gigchat_net::ClientConfig;
use gigchat_shared::session::Session;
use gigchat_shared::types::UserId;

#[derive(Clone, Default)]
pub struct Backend {
    /// Conversation directory served as-is.
    pub conversations: Arc<Mutex<Vec<Value>>>,
    /// Message history rows per conversation id.
    pub history: Arc<Mutex<HashMap<i64, Vec<Value>>>>,
    /// Artificial delay (millis) before answering a history request.
    pub history_delay_ms: Arc<Mutex<HashMap<i64, u64>>>,
    /// Raw text frames received from clients, in arrival order.
    pub sent_frames: Arc<Mutex<Vec<String>>>,
    channels: Arc<Mutex<HashMap<i64, broadcast::Sender<String>>>>,
    open_sockets: Arc<Mutex<HashMap<i64, i64>>>,
}

impl Backend {
    /// Number of WebSocket connections currently open for a conversation.
    pub fn open_count(&self, conversation: i64) -> i64 {
        self.open_sockets
            .lock()
            .unwrap()
            .get(&conversation)
            .copied()
            .unwrap_or(0)
    }

    /// Broadcast a server-initiated frame to every socket in a conversation.
    pub fn push_live(&self, conversation: i64, frame: Value) {
        let _ = self.channel(conversation).send(frame.to_string());
    }

    fn channel(&self, conversation: i64) -> broadcast::Sender<String> {
        self.channels
            .lock()
            .unwrap()
            .entry(conversation)
            .or_insert_with(|| broadcast::channel(64).0)
            .clone()
    }
}

fn bearer_present(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("Bearer "))
        .unwrap_or(false)
}

async fn list_conversations(
    State(backend): State<Backend>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    if !bearer_present(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let list = backend.conversations.lock().unwrap().clone();
    Ok(Json(Value::Array(list)))
}

async fn conversation_messages(
    Path(id): Path<i64>,
    State(backend): State<Backend>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    if !bearer_present(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let delay = backend.history_delay_ms.lock().unwrap().get(&id).copied();
    if let Some(millis) = delay {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
    let rows = backend
        .history
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .unwrap_or_default();
    Ok(Json(Value::Array(rows)))
}

async fn ws_chat(
    ws: WebSocketUpgrade,
    Path(id): Path<i64>,
    State(backend): State<Backend>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, id, backend))
}

/// Every received frame is re-broadcast to all sockets in the conversation,
/// the sender included — the production hub's behavior.
async fn handle_socket(mut socket: WebSocket, id: i64, backend: Backend) {
    *backend.open_sockets.lock().unwrap().entry(id).or_insert(0) += 1;
    let tx = backend.channel(id);
    let mut rx = tx.subscribe();

    loop {
        tokio::select! {
            inbound = socket.recv() => match inbound {
                Some(Ok(WsMessage::Text(text))) => {
                    backend.sent_frames.lock().unwrap().push(text.clone());
                    let _ = tx.send(text);
                }
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            },
            outbound = rx.recv() => match outbound {
                Ok(text) => {
                    if socket.send(WsMessage::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
        }
    }

    *backend.open_sockets.lock().unwrap().entry(id).or_insert(0) -= 1;
}

pub async fn spawn_backend(backend: Backend) -> SocketAddr {
    let app = Router::new()
        .route("/conversations", get(list_conversations))
        .route("/conversations/:id/messages", get(conversation_messages))
        .route("/ws/chat/:id", get(ws_chat))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub fn config_for(addr: SocketAddr) -> ClientConfig {
    ClientConfig {
        api_url: format!("http://{addr}"),
        ws_url: format!("ws://{addr}"),
    }
}

/// An unsigned JWT-shaped token expiring an hour from now.
pub fn live_token() -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    let payload = URL_SAFE_NO_PAD.encode(format!("{{\"exp\":{exp}}}"));
    format!("header.{payload}.signature")
}

pub fn session(user: i64) -> Session {
    Session::new(live_token(), UserId(user)).unwrap()
}

pub fn conversation_json(id: i64, job: i64, client: i64, freelancer: i64) -> Value {
    json!({
        "id": id,
        "job_id": job,
        "client_id": client,
        "freelancer_id": freelancer,
        "created_at": "2024-05-01T09:00:00Z"
    })
}

pub fn history_row(id: i64, conversation: i64, sender: i64, receiver: i64, content: &str) -> Value {
    json!({
        "id": id,
        "conversation_id": conversation,
        "sender_id": sender,
        "receiver_id": receiver,
        "content": content,
        "sent_at": "2024-05-01T10:00:00Z"
    })
}

/// An echo-style live frame, as another participant's client would send it.
pub fn live_frame(conversation: i64, sender: i64, receiver: i64, content: &str) -> Value {
    json!({
        "conversationid": conversation,
        "senderid": sender,
        "receiverid": receiver,
        "content": content,
        "sent_at": "2024-05-01T10:05:00.000Z"
    })
}

/// Poll `condition` until it holds or five seconds pass.
pub async fn wait_until<F: Fn() -> bool>(what: &str, condition: F) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Drain events until one matches `pred`; panics after five seconds.
pub async fn wait_for_event<F>(events: &mut EventReceiver, what: &str, pred: F) -> ChatEvent
where
    F: Fn(&ChatEvent) -> bool,
{
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {what}"))
            .expect("event channel closed");
        if pred(&event) {
            return event;
        }
    }
}
