//! Live chat stream task with tokio mpsc command/notification pattern.
//!
//! Each call to [`spawn_chat_stream`] runs one WebSocket connection in a
//! dedicated tokio task, scoped to a single conversation. External code
//! talks to it through typed command and notification channels, so teardown
//! and inbound delivery are ordered events rather than callback side
//! effects.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use gigchat_shared::protocol::{ChatMessage, OutboundFrame};

/// Commands sent *into* the stream task.
#[derive(Debug)]
pub enum StreamCommand {
    /// Serialize and write one outbound frame to the socket.
    SendFrame(OutboundFrame),
    /// Close the connection and end the task.
    Shutdown,
}

/// Notifications sent *from* the stream task to the application.
///
/// `Closed` is terminal: the task never reconnects. Re-selecting the
/// conversation is the only way to obtain a fresh stream.
#[derive(Debug, Clone)]
pub enum StreamNotification {
    /// The connection is established and ready for sends.
    Opened,
    /// One inbound frame, parsed.
    MessageReceived(ChatMessage),
    /// The connection is gone (handshake failure, server close, read or
    /// write error, or shutdown).
    Closed,
}

/// Spawn the chat stream for one conversation in a background tokio task.
///
/// Returns the command sender and notification receiver. Dropping the
/// command sender also tears the task down.
pub fn spawn_chat_stream(
    url: String,
) -> (mpsc::Sender<StreamCommand>, mpsc::Receiver<StreamNotification>) {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<StreamCommand>(256);
    let (notif_tx, notif_rx) = mpsc::channel::<StreamNotification>(256);

    tokio::spawn(async move {
        let mut ws = match connect_async(url.as_str()).await {
            Ok((ws, _response)) => {
                info!(url = %url, "Chat stream connected");
                let _ = notif_tx.send(StreamNotification::Opened).await;
                ws
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Chat stream handshake failed");
                let _ = notif_tx.send(StreamNotification::Closed).await;
                return;
            }
        };

        loop {
            tokio::select! {
                // --- Outbound commands ---
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(StreamCommand::SendFrame(frame)) => {
                            let json = match frame.to_json() {
                                Ok(json) => json,
                                Err(e) => {
                                    error!(error = %e, "Failed to serialize outbound frame");
                                    continue;
                                }
                            };
                            if let Err(e) = ws.send(Message::Text(json.into())).await {
                                warn!(error = %e, "Write failed, closing chat stream");
                                let _ = notif_tx.send(StreamNotification::Closed).await;
                                break;
                            }
                        }
                        Some(StreamCommand::Shutdown) => {
                            debug!("Chat stream shutdown requested");
                            let _ = ws.close(None).await;
                            let _ = notif_tx.send(StreamNotification::Closed).await;
                            break;
                        }
                        None => {
                            // All senders dropped
                            debug!("Command channel closed, closing chat stream");
                            let _ = ws.close(None).await;
                            let _ = notif_tx.send(StreamNotification::Closed).await;
                            break;
                        }
                    }
                }

                // --- Inbound frames ---
                frame = ws.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            match ChatMessage::from_json(text.as_str()) {
                                Ok(msg) => {
                                    let _ = notif_tx
                                        .send(StreamNotification::MessageReceived(msg))
                                        .await;
                                }
                                Err(e) => {
                                    // Not fatal; skip the frame.
                                    warn!(error = %e, "Unparseable inbound frame");
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Chat stream closed by server");
                            let _ = notif_tx.send(StreamNotification::Closed).await;
                            break;
                        }
                        Some(Ok(_)) => {
                            // Ping/pong and binary frames carry no messages.
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "Read failed, closing chat stream");
                            let _ = notif_tx.send(StreamNotification::Closed).await;
                            break;
                        }
                    }
                }
            }
        }

        debug!("Chat stream task terminated");
    });

    (cmd_tx, notif_rx)
}
