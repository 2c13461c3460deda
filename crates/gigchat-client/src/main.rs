//! # gigchat
//!
//! Interactive terminal client for the GigChat messaging core.
//!
//! Reads configuration and credentials from the environment:
//! - `GIGCHAT_API_URL` / `GIGCHAT_WS_URL` — backend endpoints
//! - `GIGCHAT_TOKEN` / `GIGCHAT_USER_ID` — stored sign-in credentials
//! - `GIGCHAT_JOB_ID` / `GIGCHAT_OTHER_USER_ID` — optional navigation
//!   target for auto-selecting a conversation
//!
//! All behavior lives in the `gigchat_client` library; this binary only
//! renders events and forwards commands.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use gigchat_client::{ChatClient, ChatEvent, NavTarget};
use gigchat_net::ClientConfig;
use gigchat_shared::constants::APP_NAME;
use gigchat_shared::session::Session;
use gigchat_shared::types::{ConversationId, JobId, UserId};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gigchat_client::init_tracing();

    info!("Starting {} terminal client v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let config = ClientConfig::from_env();
    info!(api = %config.api_url, ws = %config.ws_url, "Loaded configuration");

    let session = session_from_env();
    if session.is_none() {
        warn!("No valid credentials in environment; operations will be refused");
    }

    let (client, mut events) = ChatClient::new(config, session, nav_from_env());

    if client.refresh_conversations().await.is_ok() {
        print_inbox(&client).await;
    } else if let Some(error) = client.error().await {
        println!("! {error}");
    }

    println!("Commands: /inbox, /open <id>, /close, /refresh, /quit. Anything else is sent.");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => render_event(&client, event).await,
                None => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !handle_line(&client, line.trim()).await {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    client.close_conversation().await;
    Ok(())
}

/// Restore a session from stored credentials, if both are present and valid.
fn session_from_env() -> Option<Session> {
    let token = std::env::var("GIGCHAT_TOKEN").ok()?;
    let user_id = std::env::var("GIGCHAT_USER_ID").ok()?;
    match Session::restore(&token, &user_id) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!(error = %e, "Stored credentials rejected");
            None
        }
    }
}

fn nav_from_env() -> NavTarget {
    let parse = |key: &str| std::env::var(key).ok().and_then(|v| v.parse::<i64>().ok());
    NavTarget {
        job_id: parse("GIGCHAT_JOB_ID").map(JobId),
        other_user_id: parse("GIGCHAT_OTHER_USER_ID").map(UserId),
    }
}

/// Handle one input line. Returns `false` to quit.
async fn handle_line(client: &ChatClient, line: &str) -> bool {
    match line {
        "" => {}
        "/quit" => return false,
        "/inbox" => print_inbox(client).await,
        "/close" => client.close_conversation().await,
        "/refresh" => {
            if client.refresh_conversations().await.is_ok() {
                print_inbox(client).await;
            }
        }
        _ => {
            if let Some(arg) = line.strip_prefix("/open") {
                match arg.trim().parse::<i64>() {
                    Ok(id) => {
                        let _ = client.open_conversation(ConversationId(id)).await;
                    }
                    Err(_) => println!("Usage: /open <conversation id>"),
                }
            } else {
                client.set_draft(line).await;
                let _ = client.send_draft().await;
            }
        }
    }
    true
}

async fn print_inbox(client: &ChatClient) {
    let conversations = client.conversations().await;
    if conversations.is_empty() {
        println!("No conversations found");
        return;
    }
    println!("Your Inbox");
    for conversation in conversations {
        let job = conversation
            .job_id
            .map(|j| format!(" (job #{j})"))
            .unwrap_or_default();
        println!("  #{}{job}", conversation.id);
    }
}

async fn render_event(client: &ChatClient, event: ChatEvent) {
    match event {
        ChatEvent::ConversationsLoaded { count } => {
            info!(count, "Inbox refreshed");
        }
        ChatEvent::ConversationOpened(id) => {
            println!("Chat: conversation #{id}");
        }
        ChatEvent::ConversationClosed => {
            println!("Chat closed");
        }
        ChatEvent::HistoryLoaded { count, .. } => {
            if count == 0 {
                println!("No messages yet. Start the conversation!");
            } else {
                for msg in client.timeline().await {
                    println!("{}: {}", sender_label(client, msg.sender_id), msg.content);
                }
            }
        }
        ChatEvent::MessageReceived(msg) => {
            println!("{}: {}", sender_label(client, msg.sender_id), msg.content);
        }
        ChatEvent::StreamOpened(_) => {
            println!("(live)");
        }
        ChatEvent::StreamClosed(_) => {
            println!("(connection closed; /open to reconnect)");
        }
        ChatEvent::Error(error) => {
            println!("! {error}");
        }
    }
}

fn sender_label(client: &ChatClient, sender: UserId) -> String {
    if client.user_id() == Some(sender) {
        "You".to_string()
    } else {
        format!("User {sender}")
    }
}
