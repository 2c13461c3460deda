//! End-to-end inbox flow against the in-process backend.

mod support;

use gigchat_client::{ChatClient, ChatError, ChatEvent, NavTarget};
use gigchat_shared::types::{ConversationId, JobId, UserId};

use support::*;

#[tokio::test]
async fn test_auto_select_loads_history_then_appends_live_frames() {
    let backend = Backend::default();
    backend
        .conversations
        .lock()
        .unwrap()
        .push(conversation_json(1, 7, 5, 9));
    backend.history.lock().unwrap().insert(
        1,
        vec![
            history_row(100, 1, 5, 9, "first"),
            history_row(101, 1, 9, 5, "second"),
        ],
    );
    let addr = spawn_backend(backend.clone()).await;

    let nav = NavTarget {
        job_id: Some(JobId(7)),
        other_user_id: Some(UserId(9)),
    };
    let (client, mut events) = ChatClient::new(config_for(addr), Some(session(5)), nav);

    client.refresh_conversations().await.unwrap();
    wait_for_event(&mut events, "stream to open", |e| {
        matches!(e, ChatEvent::StreamOpened(ConversationId(1)))
    })
    .await;

    // Auto-selection picked the unique (job, counterpart) match and the
    // timeline holds its history in server order.
    assert_eq!(
        client.selected().await.map(|c| c.id),
        Some(ConversationId(1))
    );
    let timeline = client.timeline().await;
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[0].content, "first");
    assert_eq!(timeline[1].content, "second");

    // Send a draft; the message reaches the timeline via the echo only.
    client.set_draft("  hello there  ").await;
    client.send_draft().await.unwrap();
    wait_for_event(&mut events, "echo of the sent message", |e| {
        matches!(e, ChatEvent::MessageReceived(m) if m.content == "hello there")
    })
    .await;

    let timeline = client.timeline().await;
    assert_eq!(timeline.len(), 3);
    assert_eq!(timeline[2].content, "hello there");
    assert_eq!(client.draft().await, "");
    assert_eq!(client.error().await, None);

    // The frame on the wire carries the computed recipient and sender.
    let frames = backend.sent_frames.lock().unwrap().clone();
    assert_eq!(frames.len(), 1);
    let frame: serde_json::Value = serde_json::from_str(&frames[0]).unwrap();
    assert_eq!(frame["conversationid"], 1);
    assert_eq!(frame["senderid"], 5);
    assert_eq!(frame["receiverid"], 9);
    assert!(frame["sent_at"].is_string());

    // A frame from the counterpart appends behind everything else.
    backend.push_live(1, live_frame(1, 9, 5, "reply"));
    wait_for_event(&mut events, "counterpart frame", |e| {
        matches!(e, ChatEvent::MessageReceived(m) if m.content == "reply")
    })
    .await;

    let timeline = client.timeline().await;
    assert_eq!(timeline.len(), 4);
    assert_eq!(timeline[3].content, "reply");
    assert_eq!(timeline[3].sender_id, UserId(9));
}

#[tokio::test]
async fn test_no_auto_select_without_navigation_params() {
    let backend = Backend::default();
    backend
        .conversations
        .lock()
        .unwrap()
        .push(conversation_json(1, 7, 5, 9));
    let addr = spawn_backend(backend.clone()).await;

    let (client, _events) =
        ChatClient::new(config_for(addr), Some(session(5)), NavTarget::default());

    client.refresh_conversations().await.unwrap();

    assert_eq!(client.conversations().await.len(), 1);
    assert_eq!(client.selected().await, None);
    assert_eq!(backend.open_count(1), 0);
}

#[tokio::test]
async fn test_refresh_failure_yields_empty_directory_and_error() {
    // Nothing is listening on this address.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (client, _events) =
        ChatClient::new(config_for(addr), Some(session(5)), NavTarget::default());

    let err = client.refresh_conversations().await.unwrap_err();
    assert!(matches!(err, ChatError::Conversations(_)));
    assert!(client.conversations().await.is_empty());
    assert_eq!(
        client.error().await.as_deref(),
        Some("Could not load your conversations.")
    );
}

#[tokio::test]
async fn test_unauthenticated_client_refuses_refresh() {
    let backend = Backend::default();
    backend
        .conversations
        .lock()
        .unwrap()
        .push(conversation_json(1, 7, 5, 9));
    let addr = spawn_backend(backend).await;

    let (client, _events) = ChatClient::new(config_for(addr), None, NavTarget::default());

    let err = client.refresh_conversations().await.unwrap_err();
    assert!(matches!(err, ChatError::NotAuthenticated));
    assert_eq!(
        client.error().await.as_deref(),
        Some("You are not logged in. Please log in to view your inbox.")
    );
    assert!(client.conversations().await.is_empty());
}
