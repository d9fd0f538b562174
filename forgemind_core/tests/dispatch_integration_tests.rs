//! Integration tests for the conversation store and reply dispatcher
//! working together: submission, switching, delivery, and shutdown.

use forgemind_core::{
    Author, CannedResponder, ConversationStore, DispatchConfig, DispatchState, ReplyDispatcher,
    ReplyMode, UiEvent,
};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

fn dispatcher(store: &ConversationStore, delay_ms: u64) -> ReplyDispatcher<CannedResponder> {
    ReplyDispatcher::new(
        store.clone(),
        CannedResponder,
        DispatchConfig {
            reply_delay: Duration::from_millis(delay_ms),
        },
    )
}

fn drain_events(events: &mut broadcast::Receiver<UiEvent>) -> Vec<(Uuid, Author, String)> {
    let mut seen = Vec::new();
    while let Ok(UiEvent::MessageAppended {
        conversation_id,
        author,
        text,
        ..
    }) = events.try_recv()
    {
        seen.push((conversation_id, author, text));
    }
    seen
}

#[tokio::test]
async fn test_full_round_trip_in_seed_conversation() {
    let store = ConversationStore::new();
    let dispatcher = dispatcher(&store, 20);
    let mut events = store.subscribe();
    let chat = store.active_id().await;

    // Submit: user entry first, then the scheduled reply.
    let position = store
        .append_message(chat, Author::User, "hello")
        .await
        .unwrap();
    assert_eq!(position, 0);
    let handle = dispatcher.dispatch(chat, "hello", ReplyMode::Normal);

    tokio::time::sleep(Duration::from_millis(200)).await;

    let messages = store.messages(chat).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].author, Author::User);
    assert_eq!(messages[0].text, "hello");
    assert_eq!(messages[1].author, Author::Assistant);
    assert_eq!(messages[1].text, "I heard you say 'hello'");
    assert_eq!(handle.state(), DispatchState::Delivered);

    // Both appends hit the active conversation, so both were announced.
    let seen = drain_events(&mut events);
    assert_eq!(
        seen,
        vec![
            (chat, Author::User, "hello".to_string()),
            (chat, Author::Assistant, "I heard you say 'hello'".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_switching_mid_flight_keeps_reply_in_origin() {
    let store = ConversationStore::new();
    let dispatcher = dispatcher(&store, 50);
    let mut events = store.subscribe();

    // Chat #1: submit and schedule, then immediately move on.
    let first = store.active_id().await;
    store
        .append_message(first, Author::User, "first question")
        .await
        .unwrap();
    dispatcher.dispatch(first, "first question", ReplyMode::Normal);

    // Chat #2 becomes active before the first reply lands.
    let second = store.create_conversation().await;
    store
        .append_message(second, Author::User, "second question")
        .await
        .unwrap();
    dispatcher.dispatch(second, "second question", ReplyMode::Temporary);

    tokio::time::sleep(Duration::from_millis(250)).await;

    let first_messages = store.messages(first).await.unwrap();
    assert_eq!(first_messages.len(), 2);
    assert_eq!(first_messages[1].text, "I heard you say 'first question'");

    let second_messages = store.messages(second).await.unwrap();
    assert_eq!(second_messages.len(), 2);
    assert_eq!(second_messages[1].text, "Temporary reply to: second question");

    // The first reply landed in a background conversation, so it was never
    // announced; everything else hit the active conversation.
    let seen = drain_events(&mut events);
    assert_eq!(
        seen,
        vec![
            (first, Author::User, "first question".to_string()),
            (second, Author::User, "second question".to_string()),
            (
                second,
                Author::Assistant,
                "Temporary reply to: second question".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_concurrent_replies_to_one_conversation_all_arrive() {
    let store = ConversationStore::new();
    let dispatcher = dispatcher(&store, 20);
    let chat = store.active_id().await;

    // Several dispatches in flight at once; delivery order across them is
    // unspecified, but every reply must arrive exactly once.
    for text in ["a", "b", "c", "d"] {
        store.append_message(chat, Author::User, text).await.unwrap();
        dispatcher.dispatch(chat, text, ReplyMode::Normal);
    }

    tokio::time::sleep(Duration::from_millis(250)).await;

    let messages = store.messages(chat).await.unwrap();
    assert_eq!(messages.len(), 8);

    let mut replies: Vec<String> = messages
        .iter()
        .filter(|m| m.author == Author::Assistant)
        .map(|m| m.text.clone())
        .collect();
    replies.sort();
    assert_eq!(
        replies,
        vec![
            "I heard you say 'a'".to_string(),
            "I heard you say 'b'".to_string(),
            "I heard you say 'c'".to_string(),
            "I heard you say 'd'".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_shutdown_cancels_everything_in_flight() {
    let store = ConversationStore::new();
    let dispatcher = dispatcher(&store, 200);

    let first = store.active_id().await;
    store
        .append_message(first, Author::User, "one")
        .await
        .unwrap();
    let h1 = dispatcher.dispatch(first, "one", ReplyMode::Normal);

    let second = store.create_conversation().await;
    store
        .append_message(second, Author::User, "two")
        .await
        .unwrap();
    let h2 = dispatcher.dispatch(second, "two", ReplyMode::WebSearch);

    let cancelled = dispatcher.shutdown();
    assert_eq!(cancelled, 2);

    // Let the original timers elapse; nothing may append.
    tokio::time::sleep(Duration::from_millis(350)).await;

    assert_eq!(store.messages(first).await.unwrap().len(), 1);
    assert_eq!(store.messages(second).await.unwrap().len(), 1);
    assert_eq!(h1.state(), DispatchState::Cancelled);
    assert_eq!(h2.state(), DispatchState::Cancelled);
    assert_eq!(dispatcher.pending_count(), 0);
}

#[tokio::test]
async fn test_store_usable_immediately_after_construction() {
    let store = ConversationStore::new();
    let dispatcher = dispatcher(&store, 10);

    // The seed conversation is active from the start; no setup calls needed.
    let chat = store.active_id().await;
    store
        .append_message(chat, Author::User, "first words")
        .await
        .unwrap();
    dispatcher.dispatch(chat, "first words", ReplyMode::WebSearch);

    tokio::time::sleep(Duration::from_millis(150)).await;

    let messages = store.messages(chat).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages[1].text,
        "Web search results for: first words (stub)"
    );
}
