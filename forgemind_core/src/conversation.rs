//! Conversation store - owns every conversation and the active pointer.
//!
//! The store is the single mutation path for conversation contents. UI
//! callers and delivery workers all go through the same write lock, and
//! appends to the active conversation are announced over a broadcast
//! channel so the presentation layer can refresh without polling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::utils::error::StoreError;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub author: Author,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(author: Author, text: &str) -> Self {
        Self {
            author,
            text: text.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// A named, ordered, append-only sequence of messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<Message>,
}

impl Conversation {
    fn new(title: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            created_at: Utc::now(),
            messages: Vec::new(),
        }
    }
}

/// Listing row for a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub message_count: usize,
}

/// Events broadcast to the presentation layer.
///
/// Only appends landing in the currently-active conversation are announced;
/// a reply delivered to a background conversation surfaces when that
/// conversation is switched to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UiEvent {
    MessageAppended {
        conversation_id: Uuid,
        author: Author,
        text: String,
        timestamp: DateTime<Utc>,
    },
}

#[derive(Debug)]
struct StoreInner {
    conversations: Vec<Conversation>,
    active: Uuid,
}

impl StoreInner {
    fn find(&self, id: Uuid) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    fn find_mut(&mut self, id: Uuid) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }
}

/// Shared handle over the conversation collection.
///
/// Cheap to clone; every clone sees the same state. Exactly one
/// conversation is active at any time, starting with the seed "Chat #1".
#[derive(Clone)]
pub struct ConversationStore {
    inner: Arc<RwLock<StoreInner>>,
    events: broadcast::Sender<UiEvent>,
}

impl ConversationStore {
    /// Creates a store seeded with an empty, active "Chat #1".
    pub fn new() -> Self {
        let seed = Conversation::new("Chat #1".to_string());
        let active = seed.id;
        let (events, _) = broadcast::channel(128);
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                conversations: vec![seed],
                active,
            })),
            events,
        }
    }

    /// Get a broadcast receiver for append notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    /// Creates a new empty conversation, makes it active, returns its id.
    /// Titles are sequential ("Chat #2", "Chat #3", ...) and never reused.
    pub async fn create_conversation(&self) -> Uuid {
        let mut inner = self.inner.write().await;
        let title = format!("Chat #{}", inner.conversations.len() + 1);
        let conversation = Conversation::new(title);
        let id = conversation.id;
        inner.conversations.push(conversation);
        inner.active = id;
        tracing::debug!(conversation_id = %id, "created conversation");
        id
    }

    /// Switches the active conversation.
    pub async fn set_active(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.find(id).is_none() {
            return Err(StoreError::InvalidConversationId(id));
        }
        inner.active = id;
        Ok(())
    }

    /// Id of the currently active conversation.
    pub async fn active_id(&self) -> Uuid {
        self.inner.read().await.active
    }

    /// Appends a message and returns its sequence position within the
    /// conversation. This is the only mutator of conversation contents;
    /// blank text is rejected before a message is created.
    pub async fn append_message(
        &self,
        id: Uuid,
        author: Author,
        text: &str,
    ) -> Result<usize, StoreError> {
        if text.trim().is_empty() {
            return Err(StoreError::EmptyMessage);
        }

        let mut inner = self.inner.write().await;
        let active = inner.active;
        let conversation = inner
            .find_mut(id)
            .ok_or(StoreError::InvalidConversationId(id))?;

        let message = Message::new(author, text);
        let timestamp = message.timestamp;
        conversation.messages.push(message);
        let position = conversation.messages.len() - 1;

        // Announced under the write lock so event order matches append order.
        if id == active {
            let _ = self.events.send(UiEvent::MessageAppended {
                conversation_id: id,
                author,
                text: text.to_string(),
                timestamp,
            });
        }

        Ok(position)
    }

    /// Insertion-ordered listing of all conversations.
    pub async fn list_conversations(&self) -> Vec<ConversationSummary> {
        self.inner
            .read()
            .await
            .conversations
            .iter()
            .map(|c| ConversationSummary {
                id: c.id,
                title: c.title.clone(),
                created_at: c.created_at,
                message_count: c.messages.len(),
            })
            .collect()
    }

    /// Snapshot of a conversation's messages in append order.
    pub async fn messages(&self, id: Uuid) -> Result<Vec<Message>, StoreError> {
        let inner = self.inner.read().await;
        inner
            .find(id)
            .map(|c| c.messages.clone())
            .ok_or(StoreError::InvalidConversationId(id))
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
