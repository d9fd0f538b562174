pub mod conversation;
pub mod dispatch;
pub mod utils;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use conversation::{
    Author, Conversation, ConversationStore, ConversationSummary, Message, UiEvent,
};
pub use dispatch::{DispatchHandle, DispatchState, ReplyDispatcher};
pub use utils::error::StoreError;

/// Reply template selector. Attached to a dispatch request, not to the
/// conversation or the message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyMode {
    #[default]
    Normal,
    Temporary,
    WebSearch,
}

impl ReplyMode {
    /// Display label shown in the mode selector.
    pub fn label(&self) -> &'static str {
        match self {
            ReplyMode::Normal => "Normal Chat",
            ReplyMode::Temporary => "Temporary Chat",
            ReplyMode::WebSearch => "Web Search Chat",
        }
    }
}

/// Configuration for scheduled reply delivery.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// How long a reply waits before it is delivered.
    pub reply_delay: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(800),
        }
    }
}

/// Responder trait for pluggable reply synthesis.
///
/// Implementations must be pure: the reply is a function of the submitted
/// text and mode only, so scheduling and delivery stay independent of how
/// the text is produced.
pub trait Responder: Send + Sync + Clone + 'static {
    fn compose_reply(&self, text: &str, mode: ReplyMode) -> String;
}

/// Stock responder producing one canned template per mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedResponder;

impl Responder for CannedResponder {
    fn compose_reply(&self, text: &str, mode: ReplyMode) -> String {
        match mode {
            ReplyMode::Normal => format!("I heard you say '{}'", text),
            ReplyMode::Temporary => format!("Temporary reply to: {}", text),
            ReplyMode::WebSearch => format!("Web search results for: {} (stub)", text),
        }
    }
}
