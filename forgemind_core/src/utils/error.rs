//! Error types for the conversation core.

use thiserror::Error;
use uuid::Uuid;

/// Failures raised synchronously by store operations.
///
/// These fail fast to the caller; nothing in the core retries. Failures at
/// reply delivery time are not surfaced as errors at all: the dispatch
/// handle settles in a terminal state and the delivery is logged and
/// dropped, since the submitting caller has long since returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Unknown conversation id: {0}")]
    InvalidConversationId(Uuid),

    #[error("Message text is empty")]
    EmptyMessage,
}
