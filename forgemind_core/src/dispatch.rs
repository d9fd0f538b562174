//! Reply dispatcher - schedules delayed synthetic replies.
//!
//! Each dispatch snapshots its target conversation at submission time and
//! runs as a cancellable background task. Keeping delivery off the calling
//! context means the UI never blocks on the reply timer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::conversation::{Author, ConversationStore};
use crate::{DispatchConfig, ReplyMode, Responder};

/// Lifecycle of a single dispatch. Terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Pending,
    Delivered,
    Cancelled,
    Dropped,
}

/// Handle to one scheduled reply.
#[derive(Debug, Clone)]
pub struct DispatchHandle {
    state: Arc<Mutex<DispatchState>>,
    token: CancellationToken,
}

impl DispatchHandle {
    /// Current lifecycle state.
    pub fn state(&self) -> DispatchState {
        self.state
            .lock()
            .map(|state| *state)
            .unwrap_or(DispatchState::Pending)
    }

    /// Cancels this delivery if it has not already settled.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

/// Moves a dispatch out of Pending exactly once.
fn settle(state: &Mutex<DispatchState>, next: DispatchState) {
    if let Ok(mut current) = state.lock() {
        if *current == DispatchState::Pending {
            *current = next;
        }
    }
}

/// Schedules and delivers synthetic replies.
///
/// `dispatch` returns immediately; delivery happens on a spawned task after
/// the configured delay. A reply always lands in the conversation captured
/// at submission time, never "whatever is active later".
pub struct ReplyDispatcher<R: Responder> {
    store: ConversationStore,
    responder: R,
    config: DispatchConfig,
    /// Cancellation tokens for deliveries still waiting on their timers.
    pending: Arc<Mutex<HashMap<Uuid, CancellationToken>>>,
    shutdown: CancellationToken,
}

impl<R: Responder> ReplyDispatcher<R> {
    pub fn new(store: ConversationStore, responder: R, config: DispatchConfig) -> Self {
        Self {
            store,
            responder,
            config,
            pending: Arc::new(Mutex::new(HashMap::new())),
            shutdown: CancellationToken::new(),
        }
    }

    /// Schedules a reply to `user_text` for the given conversation.
    ///
    /// The reply text is synthesized here, a pure function of the submitted
    /// text and mode. Target validity is only checked at delivery time: a
    /// conversation that cannot be found then drops the reply with a warning
    /// instead of failing a caller that has long since returned. Delivery is
    /// fire-once, never retried.
    pub fn dispatch(
        &self,
        conversation_id: Uuid,
        user_text: &str,
        mode: ReplyMode,
    ) -> DispatchHandle {
        let dispatch_id = Uuid::new_v4();
        // Child of the shutdown token, so a dispatch submitted after
        // shutdown starts out cancelled and never delivers.
        let token = self.shutdown.child_token();
        let state = Arc::new(Mutex::new(DispatchState::Pending));

        if let Ok(mut pending) = self.pending.lock() {
            pending.insert(dispatch_id, token.clone());
        }

        let handle = DispatchHandle {
            state: state.clone(),
            token: token.clone(),
        };

        let store = self.store.clone();
        let reply = self.responder.compose_reply(user_text, mode);
        let delay = self.config.reply_delay;
        let pending = self.pending.clone();
        tracing::debug!(dispatch_id = %dispatch_id, conversation_id = %conversation_id, ?mode, "reply scheduled");

        tokio::spawn(async move {
            tokio::select! {
                // Biased so a cancellation racing an expired timer wins and
                // no append can happen after shutdown.
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(dispatch_id = %dispatch_id, "delivery cancelled");
                    settle(&state, DispatchState::Cancelled);
                }
                _ = tokio::time::sleep(delay) => {
                    match store.append_message(conversation_id, Author::Assistant, &reply).await {
                        Ok(_) => settle(&state, DispatchState::Delivered),
                        Err(err) => {
                            tracing::warn!(
                                dispatch_id = %dispatch_id,
                                conversation_id = %conversation_id,
                                error = %err,
                                "dropping undeliverable reply"
                            );
                            settle(&state, DispatchState::Dropped);
                        }
                    }
                }
            }

            if let Ok(mut pending) = pending.lock() {
                pending.remove(&dispatch_id);
            }
        });

        handle
    }

    /// Number of deliveries still waiting on their timers.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().map(|pending| pending.len()).unwrap_or(0)
    }

    /// Cancels every pending delivery, plus any dispatch submitted later.
    ///
    /// The returned count is a snapshot of the deliveries still registered
    /// at the moment of the call. A delivery settling in that same instant
    /// may be counted even though it completed rather than cancelled.
    pub fn shutdown(&self) -> usize {
        let cancelled = self.pending_count();
        self.shutdown.cancel();
        cancelled
    }
}
