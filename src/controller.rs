//! Chat session controller
//!
//! [`ChatController`] owns the visible message list of the chat that is
//! currently open. It applies optimistic updates when the user sends a
//! message, decides between creating a session and appending to the open
//! one, merges the assistant's answer and citations, and rolls back any
//! message whose persistence failed.
//!
//! Methods take `&self`; state lives behind a mutex that is never held
//! across an await, so independent operations (a send in flight, a session
//! load, a sidebar refresh) may interleave.
//!
//! Every send is tagged with the epoch of the chat it targets. Switching
//! chats ([`ChatController::load_session`] succeeding, or
//! [`ChatController::create_new_session`]) advances the epoch, and a send
//! whose epoch is stale discards its results and stops issuing calls.

use crate::api::ChatBackend;
use crate::models::{ChatMessage, MessageId, MessageIdGenerator, Role};

use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};

/// Error shown when the user's message could not be stored
pub const SEND_FAILED: &str = "Failed to send message. Please try again.";
/// Error shown when no answer could be obtained or stored
pub const REPLY_FAILED: &str = "Failed to get a response. Please try again.";
/// Error shown when a chat could not be loaded
pub const LOAD_FAILED: &str = "Failed to load chat";

/// Observable lifecycle state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No chat id is held
    NoSession,
    /// A chat is being fetched
    SessionLoading,
    /// A chat is open and idle
    SessionReady,
    /// A send is in flight
    Sending,
    /// The last operation failed; see [`ChatController::error`]
    SessionError,
}

/// Result of [`ChatController::send_message`]
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Input was empty after trimming; nothing happened
    Skipped,
    /// The answer was shown and stored
    Answered(ChatMessage),
    /// The user message could not be stored and was removed again
    NotSent,
    /// The user message is stored but no answer could be shown and stored
    NoReply,
    /// Another chat was opened while the send was in flight
    Superseded,
}

/// Point-in-time copy of the controller state for rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSnapshot {
    /// Visible messages, oldest first
    pub messages: Vec<ChatMessage>,
    /// Id of the open chat
    pub current_chat_id: Option<String>,
    /// User-facing error of the last failed operation
    pub error: Option<String>,
    /// A load is in flight
    pub loading: bool,
    /// A send is in flight
    pub sending: bool,
}

#[derive(Debug, Default)]
struct ControllerState {
    messages: Vec<ChatMessage>,
    current_chat_id: Option<String>,
    error: Option<String>,
    epoch: u64,
    load_ticket: u64,
    loading: bool,
    pending_sends: usize,
    refresh_counter: u64,
}

/// View-model state container for one chat at a time
pub struct ChatController {
    backend: Arc<dyn ChatBackend>,
    ids: Arc<MessageIdGenerator>,
    state: Mutex<ControllerState>,
}

impl ChatController {
    /// Create a controller in the `NoSession` state
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self::with_id_generator(backend, Arc::new(MessageIdGenerator::new()))
    }

    /// Create a controller that draws message ids from `ids`
    pub fn with_id_generator(backend: Arc<dyn ChatBackend>, ids: Arc<MessageIdGenerator>) -> Self {
        Self {
            backend,
            ids,
            state: Mutex::new(ControllerState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Visible messages, oldest first
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state().messages.clone()
    }

    /// Id of the open chat, `None` before the first message is stored
    pub fn current_chat_id(&self) -> Option<String> {
        self.state().current_chat_id.clone()
    }

    /// User-facing error of the last failed operation
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// True while a send is in flight
    pub fn is_sending(&self) -> bool {
        self.state().pending_sends > 0
    }

    /// True while a load is in flight
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Counter bumped whenever a send stores something on the backend
    ///
    /// Session list views compare it with the value they last fetched at.
    pub fn refresh_counter(&self) -> u64 {
        self.state().refresh_counter
    }

    /// Current lifecycle state
    pub fn phase(&self) -> SessionPhase {
        let state = self.state();
        if state.loading {
            SessionPhase::SessionLoading
        } else if state.pending_sends > 0 {
            SessionPhase::Sending
        } else if state.error.is_some() {
            SessionPhase::SessionError
        } else if state.current_chat_id.is_none() {
            SessionPhase::NoSession
        } else {
            SessionPhase::SessionReady
        }
    }

    /// Copy of the whole state
    pub fn snapshot(&self) -> ChatSnapshot {
        let state = self.state();
        ChatSnapshot {
            messages: state.messages.clone(),
            current_chat_id: state.current_chat_id.clone(),
            error: state.error.clone(),
            loading: state.loading,
            sending: state.pending_sends > 0,
        }
    }

    /// Send a user message and fetch the assistant's answer
    ///
    /// The trimmed text is shown immediately. It is then stored (creating
    /// the chat if none is open), the question is asked, and the answer is
    /// shown and stored. A failure to store the user message removes it
    /// again; a failure after that keeps the stored user message and
    /// reports an error without an answer.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("Ignoring empty message");
            return SendOutcome::Skipped;
        }

        let user_message = ChatMessage::new(self.ids.next_id(), Role::User, text, Utc::now());
        let user_message_id = user_message.id;
        let (epoch, target) = {
            let mut state = self.state();
            state.messages.push(user_message);
            state.error = None;
            state.pending_sends += 1;
            (state.epoch, state.current_chat_id.clone())
        };

        let outcome = self.run_send(text, user_message_id, epoch, target).await;

        let mut state = self.state();
        state.pending_sends = state.pending_sends.saturating_sub(1);
        outcome
    }

    async fn run_send(
        &self,
        text: &str,
        user_message_id: MessageId,
        epoch: u64,
        target: Option<String>,
    ) -> SendOutcome {
        let persisted = match &target {
            None => self
                .backend
                .create_session(text)
                .await
                .map(|created| created.chat_id),
            Some(chat_id) => self
                .backend
                .append_message(chat_id, text, Role::User)
                .await
                .map(|_| chat_id.clone()),
        };

        let chat_id = match persisted {
            Ok(chat_id) => chat_id,
            Err(e) => {
                tracing::error!("Failed to store user message: {:#}", e);
                let mut state = self.state();
                if state.epoch != epoch {
                    return SendOutcome::Superseded;
                }
                state.messages.retain(|m| m.id != user_message_id);
                state.error = Some(SEND_FAILED.to_string());
                return SendOutcome::NotSent;
            }
        };

        {
            let mut state = self.state();
            state.refresh_counter += 1;
            if state.epoch != epoch {
                tracing::debug!(chat_id = %chat_id, "Chat switched during send, discarding");
                return SendOutcome::Superseded;
            }
            if target.is_none() {
                tracing::info!(chat_id = %chat_id, "Adopted new chat");
                state.current_chat_id = Some(chat_id.clone());
            }
        }

        let answer = match self.backend.ask_question(text).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Failed to get answer: {:#}", e);
                let mut state = self.state();
                if state.epoch != epoch {
                    return SendOutcome::Superseded;
                }
                state.error = Some(REPLY_FAILED.to_string());
                return SendOutcome::NoReply;
            }
        };

        let reply = ChatMessage::new(
            self.ids.next_id(),
            Role::Assistant,
            answer.answer,
            Utc::now(),
        )
        .with_sources(answer.sources);
        {
            let mut state = self.state();
            if state.epoch != epoch {
                tracing::debug!(chat_id = %chat_id, "Chat switched before answer, discarding");
                return SendOutcome::Superseded;
            }
            state.messages.push(reply.clone());
        }

        let stored = self
            .backend
            .append_message(&chat_id, &reply.text, Role::Assistant)
            .await;

        let mut state = self.state();
        match stored {
            Ok(_) => {
                state.refresh_counter += 1;
                if state.epoch != epoch {
                    return SendOutcome::Superseded;
                }
                SendOutcome::Answered(reply)
            }
            Err(e) => {
                tracing::error!("Failed to store answer: {:#}", e);
                if state.epoch != epoch {
                    return SendOutcome::Superseded;
                }
                state.messages.retain(|m| m.id != reply.id);
                state.error = Some(REPLY_FAILED.to_string());
                SendOutcome::NoReply
            }
        }
    }

    /// Replace the visible list with the stored history of `chat_id`
    ///
    /// Returns true when the chat was opened. On failure the previous list
    /// and chat id are kept and an error is set. When several loads overlap
    /// only the most recently issued one is applied.
    pub async fn load_session(&self, chat_id: &str) -> bool {
        let ticket = {
            let mut state = self.state();
            state.load_ticket += 1;
            state.loading = true;
            state.error = None;
            state.load_ticket
        };

        let result = self.backend.get_session(chat_id).await;

        let mut state = self.state();
        if state.load_ticket != ticket {
            tracing::debug!(chat_id = %chat_id, "Load superseded, discarding");
            return false;
        }
        state.loading = false;

        match result {
            Ok(detail) => {
                tracing::info!(
                    chat_id = %chat_id,
                    messages = detail.messages.len(),
                    "Chat loaded"
                );
                state.messages = detail.messages;
                state.current_chat_id = Some(chat_id.to_string());
                state.epoch += 1;
                true
            }
            Err(e) => {
                tracing::error!("Failed to load chat {}: {:#}", chat_id, e);
                state.error = Some(LOAD_FAILED.to_string());
                false
            }
        }
    }

    /// Return to `NoSession`; the next send creates a chat
    pub fn create_new_session(&self) {
        let mut state = self.state();
        state.messages.clear();
        state.error = None;
        state.current_chat_id = None;
        state.epoch += 1;
        state.load_ticket += 1;
        state.loading = false;
    }

    /// Clear the visible list and error, keeping the open chat id
    pub fn clear(&self) {
        let mut state = self.state();
        state.messages.clear();
        state.error = None;
    }

    /// Notify the controller that `chat_id` was deleted
    ///
    /// Returns true when it was the open chat, in which case the controller
    /// is back in `NoSession`.
    pub fn session_deleted(&self, chat_id: &str) -> bool {
        let is_current = self.state().current_chat_id.as_deref() == Some(chat_id);
        if is_current {
            self.create_new_session();
        }
        is_current
    }
}
