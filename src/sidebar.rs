//! Session list
//!
//! [`SessionList`] holds the user's chat sessions for the sidebar and the
//! `sessions` subcommand. It refetches whenever the controller's refresh
//! counter moves, and deletes sessions behind a confirmation.

use crate::api::ChatBackend;
use crate::controller::ChatController;
use crate::error::{is_not_found, CourseChatError, Result};
use crate::models::ChatSession;

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Error shown when the session list could not be fetched
pub const LIST_FAILED: &str = "Failed to load chat history";
/// Error shown when a session could not be deleted
pub const DELETE_FAILED: &str = "Failed to delete chat";

/// Asks the user to confirm a destructive action
pub trait Confirm {
    /// Return true to proceed
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything; used for `--yes` and when confirmation is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Result of [`SessionList::delete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined; nothing was sent
    Declined,
    /// The session is gone
    Deleted {
        /// The deleted session was open in the controller
        was_current: bool,
    },
    /// The backend refused; the list is unchanged
    Failed,
}

/// How a typed chat id matches the fetched sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdMatch {
    /// Exactly one session has this id or id prefix
    Unique(String),
    /// The prefix is shared by this many sessions
    Ambiguous(usize),
    /// No fetched session matches
    Unknown,
}

/// Sidebar state
pub struct SessionList {
    backend: Arc<dyn ChatBackend>,
    sessions: Vec<ChatSession>,
    loading: bool,
    error: Option<String>,
    synced_at: Option<u64>,
}

impl SessionList {
    /// Create an empty, never-fetched list
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            sessions: Vec::new(),
            loading: false,
            error: None,
            synced_at: None,
        }
    }

    /// Sessions as last fetched, most recently updated first
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    /// Error of the last failed operation
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while a fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Fetch the session list
    ///
    /// On failure the previous list is kept and an error is set.
    pub async fn refresh(&mut self) -> bool {
        self.loading = true;
        self.error = None;
        let result = self.backend.list_sessions().await;
        self.loading = false;

        match result {
            Ok(sessions) => {
                tracing::debug!(count = sessions.len(), "Session list refreshed");
                self.sessions = sessions;
                true
            }
            Err(e) => {
                tracing::error!("Failed to list chats: {:#}", e);
                self.error = Some(LIST_FAILED.to_string());
                false
            }
        }
    }

    /// Refetch if the controller stored something since the last fetch
    ///
    /// Returns true when a fetch was issued.
    pub async fn refresh_if_stale(&mut self, controller: &ChatController) -> bool {
        let counter = controller.refresh_counter();
        if self.synced_at == Some(counter) {
            return false;
        }
        if self.refresh().await {
            self.synced_at = Some(counter);
        }
        true
    }

    /// Match a full chat id or a prefix of one, such as the short id shown
    /// in the session table
    pub fn match_id(&self, input: &str) -> IdMatch {
        let input = input.trim();
        if input.is_empty() {
            return IdMatch::Unknown;
        }
        if self.sessions.iter().any(|s| s.id == input) {
            return IdMatch::Unique(input.to_string());
        }

        let mut matches = self.sessions.iter().filter(|s| s.id.starts_with(input));
        match (matches.next(), matches.count()) {
            (None, _) => IdMatch::Unknown,
            (Some(session), 0) => IdMatch::Unique(session.id.clone()),
            (Some(_), rest) => IdMatch::Ambiguous(rest + 1),
        }
    }

    /// Resolve typed input to a full chat id, refetching the list first if
    /// it is stale
    ///
    /// When the list cannot be fetched the input is passed through as
    /// typed, so a full id still works.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the input matches several chats, or
    /// none of a successfully fetched list.
    pub async fn resolve_id(&mut self, controller: &ChatController, input: &str) -> Result<String> {
        self.refresh_if_stale(controller).await;
        let input = input.trim();

        match self.match_id(input) {
            IdMatch::Unique(chat_id) => Ok(chat_id),
            IdMatch::Ambiguous(count) => Err(CourseChatError::InvalidInput(format!(
                "'{}' matches {} chats; type more of the id",
                input, count
            ))
            .into()),
            IdMatch::Unknown if self.error.is_some() => {
                tracing::debug!(input = %input, "Session list unavailable, using id as typed");
                Ok(input.to_string())
            }
            IdMatch::Unknown => {
                Err(CourseChatError::InvalidInput(format!("No chat matches '{}'", input)).into())
            }
        }
    }

    /// Delete a session after confirmation
    ///
    /// A session that is already gone on the backend counts as deleted.
    /// When the deleted session is open, the controller returns to a fresh
    /// chat.
    pub async fn delete(
        &mut self,
        chat_id: &str,
        controller: &ChatController,
        confirm: &dyn Confirm,
    ) -> DeleteOutcome {
        if !confirm.confirm("Are you sure you want to delete this chat?") {
            return DeleteOutcome::Declined;
        }

        match self.backend.delete_session(chat_id).await {
            Ok(()) => {}
            Err(e) if is_not_found(&e) => {
                tracing::warn!(chat_id = %chat_id, "Chat already deleted");
            }
            Err(e) => {
                tracing::error!("Failed to delete chat {}: {:#}", chat_id, e);
                self.error = Some(DELETE_FAILED.to_string());
                return DeleteOutcome::Failed;
            }
        }

        self.sessions.retain(|s| s.id != chat_id);
        self.error = None;
        let was_current = controller.session_deleted(chat_id);
        tracing::info!(chat_id = %chat_id, was_current, "Chat deleted");
        DeleteOutcome::Deleted { was_current }
    }
}

/// Coarse age label of a session's last update
///
/// Less than a day old is `Today`, less than a week is `N days ago`,
/// anything older is the calendar date.
pub fn relative_label(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(updated_at);
    if age.num_hours() < 24 {
        return "Today".to_string();
    }
    match age.num_days() {
        1 => "1 day ago".to_string(),
        days @ 2..=6 => format!("{} days ago", days),
        _ => updated_at.format("%b %-d, %Y").to_string(),
    }
}
