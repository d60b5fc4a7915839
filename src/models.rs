//! View-model types
//!
//! These are the in-app representations of chats, messages and classes.
//! They are derived from the wire schema in [`crate::api::wire`] and are the
//! only types the controller and the presentation layer work with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Author role of a chat message, as stored by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message typed by the user
    User,
    /// Answer produced by the assistant
    Assistant,
    /// Instruction or notice not authored by either party
    System,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }

    /// Which side of the conversation a message with this role is shown on
    pub fn sender(&self) -> Sender {
        match self {
            Self::User => Sender::User,
            Self::Assistant | Self::System => Sender::Bot,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display attribution of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// Shown as the user's own message
    User,
    /// Shown as coming from the assistant
    Bot,
}

/// Locally generated message identifier
///
/// The wire format carries no stable per-message id, so ids are assigned on
/// the client and are only meaningful within one [`MessageIdGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic source of [`MessageId`]s
///
/// Ids strictly increase for every call, regardless of how many messages
/// are created within the same clock tick.
#[derive(Debug)]
pub struct MessageIdGenerator {
    next: AtomicU64,
}

impl Default for MessageIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageIdGenerator {
    /// Create a generator starting at id 1
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Hand out the next id
    pub fn next_id(&self) -> MessageId {
        MessageId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// One message of the open chat
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// Local identifier
    pub id: MessageId,
    /// Display text
    pub text: String,
    /// Author role
    pub role: Role,
    /// When the message was written
    pub timestamp: DateTime<Utc>,
    /// Source citations; only assistant answers carry any
    pub sources: Vec<String>,
}

impl ChatMessage {
    /// Create a message without citations
    pub fn new(id: MessageId, role: Role, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.into(),
            role,
            timestamp,
            sources: Vec::new(),
        }
    }

    /// Attach source citations to the message
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// Display attribution derived from the role
    pub fn sender(&self) -> Sender {
        self.role.sender()
    }
}

/// Summary of one chat session, as shown in the session list
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    /// Server-issued chat id
    pub id: String,
    /// Title derived server-side from the first message
    pub title: String,
    /// Preview of the latest message, when the backend provides one
    pub last_message: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Time of the latest append
    pub updated_at: DateTime<Utc>,
    /// Number of stored messages
    pub message_count: usize,
}

/// Full history of one chat session
#[derive(Debug, Clone, PartialEq)]
pub struct ChatDetail {
    /// Server-issued chat id
    pub id: String,
    /// Session title
    pub title: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Time of the latest append
    pub updated_at: DateTime<Utc>,
    /// Messages in server order
    pub messages: Vec<ChatMessage>,
}

/// Result of creating a chat session
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedSession {
    /// Server-issued chat id
    pub chat_id: String,
    /// Title derived from the first message
    pub title: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Result of appending a message to a chat session
#[derive(Debug, Clone, PartialEq)]
pub struct AppendedMessage {
    /// Chat the message was appended to
    pub chat_id: String,
    /// New update time of the chat
    pub updated_at: DateTime<Utc>,
    /// Message count after the append
    pub total_messages: usize,
}

/// Answer from the question-answering service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text
    pub answer: String,
    /// Supporting source documents
    #[serde(default)]
    pub sources: Vec<String>,
}

/// A course record owned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Class identifier
    pub id: String,
    /// Full class name
    pub name: String,
    /// Course code (e.g. `CMPSC 131`)
    pub code: String,
    /// Instructor name
    pub instructor: String,
    /// Meeting schedule
    pub schedule: String,
    /// Semester label
    pub semester: String,
    /// Accent color used when rendering the class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
