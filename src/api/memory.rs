//! In-memory chat backend
//!
//! [`MemoryChatBackend`] keeps sessions in a [`ChatStore`] handed to it at
//! construction time. Each store is an isolated value: tests create their
//! own, and the CLI `--offline` mode creates one per run. Questions are
//! answered by a pluggable responder that echoes the question by default.

use super::ChatBackend;
use crate::error::{CourseChatError, Result};
use crate::models::{
    Answer, AppendedMessage, ChatDetail, ChatMessage, ChatSession, CreatedSession,
    MessageIdGenerator, Role,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

/// Number of words of the first message used as a chat title
const TITLE_WORDS: usize = 6;

/// Function producing the answer to a question
pub type Responder = Box<dyn Fn(&str) -> Answer + Send + Sync>;

#[derive(Debug, Clone)]
struct StoredMessage {
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredChat {
    id: String,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    messages: Vec<StoredMessage>,
}

impl StoredChat {
    fn summary(&self) -> ChatSession {
        ChatSession {
            id: self.id.clone(),
            title: self.title.clone(),
            last_message: self.messages.last().map(|m| m.content.clone()),
            created_at: self.created_at,
            updated_at: self.updated_at,
            message_count: self.messages.len(),
        }
    }
}

/// Shared storage for [`MemoryChatBackend`]
///
/// Cloning a store yields a handle to the same sessions.
#[derive(Debug, Clone, Default)]
pub struct ChatStore {
    chats: Arc<Mutex<Vec<StoredChat>>>,
}

impl ChatStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions
    pub fn len(&self) -> usize {
        self.lock().map(|chats| chats.len()).unwrap_or(0)
    }

    /// True when no session is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Roles and contents of one session's messages, in order
    pub fn transcript(&self, chat_id: &str) -> Option<Vec<(Role, String)>> {
        let chats = self.lock().ok()?;
        chats.iter().find(|c| c.id == chat_id).map(|chat| {
            chat.messages
                .iter()
                .map(|m| (m.role, m.content.clone()))
                .collect()
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredChat>>> {
        self.chats
            .lock()
            .map_err(|_| CourseChatError::Store("lock poisoned".to_string()).into())
    }
}

/// Derive a title from the first message: its first few words
pub fn title_from_message(message: &str) -> String {
    let words: Vec<&str> = message.split_whitespace().collect();
    let mut title = words
        .iter()
        .take(TITLE_WORDS)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if words.len() > TITLE_WORDS {
        title.push_str("...");
    }
    title
}

/// Chat backend over a [`ChatStore`]
pub struct MemoryChatBackend {
    store: ChatStore,
    ids: Arc<MessageIdGenerator>,
    responder: Responder,
}

impl MemoryChatBackend {
    /// Create a backend over `store` that answers `Echo: <question>`
    pub fn new(store: ChatStore) -> Self {
        Self {
            store,
            ids: Arc::new(MessageIdGenerator::new()),
            responder: Box::new(|question| Answer {
                answer: format!("Echo: {}", question),
                sources: Vec::new(),
            }),
        }
    }

    /// Replace the question responder
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&str) -> Answer + Send + Sync + 'static,
    {
        self.responder = Box::new(responder);
        self
    }

    /// Number loaded messages from a shared generator
    pub fn with_id_generator(mut self, ids: Arc<MessageIdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Handle to the underlying store
    pub fn store(&self) -> &ChatStore {
        &self.store
    }
}

#[async_trait]
impl ChatBackend for MemoryChatBackend {
    async fn list_sessions(&self) -> Result<Vec<ChatSession>> {
        let chats = self.store.lock()?;
        let mut sessions: Vec<ChatSession> = chats.iter().map(StoredChat::summary).collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    async fn get_session(&self, chat_id: &str) -> Result<ChatDetail> {
        let chats = self.store.lock()?;
        let chat = chats
            .iter()
            .find(|c| c.id == chat_id)
            .ok_or_else(|| CourseChatError::NotFound(format!("chat {}", chat_id)))?;

        Ok(ChatDetail {
            id: chat.id.clone(),
            title: chat.title.clone(),
            created_at: chat.created_at,
            updated_at: chat.updated_at,
            messages: chat
                .messages
                .iter()
                .map(|m| ChatMessage::new(self.ids.next_id(), m.role, &m.content, m.timestamp))
                .collect(),
        })
    }

    async fn create_session(&self, first_message: &str) -> Result<CreatedSession> {
        if first_message.trim().is_empty() {
            return Err(CourseChatError::Api {
                status: 400,
                message: "message is required".to_string(),
            }
            .into());
        }

        let now = Utc::now();
        let chat = StoredChat {
            id: uuid::Uuid::new_v4().to_string(),
            title: title_from_message(first_message),
            created_at: now,
            updated_at: now,
            messages: vec![StoredMessage {
                role: Role::User,
                content: first_message.to_string(),
                timestamp: now,
            }],
        };
        let created = CreatedSession {
            chat_id: chat.id.clone(),
            title: chat.title.clone(),
            created_at: now,
        };

        self.store.lock()?.push(chat);
        tracing::debug!(chat_id = %created.chat_id, "Stored new chat in memory");
        Ok(created)
    }

    async fn append_message(
        &self,
        chat_id: &str,
        text: &str,
        role: Role,
    ) -> Result<AppendedMessage> {
        let mut chats = self.store.lock()?;
        let chat = chats
            .iter_mut()
            .find(|c| c.id == chat_id)
            .ok_or_else(|| CourseChatError::NotFound(format!("chat {}", chat_id)))?;

        let now = Utc::now();
        chat.messages.push(StoredMessage {
            role,
            content: text.to_string(),
            timestamp: now,
        });
        chat.updated_at = now;

        Ok(AppendedMessage {
            chat_id: chat.id.clone(),
            updated_at: now,
            total_messages: chat.messages.len(),
        })
    }

    async fn delete_session(&self, chat_id: &str) -> Result<()> {
        let mut chats = self.store.lock()?;
        let before = chats.len();
        chats.retain(|c| c.id != chat_id);
        if chats.len() == before {
            return Err(CourseChatError::NotFound(format!("chat {}", chat_id)).into());
        }
        Ok(())
    }

    async fn ask_question(&self, question: &str) -> Result<Answer> {
        Ok((self.responder)(question))
    }
}
