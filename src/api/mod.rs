//! Backend API clients
//!
//! This module contains the backend abstraction and its implementations:
//! HTTP clients for the chat and class APIs, and an in-memory chat backend
//! that works against an explicit [`memory::ChatStore`].
//!
//! The clients are the only code that knows the wire schema
//! ([`wire`]); everything they return is a view-model from
//! [`crate::models`].

pub mod chat;
pub mod classes;
pub mod memory;
pub mod wire;

pub use chat::HttpChatClient;
pub use classes::HttpClassClient;
pub use memory::{ChatStore, MemoryChatBackend};

use crate::error::{CourseChatError, Result};
use crate::models::{
    Answer, AppendedMessage, ChatDetail, ChatSession, ClassRecord, CreatedSession, Role,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Chat session operations of the backend
///
/// Every failure is returned to the caller unmodified; implementations never
/// retry.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// List the user's sessions, most recently updated first
    async fn list_sessions(&self) -> Result<Vec<ChatSession>>;

    /// Fetch one session with its full message history
    async fn get_session(&self, chat_id: &str) -> Result<ChatDetail>;

    /// Create a session seeded with its first user message
    async fn create_session(&self, first_message: &str) -> Result<CreatedSession>;

    /// Append one message to an existing session
    async fn append_message(&self, chat_id: &str, text: &str, role: Role)
        -> Result<AppendedMessage>;

    /// Delete a session
    async fn delete_session(&self, chat_id: &str) -> Result<()>;

    /// Ask the question-answering service
    async fn ask_question(&self, question: &str) -> Result<Answer>;
}

/// Read-only class operations of the backend
#[async_trait]
pub trait ClassBackend: Send + Sync {
    /// List all classes of the user
    async fn list_classes(&self) -> Result<Vec<ClassRecord>>;

    /// Fetch one class by id
    async fn get_class(&self, class_id: &str) -> Result<ClassRecord>;
}

/// Build the shared reqwest client
pub(crate) fn build_http_client(timeout_seconds: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("coursechat/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| CourseChatError::Http(e).into())
}

/// Append path segments to a base URL, percent-encoding each segment
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| CourseChatError::Config(format!("{} cannot be used as a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Map a transport failure into the crate error type
pub(crate) fn transport_error(what: &str, err: reqwest::Error) -> anyhow::Error {
    tracing::warn!("{} failed: {}", what, err);
    CourseChatError::Transport(format!("{}: {}", what, err)).into()
}

/// Check the status of a response and decode its JSON body
///
/// 404 becomes [`CourseChatError::NotFound`], any other non-success status
/// becomes [`CourseChatError::Api`] carrying the backend's message.
pub(crate) async fn decode_response<T: DeserializeOwned>(
    what: &str,
    response: Response,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        let message = wire::ErrorBody::describe(&error_text);
        tracing::error!("{} returned error {}: {}", what, status, message);

        if status == StatusCode::NOT_FOUND {
            return Err(CourseChatError::NotFound(format!("{}: {}", what, message)).into());
        }
        return Err(CourseChatError::Api {
            status: status.as_u16(),
            message,
        }
        .into());
    }

    response.json::<T>().await.map_err(|e| {
        tracing::error!("Failed to parse {} response: {}", what, e);
        CourseChatError::Decode(format!("{}: {}", what, e)).into()
    })
}
