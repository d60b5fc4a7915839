//! HTTP chat client
//!
//! Implements [`ChatBackend`] against the chat REST API and the
//! question-answering endpoint. This is the only place that translates
//! between the wire schema and the chat view-models.

use super::wire::{
    AppendMessageRequest, AppendMessageResponse, CreateChatRequest, CreateChatResponse,
    DeleteChatResponse, GetChatResponse, GetChatsResponse, QueryRequest,
};
use super::{build_http_client, decode_response, endpoint, transport_error, ChatBackend};
use crate::config::ApiConfig;
use crate::error::Result;
use crate::models::{
    Answer, AppendedMessage, ChatDetail, ChatSession, CreatedSession, MessageIdGenerator, Role,
};

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;

/// Path of the question-answering endpoint, relative to the RAG base URL
const QUERY_PATH: &str = "query-rag";

/// Chat API client over HTTP
///
/// Base URLs and the user id are read from the configuration on every call,
/// so a missing value surfaces as a configuration error on first use rather
/// than at construction.
///
/// # Examples
///
/// ```no_run
/// use coursechat::api::{ChatBackend, HttpChatClient};
/// use coursechat::config::ApiConfig;
///
/// # async fn example() -> coursechat::error::Result<()> {
/// let config = ApiConfig {
///     base_url: Some("https://api.example.com/dev".to_string()),
///     user_id: Some("user123".to_string()),
///     ..Default::default()
/// };
/// let client = HttpChatClient::new(config)?;
/// let sessions = client.list_sessions().await?;
/// # Ok(())
/// # }
/// ```
pub struct HttpChatClient {
    client: Client,
    config: ApiConfig,
    ids: Arc<MessageIdGenerator>,
}

impl HttpChatClient {
    /// Create a new chat client
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: ApiConfig) -> Result<Self> {
        Self::with_id_generator(config, Arc::new(MessageIdGenerator::new()))
    }

    /// Create a chat client that numbers loaded messages from `ids`
    ///
    /// Sharing the generator with a [`crate::controller::ChatController`]
    /// keeps ids of loaded and locally created messages in one sequence.
    pub fn with_id_generator(config: ApiConfig, ids: Arc<MessageIdGenerator>) -> Result<Self> {
        let client = build_http_client(config.timeout_seconds)?;

        tracing::info!(
            "Initialized chat client: base_url={}, user_id={}",
            config.base_url.as_deref().unwrap_or("<unset>"),
            config.user_id.as_deref().unwrap_or("<unset>")
        );

        Ok(Self {
            client,
            config,
            ids,
        })
    }
}

#[async_trait]
impl ChatBackend for HttpChatClient {
    #[tracing::instrument(skip(self))]
    async fn list_sessions(&self) -> Result<Vec<ChatSession>> {
        let user_id = self.config.user_id()?;
        let mut url = endpoint(&self.config.base_url()?, &["chats"])?;
        url.query_pairs_mut().append_pair("user_id", user_id);
        tracing::debug!("Listing chats: {}", url);

        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error("List chats", e))?;
        let body: GetChatsResponse = decode_response("List chats", response).await?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            count = body.chats.len(),
            "Chats listed"
        );
        Ok(body.chats.into_iter().map(|c| c.into_session()).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_session(&self, chat_id: &str) -> Result<ChatDetail> {
        let url = endpoint(&self.config.base_url()?, &["chats", chat_id])?;
        tracing::debug!("Fetching chat: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error("Get chat", e))?;
        let body: GetChatResponse = decode_response("Get chat", response).await?;

        Ok(body.chat.into_detail(&self.ids))
    }

    #[tracing::instrument(skip(self, first_message))]
    async fn create_session(&self, first_message: &str) -> Result<CreatedSession> {
        let user_id = self.config.user_id()?;
        let url = endpoint(&self.config.base_url()?, &["chats"])?;
        let request = CreateChatRequest {
            user_id,
            message: first_message,
            role: Role::User,
            metadata: serde_json::json!({}),
        };
        tracing::debug!("Creating chat: {}", url);

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("Create chat", e))?;
        let body: CreateChatResponse = decode_response("Create chat", response).await?;

        tracing::info!(chat_id = %body.chat_id, title = %body.title, "Chat created");
        Ok(body.into_created())
    }

    #[tracing::instrument(skip(self, text))]
    async fn append_message(
        &self,
        chat_id: &str,
        text: &str,
        role: Role,
    ) -> Result<AppendedMessage> {
        let url = endpoint(&self.config.base_url()?, &["chats", chat_id, "messages"])?;
        let request = AppendMessageRequest {
            message: text,
            role,
        };

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("Append message", e))?;
        let body: AppendMessageResponse = decode_response("Append message", response).await?;

        tracing::debug!(total_messages = body.total_messages, "Message appended");
        Ok(body.into_appended())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_session(&self, chat_id: &str) -> Result<()> {
        let url = endpoint(&self.config.base_url()?, &["chats", chat_id])?;

        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| transport_error("Delete chat", e))?;
        let body: DeleteChatResponse = decode_response("Delete chat", response).await?;

        tracing::info!(chat_id = %chat_id, "{}", body.message);
        Ok(())
    }

    #[tracing::instrument(skip(self, question))]
    async fn ask_question(&self, question: &str) -> Result<Answer> {
        let url = endpoint(&self.config.rag_url()?, &[QUERY_PATH])?;
        tracing::debug!("Asking question: {}", url);

        let start = Instant::now();
        let response = self
            .client
            .post(url)
            .json(&QueryRequest { question })
            .send()
            .await
            .map_err(|e| transport_error("Ask question", e))?;
        let answer: Answer = decode_response("Ask question", response).await?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            sources = answer.sources.len(),
            "Answer received"
        );
        Ok(answer)
    }
}
