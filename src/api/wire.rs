//! Wire schema of the backend API
//!
//! Request and response bodies exactly as the backend sends them
//! (snake_case, string timestamps), plus the conversions into the
//! view-model types of [`crate::models`]. Nothing outside [`crate::api`]
//! should need these types.

use crate::models::{
    AppendedMessage, ChatDetail, ChatMessage, ChatSession, ClassRecord, CreatedSession,
    MessageIdGenerator, Role,
};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Title the backend reports for chats created without one
const UNTITLED_CHAT: &str = "Untitled Chat";

fn default_title() -> String {
    UNTITLED_CHAT.to_string()
}

/// Parse a backend timestamp
///
/// Accepts RFC 3339 (`2024-01-02T00:00:00Z`) and the naive ISO-8601 form the
/// backend writes (`2024-01-02T00:00:00.123456`), which is UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

/// One stored message
#[derive(Debug, Clone, Deserialize)]
pub struct ApiChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Chat summary from `GET /chats`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiChatSession {
    pub chat_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub message_count: usize,
}

impl ApiChatSession {
    /// Convert into the session-list view-model
    pub fn into_session(self) -> ChatSession {
        ChatSession {
            id: self.chat_id,
            title: self.title,
            last_message: None,
            created_at: self.created_at,
            updated_at: self.updated_at,
            message_count: self.message_count,
        }
    }
}

/// Full chat from `GET /chats/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiChatDetail {
    pub chat_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<ApiChatMessage>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl ApiChatDetail {
    /// Convert into the view-model, assigning local ids in array order
    pub fn into_detail(self, ids: &MessageIdGenerator) -> ChatDetail {
        let messages = self
            .messages
            .into_iter()
            .map(|m| ChatMessage::new(ids.next_id(), m.role, m.content, m.timestamp))
            .collect();

        ChatDetail {
            id: self.chat_id,
            title: self.title,
            created_at: self.created_at,
            updated_at: self.updated_at,
            messages,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetChatsResponse {
    pub chats: Vec<ApiChatSession>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct GetChatResponse {
    pub chat: ApiChatDetail,
}

#[derive(Debug, Serialize)]
pub struct CreateChatRequest<'a> {
    pub user_id: &'a str,
    pub message: &'a str,
    pub role: Role,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct CreateChatResponse {
    #[serde(default)]
    pub message: String,
    pub chat_id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user_id: String,
}

impl CreateChatResponse {
    pub fn into_created(self) -> CreatedSession {
        CreatedSession {
            chat_id: self.chat_id,
            title: self.title,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AppendMessageRequest<'a> {
    pub message: &'a str,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct AppendMessageResponse {
    #[serde(default)]
    pub message: String,
    pub chat_id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub total_messages: usize,
}

impl AppendMessageResponse {
    pub fn into_appended(self) -> AppendedMessage {
        AppendedMessage {
            chat_id: self.chat_id,
            updated_at: self.updated_at,
            total_messages: self.total_messages,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteChatResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub chat_id: String,
}

#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub question: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ClassesResponse {
    pub classes: Vec<ClassRecord>,
}

/// Error body the backend returns with non-success statuses
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Best human-readable message for a failed response body
    pub fn describe(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                message: Some(message),
                error: Some(error),
            }) => format!("{} ({})", message, error),
            Ok(ErrorBody {
                message: Some(message),
                error: None,
            }) => message,
            _ => body.trim().to_string(),
        }
    }
}
