//! coursechat - course assistant chat client library
//!
//! This library provides a client for a course assistant backend: chat
//! sessions stored server-side, a question-answering endpoint that cites
//! course materials, and read-only class records.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Backend traits, HTTP clients, wire schema and an in-memory backend
//! - `models`: View-model types for chats, messages and classes
//! - `controller`: Chat session controller with optimistic updates
//! - `sidebar`: Session list with refresh tracking and guarded deletion
//! - `classes`: Class list and detail state
//! - `render`: Terminal rendering
//! - `commands`: CLI command handlers
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use coursechat::api::HttpChatClient;
//! use coursechat::{ChatController, Config};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let client = HttpChatClient::new(config.api.clone())?;
//!     let controller = ChatController::new(Arc::new(client));
//!     controller.send_message("When is the midterm?").await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod classes;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod render;
pub mod sidebar;

// Re-export commonly used types
pub use api::{ChatBackend, ClassBackend};
pub use classes::ClassBrowser;
pub use config::Config;
pub use controller::{ChatController, SendOutcome, SessionPhase};
pub use error::{CourseChatError, Result};
pub use models::{ChatMessage, ChatSession, ClassRecord, MessageId, Role, Sender};
pub use sidebar::SessionList;

#[cfg(test)]
pub mod test_utils;
