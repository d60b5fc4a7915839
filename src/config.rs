//! Configuration management for coursechat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//!
//! Backend location and user identity are optional at load time. A missing
//! value only becomes an error when the first request that needs it is built.

use crate::error::{CourseChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Main configuration structure for coursechat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend endpoints and identity
    #[serde(default)]
    pub api: ApiConfig,
    /// Interactive chat behavior
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the chat and class API (e.g. `https://host/dev`)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Base URL of the question-answering service
    ///
    /// Falls back to `base_url` when unset.
    #[serde(default)]
    pub rag_url: Option<String>,

    /// Identifier of the user whose chats and classes are shown
    #[serde(default)]
    pub user_id: Option<String>,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            rag_url: None,
            user_id: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl ApiConfig {
    /// Parsed chat/class API base URL
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the value is unset or not a URL
    pub fn base_url(&self) -> Result<Url> {
        let raw = self.base_url.as_deref().ok_or_else(|| {
            CourseChatError::Config(
                "api.base_url is not set (config file or COURSECHAT_API_BASE_URL)".to_string(),
            )
        })?;
        parse_base_url("api.base_url", raw)
    }

    /// Parsed question-answering base URL, defaulting to the API base URL
    ///
    /// # Errors
    ///
    /// Returns a configuration error if neither value is set or the value
    /// is not a URL
    pub fn rag_url(&self) -> Result<Url> {
        match self.rag_url.as_deref() {
            Some(raw) => parse_base_url("api.rag_url", raw),
            None => self.base_url(),
        }
    }

    /// Configured user identifier
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no user id is configured
    pub fn user_id(&self) -> Result<&str> {
        self.user_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                CourseChatError::Config(
                    "api.user_id is not set (config file or COURSECHAT_USER_ID)".to_string(),
                )
                .into()
            })
    }
}

fn parse_base_url(field: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| CourseChatError::Config(format!("{} is not a valid URL: {}", field, e)))?;
    if url.cannot_be_a_base() {
        return Err(CourseChatError::Config(format!("{} cannot be used as a base URL", field)).into());
    }
    Ok(url)
}

/// Interactive chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Ask before deleting a chat session
    #[serde(default = "default_confirm_delete")]
    pub confirm_delete: bool,
}

fn default_confirm_delete() -> bool {
    true
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            confirm_delete: default_confirm_delete(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(CourseChatError::Io)?;
        let config = serde_yaml::from_str(&contents).map_err(CourseChatError::Yaml)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("COURSECHAT_API_BASE_URL") {
            tracing::debug!(base_url = %base_url, "Env override: COURSECHAT_API_BASE_URL");
            self.api.base_url = Some(base_url);
        }

        if let Ok(rag_url) = std::env::var("COURSECHAT_RAG_URL") {
            tracing::debug!(rag_url = %rag_url, "Env override: COURSECHAT_RAG_URL");
            self.api.rag_url = Some(rag_url);
        }

        if let Ok(user_id) = std::env::var("COURSECHAT_USER_ID") {
            tracing::debug!(user_id = %user_id, "Env override: COURSECHAT_USER_ID");
            self.api.user_id = Some(user_id);
        }

        if let Ok(timeout) = std::env::var("COURSECHAT_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid COURSECHAT_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(base_url) = &cli.base_url {
            self.api.base_url = Some(base_url.clone());
        }

        if let Some(user_id) = &cli.user_id {
            self.api.user_id = Some(user_id.clone());
        }
    }

    /// Validate the configuration
    ///
    /// Only values that are present are checked; absent endpoints and user
    /// ids are reported by the first call that needs them.
    ///
    /// # Errors
    ///
    /// Returns error if a present value is malformed or out of range
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_seconds == 0 {
            return Err(
                CourseChatError::Config("api.timeout_seconds must be greater than 0".to_string())
                    .into(),
            );
        }

        if self.api.base_url.is_some() {
            self.api.base_url()?;
        }

        if self.api.rag_url.is_some() {
            self.api.rag_url()?;
        }

        Ok(())
    }
}
