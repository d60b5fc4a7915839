//! HTTP class client
//!
//! Read-only pass-through over `GET /users/{user_id}/classes[/{id}]`.

use super::wire::ClassesResponse;
use super::{build_http_client, decode_response, endpoint, transport_error, ClassBackend};
use crate::config::ApiConfig;
use crate::error::Result;
use crate::models::ClassRecord;

use async_trait::async_trait;
use reqwest::Client;

/// Class API client over HTTP
pub struct HttpClassClient {
    client: Client,
    config: ApiConfig,
}

impl HttpClassClient {
    /// Create a new class client
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = build_http_client(config.timeout_seconds)?;
        Ok(Self { client, config })
    }

    fn classes_url(&self, class_id: Option<&str>) -> Result<url::Url> {
        let user_id = self.config.user_id()?;
        let base = self.config.base_url()?;
        match class_id {
            Some(id) => endpoint(&base, &["users", user_id, "classes", id]),
            None => endpoint(&base, &["users", user_id, "classes"]),
        }
    }
}

#[async_trait]
impl ClassBackend for HttpClassClient {
    async fn list_classes(&self) -> Result<Vec<ClassRecord>> {
        let url = self.classes_url(None)?;
        tracing::debug!("Fetching classes: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error("Fetch classes", e))?;
        let body: ClassesResponse = decode_response("Fetch classes", response).await?;

        tracing::debug!(count = body.classes.len(), "Classes fetched");
        Ok(body.classes)
    }

    async fn get_class(&self, class_id: &str) -> Result<ClassRecord> {
        let url = self.classes_url(Some(class_id))?;
        tracing::debug!("Fetching class: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error("Fetch class", e))?;
        decode_response("Fetch class", response).await
    }
}
