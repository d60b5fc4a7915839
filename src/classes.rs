//! Class list and detail views
//!
//! Thin state holders over a [`ClassBackend`]. Failures are turned into a
//! user-facing message and kept until the next fetch.

use crate::api::ClassBackend;
use crate::error::CourseChatError;
use crate::models::ClassRecord;

use std::sync::Arc;

/// Message for a detail request without an id
pub const NO_CLASS_ID: &str = "No class ID provided";

/// User-facing description of a failed class request
pub fn describe_failure(err: &anyhow::Error) -> String {
    match err.downcast_ref::<CourseChatError>() {
        Some(CourseChatError::Api { status, .. }) => format!("HTTP error! status: {}", status),
        Some(CourseChatError::NotFound(_)) => "HTTP error! status: 404".to_string(),
        Some(other) => other.to_string(),
        None => err.to_string(),
    }
}

/// State of the class list and the open class
pub struct ClassBrowser {
    backend: Arc<dyn ClassBackend>,
    classes: Vec<ClassRecord>,
    selected: Option<ClassRecord>,
    loading: bool,
    error: Option<String>,
}

impl ClassBrowser {
    /// Create a browser that has not fetched anything yet
    pub fn new(backend: Arc<dyn ClassBackend>) -> Self {
        Self {
            backend,
            classes: Vec::new(),
            selected: None,
            loading: false,
            error: None,
        }
    }

    /// Classes as last fetched
    pub fn classes(&self) -> &[ClassRecord] {
        &self.classes
    }

    /// The class opened by the last successful [`Self::open`]
    pub fn selected(&self) -> Option<&ClassRecord> {
        self.selected.as_ref()
    }

    /// User-facing error of the last failed fetch
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while a fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Fetch the class list; call again to retry after an error
    pub async fn refetch(&mut self) -> bool {
        self.loading = true;
        self.error = None;
        let result = self.backend.list_classes().await;
        self.loading = false;

        match result {
            Ok(classes) => {
                tracing::debug!(count = classes.len(), "Classes loaded");
                self.classes = classes;
                true
            }
            Err(e) => {
                tracing::error!("Failed to fetch classes: {:#}", e);
                self.classes.clear();
                self.error = Some(describe_failure(&e));
                false
            }
        }
    }

    /// Fetch one class and make it the selected one
    pub async fn open(&mut self, class_id: &str) -> Option<&ClassRecord> {
        self.selected = None;
        let class_id = class_id.trim();
        if class_id.is_empty() {
            self.error = Some(NO_CLASS_ID.to_string());
            return None;
        }

        self.loading = true;
        self.error = None;
        let result = self.backend.get_class(class_id).await;
        self.loading = false;

        match result {
            Ok(class) => {
                self.selected = Some(class);
                self.selected.as_ref()
            }
            Err(e) => {
                tracing::error!("Failed to fetch class {}: {:#}", class_id, e);
                self.error = Some(describe_failure(&e));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_class, StaticClassBackend};

    #[tokio::test]
    async fn test_refetch_lists_classes() {
        let backend = Arc::new(StaticClassBackend::new(vec![
            sample_class("cs101", "CMPSC 131"),
            sample_class("math140", "MATH 140"),
        ]));
        let mut browser = ClassBrowser::new(backend);

        assert!(browser.refetch().await);
        assert_eq!(browser.classes().len(), 2);
        assert!(browser.error().is_none());
    }

    #[tokio::test]
    async fn test_refetch_failure_message() {
        let backend = Arc::new(StaticClassBackend::failing(500));
        let mut browser = ClassBrowser::new(backend.clone());

        assert!(!browser.refetch().await);
        assert_eq!(browser.error(), Some("HTTP error! status: 500"));
        assert!(browser.classes().is_empty());

        assert!(!browser.refetch().await);
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_open_class() {
        let backend = Arc::new(StaticClassBackend::new(vec![sample_class("cs101", "CMPSC 131")]));
        let mut browser = ClassBrowser::new(backend);

        let class = browser.open("cs101").await.expect("class found");
        assert_eq!(class.code, "CMPSC 131");
        assert_eq!(browser.selected().map(|c| c.id.as_str()), Some("cs101"));
    }

    #[tokio::test]
    async fn test_open_missing_class() {
        let backend = Arc::new(StaticClassBackend::new(Vec::new()));
        let mut browser = ClassBrowser::new(backend);

        assert!(browser.open("nope").await.is_none());
        assert_eq!(browser.error(), Some("HTTP error! status: 404"));
    }

    #[tokio::test]
    async fn test_open_without_id_skips_backend() {
        let backend = Arc::new(StaticClassBackend::new(Vec::new()));
        let mut browser = ClassBrowser::new(backend.clone());

        assert!(browser.open("  ").await.is_none());
        assert_eq!(browser.error(), Some(NO_CLASS_ID));
        assert_eq!(backend.call_count(), 0);
    }
}
