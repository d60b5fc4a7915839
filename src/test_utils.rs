//! Test utilities for coursechat
//!
//! Provides temporary config files and scripted backends whose calls can be
//! recorded, failed on demand, or held open to interleave operations.

use crate::api::{ChatBackend, ChatStore, ClassBackend, MemoryChatBackend};
use crate::error::{CourseChatError, Result};
use crate::models::{
    Answer, AppendedMessage, ChatDetail, ChatSession, ClassRecord, CreatedSession, Role,
};

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;
use tokio::sync::Notify;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Write a config file named `config.yaml` into `dir`
pub fn create_config_file(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, content).expect("Failed to write config file");
    path
}

/// Build an answer with the given source documents
pub fn answer_with_sources(answer: &str, sources: &[&str]) -> Answer {
    Answer {
        answer: answer.to_string(),
        sources: sources.iter().map(|s| s.to_string()).collect(),
    }
}

/// A class record with predictable fields
pub fn sample_class(id: &str, code: &str) -> ClassRecord {
    ClassRecord {
        id: id.to_string(),
        name: format!("Course {}", code),
        code: code.to_string(),
        instructor: "Dr. Smith".to_string(),
        schedule: "MWF 10:00-10:50".to_string(),
        semester: "Fall 2024".to_string(),
        color: Some("#4A90E2".to_string()),
        description: None,
    }
}

fn scripted_failure(call: &str) -> anyhow::Error {
    CourseChatError::Api {
        status: 500,
        message: format!("scripted failure: {}", call),
    }
    .into()
}

#[derive(Default)]
struct Gate {
    started: Notify,
    release: Notify,
}

impl Gate {
    async fn pass(&self) {
        self.started.notify_one();
        self.release.notified().await;
    }
}

/// Chat backend over an in-memory store with scripted failures
///
/// Failure keys are `list`, `get`, `create`, `append:user`,
/// `append:assistant`, `delete` and `ask`.
pub struct ScriptedBackend {
    inner: MemoryChatBackend,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    create_gate: Option<Gate>,
    ask_gate: Option<Gate>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    /// Backend that echoes questions
    pub fn new() -> Self {
        Self {
            inner: MemoryChatBackend::new(ChatStore::new()),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            create_gate: None,
            ask_gate: None,
        }
    }

    /// Backend that always answers with `answer`
    pub fn with_answer(answer: Answer) -> Self {
        let mut backend = Self::new();
        backend.inner =
            MemoryChatBackend::new(ChatStore::new()).with_responder(move |_| answer.clone());
        backend
    }

    /// Hold every `create_session` call until [`Self::release_create`]
    pub fn hold_create(mut self) -> Self {
        self.create_gate = Some(Gate::default());
        self
    }

    /// Hold every `ask_question` call until [`Self::release_ask`]
    pub fn hold_ask(mut self) -> Self {
        self.ask_gate = Some(Gate::default());
        self
    }

    /// Wait until a held `create_session` call has started
    pub async fn create_started(&self) {
        if let Some(gate) = &self.create_gate {
            gate.started.notified().await;
        }
    }

    /// Let a held `create_session` call proceed
    pub fn release_create(&self) {
        if let Some(gate) = &self.create_gate {
            gate.release.notify_one();
        }
    }

    /// Wait until a held `ask_question` call has started
    pub async fn ask_started(&self) {
        if let Some(gate) = &self.ask_gate {
            gate.started.notified().await;
        }
    }

    /// Let a held `ask_question` call proceed
    pub fn release_ask(&self) {
        if let Some(gate) = &self.ask_gate {
            gate.release.notify_one();
        }
    }

    /// Make calls matching `key` fail
    pub fn fail(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    /// Make calls matching `key` succeed again
    pub fn recover(&self, key: &str) {
        self.failing.lock().unwrap().remove(key);
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// The underlying store
    pub fn store(&self) -> &ChatStore {
        self.inner.store()
    }

    /// Store a chat directly, bypassing the call log
    pub async fn seed_chat(&self, messages: &[(Role, &str)]) -> String {
        let (first, rest) = messages.split_first().expect("at least one message");
        let created = self.inner.create_session(first.1).await.unwrap();
        for (role, text) in rest {
            self.inner
                .append_message(&created.chat_id, text, *role)
                .await
                .unwrap();
        }
        created.chat_id
    }

    fn record(&self, call: String, key: &str) -> Result<()> {
        self.calls.lock().unwrap().push(call.clone());
        if self.failing.lock().unwrap().contains(key) {
            return Err(scripted_failure(&call));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn list_sessions(&self) -> Result<Vec<ChatSession>> {
        self.record("list".to_string(), "list")?;
        self.inner.list_sessions().await
    }

    async fn get_session(&self, chat_id: &str) -> Result<ChatDetail> {
        self.record(format!("get:{}", chat_id), "get")?;
        self.inner.get_session(chat_id).await
    }

    async fn create_session(&self, first_message: &str) -> Result<CreatedSession> {
        if let Some(gate) = &self.create_gate {
            gate.pass().await;
        }
        self.record("create".to_string(), "create")?;
        self.inner.create_session(first_message).await
    }

    async fn append_message(
        &self,
        chat_id: &str,
        text: &str,
        role: Role,
    ) -> Result<AppendedMessage> {
        self.record(
            format!("append:{}:{}", chat_id, role),
            &format!("append:{}", role),
        )?;
        self.inner.append_message(chat_id, text, role).await
    }

    async fn delete_session(&self, chat_id: &str) -> Result<()> {
        self.record(format!("delete:{}", chat_id), "delete")?;
        self.inner.delete_session(chat_id).await
    }

    async fn ask_question(&self, question: &str) -> Result<Answer> {
        if let Some(gate) = &self.ask_gate {
            gate.pass().await;
        }
        self.record("ask".to_string(), "ask")?;
        self.inner.ask_question(question).await
    }
}

/// Class backend over a fixed list
#[derive(Default)]
pub struct StaticClassBackend {
    classes: Vec<ClassRecord>,
    fail_with: Option<u16>,
    calls: Mutex<usize>,
}

impl StaticClassBackend {
    /// Backend serving `classes`
    pub fn new(classes: Vec<ClassRecord>) -> Self {
        Self {
            classes,
            ..Default::default()
        }
    }

    /// Backend whose every call fails with HTTP `status`
    pub fn failing(status: u16) -> Self {
        Self {
            fail_with: Some(status),
            ..Default::default()
        }
    }

    /// Number of calls received
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn check(&self) -> Result<()> {
        *self.calls.lock().unwrap() += 1;
        match self.fail_with {
            Some(404) => Err(CourseChatError::NotFound("class".to_string()).into()),
            Some(status) => Err(CourseChatError::Api {
                status,
                message: "Internal server error".to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClassBackend for StaticClassBackend {
    async fn list_classes(&self) -> Result<Vec<ClassRecord>> {
        self.check()?;
        Ok(self.classes.clone())
    }

    async fn get_class(&self, class_id: &str) -> Result<ClassRecord> {
        self.check()?;
        self.classes
            .iter()
            .find(|c| c.id == class_id)
            .cloned()
            .ok_or_else(|| CourseChatError::NotFound(format!("class {}", class_id)).into())
    }
}
