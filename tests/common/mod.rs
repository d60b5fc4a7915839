use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use coursechat::config::ApiConfig;
use wiremock::MockServer;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// API config pointing both base URLs at the mock server
#[allow(dead_code)]
pub fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: Some(server.uri()),
        rag_url: Some(server.uri()),
        user_id: Some("user123".to_string()),
        timeout_seconds: 5,
    }
}

#[allow(dead_code)]
pub fn chat_summary(id: &str, title: &str, updated_at: &str, count: usize) -> Value {
    json!({
        "chat_id": id,
        "user_id": "user123",
        "title": title,
        "created_at": "2024-03-01T09:00:00.000000",
        "updated_at": updated_at,
        "message_count": count
    })
}

#[allow(dead_code)]
pub fn chat_detail(id: &str, messages: &[(&str, &str)]) -> Value {
    let messages: Vec<Value> = messages
        .iter()
        .map(|(role, content)| {
            json!({
                "role": role,
                "content": content,
                "timestamp": "2024-03-01T09:00:00.000000"
            })
        })
        .collect();
    json!({
        "chat": {
            "chat_id": id,
            "user_id": "user123",
            "title": "Midterm prep",
            "created_at": "2024-03-01T09:00:00.000000",
            "updated_at": "2024-03-01T09:05:00.000000",
            "messages": messages,
            "metadata": {}
        }
    })
}

#[allow(dead_code)]
pub fn created(id: &str) -> Value {
    json!({
        "message": "Chat created successfully",
        "chat_id": id,
        "title": "When is the midterm?",
        "created_at": "2024-03-01T09:00:00.000000",
        "user_id": "user123"
    })
}

#[allow(dead_code)]
pub fn appended(id: &str, total: usize) -> Value {
    json!({
        "message": "Message added successfully",
        "chat_id": id,
        "updated_at": "2024-03-01T09:01:00.000000",
        "total_messages": total
    })
}
