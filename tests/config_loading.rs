mod common;

use serial_test::serial;

use coursechat::cli::Cli;
use coursechat::config::Config;
use coursechat::error::CourseChatError;

use common::temp_config_file;

const ENV_VARS: [&str; 4] = [
    "COURSECHAT_API_BASE_URL",
    "COURSECHAT_RAG_URL",
    "COURSECHAT_USER_ID",
    "COURSECHAT_TIMEOUT_SECONDS",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

const FILE_CONFIG: &str = r#"
api:
  base_url: https://file.example.com/dev
  rag_url: https://rag.example.com
  user_id: file-user
  timeout_seconds: 20
chat:
  confirm_delete: false
"#;

#[test]
#[serial]
fn test_load_from_file() {
    clear_env();
    let (_dir, path) = temp_config_file(FILE_CONFIG);

    let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
    config.validate().unwrap();

    assert_eq!(
        config.api.base_url().unwrap().as_str(),
        "https://file.example.com/dev"
    );
    assert_eq!(config.api.rag_url().unwrap().as_str(), "https://rag.example.com/");
    assert_eq!(config.api.user_id().unwrap(), "file-user");
    assert_eq!(config.api.timeout_seconds, 20);
    assert!(!config.chat.confirm_delete);
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let (_dir, path) = temp_config_file(FILE_CONFIG);
    std::env::set_var("COURSECHAT_USER_ID", "env-user");
    std::env::set_var("COURSECHAT_TIMEOUT_SECONDS", "5");

    let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
    clear_env();

    assert_eq!(config.api.user_id().unwrap(), "env-user");
    assert_eq!(config.api.timeout_seconds, 5);
    assert_eq!(
        config.api.base_url.as_deref(),
        Some("https://file.example.com/dev")
    );
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    std::env::set_var("COURSECHAT_API_BASE_URL", "https://env.example.com");
    let cli = Cli {
        base_url: Some("https://cli.example.com".to_string()),
        ..Default::default()
    };

    let config = Config::load("/nonexistent/config.yaml", &cli).unwrap();
    clear_env();

    assert_eq!(config.api.base_url.as_deref(), Some("https://cli.example.com"));
}

#[test]
#[serial]
fn test_invalid_env_timeout_is_ignored() {
    clear_env();
    std::env::set_var("COURSECHAT_TIMEOUT_SECONDS", "soon");

    let config = Config::load("/nonexistent/config.yaml", &Cli::default()).unwrap();
    clear_env();

    assert_eq!(config.api.timeout_seconds, 60);
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    clear_env();
    let (_dir, path) = temp_config_file("api: [not, a, map");
    let err = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CourseChatError>(),
        Some(CourseChatError::Yaml(_))
    ));
}

#[test]
#[serial]
fn test_invalid_url_fails_validation() {
    clear_env();
    let (_dir, path) = temp_config_file("api:\n  base_url: not a url\n");
    let config = Config::load(path.to_str().unwrap(), &Cli::default()).unwrap();
    assert!(config.validate().is_err());
}
