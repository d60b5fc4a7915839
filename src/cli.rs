//! Command-line interface definition for coursechat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, session management,
//! class browsing, and one-shot questions.

use clap::{Parser, Subcommand};

/// coursechat - ask questions about your classes
///
/// Talks to the course assistant backend: chat sessions are stored
/// server-side and answers come back with the course materials they cite.
#[derive(Parser, Debug, Clone)]
#[command(name = "coursechat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "COURSECHAT_CONFIG",
        default_value = "config/config.yaml"
    )]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend base URL from config
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Override the user identifier from config
    #[arg(long, global = true)]
    pub user_id: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for coursechat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Open an existing chat by id or unique id prefix instead of starting a new one
        #[arg(short, long)]
        resume: Option<String>,

        /// Use an in-memory backend that echoes questions (no network)
        #[arg(long)]
        offline: bool,
    },

    /// Manage stored chat sessions
    Sessions {
        /// Session subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Browse your classes
    Classes {
        /// Class subcommand
        #[command(subcommand)]
        command: ClassCommand,
    },

    /// Ask a single question and print the answer with its sources
    Ask {
        /// The question to ask
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Answer with the in-memory echo backend (no network)
        #[arg(long)]
        offline: bool,
    },
}

/// Chat session subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// List chat sessions, most recently updated first
    List,

    /// Show the full message history of one session
    Show {
        /// Chat id or unique id prefix
        id: String,
    },

    /// Delete a session
    Delete {
        /// Chat id or unique id prefix
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Class browsing subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ClassCommand {
    /// List all classes
    List,

    /// Show one class in detail
    Show {
        /// Class identifier
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            base_url: None,
            user_id: None,
            command: Commands::Chat {
                resume: None,
                offline: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Chat {
                resume: None,
                offline: false
            }
        ));
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["coursechat", "chat"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat { .. }));
    }

    #[test]
    fn test_cli_parse_chat_resume_offline() {
        let cli =
            Cli::try_parse_from(["coursechat", "chat", "--resume", "c1", "--offline"]).unwrap();
        if let Commands::Chat { resume, offline } = cli.command {
            assert_eq!(resume, Some("c1".to_string()));
            assert!(offline);
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_sessions_delete_yes() {
        let cli = Cli::try_parse_from(["coursechat", "sessions", "delete", "c1", "--yes"]).unwrap();
        if let Commands::Sessions {
            command: SessionCommand::Delete { id, yes },
        } = cli.command
        {
            assert_eq!(id, "c1");
            assert!(yes);
        } else {
            panic!("Expected Sessions Delete command");
        }
    }

    #[test]
    fn test_cli_parse_classes_show() {
        let cli = Cli::try_parse_from(["coursechat", "classes", "show", "cs101"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Classes {
                command: ClassCommand::Show { ref id }
            } if id == "cs101"
        ));
    }

    #[test]
    fn test_cli_parse_ask_collects_words() {
        let cli = Cli::try_parse_from(["coursechat", "ask", "What", "is", "due?"]).unwrap();
        if let Commands::Ask { question, .. } = cli.command {
            assert_eq!(question.join(" "), "What is due?");
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_cli_parse_ask_requires_question() {
        assert!(Cli::try_parse_from(["coursechat", "ask"]).is_err());
    }

    #[test]
    fn test_cli_global_overrides() {
        let cli = Cli::try_parse_from([
            "coursechat",
            "classes",
            "list",
            "--base-url",
            "http://localhost:9000",
            "--user-id",
            "u42",
        ])
        .unwrap();
        assert_eq!(cli.base_url, Some("http://localhost:9000".to_string()));
        assert_eq!(cli.user_id, Some("u42".to_string()));
    }
}
