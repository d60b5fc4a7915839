//! Special commands parser for interactive chat mode
//!
//! Lines starting with `/` control the chat session instead of being sent
//! as questions. Command words are case-insensitive; their arguments (chat
//! and class ids) are passed through as typed.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an argument it does not take
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a fresh chat; the next question creates it
    NewChat,

    /// Open a stored chat by id
    LoadChat(String),

    /// List stored chats
    ListChats,

    /// Delete a stored chat by id
    DeleteChat(String),

    /// Clear the visible messages, keeping the open chat
    Clear,

    /// List the user's classes
    ListClasses,

    /// Show one class by id
    ShowClass(String),

    /// Show the open chat id and state
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent as a question.
    None,
}

fn missing(command: &str, usage: &str) -> CommandError {
    CommandError::MissingArgument {
        command: command.to_string(),
        usage: usage.to_string(),
    }
}

fn no_argument(command: &str, arg: &str) -> Result<SpecialCommand, CommandError> {
    Err(CommandError::UnsupportedArgument {
        command: command.to_string(),
        arg: arg.to_string(),
    })
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for an unrecognized `/` command,
/// `CommandError::MissingArgument` when an id is required but absent, and
/// `CommandError::UnsupportedArgument` when a command that takes no
/// argument is given one.
///
/// # Examples
///
/// ```
/// use coursechat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/load 0b7c").unwrap();
/// assert_eq!(cmd, SpecialCommand::LoadChat("0b7c".to_string()));
///
/// let cmd = parse_special_command("When is the midterm?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (word, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match word.as_str() {
        "/new" if arg.is_empty() => Ok(SpecialCommand::NewChat),
        "/new" => no_argument("/new", arg),

        "/load" | "/open" if arg.is_empty() => Err(missing("/load", "/load <chat_id>")),
        "/load" | "/open" => Ok(SpecialCommand::LoadChat(arg.to_string())),

        "/sessions" | "/chats" if arg.is_empty() => Ok(SpecialCommand::ListChats),
        "/sessions" | "/chats" => no_argument("/sessions", arg),

        "/delete" if arg.is_empty() => Err(missing("/delete", "/delete <chat_id>")),
        "/delete" => Ok(SpecialCommand::DeleteChat(arg.to_string())),

        "/clear" if arg.is_empty() => Ok(SpecialCommand::Clear),
        "/clear" => no_argument("/clear", arg),

        "/classes" if arg.is_empty() => Ok(SpecialCommand::ListClasses),
        "/classes" => no_argument("/classes", arg),

        "/class" if arg.is_empty() => Err(missing("/class", "/class <class_id>")),
        "/class" => Ok(SpecialCommand::ShowClass(arg.to_string())),

        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
===========================================

CHATS:
  /new            - Start a new chat (created with your next question)
  /load <id>      - Open a stored chat
  /open <id>      - Same as /load
  /sessions       - List your stored chats
  /chats          - Same as /sessions
  /delete <id>    - Delete a stored chat (asks for confirmation)
  /clear          - Clear the screen's messages, keep the open chat

CLASSES:
  /classes        - List your classes
  /class <id>     - Show details of one class

SESSION:
  /status         - Show the open chat and its state
  /help           - Show this help message
  /?              - Same as /help
  exit            - Exit interactive mode
  quit            - Same as exit

NOTES:
  - Commands are case-insensitive; ids are not
  - A chat id may be shortened to any unique prefix, such as the ID column of /sessions
  - Any other text is sent as a question about your classes
"#
    );
}
