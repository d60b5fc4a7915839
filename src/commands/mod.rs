/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint:

- `chat`    : Interactive chat mode
- `sessions`: List, show and delete stored chats
- `classes` : Browse the user's classes
- `ask`     : Ask a single question

Handlers build their backends from the configuration and drive the
controller, session list and class browser; all terminal output lives here
and in [`crate::render`].
*/

use crate::api::{
    ChatBackend, ChatStore, ClassBackend, HttpChatClient, HttpClassClient, MemoryChatBackend,
};
use crate::config::Config;
use crate::error::{CourseChatError, Result};
use crate::models::MessageIdGenerator;
use crate::sidebar::{AlwaysConfirm, Confirm};
use colored::Colorize;
use rustyline::DefaultEditor;
use std::sync::Arc;

// Special commands parser for interactive chat
pub mod special_commands;

/// Backends selected for one run
pub struct Backends {
    /// Chat storage and question answering
    pub chat: Arc<dyn ChatBackend>,
    /// Class records; absent in offline mode
    pub classes: Option<Arc<dyn ClassBackend>>,
    /// Message id source shared by the chat backend and the controller
    pub ids: Arc<MessageIdGenerator>,
}

impl Backends {
    /// Build HTTP backends, or an in-memory chat backend when `offline`
    pub fn from_config(config: &Config, offline: bool) -> Result<Self> {
        let ids = Arc::new(MessageIdGenerator::new());

        if offline {
            tracing::info!("Using offline in-memory backend");
            let chat = MemoryChatBackend::new(ChatStore::new()).with_id_generator(ids.clone());
            return Ok(Self {
                chat: Arc::new(chat),
                classes: None,
                ids,
            });
        }

        let chat = HttpChatClient::with_id_generator(config.api.clone(), ids.clone())?;
        let classes = HttpClassClient::new(config.api.clone())?;
        Ok(Self {
            chat: Arc::new(chat),
            classes: Some(Arc::new(classes)),
            ids,
        })
    }
}

/// Confirmation prompt on the terminal
///
/// Anything other than `y` or `yes` declines, including end of input.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::warn!("Cannot prompt for confirmation: {}", e);
                return false;
            }
        };
        match rl.readline(&format!("{} [y/N] ", prompt)) {
            Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

/// Pick the confirmation strategy for deletions
pub fn confirmer(config: &Config, skip: bool) -> Box<dyn Confirm> {
    if skip || !config.chat.confirm_delete {
        Box::new(AlwaysConfirm)
    } else {
        Box::new(TerminalConfirm)
    }
}

fn classes_unavailable() -> anyhow::Error {
    CourseChatError::Operation("Classes are not available in offline mode".to_string()).into()
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Runs a readline loop: plain lines are sent as questions through the
    //! [`ChatController`], slash commands manage chats and browse classes.

    use super::*;
    use crate::classes::ClassBrowser;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::controller::{ChatController, SendOutcome, SessionPhase};
    use crate::render;
    use crate::sidebar::{DeleteOutcome, SessionList};
    use chrono::Utc;
    use rustyline::error::ReadlineError;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `resume` - Chat id to open before the first prompt
    /// * `offline` - Use the in-memory echo backend
    pub async fn run_chat(config: Config, resume: Option<String>, offline: bool) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let backends = Backends::from_config(&config, offline)?;
        let controller = ChatController::with_id_generator(backends.chat.clone(), backends.ids.clone());
        let mut sessions = SessionList::new(backends.chat.clone());
        let mut classes = backends.classes.clone().map(ClassBrowser::new);
        let confirm = confirmer(&config, false);

        let mut rl = DefaultEditor::new().map_err(|e| CourseChatError::Readline(e.to_string()))?;

        print_welcome_banner(offline);
        start_session(&controller, &mut sessions, resume.as_deref()).await;

        loop {
            let prompt = format_prompt(&controller);
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(trimmed);

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::NewChat => {
                            controller.create_new_session();
                            println!("{}\n", "Started a new chat.".green());
                        }
                        SpecialCommand::LoadChat(input) => {
                            open_chat(&controller, &mut sessions, &input).await;
                        }
                        SpecialCommand::ListChats => {
                            sessions.refresh().await;
                            print_sessions(&sessions, &controller);
                        }
                        SpecialCommand::DeleteChat(input) => {
                            let chat_id = match sessions.resolve_id(&controller, &input).await {
                                Ok(chat_id) => chat_id,
                                Err(e) => {
                                    eprintln!("{}\n", e.to_string().red());
                                    continue;
                                }
                            };
                            match sessions.delete(&chat_id, &controller, confirm.as_ref()).await {
                                DeleteOutcome::Declined => println!("Kept chat {}\n", chat_id),
                                DeleteOutcome::Deleted { was_current } => {
                                    println!("{}", format!("Deleted chat {}", chat_id).green());
                                    if was_current {
                                        println!("Started a new chat.");
                                    }
                                    println!();
                                }
                                DeleteOutcome::Failed => {
                                    if let Some(error) = sessions.error() {
                                        eprintln!("{}\n", error.red());
                                    }
                                }
                            }
                        }
                        SpecialCommand::Clear => {
                            controller.clear();
                            println!("{}\n", render::format_transcript(&controller.messages()));
                        }
                        SpecialCommand::ListClasses => match classes.as_mut() {
                            Some(browser) => {
                                browser.refetch().await;
                                print_class_list(browser);
                            }
                            None => eprintln!("{}\n", classes_unavailable().to_string().yellow()),
                        },
                        SpecialCommand::ShowClass(class_id) => match classes.as_mut() {
                            Some(browser) => print_class(browser, &class_id).await,
                            None => eprintln!("{}\n", classes_unavailable().to_string().yellow()),
                        },
                        SpecialCommand::ShowStatus => print_status(&controller, offline),
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {
                            ask(&controller, trimmed).await;
                            sessions.refresh_if_stale(&controller).await;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn ask(controller: &ChatController, question: &str) {
        println!("{}", "Thinking...".dimmed());
        match controller.send_message(question).await {
            SendOutcome::Answered(reply) => println!("\n{}\n", render::format_message(&reply)),
            SendOutcome::NotSent | SendOutcome::NoReply => {
                if let Some(error) = controller.error() {
                    eprintln!("{}\n", error.red());
                }
            }
            SendOutcome::Skipped | SendOutcome::Superseded => {}
        }
    }

    /// Fetch the session list once and open the chat to resume, if any
    ///
    /// Returns true when `resume` was given and opened.
    pub async fn start_session(
        controller: &ChatController,
        sessions: &mut SessionList,
        resume: Option<&str>,
    ) -> bool {
        sessions.refresh_if_stale(controller).await;
        match resume {
            Some(input) => open_chat(controller, sessions, input).await,
            None => false,
        }
    }

    /// Open the chat whose id or id prefix is `input`
    async fn open_chat(controller: &ChatController, sessions: &mut SessionList, input: &str) -> bool {
        let chat_id = match sessions.resolve_id(controller, input).await {
            Ok(chat_id) => chat_id,
            Err(e) => {
                eprintln!("{}\n", e.to_string().red());
                return false;
            }
        };

        if controller.load_session(&chat_id).await {
            println!("{}", format!("Opened chat {}", chat_id).green());
            println!("{}\n", render::format_transcript(&controller.messages()));
            true
        } else {
            if let Some(error) = controller.error() {
                eprintln!("{}\n", error.red());
            }
            false
        }
    }

    fn print_sessions(sessions: &SessionList, controller: &ChatController) {
        if let Some(error) = sessions.error() {
            eprintln!("{}\n", error.red());
            return;
        }
        if sessions.sessions().is_empty() {
            println!("{}\n", "No chat history yet".yellow());
            return;
        }
        let current = controller.current_chat_id();
        render::session_table(sessions.sessions(), current.as_deref(), Utc::now()).printstd();
        println!();
    }

    fn print_class_list(browser: &ClassBrowser) {
        if let Some(error) = browser.error() {
            eprintln!("{}\n", format!("Error: {}", error).red());
            return;
        }
        if browser.classes().is_empty() {
            println!("{}\n", "No classes found".yellow());
            return;
        }
        render::class_table(browser.classes()).printstd();
        println!();
    }

    async fn print_class(browser: &mut ClassBrowser, class_id: &str) {
        match browser.open(class_id).await {
            Some(class) => println!("{}\n", render::format_class_detail(class)),
            None => {
                if let Some(error) = browser.error() {
                    eprintln!("{}\n", format!("Error: {}", error).red());
                }
            }
        }
    }

    fn format_prompt(controller: &ChatController) -> String {
        match controller.current_chat_id() {
            Some(chat_id) => {
                format!("[{}] >> ", render::short_id(&chat_id).cyan())
            }
            None => format!("[{}] >> ", "new".cyan()),
        }
    }

    fn print_welcome_banner(offline: bool) {
        println!();
        println!("{}", "coursechat - ask questions about your classes".bold());
        if offline {
            println!("{}", "Offline mode: answers are echoed, nothing is stored remotely".yellow());
        }
        println!("Type '/help' for commands, 'exit' to quit.");
        println!();
    }

    fn print_status(controller: &ChatController, offline: bool) {
        let snapshot = controller.snapshot();
        let phase = match controller.phase() {
            SessionPhase::NoSession => "no chat open",
            SessionPhase::SessionLoading => "loading",
            SessionPhase::SessionReady => "ready",
            SessionPhase::Sending => "sending",
            SessionPhase::SessionError => "error",
        };

        println!();
        println!("{}", "Session Status".bold());
        println!("  Chat:     {}", snapshot.current_chat_id.as_deref().unwrap_or("(new)"));
        println!("  State:    {}", phase);
        println!("  Messages: {}", snapshot.messages.len());
        println!("  Backend:  {}", if offline { "offline" } else { "remote" });
        if let Some(error) = snapshot.error {
            println!("  Error:    {}", error.red());
        }
        println!();
    }
}

// Session management command handler
pub mod sessions {
    //! Non-interactive session management.

    use super::*;
    use crate::cli::SessionCommand;
    use crate::controller::ChatController;
    use crate::render;
    use crate::sidebar::{DeleteOutcome, SessionList};
    use chrono::Utc;

    /// Handle `sessions` subcommands
    pub async fn handle_sessions(config: Config, command: SessionCommand) -> Result<()> {
        let backends = Backends::from_config(&config, false)?;
        let controller = ChatController::with_id_generator(backends.chat.clone(), backends.ids.clone());
        let mut sessions = SessionList::new(backends.chat.clone());

        match command {
            SessionCommand::List => {
                // Fetch directly so the failure cause reaches the caller
                let list = backends.chat.list_sessions().await?;
                if list.is_empty() {
                    println!("{}", "No chat history yet".yellow());
                    return Ok(());
                }

                println!("\nChat History:");
                render::session_table(&list, None, Utc::now()).printstd();
                println!();
                println!(
                    "Use {} to continue a chat.",
                    "coursechat chat --resume <ID>".cyan()
                );
                println!();
            }
            SessionCommand::Show { id } => {
                let id = sessions.resolve_id(&controller, &id).await?;
                let detail = backends.chat.get_session(&id).await?;
                println!("\n{} ({})\n", detail.title.bold(), detail.id.dimmed());
                println!("{}\n", render::format_transcript(&detail.messages));
            }
            SessionCommand::Delete { id, yes } => {
                let id = sessions.resolve_id(&controller, &id).await?;
                let confirm = confirmer(&config, yes);
                match sessions.delete(&id, &controller, confirm.as_ref()).await {
                    DeleteOutcome::Declined => println!("Kept chat {}", id),
                    DeleteOutcome::Deleted { .. } => {
                        println!("{}", format!("Deleted chat {}", id).green())
                    }
                    DeleteOutcome::Failed => {
                        let message = sessions.error().unwrap_or(crate::sidebar::DELETE_FAILED);
                        return Err(CourseChatError::Operation(message.to_string()).into());
                    }
                }
            }
        }

        Ok(())
    }
}

// Class browsing command handler
pub mod classes {
    //! Non-interactive class browsing.

    use super::*;
    use crate::cli::ClassCommand;
    use crate::render;

    /// Handle `classes` subcommands
    pub async fn handle_classes(config: Config, command: ClassCommand) -> Result<()> {
        let backends = Backends::from_config(&config, false)?;
        let client = backends.classes.ok_or_else(classes_unavailable)?;

        match command {
            ClassCommand::List => {
                let classes = client.list_classes().await?;
                if classes.is_empty() {
                    println!("{}", "No classes found".yellow());
                    return Ok(());
                }
                println!("\nMy Classes:");
                render::class_table(&classes).printstd();
                println!();
            }
            ClassCommand::Show { id } => {
                let class = client.get_class(&id).await?;
                println!("\n{}\n", render::format_class_detail(&class));
            }
        }
        Ok(())
    }
}

// One-shot question handler
pub mod ask {
    //! Ask one question in a new chat and print the answer.

    use super::*;
    use crate::controller::{ChatController, SendOutcome};
    use crate::render;

    /// Ask `question` in a new chat and print the answer with its sources
    ///
    /// # Errors
    ///
    /// Returns the controller's user-facing error when no answer was shown.
    pub async fn run_ask(config: Config, question: String, offline: bool) -> Result<()> {
        let backends = Backends::from_config(&config, offline)?;
        let controller = ChatController::with_id_generator(backends.chat, backends.ids);

        match controller.send_message(&question).await {
            SendOutcome::Answered(reply) => {
                println!("{}", render::format_message(&reply));
                if let Some(chat_id) = controller.current_chat_id() {
                    tracing::info!(chat_id = %chat_id, "Question stored");
                }
                Ok(())
            }
            SendOutcome::Skipped => {
                Err(CourseChatError::InvalidInput("Question is empty".to_string()).into())
            }
            _ => {
                let message = controller
                    .error()
                    .unwrap_or_else(|| crate::controller::REPLY_FAILED.to_string());
                Err(CourseChatError::Operation(message).into())
            }
        }
    }
}
