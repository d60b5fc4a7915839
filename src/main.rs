//! coursechat - ask questions about your classes
//!
#![doc = "coursechat - ask questions about your classes"]
#![doc = "Main entry point for the coursechat CLI."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use coursechat::cli::{Cli, Commands};
use coursechat::commands;
use coursechat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse first so --verbose can raise the log level
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { resume, offline } => {
            if let Some(r) = &resume {
                tracing::debug!("Resuming chat: {}", r);
            }
            commands::chat::run_chat(config, resume, offline).await?;
            Ok(())
        }
        Commands::Sessions { command } => {
            tracing::info!("Starting sessions command");
            commands::sessions::handle_sessions(config, command).await?;
            Ok(())
        }
        Commands::Classes { command } => {
            tracing::info!("Starting classes command");
            commands::classes::handle_classes(config, command).await?;
            Ok(())
        }
        Commands::Ask { question, offline } => {
            let question = question.join(" ");
            tracing::debug!("Asking: {}", question);
            commands::ask::run_ask(config, question, offline).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with answers on stdout.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "coursechat=debug"
    } else {
        "coursechat=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
