mod form;
mod history;
mod practice;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use rehearse::api::{self, AppState};
use rehearse::config::Config;
use rehearse_core::ReplyDelay;
use rehearse_db::Database;
use rehearse_logging::{init_tracing, LogFormat, Logger};
use rehearse_persona::respond;

use crate::history::HistoryAction;
use crate::practice::{PracticeOptions, Remote};

#[derive(Parser, Debug)]
#[command(
    name = "rehearse",
    about = "Practice conversations with a virtual real-estate client",
    version,
    author
)]
struct Cli {
    /// Directory holding rehearse.toml (default: current directory)
    #[arg(short = 'd', long, global = true)]
    working_dir: Option<PathBuf>,

    /// Log level filter (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormatChoice>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,

        /// Pause before /api/chat answers, in milliseconds
        #[arg(long)]
        api_delay_ms: Option<u64>,
    },

    /// Practice a conversation in the terminal
    Practice {
        /// JSON file with the client profile (prompts for one if omitted)
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Send messages to a rehearse server instead of the local engine
        /// (default URL from rehearse.toml)
        #[arg(long)]
        remote: Option<Option<String>>,

        /// Write a JSONL transcript when the session ends
        #[arg(long)]
        transcript: bool,

        /// Reply instantly instead of simulating typing
        #[arg(long)]
        no_delay: bool,
    },

    /// Browse past practice sessions
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Print the client's reply to a single message
    Reply {
        /// JSON file with the client profile
        #[arg(long)]
        profile: PathBuf,

        message: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = match cli.working_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let config = Config::load(&working_dir)?.unwrap_or_default();

    let log_format = match cli.log_format {
        Some(choice) => choice.into(),
        None => config.log_format()?.unwrap_or_default(),
    };

    // The interactive commands keep the terminal quiet unless asked otherwise
    let default_level = match cli.command {
        Command::Serve { .. } => "info",
        _ => "warn",
    };
    let level = cli
        .log_level
        .as_deref()
        .or(config.log_level())
        .unwrap_or(default_level);

    let log_dir = match cli.command {
        Command::Serve { .. } => config.log_dir(),
        _ => None,
    };
    let _guard = init_tracing(level, log_format, log_dir);

    match cli.command {
        Command::Serve {
            host,
            port,
            api_delay_ms,
        } => {
            let host = host.unwrap_or_else(|| config.host().to_string());
            let port = port.unwrap_or_else(|| config.port());
            let api_delay = api_delay_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.api_delay());
            serve(&config, &host, port, api_delay).await
        }
        Command::Practice {
            profile,
            remote,
            transcript,
            no_delay,
        } => {
            let profile = match profile {
                Some(path) => form::load_profile(&path)?,
                None => form::prompt_profile()?,
            };
            let remote = remote.map(|url| Remote {
                base_url: url.unwrap_or_else(|| config.base_url().to_string()),
                login_url: config.login_url().to_string(),
            });
            let reply_delay = if no_delay {
                ReplyDelay::None
            } else {
                config.reply_delay()
            };

            let logger = match config.log_dir() {
                Some(dir) => Logger::with_file(log_format, &dir.join("practice.jsonl"))
                    .context("Failed to open practice log")?,
                None => Logger::new(log_format),
            };

            practice::run_practice(
                PracticeOptions {
                    profile,
                    remote,
                    reply_delay,
                    storage_key: config.storage_key().to_string(),
                    transcript,
                },
                Arc::new(logger),
            )
            .await
        }
        Command::History { action } => history::handle_history_command(action, config.storage_key()),
        Command::Reply { profile, message } => {
            let profile = form::load_profile(&profile)?;
            println!("{}", respond(&message, &profile));
            Ok(())
        }
    }
}

async fn serve(config: &Config, host: &str, port: u16, api_delay: Duration) -> Result<()> {
    let db = Arc::new(Database::open().context("Failed to initialize database")?);
    let state = AppState::new(db, config.storage_key(), config.reply_delay(), api_delay);
    let router = api::create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind API server to {}", addr))?;

    tracing::info!(%addr, api_delay_ms = api_delay.as_millis() as u64, "API server listening");
    eprintln!();
    eprintln!(
        "  {} {}",
        "->".bright_green(),
        format!("Listening on http://{}", addr).bold()
    );
    eprintln!("  {} Press {} to stop", "->".dimmed(), "Ctrl+C".bold());
    eprintln!();

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    eprintln!("\nShutting down...");
}
