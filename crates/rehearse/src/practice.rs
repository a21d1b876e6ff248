//! Interactive practice session in the terminal.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Input;

use rehearse_client::{ApiClient, AuthOutcome};
use rehearse_core::{ConversationLog, Message, PracticeSession, ReplyDelay, Role, SessionEvent};
use rehearse_db::{ConversationStore, Database};
use rehearse_logging::{LogEvent, Logger, Speaker, TranscriptWriter};
use rehearse_persona::{greeting, ClientProfile};

pub struct PracticeOptions {
    pub profile: ClientProfile,
    /// Server to send messages to instead of the local engine
    pub remote: Option<Remote>,
    pub reply_delay: ReplyDelay,
    pub storage_key: String,
    pub transcript: bool,
}

pub struct Remote {
    pub base_url: String,
    pub login_url: String,
}

enum Turn {
    Say(String),
    Clear,
    Quit,
}

pub async fn run_practice(options: PracticeOptions, logger: Arc<Logger>) -> Result<()> {
    let started = Instant::now();

    let messages = match options.remote {
        Some(ref remote) => run_remote(&options.profile, remote, &logger).await?,
        None => run_local(&options, logger.clone()).await?,
    };

    let duration_secs = started.elapsed().as_secs_f64();
    logger.log(&LogEvent::SessionEnded {
        messages: messages.len(),
        duration_secs,
    });

    if options.transcript {
        let writer = TranscriptWriter::new(&options.profile.client_name)
            .context("Failed to create transcript file")?;
        writer.write_start(
            &options.profile.id,
            &options.profile.client_name,
            &options.profile.client_type.label(),
            &options.profile.header(),
        );
        for message in &messages {
            writer.write_message(
                &message.id,
                message.role.as_str(),
                &message.content,
                message.timestamp,
            );
        }
        writer.write_end(messages.len(), duration_secs);
        eprintln!("{} {}", "Transcript:".dimmed(), writer.path().display());
    }

    Ok(())
}

/// Converse with the local engine; the log is persisted like a server session.
async fn run_local(options: &PracticeOptions, logger: Arc<Logger>) -> Result<Vec<Message>> {
    let db = Arc::new(Database::open().context("Failed to open database")?);
    let store = ConversationStore::new(db, options.storage_key.as_str());
    let session = Arc::new(
        PracticeSession::new(options.profile.clone(), options.reply_delay)
            .with_sink(Arc::new(store)),
    );

    log_started(&logger, session.id(), session.profile());

    // Typing indicator follows the session's own events
    let mut events = session.subscribe();
    let typing_logger = logger.clone();
    let typing = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let SessionEvent::TypingChanged { typing, .. } = event {
                typing_logger.log(&LogEvent::ClientTyping { typing });
            }
        }
    });

    session.start();
    if let Some(first) = session.messages().first() {
        log_message(&logger, first);
    }

    loop {
        match read_turn().await? {
            Turn::Quit => break,
            Turn::Clear => {
                session.clear();
                logger.log(&LogEvent::SessionCleared);
            }
            Turn::Say(text) => {
                if let Some(reply) = session.submit(&text).await {
                    log_message(&logger, &reply);
                }
            }
        }
    }

    typing.abort();
    Ok(session.messages())
}

/// Converse through a server's chat endpoint. Nothing is persisted locally.
async fn run_remote(
    profile: &ClientProfile,
    remote: &Remote,
    logger: &Logger,
) -> Result<Vec<Message>> {
    let client = ApiClient::connect(&remote.base_url, &remote.login_url)
        .context("Failed to create HTTP client")?;

    let mut log = ConversationLog::new();
    let session_id = if profile.id.is_empty() {
        "remote".to_string()
    } else {
        profile.id.clone()
    };
    log_started(logger, &session_id, profile);
    log_message(logger, &log.push(Role::Assistant, greeting(profile)));

    loop {
        match read_turn().await? {
            Turn::Quit => break,
            Turn::Clear => {
                log.clear();
                logger.log(&LogEvent::SessionCleared);
            }
            Turn::Say(text) => {
                log.push(Role::User, text.as_str());
                logger.log(&LogEvent::ClientTyping { typing: true });

                match client.chat(&text, profile).await {
                    Ok(AuthOutcome::Response(reply)) => {
                        log_message(logger, &log.push(Role::Assistant, reply));
                    }
                    Ok(AuthOutcome::LoginRequired { login_url }) => {
                        logger.log(&LogEvent::LoginRequired { login_url });
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Chat request failed");
                        logger.log(&LogEvent::ErrorEncountered {
                            error: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    Ok(log.messages().to_vec())
}

/// Prompt off the async workers so the typing indicator keeps running.
async fn read_turn() -> Result<Turn> {
    tokio::task::spawn_blocking(prompt_turn)
        .await
        .context("Input task failed")?
}

fn prompt_turn() -> Result<Turn> {
    loop {
        let line: String = Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()?;
        let trimmed = line.trim();

        match trimmed {
            "" => continue,
            "/quit" | "/exit" => return Ok(Turn::Quit),
            "/clear" => return Ok(Turn::Clear),
            _ => return Ok(Turn::Say(trimmed.to_string())),
        }
    }
}

fn log_started(logger: &Logger, session_id: &str, profile: &ClientProfile) {
    logger.log(&LogEvent::SessionStarted {
        session_id: session_id.to_string(),
        client_name: profile.client_name.clone(),
        client_type: profile.client_type.label(),
        header: profile.header(),
    });
    eprintln!(
        "{}",
        "Type a message, /clear to start over, /quit to finish.".dimmed()
    );
}

fn log_message(logger: &Logger, message: &Message) {
    let speaker = match message.role {
        Role::User => Speaker::Trainee,
        Role::Assistant => Speaker::Client,
    };
    logger.log(&LogEvent::MessageSent {
        speaker,
        content: message.content.clone(),
    });
}
