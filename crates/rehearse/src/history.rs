use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use rehearse_core::{Message, Role};
use rehearse_db::{Database, PracticeRecord, PracticeStats};
use rehearse_persona::initials;

const DEFAULT_LIMIT: usize = 20;

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List recent practice sessions
    List {
        /// Maximum number of sessions to show
        #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the conversation of one session
    Show {
        /// Session ID (launches interactive picker if omitted)
        id: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show dashboard statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn handle_history_command(action: Option<HistoryAction>, storage_key: &str) -> Result<()> {
    let db = Database::open().context("Failed to open database")?;

    match action.unwrap_or(HistoryAction::List {
        limit: DEFAULT_LIMIT,
        json: false,
    }) {
        HistoryAction::List { limit, json } => {
            let records = db.practice().list(limit)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("{}", "No practice sessions yet.".dimmed());
            } else {
                print_history_table(&records);
            }
        }
        HistoryAction::Show { id, json } => {
            let id = resolve_session_id(&db, id)?;
            let messages = db.conversations().list(storage_key, &id)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&messages)?);
            } else if messages.is_empty() {
                println!("{}", "No messages stored for this session.".dimmed());
            } else {
                print_conversation(&messages);
            }
        }
        HistoryAction::Stats { json } => {
            let stats = db.practice().stats()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
        }
    }

    Ok(())
}

fn resolve_session_id(db: &Database, id: Option<String>) -> Result<String> {
    if let Some(id) = id {
        return Ok(id);
    }

    let records = db.practice().list(DEFAULT_LIMIT)?;
    if records.is_empty() {
        anyhow::bail!("No practice sessions found.");
    }

    let items: Vec<String> = records
        .iter()
        .map(|r| {
            format!(
                "{} | [{}] {} ({}) | {} messages",
                r.started_at.format("%Y-%m-%d %H:%M"),
                initials(&r.client_name),
                r.client_name,
                r.client_type,
                r.message_count
            )
        })
        .collect();

    let selection = dialoguer::FuzzySelect::new()
        .with_prompt("Select a session")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(records[selection].id.clone())
}

fn print_history_table(records: &[PracticeRecord]) {
    println!(
        "{:<18} {:<20} {:<18} {:<6} {:<8} {}",
        "STARTED".dimmed(),
        "CLIENT".dimmed(),
        "TYPE".dimmed(),
        "MSGS".dimmed(),
        "DURATION".dimmed(),
        "BUDGET".dimmed(),
    );

    for r in records {
        let name = if r.client_name.chars().count() > 18 {
            format!("{}...", r.client_name.chars().take(15).collect::<String>())
        } else {
            r.client_name.clone()
        };

        println!(
            "{:<18} {:<20} {:<18} {:<6} {:<8} {}",
            r.started_at.format("%Y-%m-%d %H:%M"),
            name,
            r.client_type.bright_cyan(),
            r.message_count,
            format_duration(r.duration_minutes() * 60.0),
            r.budget_label.dimmed()
        );
    }
}

fn print_conversation(messages: &[Message]) {
    for message in messages {
        let speaker = match message.role {
            Role::User => "You".bright_cyan().bold(),
            Role::Assistant => "Client".bright_magenta().bold(),
        };
        println!(
            "{} {} {}",
            message.timestamp.format("%H:%M:%S").to_string().dimmed(),
            speaker,
            message.content
        );
    }
}

fn print_stats(stats: &PracticeStats) {
    println!("{}", "=== Practice Statistics ===".bright_blue().bold());
    println!("{}  {}", "Total Sessions:".dimmed(), stats.total_sessions);
    println!("{}  {}", "Total Messages:".dimmed(), stats.total_messages);
    println!(
        "{}  {}",
        "Practice Time:".dimmed(),
        format_duration(stats.practice_minutes * 60.0)
    );
    println!(
        "{}  {}",
        "Client Types:".dimmed(),
        stats.client_types_practiced
    );
}

fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.0}s", secs)
    } else {
        let mins = (secs / 60.0).floor() as u64;
        let remaining_secs = (secs % 60.0) as u64;
        format!("{}m {}s", mins, remaining_secs)
    }
}
