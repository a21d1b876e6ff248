use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Who is speaking in a practice conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Trainee,
    Client,
}

/// Structured log events for a practice session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    SessionStarted {
        session_id: String,
        client_name: String,
        client_type: String,
        header: String,
    },
    MessageSent {
        speaker: Speaker,
        content: String,
    },
    ClientTyping {
        typing: bool,
    },
    SessionCleared,
    SessionEnded {
        messages: usize,
        duration_secs: f64,
    },
    LoginRequired {
        login_url: String,
    },
    ErrorEncountered {
        error: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors and visual structure
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Renders practice events on stderr, optionally teeing JSON lines to a file
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::SessionStarted {
                client_name,
                client_type,
                header,
                ..
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╭─────────────────────────────────────────────────────────────────────╮"
                        .bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Practice Session".bold().bright_white(),
                    format!("with {} ({})", client_name, client_type).dimmed()
                );
                let _ = writeln!(stderr, "{}  {}", "│".bright_blue(), header.dimmed());
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╰─────────────────────────────────────────────────────────────────────╯"
                        .bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::MessageSent { speaker, content } => {
                let label = match speaker {
                    Speaker::Trainee => "You".bright_cyan().bold(),
                    Speaker::Client => "Client".bright_magenta().bold(),
                };
                let _ = writeln!(stderr, "  {} {}", label, content);
                let _ = writeln!(stderr);
            }
            LogEvent::ClientTyping { typing } => {
                if *typing {
                    let _ = writeln!(stderr, "  {}", "…".dimmed());
                }
            }
            LogEvent::SessionCleared => {
                let _ = writeln!(stderr, "  {} {}", "↺".bright_yellow(), "Conversation cleared");
            }
            LogEvent::SessionEnded {
                messages,
                duration_secs,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} {} messages in {:.1}s",
                    "✓".bright_green(),
                    messages,
                    duration_secs
                );
            }
            LogEvent::LoginRequired { login_url } => {
                let _ = writeln!(
                    stderr,
                    "{} Session expired, sign in again at {}",
                    "⚠".bright_yellow(),
                    login_url.bold()
                );
            }
            LogEvent::ErrorEncountered { error } => {
                let _ = writeln!(stderr, "{} {}", "✗".bright_red(), error.bright_red());
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::SessionStarted {
                session_id,
                client_name,
                ..
            } => format!("[{}] session:start:{} {}", timestamp, session_id, client_name),
            LogEvent::MessageSent { speaker, content } => {
                let who = match speaker {
                    Speaker::Trainee => "T",
                    Speaker::Client => "C",
                };
                format!("[{}] {}:{}", timestamp, who, content)
            }
            LogEvent::ClientTyping { .. } => return,
            LogEvent::SessionCleared => format!("[{}] session:clear", timestamp),
            LogEvent::SessionEnded {
                messages,
                duration_secs,
            } => format!(
                "[{}] session:end:{} {:.1}s",
                timestamp, messages, duration_secs
            ),
            LogEvent::LoginRequired { login_url } => {
                format!("[{}] auth:login {}", timestamp, login_url)
            }
            LogEvent::ErrorEncountered { error } => format!("[{}] error:{}", timestamp, error),
        };
        let _ = writeln!(stderr, "{}", msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = LogEvent::MessageSent {
            speaker: Speaker::Client,
            content: "Hi there!".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "message_sent");
        assert_eq!(json["speaker"], "client");
        assert_eq!(json["content"], "Hi there!");
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_file_output_is_timestamped_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs").join("practice.jsonl");
        let logger = Logger::with_file(LogFormat::Compact, &path).unwrap();

        logger.log(&LogEvent::SessionCleared);
        logger.log(&LogEvent::SessionEnded {
            messages: 4,
            duration_secs: 12.5,
        });

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "session_cleared");
        assert!(lines[0]["timestamp"].is_string());
        assert_eq!(lines[1]["messages"], 4);
    }
}
