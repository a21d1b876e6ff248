use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// One line of a practice transcript file.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptLine {
    SessionStart {
        timestamp: DateTime<Utc>,
        session_id: String,
        client_name: String,
        client_type: String,
        header: String,
    },
    Message {
        id: String,
        role: String,
        content: String,
        timestamp: DateTime<Utc>,
    },
    SessionEnd {
        messages: usize,
        duration_secs: f64,
        timestamp: DateTime<Utc>,
    },
}

/// Writes a practice conversation as JSONL, by default under
/// `~/.local/share/rehearse/transcripts/`.
pub struct TranscriptWriter {
    file: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl TranscriptWriter {
    pub fn new(client_name: &str) -> io::Result<Self> {
        Self::in_dir(&Self::transcripts_dir()?, client_name)
    }

    /// Create a transcript file in `dir`. The name is the current UTC time
    /// plus a short hash of the client name.
    pub fn in_dir(dir: &Path, client_name: &str) -> io::Result<Self> {
        fs::create_dir_all(dir)?;

        let timestamp_str = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();

        let mut hasher = Sha256::new();
        hasher.update(client_name.as_bytes());
        let hash = hex::encode(hasher.finalize());

        let path = dir.join(format!("{}_{}.jsonl", timestamp_str, &hash[..6]));
        let file = File::create(&path)?;

        Ok(Self {
            file: Mutex::new(BufWriter::new(file)),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_start(&self, session_id: &str, client_name: &str, client_type: &str, header: &str) {
        self.write_line(&TranscriptLine::SessionStart {
            timestamp: Utc::now(),
            session_id: session_id.to_string(),
            client_name: client_name.to_string(),
            client_type: client_type.to_string(),
            header: header.to_string(),
        });
    }

    pub fn write_message(&self, id: &str, role: &str, content: &str, timestamp: DateTime<Utc>) {
        self.write_line(&TranscriptLine::Message {
            id: id.to_string(),
            role: role.to_string(),
            content: content.to_string(),
            timestamp,
        });
    }

    pub fn write_end(&self, messages: usize, duration_secs: f64) {
        self.write_line(&TranscriptLine::SessionEnd {
            messages,
            duration_secs,
            timestamp: Utc::now(),
        });
    }

    fn write_line(&self, line: &TranscriptLine) {
        let json = match serde_json::to_string(line) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize transcript line");
                return;
            }
        };

        let mut writer = match self.file.lock() {
            Ok(w) => w,
            Err(e) => {
                tracing::warn!(error = %e, "Transcript writer lock poisoned");
                return;
            }
        };

        // Flush per line so a crashed session still leaves a readable file
        if let Err(e) = writeln!(writer, "{}", json).and_then(|_| writer.flush()) {
            tracing::warn!(error = %e, "Failed to write transcript line");
        }
    }

    fn transcripts_dir() -> io::Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not determine data directory")
        })?;
        Ok(data_dir.join("rehearse").join("transcripts"))
    }
}
