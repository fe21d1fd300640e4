//! Append-only record of finished games.
//!
//! Each game is written as a block of plain text to a single log file,
//! `~/.local/share/cinesleuth/log.txt` unless configured otherwise.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::game::GameSession;
use crate::message::Asker;

/// Who won a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    AiWon,
    PlayerWon,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::AiWon => "AI Won",
            Outcome::PlayerWon => "Player Won",
        }
    }
}

/// Text file that finished games are appended to.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one game, creating the file and its directory if needed.
    pub fn record(&self, session: &GameSession, movie: &str, outcome: Outcome) -> Result<()> {
        let entry = render_entry(session, movie, outcome, Local::now().naive_local());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open history log: {}", self.path.display()))?;
        file.write_all(entry.as_bytes())
            .with_context(|| format!("Failed to write history log: {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), outcome = outcome.label(), "game recorded");
        Ok(())
    }
}

/// Format one game as a log block.
pub fn render_entry(
    session: &GameSession,
    movie: &str,
    outcome: Outcome,
    at: NaiveDateTime,
) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&"=".repeat(50));
    out.push('\n');
    out.push_str(&format!("Date: {}\n", at.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&format!("Movie: {}\n", movie));
    out.push_str(&format!("Result: {}\n", outcome.label()));
    out.push_str(&format!("Questions Asked: {}\n", session.question_count()));
    out.push_str(&"-".repeat(30));
    out.push('\n');

    for (question, answer) in session.qa_pairs() {
        if answer.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "{}{}\n{}{}\n\n",
            Asker::Sleuth.prefix(),
            question,
            Asker::Player.prefix(),
            answer
        ));
    }

    out
}
