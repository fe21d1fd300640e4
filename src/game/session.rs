//! Game session state.

use serde::{Deserialize, Serialize};

use super::prompt::REJECTION;
use crate::error::{CineSleuthError, Result};
use crate::message::{Asker, TranscriptEntry};

/// Default question budget.
pub const DEFAULT_MAX_QUESTIONS: u32 = 20;

/// Where a game stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    /// The detective named a movie.
    Guessed,
    /// The question budget ran out.
    Exhausted,
    /// The player quit.
    Aborted,
}

impl GameStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GameStatus::InProgress => "in progress",
            GameStatus::Guessed => "guessed",
            GameStatus::Exhausted => "out of questions",
            GameStatus::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// State of one game.
///
/// Only [`SessionController`](super::SessionController) mutates a session;
/// everything here is readable by front ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub(crate) max_questions: u32,
    pub(crate) question_count: u32,
    pub(crate) transcript: Vec<TranscriptEntry>,
    pub(crate) status: GameStatus,
    pub(crate) last_guess: Option<String>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUESTIONS)
    }
}

impl GameSession {
    /// Start a fresh game. A budget of zero is raised to one.
    pub fn new(max_questions: u32) -> Self {
        Self {
            max_questions: max_questions.max(1),
            question_count: 0,
            transcript: Vec::new(),
            status: GameStatus::InProgress,
            last_guess: None,
        }
    }

    pub fn max_questions(&self) -> u32 {
        self.max_questions
    }

    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    pub fn questions_remaining(&self) -> u32 {
        self.max_questions.saturating_sub(self.question_count)
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// The most recent title the detective guessed.
    pub fn last_guess(&self) -> Option<&str> {
        self.last_guess.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// The detective's latest question while it still waits for an answer.
    pub fn open_question(&self) -> Option<&str> {
        match self.transcript.last() {
            Some(entry) if entry.asker == Asker::Sleuth && self.status != GameStatus::Guessed => {
                Some(entry.text.as_str())
            }
            _ => None,
        }
    }

    /// Question/answer pairs, in order. A trailing unanswered question is
    /// paired with an empty answer.
    pub fn qa_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        let mut pending: Option<&str> = None;

        for entry in &self.transcript {
            match entry.asker {
                Asker::Sleuth => {
                    if let Some(question) = pending.take() {
                        pairs.push((question, ""));
                    }
                    pending = Some(entry.text.as_str());
                }
                Asker::Player => {
                    // Player text before the first question is a hint, not an answer.
                    if let Some(question) = pending.take() {
                        pairs.push((question, entry.text.as_str()));
                    }
                }
            }
        }

        if let Some(question) = pending {
            pairs.push((question, ""));
        }

        pairs
    }

    /// One `Q: ... A: ...` line per answered question.
    pub fn summary(&self) -> String {
        self.qa_pairs()
            .into_iter()
            .filter(|(_, a)| !a.is_empty())
            .map(|(q, a)| {
                format!(
                    "{}{} {}{}",
                    Asker::Sleuth.prefix(),
                    q,
                    Asker::Player.prefix(),
                    a
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// End the game at the player's request.
    pub fn abort(&mut self) {
        self.status = GameStatus::Aborted;
    }

    /// The player said the last guess was wrong.
    ///
    /// Play resumes if questions remain; otherwise the game is exhausted.
    pub fn reject_guess(&mut self) -> Result<()> {
        if self.status != GameStatus::Guessed {
            return Err(CineSleuthError::Other(format!(
                "There is no guess to reject (game is {})",
                self.status
            )));
        }

        self.transcript.push(TranscriptEntry::player(REJECTION));
        self.last_guess = None;
        self.status = if self.question_count >= self.max_questions {
            GameStatus::Exhausted
        } else {
            GameStatus::InProgress
        };
        Ok(())
    }
}
