//! Error types surfaced by the game core.

use thiserror::Error;

use crate::game::GameStatus;

/// Result type for CineSleuth operations.
pub type Result<T> = std::result::Result<T, CineSleuthError>;

/// Errors that can occur while playing a game.
#[derive(Debug, Error)]
pub enum CineSleuthError {
    /// No usable credential, or the service rejected the one in use.
    #[error("API key error: {0}")]
    ApiKey(String),

    /// A single credential ran out of quota.
    ///
    /// The rotating client recovers from this by itself; callers only see it
    /// when talking to a backend directly.
    #[error("API quota exceeded: {0}")]
    ApiQuota(String),

    /// Every configured credential ran out of quota.
    #[error(
        "all {tried} API key(s) have exceeded their quota; \
         add a new key or replace the exhausted ones and restart"
    )]
    AllKeysExhausted { tried: usize },

    /// The service could not be reached.
    #[error("connection error: {0}")]
    ApiConnection(String),

    /// The question budget is used up without a confirmed guess.
    #[error("no questions left (limit is {max_questions})")]
    GameExhausted { max_questions: u32 },

    /// The session already ended.
    #[error("the game is already over ({0})")]
    GameOver(GameStatus),

    #[error("{0}")]
    Other(String),
}

impl CineSleuthError {
    /// Whether the current session can go on after this error.
    ///
    /// Connection failures may be retried by the player; everything else
    /// ends the game.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ApiConnection(_))
    }
}
