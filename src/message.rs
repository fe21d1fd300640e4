use serde::{Deserialize, Serialize};

use crate::llm::ChatMessage;

/// Represents who said something during a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Asker {
    /// The AI detective.
    Sleuth,
    /// The human thinking of a movie.
    Player,
}

impl Asker {
    /// Returns the prefix used when writing the transcript out.
    pub fn prefix(&self) -> &'static str {
        match self {
            Asker::Sleuth => "Q: ",
            Asker::Player => "A: ",
        }
    }
}

/// A single entry in the game transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub asker: Asker,
    pub text: String,
}

impl TranscriptEntry {
    /// Create a new entry with the given asker and text.
    pub fn new(asker: Asker, text: impl Into<String>) -> Self {
        Self {
            asker,
            text: text.into(),
        }
    }

    /// Something the detective said.
    pub fn sleuth(text: impl Into<String>) -> Self {
        Self::new(Asker::Sleuth, text)
    }

    /// Something the player said.
    pub fn player(text: impl Into<String>) -> Self {
        Self::new(Asker::Player, text)
    }

    /// Convert to an API chat message.
    pub fn to_chat_message(&self) -> ChatMessage {
        match self.asker {
            Asker::Sleuth => ChatMessage::model(self.text.clone()),
            Asker::Player => ChatMessage::user(self.text.clone()),
        }
    }
}
