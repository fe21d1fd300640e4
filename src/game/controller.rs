//! Turn-by-turn game orchestration.

use tracing::{debug, info};

use super::prompt::{self, NO_ANSWER, OPENING};
use super::reply::{sanitize, AiResponse, GUESS_MARKER};
use super::session::{GameSession, GameStatus};
use crate::error::{CineSleuthError, Result};
use crate::llm::{ChatMessage, CompletionRequest, RotatingClient};
use crate::message::{Asker, TranscriptEntry};

/// Drives a [`GameSession`] by talking to the model through a
/// [`RotatingClient`].
pub struct SessionController {
    client: RotatingClient,
}

impl SessionController {
    pub fn new(client: RotatingClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RotatingClient {
        &self.client
    }

    /// Play one turn: record `user_answer` and get the detective's next
    /// question or final guess.
    ///
    /// An empty answer on the first turn just starts the game. The session
    /// only changes when the call succeeds, so a failed turn can be retried
    /// with the same answer.
    pub async fn advance(&mut self, session: &mut GameSession, user_answer: &str) -> Result<AiResponse> {
        match session.status {
            GameStatus::InProgress => {}
            GameStatus::Exhausted => {
                return Err(CineSleuthError::GameExhausted {
                    max_questions: session.max_questions,
                })
            }
            status => return Err(CineSleuthError::GameOver(status)),
        }

        if session.question_count >= session.max_questions {
            session.status = GameStatus::Exhausted;
            return Err(CineSleuthError::GameExhausted {
                max_questions: session.max_questions,
            });
        }

        let pending = pending_answer(session, user_answer);
        let turn = session.question_count + 1;
        let remaining = session.questions_remaining();
        let request = build_request(
            prompt::turn_instruction(session.max_questions, remaining),
            &session.transcript,
            &pending,
        );

        debug!(turn, remaining, "asking the detective");
        let raw = self.client.call(&request).await?;
        let response = AiResponse::from_raw(raw);
        if response.cleaned_text.is_empty() {
            return Err(CineSleuthError::Other(
                "The model sent back an empty reply".to_string(),
            ));
        }

        session.transcript.extend(pending);
        session.question_count = turn;

        if response.is_guess {
            commit_guess(session, &response.cleaned_text);
            info!(turn, guess = %response.cleaned_text, "detective made a guess");
        } else {
            session
                .transcript
                .push(TranscriptEntry::sleuth(response.cleaned_text.clone()));
            if turn >= session.max_questions {
                session.status = GameStatus::Exhausted;
                info!(turn, "question budget used up, last question still open");
            }
        }

        Ok(response)
    }

    /// Record the answer to the last question and ask for one final guess.
    ///
    /// Valid once the question budget is used up while the last question is
    /// still unanswered. Does not spend a question. A guess moves the session
    /// to `Guessed`; anything else leaves it `Exhausted`. As with
    /// [`advance`](Self::advance), nothing is recorded if the call fails.
    pub async fn final_guess(&mut self, session: &mut GameSession, user_answer: &str) -> Result<AiResponse> {
        match session.status {
            GameStatus::Exhausted if session.open_question().is_some() => {}
            GameStatus::Exhausted => {
                return Err(CineSleuthError::GameExhausted {
                    max_questions: session.max_questions,
                })
            }
            GameStatus::InProgress => {
                return Err(CineSleuthError::Other(format!(
                    "{} question(s) left before the final guess",
                    session.questions_remaining()
                )))
            }
            status => return Err(CineSleuthError::GameOver(status)),
        }

        let pending = pending_answer(session, user_answer);
        let request = build_request(prompt::closing_instruction(), &session.transcript, &pending);

        debug!(questions = session.question_count, "asking for the final guess");
        let raw = self.client.call(&request).await?;
        let response = AiResponse::from_closing_raw(raw);
        if response.cleaned_text.is_empty() {
            return Err(CineSleuthError::Other(
                "The model sent back an empty reply".to_string(),
            ));
        }

        session.transcript.extend(pending);
        if response.is_guess {
            commit_guess(session, &response.cleaned_text);
            info!(guess = %response.cleaned_text, "detective made its final guess");
        } else {
            info!("detective gave up without a guess");
        }

        Ok(response)
    }

    /// Ask the detective why it missed, after the player reveals the movie.
    ///
    /// Only valid once the game is over. The session is not modified.
    pub async fn explain_miss(&mut self, session: &GameSession, actual_title: &str) -> Result<String> {
        if !session.is_finished() {
            return Err(CineSleuthError::Other(
                "The game is still in progress".to_string(),
            ));
        }

        let title = actual_title.trim();
        if title.is_empty() {
            return Err(CineSleuthError::Other("No movie title given".to_string()));
        }

        let reveal = TranscriptEntry::player(prompt::reveal_message(title, &session.summary()));
        let request = build_request(
            prompt::explain_instruction().to_string(),
            &session.transcript,
            std::slice::from_ref(&reveal),
        );

        let raw = self.client.call(&request).await?;
        Ok(sanitize(&raw))
    }
}

/// The player's answer as transcript entries, not yet committed.
///
/// An empty answer is recorded as `(no answer)` when a question is waiting,
/// and dropped otherwise.
fn pending_answer(session: &GameSession, user_answer: &str) -> Vec<TranscriptEntry> {
    let answer = user_answer.trim();
    if !answer.is_empty() {
        vec![TranscriptEntry::player(answer)]
    } else if matches!(session.transcript.last(), Some(e) if e.asker == Asker::Sleuth) {
        vec![TranscriptEntry::player(NO_ANSWER)]
    } else {
        Vec::new()
    }
}

fn commit_guess(session: &mut GameSession, title: &str) {
    session
        .transcript
        .push(TranscriptEntry::sleuth(format!("{} {}", GUESS_MARKER, title)));
    session.last_guess = Some(title.to_string());
    session.status = GameStatus::Guessed;
}

/// Assemble the request: opening line, transcript so far, then anything not
/// yet committed.
fn build_request(
    system: String,
    transcript: &[TranscriptEntry],
    pending: &[TranscriptEntry],
) -> CompletionRequest {
    let mut request = CompletionRequest::new(system).with_message(ChatMessage::user(OPENING));
    for entry in transcript.iter().chain(pending) {
        request.push(entry.to_chat_message());
    }
    request
}
