//! Line-based console front end.
//!
//! Reads answers from any `BufRead` and writes the dialogue to any `Write`,
//! so the same loop serves stdin/stdout and tests.

use std::io::{self, BufRead, Write};

use tokio::sync::mpsc;

use crate::error::CineSleuthError;
use crate::game::{GameSession, GameStatus, SessionController};
use crate::history::{HistoryLog, Outcome};
use crate::llm::RotationEvent;

/// Word that ends the game at any prompt.
pub const EXIT_WORD: &str = "exit";

/// Answer to a yes/no prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YesNo {
    Yes,
    No,
    Exit,
}

/// Console game driver.
pub struct Console<R, W> {
    input: R,
    output: W,
    history: Option<HistoryLog>,
    events: Option<mpsc::UnboundedReceiver<RotationEvent>>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            history: None,
            events: None,
        }
    }

    /// Record finished games in `history`.
    pub fn with_history(mut self, history: HistoryLog) -> Self {
        self.history = Some(history);
        self
    }

    /// Show credential switches announced on `events`.
    pub fn with_events(mut self, events: mpsc::UnboundedReceiver<RotationEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Give back the output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    pub fn print_banner(&mut self, max_questions: u32) -> io::Result<()> {
        writeln!(self.output, "+{}+", "-".repeat(68))?;
        writeln!(self.output, "|{:^68}|", "Welcome to Cine-Sleuth!")?;
        writeln!(self.output, "|{:^68}|", "Your AI-powered movie detector")?;
        writeln!(self.output, "+{}+", "-".repeat(68))?;
        writeln!(
            self.output,
            "\nI will ask up to {} questions to guess the movie you're thinking of.\n",
            max_questions
        )
    }

    /// Print `prompt` and read one trimmed line. `None` on end of input.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Keep asking until the player answers yes, no or exit.
    pub fn ask_yes_no(&mut self, prompt: &str) -> io::Result<YesNo> {
        loop {
            let Some(answer) = self.read_line(prompt)? else {
                return Ok(YesNo::Exit);
            };
            match answer.to_lowercase().as_str() {
                "yes" | "y" => return Ok(YesNo::Yes),
                "no" | "n" => return Ok(YesNo::No),
                EXIT_WORD => return Ok(YesNo::Exit),
                _ => writeln!(self.output, "Please answer 'yes', 'no', or 'exit'.")?,
            }
        }
    }

    /// Run the whole program: banner, start prompt, one game.
    pub async fn run(
        &mut self,
        controller: &mut SessionController,
        max_questions: u32,
    ) -> anyhow::Result<GameSession> {
        self.print_banner(max_questions)?;

        let start = self.read_line("Type 'start' to begin or 'exit' to quit: ")?;
        let mut session = GameSession::new(max_questions);
        match start {
            Some(word) if !word.eq_ignore_ascii_case(EXIT_WORD) => {}
            _ => {
                writeln!(self.output, "Goodbye!")?;
                session.abort();
                return Ok(session);
            }
        }

        self.play(controller, &mut session).await?;
        Ok(session)
    }

    /// Play one game on `session` until it ends.
    ///
    /// Every question, including the last one, is shown and answered. After
    /// the last answer the detective gets one closing guess.
    pub async fn play(
        &mut self,
        controller: &mut SessionController,
        session: &mut GameSession,
    ) -> anyhow::Result<()> {
        let mut answer = String::new();

        loop {
            let closing =
                session.status() == GameStatus::Exhausted && session.open_question().is_some();
            let result = if closing {
                controller.final_guess(session, &answer).await
            } else {
                controller.advance(session, &answer).await
            };
            self.show_rotation_events()?;

            let response = match result {
                Ok(response) => response,
                Err(CineSleuthError::GameExhausted { .. }) => {
                    return self.finish_lost(controller, session).await;
                }
                Err(e) if !e.is_fatal() => {
                    writeln!(self.output, "\n❌ {}", e)?;
                    let retry = self.read_line("Press Enter to try again or type 'exit' to quit: ")?;
                    match retry {
                        Some(word) if !word.eq_ignore_ascii_case(EXIT_WORD) => continue,
                        _ => {
                            session.abort();
                            writeln!(self.output, "Thanks for playing!")?;
                            return Ok(());
                        }
                    }
                }
                Err(e) => {
                    writeln!(self.output, "\n❌ {}", e)?;
                    session.abort();
                    return Ok(());
                }
            };

            if response.is_guess {
                writeln!(self.output, "\nI think your movie is: {}", response.cleaned_text)?;
                match self.ask_yes_no("Is this correct? (yes/no): ")? {
                    YesNo::Yes => {
                        writeln!(self.output, "I guessed it! Thanks for playing!")?;
                        self.record(session, &response.cleaned_text, Outcome::AiWon);
                        return Ok(());
                    }
                    YesNo::No => {
                        session.reject_guess()?;
                        writeln!(self.output, "Hmm, maybe I need more questions...")?;
                        answer.clear();
                        if session.status() == GameStatus::Exhausted {
                            return self.finish_lost(controller, session).await;
                        }
                        continue;
                    }
                    YesNo::Exit => {
                        session.abort();
                        writeln!(self.output, "Thanks for playing!")?;
                        return Ok(());
                    }
                }
            }

            if closing {
                return self.finish_lost(controller, session).await;
            }

            writeln!(
                self.output,
                "\nAI Question {}: {}",
                session.question_count(),
                response.cleaned_text
            )?;
            match self.read_line("Your answer (or type 'exit' to quit): ")? {
                Some(text) if !text.eq_ignore_ascii_case(EXIT_WORD) => answer = text,
                _ => {
                    session.abort();
                    writeln!(self.output, "Thanks for playing!")?;
                    return Ok(());
                }
            }
        }
    }

    async fn finish_lost(
        &mut self,
        controller: &mut SessionController,
        session: &GameSession,
    ) -> anyhow::Result<()> {
        writeln!(self.output, "\nI couldn't guess your movie. You win this time!")?;

        let title = match self.read_line("What movie were you thinking of? ")? {
            Some(title) if !title.is_empty() => title,
            _ => {
                writeln!(self.output, "Bye... Thanks for playing!")?;
                return Ok(());
            }
        };

        self.record(session, &title, Outcome::PlayerWon);

        match controller.explain_miss(session, &title).await {
            Ok(explanation) => writeln!(self.output, "\nAI Response: {}", explanation)?,
            Err(e) => writeln!(self.output, "\n❌ {}", e)?,
        }
        self.show_rotation_events()?;
        writeln!(self.output, "Bye... Thanks for playing!")?;
        Ok(())
    }

    fn record(&self, session: &GameSession, movie: &str, outcome: Outcome) {
        if let Some(history) = &self.history {
            if let Err(e) = history.record(session, movie, outcome) {
                tracing::warn!("failed to save game history: {:#}", e);
            }
        }
    }

    fn show_rotation_events(&mut self) -> io::Result<()> {
        let Some(events) = self.events.as_mut() else {
            return Ok(());
        };
        while let Ok(event) = events.try_recv() {
            match event {
                RotationEvent::Switched { to, .. } => {
                    writeln!(self.output, "(switched to backup API key #{})", to)?
                }
                RotationEvent::Exhausted { tried } => {
                    writeln!(self.output, "(all {} API key(s) are over quota)", tried)?
                }
            }
        }
        Ok(())
    }
}
