//! Prompt text sent to the model.

use super::reply::GUESS_MARKER;

/// First user message of every game.
pub const OPENING: &str = "I'm thinking of a movie. Ask your first question.";

/// Recorded when the player answers with nothing.
pub const NO_ANSWER: &str = "(no answer)";

/// Recorded when the player rejects a guess.
pub const REJECTION: &str = "No, that's not the movie I'm thinking of. Keep asking.";

const TOPICS: &str = "genre, time period or release year, actors and actresses, director, \
franchise vs standalone, setting, whether the lead is male or female, plot elements, \
famous scenes, themes and tone, cinematography style, popularity";

/// System instruction for a regular turn.
///
/// `remaining` counts the question about to be asked.
pub fn turn_instruction(max_questions: u32, remaining: u32) -> String {
    let mut text = format!(
        "You are a movie-detective AI playing a guessing game. The user is thinking of a movie \
         and answers your questions. You have only {max} questions in total and {remaining} \
         remaining, including this one. Focus mostly on the most recent answers to narrow \
         things down.\n\n\
         Either ask ONE question about the movie's {topics}, and output only the question; \
         or, if you are confident, reply with a single line of the form \
         `{marker} <movie title>` and nothing else.",
        max = max_questions,
        remaining = remaining,
        topics = TOPICS,
        marker = GUESS_MARKER,
    );

    if remaining <= 1 {
        text.push_str(
            "\n\nThis is your last question. Make it the one that best separates your \
             remaining candidates; you will be asked for your final guess after the answer.",
        );
    }

    text
}

/// System instruction for the guess made after the last answer.
pub fn closing_instruction() -> String {
    format!(
        "You are a movie-detective AI playing a guessing game and you have no questions \
         left. Based on the answers so far, mostly the most recent ones, guess the movie \
         the user is thinking of. Reply with a single line of the form \
         `{} <movie title>`, or, if you have no idea at all, say \
         'I need more questions'.",
        GUESS_MARKER
    )
}

/// System instruction used after the player reveals the movie.
pub fn explain_instruction() -> &'static str {
    "You are a movie-detective AI that just lost a guessing game. Be brief: two or three \
     sentences, no markdown."
}

/// Message revealing the movie after a lost game.
pub fn reveal_message(title: &str, summary: &str) -> String {
    let summary = if summary.is_empty() { "None" } else { summary };
    format!(
        "The movie was {title}. Explain why you could not get it, and point out any of my \
         answers that do not match it:\n{summary}\nJustify or complain shortly."
    )
}
