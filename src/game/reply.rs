//! Turning raw model output into something the game can act on.
//!
//! [`sanitize`] strips the markdown the model likes to add, and [`classify`]
//! decides whether the reply is another question or a final guess.
//!
//! # Guess marker grammar
//!
//! A reply is a guess when one of its lines, after trimming, starts with the
//! words `final guess` (any case), followed by optional whitespace, then `:`
//! or `-`, then a non-empty title:
//!
//! ```text
//! FINAL GUESS: The Matrix
//! Final guess - "Jurassic Park"
//! ```
//!
//! The title is the rest of that line with surrounding quotes removed. A
//! reply mentioning `need more questions` anywhere is never a guess.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker the model is told to use for its final answer.
pub const GUESS_MARKER: &str = "FINAL GUESS:";

/// Phrase the model uses when it is not ready to guess.
const NEED_MORE: &str = "need more questions";

static BOLD_STARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("invalid sanitize regex"));
static ITALIC_STARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*(.+?)\*").expect("invalid sanitize regex"));
static BOLD_UNDERSCORES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__(.+?)__").expect("invalid sanitize regex"));
static ITALIC_UNDERSCORES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_(.+?)_").expect("invalid sanitize regex"));
static CODE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[\s\S]*?```").expect("invalid sanitize regex"));
static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`(.+?)`").expect("invalid sanitize regex"));
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]*").expect("invalid sanitize regex"));
static BLANK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("invalid sanitize regex"));
static GUESS_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^final\s+guess\s*[:\-]\s*(.+)$").expect("invalid guess regex"));

/// A reply from the detective, before and after cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiResponse {
    pub raw_text: String,
    pub cleaned_text: String,
    pub is_guess: bool,
}

impl AiResponse {
    /// Sanitize and classify a raw model reply.
    ///
    /// For a guess, `cleaned_text` is just the title.
    pub fn from_raw(raw_text: impl Into<String>) -> Self {
        Self::classified_by(raw_text.into(), classify)
    }

    /// Sanitize and classify the reply to the closing guess request.
    ///
    /// Here a bare title also counts as a guess, see [`classify_closing`].
    pub fn from_closing_raw(raw_text: impl Into<String>) -> Self {
        Self::classified_by(raw_text.into(), classify_closing)
    }

    fn classified_by(raw_text: String, classifier: fn(&str) -> Classification) -> Self {
        let (cleaned_text, is_guess) = match classifier(&sanitize(&raw_text)) {
            Classification::Question(text) => (text, false),
            Classification::Guess(title) => (title, true),
        };
        Self {
            raw_text,
            cleaned_text,
            is_guess,
        }
    }
}

/// What a reply amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Another question (or any non-guess text).
    Question(String),
    /// A final guess carrying the movie title.
    Guess(String),
}

/// Strip markdown formatting from model output.
///
/// Passes run until the text stops changing, so the result is stable:
/// `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = sanitize_pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

// Every rule only removes characters, so the loop above terminates.
fn sanitize_pass(text: &str) -> String {
    let text = BOLD_STARS.replace_all(text, "$1");
    let text = ITALIC_STARS.replace_all(&text, "$1");
    let text = BOLD_UNDERSCORES.replace_all(&text, "$1");
    let text = ITALIC_UNDERSCORES.replace_all(&text, "$1");
    let text = CODE_BLOCK.replace_all(&text, "");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = HEADING.replace_all(&text, "");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Decide whether `text` is a question or a final guess.
pub fn classify(text: &str) -> Classification {
    let trimmed = text.trim();
    if trimmed.to_lowercase().contains(NEED_MORE) {
        return Classification::Question(trimmed.to_string());
    }

    for line in trimmed.lines() {
        if let Some(caps) = GUESS_LINE.captures(line.trim()) {
            let title = strip_quotes(caps[1].trim());
            if !title.is_empty() {
                return Classification::Guess(title.to_string());
            }
        }
    }

    Classification::Question(trimmed.to_string())
}

/// Like [`classify`], for a reply that was asked to be nothing but a guess.
///
/// A single line that is neither a question nor the `need more questions`
/// phrase is taken as a bare title.
pub fn classify_closing(text: &str) -> Classification {
    match classify(text) {
        Classification::Question(text) => {
            let is_bare_title = !text.is_empty()
                && !text.contains('\n')
                && !text.ends_with('?')
                && !text.to_lowercase().contains(NEED_MORE);
            let title = strip_quotes(&text);
            if is_bare_title && !title.is_empty() {
                Classification::Guess(title.to_string())
            } else {
                Classification::Question(text)
            }
        }
        guess => guess,
    }
}

fn strip_quotes(title: &str) -> &str {
    title
        .trim_matches(|c| matches!(c, '"' | '\'' | '“' | '”'))
        .trim()
}
