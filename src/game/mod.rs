//! The guessing game itself: session state, the turn controller, and the
//! prompt/reply handling around each model call.

mod controller;
mod prompt;
mod reply;
mod session;

pub use controller::SessionController;
pub use reply::{classify, classify_closing, sanitize, AiResponse, Classification, GUESS_MARKER};
pub use session::{GameSession, GameStatus, DEFAULT_MAX_QUESTIONS};
