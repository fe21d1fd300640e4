//! CineSleuth - an AI detective that guesses the movie you're thinking of.
//!
//! This library exposes the core modules for testing and reuse.

pub mod config;
pub mod console;
pub mod error;
pub mod game;
pub mod history;
pub mod llm;
pub mod message;

pub use error::{CineSleuthError, Result};
