//! Completion backend trait.
//!
//! A backend is the opaque text-completion capability the game talks to. It
//! receives a single credential per call and reports failures in one of four
//! categories, which the rotating client uses to decide whether to fail over.

use async_trait::async_trait;

use super::CompletionRequest;
use crate::error::CineSleuthError;

/// Trait for text-completion backends.
///
/// Implementations must not retry on their own; retry and credential
/// failover belong to [`RotatingClient`](super::RotatingClient).
///
/// # Example
///
/// ```ignore
/// use cinesleuth::llm::{CompletionBackend, CompletionRequest};
///
/// async fn ask(backend: &dyn CompletionBackend, key: &str) {
///     let request = CompletionRequest::new("You are a movie detective.");
///     match backend.complete(key, &request).await {
///         Ok(text) => println!("{text}"),
///         Err(e) => eprintln!("{e}"),
///     }
/// }
/// ```
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Human readable backend name.
    fn name(&self) -> &str;

    /// Returns the model used for completions.
    fn model(&self) -> &str;

    /// Run one completion with the given credential.
    async fn complete(&self, credential: &str, request: &CompletionRequest) -> ProviderResult<String>;
}

/// Result type for backend operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failure signals a backend can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The credential's usage allowance is used up.
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The credential is malformed, revoked or lacks permission.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Network or service availability problem.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Anything else the backend could not handle.
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Connection("Request timed out".to_string())
        } else if err.is_connect() {
            Self::Connection(format!("Could not reach the service: {}", err))
        } else if err.is_decode() {
            Self::Other(format!("Unreadable response: {}", err))
        } else {
            Self::Connection(err.to_string())
        }
    }
}

impl From<ProviderError> for CineSleuthError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::QuotaExceeded(msg) => CineSleuthError::ApiQuota(msg),
            ProviderError::InvalidCredential(msg) => CineSleuthError::ApiKey(msg),
            ProviderError::Connection(msg) => CineSleuthError::ApiConnection(msg),
            ProviderError::Other(msg) => CineSleuthError::Other(msg),
        }
    }
}
