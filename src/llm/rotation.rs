//! Credential rotation.
//!
//! [`RotatingClient`] owns an ordered [`CredentialPool`] and runs every
//! request against the credential under the cursor. A quota signal moves the
//! cursor forward and replays the same request; once the last credential is
//! over quota the pool is exhausted for the rest of the process.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use super::{CompletionBackend, CompletionRequest, ProviderError};
use crate::error::{CineSleuthError, Result};

/// Where the pool cursor stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// The credential at this index is in use (or next to try).
    Active(usize),
    /// Every credential has hit its quota. Terminal.
    Exhausted,
}

/// Ordered list of API keys with a cursor.
///
/// Keys are fixed at construction; only the cursor moves, and it only moves
/// forward.
#[derive(Clone)]
pub struct CredentialPool {
    keys: Vec<String>,
    state: PoolState,
}

impl CredentialPool {
    /// Create a pool without validating the keys.
    ///
    /// An empty pool is allowed here; [`RotatingClient::call`] rejects it
    /// before touching the network.
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            keys,
            state: PoolState::Active(0),
        }
    }

    /// Create a pool, rejecting blank keys and keys containing whitespace.
    pub fn validated(keys: Vec<String>) -> Result<Self> {
        if keys.is_empty() {
            return Err(CineSleuthError::ApiKey(
                "no API key configured; set GEMINI_API_KEY in your environment or .env file"
                    .to_string(),
            ));
        }

        for (index, key) in keys.iter().enumerate() {
            if key.is_empty() || key.chars().any(char::is_whitespace) {
                return Err(CineSleuthError::ApiKey(format!(
                    "API key #{} is malformed (empty or contains whitespace)",
                    index + 1
                )));
            }
        }

        Ok(Self::new(keys))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn state(&self) -> PoolState {
        self.state
    }

    /// Index of the active credential, or `None` once exhausted.
    pub fn cursor(&self) -> Option<usize> {
        match self.state {
            PoolState::Active(i) => Some(i),
            PoolState::Exhausted => None,
        }
    }

    /// The active credential.
    pub fn current(&self) -> Option<&str> {
        self.cursor()
            .and_then(|i| self.keys.get(i))
            .map(String::as_str)
    }

    /// Move past the active credential.
    fn advance(&mut self) -> PoolState {
        self.state = match self.state {
            PoolState::Active(i) if i + 1 < self.keys.len() => PoolState::Active(i + 1),
            _ => PoolState::Exhausted,
        };
        self.state
    }
}

impl std::fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPool")
            .field("keys", &self.keys.iter().map(|k| mask(k)).collect::<Vec<_>>())
            .field("state", &self.state)
            .finish()
    }
}

/// Notification published whenever the pool cursor moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationEvent {
    /// Switched to a backup credential.
    Switched { from: usize, to: usize },
    /// No credential left.
    Exhausted { tried: usize },
}

/// Outcome of a single attempt with a single credential.
enum Attempt {
    Success(String),
    QuotaExceeded(String),
    Failed(ProviderError),
}

impl From<std::result::Result<String, ProviderError>> for Attempt {
    fn from(result: std::result::Result<String, ProviderError>) -> Self {
        match result {
            Ok(text) => Attempt::Success(text),
            Err(ProviderError::QuotaExceeded(msg)) => Attempt::QuotaExceeded(msg),
            Err(err) => Attempt::Failed(err),
        }
    }
}

/// Client that fails over between credentials on quota exhaustion.
pub struct RotatingClient {
    backend: Arc<dyn CompletionBackend>,
    pool: CredentialPool,
    events: Option<mpsc::UnboundedSender<RotationEvent>>,
}

impl RotatingClient {
    pub fn new(backend: Arc<dyn CompletionBackend>, pool: CredentialPool) -> Self {
        Self {
            backend,
            pool,
            events: None,
        }
    }

    /// Publish rotation events on the given channel.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<RotationEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }

    /// Run `request`, moving through the pool on quota errors.
    ///
    /// Any other failure ends the call immediately and leaves the cursor on
    /// the credential that produced it.
    pub async fn call(&mut self, request: &CompletionRequest) -> Result<String> {
        if self.pool.is_empty() {
            return Err(CineSleuthError::ApiKey(
                "no API key configured; set GEMINI_API_KEY in your environment or .env file"
                    .to_string(),
            ));
        }

        loop {
            let index = match self.pool.state() {
                PoolState::Active(i) => i,
                PoolState::Exhausted => {
                    return Err(CineSleuthError::AllKeysExhausted {
                        tried: self.pool.len(),
                    })
                }
            };

            let attempt: Attempt = self
                .backend
                .complete(&self.pool.keys[index], request)
                .await
                .into();

            match attempt {
                Attempt::Success(text) => return Ok(text),
                Attempt::QuotaExceeded(msg) => {
                    warn!(
                        credential = index,
                        key = %mask(&self.pool.keys[index]),
                        "quota exceeded: {}", msg
                    );
                    match self.pool.advance() {
                        PoolState::Active(next) => {
                            info!(from = index, to = next, "switched to backup API key");
                            self.notify(RotationEvent::Switched {
                                from: index,
                                to: next,
                            });
                        }
                        PoolState::Exhausted => {
                            let tried = self.pool.len();
                            warn!(tried, "every API key is over quota");
                            self.notify(RotationEvent::Exhausted { tried });
                            return Err(CineSleuthError::AllKeysExhausted { tried });
                        }
                    }
                }
                Attempt::Failed(err) => return Err(err.into()),
            }
        }
    }

    fn notify(&self, event: RotationEvent) {
        if let Some(tx) = &self.events {
            // Receiver may be gone if the front end stopped listening.
            let _ = tx.send(event);
        }
    }
}

/// Show only the tail of a key.
fn mask(key: &str) -> String {
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("...{}", tail)
}
