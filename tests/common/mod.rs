#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use cinesleuth::game::SessionController;
use cinesleuth::llm::{
    CompletionBackend, CompletionRequest, CredentialPool, ProviderError, ProviderResult,
    RotatingClient,
};

/// In-memory backend that replays scripted outcomes per credential.
///
/// Queued outcomes are used first; once a key's queue is empty its sticky
/// outcome (if any) is returned forever.
#[derive(Default)]
pub struct ScriptedBackend {
    queued: Mutex<HashMap<String, VecDeque<ProviderResult<String>>>>,
    sticky: Mutex<HashMap<String, ProviderResult<String>>>,
    calls: Mutex<Vec<(String, CompletionRequest)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `key`.
    pub fn reply(self, key: &str, text: &str) -> Self {
        self.push(key, Ok(text.to_string()))
    }

    /// Queue a failure for `key`.
    pub fn fail(self, key: &str, err: ProviderError) -> Self {
        self.push(key, Err(err))
    }

    /// Queue several replies for `key`.
    pub fn replies(mut self, key: &str, texts: &[&str]) -> Self {
        for text in texts {
            self = self.reply(key, text);
        }
        self
    }

    /// Every call with `key` that is not queued gets this outcome.
    pub fn always(self, key: &str, outcome: ProviderResult<String>) -> Self {
        self.sticky.lock().unwrap().insert(key.to_string(), outcome);
        self
    }

    fn push(self, key: &str, outcome: ProviderResult<String>) -> Self {
        self.queued
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    /// Keys used, in call order.
    pub fn keys_used(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, credential: &str, request: &CompletionRequest) -> ProviderResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((credential.to_string(), request.clone()));

        if let Some(outcome) = self
            .queued
            .lock()
            .unwrap()
            .get_mut(credential)
            .and_then(|q| q.pop_front())
        {
            return outcome;
        }

        self.sticky
            .lock()
            .unwrap()
            .get(credential)
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::Other(format!("nothing scripted for {}", credential))))
    }
}

pub fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

pub fn quota() -> ProviderError {
    ProviderError::QuotaExceeded("429 Too Many Requests".to_string())
}

pub fn rotating(backend: &Arc<ScriptedBackend>, names: &[&str]) -> RotatingClient {
    RotatingClient::new(backend.clone(), CredentialPool::new(keys(names)))
}

pub fn controller(backend: &Arc<ScriptedBackend>, names: &[&str]) -> SessionController {
    SessionController::new(rotating(backend, names))
}
