//! Google Gemini API backend.
//!
//! Implements non-streaming completions against the `generateContent`
//! endpoint. See: https://ai.google.dev/api/generate-content

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ChatRole, CompletionBackend, CompletionRequest, LlmConfig, ProviderError, ProviderResult};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Request body for `generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Successful response body.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Error response from the Gemini API.
#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Gemini API backend.
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    config: Arc<LlmConfig>,
}

impl GeminiProvider {
    /// Create a new Gemini backend with the given configuration.
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_body(&self, request: &CompletionRequest) -> GenerateContentRequest {
        let system_instruction = if request.system.trim().is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: vec![Part {
                    text: request.system.clone(),
                }],
            })
        };

        let contents = request
            .messages
            .iter()
            .map(|m| Content {
                role: Some(match m.role {
                    ChatRole::User => "user",
                    ChatRole::Model => "model",
                }),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect();

        let generation_config = if self.config.temperature.is_some() || self.config.max_tokens.is_some() {
            Some(GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            })
        } else {
            None
        };

        GenerateContentRequest {
            system_instruction,
            contents,
            generation_config,
        }
    }
}

#[async_trait]
impl CompletionBackend for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, credential: &str, request: &CompletionRequest) -> ProviderResult<String> {
        let body = self.build_body(request);
        tracing::debug!(
            model = %self.config.model,
            messages = body.contents.len(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, credential)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        extract_text(parsed)
    }
}

/// Map a failed HTTP response onto a backend failure signal.
fn classify_failure(status: StatusCode, body: &str) -> ProviderError {
    let detail = serde_json::from_str::<GeminiError>(body).ok().map(|e| e.error);
    let api_status = detail.as_ref().map(|d| d.status.as_str()).unwrap_or("");
    let message = match &detail {
        Some(d) if !d.message.is_empty() => format!("{} ({})", d.message, status),
        _ if body.is_empty() => status.to_string(),
        _ => format!("{}: {}", status, body),
    };

    if status == StatusCode::TOO_MANY_REQUESTS || api_status == "RESOURCE_EXHAUSTED" {
        return ProviderError::QuotaExceeded(message);
    }

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || api_status == "PERMISSION_DENIED"
        || api_status == "UNAUTHENTICATED"
        || body.contains("API_KEY_INVALID")
    {
        return ProviderError::InvalidCredential(message);
    }

    if status.is_server_error() {
        return ProviderError::Connection(message);
    }

    ProviderError::Other(format!("Invalid request: {}", message))
}

/// Pull the generated text out of the first candidate.
fn extract_text(response: GenerateContentResponse) -> ProviderResult<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::Other(
            "The model returned an empty response".to_string(),
        ));
    }

    Ok(text)
}
