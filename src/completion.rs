//! Client for the external completion provider.
//!
//! Privacy notice: `complete` sends the rendered prompt, which contains
//! the caller's raw text, to a third-party service.  This is the only
//! place the text crosses the process boundary.  Nothing about the call
//! or its outcome is retained after the response is returned.
//!
//! The client makes exactly one attempt per call.  Provider-side failures
//! are classified once into a [`CompletionError`] and surfaced to the
//! caller, which owns any retry policy.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prompt::SYSTEM_PROMPT;

/// Fixed model identifier for every completion call.
pub const MODEL: &str = "gpt-4o";

// Low temperature favors deterministic classification over creative output.
const TEMPERATURE: f32 = 0.3;

/// Classified failure of a completion call.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion provider rejected the API credential")]
    Auth,
    #[error("completion provider rate limit exceeded")]
    RateLimit,
    #[error("completion provider unreachable: {0}")]
    Network(String),
    #[error("completion provider error: {0}")]
    Provider(String),
    #[error("unexpected completion failure: {0}")]
    Unknown(String),
}

impl CompletionError {
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::Auth => "auth",
            CompletionError::RateLimit => "rate_limit",
            CompletionError::Network(_) => "network",
            CompletionError::Provider(_) => "provider_error",
            CompletionError::Unknown(_) => "unknown",
        }
    }
}

/// Thin wrapper over the provider's chat-completions endpoint.
///
/// Constructed once at startup with an injected credential and an explicit
/// timeout; shared across requests via the application state.  A missing
/// credential is not detected here but by the provider on first use, so
/// the service can boot (and report healthy) without one.
pub struct CompletionClient {
    api_key: SecretString,
    base_url: String,
    client: reqwest::Client,
}

impl CompletionClient {
    pub fn new(api_key: SecretString, base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");
        Self {
            api_key,
            base_url: base_url.into(),
            client,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Run one completion call and return the model's textual payload.
    /// The response is constrained to JSON-object mode; parsing and shape
    /// validation of the payload happen in [`crate::schema`], not here.
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: TEMPERATURE,
        };

        let resp = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    CompletionError::Network(format!("request timed out: {err}"))
                } else if err.is_connect() {
                    CompletionError::Network(format!("connection failed: {err}"))
                } else {
                    CompletionError::Network(err.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "completion provider returned an error status");
            return Err(classify_status(status, &detail));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|err| CompletionError::Provider(format!("unreadable completion payload: {err}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::Provider("completion contained no choices".to_string()))
    }
}

fn classify_status(status: StatusCode, detail: &str) -> CompletionError {
    match status.as_u16() {
        401 | 403 => CompletionError::Auth,
        429 => CompletionError::RateLimit,
        500..=599 => CompletionError::Provider(format!("provider returned {status}: {detail}")),
        _ => CompletionError::Unknown(format!("unexpected status {status}: {detail}")),
    }
}

// ----- Provider wire types -----

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat<'a>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
