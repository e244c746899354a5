use std::fmt;

use anyhow::Context;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ReportError;
use crate::http_client::read_success_body;
use crate::prompt::Prompt;

pub const DEFAULT_MODEL_URL: &str = "http://127.0.0.1:11434/api/generate";
pub const DEFAULT_MODEL: &str = "llama3.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEndpoint {
    pub url: String,
    pub model: String,
}

impl Default for ModelEndpoint {
    fn default() -> Self {
        Self {
            url: DEFAULT_MODEL_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Model output. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narrative(String);

impl Narrative {
    pub fn new(text: impl Into<String>) -> Result<Self, ReportError> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ReportError::generation_failed("model returned no text"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Narrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Language-model backend boundary.
pub trait TextGenerator {
    fn generate(&self, prompt: &Prompt) -> Result<Narrative, ReportError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Ollama-style `/api/generate`, non-streaming. The request is sent once.
pub struct OllamaGenerator {
    client: Client,
    endpoint: ModelEndpoint,
}

impl OllamaGenerator {
    pub fn new(client: Client, endpoint: ModelEndpoint) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &ModelEndpoint {
        &self.endpoint
    }

    fn post(&self, prompt: &Prompt) -> anyhow::Result<String> {
        let body = GenerateRequest {
            model: &self.endpoint.model,
            prompt: prompt.as_str(),
            stream: false,
        };
        let resp = self
            .client
            .post(&self.endpoint.url)
            .json(&body)
            .send()
            .context("request failed")?;
        read_success_body(resp)
    }
}

impl TextGenerator for OllamaGenerator {
    fn generate(&self, prompt: &Prompt) -> Result<Narrative, ReportError> {
        info!(
            url = %self.endpoint.url,
            model = %self.endpoint.model,
            prompt_bytes = prompt.len(),
            "requesting narrative"
        );
        let body = self
            .post(prompt)
            .map_err(|err| ReportError::generation_failed(format!("{err:#}")))?;
        parse_generate_response(&body)
    }
}

pub fn parse_generate_response(raw: &str) -> Result<Narrative, ReportError> {
    let parsed: GenerateResponse = serde_json::from_str(raw.trim())
        .map_err(|err| ReportError::generation_failed(format!("invalid response json: {err}")))?;
    if let Some(error) = parsed.error.filter(|e| !e.trim().is_empty()) {
        return Err(ReportError::generation_failed(error));
    }
    Narrative::new(parsed.response.unwrap_or_default())
}
