//! OpenAI-compatible chat-completions provider.
//!
//! Works against any endpoint speaking the OpenAI chat API, which covers
//! the hosted inference gateways the pipeline was built around.

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;

use crate::error::{RefineryError, Result};

use super::prompts;
use super::provider::{CollabConfig, Collaborator};

/// Default API base URL (OpenAI-compatible gateway).
const DEFAULT_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";

/// Collaborator backed by an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiCompatible {
    client: Client,
    base_url: String,
    api_key: String,
    config: CollabConfig,
}

impl OpenAiCompatible {
    /// Create a provider against the default base URL.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(DEFAULT_BASE_URL, api_key, CollabConfig::default())
    }

    /// Create a provider with a custom base URL and configuration.
    pub fn with_config(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        config: CollabConfig,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RefineryError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            config,
        })
    }

    /// Create from environment variables (`REFINERY_API_KEY`, and
    /// optionally `REFINERY_BASE_URL`).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("REFINERY_API_KEY").map_err(|_| {
            RefineryError::Config("REFINERY_API_KEY environment variable not set".to_string())
        })?;
        let base_url =
            std::env::var("REFINERY_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_config(base_url, api_key, CollabConfig::default())
    }

    /// Get the configuration this provider was built with.
    pub fn config(&self) -> &CollabConfig {
        &self.config
    }

    /// Build headers for API requests.
    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| RefineryError::Config(format!("Invalid API key: {}", e)))?,
        );
        Ok(headers)
    }

    fn unavailable(&self, message: impl Into<String>) -> RefineryError {
        RefineryError::CollaboratorUnavailable {
            collaborator: self.name().to_string(),
            message: message.into(),
        }
    }

    fn malformed(&self, message: impl Into<String>) -> RefineryError {
        RefineryError::CollaboratorMalformed {
            collaborator: self.name().to_string(),
            message: message.into(),
        }
    }
}

impl Collaborator for OpenAiCompatible {
    fn complete(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [
                {
                    "role": "system",
                    "content": prompts::system_prompt()
                },
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .map_err(|e| self.unavailable(format!("API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(self.unavailable(format!("API error ({}): {}", status, error_text)));
        }

        let api_response: ChatResponse = response
            .json()
            .map_err(|e| self.malformed(format!("Failed to parse API response: {}", e)))?;

        api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| self.malformed("No choices in API response"))
    }

    fn name(&self) -> &str {
        "openai-compat"
    }
}

/// Chat-completions response structure.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}
