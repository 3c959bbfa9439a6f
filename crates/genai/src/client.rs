//! OpenAI-backed implementation of the [`GenerationService`] seam.
//!
//! Descriptions come from the chat completions endpoint, images from the
//! image generations endpoint. Quota exhaustion (HTTP 429 or quota/billing
//! phrasing in the error body) is classified separately so callers can log
//! it at `warn` rather than `error`; either way the caller decides what to
//! substitute.

use serde_json::json;

use crate::config::GenAiConfig;

/// Chat model used for description generation.
const DESCRIPTION_MODEL: &str = "gpt-3.5-turbo";

/// System prompt for description generation.
const DESCRIPTION_SYSTEM_PROMPT: &str = "You are a product description expert. \
    Generate a compelling, SEO-friendly product description based on the product \
    name. Keep it under 150 words and focus on benefits and features.";

/// Errors from the generation service.
#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    /// The service is not configured (no API key).
    #[error("Generation service not configured")]
    NotConfigured,

    /// Transport-level failure (connect, timeout, TLS).
    #[error("Generation request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Generation API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The API quota or billing limit was hit.
    #[error("Generation quota exceeded: {0}")]
    QuotaExceeded(String),

    /// A success response without the expected content field.
    #[error("Generation response missing content")]
    MissingContent,
}

/// External content-generation seam.
///
/// Both operations may fail or time out; consumers are expected to wrap
/// calls with fallback behaviour and never propagate the raw failure to
/// a row or job outcome.
#[async_trait::async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate a marketing description for a product name.
    async fn generate_description(&self, product_name: &str) -> Result<String, GenAiError>;

    /// Generate a product image and return its URL.
    async fn generate_image(&self, product_name: &str) -> Result<String, GenAiError>;
}

/// [`GenerationService`] implementation over an OpenAI-compatible API.
pub struct OpenAiClient {
    config: GenAiConfig,
    http: reqwest::Client,
}

impl OpenAiClient {
    /// Build a client from configuration. Fails only if the underlying
    /// HTTP client cannot be constructed.
    pub fn new(config: GenAiConfig) -> Result<Self, GenAiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, http })
    }

    /// POST a JSON body to `{base_url}{path}` and return the parsed
    /// response, classifying quota exhaustion and API errors.
    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, GenAiError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GenAiError::NotConfigured)?;

        let url = format!("{}{path}", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let payload: serde_json::Value = response.json().await.unwrap_or_default();

        if status.is_success() {
            return Ok(payload);
        }

        let message = payload["error"]["message"]
            .as_str()
            .unwrap_or("Unknown error")
            .to_string();

        if status.as_u16() == 429 || message.contains("quota") || message.contains("billing") {
            return Err(GenAiError::QuotaExceeded(message));
        }
        Err(GenAiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait::async_trait]
impl GenerationService for OpenAiClient {
    async fn generate_description(&self, product_name: &str) -> Result<String, GenAiError> {
        tracing::debug!(product_name, "Requesting generated description");

        let body = json!({
            "model": DESCRIPTION_MODEL,
            "messages": [
                { "role": "system", "content": DESCRIPTION_SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!("Generate a product description for: {product_name}"),
                },
            ],
            "max_tokens": 200,
            "temperature": 0.7,
        });

        let payload = self.post_json("/chat/completions", body).await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(GenAiError::MissingContent)
    }

    async fn generate_image(&self, product_name: &str) -> Result<String, GenAiError> {
        tracing::debug!(product_name, "Requesting generated image");

        let body = json!({
            "prompt": format!(
                "Professional product photography of {product_name}, clean background, \
                 high quality, commercial use"
            ),
            "n": 1,
            "size": "1024x1024",
            "response_format": "url",
        });

        let payload = self.post_json("/images/generations", body).await?;
        payload["data"][0]["url"]
            .as_str()
            .map(String::from)
            .filter(|s| !s.is_empty())
            .ok_or(GenAiError::MissingContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn unconfigured() -> OpenAiClient {
        OpenAiClient::new(GenAiConfig {
            api_key: None,
            base_url: "http://localhost:0".into(),
            request_timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn unconfigured_client_fails_fast() {
        let client = unconfigured();
        let err = client.generate_description("Oak Chair").await.unwrap_err();
        assert!(matches!(err, GenAiError::NotConfigured));

        let err = client.generate_image("Oak Chair").await.unwrap_err();
        assert!(matches!(err, GenAiError::NotConfigured));
    }
}
