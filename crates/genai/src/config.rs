use std::time::Duration;

/// Generation-service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct GenAiConfig {
    /// API key; `None` means the service is unconfigured and every call
    /// will fail fast (callers fall back to templated content).
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl GenAiConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                     |
    /// |--------------------------|-----------------------------|
    /// | `OPENAI_API_KEY`         | unset                       |
    /// | `OPENAI_BASE_URL`        | `https://api.openai.com/v1` |
    /// | `OPENAI_TIMEOUT_SECS`    | `15`                        |
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());

        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into());

        let timeout_secs: u64 = std::env::var("OPENAI_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".into())
            .parse()
            .expect("OPENAI_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            base_url,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}
