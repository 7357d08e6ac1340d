//! HTTP transport for the Messages API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::config::LlmConfig;

use super::error::{truncate_body, LlmError};
use super::wire::{ApiErrorBody, MessagesRequest, MessagesResponse};

/// Response headers reporting rate-limit state.
const RATE_LIMIT_HEADERS: &[&str] = &[
    "anthropic-ratelimit-requests-limit",
    "anthropic-ratelimit-requests-remaining",
    "anthropic-ratelimit-requests-reset",
    "anthropic-ratelimit-tokens-limit",
    "anthropic-ratelimit-tokens-remaining",
    "anthropic-ratelimit-tokens-reset",
    "retry-after",
];

/// Sends one Messages API request and returns the decoded response.
#[async_trait]
pub trait MessagesTransport: Send + Sync {
    async fn send(&self, request: &MessagesRequest) -> Result<MessagesResponse, LlmError>;
}

/// Messages API over HTTPS.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    api_key: SecretString,
    api_version: String,
}

impl HttpTransport {
    /// Builds the transport, resolving the API key. A missing key is an
    /// [`LlmError::Auth`].
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.credentials.resolve()?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LlmError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/messages", config.base_url.trim_end_matches('/')),
            api_key,
            api_version: config.api_version.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn log_rate_limits(response: &Response) {
    for header in RATE_LIMIT_HEADERS {
        if let Some(value) = response.headers().get(*header) {
            debug!(header = *header, value = ?value, "rate limit");
        }
    }
}

async fn error_from_response(response: Response) -> LlmError {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return LlmError::Transport(format!("Failed to read error body: {}", e)),
    };
    let (error_type, message) = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => (parsed.error.error_type, truncate_body(&parsed.error.message)),
        Err(_) => ("unknown".to_string(), truncate_body(&body)),
    };

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return LlmError::Auth(format!("{}: {}", error_type, message));
    }

    LlmError::Api {
        status: status.as_u16(),
        error_type,
        message,
    }
}

#[async_trait]
impl MessagesTransport for HttpTransport {
    async fn send(&self, request: &MessagesRequest) -> Result<MessagesResponse, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", &self.api_version)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        log_rate_limits(&response);

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let output: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        info!(
            model = %request.model,
            input_tokens = output.usage.input_tokens,
            output_tokens = output.usage.output_tokens,
            "Messages request succeeded"
        );

        Ok(output)
    }
}
