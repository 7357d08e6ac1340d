use thiserror::Error;

/// Maximum length of a provider error body kept in an error message.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// What the user can do about a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remedy {
    /// The request may succeed if issued again.
    Retry,
    /// The API key is missing or rejected.
    CheckCredentials,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error (HTTP {status}, {error_type}): {message}")]
    Api {
        status: u16,
        error_type: String,
        message: String,
    },

    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    #[error("Response contained no text")]
    EmptyResponse,

    #[error("Response does not match the expected schema: {0}")]
    SchemaMismatch(String),

    #[error("Page {page} has neither image nor text content")]
    EmptyPage { page: String },
}

impl LlmError {
    pub fn remedy(&self) -> Remedy {
        match self {
            LlmError::Auth(_) => Remedy::CheckCredentials,
            _ => Remedy::Retry,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, LlmError::Auth(_))
    }

    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, LlmError::SchemaMismatch(_))
    }
}

impl From<crate::secrets::SecretError> for LlmError {
    fn from(e: crate::secrets::SecretError) -> Self {
        LlmError::Auth(e.to_string())
    }
}

/// Truncates a provider error body so it cannot flood logs.
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &body[..end])
}
