//! API key resolution.
//!
//! The LLM API key is looked up from three sources, first match wins:
//!
//! 1. **Direct value** in the config file (`api_key`), for quick local testing
//! 2. **File reference** (`api_key_file`), for Docker secrets
//! 3. **Env var reference** (`api_key_env_var`, default `ANTHROPIC_API_KEY`)

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;

/// Environment variable consulted when no other source is configured.
pub const DEFAULT_API_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: direct value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },

    #[error("Secret from {origin} is empty")]
    Empty { origin: String },
}

pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves a secret from a direct value, a file, or an environment
/// variable, in that order. Empty sources are skipped; values are trimmed.
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    if let Some(value) = direct.filter(|v| !v.is_empty()) {
        return non_empty(value.trim(), "config value");
    }

    if let Some(path) = file_path.filter(|p| !p.is_empty()) {
        let expanded = expand_home(path);
        let content = fs::read_to_string(&expanded).map_err(|e| SecretError::FileReadError {
            path: expanded.clone(),
            source: e,
        })?;
        return non_empty(content.trim(), &format!("file '{}'", expanded));
    }

    if let Some(name) = env_var.filter(|n| !n.is_empty()) {
        return match std::env::var(name) {
            // Env vars may carry trailing newlines
            Ok(value) => non_empty(value.trim(), &format!("env var '{}'", name)),
            Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                name: name.to_string(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                name: name.to_string(),
            }),
        };
    }

    Err(SecretError::NoSourceProvided)
}

fn non_empty(value: &str, origin: &str) -> Result<SecretString> {
    if value.is_empty() {
        return Err(SecretError::Empty {
            origin: origin.to_string(),
        });
    }
    Ok(SecretString::from(value.to_string()))
}

/// Where the LLM API key comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeySource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_file: Option<String>,
    #[serde(default = "default_env_var")]
    pub api_key_env_var: String,
}

fn default_env_var() -> String {
    DEFAULT_API_KEY_ENV_VAR.to_string()
}

impl Default for ApiKeySource {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_file: None,
            api_key_env_var: default_env_var(),
        }
    }
}

impl ApiKeySource {
    /// Reads the key from an environment variable only.
    pub fn env(name: &str) -> Self {
        Self {
            api_key_env_var: name.to_string(),
            ..Default::default()
        }
    }

    pub fn resolve(&self) -> Result<SecretString> {
        resolve_secret(
            self.api_key.as_deref(),
            self.api_key_file.as_deref(),
            Some(self.api_key_env_var.as_str()),
        )
    }
}

/// Expands a leading `~` to the user's home directory.
///
/// `~user/path` is not supported.
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            let home = home.to_string_lossy();
            if path == "~" {
                return home.into_owned();
            }
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}
