use serde::{Deserialize, Serialize};

use crate::llm::Model;
use crate::secrets::ApiKeySource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            llm: LlmConfig::default(),
            store: StoreConfig::default(),
            export: ExportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Connection settings for the Anthropic Messages API.
///
/// Decoding parameters are not configurable; every request uses
/// [`crate::llm::DECODING`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(flatten)]
    pub credentials: ApiKeySource,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub default_model: Model,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    300
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            credentials: ApiKeySource::default(),
            base_url: default_base_url(),
            api_version: default_api_version(),
            default_model: Model::default(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
    crate::state::store::DEFAULT_EVENT_CAPACITY
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
        }
    }
}

/// External tools used to build the final PDF of a finished document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_qpdf")]
    pub qpdf_path: String,
    #[serde(default = "default_ocrmypdf")]
    pub ocrmypdf_path: String,
    /// Tesseract language code(s), e.g. `por` or `eng+deu`.
    #[serde(default = "default_ocr_language")]
    pub ocr_language: String,
    /// Directory created inside the page data directory for exported PDFs.
    #[serde(default = "default_done_directory")]
    pub done_directory: String,
}

fn default_true() -> bool {
    true
}

fn default_qpdf() -> String {
    "qpdf".to_string()
}

fn default_ocrmypdf() -> String {
    if cfg!(windows) {
        "ocrmypdf.exe".to_string()
    } else {
        "ocrmypdf".to_string()
    }
}

fn default_ocr_language() -> String {
    "por".to_string()
}

fn default_done_directory() -> String {
    "done".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            qpdf_path: default_qpdf(),
            ocrmypdf_path: default_ocrmypdf(),
            ocr_language: default_ocr_language(),
            done_directory: default_done_directory(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Fallback filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}
