use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

/// Default location: `<config dir>/pagesort/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pagesort").join("config.json"))
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

/// Loads the config at `path`, falling back to defaults when the file does
/// not exist. Any other read or validation failure is returned.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        log::info!("No config at {:?}, using defaults", path);
        return Ok(Config::default());
    }
    load_config(path)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let base_url = &config.llm.base_url;
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation {
            message: format!("llm.base_url must be an http(s) URL, got '{}'", base_url),
        });
    }

    if config.llm.connect_timeout_secs == 0 || config.llm.request_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "llm timeouts must be greater than zero".to_string(),
        });
    }

    if config.store.event_capacity == 0 {
        return Err(ConfigError::Validation {
            message: "store.event_capacity must be greater than zero".to_string(),
        });
    }

    // Tesseract codes: `por`, `eng+deu`, `chi_sim`
    let language_ok = config.export.ocr_language.split('+').all(|code| {
        !code.is_empty() && code.chars().all(|c| c.is_ascii_lowercase() || c == '_')
    });
    if !language_ok {
        return Err(ConfigError::Validation {
            message: format!(
                "export.ocr_language is not a valid OCR language list: '{}'",
                config.export.ocr_language
            ),
        });
    }

    if config.export.done_directory.contains(['/', '\\']) {
        return Err(ConfigError::Validation {
            message: "export.done_directory must be a single directory name".to_string(),
        });
    }

    Ok(())
}
