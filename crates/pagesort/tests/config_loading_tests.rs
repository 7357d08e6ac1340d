//! Table-driven tests for configuration loading and validation.

mod common;

use pagesort::config::{load_config, load_config_from_str, LlmConfig};
use pagesort::llm::{LlmClient, Model};
use secrecy::ExposeSecret;
use serial_test::serial;
use tempfile::TempDir;

/// Represents a single config loading test case.
struct ConfigTestCase {
    name: &'static str,
    config_json: &'static str,
    should_succeed: bool,
    /// Expected error substring (if should_succeed is false).
    expected_error: Option<&'static str>,
}

const CONFIG_TESTS: &[ConfigTestCase] = &[
    ConfigTestCase {
        name: "empty_object",
        config_json: "{}",
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_full",
        config_json: r#"{
            "version": "1.0",
            "llm": {
                "api_key_env_var": "PAGESORT_KEY",
                "base_url": "https://llm.internal.example",
                "api_version": "2023-06-01",
                "default_model": "haiku",
                "connect_timeout_secs": 5,
                "request_timeout_secs": 120
            },
            "store": { "event_capacity": 64 },
            "export": {
                "enabled": true,
                "qpdf_path": "/usr/bin/qpdf",
                "ocrmypdf_path": "/usr/bin/ocrmypdf",
                "ocr_language": "por+eng",
                "done_directory": "finished"
            },
            "logging": { "level": "pagesort=debug", "json": true }
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "unknown_top_level_key",
        config_json: r#"{ "workers": 4 }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "unknown_model",
        config_json: r#"{ "llm": { "default_model": "opus" } }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "zero_timeout",
        config_json: r#"{ "llm": { "request_timeout_secs": 0 } }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "non_http_base_url",
        config_json: r#"{ "llm": { "base_url": "ftp://example.com" } }"#,
        should_succeed: false,
        expected_error: Some("base_url"),
    },
    ConfigTestCase {
        name: "done_directory_with_separator",
        config_json: r#"{ "export": { "done_directory": "out/done" } }"#,
        should_succeed: false,
        expected_error: Some("done_directory"),
    },
    ConfigTestCase {
        name: "uppercase_ocr_language",
        config_json: r#"{ "export": { "ocr_language": "POR" } }"#,
        should_succeed: false,
        expected_error: Some("ocr_language"),
    },
    ConfigTestCase {
        name: "not_json",
        config_json: "llm: {}",
        should_succeed: false,
        expected_error: Some("parse"),
    },
];

#[test]
fn test_config_table() {
    for case in CONFIG_TESTS {
        let result = load_config_from_str(case.config_json);
        if case.should_succeed {
            assert!(result.is_ok(), "{}: {:?}", case.name, result.err());
        } else {
            let err = result.expect_err(case.name).to_string();
            if let Some(expected) = case.expected_error {
                assert!(
                    err.contains(expected),
                    "{}: expected '{}' in '{}'",
                    case.name,
                    expected,
                    err
                );
            }
        }
    }
}

#[test]
fn test_load_config_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, r#"{ "llm": { "default_model": "haiku" } }"#).unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.llm.default_model, Model::Haiku);
}

#[test]
#[serial]
fn test_api_key_from_env_var() {
    std::env::set_var("PAGESORT_TEST_KEY", "sk-from-env");
    let config = load_config_from_str(r#"{ "llm": { "api_key_env_var": "PAGESORT_TEST_KEY" } }"#)
        .unwrap();

    let key = config.llm.credentials.resolve().unwrap();
    assert_eq!(key.expose_secret(), "sk-from-env");
    std::env::remove_var("PAGESORT_TEST_KEY");
}

#[test]
#[serial]
fn test_missing_api_key_is_auth_error() {
    std::env::remove_var("PAGESORT_UNSET_KEY");
    let config = LlmConfig {
        credentials: pagesort::secrets::ApiKeySource::env("PAGESORT_UNSET_KEY"),
        ..Default::default()
    };

    let err = LlmClient::from_config(&config).err().unwrap();
    assert!(err.is_auth());
    assert_eq!(err.remedy(), pagesort::llm::Remedy::CheckCredentials);
}
