//! Validation of the model's structured answer.

use serde_json::Value;

use crate::document::{validate_file_name, FileNameGeneration};

use super::error::LlmError;

const RESPONSE_SCHEMA: &str = include_str!("../../../../schema/file-name-generation-v2.json");

/// JSON schema the file-name answer must satisfy.
pub fn response_schema() -> &'static str {
    RESPONSE_SCHEMA
}

/// Locates the JSON object in a reply, tolerating code fences and prose
/// around it.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parses and validates a file-name answer.
///
/// Anything that is not a JSON object satisfying the schema is a
/// [`LlmError::SchemaMismatch`]; missing fields are never defaulted.
pub fn parse_file_name_generation(text: &str) -> Result<FileNameGeneration, LlmError> {
    let json = extract_json_object(text)
        .ok_or_else(|| LlmError::SchemaMismatch("no JSON object in response".to_string()))?;

    let value: Value = serde_json::from_str(json)
        .map_err(|e| LlmError::SchemaMismatch(format!("invalid JSON: {}", e)))?;

    let schema: Value = serde_json::from_str(RESPONSE_SCHEMA)
        .map_err(|e| LlmError::SchemaMismatch(format!("invalid embedded schema: {}", e)))?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| LlmError::SchemaMismatch(format!("invalid embedded schema: {}", e)))?;

    let errors: Vec<String> = validator.iter_errors(&value).map(|e| e.to_string()).collect();
    if !errors.is_empty() {
        return Err(LlmError::SchemaMismatch(errors.join("; ")));
    }

    let parsed: FileNameGeneration =
        serde_json::from_value(value).map_err(|e| LlmError::SchemaMismatch(e.to_string()))?;
    validate_file_name(&parsed.file_name).map_err(|e| LlmError::SchemaMismatch(e.to_string()))?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "file_name": "FAT 2024-02-10 EDP Comercial - Electricity invoice",
        "reasoning": {
            "document_summary": {
                "analysis": "Monthly electricity bill",
                "formatting_process": "Kept supplier and period",
                "summary": "Electricity invoice for January 2024"
            },
            "document_type": {"analysis": "Has invoice number and total", "type_name": "Invoice"},
            "important_date": {"analysis": "Issue date", "date": "2024-02-10"},
            "language": "pt",
            "main_entities": {"analysis": "Supplier", "entities": "EDP Comercial"},
            "type_abbreviation": {"analysis": "Fatura", "type_abbr": "FAT"}
        }
    }"#;

    #[test]
    fn test_parse_valid_response() {
        let parsed = parse_file_name_generation(VALID).unwrap();
        assert_eq!(
            parsed.file_name,
            "FAT 2024-02-10 EDP Comercial - Electricity invoice"
        );
        assert_eq!(parsed.reasoning.document_type.type_name, "Invoice");
        assert_eq!(parsed.reasoning.type_abbreviation.type_abbr, "FAT");
    }

    #[test]
    fn test_parse_rejects_path_in_file_name() {
        let text = VALID.replace(
            "FAT 2024-02-10 EDP Comercial - Electricity invoice",
            "../../FAT 2024-02-10",
        );
        let err = parse_file_name_generation(&text).unwrap_err();
        assert!(err.is_schema_mismatch());
        assert!(err.to_string().contains("../../FAT 2024-02-10"));
    }

    #[test]
    fn test_parse_tolerates_code_fence() {
        let fenced = format!("Here you go:\n```json\n{}\n```", VALID);
        assert!(parse_file_name_generation(&fenced).is_ok());
    }

    #[test]
    fn test_missing_document_type_is_schema_mismatch() {
        let mut value: Value = serde_json::from_str(VALID).unwrap();
        value["reasoning"]
            .as_object_mut()
            .unwrap()
            .remove("document_type");
        let err = parse_file_name_generation(&value.to_string()).unwrap_err();
        assert!(err.is_schema_mismatch(), "got {:?}", err);
    }

    #[test]
    fn test_null_field_is_schema_mismatch() {
        let mut value: Value = serde_json::from_str(VALID).unwrap();
        value["reasoning"]["document_type"] = Value::Null;
        let err = parse_file_name_generation(&value.to_string()).unwrap_err();
        assert!(err.is_schema_mismatch());
    }

    #[test]
    fn test_empty_file_name_is_schema_mismatch() {
        let mut value: Value = serde_json::from_str(VALID).unwrap();
        value["file_name"] = Value::String(String::new());
        assert!(parse_file_name_generation(&value.to_string())
            .unwrap_err()
            .is_schema_mismatch());
    }

    #[test]
    fn test_no_json_is_schema_mismatch() {
        let err = parse_file_name_generation("I could not read the document.").unwrap_err();
        assert!(err.is_schema_mismatch());
    }

    #[test]
    fn test_truncated_json_is_schema_mismatch() {
        let truncated = &VALID[..VALID.len() / 2];
        let err = parse_file_name_generation(&format!("{}}}", truncated)).unwrap_err();
        assert!(err.is_schema_mismatch());
    }

    #[test]
    fn test_embedded_schema_is_valid_json() {
        let schema: Value = serde_json::from_str(response_schema()).unwrap();
        assert!(jsonschema::validator_for(&schema).is_ok());
    }
}
