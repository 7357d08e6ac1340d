//! Builders for document metadata and LLM replies.

#![allow(dead_code)]

use pagesort::document::{
    DocumentInfo, DocumentSummary, DocumentType, ImportantDate, MainEntities, Reasoning,
    TypeAbbreviation,
};

/// Builder for `DocumentInfo` values.
pub struct DocumentInfoBuilder {
    info: DocumentInfo,
}

impl DocumentInfoBuilder {
    pub fn new(file_name: &str) -> Self {
        Self {
            info: DocumentInfo {
                file_name: file_name.to_string(),
                reasoning: Reasoning {
                    document_summary: DocumentSummary {
                        analysis: "Single-page utility bill".to_string(),
                        formatting_process: "Kept supplier and billing month".to_string(),
                        summary: "Electricity bill".to_string(),
                    },
                    document_type: DocumentType {
                        analysis: "Invoice number and total due".to_string(),
                        type_name: "Invoice".to_string(),
                    },
                    important_date: ImportantDate {
                        analysis: "Issue date in the header".to_string(),
                        date: "2024-02-10".to_string(),
                    },
                    language: "pt".to_string(),
                    main_entities: MainEntities {
                        analysis: "Supplier logo".to_string(),
                        entities: "EDP Comercial".to_string(),
                    },
                    type_abbreviation: TypeAbbreviation {
                        analysis: "Fatura".to_string(),
                        type_abbr: "FAT".to_string(),
                    },
                },
                ..Default::default()
            },
        }
    }

    pub fn type_name(mut self, type_name: &str) -> Self {
        self.info.reasoning.document_type.type_name = type_name.to_string();
        self
    }

    pub fn pages_paths(mut self, paths: Vec<String>) -> Self {
        self.info.pages_paths = paths;
        self
    }

    pub fn json_file_path(mut self, path: &str) -> Self {
        self.info.json_file_path = path.to_string();
        self
    }

    pub fn build(self) -> DocumentInfo {
        self.info
    }
}

/// The file-name reply as the model sends it after the `{` prefill.
pub fn file_name_reply(file_name: &str) -> String {
    let json = serde_json::to_string(&DocumentInfoBuilder::new(file_name).build())
        .expect("DocumentInfo serializes");
    json[1..].to_string()
}

/// A reply that is valid JSON but lacks `reasoning.document_type`.
pub fn reply_without_document_type(file_name: &str) -> String {
    let mut value = serde_json::to_value(DocumentInfoBuilder::new(file_name).build())
        .expect("DocumentInfo serializes");
    value["reasoning"]
        .as_object_mut()
        .expect("reasoning is an object")
        .remove("document_type");
    value.to_string()[1..].to_string()
}
