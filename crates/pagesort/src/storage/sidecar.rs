use std::path::{Path, PathBuf};

use crate::document::{extract_page_number, DocumentInfo};
use crate::error::StorageError;

/// Transcript (`.xml`) and document info (`.json`) files cached next to the
/// page images of a document.
///
/// Both live in the directory of the first page and are named after the page
/// numbers, e.g. `document_page_3_4_5.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidecar {
    xml_path: PathBuf,
    json_path: PathBuf,
}

impl Sidecar {
    pub fn for_pages<S: AsRef<str>>(pages_paths: &[S]) -> Result<Self, StorageError> {
        let first = pages_paths.first().ok_or(StorageError::NoPages)?;
        let first = Path::new(first.as_ref());
        let directory = first
            .parent()
            .ok_or_else(|| StorageError::NoParentDirectory(first.to_path_buf()))?;

        let numbers: Vec<&str> = pages_paths
            .iter()
            .map(|p| extract_page_number(p.as_ref()))
            .collect();
        let stem = format!("document_page_{}", numbers.join("_"));

        Ok(Self {
            xml_path: directory.join(format!("{}.xml", stem)),
            json_path: directory.join(format!("{}.json", stem)),
        })
    }

    pub fn xml_path(&self) -> &Path {
        &self.xml_path
    }

    pub fn json_path(&self) -> &Path {
        &self.json_path
    }

    /// Cached document info, if the JSON sidecar exists.
    pub fn read_info(&self) -> Result<Option<DocumentInfo>, StorageError> {
        if !self.json_path.exists() {
            return Ok(None);
        }
        read_info(&self.json_path).map(Some)
    }

    pub fn write_info(&self, info: &DocumentInfo) -> Result<(), StorageError> {
        write_info(&self.json_path, info)
    }

    /// Cached transcript, if the XML sidecar exists.
    pub fn read_transcript(&self) -> Result<Option<String>, StorageError> {
        if !self.xml_path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&self.xml_path)
            .map(Some)
            .map_err(|e| StorageError::ReadFile {
                path: self.xml_path.clone(),
                source: e,
            })
    }

    pub fn write_transcript(&self, xml: &str) -> Result<(), StorageError> {
        ensure_parent(&self.xml_path)?;
        std::fs::write(&self.xml_path, xml).map_err(|e| StorageError::WriteFile {
            path: self.xml_path.clone(),
            source: e,
        })
    }
}

pub fn read_info(path: &Path) -> Result<DocumentInfo, StorageError> {
    let content = std::fs::read_to_string(path).map_err(|e| StorageError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| StorageError::ParseJson {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn write_info(path: &Path, info: &DocumentInfo) -> Result<(), StorageError> {
    ensure_parent(path)?;
    let content = serde_json::to_string_pretty(info).map_err(StorageError::SerializeJson)?;
    std::fs::write(path, content).map_err(|e| StorageError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Renames the document stored in a JSON sidecar and rewrites the file.
///
/// Returns the updated info. The file is left untouched when the name is
/// unchanged.
pub fn update_file_name(path: &Path, name: &str) -> Result<DocumentInfo, StorageError> {
    let mut info = read_info(path)?;
    if info.rename(name) {
        write_info(path, &info)?;
    }
    Ok(info)
}

fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if !parent.as_os_str().is_empty() && !parent.exists() {
        std::fs::create_dir_all(parent).map_err(|e| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}
