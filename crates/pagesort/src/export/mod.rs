//! Export of a finished document into a searchable PDF.
//!
//! The selected pages are cut from the source PDF with `qpdf` and then
//! re-OCRed into PDF/A-2 with `ocrmypdf`. The source PDF is the data
//! directory with its `-data` suffix replaced by `.pdf`; e.g. pages under
//! `scans/batch-data/` come from `scans/batch.pdf`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;

use regex::Regex;
use tokio::process::Command;
use tracing::{debug, info, info_span, Instrument};

use crate::config::ExportConfig;
use crate::document::{extract_page_number, validate_file_name, DocumentInfo};
use crate::error::{ExportError, StorageError};
use crate::sanitize::{hash_path, redact_path};

static RE_DATA_DIR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(.+)-data$").unwrap());

/// Paths and page list for exporting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    pub source_pdf: PathBuf,
    pub done_directory: PathBuf,
    pub output: PathBuf,
    pub pages: Vec<String>,
}

impl ExportPlan {
    pub fn from_info(info: &DocumentInfo, config: &ExportConfig) -> Result<Self, ExportError> {
        if info.json_file_path.is_empty() {
            return Err(ExportError::MissingJsonPath);
        }
        if info.pages_paths.is_empty() {
            return Err(StorageError::NoPages.into());
        }
        validate_file_name(&info.file_name)?;

        let json_path = Path::new(&info.json_file_path);
        let data_dir = json_path
            .parent()
            .ok_or_else(|| ExportError::NoParentDirectory(json_path.to_path_buf()))?;

        let data_dir_str = data_dir.to_string_lossy();
        let source_pdf = PathBuf::from(format!("{}.pdf", RE_DATA_DIR.replace(&data_dir_str, "$1")));
        let done_directory = data_dir.join(&config.done_directory);
        let output = done_directory.join(format!("{}.pdf", info.file_name));
        let pages = info
            .pages_paths
            .iter()
            .map(|p| extract_page_number(p).to_string())
            .collect();

        Ok(Self {
            source_pdf,
            done_directory,
            output,
            pages,
        })
    }

    pub fn qpdf_args(&self) -> Vec<String> {
        vec![
            "--empty".to_string(),
            "--pages".to_string(),
            self.source_pdf.to_string_lossy().into_owned(),
            self.pages.join(","),
            "--".to_string(),
            self.output.to_string_lossy().into_owned(),
        ]
    }

    pub fn ocrmypdf_args(&self, language: &str) -> Vec<String> {
        let output = self.output.to_string_lossy().into_owned();
        vec![
            "--force-ocr".to_string(),
            "--pdf-renderer".to_string(),
            "hocr".to_string(),
            "--color-conversion-strategy".to_string(),
            "UseDeviceIndependentColor".to_string(),
            "-l".to_string(),
            language.to_string(),
            "--clean".to_string(),
            "--output-type".to_string(),
            "pdfa-2".to_string(),
            output.clone(),
            output,
        ]
    }
}

/// Runs export plans with the configured tools.
#[derive(Debug, Clone)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn plan(&self, info: &DocumentInfo) -> Result<ExportPlan, ExportError> {
        ExportPlan::from_info(info, &self.config)
    }

    /// Exports the document described by `info`, replacing any earlier export
    /// with the same name. Returns the output path.
    pub async fn export(&self, info: &DocumentInfo) -> Result<PathBuf, ExportError> {
        if !self.config.enabled {
            return Err(ExportError::Disabled);
        }
        let plan = self.plan(info)?;
        let span = info_span!("export",
            scan = %hash_path(&plan.source_pdf),
            output = %redact_path(&plan.output),
        );
        self.run(&plan).instrument(span).await?;
        Ok(plan.output)
    }

    pub async fn run(&self, plan: &ExportPlan) -> Result<(), ExportError> {
        if !plan.done_directory.exists() {
            tokio::fs::create_dir_all(&plan.done_directory)
                .await
                .map_err(|e| StorageError::CreateDirectory {
                    path: plan.done_directory.clone(),
                    source: e,
                })?;
        }

        if plan.output.exists() {
            debug!("Removing previous export");
            tokio::fs::remove_file(&plan.output)
                .await
                .map_err(|e| StorageError::RemoveFile {
                    path: plan.output.clone(),
                    source: e,
                })?;
        }

        run_tool(&self.config.qpdf_path, &plan.qpdf_args()).await?;
        run_tool(
            &self.config.ocrmypdf_path,
            &plan.ocrmypdf_args(&self.config.ocr_language),
        )
        .await?;

        info!(pages = plan.pages.len(), "Document exported");
        Ok(())
    }
}

async fn run_tool(tool: &str, args: &[String]) -> Result<(), ExportError> {
    debug!(tool, ?args, "Running export tool");

    let output = Command::new(tool)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| ExportError::Spawn {
            tool: tool.to_string(),
            source: e,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stdout.lines().chain(stderr.lines()) {
        debug!(tool, "{}", line);
    }

    if !output.status.success() {
        return Err(ExportError::ToolFailed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn info_in(data_dir: &Path, name: &str, pages: &[u32]) -> DocumentInfo {
        DocumentInfo {
            file_name: name.to_string(),
            json_file_path: data_dir
                .join("document_page_1.json")
                .to_string_lossy()
                .into_owned(),
            pages_paths: pages
                .iter()
                .map(|p| {
                    data_dir
                        .join(format!("page-{}.webp", p))
                        .to_string_lossy()
                        .into_owned()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_plan_derives_source_and_output() {
        let info = info_in(Path::new("/scans/batch-data"), "FAT 2024-01-05 EDP", &[3, 4, 5]);
        let plan = ExportPlan::from_info(&info, &ExportConfig::default()).unwrap();

        assert_eq!(plan.source_pdf, PathBuf::from("/scans/batch.pdf"));
        assert_eq!(plan.done_directory, PathBuf::from("/scans/batch-data/done"));
        assert_eq!(
            plan.output,
            PathBuf::from("/scans/batch-data/done/FAT 2024-01-05 EDP.pdf")
        );
        assert_eq!(plan.pages, vec!["3", "4", "5"]);
    }

    #[test]
    fn test_plan_keeps_dots_in_file_name() {
        let info = info_in(Path::new("/scans/batch-data"), "REC 2024 Dr. Silva", &[1]);
        let plan = ExportPlan::from_info(&info, &ExportConfig::default()).unwrap();
        assert!(plan.output.ends_with("REC 2024 Dr. Silva.pdf"));
    }

    #[test]
    fn test_qpdf_args() {
        let info = info_in(Path::new("/scans/batch-data"), "doc", &[2, 7]);
        let plan = ExportPlan::from_info(&info, &ExportConfig::default()).unwrap();

        assert_eq!(
            plan.qpdf_args(),
            vec![
                "--empty",
                "--pages",
                "/scans/batch.pdf",
                "2,7",
                "--",
                "/scans/batch-data/done/doc.pdf"
            ]
        );
    }

    #[test]
    fn test_ocrmypdf_args_use_language() {
        let info = info_in(Path::new("/scans/batch-data"), "doc", &[1]);
        let plan = ExportPlan::from_info(&info, &ExportConfig::default()).unwrap();
        let args = plan.ocrmypdf_args("eng+por");

        let lang = args.iter().position(|a| a == "-l").unwrap();
        assert_eq!(args[lang + 1], "eng+por");
        assert_eq!(args[args.len() - 1], args[args.len() - 2]);
        assert!(args.contains(&"pdfa-2".to_string()));
    }

    #[test]
    fn test_plan_rejects_names_escaping_done_directory() {
        for name in ["../../victim", "sub/doc", "..", "a\\b"] {
            let info = info_in(Path::new("/scans/batch-data"), name, &[1]);
            assert!(matches!(
                ExportPlan::from_info(&info, &ExportConfig::default()),
                Err(ExportError::InvalidFileName(_))
            ));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_invalid_name_leaves_files_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let victim = temp_dir.path().join("victim.pdf");
        std::fs::write(&victim, b"keep").unwrap();
        let info = info_in(&temp_dir.path().join("batch-data"), "../../victim", &[1]);
        let exporter = Exporter::new(ExportConfig {
            qpdf_path: "true".into(),
            ocrmypdf_path: "true".into(),
            ..Default::default()
        });

        let err = exporter.export(&info).await.unwrap_err();
        assert!(matches!(err, ExportError::InvalidFileName(_)));
        assert_eq!(std::fs::read(&victim).unwrap(), b"keep");
    }

    #[test]
    fn test_plan_requires_json_path() {
        let info = DocumentInfo {
            file_name: "doc".into(),
            pages_paths: vec!["page-1.webp".into()],
            ..Default::default()
        };
        assert!(matches!(
            ExportPlan::from_info(&info, &ExportConfig::default()),
            Err(ExportError::MissingJsonPath)
        ));
    }

    #[tokio::test]
    async fn test_disabled_export() {
        let exporter = Exporter::new(ExportConfig {
            enabled: false,
            ..Default::default()
        });
        let info = info_in(Path::new("/scans/batch-data"), "doc", &[1]);
        assert!(matches!(
            exporter.export(&info).await,
            Err(ExportError::Disabled)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_replaces_previous_export() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("batch-data");
        let info = info_in(&data_dir, "doc", &[1]);
        let exporter = Exporter::new(ExportConfig {
            qpdf_path: "true".into(),
            ocrmypdf_path: "true".into(),
            ..Default::default()
        });
        let plan = exporter.plan(&info).unwrap();
        std::fs::create_dir_all(&plan.done_directory).unwrap();
        std::fs::write(&plan.output, b"stale").unwrap();

        exporter.run(&plan).await.unwrap();
        assert!(plan.done_directory.is_dir());
        assert!(!plan.output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_tool_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let info = info_in(&temp_dir.path().join("batch-data"), "doc", &[1]);
        let exporter = Exporter::new(ExportConfig {
            qpdf_path: "false".into(),
            ..Default::default()
        });

        let err = exporter.export(&info).await.unwrap_err();
        assert!(matches!(err, ExportError::ToolFailed { ref tool, .. } if tool == "false"));
    }

    #[tokio::test]
    async fn test_missing_tool_is_spawn_error() {
        let temp_dir = TempDir::new().unwrap();
        let info = info_in(&temp_dir.path().join("batch-data"), "doc", &[1]);
        let exporter = Exporter::new(ExportConfig {
            qpdf_path: temp_dir
                .path()
                .join("no-such-qpdf")
                .to_string_lossy()
                .into_owned(),
            ..Default::default()
        });

        let err = exporter.export(&info).await.unwrap_err();
        assert!(matches!(err, ExportError::Spawn { .. }));
    }
}
