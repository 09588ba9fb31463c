//! Persistence layer for evaluation reports.
//!
//! JSON keeps the full report and can be loaded back. CSV exports only the
//! per-document table, for spreadsheets.

use crate::aggregate::{DocumentTable, UnitScore};
use crate::error::{EvalError, Result};
use crate::metrics::{CorpusMetrics, PerUnitMetrics};
use crate::unit::SkippedUnit;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything produced by one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub model_name: String,
    pub data_dir: PathBuf,
    pub corpus: CorpusMetrics,
    pub units: Vec<UnitScore>,
    pub documents: DocumentTable,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedUnit>,
}

/// Save format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// Full report as JSON.
    Json,
    /// Per-document table as CSV.
    Csv,
}

impl SaveFormat {
    /// Determine format from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => SaveFormat::Csv,
            _ => SaveFormat::Json,
        }
    }
}

/// Save a report, picking the format from the file extension.
pub fn save_report(report: &EvaluationReport, path: &Path) -> Result<()> {
    let format = SaveFormat::from_path(path);
    save_report_with_format(report, path, format)
}

/// Save a report with specific format.
pub fn save_report_with_format(
    report: &EvaluationReport,
    path: &Path,
    format: SaveFormat,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| EvalError::io(parent, e))?;
        }
    }

    let data = match format {
        SaveFormat::Json => serde_json::to_string_pretty(report)?.into_bytes(),
        SaveFormat::Csv => documents_to_csv(&report.documents)?,
    };

    fs::write(path, &data).map_err(|e| EvalError::io(path, e))?;
    log::info!("Report saved to {}", path.display());

    Ok(())
}

/// Serialize the per-document table as CSV.
pub fn documents_to_csv(table: &DocumentTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["parent_document_id", "units"];
    header.extend(PerUnitMetrics::NAMES);
    writer.write_record(&header)?;

    for row in table.sorted_by_document() {
        let mut record = vec![row.parent_document_id.clone(), row.unit_count.to_string()];
        record.extend(row.metrics.values().iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| EvalError::Serialization(e.to_string()))
}

/// Load a JSON report.
pub fn load_report(path: &Path) -> Result<EvaluationReport> {
    if SaveFormat::from_path(path) == SaveFormat::Csv {
        return Err(EvalError::Serialization(format!(
            "'{}' is a CSV export; only JSON reports can be loaded",
            path.display()
        )));
    }

    let content = fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_by_document;
    use crate::metrics::EditCounts;
    use tempfile::TempDir;

    fn create_test_report() -> EvaluationReport {
        let units = vec![
            UnitScore {
                unit_id: "page1_crop_0".into(),
                parent_document_id: "page1".into(),
                metrics: PerUnitMetrics::from_values([0.25, 0.5, 0.5, 0.75, 0.25]),
            },
            UnitScore {
                unit_id: "page1_crop_1".into(),
                parent_document_id: "page1".into(),
                metrics: PerUnitMetrics::from_values([0.75, 0.5, 0.5, 0.25, 0.75]),
            },
        ];
        let documents = aggregate_by_document(&units);

        EvaluationReport {
            model_name: "por_ft".into(),
            data_dir: PathBuf::from("data"),
            corpus: CorpusMetrics {
                character_error_rate: 18.0,
                word_error_rate: 50.0,
                match_error_rate: 50.0,
                word_information_lost: 50.0,
                word_information_preserved: 50.0,
                units: 2,
                characters: EditCounts::default(),
                words: EditCounts::default(),
            },
            units,
            documents,
            skipped: vec![SkippedUnit {
                unit_id: "page2".into(),
                reference_path: PathBuf::from("/data/page2.gt.txt"),
                reason: "blank".into(),
            }],
        }
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/report.json");

        let original = create_test_report();
        save_report(&original, &path).unwrap();

        let loaded = load_report(&path).unwrap();
        assert_eq!(loaded.model_name, "por_ft");
        assert_eq!(loaded.corpus, original.corpus);
        assert_eq!(loaded.units.len(), 2);
        assert_eq!(loaded.documents, original.documents);
        assert_eq!(loaded.skipped, original.skipped);
    }

    #[test]
    fn test_save_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("documents.csv");

        save_report(&create_test_report(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "parent_document_id,units,cer,wer,mer,wil,wip");
        assert_eq!(lines[1], "page1,2,0.5,0.5,0.5,0.5,0.5");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(SaveFormat::from_path(Path::new("r.json")), SaveFormat::Json);
        assert_eq!(SaveFormat::from_path(Path::new("r.CSV")), SaveFormat::Csv);
        assert_eq!(SaveFormat::from_path(Path::new("r")), SaveFormat::Json);
    }

    #[test]
    fn test_load_csv_is_rejected() {
        assert!(load_report(Path::new("documents.csv")).is_err());
    }

    #[test]
    fn test_load_nonexistent() {
        let result = load_report(Path::new("/nonexistent/report.json"));
        assert!(matches!(result, Err(EvalError::Io { .. })));
    }
}
