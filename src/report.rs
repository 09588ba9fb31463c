//! Text rendering of evaluation results.
//!
//! Functions here only build strings; writing them anywhere is up to the caller.

use crate::aggregate::DocumentTable;
use crate::metrics::{CorpusMetrics, PerUnitMetrics};
use crate::unit::SkippedUnit;

/// Render corpus-level metrics for one model.
pub fn render_corpus_report(metrics: &CorpusMetrics, model_name: &str) -> String {
    let mut out = format!(
        "Character-level metrics for OCR model '{}' ({} units)\n",
        model_name, metrics.units
    );
    out.push_str(&format!(
        "  Character Error Rate (CER):        {:.2}%\n\n",
        metrics.character_error_rate
    ));

    out.push_str(&format!("Word-level metrics for OCR model '{}'\n", model_name));
    let rows = [
        ("Word Error Rate (WER):", metrics.word_error_rate),
        ("Match Error Rate (MER):", metrics.match_error_rate),
        ("Word Information Lost (WIL):", metrics.word_information_lost),
        ("Word Information Preserved (WIP):", metrics.word_information_preserved),
    ];
    for (label, value) in rows {
        out.push_str(&format!("  {:<34} {:.2}%\n", label, value));
    }

    out
}

/// Render one row per document with the mean of each metric.
///
/// Rows are sorted by document id.
pub fn render_document_report(table: &DocumentTable) -> String {
    let id_width = table
        .rows
        .iter()
        .map(|r| r.parent_document_id.chars().count())
        .max()
        .unwrap_or(0)
        .max("document".len());

    let mut out = format!("{:<width$}  {:>5}", "document", "units", width = id_width);
    for name in PerUnitMetrics::NAMES {
        out.push_str(&format!("  {:>8}", name));
    }
    out.push('\n');
    out.push_str(&"─".repeat(id_width + 7 + 10 * PerUnitMetrics::NAMES.len()));
    out.push('\n');

    for row in table.sorted_by_document() {
        out.push_str(&format!(
            "{:<width$}  {:>5}",
            row.parent_document_id,
            row.unit_count,
            width = id_width
        ));
        for value in row.metrics.values() {
            out.push_str(&format!("  {:>8.4}", value));
        }
        out.push('\n');
    }

    out
}

/// Render the list of units excluded from scoring.
pub fn render_skipped(skipped: &[SkippedUnit]) -> String {
    if skipped.is_empty() {
        return String::new();
    }

    let mut out = format!("Skipped {} unit(s):\n", skipped.len());
    for unit in skipped {
        out.push_str(&format!(
            "  {} ({}): {}\n",
            unit.unit_id,
            unit.reference_path.display(),
            unit.reason
        ));
    }
    out
}
