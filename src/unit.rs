//! Evaluation units: one ground-truth/OCR text pair per image or crop.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One scored (reference, hypothesis) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationUnit {
    /// Stable identifier, the image file stem.
    pub unit_id: String,
    /// Id of the unsegmented image this unit was cropped from.
    pub parent_document_id: String,
    /// Image the unit was discovered from.
    pub image_path: PathBuf,
    /// Ground-truth transcription, always containing a non-whitespace token.
    pub reference_text: String,
    /// OCR output, possibly empty.
    pub hypothesis_text: String,
}

impl EvaluationUnit {
    /// Create a unit, or `None` when the reference has nothing to score.
    pub fn new(
        unit_id: impl Into<String>,
        crop_separator: &str,
        image_path: impl Into<PathBuf>,
        reference_text: String,
        hypothesis_text: String,
    ) -> Option<Self> {
        if !has_tokens(&reference_text) {
            return None;
        }

        let unit_id = unit_id.into();
        let parent_document_id = parent_document_id(&unit_id, crop_separator).to_string();

        Some(Self {
            unit_id,
            parent_document_id,
            image_path: image_path.into(),
            reference_text,
            hypothesis_text,
        })
    }

    /// Whether this unit is a crop of a larger document.
    pub fn is_crop(&self) -> bool {
        self.parent_document_id != self.unit_id
    }
}

/// A discovered unit excluded from metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedUnit {
    pub unit_id: String,
    /// Absolute path of the offending ground-truth file.
    pub reference_path: PathBuf,
    pub reason: String,
}

/// Prefix of `unit_id` before the first `separator`, or the whole id.
pub fn parent_document_id<'a>(unit_id: &'a str, separator: &str) -> &'a str {
    if separator.is_empty() {
        return unit_id;
    }
    unit_id
        .split_once(separator)
        .map(|(parent, _)| parent)
        .unwrap_or(unit_id)
}

/// True when the text contains at least one non-whitespace character.
pub fn has_tokens(text: &str) -> bool {
    text.split_whitespace().next().is_some()
}
