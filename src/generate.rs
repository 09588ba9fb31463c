//! Evaluation-data generation through an external OCR engine.
//!
//! Produces the `<stem>.<model>.txt` files the evaluator consumes, and
//! drafts `<stem>.gt.txt` files for freshly cropped segments so they can be
//! corrected by hand. Files that already exist are never overwritten.
//!
//! The text detector that cuts pages into crops names every crop after
//! itself; [`adopt_crops`] renames them after the page they came from.

use crate::config::Config;
use crate::error::{EvalError, Result};
use crate::pairing::discover_images;
use crate::progress::ProgressReporter;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

/// Prefix the text detector gives the crops it saves.
pub const DETECTOR_CROP_PREFIX: &str = "mg";

/// Something that turns an image into text.
pub trait OcrEngine {
    /// Recognize `image` with language model `lang` and page segmentation mode `psm`.
    fn recognize(&self, image: &Path, lang: &str, psm: u8) -> Result<String>;
}

/// Runs the `tesseract` command line tool.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ocr.tesseract_bin.clone())
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &Path, lang: &str, psm: u8) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg(image)
            .arg("stdout")
            .args(["-l", lang, "--psm", &psm.to_string()])
            .output()
            .map_err(|e| {
                EvalError::Ocr(format!("failed to run '{}': {}", self.binary.display(), e))
            })?;

        if !output.status.success() {
            return Err(EvalError::Ocr(format!(
                "'{}' exited with {} on '{}': {}",
                self.binary.display(),
                output.status,
                image.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Counts of files touched by a generation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Files newly written.
    pub written: usize,
    /// Files left alone because they already existed.
    pub existing: usize,
}

/// Write OCR output for every image that does not have one yet.
pub fn generate_hypotheses(
    config: &Config,
    engine: &dyn OcrEngine,
    progress: &mut ProgressReporter,
) -> Result<GenerationSummary> {
    let eval = &config.evaluation;
    run_pass(
        config,
        progress,
        "OCR output",
        |image| eval.hypothesis_path(image),
        |image| engine.recognize(image, &eval.model_name, config.ocr.hypothesis_psm),
    )
}

/// Draft ground truth for every image that does not have one yet.
///
/// Empty recognitions are written as `"."` so the file never reads as blank.
pub fn draft_ground_truth(
    config: &Config,
    engine: &dyn OcrEngine,
    progress: &mut ProgressReporter,
) -> Result<GenerationSummary> {
    let eval = &config.evaluation;
    run_pass(
        config,
        progress,
        "Ground truth",
        |image| eval.reference_path(image),
        |image| {
            let text = engine.recognize(
                image,
                &config.ocr.ground_truth_lang,
                config.ocr.ground_truth_psm,
            )?;
            Ok(if text.is_empty() { ".".to_string() } else { text })
        },
    )
}

fn run_pass(
    config: &Config,
    progress: &mut ProgressReporter,
    label: &str,
    target: impl Fn(&Path) -> PathBuf,
    recognize: impl Fn(&Path) -> Result<String>,
) -> Result<GenerationSummary> {
    let images = discover_images(&config.evaluation)?;
    let mut summary = GenerationSummary::default();

    progress.start(images.len() as u64, label);
    for image in &images {
        let out = target(image);
        if out.exists() {
            log::debug!("{} exists, skipping", out.display());
            summary.existing += 1;
        } else {
            let text = recognize(image)?;
            fs::write(&out, text).map_err(|e| EvalError::io(&out, e))?;
            summary.written += 1;
        }

        let name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        progress.advance(&name);
    }
    progress.finish();

    log::info!(
        "{}: wrote {} file(s), kept {} existing",
        label,
        summary.written,
        summary.existing
    );
    Ok(summary)
}

/// Rename detector crops `<detector_prefix><sep><rest>` in the data
/// directory to `<base><sep><rest>`.
///
/// A file already carrying the new name is replaced. Returns the number of
/// renamed files.
pub fn adopt_crops(config: &Config, detector_prefix: &str, base: &str) -> Result<usize> {
    let eval = &config.evaluation;
    let dir = &eval.data_dir;
    if !dir.is_dir() {
        return Err(EvalError::DataDirNotFound(dir.clone()));
    }
    if base.is_empty() || eval.crop_separator.is_empty() {
        return Err(EvalError::Config(
            "adopting crops needs a page name and a crop separator".to_string(),
        ));
    }

    let from = format!("{}{}", detector_prefix, eval.crop_separator);
    let to = format!("{}{}", base, eval.crop_separator);
    if from == to {
        return Ok(0);
    }

    let mut renames: Vec<(PathBuf, PathBuf)> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.clone());
            EvalError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(rest) = entry.file_name().to_str().and_then(|n| n.strip_prefix(&from)) else {
            continue;
        };
        let target = dir.join(format!("{}{}", to, rest));
        renames.push((entry.into_path(), target));
    }

    for (old, new) in &renames {
        if new.exists() {
            fs::remove_file(new).map_err(|e| EvalError::io(new, e))?;
        }
        fs::rename(old, new).map_err(|e| EvalError::io(old, e))?;
        log::debug!("Renamed {} -> {}", old.display(), new.display());
    }

    log::info!("Adopted {} crop(s) as '{}'", renames.len(), base);
    Ok(renames.len())
}
