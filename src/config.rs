//! Configuration for the evaluation harness.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Where evaluation data lives and how its files are named.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Directory holding images, ground-truth and OCR output files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// OCR model name; OCR output files are named `<stem>.<model_name>.txt`.
    #[serde(default)]
    pub model_name: String,

    /// Image extensions (without dot) that define the evaluation units.
    #[serde(default = "default_accepted_extensions")]
    pub accepted_extensions: Vec<String>,

    /// Token separating a parent document id from a crop index.
    #[serde(default = "default_crop_separator")]
    pub crop_separator: String,

    /// Ground-truth files are named `<stem>.<reference_suffix>.txt`.
    #[serde(default = "default_reference_suffix")]
    pub reference_suffix: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_accepted_extensions() -> Vec<String> {
    vec!["jpg".to_string(), "png".to_string(), "tif".to_string()]
}

fn default_crop_separator() -> String {
    "_crop_".to_string()
}

fn default_reference_suffix() -> String {
    "gt".to_string()
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            model_name: String::new(),
            accepted_extensions: default_accepted_extensions(),
            crop_separator: default_crop_separator(),
            reference_suffix: default_reference_suffix(),
        }
    }
}

impl EvaluationConfig {
    /// Ground-truth path for an image.
    pub fn reference_path(&self, image: &Path) -> PathBuf {
        image.with_extension(format!("{}.txt", self.reference_suffix))
    }

    /// OCR output path for an image.
    pub fn hypothesis_path(&self, image: &Path) -> PathBuf {
        image.with_extension(format!("{}.txt", self.model_name))
    }
}

/// Settings for the external recognizer used to generate evaluation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Tesseract executable.
    #[serde(default = "default_tesseract_bin")]
    pub tesseract_bin: PathBuf,

    /// Page segmentation mode used for OCR output files.
    #[serde(default = "default_hypothesis_psm")]
    pub hypothesis_psm: u8,

    /// Page segmentation mode used when drafting ground truth for segments.
    #[serde(default = "default_ground_truth_psm")]
    pub ground_truth_psm: u8,

    /// Language model used when drafting ground truth.
    #[serde(default = "default_ground_truth_lang")]
    pub ground_truth_lang: String,
}

fn default_tesseract_bin() -> PathBuf {
    PathBuf::from("tesseract")
}

fn default_hypothesis_psm() -> u8 {
    6
}

fn default_ground_truth_psm() -> u8 {
    7
}

fn default_ground_truth_lang() -> String {
    "por".to_string()
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_bin: default_tesseract_bin(),
            hypothesis_psm: default_hypothesis_psm(),
            ground_truth_psm: default_ground_truth_psm(),
            ground_truth_lang: default_ground_truth_lang(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Evaluation data layout
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// External recognizer settings
    #[serde(default)]
    pub ocr: OcrConfig,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (OCR_EVAL_DATA_DIR, OCR_EVAL_MODEL, ...)
    /// 2. Config file (~/.config/ocr-eval/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;

        serde_yaml::from_str(&content)
            .map_err(|e| EvalError::Config(format!("Failed to parse config file: {}", e)))
    }

    fn apply_env(&mut self) {
        if let Ok(data_dir) = env::var("OCR_EVAL_DATA_DIR") {
            self.evaluation.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(model) = env::var("OCR_EVAL_MODEL") {
            self.evaluation.model_name = model;
        }

        if let Ok(extensions) = env::var("OCR_EVAL_EXTENSIONS") {
            self.evaluation.accepted_extensions = parse_extension_list(&extensions);
        }

        if let Ok(separator) = env::var("OCR_EVAL_CROP_SEPARATOR") {
            self.evaluation.crop_separator = separator;
        }

        if let Ok(bin) = env::var("TESSERACT_BIN") {
            self.ocr.tesseract_bin = PathBuf::from(bin);
        }
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "ocr-eval")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<()> {
        let eval = &self.evaluation;

        if eval.model_name.trim().is_empty() {
            return Err(EvalError::Config(
                "Model name is required. Pass --model, set OCR_EVAL_MODEL or add to config file."
                    .to_string(),
            ));
        }

        if eval.data_dir.as_os_str().is_empty() {
            return Err(EvalError::Config("Data directory is required.".to_string()));
        }

        if eval.accepted_extensions.is_empty() {
            return Err(EvalError::Config(
                "At least one accepted image extension is required.".to_string(),
            ));
        }

        if let Some(ext) = eval
            .accepted_extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(EvalError::Config(format!(
                "Invalid image extension '{}': use the bare extension, e.g. 'png'",
                ext
            )));
        }

        if eval.crop_separator.is_empty() {
            return Err(EvalError::Config(
                "Crop separator must not be empty.".to_string(),
            ));
        }

        if eval.reference_suffix.is_empty() || eval.reference_suffix == eval.model_name {
            return Err(EvalError::Config(format!(
                "Reference suffix '{}' must be non-empty and differ from the model name",
                eval.reference_suffix
            )));
        }

        Ok(())
    }

    /// Create a config for one model and data directory (useful for testing).
    pub fn for_model(data_dir: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self {
            evaluation: EvaluationConfig {
                data_dir: data_dir.into(),
                model_name: model_name.into(),
                ..Default::default()
            },
            ocr: OcrConfig::default(),
        }
    }
}

/// Split a comma separated extension list, dropping blanks and leading dots.
pub fn parse_extension_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|e| e.trim().trim_start_matches('.'))
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}
