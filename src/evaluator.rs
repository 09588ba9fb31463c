//! Evaluation run: pair files, score the corpus and each unit, aggregate.

use crate::aggregate::{UnitScore, aggregate_by_document};
use crate::config::Config;
use crate::error::{EvalError, Result};
use crate::metrics::{score_corpus, score_units};
use crate::pairing::resolve_units;
use crate::persistence::EvaluationReport;

/// Scores one model's output in one data directory.
pub struct Evaluator {
    config: Config,
}

impl Evaluator {
    /// Create a new evaluator.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration this evaluator runs with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a full evaluation.
    ///
    /// Fails fast on a missing ground-truth or OCR file. Blank ground truth
    /// is skipped and listed in [`EvaluationReport::skipped`].
    pub fn run(&self) -> Result<EvaluationReport> {
        self.config.validate()?;
        let eval = &self.config.evaluation;

        let resolution = resolve_units(eval)?;
        if resolution.units.is_empty() {
            return Err(EvalError::EmptyCorpus(eval.data_dir.clone()));
        }

        let crops = resolution.units.iter().filter(|u| u.is_crop()).count();
        log::info!(
            "Scoring {} units ({} crops) for model '{}' ({} skipped)",
            resolution.units.len(),
            crops,
            eval.model_name,
            resolution.skipped.len()
        );

        let corpus = score_corpus(&resolution.units);
        let units: Vec<UnitScore> = resolution
            .units
            .iter()
            .zip(score_units(&resolution.units))
            .map(|(unit, metrics)| UnitScore {
                unit_id: unit.unit_id.clone(),
                parent_document_id: unit.parent_document_id.clone(),
                metrics,
            })
            .collect();
        let documents = aggregate_by_document(&units);

        Ok(EvaluationReport {
            model_name: eval.model_name.clone(),
            data_dir: eval.data_dir.clone(),
            corpus,
            units,
            documents,
            skipped: resolution.skipped,
        })
    }
}
