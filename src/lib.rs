//! OCR evaluation harness.
//!
//! Scores the text an OCR model produced for a set of images against
//! hand-checked ground truth, at character level (CER) and word level
//! (WER, MER, WIL, WIP), for the whole corpus and per source document.
//!
//! # Overview
//!
//! A data directory holds, for every image `<stem>.<ext>`:
//! 1. the ground truth `<stem>.gt.txt`
//! 2. the model output `<stem>.<model>.txt`
//!
//! Images cropped from a larger page are named `<page>_crop_<n>.<ext>` and
//! are averaged back into one row per page.
//!
//! # Quick Start
//!
//! ```no_run
//! use ocr_eval::{
//!     config::Config,
//!     evaluator::Evaluator,
//!     report::{render_corpus_report, render_document_report},
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::for_model("data/segments", "por_ft");
//!     let report = Evaluator::new(config).run()?;
//!
//!     print!("{}", render_corpus_report(&report.corpus, &report.model_name));
//!     print!("{}", render_document_report(&report.documents));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **pairing**: discovers images and reads their text pairs
//! - **metrics**: alignment-based error rates, corpus and per unit
//! - **aggregate**: per-document means
//! - **report**: text rendering
//! - **persistence**: JSON/CSV export
//! - **generate**: drives an external OCR engine to produce the text files

pub mod aggregate;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod generate;
pub mod metrics;
pub mod pairing;
pub mod persistence;
pub mod progress;
pub mod report;
pub mod unit;

// Re-export commonly used types
pub use aggregate::{DocumentAggregate, DocumentTable, UnitScore, aggregate_by_document};
pub use config::Config;
pub use error::{EvalError, Result};
pub use evaluator::Evaluator;
pub use metrics::{CorpusMetrics, PerUnitMetrics, score_corpus, score_unit};
pub use pairing::{Resolution, resolve_units};
pub use persistence::{EvaluationReport, load_report, save_report};
pub use unit::{EvaluationUnit, SkippedUnit};
