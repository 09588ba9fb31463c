//! OCR evaluation CLI
//!
//! Scores OCR model output against ground truth and generates the text
//! files an evaluation needs.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ocr_eval::{
    EvalError,
    config::{Config, parse_extension_list},
    evaluator::Evaluator,
    generate::{
        DETECTOR_CROP_PREFIX, TesseractCli, adopt_crops, draft_ground_truth, generate_hypotheses,
    },
    persistence::{load_report, save_report},
    progress::ProgressReporter,
    report::{render_corpus_report, render_document_report, render_skipped},
};
use std::path::PathBuf;
use std::time::Instant;

/// OCR evaluation harness - CER/WER/MER/WIL/WIP against ground truth
#[derive(Parser)]
#[command(name = "ocr-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Overrides for the data layout.
#[derive(Args)]
struct DataArgs {
    /// Directory with images, ground truth and OCR output
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// OCR model name (OCR output files are <stem>.<model>.txt)
    #[arg(short, long)]
    model: Option<String>,

    /// Comma separated image extensions, e.g. "jpg,png,tif"
    #[arg(long)]
    extensions: Option<String>,

    /// Token separating a page id from a crop index
    #[arg(long)]
    crop_separator: Option<String>,
}

impl DataArgs {
    fn apply(self, config: &mut Config) {
        if let Some(dir) = self.data_dir {
            config.evaluation.data_dir = dir;
        }
        if let Some(model) = self.model {
            config.evaluation.model_name = model;
        }
        if let Some(extensions) = self.extensions {
            config.evaluation.accepted_extensions = parse_extension_list(&extensions);
        }
        if let Some(separator) = self.crop_separator {
            config.evaluation.crop_separator = separator;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Score OCR output against ground truth
    Evaluate {
        #[command(flatten)]
        data: DataArgs,

        /// Also print the mean metrics of each source document
        #[arg(long)]
        per_document: bool,

        /// Save the report (.json for the full report, .csv for the document table)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Produce OCR output files (or ground-truth drafts) with tesseract
    Generate {
        #[command(flatten)]
        data: DataArgs,

        /// Draft <stem>.gt.txt files instead of OCR output
        #[arg(long)]
        ground_truth: bool,
    },

    /// Rename text-detector crops after the page they were cut from
    AdoptCrops {
        #[command(flatten)]
        data: DataArgs,

        /// Page name the crops belong to
        #[arg(long)]
        base: String,

        /// Name prefix the detector gave its crops
        #[arg(long, default_value = DETECTOR_CROP_PREFIX)]
        detector_prefix: String,
    },

    /// Display a saved JSON report
    Show {
        /// Path to the report file
        report: PathBuf,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Evaluate {
            data,
            per_document,
            output,
        } => cmd_evaluate(data, per_document, output),
        Commands::Generate { data, ground_truth } => cmd_generate(data, ground_truth, cli.quiet),
        Commands::AdoptCrops {
            data,
            base,
            detector_prefix,
        } => cmd_adopt_crops(data, &base, &detector_prefix),
        Commands::Show { report, json } => cmd_show(report, json),
        Commands::Config => cmd_config(),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(data: DataArgs) -> Result<Config> {
    let mut config = Config::load().context("Failed to load configuration")?;
    data.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn cmd_evaluate(data: DataArgs, per_document: bool, output: Option<PathBuf>) -> Result<()> {
    let evaluator = Evaluator::new(load_config(data)?);
    let eval = &evaluator.config().evaluation;

    println!(
        "Evaluating model '{}' in {}",
        eval.model_name,
        eval.data_dir.display()
    );
    let start = Instant::now();

    let report = match evaluator.run() {
        Ok(report) => report,
        Err(e) if e.is_missing_input() => {
            let command = match e {
                EvalError::MissingReference { .. } => "ocr-eval generate --ground-truth",
                _ => "ocr-eval generate",
            };
            anyhow::bail!("{}\nRun `{}` to create the missing files", e, command);
        }
        Err(e) => return Err(e).context("Evaluation failed"),
    };

    println!();
    print!("{}", render_corpus_report(&report.corpus, &report.model_name));

    if per_document {
        println!();
        print!("{}", render_document_report(&report.documents));
    }

    let skipped = render_skipped(&report.skipped);
    if !skipped.is_empty() {
        println!();
        print!("{}", skipped);
    }

    println!();
    println!(
        "Scored {} units from {} documents in {:.2?}",
        report.units.len(),
        report.documents.len(),
        start.elapsed()
    );

    if let Some(path) = output {
        save_report(&report, &path).context("Failed to save report")?;
        println!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn cmd_generate(data: DataArgs, ground_truth: bool, quiet: bool) -> Result<()> {
    let config = load_config(data)?;
    let engine = TesseractCli::from_config(&config);
    let mut progress = ProgressReporter::new(quiet);

    let summary = if ground_truth {
        draft_ground_truth(&config, &engine, &mut progress)
            .context("Failed to draft ground truth")?
    } else {
        generate_hypotheses(&config, &engine, &mut progress)
            .context("Failed to generate OCR output")?
    };

    println!(
        "Wrote {} file(s), kept {} existing",
        summary.written, summary.existing
    );

    Ok(())
}

fn cmd_adopt_crops(data: DataArgs, base: &str, detector_prefix: &str) -> Result<()> {
    let config = load_config(data)?;
    let renamed =
        adopt_crops(&config, detector_prefix, base).context("Failed to rename crops")?;
    println!("Renamed {} crop(s) to {}{}*", renamed, base, config.evaluation.crop_separator);
    Ok(())
}

fn cmd_show(report_path: PathBuf, json: bool) -> Result<()> {
    let report = load_report(&report_path).context("Failed to load report")?;

    if json {
        let json_str =
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json_str);
        return Ok(());
    }

    println!("Data directory: {}", report.data_dir.display());
    println!();
    print!("{}", render_corpus_report(&report.corpus, &report.model_name));
    println!();
    print!("{}", render_document_report(&report.documents));

    let skipped = render_skipped(&report.skipped);
    if !skipped.is_empty() {
        println!();
        print!("{}", skipped);
    }

    Ok(())
}

fn cmd_config() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    match Config::config_file_path() {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (no config directory on this platform)"),
    }
    println!("{}", "─".repeat(40));

    let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
    print!("{}", yaml);

    if let Err(e) = config.validate() {
        println!();
        println!("Configuration error: {}", e);
    }

    Ok(())
}
