//! Evaluation of a run against qrels: precision pass, recall pass, report.

pub mod precision;
pub mod recall;
pub mod report;

pub use precision::{precision_pass, PrecisionError, PrecisionReason, PrecisionReport};
pub use recall::{recall_pass, RecallError, RecallReport};
pub use report::write_report;

use crate::annotate::Annotator;
use crate::config::Config;
use crate::error::{Result, TellmeError};
use crate::input::TrecFile;
use crate::matcher::{build_matcher, MatchMode};
use crate::record::NumericPolicy;
use std::io::Write;
use std::path::Path;

/// Line counts of one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Every line of the input, whatever happened to it
    pub lines_read: usize,
    /// Records that passed the threshold and were looked up
    pub evaluated: usize,
    pub below_threshold: usize,
    pub malformed: usize,
    pub non_numeric: usize,
}

impl PassSummary {
    pub fn skipped(&self) -> usize {
        self.malformed + self.non_numeric
    }

    fn record_skip(&mut self, err: &TellmeError) {
        match err {
            TellmeError::NumericFormat { .. } => self.non_numeric += 1,
            _ => self.malformed += 1,
        }
    }
}

/// Knobs shared by both passes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalSettings {
    pub rank_threshold: f64,
    pub relevance_threshold: i32,
    pub match_mode: MatchMode,
    pub numeric_policy: NumericPolicy,
    pub verbose: bool,
}

impl Default for EvalSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for EvalSettings {
    fn from(config: &Config) -> Self {
        Self {
            rank_threshold: config.thresholds.rank,
            relevance_threshold: config.thresholds.relevance,
            match_mode: config.matching.mode,
            numeric_policy: config.parsing.numeric_policy,
            verbose: config.verbose.enabled,
        }
    }
}

/// Result of both passes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub precision: PrecisionReport,
    pub recall: RecallReport,
}

impl Evaluation {
    pub fn error_count(&self) -> usize {
        self.precision.errors.len() + self.recall.errors.len()
    }
}

/// Run both passes over already loaded files.
pub fn evaluate(run: &TrecFile, qrels: &TrecFile, settings: &EvalSettings) -> Evaluation {
    let matcher = build_matcher(settings.match_mode, run, qrels, settings.numeric_policy);
    let precision = precision_pass(
        run,
        matcher.as_ref(),
        settings.rank_threshold,
        settings.numeric_policy,
    );
    let recall = recall_pass(
        qrels,
        matcher.as_ref(),
        settings.relevance_threshold,
        settings.numeric_policy,
    );
    Evaluation { precision, recall }
}

/// Load the inputs named on the command line, evaluate, and write the report.
///
/// Missing run, qrels or query files abort with `FileOpen`. Problems with
/// individual records or collection documents only show up in the report.
pub fn run_evaluation<W: Write>(
    config: &Config,
    run_path: &Path,
    qrels_path: &Path,
    out: &mut W,
) -> Result<Evaluation> {
    let settings = EvalSettings::from(config);
    let limits = config.line_limits();

    let run = TrecFile::open(run_path, &limits)?;
    let qrels = TrecFile::open(qrels_path, &limits)?;
    log::info!(
        "Loaded {} run lines from {} and {} qrels lines from {}",
        run.len(),
        run.path().display(),
        qrels.len(),
        qrels.path().display()
    );
    let mut annotator = if settings.verbose {
        Some(Annotator::from_config(config)?)
    } else {
        None
    };

    let evaluation = evaluate(&run, &qrels, &settings);
    write_report(out, config, &evaluation, annotator.as_mut())?;
    Ok(evaluation)
}
