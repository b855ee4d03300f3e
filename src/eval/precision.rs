//! Precision pass: documents the run ranks highly that qrels does not
//! consider relevant.

use super::PassSummary;
use crate::input::TrecFile;
use crate::matcher::CrossMatcher;
use crate::record::{parse_run_line, NumericPolicy, RunRecord};
use std::fmt;

/// Why a retrieved document counts as a precision error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecisionReason {
    /// The pair has no judgment at all
    NotInQrels,
    /// The pair is judged with this relevance (always 0)
    NonRelevant(i32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrecisionError {
    pub record: RunRecord,
    pub reason: PrecisionReason,
}

impl fmt::Display for PrecisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Document {} NOT relevant for query {}!! ",
            self.record.document_id, self.record.query_id
        )?;
        match self.reason {
            PrecisionReason::NotInQrels => write!(f, "(not in qrels)"),
            PrecisionReason::NonRelevant(rel) => write!(f, "(rel. {})", rel),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrecisionReport {
    pub errors: Vec<PrecisionError>,
    pub summary: PassSummary,
}

/// Check every run record scoring at least `rank_threshold` against qrels.
pub fn precision_pass(
    run: &TrecFile,
    matcher: &dyn CrossMatcher,
    rank_threshold: f64,
    policy: NumericPolicy,
) -> PrecisionReport {
    let mut report = PrecisionReport::default();

    for (idx, line) in run.lines().iter().enumerate() {
        report.summary.lines_read += 1;

        let record = match parse_run_line(line, policy) {
            Ok(record) => record,
            Err(e) => {
                log::debug!("Skipping run line {}: {}", idx + 1, e);
                report.summary.record_skip(&e);
                continue;
            }
        };

        if record.rank_score < rank_threshold {
            report.summary.below_threshold += 1;
            continue;
        }
        report.summary.evaluated += 1;

        let reason = match matcher.qrels_relevance(&record.query_id, &record.document_id) {
            None => PrecisionReason::NotInQrels,
            Some(0) => PrecisionReason::NonRelevant(0),
            Some(_) => continue,
        };
        report.errors.push(PrecisionError { record, reason });
    }

    log::info!(
        "Precision pass: {} lines, {} evaluated, {} errors",
        report.summary.lines_read,
        report.summary.evaluated,
        report.errors.len()
    );
    report
}
