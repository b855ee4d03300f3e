//! Recall pass: documents qrels judges relevant that the run never retrieved.

use super::PassSummary;
use crate::input::TrecFile;
use crate::matcher::CrossMatcher;
use crate::record::{parse_qrels_line, NumericPolicy, QrelsRecord};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecallError {
    pub record: QrelsRecord,
}

impl fmt::Display for RecallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Document {} relevant ({}) for {} NOT included!",
            self.record.document_id, self.record.relevance, self.record.query_id
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecallReport {
    pub errors: Vec<RecallError>,
    pub summary: PassSummary,
}

/// Check every judgment with relevance at least `relevance_threshold` against the run.
pub fn recall_pass(
    qrels: &TrecFile,
    matcher: &dyn CrossMatcher,
    relevance_threshold: i32,
    policy: NumericPolicy,
) -> RecallReport {
    let mut report = RecallReport::default();

    for (idx, line) in qrels.lines().iter().enumerate() {
        report.summary.lines_read += 1;

        let record = match parse_qrels_line(line, policy) {
            Ok(record) => record,
            Err(e) => {
                log::debug!("Skipping qrels line {}: {}", idx + 1, e);
                report.summary.record_skip(&e);
                continue;
            }
        };

        if record.relevance < relevance_threshold {
            report.summary.below_threshold += 1;
            continue;
        }
        report.summary.evaluated += 1;

        if !matcher.run_contains(&record.query_id, &record.document_id) {
            report.errors.push(RecallError { record });
        }
    }

    log::info!(
        "Recall pass: {} lines, {} evaluated, {} errors",
        report.summary.lines_read,
        report.summary.evaluated,
        report.errors.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::LineLimits;
    use crate::matcher::{ExactMatcher, SubstringMatcher};

    fn file(text: &str) -> TrecFile {
        TrecFile::from_text(text, &LineLimits::default()).unwrap()
    }

    fn exact_pass(run: &str, qrels: &str, threshold: i32) -> RecallReport {
        let run = file(run);
        let qrels = file(qrels);
        let matcher = ExactMatcher::build(&run, &qrels, NumericPolicy::Strict);
        recall_pass(&qrels, &matcher, threshold, NumericPolicy::Strict)
    }

    #[test]
    fn test_relevant_not_included() {
        let report = exact_pass("q1 Q0 doc2 1 9.5 tag\n", "q1 0 doc1 2\n", 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].to_string(),
            "Document doc1 relevant (2) for q1 NOT included!"
        );
    }

    #[test]
    fn test_included_pair_not_reported() {
        let report = exact_pass("q1 Q0 doc1 1 3.0 tag\n", "q1 0 doc1 1\n", 1);
        assert!(report.errors.is_empty());
        assert_eq!(report.summary.evaluated, 1);
    }

    #[test]
    fn test_below_threshold_not_evaluated() {
        let report = exact_pass("", "q1 0 doc1 0\nq1 0 doc2 1\nq1 0 doc3 2\n", 2);
        assert_eq!(report.summary.lines_read, 3);
        assert_eq!(report.summary.below_threshold, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].record.document_id, "doc3");
    }

    #[test]
    fn test_run_score_does_not_matter() {
        // Recall only asks whether the pair was retrieved at all
        let report = exact_pass("q1 Q0 doc1 1 0.1 tag\n", "q1 0 doc1 1\n", 1);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_prefix_collision_hides_error_in_substring_mode() {
        let run = file("q1 Q0 doc10 1 9.5 tag\n");
        let qrels = file("q1 0 doc1 1\n");

        let substring = SubstringMatcher::new(&run, &qrels);
        let report = recall_pass(&qrels, &substring, 1, NumericPolicy::Strict);
        assert!(report.errors.is_empty());

        let exact = ExactMatcher::build(&run, &qrels, NumericPolicy::Strict);
        let report = recall_pass(&qrels, &exact, 1, NumericPolicy::Strict);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_malformed_qrels_lines_counted() {
        let report = exact_pass("", "q1 0 doc1\nq1 0 doc2 x\n", 1);
        assert_eq!(report.summary.lines_read, 2);
        assert_eq!(report.summary.malformed, 1);
        assert_eq!(report.summary.non_numeric, 1);
        assert_eq!(report.summary.evaluated, 0);
    }
}
