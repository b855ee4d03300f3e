//! Cross-matching of (query, document) pairs between a run and its qrels.
//!
//! Two strategies are available:
//!
//! - [`SubstringMatcher`] reproduces the classic `tellme` lookup: a key string
//!   is built from the pair and searched for inside every raw line of the
//!   counterpart file. Prefix collisions (`doc1` inside `doc10`) match.
//! - [`ExactMatcher`] indexes both files once by tokenized `(query, document)`
//!   and matches fields exactly.

use crate::input::TrecFile;
use crate::record::{leading_int, parse_qrels_line, parse_run_line, NumericPolicy};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// Join key between run and qrels records
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub query_id: String,
    pub document_id: String,
}

impl MatchKey {
    pub fn new(query_id: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            document_id: document_id.into(),
        }
    }
}

/// Which lookup strategy to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Field-wise equality on query id and document id
    #[default]
    Exact,
    /// Substring containment of a constructed key in raw lines
    Substring,
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMode::Exact => write!(f, "exact"),
            MatchMode::Substring => write!(f, "substring"),
        }
    }
}

/// Lookup of a pair in the counterpart file
pub trait CrossMatcher {
    /// Relevance of the pair in qrels, or `None` when it is not judged.
    fn qrels_relevance(&self, query_id: &str, document_id: &str) -> Option<i32>;

    /// Whether the run retrieved the pair.
    fn run_contains(&self, query_id: &str, document_id: &str) -> bool;
}

/// Build the matcher for `mode` over the loaded files.
pub fn build_matcher<'a>(
    mode: MatchMode,
    run: &'a TrecFile,
    qrels: &'a TrecFile,
    policy: NumericPolicy,
) -> Box<dyn CrossMatcher + 'a> {
    match mode {
        MatchMode::Exact => Box::new(ExactMatcher::build(run, qrels, policy)),
        MatchMode::Substring => Box::new(SubstringMatcher::new(run, qrels)),
    }
}

/// Key searched for in qrels lines: `"<query> 0 <document> "`.
pub fn precision_key(query_id: &str, document_id: &str) -> String {
    format!("{} 0 {} ", query_id, document_id)
}

/// Key searched for in run lines: `"<query> Q0 <document>"`.
pub fn recall_key(query_id: &str, document_id: &str) -> String {
    format!("{} Q0 {}", query_id, document_id)
}

/// Linear substring scan over raw lines; every lookup starts at the first line.
pub struct SubstringMatcher<'a> {
    run: &'a TrecFile,
    qrels: &'a TrecFile,
}

impl<'a> SubstringMatcher<'a> {
    pub fn new(run: &'a TrecFile, qrels: &'a TrecFile) -> Self {
        Self { run, qrels }
    }
}

impl CrossMatcher for SubstringMatcher<'_> {
    fn qrels_relevance(&self, query_id: &str, document_id: &str) -> Option<i32> {
        let key = precision_key(query_id, document_id);
        self.qrels.lines().iter().find_map(|line| {
            line.find(&key)
                .map(|pos| leading_int(&line[pos + key.len()..]))
        })
    }

    fn run_contains(&self, query_id: &str, document_id: &str) -> bool {
        let key = recall_key(query_id, document_id);
        self.run.lines().iter().any(|line| line.contains(&key))
    }
}

/// Hash indexes over both files, built once.
pub struct ExactMatcher {
    judged: HashMap<MatchKey, i32>,
    retrieved: HashSet<MatchKey>,
}

impl ExactMatcher {
    /// Index every parseable line. Unparseable lines are left out of the
    /// index; the passes count them separately.
    pub fn build(run: &TrecFile, qrels: &TrecFile, policy: NumericPolicy) -> Self {
        let mut judged = HashMap::with_capacity(qrels.len());
        for line in qrels.lines() {
            if let Ok(rec) = parse_qrels_line(line, policy) {
                // First judgment wins, as with a top-down scan
                judged
                    .entry(MatchKey::new(rec.query_id, rec.document_id))
                    .or_insert(rec.relevance);
            }
        }

        // The score is irrelevant for membership, so the run is indexed leniently
        let retrieved = run
            .lines()
            .iter()
            .filter_map(|line| parse_run_line(line, NumericPolicy::Lenient).ok())
            .map(|rec| MatchKey::new(rec.query_id, rec.document_id))
            .collect::<HashSet<_>>();

        log::debug!(
            "Indexed {} judged pairs and {} retrieved pairs",
            judged.len(),
            retrieved.len()
        );
        Self { judged, retrieved }
    }

    fn key(query_id: &str, document_id: &str) -> MatchKey {
        MatchKey::new(query_id, document_id)
    }
}

impl CrossMatcher for ExactMatcher {
    fn qrels_relevance(&self, query_id: &str, document_id: &str) -> Option<i32> {
        self.judged.get(&Self::key(query_id, document_id)).copied()
    }

    fn run_contains(&self, query_id: &str, document_id: &str) -> bool {
        self.retrieved.contains(&Self::key(query_id, document_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::LineLimits;

    fn file(text: &str) -> TrecFile {
        TrecFile::from_text(text, &LineLimits::default()).unwrap()
    }

    #[test]
    fn test_keys() {
        assert_eq!(precision_key("q1", "doc1"), "q1 0 doc1 ");
        assert_eq!(recall_key("q1", "doc1"), "q1 Q0 doc1");
    }

    #[test]
    fn test_substring_relevance_lookup() {
        let run = file("");
        let qrels = file("q1 0 doc2 1\nq1 0 doc1 2\nq1 0 doc1 0\n");
        let m = SubstringMatcher::new(&run, &qrels);
        // First containing line wins
        assert_eq!(m.qrels_relevance("q1", "doc1"), Some(2));
        assert_eq!(m.qrels_relevance("q1", "doc3"), None);
    }

    #[test]
    fn test_substring_recall_prefix_collision() {
        let run = file("q1 Q0 doc10 1 9.5 tag\n");
        let qrels = file("");
        let m = SubstringMatcher::new(&run, &qrels);
        // "q1 Q0 doc1" is contained in "q1 Q0 doc10 ..."
        assert!(m.run_contains("q1", "doc1"));
        assert!(m.run_contains("q1", "doc10"));
        assert!(!m.run_contains("q2", "doc10"));
    }

    #[test]
    fn test_substring_precision_key_needs_trailing_space() {
        let run = file("");
        let qrels = file("q1 0 doc10 1\n");
        let m = SubstringMatcher::new(&run, &qrels);
        assert_eq!(m.qrels_relevance("q1", "doc1"), None);
        assert_eq!(m.qrels_relevance("q1", "doc10"), Some(1));
    }

    #[test]
    fn test_substring_query_suffix_collision() {
        let run = file("");
        let qrels = file("xq1 0 doc1 1\n");
        let m = SubstringMatcher::new(&run, &qrels);
        assert_eq!(m.qrels_relevance("q1", "doc1"), Some(1));
    }

    #[test]
    fn test_substring_requires_literal_placeholders() {
        let run = file("q1 QQ doc1 1 9.5\n");
        let qrels = file("q1 Q0 doc1 1\n");
        let m = SubstringMatcher::new(&run, &qrels);
        assert_eq!(m.qrels_relevance("q1", "doc1"), None);
        assert!(!m.run_contains("q1", "doc1"));
    }

    #[test]
    fn test_substring_is_case_sensitive() {
        let run = file("Q1 Q0 DOC1 1 9.5\n");
        let qrels = file("");
        let m = SubstringMatcher::new(&run, &qrels);
        assert!(!m.run_contains("q1", "doc1"));
    }

    #[test]
    fn test_exact_no_prefix_collision() {
        let run = file("q1 Q0 doc10 1 9.5 tag\n");
        let qrels = file("q1 0 doc10 1\nxq1 0 doc1 1\n");
        let m = ExactMatcher::build(&run, &qrels, NumericPolicy::Strict);
        assert!(!m.run_contains("q1", "doc1"));
        assert!(m.run_contains("q1", "doc10"));
        assert_eq!(m.qrels_relevance("q1", "doc1"), None);
        assert_eq!(m.qrels_relevance("q1", "doc10"), Some(1));
    }

    #[test]
    fn test_exact_ignores_placeholder_columns() {
        let run = file("q1 QQ doc1 1 9.5\n");
        let qrels = file("q1 Q0 doc1 2\n");
        let m = ExactMatcher::build(&run, &qrels, NumericPolicy::Strict);
        assert_eq!(m.qrels_relevance("q1", "doc1"), Some(2));
        assert!(m.run_contains("q1", "doc1"));
    }

    #[test]
    fn test_exact_first_judgment_wins() {
        let run = file("");
        let qrels = file("q1 0 doc1 2\nq1 0 doc1 0\n");
        let m = ExactMatcher::build(&run, &qrels, NumericPolicy::Strict);
        assert_eq!(m.qrels_relevance("q1", "doc1"), Some(2));
    }

    #[test]
    fn test_exact_skips_unparseable_lines() {
        let run = file("garbage\nq1 Q0 doc1 1 oops\n");
        let qrels = file("q1 0 doc1\nq1 0 doc2 x\n");
        let m = ExactMatcher::build(&run, &qrels, NumericPolicy::Strict);
        assert_eq!(m.qrels_relevance("q1", "doc1"), None);
        assert_eq!(m.qrels_relevance("q1", "doc2"), None);
        // Run membership does not depend on the score parsing
        assert!(m.run_contains("q1", "doc1"));
    }

    #[test]
    fn test_build_matcher_dispatch() {
        let run = file("q1 Q0 doc10 1 9.5\n");
        let qrels = file("");
        let exact = build_matcher(MatchMode::Exact, &run, &qrels, NumericPolicy::Strict);
        let substring = build_matcher(MatchMode::Substring, &run, &qrels, NumericPolicy::Strict);
        assert!(!exact.run_contains("q1", "doc1"));
        assert!(substring.run_contains("q1", "doc1"));
    }

    #[test]
    fn test_short_run_lines_only_match_as_substring() {
        let run = file("q1 Q0 doc1 1\n");
        let qrels = file("");
        let exact = build_matcher(MatchMode::Exact, &run, &qrels, NumericPolicy::Strict);
        let substring = build_matcher(MatchMode::Substring, &run, &qrels, NumericPolicy::Strict);
        assert!(!exact.run_contains("q1", "doc1"));
        assert!(substring.run_contains("q1", "doc1"));
    }
}
