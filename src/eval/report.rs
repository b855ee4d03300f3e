//! Human-readable report written to stdout.

use super::{EvalSettings, Evaluation, PassSummary};
use crate::annotate::{Annotation, Annotator};
use crate::config::Config;
use std::io::{self, Write};

const RULE: &str = "*********************************************************************";
const DOC_RULE: &str = "***********************************************************************************************************";

/// Write the settings banner, both passes and their summaries.
///
/// With an annotator, every reported pair is followed by its query line and
/// document text. Annotation failures are printed in place and never abort.
pub fn write_report<W: Write>(
    out: &mut W,
    config: &Config,
    evaluation: &Evaluation,
    mut annotator: Option<&mut Annotator>,
) -> io::Result<()> {
    let settings = EvalSettings::from(config);
    write_banner(out, config, &settings)?;

    writeln!(out, "\n1 - DOCUMENTS ERRONEOUSLY MARKED AS RELEVANT (Precision)")?;
    for error in &evaluation.precision.errors {
        writeln!(out, "{}", error)?;
        if let Some(annotator) = annotator.as_deref_mut() {
            let annotation = annotator.annotate(&error.record.query_id, &error.record.document_id);
            write_annotation(out, &annotation)?;
        }
    }
    write_summary(out, "run", &evaluation.precision.summary)?;

    writeln!(out, "\n2 - RELEVANT DOCUMENTS NOT INCLUDED (Recall)")?;
    for error in &evaluation.recall.errors {
        writeln!(out, "{}", error)?;
        if let Some(annotator) = annotator.as_deref_mut() {
            let annotation = annotator.annotate(&error.record.query_id, &error.record.document_id);
            write_annotation(out, &annotation)?;
        }
    }
    write_summary(out, "qrels", &evaluation.recall.summary)?;

    Ok(())
}

fn write_banner<W: Write>(out: &mut W, config: &Config, settings: &EvalSettings) -> io::Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "TELLME v{} - CURRENT SETTINGS:", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "PHASE 1: PRECISION")?;
    writeln!(out, "Will print errors only with rank >={:.6}", settings.rank_threshold)?;
    writeln!(out)?;
    writeln!(out, "PHASE 2: RECALL")?;
    writeln!(
        out,
        "Will print only non-included docs of relevance greater or equal to {}",
        settings.relevance_threshold
    )?;
    writeln!(out, "Match mode: {}", settings.match_mode)?;
    writeln!(out, "Verbose mode: {}", if settings.verbose { "on" } else { "off" })?;
    writeln!(out, "{}", RULE)?;

    if settings.verbose {
        writeln!(out)?;
        writeln!(out, "{}", RULE)?;
        writeln!(out, "VERBOSE MODE")?;
        writeln!(out, "Will attempt to read queries from: {}", config.verbose.query_path.display())?;
        writeln!(out, "Will attempt to read documents from: {}", config.verbose.collection_path)?;
        writeln!(out, "{}", RULE)?;
    }
    Ok(())
}

fn write_annotation<W: Write>(out: &mut W, annotation: &Annotation) -> io::Result<()> {
    match &annotation.query_line {
        Some(line) => writeln!(out, "QUERY: {}", line)?,
        None => writeln!(out, "QUERY: (no definition found)")?,
    }
    match &annotation.document {
        Ok(doc) => {
            if !doc.lines.is_empty() {
                writeln!(out, "{}", doc.text())?;
            }
            if !doc.complete {
                writeln!(out, "[document truncated: end of {}]", doc.path.display())?;
            }
            writeln!(out, "{}", DOC_RULE)?;
        }
        Err(e) => writeln!(out, "error: {}", e)?,
    }
    writeln!(out)?;
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, name: &str, summary: &PassSummary) -> io::Result<()> {
    writeln!(out, "Read {} lines of {}", summary.lines_read, name)?;
    writeln!(
        out,
        "Evaluated {} lines of {}, {} below threshold",
        summary.evaluated, summary.below_threshold, name
    )?;
    if summary.skipped() > 0 {
        writeln!(
            out,
            "Skipped {} malformed and {} non-numeric lines of {}",
            summary.malformed, summary.non_numeric, name
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{DocumentLocator, QueryBook};
    use crate::eval::{evaluate, EvalSettings};
    use crate::input::{LineLimits, TrecFile};
    use crate::matcher::MatchMode;
    use std::fs;
    use tempfile::TempDir;

    fn file(text: &str) -> TrecFile {
        TrecFile::from_text(text, &LineLimits::default()).unwrap()
    }

    fn render(config: &Config, evaluation: &Evaluation, annotator: Option<&mut Annotator>) -> String {
        let mut out = Vec::new();
        write_report(&mut out, config, evaluation, annotator).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_report_sections_and_counts() {
        let config = Config::default();
        let eval = evaluate(
            &file("q1 Q0 doc1 1 9.5 tag\nbroken\nq1 Q0 doc3 3 8.9 tag\n"),
            &file("q1 0 doc1 2\nq1 0 doc2 2\n"),
            &EvalSettings::from(&config),
        );
        let text = render(&config, &eval, None);

        assert!(text.contains("Will print errors only with rank >=9.000000"));
        assert!(text.contains("relevance greater or equal to 1"));
        assert!(text.contains("1 - DOCUMENTS ERRONEOUSLY MARKED AS RELEVANT"));
        assert!(text.contains("2 - RELEVANT DOCUMENTS NOT INCLUDED"));
        assert!(text.contains("Document doc2 relevant (2) for q1 NOT included!"));
        assert!(text.contains("Read 3 lines of run"));
        assert!(text.contains("Evaluated 1 lines of run, 1 below threshold"));
        assert!(text.contains("Evaluated 2 lines of qrels, 0 below threshold"));
        assert!(text.contains("Skipped 1 malformed and 0 non-numeric lines of run"));
        assert!(text.contains("Read 2 lines of qrels"));
        assert!(!text.contains("malformed and 0 non-numeric lines of qrels"));
        assert!(!text.contains("QUERY:"));
    }

    #[test]
    fn test_report_with_annotations() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("c_1.txt"),
            "<DOC>\n<DOCNO>doc062200100001</DOCNO>\nle texte\n</DOC>\n",
        )
        .unwrap();
        let template = temp_dir.path().join("c_{shard}.txt").to_string_lossy().to_string();

        let mut config = Config::default();
        config.verbose.enabled = true;
        config.verbose.collection_path = template.clone();

        let queries = QueryBook::new(file("q1\tquelle requête\n"), MatchMode::Exact);
        let documents = DocumentLocator::new(template, "</DOC>", MatchMode::Exact, 4).unwrap();
        let mut annotator = Annotator::new(queries, documents);

        let eval = evaluate(
            &file("q1 Q0 doc062200100001 1 9.5 tag\nq1 Q0 doc062200900001 2 9.4 tag\n"),
            &file(""),
            &EvalSettings::from(&config),
        );
        let text = render(&config, &eval, Some(&mut annotator));

        assert!(text.contains("VERBOSE MODE"));
        assert!(text.contains("QUERY: q1\tquelle requête"));
        assert!(text.contains("le texte"));
        assert!(text.contains(DOC_RULE));
        // The missing shard is a diagnostic; the report carries on
        assert!(text.contains("error: Cannot open collection"));
        assert!(text.contains("Read 2 lines of run"));
    }
}
