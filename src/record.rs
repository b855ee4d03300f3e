//! Typed records for the two TREC line formats.
//!
//! Run lines: `<query_id> Q0 <document_id> <rank> <score> [<tag>]`.
//! Qrels lines: `<query_id> 0 <document_id> <relevance>`.

use crate::error::{Result, TellmeError};
use serde::Deserialize;

/// Fields required by a run line (query, placeholder, document, rank, score).
pub const RUN_FIELDS: usize = 5;
/// Fields required by a qrels line (query, placeholder, document, relevance).
pub const QRELS_FIELDS: usize = 4;

/// Which of the two line formats a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Run,
    Qrels,
}

/// How to treat score and relevance fields that are not clean numbers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NumericPolicy {
    /// Reject the line with `NumericFormat`
    #[default]
    Strict,
    /// Parse the leading number and default to 0, like `atof`/`atoi`
    Lenient,
}

/// One scored line of a run file
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub query_id: String,
    pub document_id: String,
    pub rank_score: f64,
}

/// One judgment line of a qrels file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrelsRecord {
    pub query_id: String,
    pub document_id: String,
    pub relevance: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Run(RunRecord),
    Qrels(QrelsRecord),
}

/// Parse one raw line according to `format`.
pub fn parse_line(line: &str, format: RecordFormat, policy: NumericPolicy) -> Result<Record> {
    match format {
        RecordFormat::Run => parse_run_line(line, policy).map(Record::Run),
        RecordFormat::Qrels => parse_qrels_line(line, policy).map(Record::Qrels),
    }
}

pub fn parse_run_line(line: &str, policy: NumericPolicy) -> Result<RunRecord> {
    let fields = split_fields(line, RUN_FIELDS)?;
    Ok(RunRecord {
        query_id: fields[0].to_string(),
        document_id: fields[2].to_string(),
        rank_score: parse_score(fields[4], policy)?,
    })
}

pub fn parse_qrels_line(line: &str, policy: NumericPolicy) -> Result<QrelsRecord> {
    let fields = split_fields(line, QRELS_FIELDS)?;
    Ok(QrelsRecord {
        query_id: fields[0].to_string(),
        document_id: fields[2].to_string(),
        relevance: parse_relevance(fields[3], policy)?,
    })
}

/// Strip the line terminator and split on whitespace, requiring `expected` fields.
fn split_fields(line: &str, expected: usize) -> Result<Vec<&str>> {
    let fields: Vec<&str> = strip_terminator(line).split_whitespace().collect();
    if fields.len() < expected {
        return Err(TellmeError::MalformedLine {
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

/// Remove a trailing `\n` or `\r\n`.
pub fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn parse_score(value: &str, policy: NumericPolicy) -> Result<f64> {
    match policy {
        NumericPolicy::Strict => value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| TellmeError::NumericFormat {
                field: "rank score",
                value: value.to_string(),
            }),
        NumericPolicy::Lenient => Ok(leading_float(value)),
    }
}

fn parse_relevance(value: &str, policy: NumericPolicy) -> Result<i32> {
    match policy {
        NumericPolicy::Strict => value.parse::<i32>().map_err(|_| TellmeError::NumericFormat {
            field: "relevance",
            value: value.to_string(),
        }),
        NumericPolicy::Lenient => Ok(leading_int(value)),
    }
}

/// Length of the optional sign plus leading digits, after `start`.
fn digits_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    if matches!(bytes.get(end), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    while bytes.get(end).map_or(false, u8::is_ascii_digit) {
        end += 1;
    }
    end
}

/// `atoi` semantics: skip leading whitespace, read an optional sign and digits,
/// return 0 when nothing numeric is found. Saturates instead of overflowing.
pub fn leading_int(text: &str) -> i32 {
    let text = text.trim_start();
    let end = digits_end(text.as_bytes(), 0);
    let digits = &text[..end];
    match digits.parse::<i64>() {
        Ok(v) => v.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        Err(_) if digits.len() > 1 && digits.bytes().skip(1).all(|b| b.is_ascii_digit()) => {
            if digits.starts_with('-') {
                i32::MIN
            } else {
                i32::MAX
            }
        }
        Err(_) => 0,
    }
}

/// `atof` semantics for decimal input: the longest numeric prefix, or 0.0.
pub fn leading_float(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = digits_end(bytes, 0);
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while bytes.get(end).map_or(false, u8::is_ascii_digit) {
            end += 1;
        }
    }
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let exp_end = digits_end(bytes, end + 1);
        let sign_len = usize::from(matches!(bytes.get(end + 1), Some(b'+') | Some(b'-')));
        if exp_end > end + 1 + sign_len {
            end = exp_end;
        }
    }
    // Walk back over trailing characters that do not form a number ("1.", "-", "+.")
    let mut candidate = &text[..end];
    while !candidate.is_empty() {
        if let Ok(v) = candidate.parse::<f64>() {
            return v;
        }
        candidate = &candidate[..candidate.len() - 1];
    }
    0.0
}
