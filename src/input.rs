//! Line-oriented input files, read once into memory.

use crate::error::{Result, TellmeError};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// What to do with a line longer than `max_line_bytes`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OversizedLinePolicy {
    /// Keep the first `max_line_bytes` bytes (on a char boundary)
    #[default]
    Truncate,
    /// Abort the read with `LineTooLong`
    Reject,
}

/// Limits applied while reading a line-oriented file
#[derive(Debug, Clone, Copy)]
pub struct LineLimits {
    pub max_line_bytes: usize,
    pub oversized: OversizedLinePolicy,
}

impl Default for LineLimits {
    fn default() -> Self {
        Self {
            max_line_bytes: 64 * 1024,
            oversized: OversizedLinePolicy::Truncate,
        }
    }
}

/// A run, qrels or query-definition file held as raw lines without terminators
#[derive(Debug, Clone)]
pub struct TrecFile {
    path: PathBuf,
    lines: Vec<String>,
}

impl TrecFile {
    /// Open and fully read `path`. The handle is closed before returning.
    pub fn open(path: &Path, limits: &LineLimits) -> Result<Self> {
        let file = File::open(path).map_err(|source| TellmeError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let mut loaded = Self::from_reader(BufReader::new(file), limits)?;
        loaded.path = path.to_path_buf();
        log::debug!("Read {} lines from {}", loaded.lines.len(), path.display());
        Ok(loaded)
    }

    /// Read every line of `reader`. Invalid UTF-8 is replaced, not rejected.
    pub fn from_reader<R: BufRead>(mut reader: R, limits: &LineLimits) -> Result<Self> {
        let mut lines = Vec::new();
        let mut buf = Vec::new();
        while let Some(line) = read_lossy_line(&mut reader, &mut buf)? {
            lines.push(enforce_limit(&line, lines.len() + 1, limits)?);
        }
        Ok(Self {
            path: PathBuf::new(),
            lines,
        })
    }

    /// Build from in-memory text (mostly for tests and piped input).
    pub fn from_text(text: &str, limits: &LineLimits) -> Result<Self> {
        Self::from_reader(text.as_bytes(), limits)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Read one line without its terminator, replacing invalid UTF-8.
/// Returns `None` at end of input. `buf` is scratch space reused across calls.
pub fn read_lossy_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    let raw = String::from_utf8_lossy(&buf[..]);
    Ok(Some(crate::record::strip_terminator(&raw).to_string()))
}

fn enforce_limit(line: &str, line_no: usize, limits: &LineLimits) -> Result<String> {
    if line.len() <= limits.max_line_bytes {
        return Ok(line.to_string());
    }
    match limits.oversized {
        OversizedLinePolicy::Reject => Err(TellmeError::LineTooLong {
            line_no,
            len: line.len(),
            max: limits.max_line_bytes,
        }),
        OversizedLinePolicy::Truncate => {
            let mut cut = limits.max_line_bytes;
            while !line.is_char_boundary(cut) {
                cut -= 1;
            }
            log::warn!(
                "Line {} is {} bytes, truncated to {}",
                line_no,
                line.len(),
                cut
            );
            Ok(line[..cut].to_string())
        }
    }
}
