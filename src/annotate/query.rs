//! Query text lookup for verbose reports.

use crate::error::Result;
use crate::input::{LineLimits, TrecFile};
use crate::matcher::MatchMode;
use std::path::Path;

/// Query-definition file (`<qid>\t<text>` per line), loaded once.
pub struct QueryBook {
    file: TrecFile,
    mode: MatchMode,
}

impl QueryBook {
    pub fn open(path: &Path, limits: &LineLimits, mode: MatchMode) -> Result<Self> {
        Ok(Self::new(TrecFile::open(path, limits)?, mode))
    }

    pub fn new(file: TrecFile, mode: MatchMode) -> Self {
        Self { file, mode }
    }

    /// First line describing `query_id`.
    ///
    /// Substring mode returns the first line containing the id anywhere;
    /// exact mode requires the first field to equal the id.
    pub fn lookup(&self, query_id: &str) -> Option<&str> {
        let lines = self.file.lines().iter();
        match self.mode {
            MatchMode::Substring => lines
                .map(String::as_str)
                .find(|line| line.contains(query_id)),
            MatchMode::Exact => lines
                .map(String::as_str)
                .find(|line| line.split_whitespace().next() == Some(query_id)),
        }
    }

    pub fn len(&self) -> usize {
        self.file.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.is_empty()
    }
}
