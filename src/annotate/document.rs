//! Document text lookup in the sharded TREC collection.
//!
//! Document ids embed their shard number at characters 7..10
//! (`doc062200112743` lives in shard `001`). Each shard is a TREC file of
//! `<DOC>` blocks; the text between the block's id line and the closing
//! delimiter is the document content.

use crate::config::SHARD_PLACEHOLDER;
use crate::error::{Result, TellmeError};
use crate::input::read_lossy_line;
use crate::matcher::MatchMode;
use crate::record::leading_int;
use lru::LruCache;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Byte range of the document id holding the shard number
const SHARD_DIGITS: std::ops::Range<usize> = 7..10;

/// A document resolved from its collection shard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDocument {
    pub document_id: String,
    pub shard: i32,
    pub path: PathBuf,
    /// Lines between the id line and the closing delimiter
    pub lines: Vec<String>,
    /// False when the shard ended before the closing delimiter
    pub complete: bool,
}

impl CollectionDocument {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupState {
    SeekingDocMarker,
    EchoingContent,
    Done,
}

/// Shard number embedded in a document id, `atoi`-style.
pub fn shard_for(document_id: &str) -> Result<i32> {
    document_id
        .get(SHARD_DIGITS)
        .map(leading_int)
        .ok_or_else(|| TellmeError::InvalidDocumentId(document_id.to_string()))
}

/// Resolves document ids to their text, caching recent documents.
pub struct DocumentLocator {
    path_template: String,
    closing_delimiter: String,
    mode: MatchMode,
    docno: Regex,
    cache: Option<LruCache<String, CollectionDocument>>,
}

impl DocumentLocator {
    /// `path_template` must contain `{shard}`. A `cache_capacity` of 0
    /// disables caching.
    pub fn new(
        path_template: impl Into<String>,
        closing_delimiter: impl Into<String>,
        mode: MatchMode,
        cache_capacity: usize,
    ) -> Result<Self> {
        let path_template = path_template.into();
        if !path_template.contains(SHARD_PLACEHOLDER) {
            return Err(TellmeError::Config(format!(
                "collection path has no {} placeholder: {}",
                SHARD_PLACEHOLDER, path_template
            )));
        }
        let docno = Regex::new(r"<DOCNO>\s*([^\s<]+)\s*<")
            .map_err(|e| TellmeError::Config(format!("DOCNO pattern: {}", e)))?;
        Ok(Self {
            path_template,
            closing_delimiter: closing_delimiter.into(),
            mode,
            docno,
            cache: NonZeroUsize::new(cache_capacity).map(LruCache::new),
        })
    }

    pub fn shard_path(&self, shard: i32) -> PathBuf {
        PathBuf::from(
            self.path_template
                .replace(SHARD_PLACEHOLDER, &shard.to_string()),
        )
    }

    /// Fetch a document, from the cache when possible.
    pub fn fetch(&mut self, document_id: &str) -> Result<CollectionDocument> {
        if let Some(doc) = self.cache.as_mut().and_then(|c| c.get(document_id)) {
            log::debug!("Document {} served from cache", document_id);
            return Ok(doc.clone());
        }

        let shard = shard_for(document_id)?;
        let path = self.shard_path(shard);
        let file = File::open(&path).map_err(|e| {
            log::debug!("Cannot open {}: {}", path.display(), e);
            TellmeError::CollectionNotFound { path: path.clone() }
        })?;

        let (lines, complete) = self.scan(BufReader::new(file), document_id).map_err(|e| match e {
            TellmeError::DocumentNotFound { document_id, .. } => TellmeError::DocumentNotFound {
                document_id,
                path: path.clone(),
            },
            other => other,
        })?;

        let doc = CollectionDocument {
            document_id: document_id.to_string(),
            shard,
            path,
            lines,
            complete,
        };
        if let Some(cache) = self.cache.as_mut() {
            cache.put(document_id.to_string(), doc.clone());
        }
        Ok(doc)
    }

    /// Walk a shard looking for the document block.
    fn scan<R: BufRead>(&self, mut reader: R, document_id: &str) -> Result<(Vec<String>, bool)> {
        let mut state = LookupState::SeekingDocMarker;
        let mut content = Vec::new();
        let mut buf = Vec::new();

        while let Some(line) = read_lossy_line(&mut reader, &mut buf)? {
            match state {
                LookupState::SeekingDocMarker => {
                    if self.is_marker(&line, document_id) {
                        state = LookupState::EchoingContent;
                    }
                }
                LookupState::EchoingContent => {
                    if line.contains(&self.closing_delimiter) {
                        state = LookupState::Done;
                        break;
                    }
                    content.push(line);
                }
                LookupState::Done => break,
            }
        }

        match state {
            LookupState::SeekingDocMarker => Err(TellmeError::DocumentNotFound {
                document_id: document_id.to_string(),
                path: PathBuf::new(),
            }),
            LookupState::EchoingContent => {
                log::warn!(
                    "Document {} has no closing {} before end of shard",
                    document_id,
                    self.closing_delimiter
                );
                Ok((content, false))
            }
            LookupState::Done => Ok((content, true)),
        }
    }

    fn is_marker(&self, line: &str, document_id: &str) -> bool {
        match self.mode {
            MatchMode::Substring => line.contains(document_id),
            MatchMode::Exact => self
                .docno
                .captures(line)
                .and_then(|c| c.get(1))
                .map_or(false, |m| m.as_str() == document_id),
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.as_ref().map_or(0, LruCache::len)
    }
}
