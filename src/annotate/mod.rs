//! Verbose-mode annotations: original query text and document text for a
//! reported (query, document) pair.

pub mod document;
pub mod query;

pub use document::{shard_for, CollectionDocument, DocumentLocator};
pub use query::QueryBook;

use crate::config::Config;
use crate::error::Result;

/// What could be resolved for one reported pair
#[derive(Debug)]
pub struct Annotation {
    /// The query-definition line, if any line mentions the query
    pub query_line: Option<String>,
    /// The document, or the reason it could not be shown
    pub document: Result<CollectionDocument>,
}

pub struct Annotator {
    queries: QueryBook,
    documents: DocumentLocator,
}

impl Annotator {
    pub fn new(queries: QueryBook, documents: DocumentLocator) -> Self {
        Self { queries, documents }
    }

    /// Open the query file and prepare the collection locator.
    /// A missing query file is fatal; missing shards are reported per document.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mode = config.matching.mode;
        let queries = QueryBook::open(&config.verbose.query_path, &config.line_limits(), mode)?;
        log::info!(
            "Loaded {} query definitions from {}",
            queries.len(),
            config.verbose.query_path.display()
        );
        let documents = DocumentLocator::new(
            config.verbose.collection_path.clone(),
            config.verbose.closing_delimiter.clone(),
            mode,
            config.verbose.cache_capacity,
        )?;
        Ok(Self::new(queries, documents))
    }

    pub fn annotate(&mut self, query_id: &str, document_id: &str) -> Annotation {
        let query_line = self.queries.lookup(query_id).map(str::to_string);
        if query_line.is_none() {
            log::debug!("No query definition for {}", query_id);
        }
        let document = self.documents.fetch(document_id);
        log::debug!("{} documents cached", self.documents.cached());
        if let Err(ref e) = document {
            log::debug!("Annotation of {} failed: {}", document_id, e);
        }
        Annotation {
            query_line,
            document,
        }
    }
}
