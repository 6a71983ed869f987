//! Bulk ingestion of crawled documents.
//!
//! Documents are fed in parallel, each through its own index in chunks of
//! [`Config::ingest_chunk`] tokens. With a deadline set, no chunk is
//! admitted once it has passed; a chunk already admitted runs to the end,
//! so no tree is left mid-split.

use crate::collection::IndexCollection;
use crate::config::Config;
use crate::error::CoreResult;
use crate::index::Index;
use crate::tokenize;
use crate::traversal::TraversalEngine;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, warn};

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents whose tokens were all added.
    pub documents_completed: usize,
    /// Documents cut short by the deadline.
    pub documents_partial: usize,
    /// Tokens added across all documents.
    pub tokens_added: usize,
    /// True if the deadline stopped the run.
    pub timed_out: bool,
}

/// Feeds raw documents into a collection on a dedicated pool.
#[derive(Debug)]
pub struct Ingestor {
    config: Config,
    engine: TraversalEngine,
}

impl Ingestor {
    /// Creates an ingestor and starts its pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the pool cannot
    /// be started.
    pub fn new(config: Config) -> CoreResult<Self> {
        let engine = TraversalEngine::new(&config)?;
        Ok(Self { config, engine })
    }

    /// Adds every document's words to its index in `collection`.
    ///
    /// Words are normalized first; words that normalize to nothing are
    /// skipped. A url may appear more than once.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by an index.
    pub fn ingest<I, W>(
        &self,
        collection: &mut IndexCollection,
        documents: I,
    ) -> CoreResult<IngestReport>
    where
        I: IntoIterator<Item = (String, W)>,
        W: IntoIterator,
        W::Item: AsRef<str>,
    {
        let deadline = self.config.deadline_from(Instant::now());

        let documents: Vec<(String, Vec<String>)> = documents
            .into_iter()
            .map(|(url, words)| {
                let tokens = words
                    .into_iter()
                    .map(|w| tokenize::normalize(w.as_ref()))
                    .filter(|t| !t.is_empty())
                    .collect();
                (url, tokens)
            })
            .collect();
        for (url, _) in &documents {
            collection.document(url);
        }

        let collection: &IndexCollection = collection;
        let mut jobs = Vec::with_capacity(documents.len());
        for (url, tokens) in &documents {
            if let Some(index) = collection.get(url) {
                jobs.push((url.as_str(), index, tokens.as_slice()));
            }
        }

        let chunk = self.config.ingest_chunk;
        let outcomes = self.engine.install(|| {
            jobs.par_iter()
                .map(|(url, index, tokens)| feed(url, index, tokens, chunk, deadline))
                .collect::<CoreResult<Vec<_>>>()
        })?;

        let mut report = IngestReport::default();
        for (added, complete) in outcomes {
            report.tokens_added += added;
            if complete {
                report.documents_completed += 1;
            } else {
                report.documents_partial += 1;
                report.timed_out = true;
            }
        }
        if report.timed_out {
            warn!(
                completed = report.documents_completed,
                partial = report.documents_partial,
                "ingestion stopped at deadline"
            );
        }
        Ok(report)
    }
}

/// Returns tokens added and whether the document finished.
fn feed(
    url: &str,
    index: &Index,
    tokens: &[String],
    chunk: usize,
    deadline: Option<Instant>,
) -> CoreResult<(usize, bool)> {
    let mut added = 0;
    for batch in tokens.chunks(chunk) {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            debug!(url, added, remaining = tokens.len() - added, "document cut short");
            return Ok((added, false));
        }
        added += index.add_all(batch)?;
    }
    debug!(url, added, "document ingested");
    Ok((added, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_owned).collect()
    }

    #[test]
    fn ingests_all_documents() {
        let ingestor = Ingestor::new(Config::new().worker_threads(2).ingest_chunk(2)).unwrap();
        let mut collection = IndexCollection::new();
        let report = ingestor
            .ingest(
                &mut collection,
                vec![
                    ("a.com".to_string(), words("Cat cat, CAT! 12")),
                    ("b.com".to_string(), words("dog")),
                ],
            )
            .unwrap();

        assert_eq!(report.documents_completed, 2);
        assert_eq!(report.tokens_added, 4);
        assert!(!report.timed_out);
        let a = collection.get("a.com").unwrap();
        assert_eq!(a.get("cat").unwrap().unwrap().frequency(), 3);
    }

    #[test]
    fn repeated_url_accumulates() {
        let ingestor = Ingestor::new(Config::new().worker_threads(4)).unwrap();
        let mut collection = IndexCollection::new();
        let docs = (0..8).map(|_| ("same".to_string(), words("x y")));
        ingestor.ingest(&mut collection, docs).unwrap();
        let index = collection.get("same").unwrap();
        assert_eq!(index.get("x").unwrap().unwrap().frequency(), 8);
        index.verify().unwrap();
    }

    #[test]
    fn zero_deadline_admits_nothing() {
        let ingestor = Ingestor::new(Config::new().deadline(Duration::ZERO)).unwrap();
        let mut collection = IndexCollection::new();
        let report = ingestor
            .ingest(&mut collection, vec![("a".to_string(), words("one two"))])
            .unwrap();
        assert!(report.timed_out);
        assert_eq!(report.documents_partial, 1);
        assert_eq!(report.tokens_added, 0);
        assert!(collection.get("a").unwrap().is_empty());
    }
}
