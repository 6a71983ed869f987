//! Tree reconstruction and collection persistence.
//!
//! ## Tree blobs
//!
//! A tree persists as the concatenation of its records in ascending token
//! order. Reconstruction frames the blob sequentially (framing is length
//! driven), then decodes and `put`s the records in parallel into a fresh
//! index. Insertion order does not affect the resulting entries, and a token
//! may appear in only one record.
//!
//! A bare blob carries no record count, so one cut at a record boundary
//! frames as fewer records. Only the container's tree length catches that.
//!
//! ## Collections
//!
//! A collection persists as one container holding a section per document in
//! ascending url order. Container damage aborts the load. Record damage is
//! handled per [`RecordErrorPolicy`].

use crate::collection::IndexCollection;
use crate::config::{Config, RecordErrorPolicy};
use crate::error::{CoreError, CoreResult};
use crate::index::Index;
use crate::traversal::TraversalEngine;
use rayon::prelude::*;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};
use wordidx_codec::{
    decode_frame, read_sections, sentinel::RECORD_INIT, CodecError, ContainerWriter, RecordFrames,
};
use wordidx_storage::ContainerStore;

/// A document left out of a load because its records were damaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    /// The document url.
    pub url: String,
    /// Why its tree could not be rebuilt. Offsets are relative to the tree.
    pub error: CodecError,
}

/// Outcome of a collection load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Documents rebuilt.
    pub documents: usize,
    /// Records decoded across all rebuilt documents.
    pub records: usize,
    /// Documents left out under [`RecordErrorPolicy::SkipDocument`].
    pub skipped: Vec<SkippedDocument>,
    /// Worker threads of the pool the load ran on.
    pub workers: usize,
}

impl LoadReport {
    /// Returns true if every document in the container was rebuilt.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Rebuilds one index from a tree blob.
///
/// No new record is admitted once `deadline` has passed. Runs on a pool of
/// `config.worker_threads` workers when set, else on the ambient rayon pool.
///
/// # Errors
///
/// - [`CoreError::Codec`] for the first damaged record found, including a
///   token repeated across records
/// - [`CoreError::DeadlineExceeded`] if the deadline passed mid-way
pub fn reconstruct(blob: &[u8], config: &Config, deadline: Option<Instant>) -> CoreResult<Index> {
    on_configured_pool(config, || reconstruct_tree(blob, config, deadline))?
}

/// Runs `op` on a `config.worker_threads` pool, or in place when unset.
fn on_configured_pool<R: Send>(config: &Config, op: impl FnOnce() -> R + Send) -> CoreResult<R> {
    match config.worker_threads {
        Some(_) => Ok(TraversalEngine::new(config)?.install(op)),
        None => Ok(op()),
    }
}

fn reconstruct_tree(blob: &[u8], config: &Config, deadline: Option<Instant>) -> CoreResult<Index> {
    let frames = RecordFrames::new(blob).collect_ranges()?;
    let index = Index::with_config(config)?;
    let total = frames.len();
    let completed = AtomicUsize::new(0);

    frames.par_iter().try_for_each(|range| {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(CoreError::DeadlineExceeded {
                completed: completed.load(Ordering::Relaxed),
                total,
            });
        }
        let start = range.start;
        let record = decode_frame(blob, range.clone())?;
        if record.token.is_empty() {
            let len_at = start + RECORD_INIT.len();
            return Err(CodecError::malformed_record(
                len_at,
                &[0u8, 0, 0, 1][..],
                &blob[len_at..len_at + 4],
                "empty token",
            )
            .into());
        }
        index.put(record.into())?;
        completed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    })?;

    if index.stats().distinct_tokens != total {
        return Err(repeated_token(blob, &frames).into());
    }
    debug!(records = total, height = index.height(), "tree reconstructed");
    Ok(index)
}

/// Locates the first record whose token an earlier record already used.
fn repeated_token(blob: &[u8], frames: &[Range<usize>]) -> CodecError {
    let mut seen = HashSet::with_capacity(frames.len());
    for range in frames {
        let record = match decode_frame(blob, range.clone()) {
            Ok(record) => record,
            Err(e) => return e,
        };
        let at = range.start + RECORD_INIT.len() + 4;
        let end = at + record.token.len();
        if !seen.insert(record.token) {
            return CodecError::malformed_record(
                at,
                &[] as &[u8],
                &blob[at..end],
                "repeated token",
            );
        }
    }
    CodecError::malformed_record(0, &[] as &[u8], &[] as &[u8], "repeated token")
}

/// Encodes a collection as a container.
///
/// Trees are serialized in parallel; sections are appended in url order.
///
/// # Errors
///
/// Returns a codec error if a url or tree exceeds its length field.
pub fn encode_collection(collection: &IndexCollection) -> CoreResult<Vec<u8>> {
    let documents: Vec<(&String, &Index)> = collection.iter().collect();
    let blobs = documents
        .par_iter()
        .map(|(_, index)| index.serialize_bytes())
        .collect::<CoreResult<Vec<_>>>()?;

    let capacity = blobs.iter().map(Vec::len).sum::<usize>() + documents.len() * 16;
    let mut writer = ContainerWriter::with_capacity(capacity);
    for ((url, _), blob) in documents.iter().zip(&blobs) {
        writer.push_section(url, blob)?;
    }
    Ok(writer.finish())
}

/// Decodes a container into a collection.
///
/// # Errors
///
/// - [`CoreError::Codec`] if the container framing is damaged
/// - [`CoreError::Document`] for a damaged record under
///   [`RecordErrorPolicy::Abort`]
/// - [`CoreError::DeadlineExceeded`] if `config.deadline` passed
pub fn decode_collection(
    bytes: &[u8],
    config: &Config,
) -> CoreResult<(IndexCollection, LoadReport)> {
    config.validate()?;
    let deadline = config.deadline_from(Instant::now());
    let sections = read_sections(bytes)?;

    let (workers, rebuilt) = on_configured_pool(config, || {
        let rebuilt: Vec<(String, CoreResult<Index>)> = sections
            .into_par_iter()
            .map(|section| {
                let result = reconstruct_tree(section.tree, config, deadline);
                (section.url, result)
            })
            .collect();
        (rayon::current_num_threads(), rebuilt)
    })?;

    let mut collection = IndexCollection::with_config(config)?;
    let mut report = LoadReport {
        workers,
        ..LoadReport::default()
    };
    for (url, result) in rebuilt {
        match result {
            Ok(index) => {
                report.documents += 1;
                report.records += index.size();
                if collection.insert(url.clone(), index).is_some() {
                    warn!(%url, "duplicate document in container, keeping the later one");
                }
            }
            Err(CoreError::Codec(source)) if source.is_record_level() => {
                match config.record_errors {
                    RecordErrorPolicy::Abort => return Err(CoreError::document(url, source)),
                    RecordErrorPolicy::SkipDocument => {
                        warn!(%url, error = %source, "skipping damaged document");
                        report.skipped.push(SkippedDocument { url, error: source });
                    }
                }
            }
            Err(e @ CoreError::DeadlineExceeded { .. }) => {
                warn!(%url, error = %e, "collection load ran past its deadline");
                return Err(e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok((collection, report))
}

/// Writes a collection to a store, replacing its previous content.
///
/// # Errors
///
/// Returns a codec error if encoding fails or a storage error if the store
/// rejects the write.
pub fn write_all(collection: &IndexCollection, store: &dyn ContainerStore) -> CoreResult<usize> {
    let bytes = encode_collection(collection)?;
    store.store(&bytes)?;
    info!(
        documents = collection.len(),
        bytes = bytes.len(),
        store = %store.describe(),
        "collection written"
    );
    Ok(bytes.len())
}

/// Reads a collection back from a store.
///
/// A store that was never written yields an empty collection.
///
/// # Errors
///
/// See [`decode_collection`]; storage failures are returned as
/// [`CoreError::Storage`].
pub fn read_all(
    store: &dyn ContainerStore,
    config: &Config,
) -> CoreResult<(IndexCollection, LoadReport)> {
    let Some(bytes) = store.load()? else {
        info!(store = %store.describe(), "no collection stored yet");
        return Ok((IndexCollection::with_config(config)?, LoadReport::default()));
    };
    let (collection, report) = decode_collection(&bytes, config)?;
    info!(
        documents = report.documents,
        records = report.records,
        skipped = report.skipped.len(),
        store = %store.describe(),
        "collection loaded"
    );
    Ok((collection, report))
}
