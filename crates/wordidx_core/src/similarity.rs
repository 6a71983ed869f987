//! Cosine similarity between word-frequency trees.
//!
//! Each tree is read as a sparse vector over tokens. Both flattened
//! sequences are already sorted, so the dot product is a single merge.

use crate::collection::IndexCollection;
use crate::entry::WordEntry;
use crate::index::Index;
use rayon::prelude::*;
use std::cmp::Ordering;

/// Similarity of one document to a query.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    /// The document url.
    pub url: String,
    /// Cosine similarity in `[0.0, 1.0]`.
    pub similarity: f64,
}

/// Cosine similarity of two indexes. Either one empty gives `0.0`.
#[must_use]
pub fn cosine_similarity(a: &Index, b: &Index) -> f64 {
    cosine_of_sorted(&a.flatten(), &b.flatten())
}

/// Cosine similarity of two token-sorted entry lists.
#[must_use]
pub fn cosine_of_sorted(a: &[WordEntry], b: &[WordEntry]) -> f64 {
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let mut dot = 0.0;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].token().cmp(b[j].token()) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                dot += f64::from(a[i].frequency()) * f64::from(b[j].frequency());
                i += 1;
                j += 1;
            }
        }
    }
    // Rounding can push identical vectors just past 1.0.
    (dot / (norm_a * norm_b)).min(1.0)
}

fn norm(entries: &[WordEntry]) -> f64 {
    entries
        .iter()
        .map(|e| f64::from(e.frequency()).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Scores every document against `query`, best first.
///
/// Ties are broken by ascending url.
#[must_use]
pub fn rank(query: &Index, collection: &IndexCollection) -> Vec<SimilarityResult> {
    let query = query.flatten();
    let documents: Vec<(&String, &Index)> = collection.iter().collect();
    let mut results: Vec<SimilarityResult> = documents
        .par_iter()
        .map(|(url, index)| SimilarityResult {
            url: (*url).clone(),
            similarity: cosine_of_sorted(&query, &index.flatten()),
        })
        .collect();
    results.sort_by(|x, y| {
        y.similarity
            .total_cmp(&x.similarity)
            .then_with(|| x.url.cmp(&y.url))
    });
    results
}
