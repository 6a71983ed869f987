//! Benchmark utilities.
//!
//! Token streams follow a rough Zipf shape so that benchmarks see both
//! frequency bumps on hot words and splits from the long tail.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wordidx_core::{Index, IndexCollection};

/// A random lowercase token of `1..=max_len` letters.
pub fn random_token<R: Rng>(rng: &mut R, max_len: usize) -> String {
    let len = rng.gen_range(1..=max_len.max(1));
    (0..len).map(|_| char::from(rng.gen_range(b'a'..=b'z'))).collect()
}

/// A vocabulary of `size` random tokens (duplicates possible).
pub fn vocabulary(size: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size).map(|_| random_token(&mut rng, 10)).collect()
}

/// `count` tokens drawn from `vocabulary` with weight `1 / rank`.
pub fn zipf_stream(vocabulary: &[String], count: usize, seed: u64) -> Vec<String> {
    if vocabulary.is_empty() {
        return Vec::new();
    }
    let weights: Vec<f64> = (1..=vocabulary.len()).map(|r| 1.0 / r as f64).collect();
    let dist = WeightedIndex::new(&weights).expect("Weights are positive");
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| vocabulary[dist.sample(&mut rng)].clone())
        .collect()
}

/// An index holding `stream`.
pub fn build_index(stream: &[String]) -> Index {
    let index = Index::new();
    index.add_all(stream).expect("Generated tokens are non-empty");
    index
}

/// A collection of `documents` indexes with `tokens_per_doc` tokens each.
pub fn build_collection(documents: usize, tokens_per_doc: usize, seed: u64) -> IndexCollection {
    let vocab = vocabulary(2_000, seed);
    let mut collection = IndexCollection::new();
    for d in 0..documents {
        let stream = zipf_stream(&vocab, tokens_per_doc, seed.wrapping_add(d as u64));
        collection
            .document(&format!("https://site{d}.example/page"))
            .add_all(&stream)
            .expect("Generated tokens are non-empty");
    }
    collection
}
