//! Property-based test generators using proptest.
//!
//! Tokens are drawn from a small alphabet so that generated streams repeat
//! tokens often enough to exercise frequency increments as well as splits.

use proptest::prelude::*;

/// Strategy for generating normalized tokens.
pub fn token_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-f]{1,6}").expect("Invalid regex")
}

/// Strategy for generating tokens over the full lowercase alphabet.
pub fn wide_token_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,16}").expect("Invalid regex")
}

/// Strategy for generating a token stream of `min..max` tokens.
pub fn token_stream_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(token_strategy(), min..max)
}

/// Strategy for generating document urls.
pub fn url_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,8}\\.(com|org|net)(/[a-z0-9]{0,6})?")
        .expect("Invalid regex")
}

/// Strategy for generating raw documents: `(url, tokens)` pairs.
pub fn documents_strategy(max_docs: usize) -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    prop::collection::vec((url_strategy(), token_stream_strategy(0, 64)), 0..max_docs)
}

/// Strategy for generating fan-out bounds.
pub fn fan_out_strategy() -> impl Strategy<Value = usize> {
    4usize..=9
}

/// One operation against an index.
#[derive(Debug, Clone)]
pub enum IndexOperation {
    /// Count one occurrence.
    Add(String),
    /// Store an entry with an explicit frequency.
    Put {
        /// Token
        token: String,
        /// Frequency
        frequency: u32,
    },
    /// Look a token up.
    Get(String),
}

/// Strategy for generating index operations.
pub fn index_operation_strategy() -> impl Strategy<Value = IndexOperation> {
    prop_oneof![
        4 => token_strategy().prop_map(IndexOperation::Add),
        1 => (token_strategy(), 1u32..1000)
            .prop_map(|(token, frequency)| IndexOperation::Put { token, frequency }),
        2 => token_strategy().prop_map(IndexOperation::Get),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<IndexOperation>> {
    prop::collection::vec(index_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
