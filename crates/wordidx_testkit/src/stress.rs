//! Stress harnesses for concurrent index access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use wordidx_core::Index;

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of concurrent writer threads.
    pub threads: usize,
    /// Operations per thread.
    pub ops_per_thread: usize,
    /// Number of distinct tokens the writers cycle through.
    pub distinct_tokens: usize,
    /// Number of concurrent reader threads (mixed tests only).
    pub readers: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 8,
            ops_per_thread: 1_000,
            distinct_tokens: 200,
            readers: 2,
        }
    }
}

impl StressConfig {
    /// Total writes the configuration performs.
    #[must_use]
    pub fn total_writes(&self) -> usize {
        self.threads * self.ops_per_thread
    }
}

/// Token number `i` of the cycling token set.
///
/// Letters only, so stress tokens are valid normalized tokens.
pub fn stress_token(i: usize) -> String {
    let mut n = i;
    let mut token = String::new();
    loop {
        token.push(char::from(b'a' + (n % 26) as u8));
        n /= 26;
        if n == 0 {
            break;
        }
    }
    token
}

fn spawn_writers<F>(config: &StressConfig, op: F) -> (usize, usize)
where
    F: Fn(usize, usize) -> bool + Send + Sync + 'static,
{
    let op = Arc::new(op);
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let op = Arc::clone(&op);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let ops = config.ops_per_thread;
            thread::spawn(move || {
                for i in 0..ops {
                    if op(t, i) {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Writer thread panicked");
    }
    (
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
    )
}

/// Every thread adds the same token `ops_per_thread` times.
///
/// Afterwards the token's frequency must equal `threads * ops_per_thread`.
pub fn stress_same_key_adds(
    index: &Arc<Index>,
    token: &str,
    config: &StressConfig,
) -> StressTestResult {
    let start = Instant::now();
    let index = Arc::clone(index);
    let token = token.to_owned();
    let (ok, failed) = spawn_writers(config, move |_, _| index.add(&token).is_ok());
    StressTestResult::new(ok, failed, start.elapsed())
}

/// Threads add tokens cycling through `distinct_tokens` values.
pub fn stress_distinct_adds(index: &Arc<Index>, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();
    let index = Arc::clone(index);
    let distinct = config.distinct_tokens.max(1);
    let ops = config.ops_per_thread;
    let (ok, failed) = spawn_writers(config, move |t, i| {
        index.add(&stress_token((t * ops + i) % distinct)).is_ok()
    });
    StressTestResult::new(ok, failed, start.elapsed())
}

/// Writers add while readers repeatedly look tokens up and check the
/// structure.
///
/// Readers count a failure whenever they observe a broken invariant.
pub fn stress_mixed_operations(index: &Arc<Index>, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();
    let done = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let read_failures = Arc::new(AtomicUsize::new(0));
    let reads = Arc::new(AtomicUsize::new(0));

    let readers: Vec<_> = (0..config.readers)
        .map(|r| {
            let index = Arc::clone(index);
            let done = Arc::clone(&done);
            let read_failures = Arc::clone(&read_failures);
            let reads = Arc::clone(&reads);
            let distinct = config.distinct_tokens.max(1);
            thread::spawn(move || {
                let mut i = r;
                while !done.load(Ordering::Acquire) {
                    let ok = index.get(&stress_token(i % distinct)).is_ok()
                        && (i % 64 != 0 || index.verify().is_ok());
                    if !ok {
                        read_failures.fetch_add(1, Ordering::Relaxed);
                    }
                    reads.fetch_add(1, Ordering::Relaxed);
                    i += 1;
                }
            })
        })
        .collect();

    let writes = stress_distinct_adds(index, config);
    done.store(true, Ordering::Release);
    for reader in readers {
        reader.join().expect("Reader thread panicked");
    }

    let read_failures = read_failures.load(Ordering::Relaxed);
    let reads = reads.load(Ordering::Relaxed);
    StressTestResult::new(
        writes.successful_ops + reads - read_failures,
        writes.failed_ops + read_failures,
        start.elapsed(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stress_tokens_are_letters() {
        assert_eq!(stress_token(0), "a");
        assert_eq!(stress_token(25), "z");
        assert_eq!(stress_token(26), "ab");
        assert!((0..1000).map(stress_token).all(|t| t.chars().all(|c| c.is_ascii_lowercase())));
    }

    #[test]
    fn small_same_key_run() {
        let index = Arc::new(Index::new());
        let config = StressConfig {
            threads: 4,
            ops_per_thread: 100,
            ..StressConfig::default()
        };
        let result = stress_same_key_adds(&index, "x", &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(index.get("x").unwrap().unwrap().frequency(), 400);
    }
}
