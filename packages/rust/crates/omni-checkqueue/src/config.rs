//! Queue sizing and worker-count resolution.
//!
//! Parallelism follows the node's `-par` convention: a positive value is the
//! total number of verifying threads (the calling thread included), zero means
//! "use every core", and a negative value leaves that many cores free.

use std::env;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::{CheckQueueError, CheckQueueResult};

/// Default number of jobs handed out per grab.
pub const DEFAULT_BATCH_SIZE: usize = 128;

/// Maximum number of dedicated worker threads.
pub const MAX_WORKER_THREADS: usize = 15;

/// Default parallelism (`0` = auto-detect from available cores).
pub const DEFAULT_PARALLELISM: i32 = 0;

/// Env override for parallelism.
pub const PARALLELISM_ENV: &str = "OMNI_CHECKQUEUE_PAR";

/// Env override for batch size.
pub const BATCH_SIZE_ENV: &str = "OMNI_CHECKQUEUE_BATCH_SIZE";

/// Config for a check queue and its worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckQueueConfig {
    /// Maximum jobs handed to one participant per grab.
    pub batch_size: usize,
    /// Dedicated background worker threads (the calling thread is extra).
    pub worker_threads: usize,
}

impl Default for CheckQueueConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            worker_threads: 0,
        }
    }
}

impl CheckQueueConfig {
    /// Build a config from a `-par` style parallelism value using the
    /// machine's available cores.
    #[must_use]
    pub fn from_parallelism(parallelism: i32) -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            worker_threads: resolve_worker_threads(parallelism, available_cores()),
        }
    }

    /// Build a config from `OMNI_CHECKQUEUE_PAR` / `OMNI_CHECKQUEUE_BATCH_SIZE`.
    ///
    /// Missing or unparsable values fall back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let parallelism = env::var(PARALLELISM_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .unwrap_or(DEFAULT_PARALLELISM);
        let batch_size = env::var(BATCH_SIZE_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_BATCH_SIZE);

        Self {
            batch_size: normalize_batch_size(batch_size),
            ..Self::from_parallelism(parallelism)
        }
    }

    /// Set the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the dedicated worker count.
    #[must_use]
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }

    /// Check the config is usable.
    ///
    /// # Errors
    ///
    /// Returns [`CheckQueueError::Config`] when `worker_threads` exceeds
    /// [`MAX_WORKER_THREADS`].
    pub fn validate(&self) -> CheckQueueResult<()> {
        if self.worker_threads > MAX_WORKER_THREADS {
            return Err(CheckQueueError::Config(format!(
                "worker_threads={} exceeds maximum of {MAX_WORKER_THREADS}",
                self.worker_threads
            )));
        }
        Ok(())
    }
}

/// Resolve a `-par` style parallelism value into a dedicated worker count.
///
/// The calling thread takes part in every round, so it is subtracted from the
/// total. The result is clamped to `0..=MAX_WORKER_THREADS`.
#[must_use]
pub fn resolve_worker_threads(parallelism: i32, num_cores: usize) -> usize {
    let cores = i64::try_from(num_cores).unwrap_or(i64::MAX);
    let mut total = i64::from(parallelism);
    if total <= 0 {
        total += cores;
    }
    let workers = (total - 1).max(0);
    usize::try_from(workers)
        .unwrap_or(usize::MAX)
        .min(MAX_WORKER_THREADS)
}

pub(crate) fn normalize_batch_size(batch_size: usize) -> usize {
    batch_size.max(1)
}

fn available_cores() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_detect_leaves_room_for_caller() {
        assert_eq!(resolve_worker_threads(0, 8), 7);
        assert_eq!(resolve_worker_threads(0, 1), 0);
    }

    #[test]
    fn test_negative_leaves_cores_free() {
        assert_eq!(resolve_worker_threads(-2, 8), 5);
        assert_eq!(resolve_worker_threads(-16, 8), 0);
    }

    #[test]
    fn test_positive_counts_caller() {
        assert_eq!(resolve_worker_threads(1, 64), 0);
        assert_eq!(resolve_worker_threads(4, 2), 3);
    }

    #[test]
    fn test_clamped_to_maximum() {
        assert_eq!(resolve_worker_threads(0, 128), MAX_WORKER_THREADS);
        assert_eq!(resolve_worker_threads(100, 4), MAX_WORKER_THREADS);
    }

    #[test]
    fn test_zero_batch_size_normalized() {
        assert_eq!(normalize_batch_size(0), 1);
        assert_eq!(normalize_batch_size(16), 16);
    }
}
