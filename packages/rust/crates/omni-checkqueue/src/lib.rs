#![allow(clippy::doc_markdown)]

//! omni-checkqueue - Parallel batch verification for Omni DevEnv
//!
//! Runs many independent, CPU-bound checks (signature checks, script checks)
//! across a fixed pool of worker threads and reduces them to a single
//! pass/fail result.
//!
//! # Features
//!
//! - **Fixed worker pool**: `N` background threads plus the calling thread
//! - **Exclusive rounds**: one [`CheckQueueControl`] per queue at a time
//! - **RAII drain**: dropping an unwaited control still runs every job
//! - **Exact accounting**: every job runs once, failures never skip work
//! - **Panic isolation**: a panicking job counts as `false`, workers survive
//!
//! # Architecture (ODF-REP Compliant)
//!
//! ```text
//! omni-checkqueue/src/
//! ├── lib.rs      # Re-exports (this file)
//! ├── error.rs    # CheckQueueError enum (thiserror)
//! ├── job.rs      # Job trait + panic-safe invocation
//! ├── config.rs   # CheckQueueConfig, -par style thread resolution
//! ├── control.rs  # CheckQueueControl (round handle)
//! └── queue/
//!     ├── mod.rs      # CheckQueue lifecycle + controller slot
//!     ├── state.rs    # Mutex-guarded counters and pending jobs
//!     ├── runtime.rs  # Shared worker/master execution loop
//!     └── metrics.rs  # CheckQueueMetrics snapshot
//! ```
//!
//! # Example
//!
//! ```rust
//! use omni_checkqueue::{CheckQueue, CheckQueueConfig};
//!
//! let config = CheckQueueConfig::default()
//!     .with_batch_size(16)
//!     .with_worker_threads(4);
//! let queue = CheckQueue::with_config(&config)?;
//!
//! let ok = {
//!     let mut control = queue.control();
//!     for chunk in 0..3 {
//!         control.add((0..30).map(|i| move || chunk * 30 + i != 47).collect());
//!     }
//!     control.wait()
//! };
//! assert!(!ok);
//! # Ok::<(), omni_checkqueue::CheckQueueError>(())
//! ```

// ============================================================================
// Module Declarations (ODF-REP: Atomic Structure)
// ============================================================================

mod config;
mod control;
mod error;
mod job;
mod queue;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use config::{
    BATCH_SIZE_ENV, CheckQueueConfig, DEFAULT_BATCH_SIZE, DEFAULT_PARALLELISM, MAX_WORKER_THREADS,
    PARALLELISM_ENV, resolve_worker_threads,
};
pub use control::CheckQueueControl;
pub use error::{CheckQueueError, CheckQueueResult};
pub use job::Job;
pub use queue::{CheckQueue, CheckQueueMetrics};
