//! Error types for check queue lifecycle operations.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.
//! A `false` verification aggregate is a result, never an error.

use thiserror::Error;

/// Result alias for check queue operations.
pub type CheckQueueResult<T> = Result<T, CheckQueueError>;

/// Error types for queue lifecycle and configuration.
#[derive(Error, Debug)]
pub enum CheckQueueError {
    /// `start_workers` was called on a queue that already has a worker pool.
    #[error("worker threads already started ({0} running)")]
    AlreadyStarted(usize),

    /// `start_workers` was called after `stop_workers`; shutdown is one-way.
    #[error("check queue is shut down")]
    ShutDown,

    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}
