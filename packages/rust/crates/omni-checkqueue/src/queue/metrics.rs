use serde::Serialize;

use crate::job::Job;

use super::CheckQueue;

/// Point-in-time view of a queue's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckQueueMetrics {
    /// Dedicated background threads currently owned by the queue.
    pub worker_threads: usize,
    /// Current maximum batch size.
    pub batch_size: usize,
    /// Jobs waiting to be grabbed.
    pub pending: usize,
    /// Jobs in the open round not yet completed.
    pub todo: usize,
    /// Participants blocked waiting for work.
    pub idle: usize,
    /// Rounds drained since creation.
    pub rounds_completed: u64,
    /// Jobs executed since creation.
    pub jobs_executed: u64,
    /// Jobs that returned `false` (panics included).
    pub jobs_failed: u64,
    /// Jobs that panicked.
    pub jobs_panicked: u64,
    /// Whether `stop_workers` has been called.
    pub shutting_down: bool,
}

impl<J: Job> CheckQueue<J> {
    /// Snapshot the queue counters.
    pub fn metrics(&self) -> CheckQueueMetrics {
        let worker_threads = self.worker_threads();
        let state = self.shared.lock();
        CheckQueueMetrics {
            worker_threads,
            batch_size: state.batch_size,
            pending: state.pending.len(),
            todo: state.todo,
            idle: state.idle,
            rounds_completed: state.rounds_completed,
            jobs_executed: state.jobs_executed,
            jobs_failed: state.jobs_failed,
            jobs_panicked: state.jobs_panicked,
            shutting_down: state.shutting_down,
        }
    }
}
