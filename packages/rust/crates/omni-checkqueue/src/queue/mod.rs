//! The check queue: pending jobs, a fixed worker pool, and the
//! single-controller slot.

mod metrics;
pub(crate) mod runtime;
mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread::{self, JoinHandle};

use crate::config::{CheckQueueConfig, normalize_batch_size};
use crate::control::CheckQueueControl;
use crate::error::{CheckQueueError, CheckQueueResult};
use crate::job::Job;

pub use metrics::CheckQueueMetrics;
use runtime::{Role, Shared};

/// A queue of verification jobs shared by a worker pool and one controller.
///
/// The queue is an owned object, not a process singleton: create one per
/// validation subsystem (or per test) and hand out references. Rounds are
/// driven through [`CheckQueueControl`].
///
/// # Example
///
/// ```rust
/// use omni_checkqueue::CheckQueue;
///
/// let queue = CheckQueue::new(16);
/// queue.start_workers(2)?;
///
/// let mut control = queue.control();
/// control.add((0..100).map(|i| move || i != 42).collect());
/// assert!(!control.wait());
/// drop(control);
///
/// queue.stop_workers();
/// # Ok::<(), omni_checkqueue::CheckQueueError>(())
/// ```
pub struct CheckQueue<J: Job> {
    shared: Arc<Shared<J>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    control_slot: Mutex<()>,
}

impl<J: Job> CheckQueue<J> {
    /// Create a queue handing out at most `batch_size` jobs per grab.
    ///
    /// No threads are started; see [`CheckQueue::start_workers`].
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self {
            shared: Arc::new(Shared::new(normalize_batch_size(batch_size))),
            workers: Mutex::new(Vec::new()),
            control_slot: Mutex::new(()),
        }
    }

    /// Create a queue and start the configured worker pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or a thread fails to spawn.
    pub fn with_config(config: &CheckQueueConfig) -> CheckQueueResult<Self> {
        config.validate()?;
        let queue = Self::new(config.batch_size);
        queue.start_workers(config.worker_threads)?;
        Ok(queue)
    }

    /// Change the maximum batch size for subsequent grabs.
    pub fn configure(&self, batch_size: usize) {
        self.shared.lock().batch_size = normalize_batch_size(batch_size);
    }

    /// Current maximum batch size.
    pub fn batch_size(&self) -> usize {
        self.shared.lock().batch_size
    }

    /// Number of background worker threads.
    pub fn worker_threads(&self) -> usize {
        self.lock_workers().len()
    }

    /// Spawn `count` background threads running the shared execution loop.
    ///
    /// # Errors
    ///
    /// - [`CheckQueueError::AlreadyStarted`] if workers are already running.
    /// - [`CheckQueueError::ShutDown`] after [`CheckQueue::stop_workers`].
    /// - [`CheckQueueError::Spawn`] if the OS refuses a thread; threads
    ///   spawned before the failure keep running and are joined on stop.
    pub fn start_workers(&self, count: usize) -> CheckQueueResult<()> {
        let mut workers = self.lock_workers();
        if self.shared.lock().shutting_down {
            return Err(CheckQueueError::ShutDown);
        }
        if !workers.is_empty() {
            return Err(CheckQueueError::AlreadyStarted(workers.len()));
        }

        for index in 0..count {
            let shared = Arc::clone(&self.shared);
            let handle = thread::Builder::new()
                .name(format!("checkqueue.{index}"))
                .spawn(move || {
                    shared.run_loop(Role::Worker);
                })?;
            workers.push(handle);
        }

        tracing::info!(
            workers = count,
            batch_size = self.shared.lock().batch_size,
            "check queue worker pool started"
        );
        Ok(())
    }

    /// Stop and join every worker thread. One-way: the pool cannot be
    /// restarted, though controls still drain rounds on the calling thread.
    pub fn stop_workers(&self) {
        let handles: Vec<_> = {
            let mut workers = self.lock_workers();
            self.shared.request_shutdown();
            workers.drain(..).collect()
        };
        if handles.is_empty() {
            return;
        }

        let count = handles.len();
        for handle in handles {
            if let Err(error) = handle.join() {
                tracing::error!("check queue worker crashed: {error:?}");
            }
        }
        tracing::info!(workers = count, "check queue worker pool stopped");
    }

    /// Open a round, blocking while another control is open.
    pub fn control(&self) -> CheckQueueControl<'_, J> {
        let slot = self
            .control_slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        CheckQueueControl::open(self, slot)
    }

    /// Open a round if no other control is open.
    pub fn try_control(&self) -> Option<CheckQueueControl<'_, J>> {
        let slot = match self.control_slot.try_lock() {
            Ok(slot) => slot,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return None,
        };
        Some(CheckQueueControl::open(self, slot))
    }

    pub(crate) fn shared(&self) -> &Shared<J> {
        &self.shared
    }

    fn lock_workers(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<J: Job> Drop for CheckQueue<J> {
    fn drop(&mut self) {
        self.stop_workers();
    }
}
