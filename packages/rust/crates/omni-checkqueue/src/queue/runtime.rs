//! Shared execution loop.
//!
//! Background workers and the thread calling `wait` run the same loop; the
//! only difference is when they leave it. Workers leave on shutdown, the
//! master leaves once its round has drained.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::job::{Job, invoke_guarded};

use super::state::{BatchOutcome, QueueState};

/// Which participant is running the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    /// Background pool thread.
    Worker,
    /// The thread that opened the round, inside `wait`.
    Master,
}

/// Result of one grab.
pub(crate) enum Grab<J> {
    /// Jobs to execute.
    Batch(Vec<J>),
    /// Master only: the round drained with this aggregate.
    Drained(bool),
    /// Worker only: the queue is shutting down.
    Shutdown,
}

/// Queue state plus its one condition variable.
///
/// The condvar serves both "work available" and "round complete" wake-ups.
pub(crate) struct Shared<J> {
    state: Mutex<QueueState<J>>,
    cond: Condvar,
}

impl<J: Job> Shared<J> {
    pub(crate) fn new(batch_size: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::new(batch_size)),
            cond: Condvar::new(),
        }
    }

    /// Lock the state. Jobs never run under the lock, so a poisoned mutex
    /// still holds consistent state.
    pub(crate) fn lock(&self) -> MutexGuard<'_, QueueState<J>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append jobs to the current round and wake sleeping participants.
    pub(crate) fn push(&self, jobs: Vec<J>) {
        let count = jobs.len();
        if count == 0 {
            return;
        }
        self.lock().push(jobs);
        if count == 1 {
            self.cond.notify_one();
        } else {
            self.cond.notify_all();
        }
    }

    /// Mark the queue as shutting down and wake every blocked participant.
    pub(crate) fn request_shutdown(&self) {
        self.lock().shutting_down = true;
        self.cond.notify_all();
    }

    /// Block until there is work for `role`, then take a batch.
    pub(crate) fn grab_batch(&self, role: Role) -> Grab<J> {
        let mut state = self.lock();
        loop {
            if role == Role::Worker && state.shutting_down {
                return Grab::Shutdown;
            }
            if !state.pending.is_empty() {
                return Grab::Batch(state.take_batch());
            }
            if role == Role::Master && state.todo == 0 {
                return Grab::Drained(state.close_round());
            }
            state.idle += 1;
            state = self.cond.wait(state).unwrap_or_else(PoisonError::into_inner);
            state.idle -= 1;
        }
    }

    /// Account for an executed batch, waking the master when the round drains.
    pub(crate) fn report(&self, outcome: BatchOutcome) {
        let drained = self.lock().report(outcome);
        if drained {
            self.cond.notify_all();
        }
    }

    /// Run batches until the role's exit condition holds.
    ///
    /// Returns the round aggregate for [`Role::Master`]; workers get `true`.
    pub(crate) fn run_loop(&self, role: Role) -> bool {
        self.lock().participants += 1;
        let result = loop {
            match self.grab_batch(role) {
                Grab::Batch(batch) => {
                    let outcome = execute_batch(batch);
                    tracing::trace!(
                        ?role,
                        batch = outcome.executed,
                        ok = outcome.ok(),
                        "check batch executed"
                    );
                    self.report(outcome);
                }
                Grab::Drained(all_ok) => break all_ok,
                Grab::Shutdown => break true,
            }
        };
        self.lock().participants -= 1;
        result
    }
}

/// Run every job in the batch; a failure never skips the rest.
///
/// Each job is consumed by the guard, so it is invoked and dropped outside the
/// lock and a panic in either still counts towards the report.
fn execute_batch<J: Job>(batch: Vec<J>) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for job in batch {
        let (ok, panicked) = invoke_guarded(job);
        outcome.executed += 1;
        if !ok {
            outcome.failed += 1;
        }
        if panicked {
            outcome.panicked += 1;
        }
    }
    outcome
}
