//! Mutex-guarded queue state.

use std::collections::VecDeque;

/// Outcome of executing one grabbed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BatchOutcome {
    pub(crate) executed: usize,
    pub(crate) failed: usize,
    pub(crate) panicked: usize,
}

impl BatchOutcome {
    pub(crate) fn ok(&self) -> bool {
        self.failed == 0
    }
}

/// Everything guarded by the queue mutex.
#[derive(Debug)]
pub(crate) struct QueueState<J> {
    /// Submitted jobs not yet handed to a participant.
    pub(crate) pending: VecDeque<J>,
    /// Jobs added to the current round minus jobs completed.
    pub(crate) todo: usize,
    /// AND of every outcome reported in the current round.
    pub(crate) all_ok: bool,
    pub(crate) shutting_down: bool,
    pub(crate) batch_size: usize,
    /// Threads currently inside the execution loop.
    pub(crate) participants: usize,
    /// Participants blocked waiting for work.
    pub(crate) idle: usize,
    pub(crate) rounds_completed: u64,
    pub(crate) jobs_executed: u64,
    pub(crate) jobs_failed: u64,
    pub(crate) jobs_panicked: u64,
}

impl<J> QueueState<J> {
    pub(crate) fn new(batch_size: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            todo: 0,
            all_ok: true,
            shutting_down: false,
            batch_size,
            participants: 0,
            idle: 0,
            rounds_completed: 0,
            jobs_executed: 0,
            jobs_failed: 0,
            jobs_panicked: 0,
        }
    }

    /// Number of jobs the next grab should take.
    ///
    /// Near the end of a round the pending jobs are spread over every
    /// participant (idle ones weighted twice) instead of letting the first
    /// grabber take a full batch.
    pub(crate) fn grab_size(&self) -> usize {
        let share = self.pending.len() / (self.participants + self.idle + 1);
        share.min(self.batch_size).max(1).min(self.pending.len())
    }

    /// Remove the next batch from the front of `pending`.
    pub(crate) fn take_batch(&mut self) -> Vec<J> {
        let n = self.grab_size();
        self.pending.drain(..n).collect()
    }

    pub(crate) fn push(&mut self, jobs: Vec<J>) {
        self.todo += jobs.len();
        self.pending.extend(jobs);
    }

    /// Account for an executed batch. Returns `true` when the round drained.
    pub(crate) fn report(&mut self, outcome: BatchOutcome) -> bool {
        debug_assert!(outcome.executed <= self.todo, "reported more jobs than queued");
        self.todo -= outcome.executed;
        self.all_ok &= outcome.ok();
        self.jobs_executed += outcome.executed as u64;
        self.jobs_failed += outcome.failed as u64;
        self.jobs_panicked += outcome.panicked as u64;
        self.todo == 0
    }

    /// Reset the per-round aggregate for a fresh round.
    pub(crate) fn open_round(&mut self) {
        debug_assert_eq!(self.todo, 0, "previous round left unfinished jobs");
        self.all_ok = true;
    }

    /// Close a drained round, returning its aggregate.
    pub(crate) fn close_round(&mut self) -> bool {
        debug_assert!(self.pending.is_empty() && self.todo == 0);
        let all_ok = self.all_ok;
        self.all_ok = true;
        self.rounds_completed += 1;
        all_ok
    }
}
