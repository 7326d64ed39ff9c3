//! RAII handle for one verification round.

use std::sync::MutexGuard;

use crate::job::{Job, invoke_guarded};
use crate::queue::CheckQueue;
use crate::queue::runtime::Role;

/// Exclusive session handle for one submit-and-wait round on a queue.
///
/// Holding a control keeps the queue's single-controller slot; a second
/// [`CheckQueue::control`] call blocks until this one is dropped. Dropping a
/// control that was never waited on drains the round first, so no added job
/// is ever left unexecuted.
pub struct CheckQueueControl<'a, J: Job> {
    queue: Option<&'a CheckQueue<J>>,
    /// Aggregate of jobs run inline by a detached control.
    inline_ok: bool,
    /// Jobs added since the round was opened.
    added: usize,
    /// Set once the round has drained.
    result: Option<bool>,
    // Dropped after `Drop::drop` has drained the round.
    _slot: Option<MutexGuard<'a, ()>>,
}

impl<'a, J: Job> CheckQueueControl<'a, J> {
    /// Open a round on `queue`, blocking while another control is open.
    pub fn new(queue: &'a CheckQueue<J>) -> Self {
        queue.control()
    }

    /// A control bound to no queue.
    ///
    /// Jobs run inline on the calling thread as they are added; used when
    /// parallel verification is disabled.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            queue: None,
            inline_ok: true,
            added: 0,
            result: None,
            _slot: None,
        }
    }

    /// Open a round on `queue`, or a detached control when `None`.
    pub fn from_option(queue: Option<&'a CheckQueue<J>>) -> Self {
        queue.map_or_else(Self::detached, CheckQueue::control)
    }

    pub(crate) fn open(queue: &'a CheckQueue<J>, slot: MutexGuard<'a, ()>) -> Self {
        queue.shared().lock().open_round();
        tracing::debug!("check round opened");
        Self {
            queue: Some(queue),
            inline_ok: true,
            added: 0,
            result: None,
            _slot: Some(slot),
        }
    }

    /// Whether this control is bound to a queue.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.queue.is_some()
    }

    /// Submit a batch of jobs to the round.
    ///
    /// May be called any number of times before [`CheckQueueControl::wait`].
    pub fn add(&mut self, jobs: Vec<J>) {
        if jobs.is_empty() {
            return;
        }
        debug_assert!(self.result.is_none(), "jobs added after the round drained");
        // Release builds reopen the round so the late jobs still get drained.
        self.result = None;
        self.added += jobs.len();

        match self.queue {
            Some(queue) => queue.shared().push(jobs),
            None => {
                for job in jobs {
                    let (ok, _) = invoke_guarded(job);
                    self.inline_ok &= ok;
                }
            }
        }
    }

    /// Submit a single job.
    pub fn add_one(&mut self, job: J) {
        self.add(vec![job]);
    }

    /// Help execute the round until every added job has run, then return
    /// the AND of all outcomes. Later calls return the same value.
    pub fn wait(&mut self) -> bool {
        if let Some(result) = self.result {
            return result;
        }
        let all_ok = match self.queue {
            Some(queue) => queue.shared().run_loop(Role::Master),
            None => std::mem::replace(&mut self.inline_ok, true),
        };
        tracing::debug!(jobs = self.added, all_ok, "check round completed");
        self.result = Some(all_ok);
        all_ok
    }
}

impl<J: Job> Drop for CheckQueueControl<'_, J> {
    fn drop(&mut self) {
        if self.result.is_none() {
            self.wait();
        }
    }
}
