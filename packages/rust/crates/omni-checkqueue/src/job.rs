//! The unit of verification work.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// A single verification check executed by the queue.
///
/// Jobs from one round run concurrently on different threads, so any shared
/// state a job touches must be synchronized by the job itself. Jobs are moved
/// into the queue and dropped after they run.
pub trait Job: Send + 'static {
    /// Run the check and return its outcome.
    fn invoke(&mut self) -> bool;
}

impl<F> Job for F
where
    F: FnMut() -> bool + Send + 'static,
{
    fn invoke(&mut self) -> bool {
        self()
    }
}

/// Run and drop a job, converting a panic in either into a `false` outcome.
///
/// The job is consumed so a panicking `Drop` is caught as well. Returns
/// `(outcome, panicked)`.
pub(crate) fn invoke_guarded<J: Job>(mut job: J) -> (bool, bool) {
    match catch_unwind(AssertUnwindSafe(move || {
        let outcome = job.invoke();
        drop(job);
        outcome
    })) {
        Ok(outcome) => (outcome, false),
        Err(payload) => {
            tracing::error!(
                panic = %panic_message(payload.as_ref()),
                "check job panicked; counting it as failed"
            );
            (false, true)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
