//! Tests for structured log events emitted by the queue.

#![allow(missing_docs)]

use std::io;
use std::sync::{Arc, Mutex};

use omni_checkqueue::CheckQueue;
use tracing_subscriber::fmt::writer::MakeWriter;

#[derive(Clone, Default)]
struct SharedLogBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedLogBuffer {
    fn as_string(&self) -> String {
        match self.inner.lock() {
            Ok(guard) => String::from_utf8_lossy(&guard).to_string(),
            Err(_) => String::new(),
        }
    }
}

struct SharedLogWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for SharedLogBuffer {
    type Writer = SharedLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SharedLogWriter {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl io::Write for SharedLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut guard) = self.inner.lock() {
            guard.extend_from_slice(buf);
            Ok(buf.len())
        } else {
            Err(io::Error::other("failed to lock shared log buffer"))
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_logs() -> (SharedLogBuffer, tracing::subscriber::DefaultGuard) {
    let logs = SharedLogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(logs.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

fn pass() -> bool {
    true
}

fn fail() -> bool {
    false
}

fn malformed() -> bool {
    panic!("truncated signature")
}

// Subscribers set with `set_default` are thread-local, so these rounds run
// with no workers and every job executes on the test thread.

#[test]
fn test_panicking_job_is_logged() {
    let (logs, _guard) = capture_logs();

    let queue: CheckQueue<fn() -> bool> = CheckQueue::new(4);
    let mut control = queue.control();
    control.add(vec![pass as fn() -> bool, malformed]);
    assert!(!control.wait());

    let output = logs.as_string();
    assert!(output.contains("check job panicked"));
    assert!(output.contains("truncated signature"));
}

#[test]
fn test_round_lifecycle_is_logged() {
    let (logs, _guard) = capture_logs();

    let queue: CheckQueue<fn() -> bool> = CheckQueue::new(4);
    {
        let mut control = queue.control();
        control.add_one(fail);
    }

    let output = logs.as_string();
    assert!(output.contains("check round opened"));
    assert!(output.contains("check round completed"));
    assert!(output.contains("jobs=1"));
    assert!(output.contains("all_ok=false"));
}

#[test]
fn test_worker_pool_lifecycle_is_logged() -> anyhow::Result<()> {
    let (logs, _guard) = capture_logs();

    let queue: CheckQueue<fn() -> bool> = CheckQueue::new(32);
    queue.start_workers(2)?;
    queue.stop_workers();

    let output = logs.as_string();
    assert!(output.contains("check queue worker pool started"));
    assert!(output.contains("workers=2"));
    assert!(output.contains("batch_size=32"));
    assert!(output.contains("check queue worker pool stopped"));
    Ok(())
}
