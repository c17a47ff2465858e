//! Action builders for registry/scheduler tests.
//!
//! These let tests register tasks whose actions record their execution into
//! a shared log instead of touching the filesystem or spawning processes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use pipewright::registry::ActionFuture;

/// Shared, ordered log of events emitted by test actions.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries
            .lock()
            .expect("run log poisoned")
            .push(entry.into());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.entries.lock().expect("run log poisoned").clone()
    }

    /// Index of the first occurrence of `entry`, if any.
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.snapshot().iter().position(|e| e == entry)
    }

    /// Number of occurrences of `entry`.
    pub fn count(&self, entry: &str) -> usize {
        self.snapshot().iter().filter(|e| *e == entry).count()
    }
}

/// An action that appends the task name to the log and succeeds.
pub fn recording_action(
    log: &RunLog,
    name: &str,
) -> impl Fn() -> ActionFuture + Send + Sync + 'static {
    let log = log.clone();
    let name = name.to_string();
    move || {
        let log = log.clone();
        let name = name.clone();
        Box::pin(async move {
            log.record(name);
            Ok(())
        }) as ActionFuture
    }
}

/// An action that records `<name>:start`, sleeps, records `<name>:end`, and
/// succeeds. Useful for serialization assertions.
pub fn sleeping_action(
    log: &RunLog,
    name: &str,
    sleep: Duration,
) -> impl Fn() -> ActionFuture + Send + Sync + 'static {
    let log = log.clone();
    let name = name.to_string();
    move || {
        let log = log.clone();
        let name = name.clone();
        Box::pin(async move {
            log.record(format!("{name}:start"));
            tokio::time::sleep(sleep).await;
            log.record(format!("{name}:end"));
            Ok(())
        }) as ActionFuture
    }
}

/// An action that records the task name and then fails with `message`.
pub fn failing_action(
    log: &RunLog,
    name: &str,
    message: &str,
) -> impl Fn() -> ActionFuture + Send + Sync + 'static {
    let log = log.clone();
    let name = name.to_string();
    let message = message.to_string();
    move || {
        let log = log.clone();
        let name = name.clone();
        let message = message.clone();
        Box::pin(async move {
            log.record(name);
            Err(anyhow!("{message}"))
        }) as ActionFuture
    }
}
