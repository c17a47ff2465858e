// src/watch/dispatcher.rs

//! Per-binding re-run workers and the watch session that ties them to the
//! filesystem watcher.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::dag::scheduler;
use crate::registry::{Registry, TaskName};
use crate::watch::patterns::{compile_bindings, WatchBinding};
use crate::watch::watcher::{spawn_watcher, WatcherHandle};

/// A running watch session: the filesystem watcher plus one worker per
/// binding. Dropping the session stops watching; workers wind down when
/// their trigger channels close.
pub struct WatchSession {
    _watcher: WatcherHandle,
    workers: Vec<BindingWorker>,
}

impl WatchSession {
    pub fn workers(&self) -> &[BindingWorker] {
        &self.workers
    }
}

/// Handle to one binding's worker task.
///
/// The worker serialises re-runs for its binding: the trigger channel has
/// capacity 1 and triggers are delivered with `try_send`, so a change event
/// arriving while a run is executing coalesces into exactly one queued
/// re-run. That re-run starts only after the current one finishes and
/// enumerates files afresh, so it observes the latest state on disk.
///
/// Per binding the state machine is Idle -> Running -> Idle; a failed run
/// only sets the binding's last error, it never stops the session.
#[derive(Debug, Clone)]
pub struct BindingWorker {
    label: String,
    trigger_tx: mpsc::Sender<()>,
    last_error: Arc<Mutex<Option<String>>>,
}

impl BindingWorker {
    /// Spawn the worker task for one binding.
    pub fn spawn(registry: Arc<Registry>, label: String, tasks: Vec<TaskName>) -> Self {
        let (trigger_tx, mut trigger_rx) = mpsc::channel::<()>(1);
        let last_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let worker_label = label.clone();
        let worker_error = Arc::clone(&last_error);

        tokio::spawn(async move {
            while trigger_rx.recv().await.is_some() {
                debug!(binding = %worker_label, "change detected; re-running bound tasks");

                let mut run_error: Option<String> = None;
                for task in &tasks {
                    match scheduler::run(&registry, task).await {
                        Ok(report) => {
                            info!(
                                binding = %worker_label,
                                task = %task,
                                executed = report.executed.len(),
                                "re-run completed"
                            );
                        }
                        Err(err) => {
                            error!(
                                binding = %worker_label,
                                task = %task,
                                error = %err,
                                "re-run failed; watch session continues"
                            );
                            run_error = Some(err.to_string());
                            break;
                        }
                    }
                }

                if let Ok(mut guard) = worker_error.lock() {
                    *guard = run_error;
                }
            }
            debug!(binding = %worker_label, "binding worker finished");
        });

        Self {
            label,
            trigger_tx,
            last_error,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Request a re-run. If one is already running, this queues (at most)
    /// one follow-up; further triggers while the queue slot is occupied are
    /// coalesced into it.
    pub fn trigger(&self) {
        match self.trigger_tx.try_send(()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(())) => {
                debug!(binding = %self.label, "re-run already queued; coalescing trigger");
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                debug!(binding = %self.label, "binding worker gone; dropping trigger");
            }
        }
    }

    /// Error message from the most recent run, if it failed.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|guard| guard.clone())
    }
}

/// Establish filesystem subscriptions for the given bindings and spawn one
/// serialising worker per binding. Runs until the returned session is
/// dropped.
pub fn start_watch_session(
    root: impl Into<PathBuf>,
    bindings: Vec<WatchBinding>,
    registry: Arc<Registry>,
) -> Result<WatchSession> {
    let compiled = compile_bindings(&bindings)?;

    let mut workers = Vec::with_capacity(bindings.len());
    for binding in &bindings {
        workers.push(BindingWorker::spawn(
            Arc::clone(&registry),
            binding.label.clone(),
            binding.tasks.clone(),
        ));
    }

    let watcher = spawn_watcher(root, compiled, workers.clone())?;

    Ok(WatchSession {
        _watcher: watcher,
        workers,
    })
}
