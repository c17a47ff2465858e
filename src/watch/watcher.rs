// src/watch/watcher.rs

use std::path::PathBuf;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info};

use crate::watch::dispatcher::BindingWorker;
use crate::watch::patterns::CompiledBinding;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher that observes `root` recursively and triggers
/// the worker of every binding whose pattern set matches a changed path.
///
/// `bindings` and `workers` are index-aligned.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    bindings: Vec<CompiledBinding>,
    workers: Vec<BindingWorker>,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so we have a stable base path to strip from event
    // paths.
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        {
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Err(err) = event_tx.send(event) {
                        // tracing isn't reliably usable inside the notify
                        // callback; fall back to stderr.
                        eprintln!("pipewright: failed to forward notify event: {err}");
                    }
                }
                Err(err) => {
                    eprintln!("pipewright: file watch error: {err}");
                }
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!(root = %root.display(), "file watcher started");

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            // Only content-affecting events qualify: create, modify, remove.
            if matches!(event.kind, EventKind::Access(_)) {
                continue;
            }

            debug!(?event, "received notify event");

            for path in &event.paths {
                let Ok(rel) = path.strip_prefix(&root) else {
                    continue;
                };
                let rel_str = rel.to_string_lossy().replace('\\', "/");

                for (binding, worker) in bindings.iter().zip(workers.iter()) {
                    if binding.matches(&rel_str) {
                        debug!(
                            binding = binding.label(),
                            path = %rel_str,
                            "path matched binding; triggering"
                        );
                        worker.trigger();
                    }
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
