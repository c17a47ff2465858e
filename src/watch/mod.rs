// src/watch/mod.rs

//! Watch dispatcher: maps filesystem change events on bound glob patterns to
//! the tasks to re-run.
//!
//! - [`patterns`] compiles bindings (patterns -> task names) into glob sets.
//! - [`dispatcher`] owns the per-binding worker that serialises re-runs:
//!   a change arriving while a run is in flight is queued (coalesced), never
//!   run concurrently with it, so two reruns can't race writes to the same
//!   output path. Distinct bindings run concurrently.
//! - [`watcher`] owns the `notify` filesystem watcher and forwards matching
//!   events to binding workers.

pub mod dispatcher;
pub mod patterns;
pub mod watcher;

pub use dispatcher::{start_watch_session, BindingWorker, WatchSession};
pub use patterns::{compile_bindings, CompiledBinding, WatchBinding};
pub use watcher::WatcherHandle;
