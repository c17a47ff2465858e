// src/dag/mod.rs

//! Dependency graph and scheduling.
//!
//! - [`graph`] holds the derived directed graph over task names.
//! - [`scheduler`] plans a stable topological order for a target task and
//!   executes it, parallelizing independent tasks.

pub mod graph;
pub mod scheduler;

pub use graph::TaskGraph;
pub use scheduler::{plan, run, RunReport};
