// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::GlobSet;

use crate::pipeline::glob::build_globset;
use crate::registry::TaskName;

/// A watch binding: one or more input patterns mapped to the tasks to
/// re-run when a path under any of those patterns changes.
///
/// Active only while a watch session is running; derived from config at
/// session start and dropped with the session.
#[derive(Debug, Clone)]
pub struct WatchBinding {
    /// Label for logs (the pipeline group name).
    pub label: String,
    /// Project-root-relative glob patterns.
    pub patterns: Vec<String>,
    /// Tasks to run, in order, when a pattern matches.
    pub tasks: Vec<TaskName>,
}

/// Compiled glob patterns for a single binding.
#[derive(Clone)]
pub struct CompiledBinding {
    label: String,
    set: GlobSet,
    tasks: Vec<TaskName>,
}

impl fmt::Debug for CompiledBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledBinding")
            .field("label", &self.label)
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

impl CompiledBinding {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tasks(&self) -> &[TaskName] {
        &self.tasks
    }

    /// Returns true if this binding is interested in the given path
    /// (relative to the project root, `/`-separated).
    pub fn matches(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }
}

/// Compile each binding's pattern list into a `GlobSet`.
pub fn compile_bindings(bindings: &[WatchBinding]) -> Result<Vec<CompiledBinding>> {
    let mut compiled = Vec::with_capacity(bindings.len());

    for binding in bindings {
        let set = build_globset(&binding.patterns)
            .with_context(|| format!("building watch globset for binding '{}'", binding.label))?;

        compiled.push(CompiledBinding {
            label: binding.label.clone(),
            set,
            tasks: binding.tasks.clone(),
        });
    }

    Ok(compiled)
}
