// src/registry.rs

//! Task registry: named units of build work with declared dependencies and
//! an async action.
//!
//! The registry is an explicit value owned by the orchestrator; there is no
//! ambient global. Tasks are immutable once registered.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::{PipewrightError, Result};

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Completion signal of a task action.
pub type ActionFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// A task action: called once per scheduler run, produces a completion
/// future. Shared via `Arc` so the scheduler can execute actions on spawned
/// tokio tasks.
pub type TaskAction = dyn Fn() -> ActionFuture + Send + Sync;

/// A registered task.
#[derive(Clone)]
pub struct Task {
    name: TaskName,
    deps: Vec<TaskName>,
    /// Position in registration order; used as the deterministic tie-break
    /// in the scheduler's topological sort.
    order: usize,
    action: Arc<TaskAction>,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl Task {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct dependencies, in declared order.
    pub fn deps(&self) -> &[TaskName] {
        &self.deps
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn action(&self) -> Arc<TaskAction> {
        Arc::clone(&self.action)
    }
}

/// In-memory task registry.
#[derive(Debug, Default)]
pub struct Registry {
    tasks: HashMap<TaskName, Task>,
    /// Task names in registration order.
    order: Vec<TaskName>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task.
    ///
    /// Fails with [`PipewrightError::DuplicateTask`] if the name is taken,
    /// [`PipewrightError::UnknownDependency`] if any dependency has not been
    /// registered yet (this also covers self-reference, since the task
    /// cannot exist before its own registration), and
    /// [`PipewrightError::DuplicateDependency`] for repeated entries.
    ///
    /// A failed registration leaves the registry unchanged.
    pub fn register<A>(&mut self, name: impl Into<TaskName>, deps: Vec<TaskName>, action: A) -> Result<()>
    where
        A: Fn() -> ActionFuture + Send + Sync + 'static,
    {
        let name = name.into();

        if self.tasks.contains_key(&name) {
            return Err(PipewrightError::DuplicateTask(name));
        }

        for (i, dep) in deps.iter().enumerate() {
            if !self.tasks.contains_key(dep) {
                return Err(PipewrightError::UnknownDependency {
                    task: name,
                    dependency: dep.clone(),
                });
            }
            if deps[..i].contains(dep) {
                return Err(PipewrightError::DuplicateDependency {
                    task: name,
                    dependency: dep.clone(),
                });
            }
        }

        let task = Task {
            name: name.clone(),
            deps,
            order: self.order.len(),
            action: Arc::new(action),
        };

        self.tasks.insert(name.clone(), task);
        self.order.push(name);
        Ok(())
    }

    /// Look up a task by name.
    pub fn get(&self, name: &str) -> Result<&Task> {
        self.tasks
            .get(name)
            .ok_or_else(|| PipewrightError::TaskNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Task names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Tasks in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|name| self.tasks.get(name))
    }
}
