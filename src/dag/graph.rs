// src/dag/graph.rs

use std::collections::HashMap;

use crate::registry::{Registry, TaskName};

/// Internal node structure: stores immediate deps, dependents, and the
/// registration index used for deterministic ordering.
#[derive(Debug, Clone)]
struct GraphNode {
    /// Direct dependencies: tasks that must complete before this one runs.
    deps: Vec<TaskName>,
    /// Direct dependents: tasks that depend on this one.
    dependents: Vec<TaskName>,
    /// Registration order index (tie-break for the topological sort).
    order: usize,
}

/// Derived, in-memory dependency graph keyed by task name.
///
/// An edge `dep -> task` means "dep must complete before task runs". The
/// graph is never stored in configuration; it is rebuilt from the registry
/// (or, in tests, from raw edge lists) whenever the scheduler needs it.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    nodes: HashMap<TaskName, GraphNode>,
}

impl TaskGraph {
    /// Build a graph from a registry.
    pub fn from_registry(registry: &Registry) -> Self {
        let mut graph = Self::default();
        for task in registry.tasks() {
            graph.insert(task.name().to_string(), task.deps().to_vec());
        }
        graph
    }

    /// Build a graph from `(name, deps)` pairs, in the given order.
    ///
    /// Unlike the registry, this performs no forward-reference or cycle
    /// checks; the scheduler's [`super::plan`] is responsible for rejecting
    /// cycles. Used by config validation helpers and tests.
    pub fn from_edges<N, D>(edges: impl IntoIterator<Item = (N, Vec<D>)>) -> Self
    where
        N: Into<TaskName>,
        D: Into<TaskName>,
    {
        let mut graph = Self::default();
        for (name, deps) in edges {
            graph.insert(name.into(), deps.into_iter().map(Into::into).collect());
        }
        graph
    }

    fn insert(&mut self, name: TaskName, deps: Vec<TaskName>) {
        let order = self.nodes.len();

        for dep in &deps {
            if let Some(dep_node) = self.nodes.get_mut(dep) {
                dep_node.dependents.push(name.clone());
            }
        }

        // Dependents pointing at a not-yet-inserted node are patched up here.
        let mut dependents = Vec::new();
        for (other_name, other) in self.nodes.iter() {
            if other.deps.contains(&name) {
                dependents.push(other_name.clone());
            }
        }

        self.nodes.insert(
            name,
            GraphNode {
                deps,
                dependents,
                order,
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All task names.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Registration order index of a task, if present.
    pub fn order_of(&self, name: &str) -> Option<usize> {
        self.nodes.get(name).map(|n| n.order)
    }
}
