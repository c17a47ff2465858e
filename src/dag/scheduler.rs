// src/dag/scheduler.rs

//! Dependency scheduler.
//!
//! [`plan`] resolves the transitive dependency closure of a target task,
//! rejects cycles, and produces a stable topological order. [`run`] executes
//! that order, dispatching tasks as their dependencies complete and letting
//! independent tasks run concurrently.

use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::dag::graph::TaskGraph;
use crate::errors::{PipewrightError, Result};
use crate::registry::{Registry, TaskName};

/// Summary of a completed scheduler run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Tasks whose actions were dispatched, in dispatch order.
    pub executed: Vec<TaskName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the current DFS path; seeing this again means a cycle.
    InProgress,
    Done,
}

/// Compute the execution order for `target`: the transitive closure of its
/// dependencies in a stable topological order, ties broken by insertion
/// (registration) order.
///
/// Fails with [`PipewrightError::CycleDetected`] naming the cycle members if
/// the closure contains a cycle, and with [`PipewrightError::TaskNotFound`]
/// if `target` or any reachable dependency is missing from the graph. No
/// action runs as part of planning.
pub fn plan(graph: &TaskGraph, target: &str) -> Result<Vec<TaskName>> {
    let mut marks: HashMap<TaskName, Mark> = HashMap::new();
    let mut path: Vec<TaskName> = Vec::new();
    let mut closure: Vec<TaskName> = Vec::new();

    visit(graph, target, &mut marks, &mut path, &mut closure)?;

    Ok(stable_topo_order(graph, &closure))
}

/// Depth-first traversal collecting the closure and detecting cycles via the
/// in-progress marker.
fn visit(
    graph: &TaskGraph,
    name: &str,
    marks: &mut HashMap<TaskName, Mark>,
    path: &mut Vec<TaskName>,
    closure: &mut Vec<TaskName>,
) -> Result<()> {
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::InProgress) => {
            let start = path.iter().position(|p| p == name).unwrap_or(0);
            return Err(PipewrightError::CycleDetected(path[start..].to_vec()));
        }
        None => {}
    }

    if !graph.contains(name) {
        return Err(PipewrightError::TaskNotFound(name.to_string()));
    }

    marks.insert(name.to_string(), Mark::InProgress);
    path.push(name.to_string());

    for dep in graph.dependencies_of(name).to_vec() {
        visit(graph, &dep, marks, path, closure)?;
    }

    path.pop();
    marks.insert(name.to_string(), Mark::Done);
    closure.push(name.to_string());

    Ok(())
}

/// Kahn-style topological sort restricted to the closure, always picking the
/// ready node with the smallest registration index so the order is
/// reproducible across runs.
fn stable_topo_order(graph: &TaskGraph, closure: &[TaskName]) -> Vec<TaskName> {
    let member: HashSet<&str> = closure.iter().map(|s| s.as_str()).collect();
    let mut placed: HashSet<&str> = HashSet::new();
    let mut order: Vec<TaskName> = Vec::with_capacity(closure.len());

    while order.len() < closure.len() {
        let next = closure
            .iter()
            .filter(|name| !placed.contains(name.as_str()))
            .filter(|name| {
                graph
                    .dependencies_of(name)
                    .iter()
                    .filter(|dep| member.contains(dep.as_str()))
                    .all(|dep| placed.contains(dep.as_str()))
            })
            .min_by_key(|name| graph.order_of(name).unwrap_or(usize::MAX));

        match next {
            Some(name) => {
                placed.insert(name.as_str());
                order.push(name.clone());
            }
            // Unreachable after cycle detection; bail rather than spin.
            None => break,
        }
    }

    order
}

/// Run `target` and all of its transitive dependencies.
///
/// Each task's action runs exactly once per invocation even when reachable
/// via multiple paths. Dependents are dispatched only after their
/// dependencies' actions complete successfully; independent tasks run
/// concurrently on the tokio runtime.
///
/// On the first action failure the scheduler stops dispatching, lets
/// already-running tasks finish (no mid-task abort), and returns
/// [`PipewrightError::TaskFailed`] for the task that failed first. No
/// retries, no partial recovery.
pub async fn run(registry: &Registry, target: &str) -> Result<RunReport> {
    registry.get(target)?;

    let graph = TaskGraph::from_registry(registry);
    let order = plan(&graph, target)?;

    debug!(task = %target, planned = ?order, "scheduler: planned execution order");

    let mut pending: Vec<TaskName> = order;
    let mut done: HashSet<TaskName> = HashSet::new();
    let mut running: JoinSet<(TaskName, anyhow::Result<()>)> = JoinSet::new();
    let mut report = RunReport::default();
    let mut failure: Option<PipewrightError> = None;

    loop {
        if failure.is_none() {
            // Decide first, then dispatch, keeping the planned order.
            let mut still_pending = Vec::with_capacity(pending.len());
            for name in pending.drain(..) {
                let ready = graph
                    .dependencies_of(&name)
                    .iter()
                    .all(|dep| done.contains(dep));

                if !ready {
                    still_pending.push(name);
                    continue;
                }

                let action = registry.get(&name)?.action();
                let task_name = name.clone();
                debug!(task = %task_name, "scheduler: dependencies satisfied; dispatching");
                running.spawn(async move {
                    let result = (action)().await;
                    (task_name, result)
                });
                report.executed.push(name);
            }
            pending = still_pending;
        } else {
            // Abort the remaining schedule: nothing new is dispatched, but
            // running siblings are awaited below.
            pending.clear();
        }

        let Some(joined) = running.join_next().await else {
            break;
        };

        match joined {
            Ok((name, Ok(()))) => {
                info!(task = %name, "task completed");
                done.insert(name);
            }
            Ok((name, Err(err))) => {
                if failure.is_none() {
                    error!(task = %name, error = %err, "task failed; aborting remaining schedule");
                    failure = Some(PipewrightError::TaskFailed {
                        task: name,
                        source: err,
                    });
                } else {
                    warn!(task = %name, error = %err, "sibling task failed after abort");
                }
            }
            Err(join_err) => {
                if failure.is_none() {
                    failure = Some(PipewrightError::Other(anyhow!(
                        "task panicked: {join_err}"
                    )));
                }
            }
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(report),
    }
}
