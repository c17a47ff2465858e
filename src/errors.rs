// src/errors.rs

//! Crate-wide error taxonomy and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipewrightError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A task with this name is already registered.
    #[error("Task already registered: {0}")]
    DuplicateTask(String),

    /// A dependency list references a task that has not been registered yet.
    /// Forward references are disallowed: dependencies must be registered
    /// before their dependents.
    #[error("Task '{task}' references unknown dependency '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    /// A dependency list names the same task more than once.
    #[error("Task '{task}' lists dependency '{dependency}' more than once")]
    DuplicateDependency { task: String, dependency: String },

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// The dependency graph restricted to the target's closure contains a
    /// cycle. The vector names the cycle members in path order.
    #[error("Cycle detected in task graph: {}", .0.join(" -> "))]
    CycleDetected(Vec<String>),

    /// A task action failed; fatal to the current run.
    #[error("Task '{task}' failed")]
    TaskFailed {
        task: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PipewrightError>;
