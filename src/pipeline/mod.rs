// src/pipeline/mod.rs

//! File pipeline runner: read a set of files matching a glob pattern, apply
//! a chain of transform steps to each file's content, write the results
//! under an output directory preserving relative structure.
//!
//! - [`glob`] compiles input patterns and enumerates matching files.
//! - [`step`] defines the [`step::PipelineStep`] capability and the external
//!   tool step shipped with the crate.
//! - [`runner`] drives the read -> transform -> write flow with the per-file
//!   error-capture policy: one file's failure is logged and skipped while
//!   sibling files continue.

pub mod glob;
pub mod runner;
pub mod step;

pub use glob::{build_globset, InputPattern, MatchedFile};
pub use runner::{run_pipeline, PipelineReport};
pub use step::{PipelineStep, SourceFile, StepFuture, ToolStep};
