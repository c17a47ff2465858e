// src/pipeline/runner.rs

//! The read -> transform -> write driver for one pipeline invocation.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::pipeline::glob::InputPattern;
use crate::pipeline::step::{PipelineStep, SourceFile};

/// Outcome of one pipeline invocation.
///
/// Per-file step failures are recorded as skips rather than propagated; the
/// invocation as a whole fails only when at least one file matched and none
/// survived the step chain.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Files that made it through every step; paths are output-relative
    /// when the pipeline has an output directory, base-relative otherwise.
    pub succeeded: Vec<PathBuf>,
    /// Files skipped because a step reported an error, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

impl PipelineReport {
    pub fn matched(&self) -> usize {
        self.succeeded.len() + self.skipped.len()
    }
}

/// Run one pipeline: enumerate files matching `input`, apply `steps` in
/// declared order to each file's content, and (when `output` is set) write
/// the results under it, preserving structure relative to the pattern's
/// static base and creating intermediate directories as needed.
///
/// - An empty match set is a no-op success.
/// - A step error for one file is logged and skips that file only; sibling
///   files continue (the per-file "plumber" policy).
/// - Pre-existing unrelated files in the output directory are left alone;
///   removing generated trees is the separate `clean` task's job.
pub async fn run_pipeline(
    task: &str,
    input: &InputPattern,
    steps: &[Box<dyn PipelineStep>],
    output: Option<&Path>,
    rename_ext: Option<&str>,
) -> Result<PipelineReport> {
    let files = input.enumerate()?;
    let mut report = PipelineReport::default();

    if files.is_empty() {
        info!(task, pattern = input.raw(), "no files matched; nothing to do");
        return Ok(report);
    }

    debug!(task, matched = files.len(), "pipeline starting");

    'files: for matched in files {
        let content = match tokio::fs::read(&matched.abs).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(
                    task,
                    file = %matched.rel.display(),
                    error = %err,
                    "failed to read file; skipping"
                );
                report.skipped.push((matched.rel, err.to_string()));
                continue;
            }
        };

        let mut file = SourceFile {
            rel_path: matched.rel.clone(),
            content,
        };

        for step in steps {
            match step.apply(&file).await {
                Ok(content) => file.content = content,
                Err(err) => {
                    warn!(
                        task,
                        file = %file.rel_path.display(),
                        step = step.name(),
                        error = %err,
                        "step failed; skipping file"
                    );
                    report.skipped.push((matched.rel, err.to_string()));
                    continue 'files;
                }
            }
        }

        match output {
            Some(out_root) => {
                let mut dest = out_root.join(&file.rel_path);
                if let Some(ext) = rename_ext {
                    dest.set_extension(ext);
                }
                write_output(&dest, &file.content).await?;
                report.succeeded.push(dest);
            }
            None => {
                // Check-only pipeline (e.g. lint): surviving the steps is
                // the result.
                report.succeeded.push(file.rel_path);
            }
        }
    }

    if report.succeeded.is_empty() {
        return Err(anyhow!(
            "pipeline '{task}': all {} matched files failed",
            report.skipped.len()
        )
        .into());
    }

    info!(
        task,
        succeeded = report.succeeded.len(),
        skipped = report.skipped.len(),
        "pipeline finished"
    );

    Ok(report)
}

/// Write one output file, creating intermediate directories.
async fn write_output(dest: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    tokio::fs::write(dest, content)
        .await
        .with_context(|| format!("writing {}", dest.display()))?;
    Ok(())
}
