// src/project.rs

//! Wiring from a validated config to a populated task registry.
//!
//! Each `[pipeline.<name>]` group becomes a task running its file pipeline;
//! `clean` removes the generated output roots; `build` aggregates every
//! group. Groups are registered in topological `after` order so the
//! registry's no-forward-references rule always holds for valid configs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::model::ConfigFile;
use crate::config::validate::pipeline_topo_order;
use crate::errors::Result;
use crate::pipeline::glob::InputPattern;
use crate::pipeline::runner::run_pipeline;
use crate::pipeline::step::{PipelineStep, ToolStep};
use crate::registry::{ActionFuture, Registry};
use crate::watch::patterns::WatchBinding;

/// A fully wired project: config plus the registry built from it.
pub struct Project {
    registry: Arc<Registry>,
    config: ConfigFile,
    root: PathBuf,
}

impl Project {
    /// Build the task registry from a validated config.
    pub fn assemble(config: ConfigFile, root: PathBuf) -> Result<Self> {
        let mut registry = Registry::new();

        register_clean(&mut registry, &config, &root)?;

        for name in pipeline_topo_order(&config) {
            register_group(&mut registry, &config, &root, &name)?;
        }

        let all_groups: Vec<String> = config.pipelines().keys().cloned().collect();
        registry.register("build", all_groups, || Box::pin(async { Ok(()) }))?;

        Ok(Self {
            registry: Arc::new(registry),
            config,
            root,
        })
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Root of the generated output tree.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.project().output)
    }

    /// One watch binding per pipeline group: the group's input pattern plus
    /// any extra `watch` patterns, mapped to the group's task.
    pub fn watch_bindings(&self) -> Vec<WatchBinding> {
        self.config
            .pipelines()
            .iter()
            .map(|(name, group)| {
                let mut patterns = vec![group.input.clone()];
                patterns.extend(group.watch.iter().cloned());
                WatchBinding {
                    label: name.clone(),
                    patterns,
                    tasks: vec![name.clone()],
                }
            })
            .collect()
    }

    /// Dry-run output: print tasks, dependencies and steps without running
    /// anything.
    pub fn print_plan(&self) {
        println!("pipewright dry-run");
        println!("  output: {}", self.output_dir().display());
        println!();

        println!("pipelines ({}):", self.config.pipelines().len());
        for (name, group) in self.config.pipelines().iter() {
            println!("  - {name}");
            println!("      input: {}", group.input);
            if !group.exclude.is_empty() {
                println!("      exclude: {:?}", group.exclude);
            }
            if let Some(ref output) = group.output {
                println!("      output: {output}");
            }
            if !group.after.is_empty() {
                println!("      after: {:?}", group.after);
            }
            for step in &group.steps {
                println!("      step: {step}");
            }
            if let Some(ref ext) = group.rename_ext {
                println!("      rename_ext: {ext}");
            }
        }

        println!();
        println!("tasks: clean, {}, build", {
            let names: Vec<&str> = self
                .config
                .pipelines()
                .keys()
                .map(|s| s.as_str())
                .collect();
            names.join(", ")
        });
    }
}

/// Register the `clean` task: remove the project output root plus any
/// pipeline output directories that live outside it.
fn register_clean(registry: &mut Registry, config: &ConfigFile, root: &Path) -> Result<()> {
    let project_output = root.join(&config.project().output);

    let mut targets = vec![project_output.clone()];
    for group in config.pipelines().values() {
        if let Some(ref output) = group.output {
            let path = root.join(output);
            if !path.starts_with(&project_output) && !targets.contains(&path) {
                targets.push(path);
            }
        }
    }

    registry.register("clean", Vec::new(), move || {
        let targets = targets.clone();
        Box::pin(async move {
            for dir in targets {
                match tokio::fs::remove_dir_all(&dir).await {
                    Ok(()) => info!(dir = %dir.display(), "removed output directory"),
                    Err(err) if err.kind() == ErrorKind::NotFound => {}
                    Err(err) => {
                        return Err(anyhow::Error::from(err)
                            .context(format!("removing {}", dir.display())));
                    }
                }
            }
            Ok(())
        }) as ActionFuture
    })
}

/// Register one pipeline group as a task.
fn register_group(
    registry: &mut Registry,
    config: &ConfigFile,
    root: &Path,
    name: &str,
) -> Result<()> {
    let group = config
        .pipelines()
        .get(name)
        .with_context(|| format!("pipeline group '{name}' vanished after validation"))?;

    let input = Arc::new(InputPattern::compile(root, &group.input, &group.exclude)?);

    let steps: Arc<Vec<Box<dyn PipelineStep>>> = Arc::new(
        group
            .steps
            .iter()
            .map(|cmd| Box::new(ToolStep::new(cmd.clone())) as Box<dyn PipelineStep>)
            .collect(),
    );

    let output: Option<PathBuf> = group.output.as_ref().map(|o| root.join(o));
    let rename_ext = group.rename_ext.clone();
    let task_name = name.to_string();

    registry.register(name.to_string(), group.after.clone(), move || {
        let input = Arc::clone(&input);
        let steps = Arc::clone(&steps);
        let output = output.clone();
        let rename_ext = rename_ext.clone();
        let task = task_name.clone();
        Box::pin(async move {
            run_pipeline(&task, &input, &steps, output.as_deref(), rename_ext.as_deref())
                .await?;
            Ok(())
        }) as ActionFuture
    })
}
