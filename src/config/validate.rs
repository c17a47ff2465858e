// src/config/validate.rs

use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PipewrightError, Result};

/// Task names wired by the orchestrator itself; pipeline groups must not
/// shadow them.
pub const RESERVED_TASK_NAMES: &[&str] = &["build", "clean"];

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PipewrightError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(
            raw.project,
            raw.serve,
            raw.deploy,
            raw.pipeline,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_pipelines(cfg)?;
    validate_group_names(cfg)?;
    validate_group_contents(cfg)?;
    validate_group_dependencies(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_pipelines(cfg: &RawConfigFile) -> Result<()> {
    if cfg.pipeline.is_empty() {
        return Err(PipewrightError::Config(
            "config must contain at least one [pipeline.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_group_names(cfg: &RawConfigFile) -> Result<()> {
    for name in cfg.pipeline.keys() {
        if name.trim().is_empty() {
            return Err(PipewrightError::Config(
                "pipeline group names must be non-empty".to_string(),
            ));
        }
        if RESERVED_TASK_NAMES.contains(&name.as_str()) {
            return Err(PipewrightError::Config(format!(
                "pipeline group name '{name}' is reserved"
            )));
        }
    }
    Ok(())
}

fn validate_group_contents(cfg: &RawConfigFile) -> Result<()> {
    for (name, group) in cfg.pipeline.iter() {
        if group.input.trim().is_empty() {
            return Err(PipewrightError::Config(format!(
                "pipeline '{name}' has an empty input pattern"
            )));
        }
        if group.steps.is_empty() && group.output.is_none() {
            return Err(PipewrightError::Config(format!(
                "pipeline '{name}' has neither steps nor output; it would do nothing"
            )));
        }
        if group.steps.iter().any(|s| s.trim().is_empty()) {
            return Err(PipewrightError::Config(format!(
                "pipeline '{name}' contains an empty step command"
            )));
        }
    }
    Ok(())
}

fn validate_group_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (name, group) in cfg.pipeline.iter() {
        let mut seen = HashSet::new();
        for dep in group.after.iter() {
            if !cfg.pipeline.contains_key(dep) {
                return Err(PipewrightError::Config(format!(
                    "pipeline '{name}' has unknown dependency '{dep}' in `after`"
                )));
            }
            if dep == name {
                return Err(PipewrightError::Config(format!(
                    "pipeline '{name}' cannot depend on itself in `after`"
                )));
            }
            if !seen.insert(dep.as_str()) {
                return Err(PipewrightError::Config(format!(
                    "pipeline '{name}' lists dependency '{dep}' more than once in `after`"
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: dep -> group. For:
    //   [pipeline.scripts]
    //   after = ["lint"]
    // we add edge lint -> scripts.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.pipeline.keys() {
        graph.add_node(name.as_str());
    }

    for (name, group) in cfg.pipeline.iter() {
        for dep in group.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(PipewrightError::CycleDetected(vec![node.to_string()]))
        }
    }
}

/// Topological order over a validated config's pipeline groups, used to
/// register tasks so that dependencies always precede dependents.
///
/// Deterministic: among ready groups, config (lexicographic) order wins.
pub fn pipeline_topo_order(cfg: &ConfigFile) -> Vec<String> {
    let mut placed: HashSet<&str> = HashSet::new();
    let mut order = Vec::with_capacity(cfg.pipelines().len());

    // The config is known to be acyclic, so each pass places at least one
    // group and this terminates.
    while order.len() < cfg.pipelines().len() {
        for (name, group) in cfg.pipelines().iter() {
            if placed.contains(name.as_str()) {
                continue;
            }
            if group.after.iter().all(|dep| placed.contains(dep.as_str())) {
                placed.insert(name.as_str());
                order.push(name.clone());
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::RawConfigFile;

    fn parse(toml_str: &str) -> RawConfigFile {
        toml::from_str(toml_str).expect("test TOML should deserialize")
    }

    #[test]
    fn topo_order_places_dependencies_first() {
        let raw = parse(
            r#"
            [pipeline.scripts]
            input = "src/js/**/*.js"
            output = "dist/js"
            after = ["lint"]

            [pipeline.lint]
            input = "src/js/**/*.js"
            steps = ["true"]
            "#,
        );
        let cfg = ConfigFile::try_from(raw).unwrap();
        let order = pipeline_topo_order(&cfg);
        assert_eq!(order, vec!["lint".to_string(), "scripts".to_string()]);
    }

    #[test]
    fn reserved_name_is_rejected() {
        let raw = parse(
            r#"
            [pipeline.build]
            input = "src/**/*"
            output = "dist"
            "#,
        );
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(PipewrightError::Config(_))
        ));
    }
}
