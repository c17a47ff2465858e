// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [project]
/// output = "dist"
///
/// [serve]
/// port = 8080
///
/// [deploy]
/// cmd = "rsync -a dist/ deploy-host:/srv/site/"
///
/// [pipeline.styles]
/// input = "src/styles/**/*.{scss,sass,css}"
/// output = "dist/styles"
/// rename_ext = "css"
/// steps = ["sass --stdin", "cssnano"]
/// ```
///
/// All sections except `[pipeline.*]` are optional and have defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub project: ProjectSection,

    #[serde(default)]
    pub serve: ServeSection,

    #[serde(default)]
    pub deploy: DeploySection,

    /// All pipeline groups from `[pipeline.<name>]`.
    ///
    /// Keys are the logical asset group names (e.g. `"styles"`, `"scripts"`)
    /// and double as task names in the registry.
    #[serde(default)]
    pub pipeline: BTreeMap<String, PipelineGroup>,
}

/// Validated configuration.
///
/// Constructed exclusively via `TryFrom<RawConfigFile>` in
/// [`crate::config::validate`], so holding a `ConfigFile` means the pipeline
/// graph is known to be well-formed and acyclic.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    project: ProjectSection,
    serve: ServeSection,
    deploy: DeploySection,
    pipeline: BTreeMap<String, PipelineGroup>,
}

impl ConfigFile {
    /// Internal constructor used by the validation layer.
    pub(crate) fn new_unchecked(
        project: ProjectSection,
        serve: ServeSection,
        deploy: DeploySection,
        pipeline: BTreeMap<String, PipelineGroup>,
    ) -> Self {
        Self {
            project,
            serve,
            deploy,
            pipeline,
        }
    }

    pub fn project(&self) -> &ProjectSection {
        &self.project
    }

    pub fn serve(&self) -> &ServeSection {
        &self.serve
    }

    pub fn deploy(&self) -> &DeploySection {
        &self.deploy
    }

    pub fn pipelines(&self) -> &BTreeMap<String, PipelineGroup> {
        &self.pipeline
    }
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    /// Root of the generated output tree, relative to the project root.
    #[serde(default = "default_output")]
    pub output: String,
}

fn default_output() -> String {
    "dist".to_string()
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

/// `[serve]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServeSection {
    /// Port for the local preview server.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// `[deploy]` section.
///
/// The publish transport is delegated to an external command (rsync, a
/// gh-pages helper, scp, ...) run from the project root after a successful
/// build.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeploySection {
    #[serde(default)]
    pub cmd: Option<String>,
}

/// `[pipeline.<name>]` section: one logical asset group.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineGroup {
    /// Input glob pattern, relative to the project root. The static prefix
    /// (everything before the first glob meta character) becomes the base
    /// directory; relative structure below it is preserved in the output.
    pub input: String,

    /// Patterns excluded from the input match, relative to the project root.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Output directory. When absent, the group is check-only (e.g. lint):
    /// steps run but nothing is written.
    #[serde(default)]
    pub output: Option<String>,

    /// External tool commands applied to each matched file's content, in
    /// declared order. Content is piped via stdin/stdout. An empty list
    /// copies content through unchanged.
    #[serde(default)]
    pub steps: Vec<String>,

    /// Dependency list: this group's task waits for the named groups.
    #[serde(default)]
    pub after: Vec<String>,

    /// Replace the file extension on output (e.g. `"css"` for scss inputs).
    #[serde(default)]
    pub rename_ext: Option<String>,

    /// Extra watch patterns beyond `input` for this group's watch binding.
    #[serde(default)]
    pub watch: Vec<String>,
}
