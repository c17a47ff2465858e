// src/config/mod.rs

//! Static configuration: the TOML file describing pipeline groups,
//! the preview server, and the deploy hook.
//!
//! - [`model`] holds the serde structs.
//! - [`loader`] reads and deserialises the file.
//! - [`validate`] turns a [`model::RawConfigFile`] into a validated
//!   [`model::ConfigFile`] and is the only way to obtain one.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    ConfigFile, DeploySection, PipelineGroup, ProjectSection, RawConfigFile, ServeSection,
};
pub use validate::{pipeline_topo_order, RESERVED_TASK_NAMES};
