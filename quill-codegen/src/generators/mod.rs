//! Per-entity source generators.
//!
//! One generator per entity kind. Each validates its input (aggregating
//! every violation), resolves references through the registry, and emits a
//! [`SourceUnit`](crate::source_unit::SourceUnit) ready for rendering or
//! merging.

mod agent;
mod artifact_component;
mod context_config;
mod data_component;
mod environment;
mod index;
mod status_component;
mod sub_agent;
mod tool;
mod trigger;

pub use agent::generate_agent;
pub use artifact_component::generate_artifact_component;
pub use context_config::generate_context_config;
pub use data_component::generate_data_component;
pub use environment::{generate_environment, generate_environments_index};
pub use index::generate_project_index;
pub use status_component::generate_status_component;
pub use sub_agent::generate_sub_agent;
pub use tool::generate_tool;
pub use trigger::{generate_scheduled_trigger, generate_trigger};
