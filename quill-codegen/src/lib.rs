//! Deterministic TypeScript code generation for Quill projects.
//!
//! Turns a `FullProjectDefinition` into a source tree of SDK declarations,
//! merges regenerated declarations into hand-edited files, and reads a
//! generated tree back for round-trip verification.

pub mod compare;
pub mod format;
pub mod generators;
pub mod introspect;
pub mod naming;
pub mod plan;
pub mod reader;
pub mod registry;
pub mod source_unit;

pub use compare::{compare_project_definitions, Difference, ProjectComparison};
pub use generators::{
    generate_agent, generate_artifact_component, generate_context_config, generate_data_component,
    generate_environment, generate_environments_index, generate_project_index,
    generate_scheduled_trigger, generate_status_component, generate_sub_agent, generate_tool,
    generate_trigger,
};
pub use introspect::{MergeEngine, MergeOutcome};
pub use plan::{build_registry, generate_project_files, generate_project_units};
pub use reader::load_project;
pub use registry::{ComponentKind, ComponentRegistry};
pub use source_unit::{SourceUnit, SDK_PACKAGE};
