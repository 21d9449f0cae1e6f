//! Project index generator (`index.ts`).

use quill_core::project::FullProjectDefinition;
use quill_core::style::CodeStyle;
use quill_core::validate::validate_project;
use quill_core::Result;

use crate::format::ObjectLiteral;
use crate::registry::{ComponentKind, ComponentRegistry};
use crate::source_unit::SourceUnit;

/// Generate the project index: the root `project({...})` declaration that
/// pulls every agent together.
pub fn generate_project_index(
    project: &FullProjectDefinition,
    style: &CodeStyle,
    registry: &ComponentRegistry,
) -> Result<SourceUnit> {
    validate_project(project)?;

    let entry = registry.get(ComponentKind::Project, &project.id)?;
    let mut refs: Vec<(ComponentKind, String)> = Vec::new();

    let mut body = ObjectLiteral::new();
    body.string("id", &project.id, style);
    body.string("name", &project.name, style);
    body.optional_string("description", project.description.as_deref(), style);
    body.optional_json("models", project.models.as_ref(), style, 1);

    let agent_ids: Vec<String> = project.agents.keys().cloned().collect();
    let agent_vars = registry.reference_names(ComponentKind::Agent, &agent_ids)?;
    for id in &agent_ids {
        refs.push((ComponentKind::Agent, id.clone()));
    }
    body.optional_references("agents", &agent_vars, style, 1);

    let mut unit = SourceUnit::new("index.ts", "project", entry.export_name.clone(), body);
    unit.bindings = registry.imports_for_file("index.ts", &refs)?;
    Ok(unit)
}
