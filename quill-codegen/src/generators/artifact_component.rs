//! Artifact component generator (`artifact-components/<id>.ts`).

use quill_core::project::ArtifactComponentDefinition;
use quill_core::style::CodeStyle;
use quill_core::validate::validate_artifact_component;
use quill_core::Result;

use crate::format::ObjectLiteral;
use crate::registry::{ComponentKind, ComponentRegistry};
use crate::source_unit::SourceUnit;

/// Generate the source unit for an artifact component.
pub fn generate_artifact_component(
    component: &ArtifactComponentDefinition,
    style: &CodeStyle,
    registry: &ComponentRegistry,
) -> Result<SourceUnit> {
    validate_artifact_component(component)?;

    let entry = registry.get(ComponentKind::ArtifactComponent, &component.id)?;
    let mut body = ObjectLiteral::new();
    body.string("id", &component.id, style);
    body.string("name", &component.name, style);
    body.optional_string("description", component.description.as_deref(), style);
    body.optional_json("summaryProps", component.summary_props.as_ref(), style, 1);
    body.optional_json("fullProps", component.full_props.as_ref(), style, 1);

    Ok(SourceUnit::new(
        entry.file_path.clone(),
        "artifactComponent",
        entry.export_name.clone(),
        body,
    ))
}
