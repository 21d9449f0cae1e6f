//! Status component generator (`status-components/<id>.ts`).

use quill_core::project::StatusComponentDefinition;
use quill_core::style::CodeStyle;
use quill_core::validate::validate_status_component;
use quill_core::Result;

use crate::format::ObjectLiteral;
use crate::registry::{ComponentKind, ComponentRegistry};
use crate::source_unit::SourceUnit;

/// Generate the source unit for a status component.
pub fn generate_status_component(
    component: &StatusComponentDefinition,
    style: &CodeStyle,
    registry: &ComponentRegistry,
) -> Result<SourceUnit> {
    validate_status_component(component)?;

    let entry = registry.get(ComponentKind::StatusComponent, &component.id)?;
    let mut body = ObjectLiteral::new();
    body.string("id", &component.id, style);
    body.string("name", &component.name, style);
    body.optional_string("description", component.description.as_deref(), style);
    body.optional_json("detailsSchema", component.details_schema.as_ref(), style, 1);

    Ok(SourceUnit::new(
        entry.file_path.clone(),
        "statusComponent",
        entry.export_name.clone(),
        body,
    ))
}
