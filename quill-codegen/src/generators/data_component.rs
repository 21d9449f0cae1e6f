//! Data component generator (`data-components/<id>.ts`).

use quill_core::project::DataComponentDefinition;
use quill_core::style::CodeStyle;
use quill_core::validate::validate_data_component;
use quill_core::Result;

use crate::format::ObjectLiteral;
use crate::registry::{ComponentKind, ComponentRegistry};
use crate::source_unit::SourceUnit;

/// Generate the source unit for a data component.
pub fn generate_data_component(
    component: &DataComponentDefinition,
    style: &CodeStyle,
    registry: &ComponentRegistry,
) -> Result<SourceUnit> {
    validate_data_component(component)?;

    let entry = registry.get(ComponentKind::DataComponent, &component.id)?;
    let mut body = ObjectLiteral::new();
    body.string("id", &component.id, style);
    body.string("name", &component.name, style);
    body.optional_string("description", component.description.as_deref(), style);
    body.optional_json("props", component.props.as_ref(), style, 1);

    Ok(SourceUnit::new(
        entry.file_path.clone(),
        "dataComponent",
        entry.export_name.clone(),
        body,
    ))
}
