//! Context config generator (`context-configs/<id>.ts`).

use quill_core::project::ContextConfigDefinition;
use quill_core::style::CodeStyle;
use quill_core::validate::validate_context_config;
use quill_core::Result;

use crate::format::ObjectLiteral;
use crate::registry::{ComponentKind, ComponentRegistry};
use crate::source_unit::SourceUnit;

/// Generate the source unit for a context config.
pub fn generate_context_config(
    config: &ContextConfigDefinition,
    style: &CodeStyle,
    registry: &ComponentRegistry,
) -> Result<SourceUnit> {
    validate_context_config(config)?;

    let entry = registry.get(ComponentKind::ContextConfig, &config.id)?;
    let mut body = ObjectLiteral::new();
    body.string("id", &config.id, style);
    body.optional_string("name", config.name.as_deref(), style);
    body.optional_string("description", config.description.as_deref(), style);
    body.optional_json("headersSchema", config.headers_schema.as_ref(), style, 1);
    body.optional_json(
        "contextVariables",
        config.context_variables.as_ref(),
        style,
        1,
    );

    Ok(SourceUnit::new(
        entry.file_path.clone(),
        "contextConfig",
        entry.export_name.clone(),
        body,
    ))
}
