//! Trigger generators (`triggers/<id>.ts`, `scheduled-triggers/<id>.ts`).

use quill_core::project::{ScheduledTriggerDefinition, TriggerDefinition};
use quill_core::style::CodeStyle;
use quill_core::validate::{validate_scheduled_trigger, validate_trigger};
use quill_core::Result;

use crate::format::ObjectLiteral;
use crate::registry::{ComponentKind, ComponentRegistry};
use crate::source_unit::SourceUnit;

/// Generate the source unit for an event trigger.
pub fn generate_trigger(
    trigger: &TriggerDefinition,
    style: &CodeStyle,
    registry: &ComponentRegistry,
) -> Result<SourceUnit> {
    validate_trigger(trigger)?;

    let entry = registry.get(ComponentKind::Trigger, &trigger.id)?;
    let mut body = ObjectLiteral::new();
    body.string("id", &trigger.id, style);
    body.string("name", &trigger.name, style);
    body.optional_string("description", trigger.description.as_deref(), style);
    body.optional_json("payloadSchema", trigger.payload_schema.as_ref(), style, 1);

    Ok(SourceUnit::new(
        entry.file_path.clone(),
        "trigger",
        entry.export_name.clone(),
        body,
    ))
}

/// Generate the source unit for a scheduled trigger.
pub fn generate_scheduled_trigger(
    trigger: &ScheduledTriggerDefinition,
    style: &CodeStyle,
    registry: &ComponentRegistry,
) -> Result<SourceUnit> {
    validate_scheduled_trigger(trigger)?;

    let entry = registry.get(ComponentKind::ScheduledTrigger, &trigger.id)?;
    let mut body = ObjectLiteral::new();
    body.string("id", &trigger.id, style);
    body.string("name", &trigger.name, style);
    body.optional_string("description", trigger.description.as_deref(), style);
    body.string("cron", &trigger.cron, style);
    body.optional_json("input", trigger.input.as_ref(), style, 1);

    Ok(SourceUnit::new(
        entry.file_path.clone(),
        "scheduledTrigger",
        entry.export_name.clone(),
        body,
    ))
}
