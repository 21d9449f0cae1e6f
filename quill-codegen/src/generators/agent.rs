//! Agent generator (`agents/<id>.ts`).

use quill_core::project::{AgentDefinition, FullProjectDefinition};
use quill_core::style::CodeStyle;
use quill_core::validate::validate_agent;
use quill_core::Result;

use crate::format::ObjectLiteral;
use crate::registry::{ComponentKind, ComponentRegistry};
use crate::source_unit::SourceUnit;

/// Generate the source unit for an agent.
///
/// The default sub-agent renders as a bare identifier; `subAgents` renders
/// as an arrow array over every sub-agent, in map order.
pub fn generate_agent(
    agent: &AgentDefinition,
    project: &FullProjectDefinition,
    style: &CodeStyle,
    registry: &ComponentRegistry,
) -> Result<SourceUnit> {
    validate_agent(agent, project)?;

    let entry = registry.get(ComponentKind::Agent, &agent.id)?;
    let file_path = entry.file_path.clone();
    let mut refs: Vec<(ComponentKind, String)> = Vec::new();

    let mut body = ObjectLiteral::new();
    body.string("id", &agent.id, style);
    body.string("name", &agent.name, style);
    body.optional_string("description", agent.description.as_deref(), style);

    let default_var =
        registry.variable_name(ComponentKind::SubAgent, &agent.default_sub_agent_id)?;
    refs.push((ComponentKind::SubAgent, agent.default_sub_agent_id.clone()));
    body.raw("defaultSubAgent", default_var);

    let sub_agent_ids: Vec<String> = agent.sub_agents.keys().cloned().collect();
    let sub_agent_vars = registry.reference_names(ComponentKind::SubAgent, &sub_agent_ids)?;
    for id in &sub_agent_ids {
        refs.push((ComponentKind::SubAgent, id.clone()));
    }
    body.optional_references("subAgents", &sub_agent_vars, style, 1);

    if let Some(context_config_id) = &agent.context_config_id {
        let context_var =
            registry.variable_name(ComponentKind::ContextConfig, context_config_id)?;
        refs.push((ComponentKind::ContextConfig, context_config_id.clone()));
        body.raw("contextConfig", context_var);
    }

    if let Some(stop_when) = &agent.stop_when {
        let mut nested = ObjectLiteral::new();
        nested.optional_number("transferCountIs", stop_when.transfer_count_is);
        nested.optional_number("stepCountIs", stop_when.step_count_is);
        if !nested.is_empty() {
            body.raw("stopWhen", nested.render(style, 1));
        }
    }

    if let Some(status_updates) = &agent.status_updates {
        let mut nested = ObjectLiteral::new();
        nested.optional_number("numEvents", status_updates.num_events);
        nested.optional_number("timeInSeconds", status_updates.time_in_seconds);
        if !status_updates.status_components.is_empty() {
            let components = registry.reference_names(
                ComponentKind::StatusComponent,
                &status_updates.status_components,
            )?;
            for id in &status_updates.status_components {
                refs.push((ComponentKind::StatusComponent, id.clone()));
            }
            nested.optional_references("statusComponents", &components, style, 2);
        }
        if !nested.is_empty() {
            body.raw("statusUpdates", nested.render(style, 1));
        }
    }

    if !agent.triggers.is_empty() {
        let triggers = registry.reference_names(ComponentKind::Trigger, &agent.triggers)?;
        for id in &agent.triggers {
            refs.push((ComponentKind::Trigger, id.clone()));
        }
        body.optional_references("triggers", &triggers, style, 1);
    }
    if !agent.scheduled_triggers.is_empty() {
        let triggers =
            registry.reference_names(ComponentKind::ScheduledTrigger, &agent.scheduled_triggers)?;
        for id in &agent.scheduled_triggers {
            refs.push((ComponentKind::ScheduledTrigger, id.clone()));
        }
        body.optional_references("scheduledTriggers", &triggers, style, 1);
    }

    let mut unit = SourceUnit::new(file_path.clone(), "agent", entry.export_name.clone(), body);
    unit.bindings = registry.imports_for_file(&file_path, &refs)?;
    Ok(unit)
}
