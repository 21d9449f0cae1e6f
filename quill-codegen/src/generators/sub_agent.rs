//! Sub-agent generator (`agents/sub-agents/<id>.ts`).

use quill_core::project::{
    AgentDefinition, FullProjectDefinition, SubAgentDefinition, ToolReference,
};
use quill_core::style::CodeStyle;
use quill_core::validate::validate_sub_agent;
use quill_core::Result;

use crate::format::{format_json_value, ObjectLiteral};
use crate::registry::{ComponentKind, ComponentRegistry};
use crate::source_unit::SourceUnit;

/// Generate the source unit for a sub-agent.
///
/// Sibling delegates and component references are resolved through the
/// registry and imported; `canUse` entries with overrides render as
/// `tool.with({...})` calls.
pub fn generate_sub_agent(
    sub_agent: &SubAgentDefinition,
    parent: &AgentDefinition,
    project: &FullProjectDefinition,
    style: &CodeStyle,
    registry: &ComponentRegistry,
) -> Result<SourceUnit> {
    validate_sub_agent(sub_agent, parent, project)?;

    let entry = registry.get(ComponentKind::SubAgent, &sub_agent.id)?;
    let file_path = entry.file_path.clone();
    let mut refs: Vec<(ComponentKind, String)> = Vec::new();

    let mut body = ObjectLiteral::new();
    body.string("id", &sub_agent.id, style);
    body.string("name", &sub_agent.name, style);
    body.optional_string("description", sub_agent.description.as_deref(), style);
    body.string("prompt", &sub_agent.prompt, style);

    if !sub_agent.can_use.is_empty() {
        let mut rendered = Vec::with_capacity(sub_agent.can_use.len());
        for tool_ref in &sub_agent.can_use {
            refs.push((ComponentKind::Tool, tool_ref.tool_id.clone()));
            rendered.push(render_tool_reference(tool_ref, style, registry)?);
        }
        body.optional_references("canUse", &rendered, style, 1);
    }

    if !sub_agent.can_delegate_to.is_empty() {
        let delegates =
            registry.reference_names(ComponentKind::SubAgent, &sub_agent.can_delegate_to)?;
        for sibling_id in &sub_agent.can_delegate_to {
            refs.push((ComponentKind::SubAgent, sibling_id.clone()));
        }
        body.optional_references("canDelegateTo", &delegates, style, 1);
    }

    if !sub_agent.data_components.is_empty() {
        let components =
            registry.reference_names(ComponentKind::DataComponent, &sub_agent.data_components)?;
        for id in &sub_agent.data_components {
            refs.push((ComponentKind::DataComponent, id.clone()));
        }
        body.optional_references("dataComponents", &components, style, 1);
    }

    if !sub_agent.artifact_components.is_empty() {
        let components = registry
            .reference_names(ComponentKind::ArtifactComponent, &sub_agent.artifact_components)?;
        for id in &sub_agent.artifact_components {
            refs.push((ComponentKind::ArtifactComponent, id.clone()));
        }
        body.optional_references("artifactComponents", &components, style, 1);
    }

    let mut unit = SourceUnit::new(file_path.clone(), "subAgent", entry.export_name.clone(), body);
    unit.bindings = registry.imports_for_file(&file_path, &refs)?;
    Ok(unit)
}

/// Render one `canUse` entry: a bare identifier, or `tool.with({...})`
/// when the reference carries overrides.
fn render_tool_reference(
    tool_ref: &ToolReference,
    style: &CodeStyle,
    registry: &ComponentRegistry,
) -> Result<String> {
    let variable = registry.variable_name(ComponentKind::Tool, &tool_ref.tool_id)?;
    if tool_ref.is_plain() {
        return Ok(variable);
    }

    let mut overrides = serde_json::Map::new();
    if let Some(headers) = &tool_ref.headers {
        overrides.insert("headers".to_string(), serde_json::to_value(headers)?);
    }
    if let Some(selected) = &tool_ref.selected_tools {
        overrides.insert("selectedTools".to_string(), serde_json::to_value(selected)?);
    }
    let rendered = format_json_value(&serde_json::Value::Object(overrides), style, 2);
    Ok(format!("{}.with({})", variable, rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_core::project::ToolDefinition;
    use std::collections::BTreeMap;

    fn fixture() -> (FullProjectDefinition, AgentDefinition) {
        let mut sub_agents = BTreeMap::new();
        sub_agents.insert(
            "assistant".to_string(),
            SubAgentDefinition {
                id: "assistant".to_string(),
                name: "Assistant".to_string(),
                prompt: "Answer questions.".to_string(),
                ..Default::default()
            },
        );
        sub_agents.insert(
            "forecaster".to_string(),
            SubAgentDefinition {
                id: "forecaster".to_string(),
                name: "Forecaster".to_string(),
                prompt: "Forecast.".to_string(),
                ..Default::default()
            },
        );
        let agent = AgentDefinition {
            id: "weather-agent".to_string(),
            name: "Weather Agent".to_string(),
            default_sub_agent_id: "assistant".to_string(),
            sub_agents,
            ..Default::default()
        };

        let mut tools = BTreeMap::new();
        tools.insert(
            "weather-lookup".to_string(),
            ToolDefinition {
                id: "weather-lookup".to_string(),
                name: "Weather Lookup".to_string(),
                config: quill_core::project::ToolConfig::Mcp {
                    server_url: "https://mcp.example.com".to_string(),
                    transport: None,
                    credential_reference_id: None,
                    tool_overrides: None,
                    active_tools: None,
                },
                ..Default::default()
            },
        );
        let mut agents = BTreeMap::new();
        agents.insert(agent.id.clone(), agent.clone());
        let project = FullProjectDefinition {
            id: "p".to_string(),
            name: "P".to_string(),
            agents,
            tools,
            ..Default::default()
        };
        (project, agent)
    }

    fn registry_for(project: &FullProjectDefinition) -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        for agent in project.agents.values() {
            registry.register(ComponentKind::Agent, &agent.id);
            for sub_agent in agent.sub_agents.values() {
                registry.register(ComponentKind::SubAgent, &sub_agent.id);
            }
        }
        for tool in project.tools.values() {
            registry.register(ComponentKind::Tool, &tool.id);
        }
        registry
    }

    #[test]
    fn test_sub_agent_with_tool_and_delegate() {
        let (project, agent) = fixture();
        let registry = registry_for(&project);
        let style = CodeStyle::default();

        let sub_agent = SubAgentDefinition {
            id: "assistant".to_string(),
            name: "Assistant".to_string(),
            prompt: "Answer questions.".to_string(),
            can_use: vec![ToolReference {
                tool_id: "weather-lookup".to_string(),
                ..Default::default()
            }],
            can_delegate_to: vec!["forecaster".to_string()],
            ..Default::default()
        };

        let unit = generate_sub_agent(&sub_agent, &agent, &project, &style, &registry).unwrap();
        let expected = "\
import { subAgent } from '@quill/sdk';

import { weatherLookup } from '../../tools/weather-lookup';
import { forecaster } from './forecaster';

export const assistant = subAgent({
  id: 'assistant',
  name: 'Assistant',
  prompt: 'Answer questions.',
  canUse: () => [weatherLookup],
  canDelegateTo: () => [forecaster]
});
";
        assert_eq!(unit.render(&style), expected);
    }

    #[test]
    fn test_tool_reference_with_overrides_uses_with() {
        let (project, agent) = fixture();
        let registry = registry_for(&project);
        let style = CodeStyle::default();

        let mut headers = BTreeMap::new();
        headers.insert("x-api-key".to_string(), "{{secret}}".to_string());
        let sub_agent = SubAgentDefinition {
            id: "assistant".to_string(),
            name: "Assistant".to_string(),
            prompt: "Answer.".to_string(),
            can_use: vec![ToolReference {
                tool_id: "weather-lookup".to_string(),
                headers: Some(headers),
                selected_tools: Some(vec!["get_forecast".to_string()]),
            }],
            ..Default::default()
        };

        let rendered = generate_sub_agent(&sub_agent, &agent, &project, &style, &registry)
            .unwrap()
            .render(&style);
        assert!(rendered.contains("weatherLookup.with({"));
        assert!(rendered.contains("'x-api-key': '{{secret}}'"));
        assert!(rendered.contains("selectedTools: ["));
    }

    #[test]
    fn test_multiline_prompt_becomes_template_literal() {
        let (project, agent) = fixture();
        let registry = registry_for(&project);
        let style = CodeStyle::default();

        let sub_agent = SubAgentDefinition {
            id: "assistant".to_string(),
            name: "Assistant".to_string(),
            prompt: "You are a weather assistant.\nAlways cite your sources.".to_string(),
            ..Default::default()
        };

        let rendered = generate_sub_agent(&sub_agent, &agent, &project, &style, &registry)
            .unwrap()
            .render(&style);
        assert!(rendered
            .contains("prompt: `You are a weather assistant.\nAlways cite your sources.`"));
    }
}
