//! Whole-project generation.
//!
//! Builds the component registry for a run, then generates every source
//! file of the project tree in a deterministic order. The registry must be
//! complete before the first file is generated so that forward references
//! (an agent importing a tool declared later) already have their names.

use quill_core::project::FullProjectDefinition;
use quill_core::style::CodeStyle;
use quill_core::Result;
use std::collections::BTreeMap;

use crate::generators::{
    generate_agent, generate_artifact_component, generate_context_config, generate_data_component,
    generate_environment, generate_environments_index, generate_project_index,
    generate_scheduled_trigger, generate_status_component, generate_sub_agent, generate_tool,
    generate_trigger,
};
use crate::registry::{ComponentKind, ComponentRegistry};
use crate::source_unit::SourceUnit;

/// Register every entity of the project, in the order that decides who
/// keeps a contested bare variable name.
pub fn build_registry(project: &FullProjectDefinition) -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry.register(ComponentKind::Project, &project.id);
    for agent in project.agents.values() {
        registry.register(ComponentKind::Agent, &agent.id);
    }
    for agent in project.agents.values() {
        for sub_agent in agent.sub_agents.values() {
            registry.register(ComponentKind::SubAgent, &sub_agent.id);
        }
    }
    for id in project.tools.keys() {
        registry.register(ComponentKind::Tool, id);
    }
    for id in project.data_components.keys() {
        registry.register(ComponentKind::DataComponent, id);
    }
    for id in project.artifact_components.keys() {
        registry.register(ComponentKind::ArtifactComponent, id);
    }
    for id in project.context_configs.keys() {
        registry.register(ComponentKind::ContextConfig, id);
    }
    for id in project.status_components.keys() {
        registry.register(ComponentKind::StatusComponent, id);
    }
    for id in project.triggers.keys() {
        registry.register(ComponentKind::Trigger, id);
    }
    for id in project.scheduled_triggers.keys() {
        registry.register(ComponentKind::ScheduledTrigger, id);
    }
    for name in project.environments.keys() {
        registry.register(ComponentKind::Environment, name);
    }
    registry
}

/// Generate every source unit of the project, paired with the entity id
/// its declaration carries (used by the introspection merge to locate the
/// declaration in an existing file).
pub fn generate_project_units(
    project: &FullProjectDefinition,
    style: &CodeStyle,
) -> Result<Vec<(String, SourceUnit)>> {
    let registry = build_registry(project);
    let mut units = Vec::new();

    for tool in project.tools.values() {
        units.push((tool.id.clone(), generate_tool(tool, style, &registry)?));
    }
    for component in project.data_components.values() {
        units.push((
            component.id.clone(),
            generate_data_component(component, style, &registry)?,
        ));
    }
    for component in project.artifact_components.values() {
        units.push((
            component.id.clone(),
            generate_artifact_component(component, style, &registry)?,
        ));
    }
    for config in project.context_configs.values() {
        units.push((
            config.id.clone(),
            generate_context_config(config, style, &registry)?,
        ));
    }
    for component in project.status_components.values() {
        units.push((
            component.id.clone(),
            generate_status_component(component, style, &registry)?,
        ));
    }
    for trigger in project.triggers.values() {
        units.push((trigger.id.clone(), generate_trigger(trigger, style, &registry)?));
    }
    for trigger in project.scheduled_triggers.values() {
        units.push((
            trigger.id.clone(),
            generate_scheduled_trigger(trigger, style, &registry)?,
        ));
    }
    for agent in project.agents.values() {
        for sub_agent in agent.sub_agents.values() {
            units.push((
                sub_agent.id.clone(),
                generate_sub_agent(sub_agent, agent, project, style, &registry)?,
            ));
        }
        units.push((agent.id.clone(), generate_agent(agent, project, style, &registry)?));
    }
    for (name, environment) in &project.environments {
        units.push((
            name.clone(),
            generate_environment(name, environment, style, &registry)?,
        ));
    }
    if !project.environments.is_empty() {
        let names: Vec<String> = project.environments.keys().cloned().collect();
        units.push((
            project.id.clone(),
            generate_environments_index(&names, style, &registry)?,
        ));
    }
    units.push((
        project.id.clone(),
        generate_project_index(project, style, &registry)?,
    ));

    Ok(units)
}

/// Generate the complete source tree as a path → file-text map.
///
/// The same definition and style always produce byte-identical output.
pub fn generate_project_files(
    project: &FullProjectDefinition,
    style: &CodeStyle,
) -> Result<BTreeMap<String, String>> {
    let units = generate_project_units(project, style)?;
    let mut files = BTreeMap::new();
    for (_, unit) in units {
        files.insert(unit.file_path.clone(), unit.render(style));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::project::{AgentDefinition, SubAgentDefinition, ToolDefinition};

    fn minimal_project() -> FullProjectDefinition {
        let mut sub_agents = BTreeMap::new();
        sub_agents.insert(
            "assistant".to_string(),
            SubAgentDefinition {
                id: "assistant".to_string(),
                name: "Assistant".to_string(),
                prompt: "Help the user.".to_string(),
                ..Default::default()
            },
        );
        let mut agents = BTreeMap::new();
        agents.insert(
            "helper".to_string(),
            AgentDefinition {
                id: "helper".to_string(),
                name: "Helper".to_string(),
                default_sub_agent_id: "assistant".to_string(),
                sub_agents,
                ..Default::default()
            },
        );
        let mut tools = BTreeMap::new();
        tools.insert(
            "lookup".to_string(),
            ToolDefinition {
                id: "lookup".to_string(),
                name: "Lookup".to_string(),
                ..Default::default()
            },
        );
        FullProjectDefinition {
            id: "demo".to_string(),
            name: "Demo".to_string(),
            agents,
            tools,
            ..Default::default()
        }
    }

    #[test]
    fn test_generates_one_file_per_entity_plus_index() {
        let project = minimal_project();
        let files = generate_project_files(&project, &CodeStyle::default()).unwrap();
        let paths: Vec<&str> = files.keys().map(String::as_str).collect();
        assert_eq!(
            paths,
            vec![
                "agents/helper.ts",
                "agents/sub-agents/assistant.ts",
                "index.ts",
                "tools/lookup.ts",
            ]
        );
    }

    #[test]
    fn test_generation_is_deterministic() {
        let project = minimal_project();
        let style = CodeStyle::default();
        let first = generate_project_files(&project, &style).unwrap();
        let second = generate_project_files(&project, &style).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_environments_index_without_environments() {
        let project = minimal_project();
        let files = generate_project_files(&project, &CodeStyle::default()).unwrap();
        assert!(!files.contains_key("environments/index.ts"));
    }
}
