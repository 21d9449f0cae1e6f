//! End-to-end pipeline tests: generate a project tree, write it to disk,
//! read it back, and verify the round trip and merge behavior.

use pretty_assertions::assert_eq;
use quill_codegen::compare::compare_project_definitions;
use quill_codegen::plan::{build_registry, generate_project_files};
use quill_codegen::reader::load_project;
use quill_codegen::{generate_tool, MergeEngine, MergeOutcome};
use quill_core::project::{
    AgentDefinition, CredentialDefinition, DataComponentDefinition, EnvironmentDefinition,
    FullProjectDefinition, SubAgentDefinition, ToolConfig, ToolDefinition, ToolReference,
};
use quill_core::style::CodeStyle;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

fn weather_project() -> FullProjectDefinition {
    let mut tools = BTreeMap::new();
    tools.insert(
        "weather-lookup".to_string(),
        ToolDefinition {
            id: "weather-lookup".to_string(),
            name: "Weather Lookup".to_string(),
            description: Some("Looks up current conditions.".to_string()),
            config: ToolConfig::Mcp {
                server_url: "https://mcp.example.com/weather".to_string(),
                transport: Some("streamable-http".to_string()),
                credential_reference_id: None,
                tool_overrides: None,
                active_tools: None,
            },
        },
    );

    let mut data_components = BTreeMap::new();
    data_components.insert(
        "forecast-card".to_string(),
        DataComponentDefinition {
            id: "forecast-card".to_string(),
            name: "Forecast Card".to_string(),
            description: None,
            props: Some(json!({
                "type": "object",
                "properties": {
                    "city": { "type": "string" }
                }
            })),
        },
    );

    let mut sub_agents = BTreeMap::new();
    sub_agents.insert(
        "assistant".to_string(),
        SubAgentDefinition {
            id: "assistant".to_string(),
            name: "Assistant".to_string(),
            prompt: "Answer weather questions for the user.".to_string(),
            can_use: vec![ToolReference {
                tool_id: "weather-lookup".to_string(),
                headers: None,
                selected_tools: Some(vec!["get_forecast".to_string()]),
            }],
            data_components: vec!["forecast-card".to_string()],
            ..Default::default()
        },
    );

    let mut agents = BTreeMap::new();
    agents.insert(
        "weather-agent".to_string(),
        AgentDefinition {
            id: "weather-agent".to_string(),
            name: "Weather Agent".to_string(),
            default_sub_agent_id: "assistant".to_string(),
            sub_agents,
            ..Default::default()
        },
    );

    let mut credentials = BTreeMap::new();
    credentials.insert(
        "weather-api".to_string(),
        CredentialDefinition {
            id: "weather-api-key".to_string(),
            credential_type: "memory".to_string(),
            ..Default::default()
        },
    );
    let mut environments = BTreeMap::new();
    environments.insert(
        "development".to_string(),
        EnvironmentDefinition { credentials },
    );

    FullProjectDefinition {
        id: "weather-project".to_string(),
        name: "Weather Project".to_string(),
        agents,
        tools,
        data_components,
        environments,
        ..Default::default()
    }
}

fn write_tree(root: &Path, files: &BTreeMap<String, String>) {
    for (path, text) in files {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, text).unwrap();
    }
}

#[test]
fn test_generated_tree_round_trips() {
    let project = weather_project();
    let style = CodeStyle::default();
    let files = generate_project_files(&project, &style).unwrap();

    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &files);

    let loaded = load_project(dir.path()).unwrap();
    let comparison = compare_project_definitions(&project, &loaded);
    assert!(
        comparison.matches,
        "round trip differences: {:?}",
        comparison.differences
    );
}

#[test]
fn test_generated_file_set() {
    let project = weather_project();
    let files = generate_project_files(&project, &CodeStyle::default()).unwrap();
    let paths: Vec<&str> = files.keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        vec![
            "agents/sub-agents/assistant.ts",
            "agents/weather-agent.ts",
            "data-components/forecast-card.ts",
            "environments/development.env.ts",
            "environments/index.ts",
            "index.ts",
            "tools/weather-lookup.ts",
        ]
    );
}

#[test]
fn test_merge_preserves_hand_added_comment() {
    let project = weather_project();
    let style = CodeStyle::default();
    let registry = build_registry(&project);
    let tool = &project.tools["weather-lookup"];
    let unit = generate_tool(tool, &style, &registry).unwrap();

    // Simulate a hand edit: a comment above the declaration and a drifted
    // field value inside it.
    let edited = unit
        .render(&style)
        .replace(
            "export const weatherLookup",
            "// keep: custom routing note\nexport const weatherLookup",
        )
        .replace("https://mcp.example.com/weather", "http://localhost:9999");

    let mut engine = MergeEngine::new().unwrap();
    let (merged, outcome) = engine.merge(&edited, &unit, &tool.id, &style).unwrap();
    assert_eq!(outcome, MergeOutcome::Merged);
    assert!(merged.contains("// keep: custom routing note"));
    assert!(merged.contains("https://mcp.example.com/weather"));
    assert!(!merged.contains("localhost:9999"));
}

#[test]
fn test_merge_of_unedited_file_is_stable() {
    let project = weather_project();
    let style = CodeStyle::default();
    let registry = build_registry(&project);
    let tool = &project.tools["weather-lookup"];
    let unit = generate_tool(tool, &style, &registry).unwrap();
    let fresh = unit.render(&style);

    let mut engine = MergeEngine::new().unwrap();
    let (merged, outcome) = engine.merge(&fresh, &unit, &tool.id, &style).unwrap();
    assert_eq!(outcome, MergeOutcome::Merged);
    assert_eq!(merged, fresh);
}

#[test]
fn test_colliding_names_round_trip_through_alias() {
    let mut sub_agents = BTreeMap::new();
    sub_agents.insert(
        "weather".to_string(),
        SubAgentDefinition {
            id: "weather".to_string(),
            name: "Weather".to_string(),
            prompt: "Report the weather.".to_string(),
            ..Default::default()
        },
    );
    let mut agents = BTreeMap::new();
    agents.insert(
        "weather".to_string(),
        AgentDefinition {
            id: "weather".to_string(),
            name: "Weather".to_string(),
            default_sub_agent_id: "weather".to_string(),
            sub_agents,
            ..Default::default()
        },
    );
    let project = FullProjectDefinition {
        id: "collisions".to_string(),
        name: "Collisions".to_string(),
        agents,
        ..Default::default()
    };

    let style = CodeStyle::default();
    let files = generate_project_files(&project, &style).unwrap();
    let agent_file = &files["agents/weather.ts"];
    assert!(agent_file.contains("import { weather as weatherSubAgent } from './sub-agents/weather';"));
    assert!(agent_file.contains("defaultSubAgent: weatherSubAgent"));

    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &files);
    let loaded = load_project(dir.path()).unwrap();
    let comparison = compare_project_definitions(&project, &loaded);
    assert!(
        comparison.matches,
        "round trip differences: {:?}",
        comparison.differences
    );
}

#[test]
fn test_double_quote_style_applies_everywhere() {
    use quill_core::style::Quotes;

    let project = weather_project();
    let style = CodeStyle {
        quotes: Quotes::Double,
        ..CodeStyle::default()
    };
    let files = generate_project_files(&project, &style).unwrap();
    let index = &files["index.ts"];
    assert!(index.contains("import { project } from \"@quill/sdk\";"));
    assert!(index.contains("id: \"weather-project\""));
    assert!(!index.contains('\''));
}
