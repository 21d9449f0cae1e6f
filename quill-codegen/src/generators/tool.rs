//! Tool generator (`tools/<id>.ts`).

use quill_core::project::{ToolConfig, ToolDefinition};
use quill_core::style::CodeStyle;
use quill_core::validate::validate_tool;
use quill_core::Result;

use crate::format::ObjectLiteral;
use crate::registry::{ComponentKind, ComponentRegistry};
use crate::source_unit::SourceUnit;

/// Generate the source unit for a tool definition.
pub fn generate_tool(
    tool: &ToolDefinition,
    style: &CodeStyle,
    registry: &ComponentRegistry,
) -> Result<SourceUnit> {
    validate_tool(tool)?;

    let entry = registry.get(ComponentKind::Tool, &tool.id)?;
    let mut body = ObjectLiteral::new();
    body.string("id", &tool.id, style);
    body.string("name", &tool.name, style);
    body.optional_string("description", tool.description.as_deref(), style);

    let factory = match &tool.config {
        ToolConfig::Mcp {
            server_url,
            transport,
            credential_reference_id,
            tool_overrides,
            active_tools,
        } => {
            body.string("serverUrl", server_url, style);
            body.optional_string("transport", transport.as_deref(), style);
            body.optional_string(
                "credentialReferenceId",
                credential_reference_id.as_deref(),
                style,
            );
            if let Some(overrides) = tool_overrides {
                if !overrides.is_empty() {
                    let value = serde_json::to_value(overrides)?;
                    body.optional_json("toolOverrides", Some(&value), style, 1);
                }
            }
            if let Some(active) = active_tools {
                if !active.is_empty() {
                    let value = serde_json::to_value(active)?;
                    body.optional_json("activeTools", Some(&value), style, 1);
                }
            }
            "mcpTool"
        }
        ToolConfig::Function {
            parameters,
            execute,
        } => {
            body.optional_json("parameters", parameters.as_ref(), style, 1);
            if let Some(execute) = execute {
                if !execute.trim().is_empty() {
                    // Function source is carried verbatim
                    body.raw("execute", execute.trim());
                }
            }
            "functionTool"
        }
    };

    Ok(SourceUnit::new(
        entry.file_path.clone(),
        factory,
        entry.export_name.clone(),
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry_with(id: &str) -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.register(ComponentKind::Tool, id);
        registry
    }

    #[test]
    fn test_mcp_tool_rendering() {
        let tool = ToolDefinition {
            id: "weather-lookup".to_string(),
            name: "Weather Lookup".to_string(),
            description: None,
            config: ToolConfig::Mcp {
                server_url: "https://mcp.example.com/weather".to_string(),
                transport: Some("streamable-http".to_string()),
                credential_reference_id: None,
                tool_overrides: None,
                active_tools: None,
            },
        };
        let style = CodeStyle::default();
        let registry = registry_with("weather-lookup");

        let unit = generate_tool(&tool, &style, &registry).unwrap();
        let expected = "\
import { mcpTool } from '@quill/sdk';

export const weatherLookup = mcpTool({
  id: 'weather-lookup',
  name: 'Weather Lookup',
  serverUrl: 'https://mcp.example.com/weather',
  transport: 'streamable-http'
});
";
        assert_eq!(unit.render(&style), expected);
    }

    #[test]
    fn test_omits_absent_description() {
        let tool = ToolDefinition {
            id: "t".to_string(),
            name: "T".to_string(),
            description: None,
            config: ToolConfig::Mcp {
                server_url: "https://mcp.example.com".to_string(),
                transport: None,
                credential_reference_id: None,
                tool_overrides: None,
                active_tools: None,
            },
        };
        let style = CodeStyle::default();
        let registry = registry_with("t");

        let unit = generate_tool(&tool, &style, &registry).unwrap();
        assert!(!unit.render(&style).contains("description:"));
    }

    #[test]
    fn test_tool_overrides_rendered_as_object() {
        use quill_core::project::ToolOverride;
        use std::collections::BTreeMap;

        let mut overrides = BTreeMap::new();
        overrides.insert(
            "get_forecast".to_string(),
            ToolOverride {
                name: Some("forecast".to_string()),
                description: None,
            },
        );
        let tool = ToolDefinition {
            id: "weather-lookup".to_string(),
            name: "Weather Lookup".to_string(),
            description: None,
            config: ToolConfig::Mcp {
                server_url: "https://mcp.example.com".to_string(),
                transport: None,
                credential_reference_id: None,
                tool_overrides: Some(overrides),
                active_tools: None,
            },
        };
        let style = CodeStyle::default();
        let registry = registry_with("weather-lookup");

        let rendered = generate_tool(&tool, &style, &registry).unwrap().render(&style);
        assert!(rendered.contains("toolOverrides: {"));
        assert!(rendered.contains("get_forecast: {"));
        assert!(rendered.contains("name: 'forecast'"));
    }

    #[test]
    fn test_invalid_tool_is_rejected_before_generation() {
        let tool = ToolDefinition {
            id: "t".to_string(),
            name: "T".to_string(),
            description: None,
            config: ToolConfig::Mcp {
                server_url: "".to_string(),
                transport: None,
                credential_reference_id: None,
                tool_overrides: None,
                active_tools: None,
            },
        };
        let style = CodeStyle::default();
        let registry = registry_with("t");
        assert!(generate_tool(&tool, &style, &registry).is_err());
    }
}
