//! The project-definition data model.
//!
//! These types mirror the JSON document served by the manage API. They are
//! read-only input to generation: the pipeline never mutates a definition,
//! it only reads it. Entity maps are `BTreeMap` so iteration order (and
//! therefore generated output) is deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root entity: the complete project definition fetched from the manage API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FullProjectDefinition {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Model settings passed through verbatim (base/structured-output models).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<serde_json::Value>,
    pub agents: BTreeMap<String, AgentDefinition>,
    pub tools: BTreeMap<String, ToolDefinition>,
    pub data_components: BTreeMap<String, DataComponentDefinition>,
    pub artifact_components: BTreeMap<String, ArtifactComponentDefinition>,
    pub context_configs: BTreeMap<String, ContextConfigDefinition>,
    pub status_components: BTreeMap<String, StatusComponentDefinition>,
    pub triggers: BTreeMap<String, TriggerDefinition>,
    pub scheduled_triggers: BTreeMap<String, ScheduledTriggerDefinition>,
    pub environments: BTreeMap<String, EnvironmentDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An agent: a named entry point that routes work to its sub-agents.
///
/// Invariant: `default_sub_agent_id` must be a key of `sub_agents`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentDefinition {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub default_sub_agent_id: String,
    pub sub_agents: BTreeMap<String, SubAgentDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_config_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_when: Option<StopWhen>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_updates: Option<StatusUpdates>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scheduled_triggers: Vec<String>,
}

/// Termination conditions for an agent conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StopWhen {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_count_is: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_count_is: Option<u32>,
}

/// Progress-update configuration for a long-running agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_events: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub status_components: Vec<String>,
}

/// A sub-agent: a prompt plus the tools and siblings it may use.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SubAgentDefinition {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub prompt: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub can_use: Vec<ToolReference>,
    /// Sibling sub-agent ids this sub-agent may delegate to.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub can_delegate_to: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data_components: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub artifact_components: Vec<String>,
}

/// A tool reference inside `canUse`, optionally with per-reference overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolReference {
    pub tool_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Restrict the reference to a subset of the remote server's tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_tools: Option<Vec<String>>,
}

impl ToolReference {
    /// True when the reference carries no overrides and renders as a bare
    /// identifier.
    pub fn is_plain(&self) -> bool {
        self.headers.is_none() && self.selected_tools.is_none()
    }
}

/// A tool definition, discriminated by `config.type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolDefinition {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub config: ToolConfig,
}

/// Tool configuration variants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ToolConfig {
    /// A remote MCP server exposing tools over a transport.
    #[serde(rename_all = "camelCase")]
    Mcp {
        server_url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        transport: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        credential_reference_id: Option<String>,
        /// Rename/re-describe individual remote tools by name.
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_overrides: Option<BTreeMap<String, ToolOverride>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        active_tools: Option<Vec<String>>,
    },
    /// An inline function tool with a JSON-schema parameter shape.
    #[serde(rename_all = "camelCase")]
    Function {
        #[serde(skip_serializing_if = "Option::is_none")]
        parameters: Option<serde_json::Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        execute: Option<String>,
    },
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self::Function {
            parameters: None,
            execute: None,
        }
    }
}

/// Per-remote-tool override within an MCP tool definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A structured data component rendered inside agent responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DataComponentDefinition {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<serde_json::Value>,
}

/// An artifact component: summary and full JSON-schema shapes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactComponentDefinition {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_props: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_props: Option<serde_json::Value>,
}

/// A status component referenced from an agent's `statusUpdates`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusComponentDefinition {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_schema: Option<serde_json::Value>,
}

/// Request-context configuration attached to an agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextConfigDefinition {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_variables: Option<serde_json::Value>,
}

/// An event-driven trigger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerDefinition {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_schema: Option<serde_json::Value>,
}

/// A cron-scheduled trigger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduledTriggerDefinition {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cron: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<serde_json::Value>,
}

/// Per-environment credential settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentDefinition {
    pub credentials: BTreeMap<String, CredentialDefinition>,
}

/// A credential entry inside an environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CredentialDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub credential_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_store_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_params: Option<serde_json::Value>,
}
