//! Aggregated entity validation.
//!
//! Every check for one entity runs in a single pass and all violations are
//! collected before the error is raised, so the user-facing diagnostic
//! lists the complete set of problems, never just the first.

use crate::error::{QuillError, Result, ValidationReport, Violation};
use crate::project::{
    AgentDefinition, ArtifactComponentDefinition, ContextConfigDefinition,
    DataComponentDefinition, EnvironmentDefinition, FullProjectDefinition,
    ScheduledTriggerDefinition, StatusComponentDefinition, SubAgentDefinition, ToolConfig,
    ToolDefinition, TriggerDefinition,
};

/// Accumulates violations for one entity.
pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    /// Record a violation at `path`.
    pub fn violation(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Require `condition`; record `message` at `path` otherwise.
    pub fn require(&mut self, condition: bool, path: &str, message: &str) {
        if !condition {
            self.violation(path, message);
        }
    }

    /// Require a non-empty string field.
    pub fn require_non_empty(&mut self, path: &str, value: &str) {
        if value.trim().is_empty() {
            self.violation(path, "must not be empty");
        }
    }

    /// Convert the accumulated violations into a result.
    pub fn finish(self, entity_kind: &str, entity_id: &str) -> Result<()> {
        if self.violations.is_empty() {
            return Ok(());
        }
        let mut report = ValidationReport::new(entity_kind, entity_id);
        report.violations = self.violations;
        Err(QuillError::Validation(report))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate the project root record (not its entities).
pub fn validate_project(project: &FullProjectDefinition) -> Result<()> {
    let mut v = Validator::new();
    v.require_non_empty("id", &project.id);
    v.require_non_empty("name", &project.name);
    v.finish("project", &project.id)
}

/// Validate an agent, including referential invariants against the project.
pub fn validate_agent(agent: &AgentDefinition, project: &FullProjectDefinition) -> Result<()> {
    let mut v = Validator::new();
    v.require_non_empty("id", &agent.id);
    v.require_non_empty("name", &agent.name);
    v.require_non_empty("defaultSubAgentId", &agent.default_sub_agent_id);

    if agent.sub_agents.is_empty() {
        v.violation("subAgents", "must contain at least one sub-agent");
    } else if !agent.default_sub_agent_id.is_empty()
        && !agent.sub_agents.contains_key(&agent.default_sub_agent_id)
    {
        v.violation(
            "defaultSubAgentId",
            format!(
                "'{}' is not a key of subAgents",
                agent.default_sub_agent_id
            ),
        );
    }

    if let Some(context_config_id) = &agent.context_config_id {
        if !project.context_configs.contains_key(context_config_id) {
            v.violation(
                "contextConfigId",
                format!("unknown context config '{}'", context_config_id),
            );
        }
    }

    if let Some(status_updates) = &agent.status_updates {
        for (i, component_id) in status_updates.status_components.iter().enumerate() {
            if !project.status_components.contains_key(component_id) {
                v.violation(
                    format!("statusUpdates.statusComponents[{}]", i),
                    format!("unknown status component '{}'", component_id),
                );
            }
        }
    }

    for (i, trigger_id) in agent.triggers.iter().enumerate() {
        if !project.triggers.contains_key(trigger_id) {
            v.violation(
                format!("triggers[{}]", i),
                format!("unknown trigger '{}'", trigger_id),
            );
        }
    }
    for (i, trigger_id) in agent.scheduled_triggers.iter().enumerate() {
        if !project.scheduled_triggers.contains_key(trigger_id) {
            v.violation(
                format!("scheduledTriggers[{}]", i),
                format!("unknown scheduled trigger '{}'", trigger_id),
            );
        }
    }

    v.finish("agent", &agent.id)
}

/// Validate a sub-agent against its parent agent and the project.
pub fn validate_sub_agent(
    sub_agent: &SubAgentDefinition,
    parent: &AgentDefinition,
    project: &FullProjectDefinition,
) -> Result<()> {
    let mut v = Validator::new();
    v.require_non_empty("id", &sub_agent.id);
    v.require_non_empty("name", &sub_agent.name);
    v.require_non_empty("prompt", &sub_agent.prompt);

    for (i, tool_ref) in sub_agent.can_use.iter().enumerate() {
        if tool_ref.tool_id.trim().is_empty() {
            v.violation(format!("canUse[{}].toolId", i), "must not be empty");
        } else if !project.tools.contains_key(&tool_ref.tool_id) {
            v.violation(
                format!("canUse[{}].toolId", i),
                format!("unknown tool '{}'", tool_ref.tool_id),
            );
        }
        if let Some(selected) = &tool_ref.selected_tools {
            if selected.is_empty() {
                v.violation(
                    format!("canUse[{}].selectedTools", i),
                    "must not be an empty list",
                );
            }
        }
    }

    for (i, sibling_id) in sub_agent.can_delegate_to.iter().enumerate() {
        if !parent.sub_agents.contains_key(sibling_id) {
            v.violation(
                format!("canDelegateTo[{}]", i),
                format!("unknown sibling sub-agent '{}'", sibling_id),
            );
        }
    }
    for (i, component_id) in sub_agent.data_components.iter().enumerate() {
        if !project.data_components.contains_key(component_id) {
            v.violation(
                format!("dataComponents[{}]", i),
                format!("unknown data component '{}'", component_id),
            );
        }
    }
    for (i, component_id) in sub_agent.artifact_components.iter().enumerate() {
        if !project.artifact_components.contains_key(component_id) {
            v.violation(
                format!("artifactComponents[{}]", i),
                format!("unknown artifact component '{}'", component_id),
            );
        }
    }

    v.finish("sub-agent", &sub_agent.id)
}

/// Validate a tool definition.
pub fn validate_tool(tool: &ToolDefinition) -> Result<()> {
    let mut v = Validator::new();
    v.require_non_empty("id", &tool.id);
    v.require_non_empty("name", &tool.name);

    match &tool.config {
        ToolConfig::Mcp {
            server_url,
            transport,
            ..
        } => {
            if server_url.trim().is_empty() {
                v.violation("config.serverUrl", "must not be empty");
            } else if !server_url.starts_with("http://") && !server_url.starts_with("https://") {
                v.violation("config.serverUrl", "must be an http(s) URL");
            }
            if let Some(transport) = transport {
                if transport != "streamable-http" && transport != "sse" {
                    v.violation(
                        "config.transport",
                        format!("unknown transport '{}'", transport),
                    );
                }
            }
        }
        ToolConfig::Function { parameters, .. } => {
            if let Some(parameters) = parameters {
                if !parameters.is_object() {
                    v.violation("config.parameters", "must be a JSON schema object");
                }
            }
        }
    }

    v.finish("tool", &tool.id)
}

/// Validate a data component.
pub fn validate_data_component(component: &DataComponentDefinition) -> Result<()> {
    let mut v = Validator::new();
    v.require_non_empty("id", &component.id);
    v.require_non_empty("name", &component.name);
    if let Some(props) = &component.props {
        v.require(props.is_object(), "props", "must be a JSON schema object");
    }
    v.finish("data component", &component.id)
}

/// Validate an artifact component.
pub fn validate_artifact_component(component: &ArtifactComponentDefinition) -> Result<()> {
    let mut v = Validator::new();
    v.require_non_empty("id", &component.id);
    v.require_non_empty("name", &component.name);
    if let Some(props) = &component.summary_props {
        v.require(props.is_object(), "summaryProps", "must be a JSON schema object");
    }
    if let Some(props) = &component.full_props {
        v.require(props.is_object(), "fullProps", "must be a JSON schema object");
    }
    v.finish("artifact component", &component.id)
}

/// Validate a status component.
pub fn validate_status_component(component: &StatusComponentDefinition) -> Result<()> {
    let mut v = Validator::new();
    v.require_non_empty("id", &component.id);
    v.require_non_empty("name", &component.name);
    v.finish("status component", &component.id)
}

/// Validate a context config.
pub fn validate_context_config(config: &ContextConfigDefinition) -> Result<()> {
    let mut v = Validator::new();
    v.require_non_empty("id", &config.id);
    if let Some(variables) = &config.context_variables {
        v.require(
            variables.is_object(),
            "contextVariables",
            "must be an object",
        );
    }
    v.finish("context config", &config.id)
}

/// Validate an event trigger.
pub fn validate_trigger(trigger: &TriggerDefinition) -> Result<()> {
    let mut v = Validator::new();
    v.require_non_empty("id", &trigger.id);
    v.require_non_empty("name", &trigger.name);
    v.finish("trigger", &trigger.id)
}

/// Validate a scheduled trigger.
pub fn validate_scheduled_trigger(trigger: &ScheduledTriggerDefinition) -> Result<()> {
    let mut v = Validator::new();
    v.require_non_empty("id", &trigger.id);
    v.require_non_empty("name", &trigger.name);
    v.require_non_empty("cron", &trigger.cron);
    v.finish("scheduled trigger", &trigger.id)
}

/// Validate every entity in a project definition, collecting one report
/// per failing entity. An empty result means the project is valid.
pub fn validate_full_project(project: &FullProjectDefinition) -> Vec<ValidationReport> {
    let mut reports = Vec::new();
    let mut collect = |result: Result<()>| {
        if let Err(QuillError::Validation(report)) = result {
            reports.push(report);
        }
    };

    collect(validate_project(project));
    for agent in project.agents.values() {
        collect(validate_agent(agent, project));
        for sub_agent in agent.sub_agents.values() {
            collect(validate_sub_agent(sub_agent, agent, project));
        }
    }
    for tool in project.tools.values() {
        collect(validate_tool(tool));
    }
    for component in project.data_components.values() {
        collect(validate_data_component(component));
    }
    for component in project.artifact_components.values() {
        collect(validate_artifact_component(component));
    }
    for config in project.context_configs.values() {
        collect(validate_context_config(config));
    }
    for component in project.status_components.values() {
        collect(validate_status_component(component));
    }
    for trigger in project.triggers.values() {
        collect(validate_trigger(trigger));
    }
    for trigger in project.scheduled_triggers.values() {
        collect(validate_scheduled_trigger(trigger));
    }
    for (name, environment) in &project.environments {
        collect(validate_environment(name, environment));
    }

    reports
}

/// Validate an environment's credential entries.
pub fn validate_environment(name: &str, environment: &EnvironmentDefinition) -> Result<()> {
    let mut v = Validator::new();
    if name.trim().is_empty() {
        v.violation("name", "must not be empty");
    }
    for (key, credential) in &environment.credentials {
        if credential.id.trim().is_empty() {
            v.violation(format!("credentials.{}.id", key), "must not be empty");
        }
        if credential.credential_type.trim().is_empty() {
            v.violation(format!("credentials.{}.type", key), "must not be empty");
        }
    }
    v.finish("environment", name)
}
