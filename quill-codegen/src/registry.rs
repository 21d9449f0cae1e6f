//! Per-run component registry.
//!
//! The registry maps stable entity ids to their chosen source-level
//! variable names and generated file paths. It is built once per
//! generation run (before any file is generated, so forward references
//! resolve) and discarded afterward.

use quill_core::{QuillError, Result};
use std::collections::{BTreeMap, HashSet};

use crate::naming::{to_camel_case, unique_reference_name};

/// The kinds of addressable entities a project contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    Project,
    Agent,
    SubAgent,
    Tool,
    DataComponent,
    ArtifactComponent,
    ContextConfig,
    StatusComponent,
    Trigger,
    ScheduledTrigger,
    Environment,
}

impl ComponentKind {
    /// Collision suffix appended to a taken camelCase name.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Agent => "Agent",
            Self::SubAgent => "SubAgent",
            Self::Tool => "Tool",
            Self::DataComponent => "DataComponent",
            Self::ArtifactComponent => "ArtifactComponent",
            Self::ContextConfig => "ContextConfig",
            Self::StatusComponent => "StatusComponent",
            Self::Trigger => "Trigger",
            Self::ScheduledTrigger => "ScheduledTrigger",
            Self::Environment => "Env",
        }
    }

    /// Human-readable name used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Agent => "agent",
            Self::SubAgent => "sub-agent",
            Self::Tool => "tool",
            Self::DataComponent => "data component",
            Self::ArtifactComponent => "artifact component",
            Self::ContextConfig => "context config",
            Self::StatusComponent => "status component",
            Self::Trigger => "trigger",
            Self::ScheduledTrigger => "scheduled trigger",
            Self::Environment => "environment",
        }
    }
}

/// A registered component: its chosen variable name and file path.
#[derive(Debug, Clone)]
pub struct ComponentEntry {
    /// Globally unique (per run) variable name used at reference sites.
    pub variable_name: String,
    /// The name the component's own file exports (natural camelCase).
    pub export_name: String,
    /// Generated file path, relative to the output root.
    pub file_path: String,
}

/// A rendered import requirement: where the name comes from and what it
/// is bound to locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// Module specifier relative to the importing file (no extension).
    pub specifier: String,
    /// Name exported by the target module.
    pub exported: String,
    /// Local binding; differs from `exported` when aliased.
    pub local: String,
}

impl ImportBinding {
    /// Render the named-import clause (`name` or `name as alias`).
    pub fn clause(&self) -> String {
        if self.exported == self.local {
            self.local.clone()
        } else {
            format!("{} as {}", self.exported, self.local)
        }
    }
}

/// The per-run id → variable-name/file-path mapping.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: BTreeMap<(ComponentKind, String), ComponentEntry>,
    reserved: HashSet<String>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity, choosing a collision-free variable name.
    ///
    /// Idempotent: registering the same (kind, id) again returns the name
    /// chosen the first time. Registration order decides who keeps a
    /// contested bare name; later entrants receive the kind suffix and
    /// then a numeric suffix.
    pub fn register(&mut self, kind: ComponentKind, id: &str) -> String {
        if let Some(entry) = self.components.get(&(kind, id.to_string())) {
            return entry.variable_name.clone();
        }

        let export_name = to_camel_case(id);
        let variable_name =
            unique_reference_name(&export_name, &mut self.reserved, kind.suffix());
        let entry = ComponentEntry {
            variable_name: variable_name.clone(),
            export_name,
            file_path: file_path_for(kind, id),
        };
        self.components.insert((kind, id.to_string()), entry);
        variable_name
    }

    /// Look up a registered component.
    pub fn get(&self, kind: ComponentKind, id: &str) -> Result<&ComponentEntry> {
        self.components
            .get(&(kind, id.to_string()))
            .ok_or_else(|| QuillError::not_found(kind.display_name(), id))
    }

    /// The chosen variable name for an id; errors for unknown ids.
    pub fn variable_name(&self, kind: ComponentKind, id: &str) -> Result<String> {
        Ok(self.get(kind, id)?.variable_name.clone())
    }

    /// Resolve a list of ids of one kind to their variable names.
    pub fn reference_names(&self, kind: ComponentKind, ids: &[String]) -> Result<Vec<String>> {
        ids.iter().map(|id| self.variable_name(kind, id)).collect()
    }

    /// Compute the deduplicated import bindings `from_file` needs for the
    /// given references, with aliasing wherever the chosen variable name
    /// differs from the exported name.
    pub fn imports_for_file(
        &self,
        from_file: &str,
        refs: &[(ComponentKind, String)],
    ) -> Result<Vec<ImportBinding>> {
        let mut seen = HashSet::new();
        let mut bindings = Vec::new();

        for (kind, id) in refs {
            if !seen.insert((*kind, id.clone())) {
                continue;
            }
            let entry = self.get(*kind, id)?;
            if entry.file_path == from_file {
                // Same-file sibling, no import needed
                continue;
            }
            bindings.push(ImportBinding {
                specifier: relative_specifier(from_file, &entry.file_path),
                exported: entry.export_name.clone(),
                local: entry.variable_name.clone(),
            });
        }

        bindings.sort_by(|a, b| {
            a.specifier
                .cmp(&b.specifier)
                .then_with(|| a.local.cmp(&b.local))
        });
        bindings.dedup();
        Ok(bindings)
    }
}

/// The generated file path for an entity, relative to the output root.
pub fn file_path_for(kind: ComponentKind, id: &str) -> String {
    match kind {
        ComponentKind::Project => "index.ts".to_string(),
        ComponentKind::Agent => format!("agents/{}.ts", id),
        ComponentKind::SubAgent => format!("agents/sub-agents/{}.ts", id),
        ComponentKind::Tool => format!("tools/{}.ts", id),
        ComponentKind::DataComponent => format!("data-components/{}.ts", id),
        ComponentKind::ArtifactComponent => format!("artifact-components/{}.ts", id),
        ComponentKind::ContextConfig => format!("context-configs/{}.ts", id),
        ComponentKind::StatusComponent => format!("status-components/{}.ts", id),
        ComponentKind::Trigger => format!("triggers/{}.ts", id),
        ComponentKind::ScheduledTrigger => format!("scheduled-triggers/{}.ts", id),
        ComponentKind::Environment => format!("environments/{}.env.ts", id),
    }
}

/// Compute the relative module specifier from one generated file to
/// another, without the `.ts` extension.
pub fn relative_specifier(from_file: &str, to_file: &str) -> String {
    let from_dirs: Vec<&str> = from_file.split('/').collect();
    let to_dirs: Vec<&str> = to_file.split('/').collect();
    let from_parent = &from_dirs[..from_dirs.len() - 1];
    let to_parent = &to_dirs[..to_dirs.len() - 1];

    let common = from_parent
        .iter()
        .zip(to_parent.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let ups = from_parent.len() - common;
    let mut parts: Vec<String> = Vec::new();
    if ups == 0 {
        parts.push(".".to_string());
    } else {
        parts.extend(std::iter::repeat("..".to_string()).take(ups));
    }
    parts.extend(to_parent[common..].iter().map(|s| s.to_string()));

    let file_name = to_dirs[to_dirs.len() - 1].trim_end_matches(".ts");
    parts.push(file_name.to_string());
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent_per_id() {
        let mut registry = ComponentRegistry::new();
        let first = registry.register(ComponentKind::Agent, "weather-agent");
        let second = registry.register(ComponentKind::Agent, "weather-agent");
        assert_eq!(first, "weatherAgent");
        assert_eq!(first, second);
    }

    #[test]
    fn test_collision_gets_kind_suffix_then_number() {
        let mut registry = ComponentRegistry::new();
        registry.register(ComponentKind::Agent, "weather");
        let first = registry.register(ComponentKind::SubAgent, "weather");
        let second = registry.register(ComponentKind::SubAgent, "weather.");
        assert_eq!(first, "weatherSubAgent");
        assert_eq!(second, "weatherSubAgent2");
    }

    #[test]
    fn test_unknown_id_names_the_component_map() {
        let registry = ComponentRegistry::new();
        let err = registry
            .variable_name(ComponentKind::Tool, "missing")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "tool 'missing' not found in component name map"
        );
    }

    #[test]
    fn test_relative_specifier_sibling_subdir() {
        assert_eq!(
            relative_specifier("agents/weather-agent.ts", "agents/sub-agents/assistant.ts"),
            "./sub-agents/assistant"
        );
    }

    #[test]
    fn test_relative_specifier_up_and_over() {
        assert_eq!(
            relative_specifier("agents/sub-agents/assistant.ts", "tools/weather-lookup.ts"),
            "../../tools/weather-lookup"
        );
    }

    #[test]
    fn test_relative_specifier_same_dir() {
        assert_eq!(
            relative_specifier("tools/a.ts", "tools/b.ts"),
            "./b"
        );
        assert_eq!(
            relative_specifier("index.ts", "agents/weather-agent.ts"),
            "./agents/weather-agent"
        );
    }

    #[test]
    fn test_imports_alias_when_chosen_name_differs() {
        let mut registry = ComponentRegistry::new();
        registry.register(ComponentKind::Agent, "weather");
        registry.register(ComponentKind::SubAgent, "weather");

        let bindings = registry
            .imports_for_file(
                "agents/weather.ts",
                &[(ComponentKind::SubAgent, "weather".to_string())],
            )
            .unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].clause(), "weather as weatherSubAgent");
        assert_eq!(bindings[0].specifier, "./sub-agents/weather");
    }

    #[test]
    fn test_imports_deduplicate_repeated_references() {
        let mut registry = ComponentRegistry::new();
        registry.register(ComponentKind::Tool, "lookup");

        let refs = vec![
            (ComponentKind::Tool, "lookup".to_string()),
            (ComponentKind::Tool, "lookup".to_string()),
        ];
        let bindings = registry
            .imports_for_file("agents/sub-agents/a.ts", &refs)
            .unwrap();
        assert_eq!(bindings.len(), 1);
    }
}
