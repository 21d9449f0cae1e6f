//! The pull pipeline: fetch, validate, generate, merge, write, verify.

use anyhow::{bail, Context, Result};
use quill_codegen::compare::compare_project_definitions;
use quill_codegen::plan::generate_project_units;
use quill_codegen::reader::load_project;
use quill_codegen::{MergeEngine, MergeOutcome};
use quill_core::config::QuillConfig;
use quill_core::project::FullProjectDefinition;
use quill_core::validate::validate_full_project;
use quill_core::QuillError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::api::ManageApiClient;
use crate::output::{self, OutputFormat};

/// Options resolved from the `pull` command line.
#[derive(Debug, Clone, Default)]
pub struct PullOptions {
    /// Project id; falls back to the configured default
    pub project: Option<String>,
    /// Pull every project of the tenant
    pub all: bool,
    /// Overwrite files without merging
    pub force: bool,
    /// Discard and fully rewrite all output, bypassing the merge engine
    pub introspect: bool,
    /// Print the raw fetched definition instead of generating
    pub format: OutputFormat,
    /// Restrict environment generation to one environment
    pub env: Option<String>,
    /// Pin the fetch to a tagged definition version
    pub tag: Option<String>,
    /// Output directory override
    pub output: Option<PathBuf>,
}

/// Per-project result counters.
#[derive(Debug, Default)]
pub struct PullSummary {
    pub written: usize,
    pub merged: usize,
    pub unchanged: usize,
}

/// Entry point for `quill pull`.
pub async fn run_pull(config: &QuillConfig, options: PullOptions) -> Result<()> {
    let client = ManageApiClient::new(&config.api)?;
    let output_dir = options
        .output
        .clone()
        .unwrap_or_else(|| config.project.output_dir.clone());

    if options.all {
        return pull_all(&client, config, &options, &output_dir).await;
    }

    let project_id = options
        .project
        .clone()
        .or_else(|| config.project.id.clone())
        .context("No project id given; pass --project or set project.id in quill.toml")?;

    let spinner = output::spinner(format!("Fetching project '{}'...", project_id));
    let definition = client
        .get_project(&project_id, options.tag.as_deref())
        .await;
    spinner.finish_and_clear();
    let definition = definition?;

    if options.format == OutputFormat::Json {
        return output::json(&definition);
    }

    let summary = pull_one(&definition, config, &options, &output_dir)?;
    output::success(format!(
        "Pulled '{}': {} written, {} merged, {} unchanged",
        project_id, summary.written, summary.merged, summary.unchanged
    ));
    Ok(())
}

/// Pull every project of the tenant. Definitions are fetched concurrently;
/// one project's failure does not abort the others.
async fn pull_all(
    client: &ManageApiClient,
    config: &QuillConfig,
    options: &PullOptions,
    output_dir: &Path,
) -> Result<()> {
    let spinner = output::spinner("Listing projects...");
    let projects = client.list_projects().await;
    spinner.finish_and_clear();
    let projects = projects?;

    if projects.is_empty() {
        output::info("No projects found for this tenant");
        return Ok(());
    }

    let fetches = projects.iter().map(|summary| {
        let id = summary.id.clone();
        async move { (id.clone(), client.get_project(&id, options.tag.as_deref()).await) }
    });
    let definitions = futures::future::join_all(fetches).await;

    if options.format == OutputFormat::Json {
        let fetched: Vec<&FullProjectDefinition> = definitions
            .iter()
            .filter_map(|(_, result)| result.as_ref().ok())
            .collect();
        return output::json(&fetched);
    }

    let mut failures = 0;
    for (project_id, fetched) in definitions {
        let result = fetched.map_err(anyhow::Error::from).and_then(|definition| {
            pull_one(&definition, config, options, &output_dir.join(&project_id))
        });
        match result {
            Ok(summary) => output::success(format!(
                "Pulled '{}': {} written, {} merged, {} unchanged",
                project_id, summary.written, summary.merged, summary.unchanged
            )),
            Err(e) => {
                failures += 1;
                output::error(format!("Project '{}' failed: {:#}", project_id, e));
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} projects failed", failures, projects.len());
    }
    Ok(())
}

/// Generate one project into `output_dir`.
///
/// Every file is generated and (when applicable) merged in memory first;
/// nothing touches the filesystem until the whole set has succeeded.
pub fn pull_one(
    definition: &FullProjectDefinition,
    config: &QuillConfig,
    options: &PullOptions,
    output_dir: &Path,
) -> Result<PullSummary> {
    let reports = validate_full_project(definition);
    if !reports.is_empty() {
        for report in &reports {
            output::error(report.to_string());
        }
        bail!(
            "Project '{}' failed validation ({} invalid entities)",
            definition.id,
            reports.len()
        );
    }

    let definition = restrict_environments(definition, options.env.as_deref())?;
    let units = generate_project_units(&definition, &config.style)?;

    let mut engine = MergeEngine::new()?;
    let mut summary = PullSummary::default();
    let mut writes: Vec<(PathBuf, String)> = Vec::new();

    for (entity_id, unit) in &units {
        let target = output_dir.join(&unit.file_path);
        let fresh = unit.render(&config.style);

        let existing = match fs::read_to_string(&target) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(e).context(format!("Failed to read {}", target.display()));
            }
        };

        let (new_text, was_merge) = match existing {
            None => (fresh, false),
            Some(ref text) if text == &fresh => {
                summary.unchanged += 1;
                continue;
            }
            Some(_) if options.force || options.introspect || !mergeable(&unit.file_path) => {
                debug!(path = %unit.file_path, "Overwriting");
                (fresh, false)
            }
            Some(ref text) => match engine.merge(text, unit, entity_id, &config.style) {
                Ok((merged, outcome)) => {
                    debug!(path = %unit.file_path, ?outcome, "Merged");
                    let was_merge = outcome != MergeOutcome::Fresh;
                    (merged, was_merge)
                }
                Err(QuillError::Parse(reason)) => {
                    warn!(path = %unit.file_path, %reason, "Merge parse failed");
                    output::warning(format!(
                        "{} could not be parsed, overwriting ({})",
                        unit.file_path, reason
                    ));
                    (fresh, false)
                }
                Err(e) => return Err(e.into()),
            },
        };

        if existing.as_deref() == Some(new_text.as_str()) {
            summary.unchanged += 1;
            continue;
        }
        if was_merge {
            summary.merged += 1;
        } else {
            summary.written += 1;
        }
        writes.push((target, new_text));
    }

    for (path, text) in &writes {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    verify_round_trip(&definition, output_dir)?;
    Ok(summary)
}

/// The environments index aggregates every environment under one
/// declaration without an id property, so there is nothing to anchor a
/// merge on; it is always rewritten whole.
fn mergeable(file_path: &str) -> bool {
    file_path != "environments/index.ts"
}

/// Restrict the definition's environments to one named environment.
fn restrict_environments(
    definition: &FullProjectDefinition,
    env: Option<&str>,
) -> Result<FullProjectDefinition> {
    let Some(env) = env else {
        return Ok(definition.clone());
    };
    if !definition.environments.contains_key(env) {
        bail!(
            "Environment '{}' not found in project '{}' (available: {})",
            env,
            definition.id,
            definition
                .environments
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    let mut restricted = definition.clone();
    restricted
        .environments
        .retain(|name, _| name == env);
    Ok(restricted)
}

/// Read the written tree back and compare it structurally against the
/// fetched definition. Differences are hard failures; unknown extra
/// fields (stale files from earlier pulls) are surfaced as warnings.
fn verify_round_trip(definition: &FullProjectDefinition, output_dir: &Path) -> Result<()> {
    let loaded = load_project(output_dir).context("Failed to read back generated tree")?;
    let comparison = compare_project_definitions(definition, &loaded);

    for warning in &comparison.warnings {
        output::warning(warning.to_string());
    }
    if !comparison.matches {
        for difference in &comparison.differences {
            output::error(difference.to_string());
        }
        return Err(QuillError::comparison(format!(
            "Generated tree does not round-trip ({} differences)",
            comparison.differences.len()
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::project::{AgentDefinition, EnvironmentDefinition, SubAgentDefinition};
    use std::collections::BTreeMap;

    fn fixture() -> FullProjectDefinition {
        let mut sub_agents = BTreeMap::new();
        sub_agents.insert(
            "assistant".to_string(),
            SubAgentDefinition {
                id: "assistant".to_string(),
                name: "Assistant".to_string(),
                prompt: "Help.".to_string(),
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
        let mut environments = BTreeMap::new();
        environments.insert("development".to_string(), EnvironmentDefinition::default());
        environments.insert("production".to_string(), EnvironmentDefinition::default());
        FullProjectDefinition {
            id: "demo".to_string(),
            name: "Demo".to_string(),
            agents,
            environments,
            ..Default::default()
        }
    }

    #[test]
    fn test_pull_one_writes_then_reports_unchanged() {
        let definition = fixture();
        let config = QuillConfig::default();
        let options = PullOptions::default();
        let dir = tempfile::tempdir().unwrap();

        let first = pull_one(&definition, &config, &options, dir.path()).unwrap();
        assert!(first.written > 0);
        assert_eq!(first.unchanged, 0);

        let second = pull_one(&definition, &config, &options, dir.path()).unwrap();
        assert_eq!(second.written, 0);
        assert_eq!(second.merged, 0);
        assert_eq!(second.unchanged, first.written);
    }

    #[test]
    fn test_unparseable_file_is_overwritten() {
        let definition = fixture();
        let config = QuillConfig::default();
        let options = PullOptions::default();
        let dir = tempfile::tempdir().unwrap();

        pull_one(&definition, &config, &options, dir.path()).unwrap();
        let target = dir.path().join("agents/helper.ts");
        fs::write(&target, "export const helper = agent({ id: 'helper',").unwrap();

        let summary = pull_one(&definition, &config, &options, dir.path()).unwrap();
        assert_eq!(summary.written, 1);
        assert_eq!(summary.merged, 0);
        let restored = fs::read_to_string(&target).unwrap();
        assert!(restored.contains("export const helper = agent({"));
        assert!(restored.contains("name: 'Helper'"));
    }

    #[test]
    fn test_env_restriction() {
        let definition = fixture();
        let restricted = restrict_environments(&definition, Some("development")).unwrap();
        assert_eq!(restricted.environments.len(), 1);
        assert!(restricted.environments.contains_key("development"));

        let missing = restrict_environments(&definition, Some("staging"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_invalid_project_writes_nothing() {
        let mut definition = fixture();
        definition
            .agents
            .get_mut("helper")
            .unwrap()
            .default_sub_agent_id = "missing".to_string();
        let config = QuillConfig::default();
        let dir = tempfile::tempdir().unwrap();

        let result = pull_one(&definition, &config, &PullOptions::default(), dir.path());
        assert!(result.is_err());
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
