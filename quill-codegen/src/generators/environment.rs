//! Environment generators (`environments/<env>.env.ts`, `environments/index.ts`).

use quill_core::project::EnvironmentDefinition;
use quill_core::style::CodeStyle;
use quill_core::validate::validate_environment;
use quill_core::Result;

use crate::format::ObjectLiteral;
use crate::registry::{ComponentKind, ComponentRegistry};
use crate::source_unit::SourceUnit;

/// Generate the source unit for one environment's credential settings.
pub fn generate_environment(
    name: &str,
    environment: &EnvironmentDefinition,
    style: &CodeStyle,
    registry: &ComponentRegistry,
) -> Result<SourceUnit> {
    validate_environment(name, environment)?;

    let entry = registry.get(ComponentKind::Environment, name)?;
    let mut body = ObjectLiteral::new();
    if !environment.credentials.is_empty() {
        let value = serde_json::to_value(&environment.credentials)?;
        body.optional_json("credentials", Some(&value), style, 1);
    }

    Ok(SourceUnit::new(
        entry.file_path.clone(),
        "environmentSettings",
        entry.export_name.clone(),
        body,
    ))
}

/// Generate `environments/index.ts`, aggregating every environment.
///
/// Style only matters at render time here; the body is all shorthand
/// references.
pub fn generate_environments_index(
    names: &[String],
    _style: &CodeStyle,
    registry: &ComponentRegistry,
) -> Result<SourceUnit> {
    let mut body = ObjectLiteral::new();
    let mut refs = Vec::with_capacity(names.len());
    for name in names {
        let variable = registry.variable_name(ComponentKind::Environment, name)?;
        body.raw(&variable, variable.clone());
        refs.push((ComponentKind::Environment, name.clone()));
    }

    let mut unit = SourceUnit::new(
        "environments/index.ts",
        "createEnvironmentSettings",
        "environments",
        body,
    );
    unit.bindings = registry.imports_for_file("environments/index.ts", &refs)?;
    Ok(unit)
}
