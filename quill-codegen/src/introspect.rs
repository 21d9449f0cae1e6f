//! Introspection merge engine.
//!
//! Regeneration against an existing file tree is a structural patch guided
//! by semantic identity, not a textual diff: parse the existing file,
//! locate the top-level `export const` whose factory call carries the
//! matching `id` string property, and splice in the freshly rendered
//! initializer. Everything else in the file, comments included, is left
//! byte-for-byte untouched. A file that fails to parse falls back to a
//! full overwrite at the call site, never blocking its siblings.

use quill_core::style::CodeStyle;
use quill_core::{QuillError, Result};
use std::collections::BTreeMap;
use tracing::debug;
use tree_sitter::{Node, Parser, Tree};

use crate::source_unit::{SourceUnit, SDK_PACKAGE};

/// How a target file was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Full generated unit written verbatim (no existing file, or forced)
    Fresh,
    /// Matching declaration found and its initializer replaced
    Merged,
    /// Entity was new; declaration appended and imports merged
    Appended,
}

/// A pending byte-range edit, applied in reverse order.
#[derive(Debug, Clone)]
struct Edit {
    start: usize,
    end: usize,
    new_text: String,
}

/// Tree-sitter backed merge engine for generated TypeScript files.
pub struct MergeEngine {
    parser: Parser,
}

impl MergeEngine {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .map_err(|e| QuillError::parse(format!("Failed to set parser language: {}", e)))?;
        Ok(Self { parser })
    }

    /// Merge `unit` into `existing` file text, returning the new text.
    ///
    /// Errors when the existing source does not parse; the caller is
    /// expected to degrade to a fresh write.
    pub fn merge(
        &mut self,
        existing: &str,
        unit: &SourceUnit,
        entity_id: &str,
        style: &CodeStyle,
    ) -> Result<(String, MergeOutcome)> {
        let tree = self
            .parser
            .parse(existing, None)
            .ok_or_else(|| QuillError::parse("Failed to parse existing source".to_string()))?;
        if tree.root_node().has_error() {
            return Err(QuillError::parse(
                "Existing source contains syntax errors".to_string(),
            ));
        }

        let mut edits = Vec::new();
        let outcome = match find_declaration_value(&tree, existing, entity_id) {
            Some(value_node) => {
                debug!(entity_id, file = %unit.file_path, "Replacing matched declaration");
                let initializer = format!("{}({})", unit.factory, unit.body.render(style, 0));
                edits.push(Edit {
                    start: value_node.start_byte(),
                    end: value_node.end_byte(),
                    new_text: initializer,
                });
                MergeOutcome::Merged
            }
            None => {
                debug!(entity_id, file = %unit.file_path, "No matching declaration, appending");
                let mut declaration = String::new();
                if !existing.ends_with('\n') {
                    declaration.push('\n');
                }
                declaration.push('\n');
                declaration.push_str(&unit.render_declaration(style));
                declaration.push('\n');
                edits.push(Edit {
                    start: existing.len(),
                    end: existing.len(),
                    new_text: declaration,
                });
                MergeOutcome::Appended
            }
        };

        edits.extend(self.merge_imports(&tree, existing, unit, style));

        Ok((apply_edits(existing, edits), outcome))
    }

    /// Compute the edits that bring the existing import block up to date
    /// with the unit's requirements, deduplicating by module specifier.
    fn merge_imports(
        &self,
        tree: &Tree,
        source: &str,
        unit: &SourceUnit,
        style: &CodeStyle,
    ) -> Vec<Edit> {
        // Required names per specifier, SDK first.
        let mut required: BTreeMap<String, Vec<String>> = BTreeMap::new();
        required
            .entry(SDK_PACKAGE.to_string())
            .or_default()
            .extend(unit.sdk_imports.iter().cloned());
        for binding in &unit.bindings {
            let clauses = required.entry(binding.specifier.clone()).or_default();
            if !clauses.contains(&binding.clause()) {
                clauses.push(binding.clause());
            }
        }

        let imports = collect_imports(tree, source);
        let mut edits = Vec::new();
        let mut new_lines = Vec::new();

        for (specifier, clauses) in required {
            match imports.iter().find(|i| i.specifier == specifier) {
                Some(existing_import) => {
                    let missing: Vec<String> = clauses
                        .iter()
                        .filter(|clause| {
                            let local = clause
                                .rsplit(" as ")
                                .next()
                                .unwrap_or(clause)
                                .to_string();
                            !existing_import.names.iter().any(|n| {
                                n == clause.as_str()
                                    || n.rsplit(" as ").next().unwrap_or(n) == local
                            })
                        })
                        .cloned()
                        .collect();
                    if !missing.is_empty() {
                        let mut union = existing_import.names.clone();
                        union.extend(missing);
                        if let Some((start, end)) = existing_import.named_range {
                            edits.push(Edit {
                                start,
                                end,
                                new_text: format!("{{ {} }}", union.join(", ")),
                            });
                        }
                    }
                }
                None => {
                    let quote = style.quote_char();
                    new_lines.push(format!(
                        "import {{ {} }} from {}{}{}{}",
                        clauses.join(", "),
                        quote,
                        specifier,
                        quote,
                        style.semi()
                    ));
                }
            }
        }

        if !new_lines.is_empty() {
            let insert_at = imports.last().map(|i| i.end_byte).unwrap_or(0);
            let prefix = if insert_at == 0 { "" } else { "\n" };
            let suffix = if insert_at == 0 { "\n" } else { "" };
            edits.push(Edit {
                start: insert_at,
                end: insert_at,
                new_text: format!("{}{}{}", prefix, new_lines.join("\n"), suffix),
            });
        }

        edits
    }
}

/// An existing import statement's relevant facts.
#[derive(Debug)]
struct ExistingImport {
    specifier: String,
    names: Vec<String>,
    /// Byte range of the `{ ... }` named-imports group, if present.
    named_range: Option<(usize, usize)>,
    end_byte: usize,
}

fn collect_imports(tree: &Tree, source: &str) -> Vec<ExistingImport> {
    let root = tree.root_node();
    let mut imports = Vec::new();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() != "import_statement" {
            continue;
        }
        let Some(source_node) = child.child_by_field_name("source") else {
            continue;
        };
        let specifier = string_value(source_node, source).unwrap_or_default();

        let mut names = Vec::new();
        let mut named_range = None;
        if let Some(named) = find_descendant(child, "named_imports") {
            named_range = Some((named.start_byte(), named.end_byte()));
            let mut named_cursor = named.walk();
            for spec in named.children(&mut named_cursor) {
                if spec.kind() == "import_specifier" {
                    names.push(node_text(spec, source).to_string());
                }
            }
        }

        imports.push(ExistingImport {
            specifier,
            names,
            named_range,
            end_byte: child.end_byte(),
        });
    }
    imports
}

/// Find the initializer (call expression) of the top-level `export const`
/// whose object argument has an `id` string property equal to `entity_id`.
fn find_declaration_value<'tree>(
    tree: &'tree Tree,
    source: &str,
    entity_id: &str,
) -> Option<Node<'tree>> {
    let root = tree.root_node();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() != "export_statement" {
            continue;
        }
        let Some(declaration) = find_descendant(child, "lexical_declaration") else {
            continue;
        };
        let Some(declarator) = find_descendant(declaration, "variable_declarator") else {
            continue;
        };
        let Some(value) = declarator.child_by_field_name("value") else {
            continue;
        };
        if value.kind() != "call_expression" {
            continue;
        }
        if call_id_property(value, source).as_deref() == Some(entity_id) {
            return Some(value);
        }
    }
    None
}

/// Extract the `id` string property from a factory call's object argument.
fn call_id_property(call: Node, source: &str) -> Option<String> {
    let arguments = call.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let object = arguments
        .children(&mut cursor)
        .find(|n| n.kind() == "object")?;

    let mut cursor = object.walk();
    for pair in object.children(&mut cursor) {
        if pair.kind() != "pair" {
            continue;
        }
        let key = pair.child_by_field_name("key")?;
        let key_text = match key.kind() {
            "property_identifier" => node_text(key, source).to_string(),
            "string" => string_value(key, source)?,
            _ => continue,
        };
        if key_text == "id" {
            let value = pair.child_by_field_name("value")?;
            return string_value(value, source);
        }
    }
    None
}

/// The unquoted content of a string or template-string node.
fn string_value(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "string" | "template_string" => {
            let mut cursor = node.walk();
            let fragment = node
                .children(&mut cursor)
                .find(|n| n.kind() == "string_fragment" || n.kind() == "template_string_fragment")?;
            Some(node_text(fragment, source).to_string())
        }
        _ => None,
    }
}

fn find_descendant<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    if node.kind() == kind {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_descendant(child, kind) {
            return Some(found);
        }
    }
    None
}

fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

/// Apply byte-range edits in reverse order so earlier offsets stay valid.
fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| b.start.cmp(&a.start));
    let mut result = source.to_string();
    for edit in edits {
        let start = edit.start.min(result.len());
        let end = edit.end.min(result.len());
        result.replace_range(start..end, &edit.new_text);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ObjectLiteral;
    use pretty_assertions::assert_eq;

    fn unit_for(id: &str, name: &str) -> SourceUnit {
        let style = CodeStyle::default();
        let mut body = ObjectLiteral::new();
        body.string("id", id, &style);
        body.string("name", name, &style);
        SourceUnit::new(
            format!("tools/{}.ts", id),
            "mcpTool",
            crate::naming::to_camel_case(id),
            body,
        )
    }

    #[test]
    fn test_merge_replaces_only_matching_initializer() {
        let existing = "\
import { mcpTool } from '@quill/sdk';

// Hand-written note about this tool.
export const weatherLookup = mcpTool({
  id: 'weather-lookup',
  name: 'Old Name'
});
";
        let unit = unit_for("weather-lookup", "New Name");
        let style = CodeStyle::default();
        let mut engine = MergeEngine::new().unwrap();

        let (merged, outcome) = engine
            .merge(existing, &unit, "weather-lookup", &style)
            .unwrap();
        assert_eq!(outcome, MergeOutcome::Merged);
        assert!(merged.contains("// Hand-written note about this tool."));
        assert!(merged.contains("name: 'New Name'"));
        assert!(!merged.contains("Old Name"));
    }

    #[test]
    fn test_merge_appends_new_entity_with_imports() {
        let existing = "\
import { mcpTool } from '@quill/sdk';

export const weatherLookup = mcpTool({
  id: 'weather-lookup',
  name: 'Weather Lookup'
});
";
        let unit = unit_for("geo-lookup", "Geo Lookup");
        let style = CodeStyle::default();
        let mut engine = MergeEngine::new().unwrap();

        let (merged, outcome) = engine.merge(existing, &unit, "geo-lookup", &style).unwrap();
        assert_eq!(outcome, MergeOutcome::Appended);
        // Existing declaration untouched, new one appended
        assert!(merged.contains("export const weatherLookup"));
        assert!(merged.contains("export const geoLookup = mcpTool({"));
        // SDK import not duplicated
        assert_eq!(merged.matches("from '@quill/sdk'").count(), 1);
    }

    #[test]
    fn test_merge_unions_named_imports_for_shared_specifier() {
        let existing = "\
import { mcpTool } from '@quill/sdk';

export const other = mcpTool({
  id: 'other',
  name: 'Other'
});
";
        let style = CodeStyle::default();
        let mut body = ObjectLiteral::new();
        body.string("id", "d", &style);
        body.string("name", "D", &style);
        let unit = SourceUnit::new("data-components/d.ts", "dataComponent", "d", body);

        let mut engine = MergeEngine::new().unwrap();
        let (merged, _) = engine.merge(existing, &unit, "d", &style).unwrap();
        assert!(merged.contains("import { mcpTool, dataComponent } from '@quill/sdk';"));
    }

    #[test]
    fn test_broken_source_is_a_parse_error() {
        let existing = "export const broken = mcpTool({ id: 'x',"; // unterminated
        let unit = unit_for("x", "X");
        let style = CodeStyle::default();
        let mut engine = MergeEngine::new().unwrap();

        let err = engine.merge(existing, &unit, "x", &style).unwrap_err();
        assert!(matches!(err, QuillError::Parse(_)));
    }

    #[test]
    fn test_sibling_declarations_are_untouched() {
        let existing = "\
import { subAgent } from '@quill/sdk';

export const assistant = subAgent({
  id: 'assistant',
  name: 'Assistant',
  prompt: 'Help.'
});

/* Keep me. */
export const forecaster = subAgent({
  id: 'forecaster',
  name: 'Forecaster',
  prompt: 'Forecast.'
});
";
        let style = CodeStyle::default();
        let mut body = ObjectLiteral::new();
        body.string("id", "assistant", &style);
        body.string("name", "Assistant 2.0", &style);
        body.string("prompt", "Help better.", &style);
        let unit = SourceUnit::new(
            "agents/sub-agents/assistant.ts",
            "subAgent",
            "assistant",
            body,
        );

        let mut engine = MergeEngine::new().unwrap();
        let (merged, _) = engine.merge(existing, &unit, "assistant", &style).unwrap();
        assert!(merged.contains("/* Keep me. */"));
        assert!(merged.contains("name: 'Forecaster'"));
        assert!(merged.contains("name: 'Assistant 2.0'"));
    }
}
