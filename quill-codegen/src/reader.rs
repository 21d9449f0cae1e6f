//! Generated-source reader.
//!
//! Parses a generated project tree back into a `FullProjectDefinition` for
//! the round-trip comparison after a pull. The reader resolves reference
//! identifiers through each file's import list back to entity ids, and is
//! tolerant of hand-added comments around the generated declarations.

use quill_core::project::FullProjectDefinition;
use quill_core::{QuillError, Result};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;
use tree_sitter::{Node, Parser};

/// A decoded property value inside a factory call.
#[derive(Debug, Clone)]
enum TsValue {
    /// A literal (string, number, bool, object, array)
    Json(Value),
    /// A bare identifier reference
    Ref(String),
    /// `() => [...]` of references, each optionally `x.with({...})`
    RefArray(Vec<TsRef>),
    /// Anything else, carried as raw source text
    Raw(String),
}

#[derive(Debug, Clone)]
struct TsRef {
    name: String,
    overrides: Option<Value>,
}

/// One `export const <var> = <factory>({...})` declaration.
#[derive(Debug, Clone)]
struct EntitySnapshot {
    variable: String,
    factory: String,
    props: Vec<(String, TsValue)>,
}

impl EntitySnapshot {
    fn id(&self) -> Option<&str> {
        self.props.iter().find_map(|(key, value)| match value {
            TsValue::Json(Value::String(s)) if key == "id" => Some(s.as_str()),
            _ => None,
        })
    }

    fn get(&self, key: &str) -> Option<&TsValue> {
        self.props
            .iter()
            .find_map(|(k, v)| if k == key { Some(v) } else { None })
    }
}

/// One named import: where it comes from and the name the source module
/// exports it under (which differs from the local binding when aliased).
#[derive(Debug, Clone)]
struct ImportRecord {
    specifier: String,
    exported: String,
}

/// One parsed file: declarations plus the local-name → import record map.
#[derive(Debug, Clone)]
struct FileSnapshot {
    path: String,
    entities: Vec<EntitySnapshot>,
    imports: BTreeMap<String, ImportRecord>,
}

/// Parses generated TypeScript files.
pub struct Reader {
    parser: Parser,
}

impl Reader {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .map_err(|e| QuillError::parse(format!("Failed to set parser language: {}", e)))?;
        Ok(Self { parser })
    }

    fn parse_file(&mut self, path: &str, source: &str) -> Result<FileSnapshot> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| QuillError::parse(format!("Failed to parse {}", path)))?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(QuillError::parse(format!(
                "{} contains syntax errors",
                path
            )));
        }

        let mut entities = Vec::new();
        let mut imports = BTreeMap::new();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "import_statement" => collect_import(child, source, &mut imports),
                "export_statement" => {
                    if let Some(entity) = decode_export(child, source) {
                        entities.push(entity);
                    }
                }
                _ => {}
            }
        }

        Ok(FileSnapshot {
            path: path.to_string(),
            entities,
            imports,
        })
    }
}

fn collect_import(node: Node, source: &str, imports: &mut BTreeMap<String, ImportRecord>) {
    let Some(source_node) = node.child_by_field_name("source") else {
        return;
    };
    let Some(specifier) = string_value(source_node, source) else {
        return;
    };
    if let Some(named) = find_descendant(node, "named_imports") {
        let mut cursor = named.walk();
        for spec in named.children(&mut cursor) {
            if spec.kind() != "import_specifier" {
                continue;
            }
            // `name` or `name as alias`; the local binding is the alias
            let Some(exported) = spec
                .child_by_field_name("name")
                .map(|n| node_text(n, source).to_string())
            else {
                continue;
            };
            let local = spec
                .child_by_field_name("alias")
                .map(|n| node_text(n, source).to_string())
                .unwrap_or_else(|| exported.clone());
            imports.insert(
                local,
                ImportRecord {
                    specifier: specifier.clone(),
                    exported,
                },
            );
        }
    }
}

fn decode_export(node: Node, source: &str) -> Option<EntitySnapshot> {
    let declaration = find_descendant(node, "variable_declarator")?;
    let variable = node_text(declaration.child_by_field_name("name")?, source).to_string();
    let value = declaration.child_by_field_name("value")?;
    if value.kind() != "call_expression" {
        return None;
    }
    let factory = node_text(value.child_by_field_name("function")?, source).to_string();
    let arguments = value.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let object = arguments
        .children(&mut cursor)
        .find(|n| n.kind() == "object")?;

    let mut props = Vec::new();
    let mut cursor = object.walk();
    for pair in object.children(&mut cursor) {
        match pair.kind() {
            "pair" => {
                let key = pair.child_by_field_name("key")?;
                let key_text = match key.kind() {
                    "property_identifier" => node_text(key, source).to_string(),
                    "string" => string_value(key, source)?,
                    _ => continue,
                };
                let value_node = pair.child_by_field_name("value")?;
                props.push((key_text, decode_value(value_node, source)));
            }
            "shorthand_property_identifier" => {
                let name = node_text(pair, source).to_string();
                props.push((name.clone(), TsValue::Ref(name)));
            }
            _ => {}
        }
    }

    Some(EntitySnapshot {
        variable,
        factory,
        props,
    })
}

fn decode_value(node: Node, source: &str) -> TsValue {
    match node.kind() {
        "string" | "template_string" => match string_value(node, source) {
            Some(s) => TsValue::Json(Value::String(s)),
            None => TsValue::Json(Value::String(String::new())),
        },
        "number" => {
            let text = node_text(node, source);
            match text.parse::<i64>() {
                Ok(n) => TsValue::Json(json!(n)),
                Err(_) => text
                    .parse::<f64>()
                    .map(|f| TsValue::Json(json!(f)))
                    .unwrap_or_else(|_| TsValue::Raw(text.to_string())),
            }
        }
        "true" => TsValue::Json(Value::Bool(true)),
        "false" => TsValue::Json(Value::Bool(false)),
        "null" => TsValue::Json(Value::Null),
        "identifier" => TsValue::Ref(node_text(node, source).to_string()),
        "object" => TsValue::Json(decode_object(node, source)),
        "array" => TsValue::Json(decode_array(node, source)),
        "arrow_function" => {
            let Some(body) = node.child_by_field_name("body") else {
                return TsValue::Raw(node_text(node, source).to_string());
            };
            if body.kind() != "array" {
                return TsValue::Raw(node_text(node, source).to_string());
            }
            let mut refs = Vec::new();
            let mut cursor = body.walk();
            for element in body.children(&mut cursor) {
                match element.kind() {
                    "identifier" => refs.push(TsRef {
                        name: node_text(element, source).to_string(),
                        overrides: None,
                    }),
                    "call_expression" => {
                        if let Some(ts_ref) = decode_with_call(element, source) {
                            refs.push(ts_ref);
                        }
                    }
                    _ => {}
                }
            }
            TsValue::RefArray(refs)
        }
        _ => TsValue::Raw(node_text(node, source).to_string()),
    }
}

/// Decode a `tool.with({...})` reference element.
fn decode_with_call(node: Node, source: &str) -> Option<TsRef> {
    let function = node.child_by_field_name("function")?;
    if function.kind() != "member_expression" {
        return None;
    }
    let object = function.child_by_field_name("object")?;
    let property = function.child_by_field_name("property")?;
    if node_text(property, source) != "with" {
        return None;
    }
    let arguments = node.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let overrides = arguments
        .children(&mut cursor)
        .find(|n| n.kind() == "object")
        .map(|obj| decode_object(obj, source));
    Some(TsRef {
        name: node_text(object, source).to_string(),
        overrides,
    })
}

fn decode_object(node: Node, source: &str) -> Value {
    let mut map = Map::new();
    let mut cursor = node.walk();
    for pair in node.children(&mut cursor) {
        if pair.kind() != "pair" {
            continue;
        }
        let Some(key) = pair.child_by_field_name("key") else {
            continue;
        };
        let key_text = match key.kind() {
            "property_identifier" => node_text(key, source).to_string(),
            "string" => match string_value(key, source) {
                Some(s) => s,
                None => continue,
            },
            _ => continue,
        };
        let Some(value_node) = pair.child_by_field_name("value") else {
            continue;
        };
        let value = match decode_value(value_node, source) {
            TsValue::Json(v) => v,
            TsValue::Ref(name) => Value::String(name),
            TsValue::RefArray(refs) => {
                Value::Array(refs.into_iter().map(|r| Value::String(r.name)).collect())
            }
            TsValue::Raw(text) => Value::String(text),
        };
        map.insert(key_text, value);
    }
    Value::Object(map)
}

fn decode_array(node: Node, source: &str) -> Value {
    let mut items = Vec::new();
    let mut cursor = node.walk();
    for element in node.children(&mut cursor) {
        match decode_value(element, source) {
            TsValue::Json(v) => items.push(v),
            TsValue::Ref(name) => items.push(Value::String(name)),
            _ => {}
        }
    }
    Value::Array(items)
}

fn string_value(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "string" | "template_string" => {
            let mut out = String::new();
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                match child.kind() {
                    "string_fragment" | "template_string_fragment" => {
                        out.push_str(node_text(child, source));
                    }
                    "escape_sequence" => {
                        out.push_str(&unescape(node_text(child, source)));
                    }
                    _ => {}
                }
            }
            Some(out)
        }
        _ => None,
    }
}

fn unescape(escape: &str) -> String {
    match escape {
        "\\n" => "\n".to_string(),
        "\\r" => "\r".to_string(),
        "\\t" => "\t".to_string(),
        "\\\\" => "\\".to_string(),
        "\\'" => "'".to_string(),
        "\\\"" => "\"".to_string(),
        "\\`" => "`".to_string(),
        "\\$" => "$".to_string(),
        other => other.trim_start_matches('\\').to_string(),
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

/// Resolve a relative module specifier against the importing file's path,
/// yielding the canonical generated-file path.
fn resolve_specifier(from_file: &str, specifier: &str) -> String {
    let mut parts: Vec<&str> = from_file.split('/').collect();
    parts.pop(); // drop the file name
    for segment in specifier.split('/') {
        match segment {
            "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("{}.ts", parts.join("/"))
}

/// Load a generated project tree back into a `FullProjectDefinition`.
pub fn load_project(root: &Path) -> Result<FullProjectDefinition> {
    let mut reader = Reader::new()?;
    let mut files: BTreeMap<String, FileSnapshot> = BTreeMap::new();
    collect_ts_files(root, root, &mut reader, &mut files)?;
    debug!(files = files.len(), root = %root.display(), "Parsed generated tree");

    // First pass: map (file, variable) -> entity id for reference resolution.
    let mut ids_by_file: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for (path, snapshot) in &files {
        let mut vars = BTreeMap::new();
        for entity in &snapshot.entities {
            if let Some(id) = entity.id() {
                vars.insert(entity.variable.clone(), id.to_string());
            }
        }
        ids_by_file.insert(path.clone(), vars);
    }

    let resolve = |file: &FileSnapshot, name: &str| -> Result<String> {
        if let Some(id) = ids_by_file.get(&file.path).and_then(|vars| vars.get(name)) {
            return Ok(id.clone());
        }
        let import = file.imports.get(name).ok_or_else(|| {
            QuillError::reference(format!("'{}' is not defined or imported in {}", name, file.path))
        })?;
        let target = resolve_specifier(&file.path, &import.specifier);
        ids_by_file
            .get(&target)
            .and_then(|vars| vars.get(&import.exported).cloned())
            .ok_or_else(|| {
                QuillError::reference(format!(
                    "'{}' in {} does not match an export of {}",
                    name, file.path, target
                ))
            })
    };

    let mut project = Map::new();
    let mut agents = Map::new();
    let mut tools = Map::new();
    let mut data_components = Map::new();
    let mut artifact_components = Map::new();
    let mut context_configs = Map::new();
    let mut status_components = Map::new();
    let mut triggers = Map::new();
    let mut scheduled_triggers = Map::new();
    let mut environments = Map::new();

    for (path, file) in &files {
        for entity in &file.entities {
            match entity.factory.as_str() {
                "project" => {
                    project = plain_props(entity);
                    project.remove("agents");
                }
                "agent" => {
                    let Some(id) = entity.id() else { continue };
                    let mut record = plain_props(entity);
                    if let Some(TsValue::Ref(name)) = entity.get("defaultSubAgent") {
                        record.insert(
                            "defaultSubAgentId".to_string(),
                            Value::String(resolve(file, name)?),
                        );
                    }

                    let mut sub_agent_map = Map::new();
                    if let Some(TsValue::RefArray(refs)) = entity.get("subAgents") {
                        for r in refs {
                            let sub_id = resolve(file, &r.name)?;
                            if let Some((sub_file, sub_entity)) =
                                find_entity(&files, &sub_id, "subAgent")
                            {
                                sub_agent_map.insert(
                                    sub_id,
                                    Value::Object(decode_sub_agent(sub_entity, sub_file, &resolve)?),
                                );
                            }
                        }
                    }
                    record.insert("subAgents".to_string(), Value::Object(sub_agent_map));

                    if let Some(TsValue::Ref(name)) = entity.get("contextConfig") {
                        record.insert(
                            "contextConfigId".to_string(),
                            Value::String(resolve(file, name)?),
                        );
                    }

                    if let Some(Value::Object(mut status)) = record.remove("statusUpdates") {
                        resolve_names(&mut status, "statusComponents", file, &resolve)?;
                        record.insert("statusUpdates".to_string(), Value::Object(status));
                    }
                    resolve_array(&mut record, "triggers", entity, file, &resolve)?;
                    resolve_array(&mut record, "scheduledTriggers", entity, file, &resolve)?;
                    agents.insert(id.to_string(), Value::Object(record));
                }
                "mcpTool" | "functionTool" => {
                    let Some(id) = entity.id() else { continue };
                    let mut record = plain_props(entity);
                    let mut config = Map::new();
                    if entity.factory == "mcpTool" {
                        config.insert("type".to_string(), json!("mcp"));
                        for key in [
                            "serverUrl",
                            "transport",
                            "credentialReferenceId",
                            "toolOverrides",
                            "activeTools",
                        ] {
                            if let Some(value) = record.remove(key) {
                                config.insert(key.to_string(), value);
                            }
                        }
                    } else {
                        config.insert("type".to_string(), json!("function"));
                        if let Some(value) = record.remove("parameters") {
                            config.insert("parameters".to_string(), value);
                        }
                        // The function body is emitted verbatim, so it decodes
                        // as raw source text rather than a literal.
                        if let Some(TsValue::Raw(code)) = entity.get("execute") {
                            config.insert("execute".to_string(), Value::String(code.clone()));
                        }
                    }
                    record.insert("config".to_string(), Value::Object(config));
                    tools.insert(id.to_string(), Value::Object(record));
                }
                "dataComponent" => insert_plain(&mut data_components, entity),
                "artifactComponent" => insert_plain(&mut artifact_components, entity),
                "contextConfig" => insert_plain(&mut context_configs, entity),
                "statusComponent" => insert_plain(&mut status_components, entity),
                "trigger" => insert_plain(&mut triggers, entity),
                "scheduledTrigger" => insert_plain(&mut scheduled_triggers, entity),
                "environmentSettings" => {
                    // environments/<name>.env.ts
                    let name = Path::new(path)
                        .file_name()
                        .and_then(|f| f.to_str())
                        .map(|f| f.trim_end_matches(".env.ts").to_string())
                        .unwrap_or_else(|| entity.variable.clone());
                    environments.insert(name, Value::Object(plain_props(entity)));
                }
                _ => {}
            }
        }
    }

    project.insert("agents".to_string(), Value::Object(agents));
    project.insert("tools".to_string(), Value::Object(tools));
    project.insert("dataComponents".to_string(), Value::Object(data_components));
    project.insert(
        "artifactComponents".to_string(),
        Value::Object(artifact_components),
    );
    project.insert("contextConfigs".to_string(), Value::Object(context_configs));
    project.insert(
        "statusComponents".to_string(),
        Value::Object(status_components),
    );
    project.insert("triggers".to_string(), Value::Object(triggers));
    project.insert(
        "scheduledTriggers".to_string(),
        Value::Object(scheduled_triggers),
    );
    project.insert("environments".to_string(), Value::Object(environments));

    serde_json::from_value(Value::Object(project)).map_err(QuillError::from)
}

fn decode_sub_agent<F>(
    entity: &EntitySnapshot,
    file: &FileSnapshot,
    resolve: &F,
) -> Result<Map<String, Value>>
where
    F: Fn(&FileSnapshot, &str) -> Result<String>,
{
    let mut record = plain_props(entity);

    if let Some(TsValue::RefArray(refs)) = entity.get("canUse") {
        let mut entries = Vec::new();
        for r in refs {
            let mut entry = Map::new();
            entry.insert("toolId".to_string(), Value::String(resolve(file, &r.name)?));
            if let Some(Value::Object(overrides)) = &r.overrides {
                for (key, value) in overrides {
                    entry.insert(key.clone(), value.clone());
                }
            }
            entries.push(Value::Object(entry));
        }
        record.insert("canUse".to_string(), Value::Array(entries));
    }

    resolve_array(&mut record, "canDelegateTo", entity, file, resolve)?;
    resolve_array(&mut record, "dataComponents", entity, file, resolve)?;
    resolve_array(&mut record, "artifactComponents", entity, file, resolve)?;
    Ok(record)
}

/// Literal properties of a snapshot as a JSON map; reference-valued
/// properties are carried over as-is and fixed up by the caller.
fn plain_props(entity: &EntitySnapshot) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in &entity.props {
        if let TsValue::Json(v) = value {
            map.insert(key.clone(), v.clone());
        }
    }
    map
}

fn insert_plain(target: &mut Map<String, Value>, entity: &EntitySnapshot) {
    if let Some(id) = entity.id() {
        target.insert(id.to_string(), Value::Object(plain_props(entity)));
    }
}

fn resolve_array<F>(
    record: &mut Map<String, Value>,
    key: &str,
    entity: &EntitySnapshot,
    file: &FileSnapshot,
    resolve: &F,
) -> Result<()>
where
    F: Fn(&FileSnapshot, &str) -> Result<String>,
{
    if let Some(TsValue::RefArray(refs)) = entity.get(key) {
        let ids: Result<Vec<Value>> = refs
            .iter()
            .map(|r| resolve(file, &r.name).map(Value::String))
            .collect();
        record.insert(key.to_string(), Value::Array(ids?));
    }
    Ok(())
}

/// Resolve identifier names decoded inside a nested object (the arrow
/// reference array in `statusUpdates.statusComponents`) back to ids.
fn resolve_names<F>(
    nested: &mut Map<String, Value>,
    key: &str,
    file: &FileSnapshot,
    resolve: &F,
) -> Result<()>
where
    F: Fn(&FileSnapshot, &str) -> Result<String>,
{
    if let Some(Value::Array(items)) = nested.get(key).cloned() {
        let resolved: Result<Vec<Value>> = items
            .iter()
            .map(|item| match item {
                Value::String(name) => resolve(file, name).map(Value::String),
                other => Ok(other.clone()),
            })
            .collect();
        nested.insert(key.to_string(), Value::Array(resolved?));
    }
    Ok(())
}

fn find_entity<'a>(
    files: &'a BTreeMap<String, FileSnapshot>,
    entity_id: &str,
    factory: &str,
) -> Option<(&'a FileSnapshot, &'a EntitySnapshot)> {
    for snapshot in files.values() {
        for entity in &snapshot.entities {
            if entity.factory == factory && entity.id() == Some(entity_id) {
                return Some((snapshot, entity));
            }
        }
    }
    None
}

fn collect_ts_files(
    root: &Path,
    dir: &Path,
    reader: &mut Reader,
    files: &mut BTreeMap<String, FileSnapshot>,
) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.path());
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            collect_ts_files(root, &path, reader, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("ts") {
            let rel = path
                .strip_prefix(root)
                .map_err(|e| QuillError::internal(e.to_string()))?
                .to_string_lossy()
                .replace('\\', "/");
            let source = std::fs::read_to_string(&path)?;
            let snapshot = reader.parse_file(&rel, &source)?;
            files.insert(rel, snapshot);
        }
    }
    Ok(())
}
