//! Text rendering primitives shared by all generators.
//!
//! Everything here is deterministic: the same input and `CodeStyle` always
//! produce the same text, which is what makes regeneration idempotent.

use quill_core::style::CodeStyle;
use serde_json::Value;

use crate::naming::is_valid_identifier;

/// Strings longer than this are emitted as template literals even without
/// an embedded newline.
pub const TEMPLATE_LITERAL_THRESHOLD: usize = 60;

/// Format a string value as a TypeScript literal.
///
/// Multi-line or long strings become template literals (backticks); short
/// single-line strings are quoted per the configured quote style.
pub fn format_string_literal(value: &str, style: &CodeStyle) -> String {
    if value.contains('\n') || value.chars().count() > TEMPLATE_LITERAL_THRESHOLD {
        format_template_literal(value)
    } else {
        format_quoted(value, style)
    }
}

/// Format a string as a quoted single-line literal.
pub fn format_quoted(value: &str, style: &CodeStyle) -> String {
    let quote = style.quote_char();
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Format a string as a template literal, escaping backticks and `${`.
pub fn format_template_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('`');
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            c => out.push(c),
        }
    }
    out.push('`');
    out
}

/// Render a JSON value as a TypeScript expression.
///
/// Objects and arrays are laid out one entry per line at `indent_level`;
/// object keys are quoted only when they are not valid identifiers. The
/// last entry of any object or array never carries a trailing comma.
pub fn format_json_value(value: &Value, style: &CodeStyle, indent_level: usize) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format_string_literal(s, style),
        Value::Array(items) => {
            if items.is_empty() {
                return "[]".to_string();
            }
            let inner = style.indent(indent_level + 1);
            let rendered: Vec<String> = items
                .iter()
                .map(|item| {
                    format!("{}{}", inner, format_json_value(item, style, indent_level + 1))
                })
                .collect();
            format!(
                "[\n{}\n{}]",
                rendered.join(",\n"),
                style.indent(indent_level)
            )
        }
        Value::Object(map) => {
            if map.is_empty() {
                return "{}".to_string();
            }
            let inner = style.indent(indent_level + 1);
            let rendered: Vec<String> = map
                .iter()
                .map(|(key, val)| {
                    format!(
                        "{}{}: {}",
                        inner,
                        format_object_key(key, style),
                        format_json_value(val, style, indent_level + 1)
                    )
                })
                .collect();
            format!(
                "{{\n{}\n{}}}",
                rendered.join(",\n"),
                style.indent(indent_level)
            )
        }
    }
}

/// Quote an object key only when it is not a valid identifier.
pub fn format_object_key(key: &str, style: &CodeStyle) -> String {
    if is_valid_identifier(key) {
        key.to_string()
    } else {
        format_quoted(key, style)
    }
}

/// Render a reference-array field as a zero-argument arrow function.
///
/// Reference fields are always wrapped in `() => [...]` so the generated
/// SDK call can lazily resolve forward references. A single element stays
/// on one line; multiple elements go one per line.
pub fn format_reference_array(refs: &[String], style: &CodeStyle, indent_level: usize) -> String {
    match refs.len() {
        0 => "() => []".to_string(),
        1 if !refs[0].contains('\n') => format!("() => [{}]", refs[0]),
        _ => {
            let inner = style.indent(indent_level + 1);
            let body: Vec<String> = refs.iter().map(|r| format!("{}{}", inner, r)).collect();
            format!(
                "() => [\n{}\n{}]",
                body.join(",\n"),
                style.indent(indent_level)
            )
        }
    }
}

/// An ordered object-literal builder with the omission and comma policy
/// all generators share.
#[derive(Debug, Clone, Default)]
pub struct ObjectLiteral {
    properties: Vec<(String, String)>,
}

impl ObjectLiteral {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property whose value is pre-rendered code.
    pub fn raw(&mut self, key: &str, code: impl Into<String>) -> &mut Self {
        self.properties.push((key.to_string(), code.into()));
        self
    }

    /// Add a string property, formatted per style.
    pub fn string(&mut self, key: &str, value: &str, style: &CodeStyle) -> &mut Self {
        self.raw(key, format_string_literal(value, style))
    }

    /// Add a string property only when present and non-empty.
    ///
    /// Absent and empty values produce no key at all, never `null` or `''`.
    pub fn optional_string(
        &mut self,
        key: &str,
        value: Option<&str>,
        style: &CodeStyle,
    ) -> &mut Self {
        if let Some(value) = value {
            if !value.is_empty() {
                self.string(key, value, style);
            }
        }
        self
    }

    /// Add a numeric property only when present.
    pub fn optional_number(&mut self, key: &str, value: Option<u32>) -> &mut Self {
        if let Some(value) = value {
            self.raw(key, value.to_string());
        }
        self
    }

    /// Add a JSON-valued property only when present and non-empty.
    pub fn optional_json(
        &mut self,
        key: &str,
        value: Option<&Value>,
        style: &CodeStyle,
        indent_level: usize,
    ) -> &mut Self {
        if let Some(value) = value {
            let empty = match value {
                Value::Null => true,
                Value::Object(map) => map.is_empty(),
                Value::Array(items) => items.is_empty(),
                _ => false,
            };
            if !empty {
                self.raw(key, format_json_value(value, style, indent_level));
            }
        }
        self
    }

    /// Add a reference-array property only when the list is non-empty.
    pub fn optional_references(
        &mut self,
        key: &str,
        refs: &[String],
        style: &CodeStyle,
        indent_level: usize,
    ) -> &mut Self {
        if !refs.is_empty() {
            self.raw(key, format_reference_array(refs, style, indent_level));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Render the literal at `indent_level`, one property per line, with a
    /// trailing comma on every property except the last.
    pub fn render(&self, style: &CodeStyle, indent_level: usize) -> String {
        if self.properties.is_empty() {
            return "{}".to_string();
        }
        let inner = style.indent(indent_level + 1);
        let lines: Vec<String> = self
            .properties
            .iter()
            .map(|(key, code)| {
                if key == code && is_valid_identifier(key) {
                    // Shorthand property
                    format!("{}{}", inner, key)
                } else {
                    format!("{}{}: {}", inner, format_object_key(key, style), code)
                }
            })
            .collect();
        format!(
            "{{\n{}\n{}}}",
            lines.join(",\n"),
            style.indent(indent_level)
        )
    }
}
