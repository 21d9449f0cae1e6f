//! Variable- and file-name derivation for generated source.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// TypeScript reserved words that cannot be used as binding names.
static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
        "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
        "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
        "true", "try", "typeof", "var", "void", "while", "with", "yield", "let", "static",
        "implements", "interface", "package", "private", "protected", "public", "await",
    ]
    .into_iter()
    .collect()
});

/// Convert an entity id to a camelCase identifier.
///
/// Deterministic and idempotent on already-camelCase input. Non-alphanumeric
/// characters act as word separators and are stripped; a result that would
/// start with a digit is prefixed with an underscore; empty input yields `_`;
/// a reserved word gets a trailing underscore.
pub fn to_camel_case(id: &str) -> String {
    let mut result = String::with_capacity(id.len());
    let mut capitalize_next = false;

    for ch in id.chars() {
        if ch.is_ascii_alphanumeric() {
            if capitalize_next && !result.is_empty() {
                result.extend(ch.to_uppercase());
            } else {
                result.push(ch);
            }
            capitalize_next = false;
        } else {
            // Separator: '-', '_', '.', space, or anything else non-alphanumeric
            capitalize_next = true;
        }
    }

    if result.is_empty() {
        return "_".to_string();
    }
    if result.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        result.insert(0, '_');
    } else {
        // Lowercase the leading character so PascalCase ids normalize
        let first = result.remove(0);
        result.insert_str(0, &first.to_lowercase().to_string());
    }
    if RESERVED_WORDS.contains(result.as_str()) {
        result.push('_');
    }

    result
}

/// Allocate a collision-free reference name.
///
/// Returns `base` when it is not already reserved; otherwise `base+suffix`;
/// otherwise `base+suffix+N` with N counting up from 2. The returned name is
/// inserted into `reserved`, so a registry must not be shared across
/// unrelated scopes without resetting it.
pub fn unique_reference_name(base: &str, reserved: &mut HashSet<String>, suffix: &str) -> String {
    if reserved.insert(base.to_string()) {
        return base.to_string();
    }

    let suffixed = format!("{}{}", base, suffix);
    if reserved.insert(suffixed.clone()) {
        return suffixed;
    }

    let mut n = 2usize;
    loop {
        let candidate = format!("{}{}{}", base, suffix, n);
        if reserved.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// True when `name` is usable verbatim as a TypeScript identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_from_kebab() {
        assert_eq!(to_camel_case("weather-agent"), "weatherAgent");
        assert_eq!(to_camel_case("weather__lookup.tool"), "weatherLookupTool");
    }

    #[test]
    fn test_camel_case_idempotent() {
        assert_eq!(to_camel_case("weatherAgent"), "weatherAgent");
        assert_eq!(to_camel_case(&to_camel_case("weather-agent")), "weatherAgent");
    }

    #[test]
    fn test_camel_case_leading_digit() {
        assert_eq!(to_camel_case("2fast"), "_2fast");
        assert_eq!(to_camel_case("my-2nd-agent"), "my2ndAgent");
    }

    #[test]
    fn test_camel_case_degenerate_input() {
        assert_eq!(to_camel_case(""), "_");
        assert_eq!(to_camel_case("---"), "_");
    }

    #[test]
    fn test_camel_case_reserved_word() {
        assert_eq!(to_camel_case("new"), "new_");
        assert_eq!(to_camel_case("class"), "class_");
        assert_eq!(to_camel_case("newAgent"), "newAgent");
    }

    #[test]
    fn test_unique_reference_name_suffix_chain() {
        let mut reserved = HashSet::new();
        assert_eq!(
            unique_reference_name("assistant", &mut reserved, "SubAgent"),
            "assistant"
        );
        assert_eq!(
            unique_reference_name("assistant", &mut reserved, "SubAgent"),
            "assistantSubAgent"
        );
        assert_eq!(
            unique_reference_name("assistant", &mut reserved, "SubAgent"),
            "assistantSubAgent2"
        );
        assert_eq!(
            unique_reference_name("assistant", &mut reserved, "SubAgent"),
            "assistantSubAgent3"
        );
    }

    #[test]
    fn test_unique_reference_name_mutates_reserved() {
        let mut reserved = HashSet::new();
        unique_reference_name("tool", &mut reserved, "Tool");
        assert!(reserved.contains("tool"));
    }

    #[test]
    fn test_is_valid_identifier() {
        assert!(is_valid_identifier("weatherAgent"));
        assert!(is_valid_identifier("_private"));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier("with-dash"));
        assert!(!is_valid_identifier(""));
    }
}
