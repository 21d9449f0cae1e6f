//! Error types for the Quill toolkit.

use std::fmt;

/// Result type alias for Quill operations.
pub type Result<T> = std::result::Result<T, QuillError>;

/// Main error type for the Quill toolkit.
#[derive(Debug, thiserror::Error)]
pub enum QuillError {
    /// Entity data failed schema validation (all violations aggregated)
    #[error("{0}")]
    Validation(ValidationReport),

    /// A referenced entity is missing from the project or registry
    #[error("{resource} '{id}' not found in component name map")]
    NotFound { resource: String, id: String },

    /// Referential-integrity failure between entities
    #[error("Reference error: {0}")]
    Reference(String),

    /// Source parsing errors (introspection / reader)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Manage-API errors
    #[error("API error: {0}")]
    Api(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generated output failed the round-trip comparison
    #[error("Comparison failed: {0}")]
    Comparison(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// Wrapped anyhow errors for compatibility
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QuillError {
    /// Create a not-found error for a missing entity reference
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a reference-integrity error
    pub fn reference(msg: impl Into<String>) -> Self {
        Self::Reference(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a manage-API error
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a round-trip comparison error
    pub fn comparison(msg: impl Into<String>) -> Self {
        Self::Comparison(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// A single schema violation: the field path that failed and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Aggregated validation failure for one entity.
///
/// Collects every violation found in a single pass so the user sees the
/// complete diagnostic, not just the first failing field.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub entity_kind: String,
    pub entity_id: String,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new(entity_kind: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            entity_kind: entity_kind.into(),
            entity_id: entity_id.into(),
            violations: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Validation failed for {} '{}' ({} violation{}):",
            self.entity_kind,
            self.entity_id,
            self.violations.len(),
            if self.violations.len() == 1 { "" } else { "s" }
        )?;
        for violation in &self.violations {
            writeln!(f, "  - {}", violation)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_the_component_map() {
        let err = QuillError::not_found("tool", "weather-lookup");
        assert_eq!(
            err.to_string(),
            "tool 'weather-lookup' not found in component name map"
        );
    }

    #[test]
    fn test_validation_report_lists_every_violation() {
        let mut report = ValidationReport::new("agent", "weather-agent");
        report.violations.push(Violation {
            path: "name".to_string(),
            message: "must not be empty".to_string(),
        });
        report.violations.push(Violation {
            path: "defaultSubAgentId".to_string(),
            message: "'missing' is not a key of subAgents".to_string(),
        });

        let text = QuillError::Validation(report).to_string();
        assert!(text.contains("2 violations"));
        assert!(text.contains("name: must not be empty"));
        assert!(text.contains("defaultSubAgentId: 'missing' is not a key of subAgents"));
    }
}
