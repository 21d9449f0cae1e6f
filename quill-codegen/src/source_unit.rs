//! In-memory representation of one generated source file.

use quill_core::style::CodeStyle;
use std::collections::BTreeMap;

use crate::format::ObjectLiteral;
use crate::registry::ImportBinding;

/// The package the generated factory functions are imported from.
pub const SDK_PACKAGE: &str = "@quill/sdk";

/// One emitted source unit: import declarations plus a single exported
/// `const` factory-call expression. Built fresh per generator invocation
/// and discarded after text extraction (or merged into an existing file).
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Target path relative to the output root.
    pub file_path: String,
    /// Factory names imported from the SDK package.
    pub sdk_imports: Vec<String>,
    /// Imports of referenced sibling entities.
    pub bindings: Vec<ImportBinding>,
    /// Exported variable name.
    pub variable: String,
    /// Factory function applied to the body.
    pub factory: String,
    /// The factory-call argument.
    pub body: ObjectLiteral,
}

impl SourceUnit {
    pub fn new(
        file_path: impl Into<String>,
        factory: impl Into<String>,
        variable: impl Into<String>,
        body: ObjectLiteral,
    ) -> Self {
        let factory = factory.into();
        Self {
            file_path: file_path.into(),
            sdk_imports: vec![factory.clone()],
            bindings: Vec::new(),
            variable: variable.into(),
            factory,
            body,
        }
    }

    /// Render the import block: the SDK import first, then sibling imports
    /// grouped by module specifier.
    pub fn render_imports(&self, style: &CodeStyle) -> String {
        let quote = style.quote_char();
        let semi = style.semi();
        let mut lines = Vec::new();

        if !self.sdk_imports.is_empty() {
            lines.push(format!(
                "import {{ {} }} from {}{}{}{}",
                self.sdk_imports.join(", "),
                quote,
                SDK_PACKAGE,
                quote,
                semi
            ));
        }

        // Group sibling imports by specifier, deduplicating clauses.
        let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for binding in &self.bindings {
            let clauses = grouped.entry(binding.specifier.as_str()).or_default();
            let clause = binding.clause();
            if !clauses.contains(&clause) {
                clauses.push(clause);
            }
        }
        if !grouped.is_empty() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            for (specifier, clauses) in grouped {
                lines.push(format!(
                    "import {{ {} }} from {}{}{}{}",
                    clauses.join(", "),
                    quote,
                    specifier,
                    quote,
                    semi
                ));
            }
        }

        lines.join("\n")
    }

    /// Render the exported declaration.
    pub fn render_declaration(&self, style: &CodeStyle) -> String {
        format!(
            "export const {} = {}({}){}",
            self.variable,
            self.factory,
            self.body.render(style, 0),
            style.semi()
        )
    }

    /// Render the complete file text, trailing newline included.
    pub fn render(&self, style: &CodeStyle) -> String {
        let imports = self.render_imports(style);
        if imports.is_empty() {
            format!("{}\n", self.render_declaration(style))
        } else {
            format!("{}\n\n{}\n", imports, self.render_declaration(style))
        }
    }
}
