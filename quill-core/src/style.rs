//! Code style configuration for generated TypeScript.

use serde::{Deserialize, Serialize};

/// Quote character used for string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quotes {
    Single,
    Double,
}

/// Formatting policy every generator must honor identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeStyle {
    pub quotes: Quotes,
    pub semicolons: bool,
    pub indentation: String,
}

impl Default for CodeStyle {
    fn default() -> Self {
        Self {
            quotes: Quotes::Single,
            semicolons: true,
            indentation: "  ".to_string(),
        }
    }
}

impl CodeStyle {
    /// The configured quote character.
    pub fn quote_char(&self) -> char {
        match self.quotes {
            Quotes::Single => '\'',
            Quotes::Double => '"',
        }
    }

    /// Statement terminator: `";"` or `""`.
    pub fn semi(&self) -> &'static str {
        if self.semicolons {
            ";"
        } else {
            ""
        }
    }

    /// Indentation string repeated `level` times.
    pub fn indent(&self, level: usize) -> String {
        self.indentation.repeat(level)
    }
}
