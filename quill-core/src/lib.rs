//! Core types and abstractions for the Quill agent-project toolkit.
//!
//! This crate provides the project-definition data model, aggregated
//! validation, error handling, and configuration used across all Quill
//! components.

pub mod config;
pub mod error;
pub mod project;
pub mod style;
pub mod validate;

pub use config::{ApiConfig, ProjectConfig, QuillConfig};
pub use error::{QuillError, Result, ValidationReport, Violation};
pub use project::*;
pub use style::{CodeStyle, Quotes};
