//! Quill CLI library: manage-API client, pull pipeline, and terminal output.

pub mod api;
pub mod output;
pub mod pull;

pub use output::OutputFormat;
pub use pull::{run_pull, PullOptions};
