//! Configuration loading for the Quill CLI.
//!
//! Configuration is loaded from multiple sources:
//! 1. Default values
//! 2. User config (~/.quill/config.toml)
//! 3. Project config (./quill.toml)
//! 4. Environment variables (QUILL_*)
//!
//! Priority: ENV vars > Project config > User config > Defaults.

use crate::error::{QuillError, Result};
use crate::style::CodeStyle;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Quill CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuillConfig {
    /// Manage-API connection settings
    pub api: ApiConfig,

    /// Local project settings
    pub project: ProjectConfig,

    /// Formatting policy for generated code
    pub style: CodeStyle,
}

/// Manage-API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the manage API (QUILL_API_URL)
    pub base_url: String,

    /// Tenant identifier (QUILL_TENANT_ID)
    pub tenant_id: String,

    /// Request timeout in seconds (QUILL_API_TIMEOUT)
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3002".to_string(),
            tenant_id: "default".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Local project settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Default project id for `pull` without --project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Directory the generated source tree is written into
    pub output_dir: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            id: None,
            output_dir: PathBuf::from("src"),
        }
    }
}

impl QuillConfig {
    /// Get the user-level config file path (~/.quill/config.toml).
    pub fn user_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".quill").join("config.toml"))
    }

    /// Get the project-level config path.
    pub fn project_path() -> PathBuf {
        PathBuf::from("quill.toml")
    }

    /// Load configuration with the full priority chain.
    ///
    /// When `explicit` is given, that file must exist and is loaded instead
    /// of the user/project chain; env overrides still apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit {
            Self::from_file(path)?
        } else {
            let mut config = Self::default();
            if let Some(user_path) = Self::user_path() {
                if user_path.exists() {
                    config = Self::from_file(&user_path)?;
                }
            }
            let project_path = Self::project_path();
            if project_path.exists() {
                config = Self::from_file(&project_path)?;
            }
            config
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config");
        let content = std::fs::read_to_string(path).map_err(|e| {
            QuillError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            QuillError::config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                QuillError::config(format!("Failed to create config dir: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| QuillError::config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| QuillError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("QUILL_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(tenant) = std::env::var("QUILL_TENANT_ID") {
            self.api.tenant_id = tenant;
        }
        if let Ok(timeout) = std::env::var("QUILL_API_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.api.timeout_secs = secs;
            }
        }
    }
}
