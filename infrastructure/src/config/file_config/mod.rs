//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod api;
mod output;
mod project;

pub use api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECONDS, FileApiConfig};
pub use output::{FileOutputConfig, FileOutputFormat};
pub use project::FileProjectConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("api.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("api.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("project.{0} must be a positive id")]
    UnsavedId(&'static str),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend connection
    pub api: FileApiConfig,
    /// Default project and member
    pub project: FileProjectConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if self.api.timeout_seconds == 0 {
            issues.push(ConfigValidationError::InvalidTimeout);
        }
        if self.api.base_url.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyBaseUrl);
        }
        if self.project.id.is_some_and(|id| !id.is_persisted()) {
            issues.push(ConfigValidationError::UnsavedId("id"));
        }
        if self.project.member.is_some_and(|id| !id.is_persisted()) {
            issues.push(ConfigValidationError::UnsavedId("member"));
        }

        issues
    }
}
