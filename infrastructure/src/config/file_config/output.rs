//! Output configuration from TOML (`[output]` section)

use serde::{Deserialize, Serialize};

/// How command results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

impl std::str::FromStr for FileOutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(FileOutputFormat::Table),
            "json" => Ok(FileOutputFormat::Json),
            other => Err(format!("Unknown output format: {}. Valid: table, json", other)),
        }
    }
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    pub format: FileOutputFormat,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: FileOutputFormat::Table,
            color: true,
        }
    }
}
