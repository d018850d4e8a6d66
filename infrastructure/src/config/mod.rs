//! Configuration file loading for rule-consensus
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `CONSENSUS_API__BASE_URL`, `CONSENSUS_PROJECT__ID`, ...
//! 2. `--config <path>` specified file
//! 3. Project root: `./consensus.toml` or `./.consensus.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/rule-consensus/config.toml`
//! 5. Fallback: `~/.config/rule-consensus/config.toml`
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECONDS, FileApiConfig, FileConfig,
    FileOutputConfig, FileOutputFormat, FileProjectConfig,
};
pub use loader::ConfigLoader;
