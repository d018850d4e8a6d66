//! Infrastructure layer for rule-consensus
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod http;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileApiConfig, FileConfig, FileOutputConfig,
    FileOutputFormat, FileProjectConfig,
};
pub use http::{
    ApiAnnotationRuleRepository, ApiBallotRepository, ApiClient, ApiVotingConfigurationRepository,
    ClientError, api_repositories,
};
