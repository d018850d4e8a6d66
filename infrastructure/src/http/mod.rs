//! REST adapters for the voting backend
//!
//! [`ApiClient`] owns the `reqwest` client and turns transport and status
//! failures into [`ApiError`](consensus_application::ApiError). The
//! repositories map each port method onto one backend route.

pub mod client;
pub mod error;
pub mod repositories;

#[cfg(test)]
pub(crate) mod test_server;

pub use client::ApiClient;
pub use error::ClientError;
pub use repositories::{
    ApiAnnotationRuleRepository, ApiBallotRepository, ApiVotingConfigurationRepository,
    api_repositories,
};
