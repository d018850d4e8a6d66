//! Use cases
//!
//! Application-level operations that orchestrate domain logic against the
//! repository ports.

pub mod annotation_rules;
pub mod ballots;
pub mod error;
pub mod finalize;
pub mod sweep;
pub mod voting_configurations;

#[cfg(test)]
pub(crate) mod test_support;
