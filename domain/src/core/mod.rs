//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: typed backend identifiers (`0` = not yet persisted)
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod ids;
