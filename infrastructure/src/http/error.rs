//! Error types for building the API client

use thiserror::Error;

/// Errors that can occur before any request is sent
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid API token: {0}")]
    InvalidToken(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}
