//! Select error types

use thiserror::Error;

/// Errors raised by the search and pagination subsystem
///
/// Selection and navigation never fail; they silently ignore requests that
/// cannot apply (disabled item, empty list, already selected value).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    /// Remote mode was used without a url, `query_params` or `process_data`
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// `process_data` produced something other than a sequence of options
    #[error("Malformed page response: {0}")]
    MalformedResponse(String),

    /// The page fetch failed or returned a non-success status
    #[error("Transport error: {0}")]
    Transport(String),

    /// Settings could not be parsed
    #[error("Invalid settings: {0}")]
    Settings(String),
}

impl From<serde_json::Error> for SelectError {
    fn from(err: serde_json::Error) -> Self {
        SelectError::MalformedResponse(err.to_string())
    }
}

impl From<toml::de::Error> for SelectError {
    fn from(err: toml::de::Error) -> Self {
        SelectError::Settings(err.to_string())
    }
}

/// Result type for select operations
pub type Result<T> = std::result::Result<T, SelectError>;
