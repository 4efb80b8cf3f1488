//! Error types for bundle analysis.

use thiserror::Error;

/// Errors that can occur during analysis.
///
/// Numeric degeneracies (too few rays, a singular system) are not errors;
/// they surface as absent results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Invalid analysis configuration.
    #[error("invalid analysis config: {0}")]
    InvalidConfig(String),
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
