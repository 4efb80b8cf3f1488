//! Error types for scene validation.

use thiserror::Error;

/// Errors raised while turning a scene payload into a traceable scene.
///
/// Any of these aborts the whole simulation call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// A numeric field is outside its allowed range.
    #[error("{element} `{id}`: {field} must be {requirement}, got {value}")]
    InvalidField {
        /// Element category ("source", "lens", ...).
        element: &'static str,
        /// Element identifier.
        id: String,
        /// Offending field name.
        field: &'static str,
        /// Human-readable constraint.
        requirement: &'static str,
        /// Value that was supplied.
        value: f64,
    },

    /// Two elements in the same section share an identifier.
    #[error("duplicate {element} id `{id}`")]
    DuplicateId {
        /// Element category.
        element: &'static str,
        /// Repeated identifier.
        id: String,
    },

    /// Invalid tracing settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for scene construction.
pub type Result<T> = std::result::Result<T, SceneError>;
