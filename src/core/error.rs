//! Error handling for the definition transformation pipeline.
//!
//! Every pipeline stage either returns a new document or fails with a
//! [`TransformError`]. There is no warnings-only mode: the first error aborts
//! the whole transformation.
//!
//! # Examples
//!
//! ```
//! use openapicmd::core::error::{Result, TransformError};
//!
//! fn might_fail(preset: &str) -> Result<()> {
//!     Err(TransformError::unknown_preset(preset))
//! }
//!
//! assert!(might_fail("nope").is_err());
//! ```

use thiserror::Error;

use crate::transform::strip::StripPreset;

/// Result type for transformation operations
pub type Result<T> = std::result::Result<T, TransformError>;

/// Main error type for loading and transforming definitions
#[derive(Debug, Error)]
pub enum TransformError {
    /// Source text could not be parsed as JSON or YAML
    #[error("Failed to parse {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// Document failed validation
    #[error("Validation failed:\n{}", .errors.join("\n"))]
    Validation { errors: Vec<String> },

    /// An injected fragment was not valid JSON
    #[error("Could not parse inject JSON #{index} ({fragment}): {source}")]
    MalformedInjection {
        index: usize,
        fragment: String,
        #[source]
        source: serde_json::Error,
    },

    /// Requested strip preset does not exist
    #[error("Unknown strip preset \"{name}\", expected one of: {}", .valid.join(", "))]
    UnknownPreset { name: String, valid: Vec<String> },

    /// A $ref target could not be fetched or located
    #[error("Failed to resolve {reference}{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    ReferenceResolution {
        reference: String,
        status: Option<u16>,
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Output could not be rendered
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl TransformError {
    /// Create a new parse error
    pub fn parse<S: Into<String>, M: std::fmt::Display>(source_name: S, message: M) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Create a reference resolution error without an HTTP status
    pub fn reference<S: Into<String>, M: Into<String>>(reference: S, message: M) -> Self {
        Self::ReferenceResolution {
            reference: reference.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Create an unknown preset error listing all valid names
    pub fn unknown_preset<S: Into<String>>(name: S) -> Self {
        Self::UnknownPreset {
            name: name.into(),
            valid: StripPreset::all()
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
