//! Rendering of documents back to text

use std::fmt;
use std::str::FromStr;

use super::Document;
use crate::core::error::{Result, TransformError};

/// Output text format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(format!("unknown output format '{other}', expected json or yaml")),
        }
    }
}

/// Serializes `document` as pretty JSON or block-style YAML.
///
/// The document is a plain tree, so YAML output never contains anchors or
/// aliases.
pub fn serialize(document: &Document, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(document)
            .map_err(|e| TransformError::Serialize(e.to_string())),
        OutputFormat::Yaml => {
            serde_yaml::to_string(document).map_err(|e| TransformError::Serialize(e.to_string()))
        }
    }
}
