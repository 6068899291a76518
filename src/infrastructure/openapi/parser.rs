//! Definition text parsing
//!
//! Loaders only do I/O. Turning the fetched text into a [`Document`] happens
//! here so every source type gets the same JSON/YAML detection.

use serde_json::Value as JsonValue;

use crate::core::error::{Result, TransformError};
use crate::transform::Document;

/// Format hint derived from a file extension or a content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
    Unknown,
}

impl SourceFormat {
    /// Guess the format from a path or URL
    pub fn from_source(source: &str) -> Self {
        // ignore query strings and fragments on URLs
        let path = source.split(['?', '#']).next().unwrap_or(source);
        if path.ends_with(".json") {
            SourceFormat::Json
        } else if path.ends_with(".yaml") || path.ends_with(".yml") {
            SourceFormat::Yaml
        } else {
            SourceFormat::Unknown
        }
    }

    /// Guess the format from an HTTP content type, falling back to the URL
    pub fn from_content_type(content_type: &str, source: &str) -> Self {
        if content_type.contains("json") {
            SourceFormat::Json
        } else if content_type.contains("yaml") {
            SourceFormat::Yaml
        } else {
            Self::from_source(source)
        }
    }
}

/// Parse definition text into a document
pub fn parse_document(source_name: &str, content: &str, format: SourceFormat) -> Result<Document> {
    match format {
        SourceFormat::Json => serde_json::from_str(content)
            .map_err(|e| TransformError::parse(source_name, format!("invalid JSON: {e}"))),
        SourceFormat::Yaml => serde_yaml::from_str::<JsonValue>(content)
            .map_err(|e| TransformError::parse(source_name, format!("invalid YAML: {e}"))),
        SourceFormat::Unknown => serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str::<JsonValue>(content))
            .map_err(|e| TransformError::parse(source_name, e)),
    }
    .and_then(|doc| ensure_object(source_name, doc))
}

fn ensure_object(source_name: &str, doc: JsonValue) -> Result<Document> {
    if doc.is_object() {
        Ok(doc)
    } else {
        Err(TransformError::parse(
            source_name,
            "expected a mapping at the document root",
        ))
    }
}
