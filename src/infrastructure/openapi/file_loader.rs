//! File-based definition loader
//!
//! This loader handles only file I/O. The actual parsing is done by [`parse_document`].

use async_trait::async_trait;
use tokio::fs;

use super::DefinitionLoader;
use super::parser::{SourceFormat, parse_document};
use crate::core::error::{Result, TransformError};
use crate::transform::Document;

/// Loads definitions from local files
pub struct FileDefinitionLoader;

impl FileDefinitionLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileDefinitionLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DefinitionLoader for FileDefinitionLoader {
    async fn load(&self, source: &str) -> Result<Document> {
        let content = fs::read_to_string(source).await.map_err(|e| {
            TransformError::parse(source, format!("could not read file: {e}"))
        })?;
        parse_document(source, &content, SourceFormat::from_source(source))
    }
}
