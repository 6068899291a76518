//! Composite loader that picks a loading strategy per source

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;

use super::parser::{SourceFormat, parse_document};
use super::{DefinitionLoader, FileDefinitionLoader, HttpDefinitionLoader};
use crate::core::error::Result;
use crate::core::utils::is_remote_source;
use crate::transform::Document;

/// Source name that reads the definition from standard input
pub const STDIN_SOURCE: &str = "-";

/// Reads a definition from standard input
pub struct StdinDefinitionLoader;

#[async_trait]
impl DefinitionLoader for StdinDefinitionLoader {
    async fn load(&self, _source: &str) -> Result<Document> {
        let mut content = String::new();
        tokio::io::stdin().read_to_string(&mut content).await?;
        parse_document("stdin", &content, SourceFormat::Unknown)
    }
}

/// Composite loader that dispatches to the HTTP, stdin or file loader
pub struct CompositeDefinitionLoader {
    http: HttpDefinitionLoader,
    file: FileDefinitionLoader,
    stdin: StdinDefinitionLoader,
}

impl CompositeDefinitionLoader {
    /// Create a loader whose remote fetches carry `headers`
    pub fn new(headers: &BTreeMap<String, String>) -> Result<Self> {
        Ok(Self {
            http: HttpDefinitionLoader::new(headers)?,
            file: FileDefinitionLoader::new(),
            stdin: StdinDefinitionLoader,
        })
    }
}

#[async_trait]
impl DefinitionLoader for CompositeDefinitionLoader {
    async fn load(&self, source: &str) -> Result<Document> {
        tracing::debug!("CompositeDefinitionLoader: Loading from source: {source}");

        if source == STDIN_SOURCE {
            self.stdin.load(source).await
        } else if is_remote_source(source) {
            tracing::debug!("CompositeDefinitionLoader: Using HTTP loader");
            self.http.load(source).await
        } else {
            tracing::debug!("CompositeDefinitionLoader: Using file loader");
            self.file.load(source).await
        }
    }
}
