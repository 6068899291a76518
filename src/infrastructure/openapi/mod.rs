//! Definition loading and reference resolution

pub mod composite_loader;
pub mod file_loader;
pub mod http_loader;
pub mod parser;
pub mod resolver;

use async_trait::async_trait;

pub use composite_loader::{CompositeDefinitionLoader, STDIN_SOURCE, StdinDefinitionLoader};
pub use file_loader::FileDefinitionLoader;
pub use http_loader::HttpDefinitionLoader;
pub use resolver::{DefinitionResolver, ResolveMode, ResolveOptions};

use crate::core::error::Result;
use crate::transform::Document;

/// Loads a definition document from a source
#[async_trait]
pub trait DefinitionLoader: Send + Sync {
    /// Load and parse the document at `source`
    async fn load(&self, source: &str) -> Result<Document>;
}
