//! The `read` use case: load, transform and print a definition

use std::sync::Arc;

use crate::core::error::Result;
use crate::infrastructure::openapi::DefinitionLoader;
use crate::transform::{OutputFormat, TransformOptions, serialize, transform_definition};

/// Request for the `read` use case
#[derive(Debug, Clone, Default)]
pub struct ReadRequest {
    pub options: TransformOptions,
    pub format: OutputFormat,
}

/// Use case behind `openapi read`
pub struct ReadUseCase {
    loader: Arc<dyn DefinitionLoader>,
}

impl ReadUseCase {
    pub fn new(loader: Arc<dyn DefinitionLoader>) -> Self {
        Self { loader }
    }

    /// Returns the transformed definition as text
    pub async fn execute(&self, request: ReadRequest) -> Result<String> {
        let document = transform_definition(&request.options, self.loader.as_ref()).await?;
        serialize(&document, request.format)
    }
}
