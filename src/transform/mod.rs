//! The definition transformation pipeline
//!
//! A loaded [`Document`] flows through up to five optional stages, always in
//! this order:
//!
//! 1. [`inject`]: deep-merge JSON fragments
//! 2. [`exclude`]: drop objects carrying a vendor extension
//! 3. [`unreferenced`]: drop components nothing points at
//! 4. [`strip`]: remove metadata according to a preset
//! 5. [`servers`]: rewrite the server list
//!
//! Every stage borrows its input and returns a new document, so a caller's
//! document is never modified.
//!
//! # Examples
//!
//! ```
//! use openapicmd::transform::{apply_transforms, TransformOptions};
//! use serde_json::json;
//!
//! let doc = json!({ "openapi": "3.0.0", "info": { "title": "Pets", "version": "0.0.1" }, "paths": {} });
//! let options = TransformOptions {
//!     inject_fragments: vec![r#"{"info":{"version":"1.0.0"}}"#.to_string()],
//!     ..Default::default()
//! };
//! let out = apply_transforms(&doc, &options).unwrap();
//! assert_eq!(out["info"]["version"], "1.0.0");
//! ```

pub mod exclude;
pub mod inject;
pub mod serialize;
pub mod servers;
pub mod strip;
pub mod unreferenced;
pub mod walk;

use std::collections::BTreeMap;

pub use exclude::prune_by_extension;
pub use inject::{ArrayMergePolicy, deep_merge, inject};
pub use serialize::{OutputFormat, serialize};
pub use servers::{ServerOverrides, apply_servers};
pub use strip::{StripOptions, StripOverrides, StripPreset, strip};
pub use unreferenced::{KEEP_EXTENSION, prune_unreferenced};

use crate::core::error::Result;
use crate::infrastructure::openapi::{
    CompositeDefinitionLoader, DefinitionLoader, DefinitionResolver, ResolveOptions,
};

/// An OpenAPI definition as a JSON value tree
pub type Document = serde_json::Value;

/// Everything a caller can ask of the pipeline
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// File path, http(s) URL or `-` for stdin
    pub source: String,
    pub dereference: bool,
    pub bundle: bool,
    pub validate: bool,
    /// JSON fragments merged in order
    pub inject_fragments: Vec<String>,
    pub array_merge: ArrayMergePolicy,
    /// Objects carrying this extension key are removed
    pub exclude_extension: Option<String>,
    pub remove_unreferenced: bool,
    /// Preset name, checked before anything runs
    pub strip_preset: Option<String>,
    pub strip_overrides: StripOverrides,
    /// Server urls prepended to the server list
    pub add_servers: Vec<String>,
    pub api_root: Option<String>,
    pub induce_server_from_source: bool,
    /// Headers sent with every remote fetch
    pub request_headers: BTreeMap<String, String>,
}

impl TransformOptions {
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            dereference: self.dereference,
            bundle: self.bundle,
            validate: self.validate,
        }
    }

    /// Strip toggles, or `None` when stripping was not requested
    pub fn strip_options(&self) -> Result<Option<StripOptions>> {
        let preset = match self.strip_preset.as_deref() {
            Some(name) => Some(name.parse::<StripPreset>()?),
            None => None,
        };
        if preset.is_none() && self.strip_overrides.is_empty() {
            return Ok(None);
        }
        Ok(Some(StripOptions::resolve(
            preset.unwrap_or_default(),
            &self.strip_overrides,
        )))
    }

    pub fn server_overrides(&self) -> ServerOverrides {
        ServerOverrides {
            servers: self.add_servers.clone(),
            root: self.api_root.clone(),
            induce: self.induce_server_from_source,
            source: Some(self.source.clone()).filter(|s| !s.is_empty()),
        }
    }

    /// Loader for `source` that sends `request_headers` on remote fetches
    pub fn loader(&self) -> Result<CompositeDefinitionLoader> {
        CompositeDefinitionLoader::new(&self.request_headers)
    }
}

/// Runs every requested stage over an already loaded document
pub fn apply_transforms(document: &Document, options: &TransformOptions) -> Result<Document> {
    let strip_options = options.strip_options()?;

    let mut output = if options.inject_fragments.is_empty() {
        document.clone()
    } else {
        inject(document, &options.inject_fragments, options.array_merge)?
    };

    if let Some(extension) = options.exclude_extension.as_deref() {
        tracing::debug!(extension = %extension, "Excluding marked objects");
        output = prune_by_extension(&output, extension);
    }

    if options.remove_unreferenced {
        tracing::debug!("Removing unreferenced components");
        output = prune_unreferenced(&output);
    }

    if let Some(strip_options) = strip_options {
        output = strip(&output, &strip_options);
    }

    let server_overrides = options.server_overrides();
    if !server_overrides.is_empty() {
        output = apply_servers(&output, &server_overrides);
    }

    Ok(output)
}

/// Loads `options.source` through `loader` and runs the pipeline over it
pub async fn transform_definition(
    options: &TransformOptions,
    loader: &dyn DefinitionLoader,
) -> Result<Document> {
    // fail on a bad preset before touching the network
    options.strip_options()?;

    tracing::info!(source = %options.source, "Loading definition");
    let document = DefinitionResolver::new(loader)
        .resolve(&options.source, &options.resolve_options())
        .await?;
    apply_transforms(&document, options)
}
