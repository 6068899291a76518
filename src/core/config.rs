//! `.openapiconfig` discovery and definition source resolution
//!
//! The transformation core never reads configuration itself. The binary asks a
//! [`ConfigLocator`] for the nearest config file, loads it into an
//! [`OpenApiConfig`] and hands the resolved values to the pipeline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{Result, TransformError};

/// Base name of the per-project config file
pub const CONFIG_FILENAME: &str = ".openapiconfig";

/// Environment variable consulted before the config file
pub const DEFINITION_ENV: &str = "OPENAPI_DEFINITION";

/// Sentinel definition argument that forces the configured definition
pub const CURRENT_DEFINITION: &str = "CURRENT";

/// Trait for locating the config file, allowing dependency injection for testing
pub trait ConfigLocator {
    fn locate(&self, cwd: &Path) -> Option<PathBuf>;
}

/// Walks from the working directory up to a stop directory (the home directory
/// by default) and returns the first config file found.
pub struct DirectoryWalkLocator {
    stop_at: Option<PathBuf>,
}

impl DirectoryWalkLocator {
    pub fn new() -> Self {
        Self {
            stop_at: dirs::home_dir(),
        }
    }

    /// Use a custom stop directory instead of the home directory
    pub fn with_stop_dir(stop_at: impl Into<PathBuf>) -> Self {
        Self {
            stop_at: Some(stop_at.into()),
        }
    }

    fn candidates(dir: &Path) -> [PathBuf; 3] {
        [
            dir.join(CONFIG_FILENAME),
            dir.join(format!("{CONFIG_FILENAME}.yml")),
            dir.join(format!("{CONFIG_FILENAME}.yaml")),
        ]
    }
}

impl Default for DirectoryWalkLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLocator for DirectoryWalkLocator {
    fn locate(&self, cwd: &Path) -> Option<PathBuf> {
        let stop_len = self
            .stop_at
            .as_ref()
            .map(|p| p.as_os_str().len())
            .unwrap_or(0);

        let mut dir = Some(cwd);
        while let Some(current) = dir {
            // stop once we climb above the stop directory
            if current.as_os_str().len() < stop_len {
                break;
            }
            if let Some(found) = Self::candidates(current).into_iter().find(|c| c.is_file()) {
                debug!(path = %found.display(), "Found config file");
                return Some(found);
            }
            dir = current.parent();
        }
        None
    }
}

/// Contents of a `.openapiconfig` file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenApiConfig {
    /// Currently loaded definition source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Everything else (security credentials, saved tests, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl OpenApiConfig {
    /// Load a config file from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| {
            TransformError::config(format!("Failed to parse {}: {e}", path.display()))
        })
    }

    /// Parse config contents. An empty file is an empty config.
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Locate and load the nearest config file, if any
    pub fn discover(locator: &dyn ConfigLocator, cwd: &Path) -> Result<Option<Self>> {
        locator.locate(cwd).map(|path| Self::from_file(&path)).transpose()
    }
}

/// Picks the definition source: the explicit argument, then the environment
/// variable, then the config file.
///
/// Passing `CURRENT` skips both the argument and the environment and uses the
/// configured definition.
pub fn resolve_definition(
    arg: Option<&str>,
    env: Option<&str>,
    config: Option<&OpenApiConfig>,
) -> Option<String> {
    let current = arg == Some(CURRENT_DEFINITION);
    if let Some(arg) = arg.filter(|a| !a.is_empty() && !current) {
        return Some(arg.to_string());
    }
    if let Some(env) = env.filter(|e| !e.is_empty() && !current) {
        return Some(env.to_string());
    }
    config.and_then(|c| c.definition.clone())
}
