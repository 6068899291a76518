//! openapicmd core
//!
//! Errors, configuration discovery and shared helpers used by the loaders and
//! the transformation pipeline.

pub mod config;
pub mod error;
pub mod utils;

pub use error::{Result, TransformError};
