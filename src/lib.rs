//! Read, bundle and transform OpenAPI definitions
#![deny(unsafe_code)]

pub mod application;
pub mod core;
pub mod infrastructure;
pub mod transform;
