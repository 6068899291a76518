//! Infrastructure layer - concrete loaders for definition sources

pub mod openapi;
