//! Preset-driven stripping of optional metadata
//!
//! [`strip`] removes documentation-only content (descriptions, examples,
//! extensions, tags) and, depending on the preset, structural parts such as
//! schemas, security, servers and responses. Presets are starting points;
//! explicit [`StripOverrides`] always win over them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::Document;
use super::walk::{
    REF_KEY, for_each_operation_mut, for_each_path_item_mut, remove_keys_recursive,
};
use crate::core::error::TransformError;
use crate::core::utils::is_http_method;

const EXAMPLE_KEYS: &[&str] = &["example", "examples", "x-example", "x-examples"];

/// Individual stripping toggles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripOptions {
    /// Replace info with required fields only
    pub replace_info: bool,
    /// Remove tags from document
    pub remove_tags: bool,
    /// Remove descriptions and summaries from document
    pub remove_descriptions: bool,
    /// Remove examples from document
    pub remove_examples: bool,
    /// Remove all openapi extensions (x-) from document
    pub remove_extensions: bool,
    /// Remove readOnly from document
    pub remove_read_only: bool,
    /// Remove all schemas from document
    pub remove_schemas: bool,
    /// Remove all security schemes from document
    pub remove_security_schemes: bool,
    /// Remove servers from document
    pub remove_servers: bool,
    /// Only include first server from servers array
    pub first_server_only: bool,
    /// Replace responses with minimal valid default response
    pub replace_responses: bool,
    /// Remove responses entirely (this breaks validation)
    pub remove_responses: bool,
}

/// Explicit per-option settings applied on top of a preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StripOverrides {
    pub replace_info: Option<bool>,
    pub remove_tags: Option<bool>,
    pub remove_descriptions: Option<bool>,
    pub remove_examples: Option<bool>,
    pub remove_extensions: Option<bool>,
    pub remove_read_only: Option<bool>,
    pub remove_schemas: Option<bool>,
    pub remove_security_schemes: Option<bool>,
    pub remove_servers: Option<bool>,
    pub first_server_only: Option<bool>,
    pub replace_responses: Option<bool>,
    pub remove_responses: Option<bool>,
}

impl StripOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Named bundles of strip options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StripPreset {
    /// Cosmetic metadata only
    #[default]
    Default,
    /// Everything that can be removed
    All,
    /// Tuned for openapi-client-axios, which needs the first server
    OpenapiClientAxios,
    /// Tuned for openapi-backend, which mocks from examples and ignores servers
    OpenapiBackend,
}

impl StripPreset {
    pub fn all() -> &'static [StripPreset] {
        &[
            StripPreset::Default,
            StripPreset::All,
            StripPreset::OpenapiClientAxios,
            StripPreset::OpenapiBackend,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StripPreset::Default => "default",
            StripPreset::All => "all",
            StripPreset::OpenapiClientAxios => "openapi_client_axios",
            StripPreset::OpenapiBackend => "openapi_backend",
        }
    }

    /// The toggles this preset enables
    pub fn options(self) -> StripOptions {
        let metadata_only = StripOptions {
            replace_info: true,
            remove_tags: true,
            remove_descriptions: true,
            remove_examples: true,
            remove_extensions: true,
            ..StripOptions::default()
        };
        let everything = StripOptions {
            remove_read_only: true,
            remove_schemas: true,
            remove_security_schemes: true,
            remove_servers: true,
            replace_responses: true,
            remove_responses: true,
            ..metadata_only
        };

        match self {
            StripPreset::Default => metadata_only,
            StripPreset::All => everything,
            StripPreset::OpenapiClientAxios => StripOptions {
                remove_servers: false,
                first_server_only: true,
                ..everything
            },
            StripPreset::OpenapiBackend => StripOptions {
                remove_examples: false,
                remove_servers: true,
                ..metadata_only
            },
        }
    }
}

impl fmt::Display for StripPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StripPreset {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StripPreset::all()
            .iter()
            .copied()
            .find(|preset| preset.as_str() == s)
            .ok_or_else(|| TransformError::unknown_preset(s))
    }
}

impl StripOptions {
    /// Preset defaults with explicit overrides applied on top
    pub fn resolve(preset: StripPreset, overrides: &StripOverrides) -> Self {
        let base = preset.options();
        let pick = |explicit: Option<bool>, preset: bool| explicit.unwrap_or(preset);
        Self {
            replace_info: pick(overrides.replace_info, base.replace_info),
            remove_tags: pick(overrides.remove_tags, base.remove_tags),
            remove_descriptions: pick(overrides.remove_descriptions, base.remove_descriptions),
            remove_examples: pick(overrides.remove_examples, base.remove_examples),
            remove_extensions: pick(overrides.remove_extensions, base.remove_extensions),
            remove_read_only: pick(overrides.remove_read_only, base.remove_read_only),
            remove_schemas: pick(overrides.remove_schemas, base.remove_schemas),
            remove_security_schemes: pick(
                overrides.remove_security_schemes,
                base.remove_security_schemes,
            ),
            remove_servers: pick(overrides.remove_servers, base.remove_servers),
            first_server_only: pick(overrides.first_server_only, base.first_server_only),
            replace_responses: pick(overrides.replace_responses, base.replace_responses),
            remove_responses: pick(overrides.remove_responses, base.remove_responses),
        }
    }
}

impl From<StripPreset> for StripOptions {
    fn from(preset: StripPreset) -> Self {
        preset.options()
    }
}

/// Strips optional metadata from a copy of `document`
pub fn strip(document: &Document, options: &StripOptions) -> Document {
    let mut output = document.clone();
    tracing::debug!(?options, "Stripping definition");

    if options.replace_info {
        set_root(&mut output, "info", json!({ "title": "", "version": "" }));
    }
    if options.remove_tags {
        remove_at_every_level(&mut output, "tags");
    }
    if options.remove_schemas {
        remove_schemas(&mut output);
    }
    if options.remove_security_schemes {
        remove_component_kind(&mut output, "securitySchemes");
        remove_at_every_level(&mut output, "security");
    }
    if options.remove_servers {
        remove_at_every_level(&mut output, "servers");
    }
    if options.first_server_only {
        if let Some(servers) = output.get_mut("servers").and_then(Value::as_array_mut) {
            servers.truncate(1);
        }
    }
    if options.replace_responses {
        for_each_operation_mut(&mut output, |op| {
            if let Some(responses) = op.get_mut("responses") {
                // a single 2XX keeps the operation schema-valid
                *responses = json!({ "2XX": { "description": "" } });
            }
        });
    }
    if options.remove_responses {
        for_each_operation_mut(&mut output, |op| {
            op.insert("responses".to_string(), json!({}));
        });
    }
    if options.remove_descriptions {
        remove_descriptions(&mut output);
    }
    if options.remove_examples {
        remove_keys_recursive(&mut output, &|key, _| EXAMPLE_KEYS.contains(&key));
    }
    if options.remove_extensions {
        remove_keys_recursive(&mut output, &|key, _| key.starts_with("x-"));
    }
    if options.remove_read_only {
        let read_only = |key: &str, value: &Value| key == "readOnly" && value.is_boolean();
        for_each_operation_mut(&mut output, |op| {
            op.retain(|key, value| !read_only(key.as_str(), value));
            for value in op.values_mut() {
                remove_keys_recursive(value, &read_only);
            }
        });
        if let Some(components) = output.get_mut("components") {
            remove_keys_recursive(components, &read_only);
        }
    }

    output
}

fn set_root(document: &mut Document, key: &str, value: Value) {
    if let Some(root) = document.as_object_mut() {
        root.insert(key.to_string(), value);
    }
}

/// Removes `key` from the root, every path item and every operation
fn remove_at_every_level(document: &mut Document, key: &str) {
    if let Some(root) = document.as_object_mut() {
        root.shift_remove(key);
    }
    for_each_path_item_mut(document, |item| {
        item.shift_remove(key);
    });
    for_each_operation_mut(document, |op| {
        op.shift_remove(key);
    });
}

fn remove_component_kind(document: &mut Document, kind: &str) {
    if let Some(components) = document.get_mut("components").and_then(Value::as_object_mut) {
        components.shift_remove(kind);
    }
}

fn remove_schemas(document: &mut Document) {
    remove_component_kind(document, "schemas");

    let is_schema = |key: &str, _: &Value| key == "schema";
    if let Some(paths) = document.get_mut("paths") {
        remove_keys_recursive(paths, &is_schema);
    }
    if let Some(components) = document.get_mut("components") {
        for kind in ["requestBodies", "responses", "parameters"] {
            if let Some(section) = components.get_mut(kind) {
                remove_keys_recursive(section, &is_schema);
            }
        }
    }
}

fn is_description(key: &str, value: &Value) -> bool {
    key == "description" && value.is_string()
}

/// Deletes every string `description` except on operation responses, where
/// the field is required and gets blanked instead. Path and operation
/// summaries go too.
fn remove_descriptions(document: &mut Document) {
    let Some(root) = document.as_object_mut() else {
        return;
    };

    for (key, value) in root.iter_mut() {
        if key == "paths" {
            if let Some(paths) = value.as_object_mut() {
                paths
                    .values_mut()
                    .filter_map(Value::as_object_mut)
                    .for_each(strip_path_item_descriptions);
            }
        } else {
            remove_keys_recursive(value, &is_description);
        }
    }
    root.retain(|key, value| !is_description(key, value));
}

fn strip_path_item_descriptions(item: &mut Map<String, Value>) {
    item.retain(|key, value| !(key == "summary" || is_description(key, value)));

    for (key, value) in item.iter_mut() {
        if !is_http_method(key) {
            remove_keys_recursive(value, &is_description);
            continue;
        }
        let Some(op) = value.as_object_mut() else {
            continue;
        };

        op.retain(|key, value| !(key == "summary" || is_description(key, value)));
        for (op_key, op_value) in op.iter_mut() {
            if op_key != "responses" {
                remove_keys_recursive(op_value, &is_description);
            } else if let Some(responses) = op_value.as_object_mut() {
                responses
                    .values_mut()
                    .filter_map(Value::as_object_mut)
                    .for_each(blank_response_description);
            }
        }
    }
}

fn blank_response_description(response: &mut Map<String, Value>) {
    for (key, value) in response.iter_mut() {
        if key != "description" {
            remove_keys_recursive(value, &is_description);
        }
    }
    if response.contains_key(REF_KEY) {
        response.retain(|key, value| !is_description(key, value));
    } else {
        response.insert("description".to_string(), json!(""));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        json!({
            "openapi": "3.0.0",
            "info": {
                "title": "Pets",
                "version": "1.0.0",
                "description": "pet store",
                "contact": { "name": "team" },
                "license": { "name": "MIT" },
                "termsOfService": "https://example.com/tos"
            },
            "servers": [
                { "url": "https://a.example.com", "description": "primary" },
                { "url": "https://b.example.com" }
            ],
            "tags": [{ "name": "pets", "description": "pet ops" }],
            "security": [{ "ApiKey": [] }],
            "x-root": true,
            "paths": {
                "/pets/{id}": {
                    "summary": "one pet",
                    "description": "pet item",
                    "servers": [{ "url": "/v1", "description": "path server" }],
                    "parameters": [
                        { "name": "id", "in": "path", "description": "pet id", "schema": { "type": "string" } }
                    ],
                    "get": {
                        "operationId": "getPet",
                        "summary": "get pet",
                        "description": "gets a pet",
                        "tags": ["pets"],
                        "security": [{ "ApiKey": [] }],
                        "x-internal": false,
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Pet" },
                                        "example": { "id": "1" }
                                    }
                                }
                            },
                            "404": { "$ref": "#/components/responses/NotFound" }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Pet": {
                        "type": "object",
                        "description": "a pet",
                        "properties": {
                            "id": { "type": "string", "readOnly": true, "example": "1" },
                            "description": { "type": "string" }
                        }
                    }
                },
                "responses": {
                    "NotFound": { "description": "not found" }
                },
                "securitySchemes": {
                    "ApiKey": { "type": "apiKey", "name": "x-api-key", "in": "header", "description": "key" }
                }
            }
        })
    }

    #[test]
    fn test_replace_info() {
        let out = strip(
            &document(),
            &StripOptions {
                replace_info: true,
                ..Default::default()
            },
        );
        assert_eq!(out["info"], json!({ "title": "", "version": "" }));
    }

    #[test]
    fn test_remove_tags_everywhere() {
        let out = strip(
            &document(),
            &StripOptions {
                remove_tags: true,
                ..Default::default()
            },
        );
        assert!(out.get("tags").is_none());
        assert!(out["paths"]["/pets/{id}"]["get"].get("tags").is_none());
    }

    #[test]
    fn test_remove_descriptions_blanks_operation_responses() {
        let out = strip(
            &document(),
            &StripOptions {
                remove_descriptions: true,
                ..Default::default()
            },
        );
        let item = &out["paths"]["/pets/{id}"];
        assert!(item.get("summary").is_none());
        assert!(item.get("description").is_none());
        assert!(item["servers"][0].get("description").is_none());
        assert!(item["parameters"][0].get("description").is_none());

        let op = &item["get"];
        assert!(op.get("summary").is_none());
        assert!(op.get("description").is_none());
        assert_eq!(op["responses"]["200"]["description"], "");
        assert_eq!(
            op["responses"]["404"],
            json!({ "$ref": "#/components/responses/NotFound" })
        );

        assert!(out["info"].get("description").is_none());
        assert!(out["servers"][0].get("description").is_none());
        assert!(out["tags"][0].get("description").is_none());
        let pet = &out["components"]["schemas"]["Pet"];
        assert!(pet.get("description").is_none());
        // a property called "description" is a schema, not a description
        assert_eq!(pet["properties"]["description"], json!({ "type": "string" }));
        assert!(out["components"]["responses"]["NotFound"].get("description").is_none());
        assert!(out["components"]["securitySchemes"]["ApiKey"].get("description").is_none());
    }

    #[test]
    fn test_remove_descriptions_keeps_response_key_order() {
        let out = strip(
            &document(),
            &StripOptions {
                remove_descriptions: true,
                ..Default::default()
            },
        );
        let keys: Vec<&String> = out["paths"]["/pets/{id}"]["get"]["responses"]["200"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, vec!["description", "content"]);
    }

    #[test]
    fn test_remove_examples() {
        let out = strip(
            &document(),
            &StripOptions {
                remove_examples: true,
                ..Default::default()
            },
        );
        let media =
            &out["paths"]["/pets/{id}"]["get"]["responses"]["200"]["content"]["application/json"];
        assert!(media.get("example").is_none());
        assert!(media.get("schema").is_some());
        assert!(
            out["components"]["schemas"]["Pet"]["properties"]["id"]
                .get("example")
                .is_none()
        );
    }

    #[test]
    fn test_remove_extensions() {
        let out = strip(
            &document(),
            &StripOptions {
                remove_extensions: true,
                ..Default::default()
            },
        );
        assert!(out.get("x-root").is_none());
        assert!(out["paths"]["/pets/{id}"]["get"].get("x-internal").is_none());
    }

    #[test]
    fn test_remove_read_only() {
        let out = strip(
            &document(),
            &StripOptions {
                remove_read_only: true,
                ..Default::default()
            },
        );
        assert!(out["components"]["schemas"]["Pet"]["properties"]["id"].get("readOnly").is_none());
    }

    #[test]
    fn test_remove_schemas() {
        let out = strip(
            &document(),
            &StripOptions {
                remove_schemas: true,
                ..Default::default()
            },
        );
        assert!(out["components"].get("schemas").is_none());
        let item = &out["paths"]["/pets/{id}"];
        assert!(item["parameters"][0].get("schema").is_none());
        assert!(
            item["get"]["responses"]["200"]["content"]["application/json"]
                .get("schema")
                .is_none()
        );
    }

    #[test]
    fn test_remove_security_schemes() {
        let out = strip(
            &document(),
            &StripOptions {
                remove_security_schemes: true,
                ..Default::default()
            },
        );
        assert!(out["components"].get("securitySchemes").is_none());
        assert!(out.get("security").is_none());
        assert!(out["paths"]["/pets/{id}"]["get"].get("security").is_none());
    }

    #[test]
    fn test_remove_servers() {
        let out = strip(
            &document(),
            &StripOptions {
                remove_servers: true,
                ..Default::default()
            },
        );
        assert!(out.get("servers").is_none());
        assert!(out["paths"]["/pets/{id}"].get("servers").is_none());
    }

    #[test]
    fn test_first_server_only() {
        let out = strip(
            &document(),
            &StripOptions {
                first_server_only: true,
                ..Default::default()
            },
        );
        assert_eq!(out["servers"].as_array().unwrap().len(), 1);
        assert_eq!(out["servers"][0]["url"], "https://a.example.com");
    }

    #[test]
    fn test_replace_responses() {
        let out = strip(
            &document(),
            &StripOptions {
                replace_responses: true,
                ..Default::default()
            },
        );
        assert_eq!(
            out["paths"]["/pets/{id}"]["get"]["responses"],
            json!({ "2XX": { "description": "" } })
        );
    }

    #[test]
    fn test_remove_responses() {
        let out = strip(
            &document(),
            &StripOptions {
                remove_responses: true,
                ..Default::default()
            },
        );
        assert_eq!(out["paths"]["/pets/{id}"]["get"]["responses"], json!({}));
    }

    #[test]
    fn test_explicit_override_beats_preset() {
        let options = StripOptions::resolve(
            StripPreset::All,
            &StripOverrides {
                remove_servers: Some(false),
                remove_descriptions: Some(false),
                ..Default::default()
            },
        );
        assert!(!options.remove_servers);
        assert!(!options.remove_descriptions);
        assert!(options.remove_schemas);
    }

    #[test]
    fn test_preset_tables() {
        let axios = StripPreset::OpenapiClientAxios.options();
        assert!(!axios.remove_servers);
        assert!(axios.first_server_only);
        assert!(axios.remove_schemas);

        let backend = StripPreset::OpenapiBackend.options();
        assert!(!backend.remove_examples);
        assert!(backend.remove_servers);
        assert!(!backend.remove_schemas);

        let default = StripPreset::Default.options();
        assert!(!default.remove_read_only);
        assert!(!default.remove_servers);
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("all".parse::<StripPreset>().unwrap(), StripPreset::All);
        assert_eq!(
            "openapi_backend".parse::<StripPreset>().unwrap(),
            StripPreset::OpenapiBackend
        );
        assert!(matches!(
            "everything".parse::<StripPreset>(),
            Err(TransformError::UnknownPreset { .. })
        ));
    }

    #[test]
    fn test_overrides_deserialize_from_camel_case() {
        let overrides: StripOverrides =
            serde_json::from_str(r#"{"removeServers":false,"removeReadOnly":true}"#).unwrap();
        assert_eq!(overrides.remove_servers, Some(false));
        assert_eq!(overrides.remove_read_only, Some(true));
        assert!(overrides.remove_tags.is_none());
        assert!(serde_json::from_str::<StripOverrides>(r#"{"removeEverything":true}"#).is_err());
    }

    #[test]
    fn test_strip_does_not_modify_input() {
        let doc = document();
        let snapshot = doc.clone();
        let _ = strip(&doc, &StripPreset::All.options());
        assert_eq!(doc, snapshot);
    }
}
