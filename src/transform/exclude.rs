//! Removes parts of the document marked with a vendor extension

use serde_json::{Map, Value};

use super::Document;
use super::walk::operation_count;

/// Removes every object that directly carries `extension` from its container.
///
/// Marking an operation removes that operation, marking a path item removes the
/// path, marking a schema property removes the property. Path items left
/// without operations afterwards are dropped. The root object itself is never
/// removed.
pub fn prune_by_extension(document: &Document, extension: &str) -> Document {
    let Value::Object(root) = document else {
        return document.clone();
    };

    let mut output: Map<String, Value> = root
        .iter()
        .filter_map(|(key, value)| Some((key.clone(), prune_value(value, extension)?)))
        .collect();

    if let (Some(Value::Object(before)), Some(Value::Object(after))) =
        (root.get("paths"), output.get_mut("paths"))
    {
        after.retain(|path, item| {
            let emptied = match (item.as_object(), before.get(path).and_then(Value::as_object)) {
                (Some(now), Some(was)) => {
                    now.is_empty() || (operation_count(was) > 0 && operation_count(now) == 0)
                }
                _ => false,
            };
            if emptied {
                tracing::debug!(path = %path, "Removing path left without operations");
            }
            !emptied
        });
    }

    Value::Object(output)
}

/// Returns `None` when `value` is an object marked with `extension`
fn prune_value(value: &Value, extension: &str) -> Option<Value> {
    match value {
        Value::Object(map) if map.contains_key(extension) => None,
        Value::Object(map) => Some(Value::Object(
            map.iter()
                .filter_map(|(key, child)| Some((key.clone(), prune_value(child, extension)?)))
                .collect(),
        )),
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .filter_map(|item| prune_value(item, extension))
                .collect(),
        )),
        other => Some(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Document {
        json!({
            "openapi": "3.0.0",
            "info": { "title": "Pets", "version": "1.0.0" },
            "paths": {
                "/pets": {
                    "get": { "operationId": "listPets", "responses": {} },
                    "post": {
                        "operationId": "createPet",
                        "x-internal": true,
                        "responses": {}
                    }
                },
                "/admin": {
                    "delete": { "operationId": "purge", "x-internal": true, "responses": {} }
                },
                "/hidden": {
                    "x-internal": false,
                    "get": { "operationId": "hidden", "responses": {} }
                },
                "/shared": { "$ref": "./shared.yml" }
            },
            "components": {
                "schemas": {
                    "Pet": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "secret": { "type": "string", "x-internal": true }
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_removes_marked_operation_only() {
        let out = prune_by_extension(&document(), "x-internal");
        let pets = out["paths"]["/pets"].as_object().unwrap();
        assert!(pets.contains_key("get"));
        assert!(!pets.contains_key("post"));
    }

    #[test]
    fn test_removes_path_emptied_by_pruning() {
        let out = prune_by_extension(&document(), "x-internal");
        assert!(out["paths"].get("/admin").is_none());
    }

    #[test]
    fn test_mark_on_path_item_removes_path() {
        let out = prune_by_extension(&document(), "x-internal");
        assert!(out["paths"].get("/hidden").is_none());
    }

    #[test]
    fn test_keeps_path_items_without_operations() {
        let out = prune_by_extension(&document(), "x-internal");
        assert_eq!(out["paths"]["/shared"], json!({ "$ref": "./shared.yml" }));
    }

    #[test]
    fn test_removes_marked_schema_property() {
        let out = prune_by_extension(&document(), "x-internal");
        let props = out["components"]["schemas"]["Pet"]["properties"]
            .as_object()
            .unwrap();
        assert!(props.contains_key("name"));
        assert!(!props.contains_key("secret"));
    }

    #[test]
    fn test_drops_marked_array_elements() {
        let doc = json!({
            "paths": {},
            "tags": [{ "name": "public" }, { "name": "internal", "x-internal": true }]
        });
        let out = prune_by_extension(&doc, "x-internal");
        assert_eq!(out["tags"], json!([{ "name": "public" }]));
    }

    #[test]
    fn test_input_untouched_and_unknown_extension_is_noop() {
        let doc = document();
        let snapshot = doc.clone();
        let out = prune_by_extension(&doc, "x-not-used");
        assert_eq!(doc, snapshot);
        assert_eq!(out, snapshot);
    }
}
