//! Tree walking helpers over [`Document`] values
//!
//! Every helper here works on an owned copy handed in by a pipeline stage, so
//! the caller's document is never touched.

use serde_json::{Map, Value};

use crate::core::utils::is_http_method;

use super::Document;

/// Key holding a reference pointer
pub const REF_KEY: &str = "$ref";

/// Recursively drops every object entry for which `remove` returns true.
///
/// Removed values are not descended into.
pub fn remove_keys_recursive(value: &mut Value, remove: &dyn Fn(&str, &Value) -> bool) {
    match value {
        Value::Object(map) => {
            map.retain(|key, child| !remove(key, child));
            for child in map.values_mut() {
                remove_keys_recursive(child, remove);
            }
        }
        Value::Array(items) => {
            for item in items {
                remove_keys_recursive(item, remove);
            }
        }
        _ => {}
    }
}

/// Collects every string stored under a `$ref` key, in document order
pub fn collect_refs(value: &Value) -> Vec<&str> {
    let mut refs = Vec::new();
    collect_refs_into(value, &mut refs);
    refs
}

fn collect_refs_into<'a>(value: &'a Value, refs: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match child {
                    Value::String(pointer) if key == REF_KEY => refs.push(pointer),
                    _ => collect_refs_into(child, refs),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_refs_into(item, refs)),
        _ => {}
    }
}

/// Calls `f` with every path item object under `paths`
pub fn for_each_path_item_mut<F>(document: &mut Document, mut f: F)
where
    F: FnMut(&mut Map<String, Value>),
{
    if let Some(paths) = document.get_mut("paths").and_then(Value::as_object_mut) {
        paths.values_mut().filter_map(Value::as_object_mut).for_each(&mut f);
    }
}

/// Calls `f` with every operation object (`paths.<path>.<method>`)
pub fn for_each_operation_mut<F>(document: &mut Document, mut f: F)
where
    F: FnMut(&mut Map<String, Value>),
{
    for_each_path_item_mut(document, |item| {
        item.iter_mut()
            .filter(|(key, _)| is_http_method(key))
            .filter_map(|(_, op)| op.as_object_mut())
            .for_each(&mut f);
    });
}

/// Calls `f` with every operation object along with its path and method
pub fn for_each_operation<'a, F>(document: &'a Document, mut f: F)
where
    F: FnMut(&'a str, &'a str, &'a Map<String, Value>),
{
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return;
    };
    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            continue;
        };
        for (method, op) in item {
            if let (true, Some(op)) = (is_http_method(method), op.as_object()) {
                f(path, method, op);
            }
        }
    }
}

/// Counts the operation keys in a path item
pub fn operation_count(item: &Map<String, Value>) -> usize {
    item.keys().filter(|key| is_http_method(key)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remove_keys_recursive_reaches_arrays() {
        let mut value = json!({
            "example": 1,
            "nested": [{ "example": 2, "keep": true }],
            "deep": { "deeper": { "example": 3 } }
        });
        remove_keys_recursive(&mut value, &|key, _| key == "example");
        assert_eq!(
            value,
            json!({ "nested": [{ "keep": true }], "deep": { "deeper": {} } })
        );
    }

    #[test]
    fn test_collect_refs_ignores_non_string_refs() {
        let value = json!({
            "a": { "$ref": "#/components/schemas/A" },
            "b": [{ "$ref": "#/components/schemas/B" }],
            "properties": { "$ref": { "type": "string" } }
        });
        assert_eq!(
            collect_refs(&value),
            vec!["#/components/schemas/A", "#/components/schemas/B"]
        );
    }

    #[test]
    fn test_for_each_operation_skips_non_methods() {
        let mut doc = json!({
            "paths": {
                "/pets": {
                    "parameters": [],
                    "summary": "pets",
                    "get": { "operationId": "listPets" },
                    "post": { "operationId": "createPet" }
                }
            }
        });
        let mut seen = Vec::new();
        for_each_operation(&doc, |path, method, _| seen.push(format!("{method} {path}")));
        assert_eq!(seen, vec!["get /pets", "post /pets"]);

        for_each_operation_mut(&mut doc, |op| {
            op.insert("deprecated".into(), json!(true));
        });
        assert_eq!(doc["paths"]["/pets"]["get"]["deprecated"], json!(true));
        assert!(doc["paths"]["/pets"].get("deprecated").is_none());
    }
}
