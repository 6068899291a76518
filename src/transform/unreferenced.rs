//! Removal of components nothing points at

use std::collections::HashSet;

use percent_encoding::percent_decode_str;
use serde_json::Value;

use super::Document;
use super::walk::{collect_refs, for_each_operation};

/// Vendor extension that exempts a component from removal
pub const KEEP_EXTENSION: &str = "x-openapicmd-keep";

const SECURITY_SCHEMES: &str = "securitySchemes";

/// Component names referenced somewhere in a document.
///
/// Refs of the form `#/components/<kind>/<name>` are tracked per kind. Any other
/// ref only contributes its last path segment, which then matches that name in
/// every component kind.
#[derive(Debug, Default)]
pub struct ReferencedComponents {
    by_kind: HashSet<(String, String)>,
    any_kind: HashSet<String>,
}

impl ReferencedComponents {
    /// Scans the whole document for `$ref` values and security requirements
    pub fn collect(document: &Document) -> Self {
        let mut referenced = Self::default();
        for reference in collect_refs(document) {
            referenced.add_ref(reference);
        }

        for requirements in security_requirements(document) {
            for requirement in requirements.iter().filter_map(Value::as_object) {
                for scheme in requirement.keys() {
                    referenced
                        .by_kind
                        .insert((SECURITY_SCHEMES.to_string(), scheme.clone()));
                }
            }
        }
        referenced
    }

    fn add_ref(&mut self, reference: &str) {
        let fragment = reference.split_once('#').map(|(_, f)| f).unwrap_or("");
        let fragment = percent_decode_str(fragment).decode_utf8_lossy();
        let segments: Vec<&str> = fragment.split('/').collect();

        match segments.as_slice() {
            ["", "components", kind, name, ..] => {
                self.by_kind
                    .insert((unescape_segment(kind), unescape_segment(name)));
            }
            _ => {
                if let Some(last) = reference.rsplit('/').next() {
                    self.any_kind.insert(unescape_segment(last));
                }
            }
        }
    }

    pub fn contains(&self, kind: &str, name: &str) -> bool {
        self.any_kind.contains(name)
            || self
                .by_kind
                .contains(&(kind.to_string(), name.to_string()))
    }
}

/// Deletes every `components.<kind>.<name>` object that is neither referenced
/// nor marked with a truthy `x-openapicmd-keep`.
pub fn prune_unreferenced(document: &Document) -> Document {
    let referenced = ReferencedComponents::collect(document);
    let mut output = document.clone();

    let Some(components) = output.get_mut("components").and_then(Value::as_object_mut) else {
        return output;
    };

    for (kind, entries) in components.iter_mut() {
        let Some(entries) = entries.as_object_mut() else {
            continue;
        };
        entries.retain(|name, component| {
            let remove = component.is_object()
                && !component.get(KEEP_EXTENSION).is_some_and(is_truthy)
                && !referenced.contains(kind, name);
            if remove {
                tracing::debug!(kind = %kind, name = %name, "Removing unreferenced component");
            }
            !remove
        });
    }
    output
}

/// Security requirement arrays at the root, path and operation levels
fn security_requirements(document: &Document) -> Vec<&Vec<Value>> {
    let mut found: Vec<&Vec<Value>> = document
        .get("security")
        .and_then(Value::as_array)
        .into_iter()
        .collect();

    if let Some(paths) = document.get("paths").and_then(Value::as_object) {
        found.extend(
            paths
                .values()
                .filter_map(|item| item.get("security"))
                .filter_map(Value::as_array),
        );
    }

    let mut operation_level = Vec::new();
    for_each_operation(document, |_, _, op| {
        if let Some(security) = op.get("security").and_then(Value::as_array) {
            operation_level.push(security);
        }
    });
    found.extend(operation_level);
    found
}

/// Undo JSON pointer escaping (`~1` is `/`, `~0` is `~`)
fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
