//! The `info` use case: summarize a definition

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::core::error::Result;
use crate::infrastructure::openapi::DefinitionLoader;
use crate::transform::walk::for_each_operation;
use crate::transform::{Document, TransformOptions, transform_definition};

const DEFAULT_TAG: &str = "default";

/// Which sections `info` lists in full instead of counting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InfoSections {
    pub operations: bool,
    pub schemas: bool,
    pub security: bool,
}

/// Request for the `info` use case
#[derive(Debug, Clone, Default)]
pub struct InfoRequest {
    pub options: TransformOptions,
    pub sections: InfoSections,
}

/// One operation as listed by `info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSummary {
    pub method: String,
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub tags: Vec<String>,
}

impl OperationSummary {
    /// `GET /pets - List pets (listPets)`
    pub fn route(&self) -> String {
        let mut route = format!("{} {}", self.method.to_uppercase(), self.path);
        if let Some(summary) = &self.summary {
            route.push_str(&format!(" - {summary}"));
        }
        if let Some(id) = &self.operation_id {
            route.push_str(&format!(" ({id})"));
        }
        route
    }
}

/// Every operation of a document, in path order
pub fn all_operations(document: &Document) -> Vec<OperationSummary> {
    let mut operations = Vec::new();
    for_each_operation(document, |path, method, op| {
        operations.push(OperationSummary {
            method: method.to_string(),
            path: path.to_string(),
            operation_id: string_field(op, "operationId"),
            summary: string_field(op, "summary").or_else(|| string_field(op, "description")),
            tags: op
                .get("tags")
                .and_then(Value::as_array)
                .map(|tags| tags.iter().filter_map(Value::as_str).map(String::from).collect())
                .unwrap_or_default(),
        });
    });
    operations
}

/// Operations of a document, one per `operationId`.
///
/// Operations without an id are all kept.
pub fn get_operations(document: &Document) -> Vec<OperationSummary> {
    let mut seen = HashSet::new();
    all_operations(document)
        .into_iter()
        .filter(|op| match &op.operation_id {
            Some(id) => seen.insert(id.clone()),
            None => true,
        })
        .collect()
}

/// Renders the human readable summary printed by `openapi info`
pub fn render_info(source: &str, document: &Document, sections: InfoSections) -> String {
    InfoReport {
        source,
        document,
        sections,
    }
    .to_string()
}

struct InfoReport<'a> {
    source: &'a str,
    document: &'a Document,
    sections: InfoSections,
}

impl fmt::Display for InfoReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let document = self.document;
        writeln!(f, "Loaded: {}", self.source)?;
        writeln!(f)?;
        write_metadata(f, document)?;
        write_servers(f, document)?;

        let operation_count = get_operations(document).len();
        writeln!(f)?;
        if self.sections.operations {
            write_operations(f, document, operation_count)?;
        } else {
            writeln!(f, "operations: {operation_count}")?;
            let tags = document.get("tags").and_then(Value::as_array).map_or(0, Vec::len);
            writeln!(f, "tags: {tags}")?;
        }

        let schemas = component_section(document, "schemas");
        if self.sections.schemas {
            writeln!(f)?;
            if !schemas.is_empty() {
                writeln!(f, "schemas ({}):", schemas.len())?;
                for name in schemas.keys() {
                    writeln!(f, "- {name}")?;
                }
            }
        } else {
            writeln!(f, "schemas: {}", schemas.len())?;
        }

        let schemes = component_section(document, "securitySchemes");
        if self.sections.security {
            writeln!(f)?;
            if !schemes.is_empty() {
                writeln!(f, "securitySchemes ({}):", schemes.len())?;
                for (name, scheme) in &schemes {
                    writeln!(f, "- {}", describe_scheme(name, scheme))?;
                }
            }
        } else {
            writeln!(f, "securitySchemes: {}", schemes.len())?;
        }
        Ok(())
    }
}

fn write_metadata(f: &mut fmt::Formatter<'_>, document: &Document) -> fmt::Result {
    if let Some(info) = document.get("info").and_then(Value::as_object) {
        writeln!(f, "title: {}", string_field(info, "title").unwrap_or_default())?;
        writeln!(f, "version: {}", string_field(info, "version").unwrap_or_default())?;
        if let Some(description) = string_field(info, "description") {
            writeln!(f, "description:\n{description}")?;
        }
        if let Some(contact) = info.get("contact").and_then(Value::as_object) {
            match (string_field(contact, "name"), string_field(contact, "email")) {
                (Some(name), Some(email)) => writeln!(f, "contact: {name} <{email}>")?,
                (Some(single), None) | (None, Some(single)) => writeln!(f, "contact: {single}")?,
                (None, None) => {}
            }
            if let Some(url) = string_field(contact, "url") {
                writeln!(f, "website: {url}")?;
            }
        }
    }
    if let Some(url) = document.pointer("/externalDocs/url").and_then(Value::as_str) {
        writeln!(f, "docs: {url}")?;
    }
    Ok(())
}

fn write_servers(f: &mut fmt::Formatter<'_>, document: &Document) -> fmt::Result {
    let servers: Vec<&Map<String, Value>> = document
        .get("servers")
        .and_then(Value::as_array)
        .map(|servers| servers.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default();

    if servers.is_empty() {
        return writeln!(f, "servers: 0");
    }
    writeln!(f, "servers:")?;
    for server in servers {
        let url = string_field(server, "url").unwrap_or_default();
        match string_field(server, "description") {
            Some(description) => writeln!(f, "- {url} ({description})")?,
            None => writeln!(f, "- {url}")?,
        }
    }
    Ok(())
}

/// Lists every route grouped by tag, declared tags first.
///
/// The header counts operations by `operationId`, so it can be lower than
/// the number of routes listed.
fn write_operations(
    f: &mut fmt::Formatter<'_>,
    document: &Document,
    operation_count: usize,
) -> fmt::Result {
    let mut groups: Vec<(String, Vec<String>)> = document
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(|tag| tag.get("name").and_then(Value::as_str))
                .map(|name| (name.to_string(), Vec::new()))
                .collect()
        })
        .unwrap_or_default();

    for operation in all_operations(document) {
        let route = operation.route();
        let tags = if operation.tags.is_empty() {
            vec![DEFAULT_TAG.to_string()]
        } else {
            operation.tags
        };
        for tag in tags {
            match groups.iter_mut().find(|(name, _)| *name == tag) {
                Some((_, routes)) => routes.push(route.clone()),
                None => groups.push((tag, vec![route.clone()])),
            }
        }
    }

    writeln!(f, "operations ({operation_count}):")?;
    for route in groups.iter().flat_map(|(_, routes)| routes) {
        writeln!(f, "- {route}")?;
    }
    Ok(())
}

fn describe_scheme(name: &str, scheme: &Value) -> String {
    let details: Vec<&str> = ["type", "scheme", "name"]
        .iter()
        .filter_map(|key| scheme.get(*key).and_then(Value::as_str))
        .filter(|value| !value.is_empty())
        .collect();
    let mut line = format!("{name}: ({})", details.join(", "));
    if let Some(description) = scheme.get("description").and_then(Value::as_str) {
        line.push(' ');
        line.push_str(description);
    }
    line
}

fn component_section(document: &Document, kind: &str) -> Map<String, Value> {
    document
        .get("components")
        .and_then(|components| components.get(kind))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

/// Use case behind `openapi info`
pub struct InfoUseCase {
    loader: Arc<dyn DefinitionLoader>,
}

impl InfoUseCase {
    pub fn new(loader: Arc<dyn DefinitionLoader>) -> Self {
        Self { loader }
    }

    pub async fn execute(&self, request: InfoRequest) -> Result<String> {
        let document = transform_definition(&request.options, self.loader.as_ref()).await?;
        Ok(render_info(&request.options.source, &document, request.sections))
    }
}
