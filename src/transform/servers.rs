//! Server list overrides

use serde_json::{Value, json};
use url::Url;

use super::Document;
use crate::core::utils::{origin_of, remote_source_url};

/// Server rewrites applied after every other stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerOverrides {
    /// Urls prepended ahead of the existing servers
    pub servers: Vec<String>,
    /// Path that replaces the path of every server url
    pub root: Option<String>,
    /// Derive a server from `source` when it is an http(s) URL
    pub induce: bool,
    /// Where the definition was loaded from
    pub source: Option<String>,
}

impl ServerOverrides {
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty() && self.root.is_none() && !self.induce
    }
}

/// Applies `overrides` to a copy of `document`.
///
/// Prepending runs first, then inducing from the source, then the root
/// rewrite.
pub fn apply_servers(document: &Document, overrides: &ServerOverrides) -> Document {
    let mut output = document.clone();
    let Some(root) = output.as_object_mut() else {
        return document.clone();
    };

    let mut servers: Vec<Value> = overrides
        .servers
        .iter()
        .map(|url| json!({ "url": url }))
        .collect();
    if let Some(Value::Array(existing)) = root.get("servers") {
        servers.extend(existing.iter().cloned());
    }

    if overrides.induce {
        if let Some(source) = overrides.source.as_deref().and_then(remote_source_url) {
            induce_from_source(&mut servers, &source);
        }
    }

    if let Some(api_root) = overrides.root.as_deref() {
        apply_root(&mut servers, &normalize_root(api_root));
    }

    if !servers.is_empty() || root.contains_key("servers") {
        root.insert("servers".to_string(), Value::Array(servers));
    }
    output
}

fn induce_from_source(servers: &mut Vec<Value>, source: &Url) {
    let origin = origin_of(source);
    if servers.is_empty() {
        tracing::debug!(origin = %origin, "Inducing server from definition source");
        servers.push(json!({ "url": origin }));
        return;
    }

    for url in servers.iter_mut().filter_map(server_url_mut) {
        // protocol-relative urls already name their host
        if absolute_url(url).is_none() && !url.starts_with("//") {
            let path = if url.starts_with('/') {
                url.clone()
            } else {
                format!("/{url}")
            };
            *url = format!("{origin}{path}");
        }
    }
}

fn apply_root(servers: &mut Vec<Value>, api_root: &str) {
    if servers.is_empty() {
        servers.push(json!({ "url": api_root }));
        return;
    }

    for url in servers.iter_mut().filter_map(server_url_mut) {
        *url = match absolute_url(url) {
            Some(parsed) => format!("{}{api_root}", origin_of(&parsed)),
            None => api_root.to_string(),
        };
    }
}

fn normalize_root(api_root: &str) -> String {
    if api_root.starts_with('/') {
        api_root.to_string()
    } else {
        format!("/{api_root}")
    }
}

fn server_url_mut(server: &mut Value) -> Option<&mut String> {
    match server.get_mut("url") {
        Some(Value::String(url)) => Some(url),
        _ => None,
    }
}

/// Parses `url` when it carries an http(s) scheme and host
fn absolute_url(url: &str) -> Option<Url> {
    remote_source_url(url).filter(|parsed| parsed.has_host())
}
