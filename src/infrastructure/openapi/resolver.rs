//! Reference resolution: parse, bundle, dereference and validate
//!
//! The resolver is the only async stage of the pipeline. It fetches the root
//! definition plus every external document reachable through `$ref`, then
//! inlines references synchronously.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use super::DefinitionLoader;
use super::composite_loader::STDIN_SOURCE;
use crate::core::error::{Result, TransformError};
use crate::core::utils::is_remote_source;
use crate::transform::Document;
use crate::transform::walk::{REF_KEY, collect_refs, for_each_operation};

/// How far references get resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Parse only, references stay untouched
    Parse,
    /// Inline external references, keep internal ones as pointers
    Bundle,
    /// Inline every reference except cycles
    Dereference,
}

/// Options controlling the resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    pub dereference: bool,
    pub bundle: bool,
    pub validate: bool,
}

impl ResolveOptions {
    /// Validation implies dereferencing, which implies bundling
    pub fn mode(&self) -> ResolveMode {
        if self.validate || self.dereference {
            ResolveMode::Dereference
        } else if self.bundle {
            ResolveMode::Bundle
        } else {
            ResolveMode::Parse
        }
    }
}

/// Resolves a definition source into a document
pub struct DefinitionResolver<'a> {
    loader: &'a dyn DefinitionLoader,
}

impl<'a> DefinitionResolver<'a> {
    pub fn new(loader: &'a dyn DefinitionLoader) -> Self {
        Self { loader }
    }

    /// Load `source` and resolve references according to `options`
    pub async fn resolve(&self, source: &str, options: &ResolveOptions) -> Result<Document> {
        let root = self.loader.load(source).await?;
        let mode = options.mode();
        debug!(source, ?mode, "Resolving definition");

        let document = match mode {
            ResolveMode::Parse => root,
            ResolveMode::Bundle => self.bundle(source, root).await?,
            ResolveMode::Dereference => {
                let bundled = self.bundle(source, root).await?;
                dereference(&bundled)?
            }
        };

        if options.validate {
            validate(&document)?;
        }
        Ok(document)
    }

    async fn bundle(&self, source: &str, root: Document) -> Result<Document> {
        let documents = self.fetch_external(source, root).await?;
        let mut bundler = Bundler {
            root_location: source,
            documents: &documents,
            stack: Vec::new(),
        };
        bundler.inline(&documents[source], source, "")
    }

    /// Fetches every document reachable through external refs, keyed by location
    async fn fetch_external(
        &self,
        source: &str,
        root: Document,
    ) -> Result<HashMap<String, Document>> {
        let mut documents = HashMap::from([(source.to_string(), root)]);
        let mut queue = VecDeque::from([source.to_string()]);

        while let Some(location) = queue.pop_front() {
            let targets: HashSet<String> = collect_refs(&documents[&location])
                .into_iter()
                .filter(|r| !r.starts_with('#'))
                .map(|r| resolve_location(&location, split_ref(r).0))
                .collect::<Result<_>>()?;

            for target in targets {
                if documents.contains_key(&target) {
                    continue;
                }
                debug!(%target, "Fetching external reference");
                let document = self.loader.load(&target).await.map_err(|e| match e {
                    TransformError::ReferenceResolution { .. } => e,
                    other => TransformError::reference(&target, other.to_string()),
                })?;
                documents.insert(target.clone(), document);
                queue.push_back(target);
            }
        }
        Ok(documents)
    }
}

/// A reference target that is being inlined
struct Inlining {
    location: String,
    pointer: String,
    /// Where the target lands in the bundled output
    output_pointer: String,
}

struct Bundler<'a> {
    root_location: &'a str,
    documents: &'a HashMap<String, Document>,
    stack: Vec<Inlining>,
}

impl Bundler<'_> {
    /// Inlines external refs in `value`, which ends up at `at` in the output
    fn inline(&mut self, value: &Value, base: &str, at: &str) -> Result<Value> {
        match value {
            Value::Object(map) => match map.get(REF_KEY).and_then(Value::as_str) {
                Some(reference) => self.inline_ref(value, reference, base, at),
                None => map
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), self.inline(v, base, &child_pointer(at, k))?)))
                    .collect::<Result<Map<_, _>>>()
                    .map(Value::Object),
            },
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    self.inline(item, base, &child_pointer(at, &index.to_string()))
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn inline_ref(
        &mut self,
        value: &Value,
        reference: &str,
        base: &str,
        at: &str,
    ) -> Result<Value> {
        let (file, fragment) = split_ref(reference);
        // internal pointers of the root document stay as they are
        if file.is_empty() && base == self.root_location {
            return Ok(value.clone());
        }

        let location = if file.is_empty() {
            base.to_string()
        } else {
            resolve_location(base, file)?
        };
        let pointer = decode_fragment(fragment);

        // a cycle points back at the copy already placed in the output
        if let Some(open) = self
            .stack
            .iter()
            .find(|open| open.location == location && open.pointer == pointer)
        {
            debug!(reference, target = %open.output_pointer, "Rewriting cyclic reference");
            let mut cyclic = Map::new();
            cyclic.insert(
                REF_KEY.to_string(),
                Value::String(format!("#{}", open.output_pointer)),
            );
            return Ok(Value::Object(cyclic));
        }

        let documents = self.documents;
        let target = documents
            .get(&location)
            .and_then(|doc| doc.pointer(&pointer))
            .ok_or_else(|| TransformError::reference(reference, "target not found"))?;

        self.stack.push(Inlining {
            location: location.clone(),
            pointer,
            output_pointer: at.to_string(),
        });
        let inlined = self.inline(target, &location, at);
        self.stack.pop();
        inlined
    }
}

/// Appends `token` to a JSON pointer, escaping `~` and `/`
fn child_pointer(parent: &str, token: &str) -> String {
    format!("{parent}/{}", token.replace('~', "~0").replace('/', "~1"))
}

/// Inline every internal reference. References to a target that is already
/// being expanded stay in place, so cyclic schemas keep one `$ref` per cycle.
pub fn dereference(document: &Document) -> Result<Document> {
    let mut stack = Vec::new();
    dereference_value(document, document, &mut stack)
}

fn dereference_value(root: &Value, value: &Value, stack: &mut Vec<String>) -> Result<Value> {
    match value {
        Value::Object(map) => {
            if let Some(reference) = map.get(REF_KEY).and_then(Value::as_str) {
                if let Some(fragment) = reference.strip_prefix('#') {
                    let pointer = decode_fragment(fragment);
                    if stack.contains(&pointer) {
                        return Ok(value.clone());
                    }
                    let target = root.pointer(&pointer).ok_or_else(|| {
                        TransformError::reference(reference, "target not found")
                    })?;
                    stack.push(pointer);
                    let resolved = dereference_value(root, target, stack);
                    stack.pop();
                    return resolved;
                }
            }
            map.iter()
                .map(|(k, v)| Ok((k.clone(), dereference_value(root, v, stack)?)))
                .collect::<Result<Map<_, _>>>()
                .map(Value::Object)
        }
        Value::Array(items) => items
            .iter()
            .map(|item| dereference_value(root, item, stack))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

/// Structural validation of the resolved document.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate(document: &Document) -> Result<()> {
    let mut errors = Vec::new();

    let version = document
        .get("openapi")
        .or_else(|| document.get("swagger"))
        .and_then(Value::as_str);
    if version.is_none() {
        errors.push("missing required string field `openapi`".to_string());
    }

    match document.get("info").and_then(Value::as_object) {
        Some(info) => {
            for field in ["title", "version"] {
                if !info.get(field).is_some_and(Value::is_string) {
                    errors.push(format!("missing required string field `info.{field}`"));
                }
            }
        }
        None => errors.push("missing required object `info`".to_string()),
    }

    if !document.get("paths").is_some_and(Value::is_object) {
        errors.push("missing required object `paths`".to_string());
    }

    for_each_operation(document, |path, method, op| {
        let has_responses = op
            .get("responses")
            .and_then(Value::as_object)
            .is_some_and(|r| !r.is_empty());
        if !has_responses {
            errors.push(format!(
                "operation `{} {path}` must declare at least one response",
                method.to_uppercase()
            ));
        }
    });

    for reference in collect_refs(document) {
        if let Some(fragment) = reference.strip_prefix('#') {
            if document.pointer(&decode_fragment(fragment)).is_none() {
                errors.push(format!("unresolved reference `{reference}`"));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TransformError::Validation { errors })
    }
}

/// Splits `file.yaml#/pointer` into its document and fragment parts
fn split_ref(reference: &str) -> (&str, &str) {
    reference.split_once('#').unwrap_or((reference, ""))
}

fn decode_fragment(fragment: &str) -> String {
    percent_decode_str(fragment).decode_utf8_lossy().into_owned()
}

/// Resolves `relative` against the location of the referring document
fn resolve_location(base: &str, relative: &str) -> Result<String> {
    if is_remote_source(relative) {
        return Ok(relative.to_string());
    }
    if is_remote_source(base) {
        return Url::parse(base)
            .and_then(|url| url.join(relative))
            .map(String::from)
            .map_err(|e| TransformError::reference(relative, e.to_string()));
    }

    let path = Path::new(relative);
    if path.is_absolute() || base == STDIN_SOURCE {
        return Ok(relative.to_string());
    }
    let joined = Path::new(base)
        .parent()
        .map(|dir| dir.join(path))
        .unwrap_or_else(|| path.to_path_buf());
    Ok(joined.to_string_lossy().into_owned())
}
