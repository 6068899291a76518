//! Deep-merge injection of JSON fragments

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::Document;
use crate::core::error::{Result, TransformError};

/// What happens when both sides of a merge hold an array
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrayMergePolicy {
    /// Base elements followed by fragment elements
    #[default]
    Concat,
    /// Fragment array replaces the base array
    Replace,
}

impl ArrayMergePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ArrayMergePolicy::Concat => "concat",
            ArrayMergePolicy::Replace => "replace",
        }
    }
}

impl fmt::Display for ArrayMergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArrayMergePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "concat" => Ok(ArrayMergePolicy::Concat),
            "replace" => Ok(ArrayMergePolicy::Replace),
            other => Err(format!(
                "unknown array merge policy '{other}', expected concat or replace"
            )),
        }
    }
}

/// Parses each fragment and deep-merges it into a copy of `document`, in order.
///
/// A fragment that is not valid JSON aborts with
/// [`TransformError::MalformedInjection`] before anything of it is merged.
pub fn inject(
    document: &Document,
    fragments: &[String],
    policy: ArrayMergePolicy,
) -> Result<Document> {
    let mut output = document.clone();
    for (index, fragment) in fragments.iter().enumerate() {
        let parsed: Value =
            serde_json::from_str(fragment).map_err(|source| TransformError::MalformedInjection {
                index,
                fragment: fragment.clone(),
                source,
            })?;
        tracing::debug!(index, "Merging injected fragment");
        deep_merge(&mut output, parsed, policy);
    }
    Ok(output)
}

/// Merges `patch` into `base`. Objects merge key by key, arrays follow
/// `policy`, anything else in `patch` overwrites `base`.
pub fn deep_merge(base: &mut Value, patch: Value, policy: ArrayMergePolicy) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value, policy),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(base_items), Value::Array(patch_items))
            if policy == ArrayMergePolicy::Concat =>
        {
            base_items.extend(patch_items);
        }
        (base, patch) => *base = patch,
    }
}
