//! Small helpers shared by the loaders, the pipeline and the CLI

use std::collections::BTreeMap;

use url::Url;

/// HTTP methods that can appear as operation keys in a path item
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Returns true when `key` names an operation inside a path item
pub fn is_http_method(key: &str) -> bool {
    HTTP_METHODS.contains(&key)
}

/// Parses `--header "Name: value"` flags into a header map.
///
/// Only the first `:` separates name from value, so values such as
/// `Authorization: Basic a:b` survive intact. Entries without a colon are
/// ignored.
///
/// # Examples
/// ```
/// use openapicmd::core::utils::parse_header_flag;
///
/// let headers = parse_header_flag(&["x-api-key: secret".to_string()]);
/// assert_eq!(headers.get("x-api-key").map(String::as_str), Some("secret"));
/// ```
pub fn parse_header_flag(headers: &[String]) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|header| header.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// Returns the parsed URL when `source` is an http(s) URL
pub fn remote_source_url(source: &str) -> Option<Url> {
    Url::parse(source)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Returns true when `source` should be fetched over HTTP
pub fn is_remote_source(source: &str) -> bool {
    remote_source_url(source).is_some()
}

/// Returns `scheme://host[:port]` of an http(s) URL
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}
