//! HTTP-based definition loader

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::DefinitionLoader;
use super::parser::{SourceFormat, parse_document};
use crate::core::error::{Result, TransformError};
use crate::core::utils::is_remote_source;
use crate::transform::Document;

/// Loads definitions from HTTP/HTTPS URLs
pub struct HttpDefinitionLoader {
    client: Client,
}

impl HttpDefinitionLoader {
    /// Build a loader that sends `headers` with every request
    pub fn new(headers: &BTreeMap<String, String>) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransformError::config(format!("Invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                TransformError::config(format!("Invalid value for header {name}: {e}"))
            })?;
            default_headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers(default_headers)
            .build()
            .map_err(|e| TransformError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DefinitionLoader for HttpDefinitionLoader {
    async fn load(&self, source: &str) -> Result<Document> {
        // Only handle HTTP(S) URLs
        if !is_remote_source(source) {
            return Err(TransformError::reference(
                source,
                "HttpDefinitionLoader only handles HTTP(S) URLs",
            ));
        }

        let response = self
            .client
            .get(source)
            .send()
            .await
            .map_err(|e| TransformError::reference(source, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransformError::ReferenceResolution {
                reference: source.to_string(),
                status: Some(status.as_u16()),
                message: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            });
        }

        // Get content type before consuming the response
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let content = response.text().await.map_err(|e| {
            TransformError::reference(source, format!("Failed to read response body: {e}"))
        })?;

        parse_document(
            source,
            &content,
            SourceFormat::from_content_type(&content_type, source),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn loader() -> HttpDefinitionLoader {
        HttpDefinitionLoader::new(&BTreeMap::new()).unwrap()
    }

    #[tokio::test]
    async fn test_http_loader_json() {
        let mock_server = MockServer::start().await;

        let spec_json = r#"{
            "openapi": "3.0.0",
            "info": {
                "title": "Test API",
                "version": "1.0.0"
            },
            "paths": {}
        }"#;

        Mock::given(method("GET"))
            .and(path("/openapi.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(spec_json)
                    .insert_header("content-type", "application/json"),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/openapi.json", mock_server.uri());
        let doc = loader().load(&url).await.unwrap();

        assert_eq!(doc["openapi"], "3.0.0");
        assert_eq!(doc["info"]["title"], "Test API");
    }

    #[tokio::test]
    async fn test_http_loader_yaml() {
        let mock_server = MockServer::start().await;

        let spec_yaml = r#"openapi: 3.0.0
info:
  title: Test API
  version: 1.0.0
paths: {}"#;

        Mock::given(method("GET"))
            .and(path("/openapi"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(spec_yaml)
                    .insert_header("content-type", "application/x-yaml"),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/openapi", mock_server.uri());
        let doc = loader().load(&url).await.unwrap();
        assert_eq!(doc["info"]["title"], "Test API");
    }

    #[tokio::test]
    async fn test_http_loader_sends_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/private.json"))
            .and(header("x-api-key", "secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"openapi":"3.0.0","info":{"title":"P","version":"1"},"paths":{}}"#),
            )
            .mount(&mock_server)
            .await;

        let mut headers = BTreeMap::new();
        headers.insert("x-api-key".to_string(), "secret".to_string());
        let loader = HttpDefinitionLoader::new(&headers).unwrap();

        let doc = loader
            .load(&format!("{}/private.json", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(doc["info"]["title"], "P");
    }

    #[tokio::test]
    async fn test_http_loader_404_carries_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/notfound"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let url = format!("{}/notfound", mock_server.uri());
        match loader().load(&url).await.unwrap_err() {
            TransformError::ReferenceResolution { status, .. } => {
                assert_eq!(status, Some(404));
            }
            other => panic!("Expected ReferenceResolution, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_loader_non_http_url() {
        let result = loader().load("file:///path/to/spec.yaml").await;
        match result.unwrap_err() {
            TransformError::ReferenceResolution { message, .. } => {
                assert!(message.contains("only handles HTTP"));
            }
            other => panic!("Expected ReferenceResolution, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_header_name_is_config_error() {
        let mut headers = BTreeMap::new();
        headers.insert("bad header".to_string(), "v".to_string());
        assert!(matches!(
            HttpDefinitionLoader::new(&headers),
            Err(TransformError::Config(_))
        ));
    }
}
