// src/services/backend_client.rs
// DOCUMENTATION: Backend API forwarding client
// PURPOSE: Send gateway requests to the backend and normalize replies to JSON

use crate::config::Config;
use crate::errors::GatewayError;
use reqwest::{header, Client, Method, Url};
use serde_json::{json, Value};

/// A request to relay to the backend
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    /// Decoded path segments, e.g. ["users", "octocat", "repos"]
    pub segments: Vec<String>,
    /// Raw (still encoded) query string without the leading '?'
    pub query: Option<String>,
    pub body: Option<Vec<u8>>,
    pub content_type: Option<String>,
}

impl ForwardRequest {
    pub fn get(segments: Vec<String>) -> Self {
        Self {
            method: Method::GET,
            segments,
            query: None,
            body: None,
            content_type: None,
        }
    }
}

/// Backend reply with the body already normalized to JSON
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    pub status: u16,
    /// None only for bodiless statuses (204, 304)
    pub body: Option<Value>,
}

impl BackendResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Backend API client
/// DOCUMENTATION: Injects the service bearer token; caller credentials never leave the gateway
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Option<String>,
    api_token: Option<String>,
}

impl BackendClient {
    pub fn new(client: Client, base_url: Option<String>, api_token: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_token,
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(
            client,
            config.backend_api_url.clone(),
            config.backend_api_token.clone(),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Build the backend URL for a set of path segments
    /// Segments are percent-encoded; dot segments are rejected
    pub fn build_url(&self, segments: &[String], query: Option<&str>) -> Result<Url, GatewayError> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            GatewayError::BackendUnavailable("backend API URL is not configured".to_string())
        })?;

        if let Some(bad) = segments.iter().find(|s| *s == "." || *s == "..") {
            return Err(GatewayError::InvalidInput(format!(
                "Invalid path segment: {}",
                bad
            )));
        }

        let mut url = Url::parse(base).map_err(|e| {
            GatewayError::BackendUnavailable(format!("invalid backend API URL: {}", e))
        })?;

        {
            let mut path = url.path_segments_mut().map_err(|_| {
                GatewayError::BackendUnavailable("backend API URL cannot be a base".to_string())
            })?;
            path.pop_if_empty();
            path.extend(segments.iter().filter(|s| !s.is_empty()));
        }

        url.set_query(query.filter(|q| !q.is_empty()));
        Ok(url)
    }

    /// Relay a request to the backend
    ///
    /// DOCUMENTATION: Upstream statuses are preserved; only transport failures
    /// (connect, timeout, unreadable body) become `BackendUnavailable`
    pub async fn forward(&self, request: ForwardRequest) -> Result<BackendResponse, GatewayError> {
        let url = self.build_url(&request.segments, request.query.as_deref())?;

        log::debug!("Forwarding {} {}", request.method, url.path());

        let mut builder = self
            .client
            .request(request.method.clone(), url.clone())
            .header(header::ACCEPT, "application/json");

        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        if let Some(content_type) = &request.content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type.as_str());
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            log::error!("Backend request {} {} failed: {}", request.method, url.path(), e);
            GatewayError::BackendUnavailable(format!("request failed: {}", e))
        })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| {
            log::error!("Failed to read backend response body: {}", e);
            GatewayError::BackendUnavailable(format!("unreadable response: {}", e))
        })?;

        if status >= 500 {
            log::warn!("Backend answered {} for {} {}", status, request.method, url.path());
        }

        Ok(BackendResponse {
            status,
            body: Self::normalize_body(status, &bytes),
        })
    }

    /// GET a backend resource
    pub async fn get(&self, segments: Vec<String>) -> Result<BackendResponse, GatewayError> {
        self.forward(ForwardRequest::get(segments)).await
    }

    /// Turn any upstream body into JSON
    ///
    /// DOCUMENTATION:
    /// - valid JSON passes through
    /// - empty bodies become `{}` (no body at all for 204/304)
    /// - other text is wrapped as `{"error": ..}` for error statuses, `{"data": ..}` otherwise
    pub fn normalize_body(status: u16, bytes: &[u8]) -> Option<Value> {
        if status == 204 || status == 304 {
            return None;
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Some(json!({}));
        }

        if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
            return Some(value);
        }

        let text = String::from_utf8_lossy(bytes).trim().to_string();
        if status >= 400 {
            Some(json!({ "error": text }))
        } else {
            Some(json!({ "data": text }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn segments(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_body() {
        assert_eq!(
            BackendClient::normalize_body(200, br#"{"ok":true}"#),
            Some(json!({ "ok": true }))
        );
        assert_eq!(BackendClient::normalize_body(200, b""), Some(json!({})));
        assert_eq!(BackendClient::normalize_body(204, b""), None);
        assert_eq!(
            BackendClient::normalize_body(502, b"Bad Gateway"),
            Some(json!({ "error": "Bad Gateway" }))
        );
        assert_eq!(
            BackendClient::normalize_body(200, b"pong\n"),
            Some(json!({ "data": "pong" }))
        );
    }

    #[test]
    fn test_build_url_encodes_segments() {
        let backend = BackendClient::new(
            Client::new(),
            Some("http://backend.local/v1/".to_string()),
            None,
        );

        let url = backend
            .build_url(&segments(&["users", "octo cat", "repos"]), Some("page=2"))
            .unwrap();
        assert_eq!(url.as_str(), "http://backend.local/v1/users/octo%20cat/repos?page=2");

        assert!(matches!(
            backend.build_url(&segments(&["users", ".."]), None),
            Err(GatewayError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unconfigured_backend_is_unavailable() {
        let backend = BackendClient::new(Client::new(), None, None);
        assert!(!backend.is_configured());
        assert!(matches!(
            backend.build_url(&segments(&["gallery"]), None),
            Err(GatewayError::BackendUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_forward_injects_bearer_and_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/users/octocat/highlights")
                    .query_param("notify", "false")
                    .header("authorization", "Bearer backend-secret")
                    .header("content-type", "application/json")
                    .json_body(json!({ "repo": "hello-world" }));
                then.status(201).json_body(json!({ "saved": true }));
            })
            .await;

        let backend = BackendClient::new(
            Client::new(),
            Some(server.base_url()),
            Some("backend-secret".to_string()),
        );
        let response = backend
            .forward(ForwardRequest {
                method: Method::POST,
                segments: segments(&["users", "octocat", "highlights"]),
                query: Some("notify=false".to_string()),
                body: Some(br#"{"repo":"hello-world"}"#.to_vec()),
                content_type: Some("application/json".to_string()),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 201);
        assert_eq!(response.body, Some(json!({ "saved": true })));
    }

    #[tokio::test]
    async fn test_forward_preserves_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/users/ghost");
                then.status(404).body("no such user");
            })
            .await;

        let backend = BackendClient::new(Client::new(), Some(server.base_url()), None);
        let response = backend.get(segments(&["users", "ghost"])).await.unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
        assert_eq!(response.body, Some(json!({ "error": "no such user" })));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        // Port 9 (discard) is closed on test hosts
        let backend = BackendClient::new(
            Client::new(),
            Some("http://127.0.0.1:9".to_string()),
            None,
        );
        let result = backend.get(segments(&["gallery"])).await;

        assert!(matches!(result, Err(GatewayError::BackendUnavailable(_))));
    }
}
