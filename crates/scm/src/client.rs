//! GitHub REST API client.
//!
//! All network traffic flows through [`ResourceClient::request`] so the
//! reconciler and tests can swap the transport. Status classification happens
//! here, in one place; callers receive either a decoded success response or a
//! classified [`ScmError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ScmError;

/// Base URL for the GitHub REST API.
const GITHUB_API_URL: &str = "https://api.github.com";

/// Pinned GitHub API version.
const API_VERSION: &str = "2022-11-28";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A provider response with the body decoded to JSON.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded body; `Value::Null` for empty responses (e.g. 204).
    pub body: Value,
}

/// Transport seam for resource operations.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Issue a request against the provider API.
    ///
    /// Non-success statuses come back as classified errors, so callers can
    /// branch on [`ScmError::NotFound`] without inspecting status codes.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ScmError>;
}

/// GitHub REST API client with bearer authentication.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    /// Create a new client against the public GitHub API.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(token: impl Into<String>) -> Result<Self, ScmError> {
        Self::with_base_url(token, GITHUB_API_URL)
    }

    /// Create a client against a non-default base URL (GitHub Enterprise,
    /// test servers).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ScmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("reposmith/0.3"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        let base_url = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Handle an API response, classifying non-success statuses.
    async fn handle_response(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<ApiResponse, ScmError> {
        let status = response.status();
        let rate_limited = rate_limit_exhausted(&response);
        let text = response.text().await?;

        if status.is_success() {
            let body = if text.is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).map_err(|e| {
                    warn!(error = %e, body = %text, "Failed to parse response body");
                    ScmError::Decode(e)
                })?
            };
            return Ok(ApiResponse {
                status: status.as_u16(),
                body,
            });
        }

        Err(ScmError::from_status(
            status.as_u16(),
            rate_limited,
            path,
            error_message(&text),
        ))
    }
}

#[async_trait]
impl ResourceClient for GitHubClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, ScmError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "API request");

        let mut request = self
            .client
            .request(method, &url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token));

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(path, response).await
    }
}

/// True when the response advertises an exhausted rate limit.
fn rate_limit_exhausted(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        == Some(0)
}

/// Pull the `message` field out of a GitHub error body, falling back to the
/// raw text.
fn error_message(text: &str) -> String {
    #[derive(serde::Deserialize)]
    struct GitHubError {
        message: String,
    }

    serde_json::from_str::<GitHubError>(text)
        .map(|e| e.message)
        .unwrap_or_else(|_| text.to_string())
}
