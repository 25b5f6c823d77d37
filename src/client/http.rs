//! HTTP Client Facade
//!
//! Every API call goes through [`ApiClient`]: base URL resolution, default
//! JSON headers, the `Authorization` header and request/response logging.
//! Failures are normalized into [`ApiError`] before they reach the caller.
//! Requests are never retried.
//!
//! The bearer token is not stored here. The client asks its
//! [`CredentialProvider`] on every request, so the header always matches
//! whatever session the provider currently holds.

use crate::client::config::Config;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Source of the bearer token attached to outgoing requests
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Provider for anonymous clients
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// Uniform error shape for failed API calls
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status, absent when no response was received
    pub status: Option<u16>,
    pub url: String,
    /// Response body, parsed as JSON when possible
    pub body: Option<Value>,
    pub message: String,
}

impl ApiError {
    fn transport(url: &str, err: reqwest::Error) -> Self {
        Self {
            status: None,
            url: url.to_string(),
            body: None,
            message: format!("Network error: {}", err),
        }
    }

    fn invalid_body(url: &str, status: StatusCode, err: serde_json::Error) -> Self {
        Self {
            status: Some(status.as_u16()),
            url: url.to_string(),
            body: None,
            message: format!("Failed to parse response: {}", err),
        }
    }

    /// `message` field of the response body, if the server sent one
    pub fn server_message(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .filter(|message| !message.trim().is_empty())
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self.status, Some(400..=499))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self.status, Some(500..=599))
    }

    /// No response arrived (connection refused, DNS, timeout)
    pub fn is_transport(&self) -> bool {
        self.status.is_none()
    }
}

/// Configured request pipeline for the EduSync API
#[derive(Clone)]
pub struct ApiClient {
    config: Config,
    client: Client,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("server_url", &self.config.server_url())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: Config, credentials: Arc<dyn CredentialProvider>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::transport(config.server_url(), e))?;

        Ok(Self {
            config,
            client,
            credentials,
        })
    }

    /// Client that never sends an `Authorization` header
    pub fn anonymous(config: Config) -> Result<Self, ApiError> {
        Self::new(config, Arc::new(NoCredentials))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Value of the `Authorization` header the next request will carry
    pub fn authorization_header(&self) -> Option<String> {
        self.credentials
            .bearer_token()
            .map(|token| format!("Bearer {}", token))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None::<&()>).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let _: Value = self.request(Method::DELETE, path, None::<&()>).await?;
        Ok(())
    }

    fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            self.config.api_url(path)
        }
    }

    async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve(path);
        tracing::debug!("API Request: {} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(header) = self.authorization_header() {
            request = request.header(AUTHORIZATION, header);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            let err = ApiError::transport(&url, e);
            tracing::error!(url = %url, error = %err.message, "API request failed");
            err
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::transport(&url, e))?;

        if !status.is_success() {
            return Err(Self::normalize_failure(&url, status, &bytes));
        }

        tracing::debug!("API Response: {} {}", status.as_u16(), url);
        let payload: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        serde_json::from_slice(payload).map_err(|e| ApiError::invalid_body(&url, status, e))
    }

    fn normalize_failure(url: &str, status: StatusCode, bytes: &[u8]) -> ApiError {
        let body = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice::<Value>(bytes)
                .ok()
                .or_else(|| Some(Value::String(String::from_utf8_lossy(bytes).into_owned())))
        };

        if status == StatusCode::NOT_FOUND {
            tracing::error!("404 Error: Resource not found at {}", url);
        }
        tracing::error!(status = status.as_u16(), url = %url, body = ?body, "API error");

        ApiError {
            status: Some(status.as_u16()),
            url: url.to_string(),
            body,
            message: format!("Request failed with status code {}", status.as_u16()),
        }
    }
}
