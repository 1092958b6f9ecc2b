//! HTTP client shared by registry sources
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Cache preference sent as a `Cache-Control` request header
//! - Exponential backoff retry for transport errors, rate limits and 5xx responses
//! - Status code mapping to `RegistryError`

use crate::error::RegistryError;
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("npm-outdated/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// Cache-Control value when cached metadata is acceptable
const CACHED_OK: &str = "max-age=300";

/// Cache-Control value when fresh metadata is required
const REVALIDATE: &str = "no-cache";

/// HTTP client wrapper with retry logic
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    prefer_online: bool,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| {
                RegistryError::network_error(
                    "",
                    "HTTP client",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
            prefer_online: true,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Ask caches to revalidate (`true`) or accept recent copies (`false`)
    pub fn with_prefer_online(mut self, prefer_online: bool) -> Self {
        self.prefer_online = prefer_online;
        self
    }

    fn cache_control(&self) -> &'static str {
        if self.prefer_online {
            REVALIDATE
        } else {
            CACHED_OK
        }
    }

    /// Perform a GET request with retry logic and error context
    pub async fn get_with_context(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<reqwest::Response, RegistryError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(package, attempt, delay_ms = delay, "retrying registry request");
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay *= 2;
            }

            let result = self
                .client
                .get(url)
                .header(CACHE_CONTROL, self.cache_control())
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e) if e.is_timeout() => {
                    last_error = Some(RegistryError::timeout(package, registry));
                    continue;
                }
                Err(e) => {
                    last_error = Some(RegistryError::network_error(
                        package,
                        registry,
                        e.to_string(),
                    ));
                    continue;
                }
            };

            let status = response.status();
            match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    last_error = Some(RegistryError::rate_limit_exceeded(registry));
                }
                StatusCode::NOT_FOUND => {
                    return Err(RegistryError::package_not_found(package, registry));
                }
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    return Err(RegistryError::forbidden(package, registry));
                }
                _ if status.is_server_error() => {
                    last_error = Some(RegistryError::network_error(
                        package,
                        registry,
                        format!("HTTP {}", status),
                    ));
                }
                _ if !status.is_success() => {
                    return Err(RegistryError::network_error(
                        package,
                        registry,
                        format!("HTTP {}", status),
                    ));
                }
                _ => return Ok(response),
            }
        }

        Err(last_error
            .unwrap_or_else(|| RegistryError::network_error(package, registry, "unknown error")))
    }

    /// Perform a GET request and parse the JSON response
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError> {
        let response = self.get_with_context(url, package, registry).await?;
        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                RegistryError::timeout(package, registry)
            } else {
                RegistryError::invalid_response(
                    package,
                    registry,
                    format!("failed to parse JSON: {}", e),
                )
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_http_client_builders() {
        let client = HttpClient::new()
            .unwrap()
            .with_max_retries(5)
            .with_prefer_online(false);
        assert_eq!(client.max_retries, 5);
        assert_eq!(client.cache_control(), CACHED_OK);
        assert_eq!(client.with_prefer_online(true).cache_control(), REVALIDATE);
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));
        assert!(DEFAULT_USER_AGENT.starts_with("npm-outdated/"));
        assert_eq!(MAX_RETRIES, 3);
        assert_eq!(BASE_DELAY_MS, 100);
    }

    #[tokio::test]
    async fn test_sends_cache_control() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/pkg")
            .match_header("cache-control", "max-age=300")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = HttpClient::new().unwrap().with_prefer_online(false);
        let url = format!("{}/pkg", server.url());
        let value: serde_json::Value = client.get_json(&url, "pkg", "npm").await.unwrap();

        mock.assert_async().await;
        assert!(value.is_object());
    }

    #[tokio::test]
    async fn test_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::new().unwrap();
        let url = format!("{}/missing", server.url());
        let err = client.get_with_context(&url, "missing", "npm").await.unwrap_err();
        assert!(matches!(err, RegistryError::PackageNotFound { .. }));
    }

    #[tokio::test]
    async fn test_forbidden() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/private")
            .with_status(403)
            .create_async()
            .await;

        let client = HttpClient::new().unwrap();
        let url = format!("{}/private", server.url());
        let err = client.get_with_context(&url, "private", "npm").await.unwrap_err();
        assert!(matches!(err, RegistryError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/flaky")
            .with_status(503)
            .expect(2)
            .create_async()
            .await;

        let client = HttpClient::new().unwrap().with_max_retries(1);
        let url = format!("{}/flaky", server.url());
        let err = client.get_with_context(&url, "flaky", "npm").await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, RegistryError::NetworkError { .. }));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/broken")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = HttpClient::new().unwrap();
        let url = format!("{}/broken", server.url());
        let err = client
            .get_json::<serde_json::Value>(&url, "broken", "npm")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidResponse { .. }));
    }
}
