use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::error::ApiError;

/// REST API version prefix, part of every request path.
pub const API_VERSION: &str = "2015-02-01";

/// Error codes the service uses for missing objects.
const NOT_FOUND_CODES: &[&str] = &["FileSystemNotFound", "PolicyNotFound", "BackupPolicyNotFound"];

/// EFS API client. Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    auth_header: String,
    retry: RetryConfig,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

/// Error body shape: {"ErrorCode": "...", "Message": "..."}
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "ErrorCode", default)]
    error_code: Option<String>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

impl Client {
    /// Create a new API client with default retry configuration.
    pub fn new(endpoint: &str, api_token: &str, insecure: bool) -> Result<Self, ApiError> {
        Self::with_config(endpoint, api_token, insecure, RetryConfig::default())
    }

    /// Create a new API client with custom retry configuration.
    pub fn with_config(
        endpoint: &str,
        api_token: &str,
        insecure: bool,
        retry: RetryConfig,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure)
            .timeout(Duration::from_secs(retry.timeout_seconds))
            .user_agent(format!(
                "terraform-provider-{}/{}",
                names::EFS,
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: endpoint.trim_end_matches('/').to_string(),
                auth_header: format!("Bearer {}", api_token),
                retry,
            }),
        })
    }

    /// Execute a GET request and parse the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .request_with_retry(
                || async {
                    let url = format!("{}{}", self.inner.base_url, path);
                    tracing::debug!("GET request to: {}", url);

                    self.inner
                        .http
                        .get(&url)
                        .header(AUTHORIZATION, &self.inner.auth_header)
                        .send()
                        .await
                },
                path,
            )
            .await?;

        self.parse_json(response).await
    }

    /// Execute a POST request and parse the JSON response.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .request_with_retry(
                || async {
                    let url = format!("{}{}", self.inner.base_url, path);
                    tracing::debug!("POST request to: {}", url);

                    self.inner
                        .http
                        .post(&url)
                        .header(AUTHORIZATION, &self.inner.auth_header)
                        .json(body)
                        .send()
                        .await
                },
                path,
            )
            .await?;

        self.parse_json(response).await
    }

    /// Execute a PUT request and parse the JSON response.
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .request_with_retry(
                || async {
                    let url = format!("{}{}", self.inner.base_url, path);
                    tracing::debug!("PUT request to: {}", url);

                    self.inner
                        .http
                        .put(&url)
                        .header(AUTHORIZATION, &self.inner.auth_header)
                        .json(body)
                        .send()
                        .await
                },
                path,
            )
            .await?;

        self.parse_json(response).await
    }

    /// Execute a DELETE request, discarding the (usually empty) body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request_with_retry(
            || async {
                let url = format!("{}{}", self.inner.base_url, path);
                tracing::debug!("DELETE request to: {}", url);

                self.inner
                    .http
                    .delete(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .send()
                    .await
            },
            path,
        )
        .await
        .map(|_| ())
    }

    /// Execute a request with exponential backoff.
    ///
    /// 429 and 5xx responses are retried; 401 and classified API errors are
    /// terminal. Returns the successful response for the caller to parse.
    async fn request_with_retry<F, Fut>(
        &self,
        request_fn: F,
        path: &str,
    ) -> Result<reqwest::Response, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.inner.retry.max_retries {
            if attempt > 0 {
                let backoff = std::cmp::min(
                    self.inner.retry.initial_backoff_ms * (2_u64.pow(attempt - 1)),
                    self.inner.retry.max_backoff_ms,
                );
                tracing::debug!(
                    "Retrying request to {} after {}ms (attempt {})",
                    path,
                    backoff,
                    attempt
                );
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response);
                    }

                    if status == reqwest::StatusCode::UNAUTHORIZED {
                        return Err(ApiError::Auth);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ApiError::RateLimited);
                    } else if status.is_server_error() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(self.classify_error(response).await);
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(ApiError::Timeout(self.inner.retry.timeout_seconds));
                    } else if e.is_connect() || e.is_request() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(ApiError::Request(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }

    async fn parse_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::Parse(format!("Failed to parse response: {}", e))
        })
    }

    /// Classify a non-success, non-retryable response.
    ///
    /// HTTP 404, or an error body whose ErrorCode names a missing object,
    /// becomes the distinguished `NotFound` error.
    async fn classify_error(&self, response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let (code, message) = match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(body) => (
                body.error_code.unwrap_or_default(),
                body.message.unwrap_or_else(|| text.clone()),
            ),
            Err(_) => (String::new(), text),
        };

        if status == 404 || NOT_FOUND_CODES.contains(&code.as_str()) {
            ApiError::NotFound { code, message }
        } else {
            ApiError::Api {
                status,
                code,
                message,
            }
        }
    }
}
