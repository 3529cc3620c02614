//! Authenticated, retrying HTTP transport for the coverage API
//!
//! [`CoverageTransport`] owns one shard run's credential lifecycle:
//!
//! - the license token is acquired before the first call and re-acquired
//!   proactively once it is older than `token_refresh_after_secs`
//! - 401/403 triggers exactly one refresh and one retry of the same request
//! - 429, 5xx, timeouts and connection failures back off exponentially with
//!   jitter, up to `retry.max_attempts` attempts
//! - any other 4xx is returned to the caller untouched, so the resolver can
//!   treat it as "this shape does not apply"

use super::auth::TokenState;
use super::models::{ApiEnvelope, ApiResponse};
use crate::config::{ApiConfig, RetryConfig};
use crate::domain::{CoverageApiError, HarvestError, ParameterShape, Result};
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// License-agreement endpoint; acknowledging it returns the bearer token
pub const LICENSE_PATH: &str = "/v1/metadata/license-agreement";

/// Request/response access to the coverage API
///
/// This is the seam the resolver, report listing and orchestrator depend on,
/// so they can be driven by in-memory fakes in tests.
#[async_trait]
pub trait CoverageApi: Send + Sync {
    /// Issue a GET against `path` (relative to the base URL) with `params`
    ///
    /// Returns `Ok` for 2xx and for non-retryable client errors; returns
    /// `Err` only once recovery (refresh, retries) is exhausted.
    async fn get(&self, path: &str, params: &ParameterShape) -> Result<ApiResponse>;

    /// Base URL of the API
    fn base_url(&self) -> &str;
}

/// Outcome of a single HTTP exchange, before any retry decision
enum Attempt {
    Response { status: u16, body: ApiEnvelope },
    Timeout(String),
    Connection(String),
}

/// Coverage API transport backed by `reqwest`
pub struct CoverageTransport {
    /// Base URL without a trailing slash
    base_url: String,

    /// HTTP client for making requests
    client: Client,

    /// License token state (one per transport, never process-wide)
    token_state: Arc<Mutex<TokenState>>,

    /// API configuration
    config: ApiConfig,
}

impl CoverageTransport {
    /// Create a new transport from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use covharvest::adapters::coverage::CoverageTransport;
    /// use covharvest::config::ApiConfig;
    ///
    /// # fn example() -> covharvest::domain::Result<()> {
    /// let transport = CoverageTransport::new(ApiConfig::default())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| HarvestError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            token_state: Arc::new(Mutex::new(TokenState::default())),
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Acknowledge the license agreement and install the returned token
    ///
    /// Returns whether a token was provided. A tokenless acknowledgement is
    /// not an error; its time is still recorded so the proactive refresh
    /// doesn't fire before every call.
    pub async fn acknowledge_license(&self) -> Result<bool> {
        let url = self.url(LICENSE_PATH);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CoverageApiError::Timeout(format!("License agreement request timed out: {e}"))
                } else {
                    CoverageApiError::ConnectionFailed(format!(
                        "Failed to request license agreement: {e}"
                    ))
                }
            })?;

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let envelope = ApiEnvelope::from_body(&text);

        if !(200..300).contains(&status) {
            return Err(CoverageApiError::LicenseUnavailable(format!(
                "status {status}: {}",
                envelope.server_message().unwrap_or_default()
            ))
            .into());
        }

        let token = envelope
            .data
            .first()
            .and_then(|row| row.get("Token"))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let mut state = self.token_state.lock().await;
        state.install(token, Utc::now());

        match state.masked() {
            Some(masked) => {
                tracing::info!(token = %masked, "License token acquired");
                Ok(true)
            }
            None => {
                tracing::info!("License agreement acknowledged (no token provided)");
                Ok(false)
            }
        }
    }

    /// Refresh the token when absent or older than the refresh threshold
    ///
    /// A failed refresh is logged and the caller proceeds without it.
    async fn ensure_fresh_token(&self) {
        let (stale, acquired_at) = {
            let state = self.token_state.lock().await;
            (
                state.is_stale_at(Utc::now(), self.config.token_refresh_after_secs),
                state.acquired_at(),
            )
        };

        if stale {
            tracing::debug!(acquired_at = ?acquired_at, "Refreshing license token");
            if let Err(e) = self.acknowledge_license().await {
                tracing::warn!(error = %e, "License refresh failed, proceeding without token");
            }
        }
    }

    /// `Authorization` header value, when a token is held
    async fn auth_header_value(&self) -> Option<String> {
        self.token_state.lock().await.bearer()
    }

    /// True once a license token has been installed
    pub async fn has_token(&self) -> bool {
        self.token_state.lock().await.has_token()
    }

    async fn send_once(&self, url: &str, params: &ParameterShape) -> Attempt {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .query(params.pairs());

        if let Some(auth) = self.auth_header_value().await {
            request = request.header("Authorization", auth);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Attempt::Timeout(e.to_string()),
            Err(e) => return Attempt::Connection(e.to_string()),
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(text) => Attempt::Response {
                status,
                body: ApiEnvelope::from_body(&text),
            },
            Err(e) if e.is_timeout() => Attempt::Timeout(e.to_string()),
            Err(e) => Attempt::Connection(e.to_string()),
        }
    }
}

/// True for statuses retried with backoff
fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// True for statuses answered with one token refresh
fn is_auth_status(status: u16) -> bool {
    status == 401 || status == 403
}

/// Backoff delay before the retry that follows the `failures`-th failure
///
/// `initial_delay_ms * multiplier^(failures - 1)`, capped at `max_delay_ms`;
/// with jitter the delay is drawn uniformly from `[delay / 2, delay]`.
pub(crate) fn backoff_delay_ms(retry: &RetryConfig, failures: usize) -> u64 {
    let exponent = failures.saturating_sub(1) as i32;
    let raw = retry.initial_delay_ms as f64 * retry.backoff_multiplier.powi(exponent);
    let delay = raw.min(retry.max_delay_ms as f64) as u64;

    if retry.jitter && delay > 1 {
        rand::thread_rng().gen_range(delay / 2..=delay)
    } else {
        delay
    }
}

#[async_trait]
impl CoverageApi for CoverageTransport {
    async fn get(&self, path: &str, params: &ParameterShape) -> Result<ApiResponse> {
        let url = self.url(path);
        let max_attempts = self.config.retry.max_attempts.max(1);

        self.ensure_fresh_token().await;

        let mut auth_retried = false;
        let mut failures = 0usize;

        loop {
            let (last_status, message) = match self.send_once(&url, params).await {
                Attempt::Response { status, body } if is_auth_status(status) => {
                    let message = body.server_message().unwrap_or_default();
                    if auth_retried {
                        tracing::debug!(
                            method = "GET",
                            path = %path,
                            param_keys = ?params.keys(),
                            status = status,
                            error = %message,
                            "Coverage API call rejected after token refresh"
                        );
                        return Err(CoverageApiError::authentication(status, message).into());
                    }

                    tracing::warn!(
                        path = %path,
                        status = status,
                        "Authorization rejected, refreshing license token and retrying once"
                    );
                    auth_retried = true;
                    if let Err(e) = self.acknowledge_license().await {
                        tracing::warn!(error = %e, "License refresh failed before auth retry");
                    }
                    continue;
                }
                Attempt::Response { status, body } if is_retryable_status(status) => {
                    (Some(status), body.server_message().unwrap_or_default())
                }
                Attempt::Response { status, body } => {
                    tracing::debug!(
                        method = "GET",
                        path = %path,
                        param_keys = ?params.keys(),
                        status = status,
                        rows = body.data.len(),
                        "Coverage API call"
                    );
                    return Ok(ApiResponse::new(status, body));
                }
                Attempt::Timeout(message) => (None, format!("timeout: {message}")),
                Attempt::Connection(message) => (None, format!("connection: {message}")),
            };

            failures += 1;
            if failures >= max_attempts {
                tracing::debug!(
                    method = "GET",
                    path = %path,
                    param_keys = ?params.keys(),
                    status = ?last_status,
                    error = %message,
                    "Coverage API call failed after retries"
                );
                return Err(CoverageApiError::transient(last_status, message).into());
            }

            let delay_ms = backoff_delay_ms(&self.config.retry, failures);
            crate::log_retry_attempt!(failures, max_attempts, delay_ms, message);
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
