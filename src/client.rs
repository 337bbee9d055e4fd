//! HTTP request executor for the portal.
//!
//! One wrapped reqwest client per run. The portal serves a broken TLS
//! certificate chain, so certificate verification is disabled on purpose —
//! see the README trade-off note. Transport failures and non-200 statuses
//! are recoverable by design: they come back as `None` so the pagination
//! driver can decide whether to abort or keep partial results.

use crate::artifacts;
use crate::query::SearchPayload;
use crate::session::SessionState;
use anyhow::{Context, Result};
use std::time::{Duration, Instant};

/// Well-known path of the search program on the portal.
pub const SEARCH_PATH: &str = "SEARCH.html";

/// Configuration for the executor, filled from the CLI surface.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout, applied uniformly per call. No automatic retry.
    pub timeout: Duration,
    /// User-agent header sent with every request.
    pub user_agent: String,
    /// Directory raw responses are persisted into. `None` disables the
    /// artifact log (used by tests).
    pub artifact_dir: Option<std::path::PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            artifact_dir: Some(std::path::PathBuf::from(artifacts::DEFAULT_LOG_DIR)),
        }
    }
}

/// HTTP executor for portal searches.
pub struct SearchClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl SearchClient {
    /// Build the executor.
    ///
    /// TLS certificate validation is disabled: the county host has shipped
    /// self-signed or expired certificates for years and the data is public.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client, config })
    }

    /// Resolve the endpoint to POST against.
    ///
    /// An explicit URL wins, gaining the search path if it is missing;
    /// otherwise the URL is synthesized from the domain.
    pub fn resolve_endpoint(domain: &str, url: Option<&str>) -> String {
        match url {
            Some(u) if u.contains(SEARCH_PATH) => u.to_string(),
            Some(u) if u.ends_with('/') => format!("{u}{SEARCH_PATH}"),
            Some(u) => format!("{u}/{SEARCH_PATH}"),
            None => format!("https://{domain}/{SEARCH_PATH}"),
        }
    }

    /// Execute one form-encoded POST carrying the session's cookie jar.
    ///
    /// Returns the raw body on a 200 response, `None` on any transport
    /// failure (non-200, timeout, connection error, DNS). Failures are
    /// logged, never raised. Successful bodies are persisted verbatim to a
    /// timestamped artifact for offline inspection.
    pub async fn execute(
        &self,
        session: &SessionState,
        payload: &SearchPayload,
        endpoint: &str,
    ) -> Option<String> {
        tracing::debug!(endpoint, ?payload, "sending search request");
        tracing::debug!(cookies = %session.cookie_header(), "request cookies");

        let started = Instant::now();
        let response = self
            .client
            .post(endpoint)
            .header(reqwest::header::COOKIE, session.cookie_header())
            .form(payload)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, endpoint, "request failed");
                return None;
            }
        };

        let status = response.status();
        tracing::info!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );

        if status != reqwest::StatusCode::OK {
            tracing::error!(status = status.as_u16(), "unexpected status code");
            return None;
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(error = %e, "failed to read response body");
                return None;
            }
        };

        if let Some(dir) = &self.config.artifact_dir {
            match artifacts::persist_response(dir, &body) {
                Ok(path) => tracing::info!(path = %path.display(), "raw response saved"),
                Err(e) => tracing::warn!(error = %e, "could not persist raw response"),
            }
        }

        Some(body)
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
