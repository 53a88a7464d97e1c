//! Rate-limited HTTP retrieval with a fixed browser identity.
//!
//! One blocking-style request at a time; pacing between requests is the
//! caller's job via [`Pacer`]. There is deliberately no retry or backoff:
//! the crawl is bulk and best-effort, and callers treat every failure as
//! "skip this URL."

use std::time::Duration;

use repairkb_shared::{FetchConfig, RepairKbError, Result};

/// Desktop-browser identity sent with every request. The target site
/// serves a reduced page to unknown agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/114.0.0.0 Safari/537.36";

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// HTTP GET wrapper producing page text or a typed fetch failure.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Build a fetcher from runtime fetch settings.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| {
                RepairKbError::config(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client })
    }

    /// Fetch one URL. Non-2xx statuses and transport errors both map to
    /// [`RepairKbError::Fetch`]; callers skip and continue.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!(%url, "fetching");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RepairKbError::fetch(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepairKbError::fetch(url, format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| RepairKbError::fetch(url, format!("body read failed: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Pacer
// ---------------------------------------------------------------------------

/// Fixed request pacing: a short sleep after every request and a longer
/// rest after every Nth, to stay under the remote rate limit. The delays
/// are configuration, not constants; parallelizing them away would need
/// re-validating the target site's tolerance.
pub struct Pacer {
    interval: Duration,
    long_rest: Duration,
    long_every: u32,
    count: u32,
}

impl Pacer {
    /// Create a pacer. `long_every == 0` disables the longer rest.
    pub fn new(interval_ms: u64, long_every: u32, long_rest_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            long_rest: Duration::from_millis(long_rest_ms),
            long_every,
            count: 0,
        }
    }

    /// Sleep the appropriate amount after one request.
    pub async fn pause(&mut self) {
        self.count += 1;
        let delay = if self.long_every > 0 && self.count % self.long_every == 0 {
            self.long_rest
        } else {
            self.interval
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
