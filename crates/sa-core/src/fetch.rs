//! Remote script retrieval.

use std::time::{Duration, Instant};

use reqwest::Client;

use crate::error::FetchError;

/// Single-attempt HTTP GET with a fixed timeout.
pub struct Fetcher {
    http: Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, timeout })
    }

    /// Fetch `url` and return the body verbatim.
    ///
    /// Fails on any non-2xx status, on timeout, or on transport errors.
    /// Content type and size are not checked.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let started = Instant::now();
        tracing::info!(url = %url, "fetch_started");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::info!(url = %url, status = status.as_u16(), "fetch_rejected");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(url, e))?;

        tracing::info!(
            url = %url,
            status = status.as_u16(),
            bytes = body.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "fetch_finished"
        );

        Ok(body)
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }
}
