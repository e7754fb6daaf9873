//! HTTP price source.
//!
//! Talks to a spot-price API exposing a `JustNow` endpoint per bidding
//! region. The transport reports status and body verbatim; deciding what a
//! non-2xx status means is left to the caller.

use std::time::Duration;

use crate::source::{FetchError, FetchFuture, FetchRequest, FetchResponse, PriceSource};

pub const DEFAULT_BASE_URL: &str = "https://api.spot-hinta.fi";
pub const DEFAULT_REGION: &str = "FI";

/// Region selector resolved into the URL polled for the current price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceEndpoint {
    base_url: String,
    region: String,
}

impl PriceEndpoint {
    pub fn new(base_url: impl Into<String>, region: impl Into<String>) -> Self {
        let base: String = base_url.into();
        Self {
            base_url: base.trim_end_matches('/').to_owned(),
            region: region.into(),
        }
    }

    /// URL returning the price for the current settlement period.
    pub fn url(&self) -> String {
        format!("{}/JustNow?region={}", self.base_url, self.region)
    }

    /// `host:port` of the endpoint, for reachability checks.
    /// Returns `None` if the base URL does not parse or has no host.
    pub fn authority(&self) -> Option<String> {
        let url = reqwest::Url::parse(&self.base_url).ok()?;
        let host = url.host_str()?;
        let port = url.port_or_known_default()?;
        Some(format!("{host}:{port}"))
    }
}

impl Default for PriceEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_REGION)
    }
}

/// reqwest-backed [`PriceSource`].
pub struct HttpPriceSource {
    client: reqwest::Client,
}

impl HttpPriceSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let resp = self
            .client
            .get(&request.url)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| classify(e, request.timeout))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| classify(e, request.timeout))?;

        tracing::debug!(status, bytes = body.len(), url = %request.url, "price response received");
        Ok(FetchResponse { status, body })
    }
}

impl Default for HttpPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceSource for HttpPriceSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&self, request: FetchRequest) -> FetchFuture<'_> {
        Box::pin(self.get(request))
    }
}

fn classify(e: reqwest::Error, timeout: Duration) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(timeout)
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else {
        FetchError::RequestFailed(e.to_string())
    }
}
