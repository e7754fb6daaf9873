use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A single price fetch: where to ask and how long to wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub timeout: Duration,
}

/// Raw upstream reply. The body is not interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx only.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure. Always recoverable from the caller's point of view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("price source unavailable")]
    Unavailable,
}

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<FetchResponse, FetchError>> + Send + 'a>>;

/// Capability that performs one HTTP GET and hands back status + body.
/// Implementations must not retry on their own.
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    fn fetch(&self, request: FetchRequest) -> FetchFuture<'_>;
}

/// Scripted source for tests: replays queued results in order, then falls
/// back to a fixed result once the queue is drained.
#[derive(Debug)]
pub struct MockPriceSource {
    script: Mutex<VecDeque<Result<FetchResponse, FetchError>>>,
    fallback: Result<FetchResponse, FetchError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockPriceSource {
    /// Always answers 200 with the given price.
    pub fn with_price(price: f64) -> Self {
        Self::with_fallback(Ok(FetchResponse::new(200, price_body(price))))
    }

    /// Always fails with the given error.
    pub fn failing(error: FetchError) -> Self {
        Self::with_fallback(Err(error))
    }

    pub fn with_fallback(fallback: Result<FetchResponse, FetchError>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a one-shot result ahead of the fallback.
    pub fn push(self, result: Result<FetchResponse, FetchError>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(result);
        }
        self
    }

    /// Hold every reply for `delay` before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_result(&self) -> Result<FetchResponse, FetchError> {
        let queued = self.script.lock().ok().and_then(|mut s| s.pop_front());
        queued.unwrap_or_else(|| self.fallback.clone())
    }
}

impl PriceSource for MockPriceSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self, _request: FetchRequest) -> FetchFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self.next_result();
        let delay = self.delay;
        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            result
        })
    }
}

/// Minimal upstream body carrying only the price field.
pub fn price_body(price: f64) -> String {
    format!("{{\"PriceWithTax\":{price}}}")
}
