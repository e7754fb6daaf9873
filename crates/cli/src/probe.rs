use std::time::Duration;

use pricelight_core::types::{ConnectivityEvent, Layer};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Consecutive failed samples needed before a reachable link is reported down.
pub const DOWN_AFTER: u32 = 2;

/// Turns periodic reachability samples into connect/disconnect edges.
///
/// Going up is reported on the first good sample. Going down needs
/// [`DOWN_AFTER`] bad samples in a row, so one dropped connect does not
/// flash the offline appearance.
#[derive(Debug, Default)]
pub struct LinkProbe {
    last: Option<bool>,
    misses: u32,
}

impl LinkProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an event when reported reachability changed. The first sample
    /// always produces one.
    pub fn observe(&mut self, reachable: bool) -> Option<ConnectivityEvent> {
        if reachable {
            self.misses = 0;
        } else {
            self.misses = self.misses.saturating_add(1);
        }
        let report = match self.last {
            None => reachable,
            Some(true) if !reachable && self.misses < DOWN_AFTER => true,
            Some(_) => reachable,
        };
        if self.last == Some(report) {
            return None;
        }
        self.last = Some(report);
        Some(if report {
            ConnectivityEvent::Connected(Layer::Cloud)
        } else {
            ConnectivityEvent::Disconnected(Layer::Cloud)
        })
    }
}

/// TCP connect to `authority` (`host:port`) within `limit`.
pub async fn reachable(authority: &str, limit: Duration) -> bool {
    matches!(
        tokio::time::timeout(limit, TcpStream::connect(authority)).await,
        Ok(Ok(_))
    )
}

/// Probe `authority` every `every` and push edges into `events` until
/// cancelled or the receiver is gone.
pub fn spawn(
    authority: String,
    every: Duration,
    limit: Duration,
    events: mpsc::Sender<ConnectivityEvent>,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut probe = LinkProbe::new();
        let mut ticker = tokio::time::interval(every);
        tracing::info!(%authority, every_secs = every.as_secs(), "link probe started");
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    let up = reachable(&authority, limit).await;
                    let Some(event) = probe.observe(up) else { continue };
                    tracing::info!(%authority, ?event, "link probe edge");
                    if events.send(event).await.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("link probe stopped");
    })
}
