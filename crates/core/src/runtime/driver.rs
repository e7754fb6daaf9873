use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use pricelight_fetch::{FetchError, FetchRequest, FetchResponse, PriceSource};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::scheduler::{Scheduler, SchedulerStatus};
use super::shutdown::ShutdownGuard;
use crate::error::Fatal;
use crate::indicator::IndicatorStore;
use crate::types::ConnectivityEvent;

type Completion = Result<FetchResponse, FetchError>;
type Clock = Box<dyn Fn() -> NaiveTime + Send>;

/// Async shell around [`Scheduler`]: owns the timer, the connectivity
/// channel and the fetch completion channel, and feeds them through the
/// scheduler one at a time.
pub struct Runtime<I: IndicatorStore> {
    scheduler: Scheduler<I>,
    source: Arc<dyn PriceSource>,
    shutdown: ShutdownGuard,
    tick_interval: Duration,
    clock: Clock,
    event_rx: mpsc::Receiver<ConnectivityEvent>,
    done_tx: mpsc::Sender<Completion>,
    done_rx: mpsc::Receiver<Completion>,
    status_tx: watch::Sender<SchedulerStatus>,
}

impl<I: IndicatorStore> Runtime<I> {
    /// Returns the runtime, the sender connectivity sources push into, and a
    /// watch on the scheduler status.
    pub fn new(
        scheduler: Scheduler<I>,
        source: Arc<dyn PriceSource>,
        tick_interval: Duration,
    ) -> (
        Self,
        mpsc::Sender<ConnectivityEvent>,
        watch::Receiver<SchedulerStatus>,
    ) {
        let (event_tx, event_rx) = mpsc::channel(32);
        // One fetch in flight at most, so one slot is enough.
        let (done_tx, done_rx) = mpsc::channel(1);
        let (status_tx, status_rx) = watch::channel(scheduler.status());
        let runtime = Self {
            scheduler,
            source,
            shutdown: ShutdownGuard::new(),
            tick_interval,
            clock: Box::new(|| chrono::Local::now().time()),
            event_rx,
            done_tx,
            done_rx,
            status_tx,
        };
        (runtime, event_tx, status_rx)
    }

    /// Replace the wall clock used for the quarter-hour gate.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveTime + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn token(&self) -> CancellationToken {
        self.shutdown.token()
    }

    pub fn listen_for_signals(&self) {
        self.shutdown.spawn_signal_listener();
    }

    pub fn scheduler(&self) -> &Scheduler<I> {
        &self.scheduler
    }

    /// Run until cancelled (`Ok`) or until the scheduler hits a fatal error.
    /// The first tick fires immediately.
    pub async fn run(&mut self) -> Result<(), Fatal> {
        let token = self.shutdown.token();
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            source = self.source.name(),
            tick_ms = self.tick_interval.as_millis() as u64,
            "pricelight runtime started"
        );

        let result = loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("shutdown signal received, exiting loop");
                    break Ok(());
                }
                _ = ticker.tick() => {
                    let now = (self.clock)();
                    if let Some(request) = self.scheduler.on_tick(&now) {
                        self.dispatch(request);
                    }
                }
                Some(event) = self.event_rx.recv() => {
                    if let Some(request) = self.scheduler.on_connectivity_event(event) {
                        self.dispatch(request);
                    }
                }
                Some(done) = self.done_rx.recv() => {
                    if let Err(e) = self.scheduler.on_fetch_complete(done) {
                        break Err(e);
                    }
                }
            }
            self.publish();
        };

        self.publish();
        let status = self.scheduler.status();
        tracing::info!(
            fetches = status.fetches_issued,
            failures = status.failures,
            "pricelight runtime stopped"
        );
        result
    }

    fn dispatch(&self, request: FetchRequest) {
        let source = Arc::clone(&self.source);
        let done = self.done_tx.clone();
        tokio::spawn(async move {
            let limit = request.timeout;
            let result = match tokio::time::timeout(limit, source.fetch(request)).await {
                Ok(r) => r,
                Err(_) => Err(FetchError::Timeout(limit)),
            };
            // Receiver gone means the runtime has stopped.
            let _ = done.send(result).await;
        });
    }

    fn publish(&self) {
        self.status_tx.send_replace(self.scheduler.status());
    }
}
