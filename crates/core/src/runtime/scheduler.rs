use chrono::Timelike;
use pricelight_fetch::{FetchError, FetchRequest, FetchResponse};

use super::loop_control;
use crate::appearance::{Appearance, ThresholdTable};
use crate::config::{PayloadPolicy, PricelightCfg};
use crate::connectivity::{ConnectivityState, Link, Transition};
use crate::error::{ConfigError, Fatal};
use crate::indicator::{self, IndicatorStore};
use crate::types::{ConnectivityEvent, PriceReading};

/// Point-in-time view of the scheduler, for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerStatus {
    pub link: Link,
    pub in_flight: bool,
    pub last_price: Option<f64>,
    pub fetches_issued: u64,
    pub failures: u64,
    pub halted: bool,
}

/// Polling and connectivity state machine.
///
/// Every input is a plain method call that returns immediately: the caller
/// performs the returned [`FetchRequest`] and later feeds its result back
/// through [`Scheduler::on_fetch_complete`]. At most one fetch is ever
/// outstanding. After a [`Fatal`] error every method is a no-op.
pub struct Scheduler<I: IndicatorStore> {
    table: ThresholdTable,
    offline: Appearance,
    indicator: I,
    link: ConnectivityState,
    request: FetchRequest,
    payload_policy: PayloadPolicy,
    in_flight: bool,
    halted: bool,
    last_price: Option<f64>,
    fetches_issued: u64,
    failures: u64,
}

impl<I: IndicatorStore> Scheduler<I> {
    /// Build the scheduler and put the indicator into the offline appearance,
    /// which it keeps until the first successful fetch.
    pub fn new(
        table: ThresholdTable,
        offline: Appearance,
        request: FetchRequest,
        payload_policy: PayloadPolicy,
        indicator: I,
    ) -> Self {
        let mut scheduler = Self {
            table,
            offline,
            indicator,
            link: ConnectivityState::new(),
            request,
            payload_policy,
            in_flight: false,
            halted: false,
            last_price: None,
            fetches_issued: 0,
            failures: 0,
        };
        scheduler.show_offline();
        scheduler
    }

    /// Validate the appearance tables in `cfg` and build a scheduler for its
    /// endpoint and timing profile.
    pub fn from_config(cfg: &PricelightCfg, indicator: I) -> Result<Self, ConfigError> {
        let table = ThresholdTable::validate(&cfg.thresholds)?;
        let offline = Appearance::offline(&cfg.offline, &table)?;
        let request = FetchRequest {
            url: cfg.endpoint().url(),
            timeout: cfg.profile.fetch_timeout(),
        };
        tracing::info!(
            thresholds = table.len(),
            url = %request.url,
            profile = ?cfg.profile,
            "appearance tables validated"
        );
        Ok(Self::new(table, offline, request, cfg.payload_policy, indicator))
    }

    /// Timer callback. Returns the fetch to perform, if one is due.
    pub fn on_tick<T: Timelike>(&mut self, now: &T) -> Option<FetchRequest> {
        if self.halted {
            return None;
        }
        let decision = loop_control::decide(self.link.link(), now);
        if !decision.should_fetch() {
            tracing::trace!(minute = now.minute(), "not a refresh tick");
            return None;
        }
        self.issue(decision)
    }

    /// Connectivity callback. A connect bypasses the quarter-hour gate; a
    /// disconnect forces the offline appearance right away.
    pub fn on_connectivity_event(&mut self, event: ConnectivityEvent) -> Option<FetchRequest> {
        if self.halted {
            return None;
        }
        let layer = event.layer();
        if event.is_connect() {
            tracing::info!(?layer, "connectivity reported up, refreshing now");
            return self.issue("connect");
        }
        tracing::warn!(?layer, was = ?self.link.link(), "connectivity lost");
        let t = self.link.on_disconnect();
        self.react(t);
        None
    }

    /// Completion callback for the outstanding fetch.
    ///
    /// Transport failures and non-2xx statuses are absorbed here. Only a
    /// payload the table cannot handle comes back as `Err`, and from then on
    /// the scheduler is halted.
    pub fn on_fetch_complete(&mut self, result: Result<FetchResponse, FetchError>) -> Result<(), Fatal> {
        if self.halted {
            return Ok(());
        }
        self.in_flight = false;
        let _span = tracing::info_span!("fetch", n = self.fetches_issued).entered();

        let outcome = self.handle_completion(result);
        if let Err(e) = &outcome {
            tracing::error!(error = %e, "halting");
            self.halted = true;
        }
        outcome
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            link: self.link.link(),
            in_flight: self.in_flight,
            last_price: self.last_price,
            fetches_issued: self.fetches_issued,
            failures: self.failures,
            halted: self.halted,
        }
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    fn issue(&mut self, reason: impl std::fmt::Debug) -> Option<FetchRequest> {
        if self.in_flight {
            tracing::debug!(?reason, "fetch already in flight, not issuing another");
            return None;
        }
        self.in_flight = true;
        self.fetches_issued += 1;
        tracing::debug!(?reason, n = self.fetches_issued, url = %self.request.url, "issuing price fetch");
        Some(self.request.clone())
    }

    fn handle_completion(&mut self, result: Result<FetchResponse, FetchError>) -> Result<(), Fatal> {
        let response = match result {
            Ok(r) if r.is_success() => r,
            Ok(r) => {
                tracing::warn!(status = r.status, "price source answered with failure status");
                self.fetch_failed();
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(error = %e, "price fetch failed");
                self.fetch_failed();
                return Ok(());
            }
        };

        let reading = match PriceReading::parse(&response.body) {
            Ok(r) => r,
            Err(e) if self.payload_policy == PayloadPolicy::Offline => {
                tracing::warn!(error = %e, "unusable price body, counting as failed fetch");
                self.fetch_failed();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let price = reading.price_with_tax;
        let matched = self.table.resolve(price)?;
        if self.link.on_fetch_success() == Transition::WentOnline {
            tracing::info!(price, "price source reachable, leaving offline appearance");
        }
        tracing::info!(
            price,
            floor = matched.price_floor,
            color = %matched.appearance.color_token,
            "price appearance"
        );
        self.last_price = Some(price);
        indicator::apply(&mut self.indicator, &matched.appearance);
        Ok(())
    }

    fn fetch_failed(&mut self) {
        self.failures += 1;
        let t = self.link.on_fetch_failure();
        self.react(t);
    }

    fn react(&mut self, t: Transition) {
        if t.needs_offline_appearance() {
            self.show_offline();
        }
    }

    fn show_offline(&mut self) {
        tracing::info!(color = %self.offline.color_token, "showing offline appearance");
        indicator::apply(&mut self.indicator, &self.offline);
    }
}
