//! End-to-end tests for the price indicator pipeline.
//!
//! Config file → validated tables → scheduler → runtime loop → indicator,
//! with a scripted price source in place of the HTTP client.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use pricelight_core::appearance::color;
use pricelight_core::config::PricelightCfg;
use pricelight_core::connectivity::Link;
use pricelight_core::error::{ConfigError, Fatal, PayloadError};
use pricelight_core::indicator::{LedMode, MemoryIndicator};
use pricelight_core::runtime::{Runtime, Scheduler};
use pricelight_core::types::{ConnectivityEvent, Layer};
use pricelight_fetch::source::price_body;
use pricelight_fetch::{FetchError, FetchResponse, MockPriceSource};

const CONFIG: &str = r##"{
    "region": "EE",
    "price_base_url": "http://prices.local",
    "profile": "accelerated",
    "thresholds": [
        {"price_floor": -1.0, "color": "#0000FF", "on_brightness": 40, "off_brightness": 5},
        {"price_floor": 0.0, "color": "#00FF00", "on_brightness": 60, "off_brightness": 10},
        {"price_floor": 0.09, "color": "#FF0000", "on_brightness": 90, "off_brightness": 30}
    ],
    "offline": {"color": "#A300FF", "on_brightness": 100, "off_brightness": 100}
}"##;

fn write_config(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn cfg_from(file: &tempfile::NamedTempFile) -> Result<PricelightCfg, ConfigError> {
    let vars: HashMap<String, String> = [(
        "PRICELIGHT_CONFIG".to_string(),
        file.path().display().to_string(),
    )]
    .into();
    PricelightCfg::from_lookup(|k| vars.get(k).cloned())
}

fn at(minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(18, minute, 0).unwrap()
}

/// Prices 0.05, -0.5 and 0.09 show B, A and C through the real config path.
#[test]
fn config_file_to_indicator() {
    // 1. Load and validate
    let file = write_config(CONFIG);
    let cfg = cfg_from(&file).unwrap();
    let led = MemoryIndicator::new();
    let mut scheduler = Scheduler::from_config(&cfg, led.clone()).unwrap();

    // 2. Boot shows the offline appearance
    assert_eq!(led.snapshot().on.rgb, color::native("#A300FF").unwrap());
    assert_eq!(led.snapshot().on.brightness, 100);

    // 3. Walk the price sequence
    let expected = [
        (0.05, "#00FF00", 60, 10),
        (-0.5, "#0000FF", 40, 5),
        (0.09, "#FF0000", 90, 30),
    ];
    for (i, (price, hex, on, off)) in expected.into_iter().enumerate() {
        let request = scheduler
            .on_connectivity_event(ConnectivityEvent::Connected(Layer::Cloud))
            .expect("connect issues a fetch");
        assert_eq!(request.url, "http://prices.local/JustNow?region=EE");
        assert_eq!(request.timeout, Duration::from_secs(2));

        scheduler
            .on_fetch_complete(Ok(FetchResponse::new(200, price_body(price))))
            .unwrap();

        let state = led.snapshot();
        assert_eq!(state.mode, LedMode::Switch);
        assert_eq!(state.on.rgb, color::native(hex).unwrap(), "step {i}");
        assert_eq!(state.on.brightness, on);
        assert_eq!(state.off.rgb, state.on.rgb);
        assert_eq!(state.off.brightness, off);
    }
    assert_eq!(scheduler.status().link, Link::Online);
}

/// Online → outage → recovery, driven purely through callbacks.
#[test]
fn outage_and_recovery() {
    let file = write_config(CONFIG);
    let cfg = cfg_from(&file).unwrap();
    let led = MemoryIndicator::new();
    let mut s = Scheduler::from_config(&cfg, led.clone()).unwrap();
    let offline = color::native("#A300FF").unwrap();
    let green = color::native("#00FF00").unwrap();

    s.on_tick(&at(3)).unwrap();
    s.on_fetch_complete(Ok(FetchResponse::new(200, price_body(0.02)))).unwrap();
    assert_eq!(led.snapshot().on.rgb, green);

    // A failed refresh while online leaves the price showing.
    s.on_tick(&at(15)).unwrap();
    s.on_fetch_complete(Err(FetchError::Timeout(Duration::from_secs(2))))
        .unwrap();
    assert_eq!(led.snapshot().on.rgb, green);
    assert!(s.on_tick(&at(16)).is_none());

    // Network drops.
    s.on_connectivity_event(ConnectivityEvent::Disconnected(Layer::Network));
    assert_eq!(led.snapshot().on.rgb, offline);

    // Offline polls every tick and keeps failing.
    for m in 17..20 {
        s.on_tick(&at(m)).unwrap();
        s.on_fetch_complete(Ok(FetchResponse::new(502, "bad gateway")))
            .unwrap();
        assert_eq!(led.snapshot().on.rgb, offline);
    }

    // First success restores the price appearance.
    s.on_tick(&at(20)).unwrap();
    s.on_fetch_complete(Ok(FetchResponse::new(200, price_body(0.01)))).unwrap();
    assert_eq!(led.snapshot().on.rgb, green);
    assert_eq!(s.status().failures, 4);
}

#[test]
fn invalid_table_in_file_is_rejected() {
    let file = write_config(
        r##"{"thresholds": [
            {"price_floor": 0.0, "color": "red", "on_brightness": 50, "off_brightness": 10},
            {"price_floor": 0.1, "color": "#12345G", "on_brightness": 50, "off_brightness": 10}
        ]}"##,
    );
    let cfg = cfg_from(&file).unwrap();
    let err = Scheduler::from_config(&cfg, MemoryIndicator::new()).err().unwrap();
    assert!(matches!(err, ConfigError::Color { index: 1, .. }), "{err}");
}

#[test]
fn offline_color_matching_a_threshold_is_rejected() {
    let file = write_config(
        r##"{"offline": {"color": "#FF0000", "on_brightness": 80, "off_brightness": 30}}"##,
    );
    let cfg = cfg_from(&file).unwrap();
    let err = Scheduler::from_config(&cfg, MemoryIndicator::new()).err().unwrap();
    assert!(matches!(err, ConfigError::OfflineNotDistinct { .. }), "{err}");
}

/// The async loop recovers from outages and stops on a fatal payload.
#[tokio::test]
async fn runtime_runs_until_fatal_payload() {
    let file = write_config(CONFIG);
    let cfg = cfg_from(&file).unwrap();
    let led = MemoryIndicator::new();
    let scheduler = Scheduler::from_config(&cfg, led.clone()).unwrap();

    let source = Arc::new(
        MockPriceSource::with_fallback(Ok(FetchResponse::new(200, "not json")))
            .push(Err(FetchError::Connect("no route".into())))
            .push(Ok(FetchResponse::new(200, price_body(0.5)))),
    );
    let (rt, _events, status) = Runtime::new(scheduler, source.clone(), Duration::from_millis(10));
    // Always on a boundary so every tick refreshes.
    let mut rt = rt.with_clock(|| at(45));

    let result = tokio::time::timeout(Duration::from_secs(5), rt.run())
        .await
        .expect("runtime stops on its own");
    assert!(matches!(
        result,
        Err(Fatal::Payload(PayloadError::Malformed(_)))
    ));

    // The good reading before the bad one made it to the LED.
    assert_eq!(led.snapshot().on.rgb, color::native("#FF0000").unwrap());
    let last = *status.borrow();
    assert!(last.halted);
    assert_eq!(last.last_price, Some(0.5));
    assert_eq!(source.calls(), 3);
}
