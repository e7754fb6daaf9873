use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use pricelight_fetch::PriceEndpoint;
use pricelight_fetch::http::{DEFAULT_BASE_URL, DEFAULT_REGION};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// All pricelight parameters. Read once at startup, immutable afterwards.
/// Missing keys fall back to [`Default`]; environment variables override the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricelightCfg {
    // price source
    pub region: String,
    pub price_base_url: String,

    // timing
    pub profile: TimingProfile,

    // error policy
    pub payload_policy: PayloadPolicy,

    // appearance
    pub thresholds: Vec<ThresholdEntry>,
    pub offline: OfflineEntry,
}

/// Raw threshold row as written in configuration. Validated into
/// [`crate::appearance::AppearanceSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub price_floor: f64,
    pub color: String,
    pub on_brightness: i32,
    pub off_brightness: i32,
}

impl ThresholdEntry {
    pub fn new(price_floor: f64, color: impl Into<String>, on_brightness: i32, off_brightness: i32) -> Self {
        Self {
            price_floor,
            color: color.into(),
            on_brightness,
            off_brightness,
        }
    }
}

/// Appearance forced while connectivity is lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineEntry {
    pub color: String,
    pub on_brightness: i32,
    pub off_brightness: i32,
}

impl Default for OfflineEntry {
    fn default() -> Self {
        Self {
            color: "#A300FF".into(),
            on_brightness: 100,
            off_brightness: 100,
        }
    }
}

/// Tick, timeout and probe cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingProfile {
    #[default]
    Production,
    /// Short timers for bench testing against a local server.
    Accelerated,
}

impl TimingProfile {
    pub fn tick_interval(self) -> Duration {
        match self {
            Self::Production => Duration::from_secs(60),
            Self::Accelerated => Duration::from_secs(5),
        }
    }

    pub fn fetch_timeout(self) -> Duration {
        match self {
            Self::Production => Duration::from_secs(10),
            Self::Accelerated => Duration::from_secs(2),
        }
    }

    pub fn probe_interval(self) -> Duration {
        match self {
            Self::Production => Duration::from_secs(30),
            Self::Accelerated => Duration::from_secs(5),
        }
    }
}

impl FromStr for TimingProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Self::Production),
            "accelerated" => Ok(Self::Accelerated),
            other => Err(ConfigError::UnknownSetting {
                key: "profile",
                value: other.to_owned(),
            }),
        }
    }
}

/// What to do with a 2xx response whose body cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadPolicy {
    /// Stop the process.
    #[default]
    Fatal,
    /// Log and handle like a failed fetch.
    Offline,
}

impl FromStr for PayloadPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fatal" => Ok(Self::Fatal),
            "offline" => Ok(Self::Offline),
            other => Err(ConfigError::UnknownSetting {
                key: "payload_policy",
                value: other.to_owned(),
            }),
        }
    }
}

impl Default for PricelightCfg {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_owned(),
            price_base_url: DEFAULT_BASE_URL.to_owned(),
            profile: TimingProfile::Production,
            payload_policy: PayloadPolicy::Fatal,
            thresholds: vec![
                ThresholdEntry::new(-100.0, "cyan", 60, 20),
                ThresholdEntry::new(0.0, "lime", 60, 20),
                ThresholdEntry::new(0.05, "yellow", 60, 20),
                ThresholdEntry::new(0.10, "orange", 60, 20),
                ThresholdEntry::new(0.20, "red", 80, 30),
            ],
            offline: OfflineEntry::default(),
        }
    }
}

impl PricelightCfg {
    /// Parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// File named by `PRICELIGHT_CONFIG` (defaults if unset), then
    /// environment overrides.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = match lookup("PRICELIGHT_CONFIG") {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        cfg.apply_overrides(lookup)?;
        Ok(cfg)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        self.region = get_or(&lookup, "PRICELIGHT_REGION", self.region.clone());
        self.price_base_url = get_or(&lookup, "PRICELIGHT_PRICE_BASE_URL", self.price_base_url.clone());
        if let Some(v) = lookup("PRICELIGHT_PROFILE") {
            self.profile = v.parse()?;
        }
        if let Some(v) = lookup("PRICELIGHT_PAYLOAD_POLICY") {
            self.payload_policy = v.parse()?;
        }
        Ok(())
    }

    pub fn endpoint(&self) -> PriceEndpoint {
        PriceEndpoint::new(self.price_base_url.clone(), self.region.clone())
    }
}

fn get_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: String) -> String {
    lookup(key).filter(|v| !v.is_empty()).unwrap_or(default)
}
