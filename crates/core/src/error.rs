//! Error taxonomy.
//!
//! Configuration and payload problems end the process; transport problems
//! ([`pricelight_fetch::FetchError`]) never do and have no conversion into
//! [`Fatal`]. Indicator write failures are logged and dropped.

/// A color token that cannot be turned into an RGB triplet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("unknown color {0:?}")]
    UnknownColor(String),
    #[error("invalid hex digit {digit:?} in {token:?}")]
    InvalidHexDigit { token: String, digit: char },
}

/// Invalid static configuration. Detected once at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("threshold table is empty")]
    EmptyTable,
    #[error("first price floor {floor} is above zero; negative prices would match nothing")]
    FirstFloorPositive { floor: f64 },
    #[error("entry {index}: price floor is not finite")]
    NonFiniteFloor { index: usize },
    #[error("entry {index}: price floor {floor} does not exceed previous floor {previous}")]
    NonMonotonicFloors {
        index: usize,
        previous: f64,
        floor: f64,
    },
    #[error("entry {index}: {field} {value} outside 0..=100")]
    BrightnessOutOfRange {
        index: usize,
        field: &'static str,
        value: i32,
    },
    #[error("entry {index}: {source}")]
    Color {
        index: usize,
        #[source]
        source: ColorError,
    },
    #[error("offline appearance: {0}")]
    Offline(Box<ConfigError>),
    #[error("offline appearance is identical to threshold entry {index}")]
    OfflineNotDistinct { index: usize },
    #[error("unknown {key} value {value:?}")]
    UnknownSetting { key: &'static str, value: String },
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Upstream payload that cannot be turned into an appearance.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("malformed price body: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("price {price} matched no threshold")]
    NoMatchingThreshold { price: f64 },
}

/// Failure reading or writing the device indicator configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndicatorError {
    #[error("indicator config unavailable: {0}")]
    Unavailable(String),
    #[error("indicator config rejected: {0}")]
    Rejected(String),
}

/// Unrecoverable condition. Once returned, the owning process must stop.
#[derive(Debug, thiserror::Error)]
pub enum Fatal {
    #[error("fatal configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("fatal payload error: {0}")]
    Payload(#[from] PayloadError),
}
