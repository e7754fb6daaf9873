use serde::Deserialize;

use crate::error::PayloadError;

/// Which layer a connectivity notification comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Link/IP level (Wi-Fi associated, address acquired).
    Network,
    /// Service level (cloud or price API reachable).
    Cloud,
}

/// Discrete connectivity notification from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Connected(Layer),
    Disconnected(Layer),
}

impl ConnectivityEvent {
    pub fn layer(self) -> Layer {
        match self {
            Self::Connected(l) | Self::Disconnected(l) => l,
        }
    }

    pub fn is_connect(self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

/// The part of the upstream JSON we care about. Other fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PriceReading {
    /// Euros per kWh including tax. May be negative.
    #[serde(rename = "PriceWithTax")]
    pub price_with_tax: f64,
}

impl PriceReading {
    pub fn parse(body: &str) -> Result<Self, PayloadError> {
        serde_json::from_str(body).map_err(PayloadError::Malformed)
    }
}
