//! Device indicator capability.
//!
//! The device keeps an LED configuration with a mode and two color/brightness
//! pairs, one shown while the relay is on and one while it is off. Only the
//! `switch` mode follows those pairs, so nothing is written in other modes.

mod memory;

pub use memory::MemoryIndicator;

use serde::{Deserialize, Serialize};

use crate::appearance::{Appearance, NativeRgb};
use crate::error::IndicatorError;

/// LED behaviour selected on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedMode {
    /// Color follows relay state.
    Switch,
    /// Color follows power draw.
    Power,
    Off,
}

/// Color and brightness for one relay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedState {
    pub rgb: NativeRgb,
    pub brightness: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub mode: LedMode,
    pub on: LedState,
    pub off: LedState,
}

impl IndicatorConfig {
    /// Whether the device currently shows `appearance`.
    pub fn shows(&self, appearance: &Appearance) -> bool {
        self.on.rgb == appearance.native
            && self.off.rgb == appearance.native
            && self.on.brightness == appearance.on_brightness
            && self.off.brightness == appearance.off_brightness
    }
}

/// Read/write access to the device's LED configuration.
pub trait IndicatorStore: Send {
    fn get_config(&self) -> Result<IndicatorConfig, IndicatorError>;

    fn set_config(&mut self, config: IndicatorConfig) -> Result<(), IndicatorError>;
}

/// Result of one [`apply`] attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Device is not in `switch` mode; left untouched.
    Skipped(LedMode),
    Failed(IndicatorError),
}

/// Write `appearance` into the device if it is in `switch` mode.
/// Failures are logged and reported, never propagated.
pub fn apply(store: &mut dyn IndicatorStore, appearance: &Appearance) -> ApplyOutcome {
    let mut config = match store.get_config() {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "could not read indicator config");
            return ApplyOutcome::Failed(e);
        }
    };

    if config.mode != LedMode::Switch {
        tracing::warn!(mode = ?config.mode, "indicator not in switch mode, leaving it alone");
        return ApplyOutcome::Skipped(config.mode);
    }

    config.on = LedState {
        rgb: appearance.native,
        brightness: appearance.on_brightness,
    };
    config.off = LedState {
        rgb: appearance.native,
        brightness: appearance.off_brightness,
    };

    match store.set_config(config) {
        Ok(()) => {
            tracing::debug!(color = %appearance.color_token, rgb = ?appearance.native.0, "indicator updated");
            ApplyOutcome::Applied
        }
        Err(e) => {
            tracing::warn!(error = %e, color = %appearance.color_token, "indicator write rejected");
            ApplyOutcome::Failed(e)
        }
    }
}
