pub mod color;
pub mod threshold;

pub use color::{NativeRgb, Rgb8};
pub use threshold::{AppearanceSpec, ThresholdTable};

use crate::config::OfflineEntry;
use crate::error::ConfigError;

/// What the indicator shows: one color, separate brightness for relay on/off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appearance {
    /// Token as written in configuration, kept for logs.
    pub color_token: String,
    /// Resolved once at validation time.
    pub native: NativeRgb,
    pub on_brightness: u8,
    pub off_brightness: u8,
}

impl Appearance {
    /// Validate brightness and color for entry `index`.
    pub(crate) fn build(
        index: usize,
        color_token: &str,
        on_brightness: i32,
        off_brightness: i32,
    ) -> Result<Self, ConfigError> {
        let on = brightness(index, "on_brightness", on_brightness)?;
        let off = brightness(index, "off_brightness", off_brightness)?;
        let native = color::native(color_token).map_err(|source| ConfigError::Color { index, source })?;
        Ok(Self {
            color_token: color_token.to_owned(),
            native,
            on_brightness: on,
            off_brightness: off,
        })
    }

    /// Build the offline appearance and check it cannot be mistaken for a
    /// price appearance.
    pub fn offline(entry: &OfflineEntry, table: &ThresholdTable) -> Result<Self, ConfigError> {
        let appearance = Self::build(0, &entry.color, entry.on_brightness, entry.off_brightness)
            .map_err(|e| ConfigError::Offline(Box::new(e)))?;
        if let Some(index) = table
            .entries()
            .iter()
            .position(|spec| spec.appearance.looks_like(&appearance))
        {
            return Err(ConfigError::OfflineNotDistinct { index });
        }
        Ok(appearance)
    }

    /// Same on the device, ignoring how the color was spelled.
    pub fn looks_like(&self, other: &Appearance) -> bool {
        self.native == other.native
            && self.on_brightness == other.on_brightness
            && self.off_brightness == other.off_brightness
    }
}

fn brightness(index: usize, field: &'static str, value: i32) -> Result<u8, ConfigError> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= 100)
        .ok_or(ConfigError::BrightnessOutOfRange { index, field, value })
}
