use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// 8-bit-per-channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Device-native color: each channel 0..=100. Serializes as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NativeRgb(pub [u8; 3]);

impl NativeRgb {
    pub const MAX: u8 = 100;
}

/// Case-sensitive named colors accepted in configuration.
const NAMED_COLORS: &[(&str, Rgb8)] = &[
    ("black", Rgb8::new(0x00, 0x00, 0x00)),
    ("white", Rgb8::new(0xFF, 0xFF, 0xFF)),
    ("red", Rgb8::new(0xFF, 0x00, 0x00)),
    ("lime", Rgb8::new(0x00, 0xFF, 0x00)),
    ("green", Rgb8::new(0x00, 0x80, 0x00)),
    ("blue", Rgb8::new(0x00, 0x00, 0xFF)),
    ("yellow", Rgb8::new(0xFF, 0xFF, 0x00)),
    ("cyan", Rgb8::new(0x00, 0xFF, 0xFF)),
    ("aqua", Rgb8::new(0x00, 0xFF, 0xFF)),
    ("magenta", Rgb8::new(0xFF, 0x00, 0xFF)),
    ("fuchsia", Rgb8::new(0xFF, 0x00, 0xFF)),
    ("orange", Rgb8::new(0xFF, 0xA5, 0x00)),
    ("purple", Rgb8::new(0x80, 0x00, 0x80)),
    ("pink", Rgb8::new(0xFF, 0xC0, 0xCB)),
    ("silver", Rgb8::new(0xC0, 0xC0, 0xC0)),
    ("gray", Rgb8::new(0x80, 0x80, 0x80)),
    ("grey", Rgb8::new(0x80, 0x80, 0x80)),
    ("maroon", Rgb8::new(0x80, 0x00, 0x00)),
    ("olive", Rgb8::new(0x80, 0x80, 0x00)),
    ("navy", Rgb8::new(0x00, 0x00, 0x80)),
    ("teal", Rgb8::new(0x00, 0x80, 0x80)),
];

const HEX_MARKER: u8 = b'#';

/// Resolve a named color or `#RRGGBB` token.
pub fn resolve(token: &str) -> Result<Rgb8, ColorError> {
    if let Some(&(_, rgb)) = NAMED_COLORS.iter().find(|(name, _)| *name == token) {
        return Ok(rgb);
    }

    let bytes = token.as_bytes();
    if bytes.len() != 7 || bytes[0] != HEX_MARKER {
        return Err(ColorError::UnknownColor(token.to_owned()));
    }

    let channel = |i: usize| -> Result<u8, ColorError> {
        Ok(nibble(token, bytes[i])? << 4 | nibble(token, bytes[i + 1])?)
    };
    Ok(Rgb8::new(channel(1)?, channel(3)?, channel(5)?))
}

fn nibble(token: &str, byte: u8) -> Result<u8, ColorError> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => Err(ColorError::InvalidHexDigit {
            token: token.to_owned(),
            // A non-ASCII byte lands here too; report the first offending char.
            digit: token
                .chars()
                .skip(1)
                .find(|c| !c.is_ascii_hexdigit())
                .unwrap_or(byte as char),
        }),
    }
}

/// Scale 0..=255 channels to the device's 0..=100, rounding to nearest.
pub fn to_native_scale(rgb: Rgb8) -> NativeRgb {
    NativeRgb([scale(rgb.r), scale(rgb.g), scale(rgb.b)])
}

fn scale(c: u8) -> u8 {
    // 255 is odd, so c * 100 / 255 never lands exactly on .5.
    ((u32::from(c) * u32::from(NativeRgb::MAX) + 127) / 255) as u8
}

/// Resolve and scale in one step.
pub fn native(token: &str) -> Result<NativeRgb, ColorError> {
    resolve(token).map(to_native_scale)
}
