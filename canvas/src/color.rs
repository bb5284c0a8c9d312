//! Hex color parsing for the software raster.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

use crate::consts::DEFAULT_COLOR;

/// RGBA channels, non-premultiplied.
pub type Rgba = [u8; 4];

/// Fully transparent pixel; what the eraser leaves behind.
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Fallback used if even [`DEFAULT_COLOR`] cannot be parsed.
const FALLBACK_RGBA: Rgba = [0x1a, 0x1a, 0x2e, 0xff];

/// Error returned by [`parse_hex_rgba`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("color must start with '#': {0:?}")]
    MissingHash(String),
    #[error("unsupported color length: {0:?}")]
    BadLength(String),
    #[error("invalid hex digit in color: {0:?}")]
    BadDigit(String),
}

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` into RGBA channels.
///
/// # Errors
///
/// Returns a [`ColorError`] describing why the value is not a hex color.
pub fn parse_hex_rgba(raw: &str) -> Result<Rgba, ColorError> {
    let trimmed = raw.trim();
    let Some(hex) = trimmed.strip_prefix('#') else {
        return Err(ColorError::MissingHash(raw.to_owned()));
    };
    // `from_str_radix` alone would accept a leading sign in each pair.
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorError::BadDigit(raw.to_owned()));
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| ColorError::BadDigit(raw.to_owned()));
    match hex.len() {
        3 => Ok([
            channel(&hex[0..1].repeat(2))?,
            channel(&hex[1..2].repeat(2))?,
            channel(&hex[2..3].repeat(2))?,
            0xff,
        ]),
        6 => Ok([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?, 0xff]),
        8 => Ok([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        ]),
        _ => Err(ColorError::BadLength(raw.to_owned())),
    }
}

/// Parse a color, substituting the default ink color when it is invalid.
#[must_use]
pub fn resolve_color(raw: &str) -> Rgba {
    match parse_hex_rgba(raw) {
        Ok(rgba) => rgba,
        Err(_) => match parse_hex_rgba(DEFAULT_COLOR) {
            Ok(rgba) => rgba,
            Err(_) => FALLBACK_RGBA,
        },
    }
}
