use serde::{Deserialize, Serialize};
use std::fmt;

/// Command colour with f64 components in [0.0, 1.0] range.
///
/// Every colour input form (bytes, hex, HSL, HSV) is normalised to this
/// representation before it is stored in a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommandColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl CommandColor {
    /// Create a colour from normalized components (clamped to [0, 1]).
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Create a colour from 0..=255 byte components.
    pub fn from_rgb_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    /// Create a colour from a hex string (e.g., "#FF0000" or "F00").
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let hex = hex.trim().trim_start_matches('#');
        // byte-indexed slicing below needs single-byte chars
        if !hex.is_ascii() {
            return Err(ColorError::InvalidHex);
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| ColorError::InvalidHex);
        match hex.len() {
            6 => Ok(Self::from_rgb_bytes(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Self::from_rgb_bytes(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(ColorError::InvalidHex),
        }
    }

    /// Create a colour from hue (degrees), saturation and lightness in [0, 1].
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);
        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let m = l - chroma / 2.0;
        Self::from_chroma(hue, chroma, m)
    }

    /// Create a colour from hue (degrees), saturation and value in [0, 1].
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let s = saturation.clamp(0.0, 1.0);
        let v = value.clamp(0.0, 1.0);
        let chroma = v * s;
        Self::from_chroma(hue, chroma, v - chroma)
    }

    fn from_chroma(hue: f64, chroma: f64, m: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        Self::rgb(r + m, g + m, b + m)
    }

    /// Convert to 0..=255 byte components.
    pub fn to_rgb8(&self) -> [u8; 3] {
        [
            (self.r * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.g * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.b * 255.0).round().clamp(0.0, 255.0) as u8,
        ]
    }

    /// Linearly interpolate between two colours.
    pub fn lerp(&self, other: &CommandColor, t: f64) -> CommandColor {
        let t = t.clamp(0.0, 1.0);
        CommandColor {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    pub const BLACK: CommandColor = CommandColor {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: CommandColor = CommandColor {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };
}

impl Default for CommandColor {
    fn default() -> Self {
        CommandColor::WHITE
    }
}

impl fmt::Display for CommandColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_rgb8();
        write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ColorError {
    #[error("invalid hex color string")]
    InvalidHex,
}

impl From<ColorError> for crate::StoryError {
    fn from(err: ColorError) -> Self {
        crate::StoryError::InvalidArgument(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        let c = CommandColor::from_hex("#FF8800").unwrap();
        assert_eq!(c.to_rgb8(), [255, 136, 0]);
    }

    #[test]
    fn test_color_from_short_hex() {
        let c = CommandColor::from_hex("0F0").unwrap();
        assert_eq!(c.to_rgb8(), [0, 255, 0]);
    }

    #[test]
    fn test_color_from_hex_invalid() {
        assert!(CommandColor::from_hex("invalid").is_err());
        assert!(CommandColor::from_hex("#GG0000").is_err());
    }

    #[test]
    fn test_color_from_hex_non_ascii() {
        for input in ["é1", "a€bc", "#ff00é", "ÿÿÿ"] {
            assert!(CommandColor::from_hex(input).is_err(), "{input} was accepted");
        }
    }

    #[test]
    fn test_color_from_hsl_and_hsv_agree_on_primaries() {
        assert_eq!(CommandColor::from_hsl(0.0, 1.0, 0.5).to_rgb8(), [255, 0, 0]);
        assert_eq!(CommandColor::from_hsv(120.0, 1.0, 1.0).to_rgb8(), [0, 255, 0]);
        assert_eq!(CommandColor::from_hsv(240.0, 1.0, 1.0).to_rgb8(), [0, 0, 255]);
        assert_eq!(CommandColor::from_hsl(-120.0, 1.0, 0.5).to_rgb8(), [0, 0, 255]);
    }

    #[test]
    fn test_color_hsl_grey() {
        assert_eq!(CommandColor::from_hsl(200.0, 0.0, 0.5).to_rgb8(), [128, 128, 128]);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(format!("{}", CommandColor::WHITE), "#FFFFFF");
        assert_eq!(format!("{}", CommandColor::from_rgb_bytes(1, 2, 3)), "#010203");
    }
}
