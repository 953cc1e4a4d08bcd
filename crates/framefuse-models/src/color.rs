//! RGB color parsing and formatting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);
    /// Neon blue, the historical default border color.
    pub const NEON_BLUE: Rgb = Rgb::new(0x00, 0xBF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format as an ffmpeg color argument (`0xRRGGBB`).
    pub fn to_ffmpeg(&self) -> String {
        format!("0x{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Resolve a color name, falling back to a default for unknown input.
    pub fn from_request(name: &str, fallback: Rgb) -> Self {
        name.parse().unwrap_or(fallback)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(hex) = s.strip_prefix('#').or_else(|| s.strip_prefix("0x")) {
            if hex.len() == 6 {
                let r = u8::from_str_radix(&hex[0..2], 16);
                let g = u8::from_str_radix(&hex[2..4], 16);
                let b = u8::from_str_radix(&hex[4..6], 16);
                if let (Ok(r), Ok(g), Ok(b)) = (r, g, b) {
                    return Ok(Rgb::new(r, g, b));
                }
            }
            return Err(ColorParseError(s.to_string()));
        }

        match s.to_lowercase().as_str() {
            "white" => Ok(Rgb::WHITE),
            "black" => Ok(Rgb::BLACK),
            "red" => Ok(Rgb::new(0xFF, 0x00, 0x00)),
            "green" => Ok(Rgb::new(0x00, 0xFF, 0x00)),
            "blue" => Ok(Rgb::new(0x00, 0x00, 0xFF)),
            "yellow" => Ok(Rgb::new(0xFF, 0xFF, 0x00)),
            "cyan" => Ok(Rgb::new(0x00, 0xFF, 0xFF)),
            "magenta" => Ok(Rgb::new(0xFF, 0x00, 0xFF)),
            "orange" => Ok(Rgb::new(0xFF, 0xA5, 0x00)),
            _ => Err(ColorParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown color: {0}")]
pub struct ColorParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parse() {
        assert_eq!("#00BFFF".parse::<Rgb>().unwrap(), Rgb::NEON_BLUE);
        assert_eq!("0x00bfff".parse::<Rgb>().unwrap(), Rgb::NEON_BLUE);
        assert!("#00BF".parse::<Rgb>().is_err());
        assert!("#GGGGGG".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_named_parse() {
        assert_eq!("white".parse::<Rgb>().unwrap(), Rgb::WHITE);
        assert_eq!("White".parse::<Rgb>().unwrap(), Rgb::WHITE);
        assert!("chartreuse".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_ffmpeg_format() {
        assert_eq!(Rgb::NEON_BLUE.to_ffmpeg(), "0x00BFFF");
        assert_eq!(Rgb::BLACK.to_ffmpeg(), "0x000000");
    }

    #[test]
    fn test_from_request_fallback() {
        assert_eq!(Rgb::from_request("nope", Rgb::NEON_BLUE), Rgb::NEON_BLUE);
        assert_eq!(Rgb::from_request("red", Rgb::NEON_BLUE), Rgb::new(0xFF, 0, 0));
    }
}
