//! Canvas format presets and resolution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::CompositionError;

/// Named output canvas presets plus an explicit custom resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanvasFormat {
    /// 16:9 landscape (1920x1080)
    Landscape,
    /// 9:16 vertical for Instagram Reels (1080x1920)
    Reels,
    /// 1:1 square (1080x1080)
    Square,
    /// 9:16 vertical story (1080x1920)
    Story,
    /// 16:9 YouTube (1920x1080)
    Youtube,
    /// 9:16 TikTok (1080x1920)
    Tiktok,
    /// Explicit pixel dimensions
    Custom { width: u32, height: u32 },
}

impl CanvasFormat {
    /// Resolve the format to pixel dimensions.
    pub fn resolve(&self) -> (u32, u32) {
        match self {
            CanvasFormat::Landscape | CanvasFormat::Youtube => (1920, 1080),
            CanvasFormat::Reels | CanvasFormat::Story | CanvasFormat::Tiktok => (1080, 1920),
            CanvasFormat::Square => (1080, 1080),
            CanvasFormat::Custom { width, height } => (*width, *height),
        }
    }

    /// Resolve a format from a request.
    ///
    /// A recognized preset name wins. An unrecognized or absent name falls
    /// back to explicit dimensions when both are positive. Neither a known
    /// name nor usable dimensions is an error.
    pub fn from_request(
        name: Option<&str>,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Self, CompositionError> {
        if let Some(name) = name {
            if let Ok(format) = name.parse::<CanvasFormat>() {
                return Ok(format);
            }
        }

        match (width, height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Ok(CanvasFormat::Custom {
                width: w,
                height: h,
            }),
            _ => Err(CompositionError::InvalidFormat(format!(
                "unknown format {:?} and no explicit positive dimensions",
                name.unwrap_or("")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CanvasFormat::Landscape => "landscape",
            CanvasFormat::Reels => "reels",
            CanvasFormat::Square => "square",
            CanvasFormat::Story => "story",
            CanvasFormat::Youtube => "youtube",
            CanvasFormat::Tiktok => "tiktok",
            CanvasFormat::Custom { .. } => "custom",
        }
    }
}

impl fmt::Display for CanvasFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.resolve();
        write!(f, "{}x{}", w, h)
    }
}

impl FromStr for CanvasFormat {
    type Err = FormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "landscape" => Ok(CanvasFormat::Landscape),
            "reels" => Ok(CanvasFormat::Reels),
            "square" => Ok(CanvasFormat::Square),
            "story" => Ok(CanvasFormat::Story),
            "youtube" => Ok(CanvasFormat::Youtube),
            "tiktok" => Ok(CanvasFormat::Tiktok),
            _ => Err(FormatParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown canvas format: {0}")]
pub struct FormatParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_resolution() {
        assert_eq!(CanvasFormat::Reels.resolve(), (1080, 1920));
        assert_eq!(CanvasFormat::Landscape.resolve(), (1920, 1080));
        assert_eq!(CanvasFormat::Square.resolve(), (1080, 1080));
        assert_eq!(CanvasFormat::Tiktok.resolve(), CanvasFormat::Story.resolve());
    }

    #[test]
    fn test_from_request_preset_wins() {
        let format = CanvasFormat::from_request(Some("reels"), Some(640), Some(480)).unwrap();
        assert_eq!(format, CanvasFormat::Reels);
    }

    #[test]
    fn test_from_request_explicit_fallback() {
        let format = CanvasFormat::from_request(Some("cinema"), Some(2560), Some(1440)).unwrap();
        assert_eq!(format.resolve(), (2560, 1440));
    }

    #[test]
    fn test_from_request_rejects_unusable() {
        assert!(CanvasFormat::from_request(Some("cinema"), None, None).is_err());
        assert!(CanvasFormat::from_request(Some("cinema"), Some(0), Some(1080)).is_err());
        assert!(CanvasFormat::from_request(None, None, Some(1080)).is_err());
    }

    #[test]
    fn test_serde_kebab_case() {
        assert_eq!(
            serde_json::to_string(&CanvasFormat::Reels).unwrap(),
            "\"reels\""
        );
        let custom: CanvasFormat =
            serde_json::from_str(r#"{"custom":{"width":2560,"height":1440}}"#).unwrap();
        assert_eq!(custom.resolve(), (2560, 1440));
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("REELS".parse::<CanvasFormat>().unwrap(), CanvasFormat::Reels);
        assert!("ultrawide".parse::<CanvasFormat>().is_err());
    }
}
