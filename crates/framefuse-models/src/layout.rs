//! Composition layout definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::CompositionError;

/// Strategy for combining the two primary video sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// Foreground cropped, padded and faded over a full-canvas background
    #[default]
    Overlay,
    /// Two halves stacked top/bottom with a fade seam
    SplitVertical,
    /// Two halves side by side with a fade seam
    SplitHorizontal,
    /// Background full canvas, foreground shrunk to an anchored avatar
    AvatarOnTop,
}

impl Layout {
    pub const ALL: &'static [Layout] = &[
        Layout::Overlay,
        Layout::SplitVertical,
        Layout::SplitHorizontal,
        Layout::AvatarOnTop,
    ];

    /// Resolve a layout name from a request.
    ///
    /// Lenient mode reproduces the historical behavior of falling back to
    /// `overlay` for unknown names; strict mode rejects them.
    pub fn from_request(name: &str, strict: bool) -> Result<Self, CompositionError> {
        match name.parse::<Layout>() {
            Ok(layout) => Ok(layout),
            Err(_) if !strict => Ok(Layout::Overlay),
            Err(_) => Err(CompositionError::UnsupportedLayout(name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Overlay => "overlay",
            Layout::SplitVertical => "split-vertical",
            Layout::SplitHorizontal => "split-horizontal",
            Layout::AvatarOnTop => "avatar-on-top",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Layout {
    type Err = LayoutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overlay" => Ok(Layout::Overlay),
            "split-vertical" => Ok(Layout::SplitVertical),
            "split-horizontal" => Ok(Layout::SplitHorizontal),
            "avatar-on-top" => Ok(Layout::AvatarOnTop),
            _ => Err(LayoutParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown layout: {0}")]
pub struct LayoutParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_parse() {
        assert_eq!("overlay".parse::<Layout>().unwrap(), Layout::Overlay);
        assert_eq!(
            "split-vertical".parse::<Layout>().unwrap(),
            Layout::SplitVertical
        );
        assert_eq!("AVATAR-ON-TOP".parse::<Layout>().unwrap(), Layout::AvatarOnTop);
        assert!("diagonal".parse::<Layout>().is_err());
    }

    #[test]
    fn test_lenient_fallback() {
        assert_eq!(Layout::from_request("diagonal", false).unwrap(), Layout::Overlay);
    }

    #[test]
    fn test_strict_rejects_unknown() {
        assert_eq!(
            Layout::from_request("diagonal", true),
            Err(CompositionError::UnsupportedLayout("diagonal".to_string()))
        );
    }
}
