//! Named screen anchors for overlay placement.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named relative screen position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl Anchor {
    pub const ALL: &'static [Anchor] = &[
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
        Anchor::Center,
    ];

    /// Resolve an anchor name, defaulting to top-right for unknown names.
    ///
    /// Unknown anchors are never an error so a composition stays renderable.
    pub fn from_request(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::TopLeft => "top-left",
            Anchor::TopRight => "top-right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::BottomRight => "bottom-right",
            Anchor::Center => "center",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Anchor {
    type Err = AnchorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top-left" | "topleft" => Ok(Anchor::TopLeft),
            "top-right" | "topright" => Ok(Anchor::TopRight),
            "bottom-left" | "bottomleft" => Ok(Anchor::BottomLeft),
            "bottom-right" | "bottomright" => Ok(Anchor::BottomRight),
            "center" | "middle" => Ok(Anchor::Center),
            _ => Err(AnchorParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown anchor: {0}")]
pub struct AnchorParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_parse() {
        assert_eq!("bottom-right".parse::<Anchor>().unwrap(), Anchor::BottomRight);
        assert_eq!("bottomright".parse::<Anchor>().unwrap(), Anchor::BottomRight);
        assert_eq!("CENTER".parse::<Anchor>().unwrap(), Anchor::Center);
        assert!("somewhere".parse::<Anchor>().is_err());
    }

    #[test]
    fn test_unknown_defaults_to_top_right() {
        assert_eq!(Anchor::from_request("somewhere"), Anchor::TopRight);
        assert_eq!(Anchor::from_request(""), Anchor::TopRight);
    }
}
