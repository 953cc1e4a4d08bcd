//! Validated composition request configuration.

use serde::{Deserialize, Serialize};

use crate::anchor::Anchor;
use crate::canvas::CanvasFormat;
use crate::color::Rgb;
use crate::error::CompositionError;
use crate::layout::Layout;

/// Fade transition between the two primary layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeOptions {
    /// Height of the fade zone in pixels.
    pub zone_px: u32,
    /// Fade duration in seconds.
    pub duration_secs: f64,
}

impl Default for FadeOptions {
    fn default() -> Self {
        Self {
            zone_px: 100,
            duration_secs: 0.5,
        }
    }
}

/// Avatar placement for the avatar-on-top layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvatarOptions {
    /// Avatar edge length in pixels (square).
    pub size_px: u32,
    pub anchor: Anchor,
    /// Opacity in [0, 1].
    pub opacity: f32,
}

impl Default for AvatarOptions {
    fn default() -> Self {
        Self {
            size_px: 200,
            anchor: Anchor::BottomRight,
            opacity: 1.0,
        }
    }
}

/// Decorative border, optionally with an animated glow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderOptions {
    pub enabled: bool,
    pub color: Rgb,
    pub width_px: u32,
    /// Animate the border with a flowing glow.
    pub animated: bool,
    /// Oscillation speed multiplier for the glow.
    pub animation_speed: f64,
}

impl Default for BorderOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Rgb::NEON_BLUE,
            width_px: 10,
            animated: false,
            animation_speed: 1.0,
        }
    }
}

/// Burned-in text overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOptions {
    pub content: String,
    pub size_px: u32,
    pub color: Rgb,
    pub anchor: Anchor,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            content: String::new(),
            size_px: 30,
            color: Rgb::WHITE,
            anchor: Anchor::Center,
        }
    }
}

impl TextOptions {
    /// Whether the text stage should exist at all.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Kind of the optional third visual layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThirdLayerKind {
    /// A single frame repeated for the whole output duration.
    StaticImage,
    /// A video looped indefinitely and truncated to the duration cap.
    LoopingVideo,
}

/// Blend policy for the third layer composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Plain alpha composite.
    #[default]
    Over,
    Lighten,
    Screen,
}

/// Optional decorative frame or animation composited last.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThirdLayerOptions {
    pub kind: ThirdLayerKind,
    /// `None` means frame mode: scaled to cover the whole canvas.
    pub size_px: Option<u32>,
    pub anchor: Anchor,
    pub blend: BlendMode,
}

/// The full, validated configuration for one composition.
///
/// Constructed from HTTP input, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionRequest {
    pub format: CanvasFormat,
    pub layout: Layout,
    pub fade: Option<FadeOptions>,
    pub avatar: Option<AvatarOptions>,
    pub border: Option<BorderOptions>,
    pub text: Option<TextOptions>,
    pub third_layer: Option<ThirdLayerOptions>,
    /// Maximum output duration; the renderer truncates to this bound.
    pub duration_cap_secs: f64,
}

impl CompositionRequest {
    /// Check the parameter invariants that must hold before graph assembly.
    pub fn validate(&self) -> Result<(), CompositionError> {
        let (canvas_w, canvas_h) = self.format.resolve();
        if canvas_w == 0 || canvas_h == 0 {
            return Err(CompositionError::InvalidParameters(
                "canvas dimensions must be positive".to_string(),
            ));
        }

        if let Some(fade) = &self.fade {
            if fade.duration_secs < 0.0 {
                return Err(CompositionError::InvalidParameters(
                    "fade duration must be non-negative".to_string(),
                ));
            }
            if self.layout == Layout::Overlay && fade.zone_px >= canvas_h {
                return Err(CompositionError::InvalidParameters(format!(
                    "fade zone {} must be smaller than canvas height {}",
                    fade.zone_px, canvas_h
                )));
            }
        }

        if let Some(avatar) = &self.avatar {
            if avatar.size_px == 0 {
                return Err(CompositionError::InvalidParameters(
                    "avatar size must be positive".to_string(),
                ));
            }
            if !(0.0..=1.0).contains(&avatar.opacity) {
                return Err(CompositionError::InvalidParameters(format!(
                    "avatar opacity {} out of range [0, 1]",
                    avatar.opacity
                )));
            }
        }

        if let Some(text) = &self.text {
            if !text.is_blank() && text.size_px == 0 {
                return Err(CompositionError::InvalidParameters(
                    "text size must be positive".to_string(),
                ));
            }
        }

        if let Some(third) = &self.third_layer {
            if third.size_px == Some(0) {
                return Err(CompositionError::InvalidParameters(
                    "third layer size must be positive".to_string(),
                ));
            }
        }

        if self.duration_cap_secs <= 0.0 {
            return Err(CompositionError::InvalidParameters(
                "duration cap must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for CompositionRequest {
    fn default() -> Self {
        Self {
            format: CanvasFormat::Landscape,
            layout: Layout::Overlay,
            fade: Some(FadeOptions::default()),
            avatar: None,
            border: None,
            text: None,
            third_layer: None,
            duration_cap_secs: 60.0,
        }
    }
}
