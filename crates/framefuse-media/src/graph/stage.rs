//! Filter stage descriptors.
//!
//! Each stage is a tagged variant with explicit parameter fields. The
//! textual filter syntax is produced only here, at the serialization
//! boundary, so user-supplied values are escaped exactly once and graph
//! text is never patched after the fact.

use std::fmt;

use framefuse_models::{BlendMode, Rgb};

use crate::border::glow_expressions;

/// Font used for burned-in text.
pub const TEXT_FONT_FILE: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";

/// An opaque name binding one stage's output to another's input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamLabel(String);

impl StreamLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Alpha fade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    In,
    Out,
}

impl FadeDirection {
    fn as_str(&self) -> &'static str {
        match self {
            FadeDirection::In => "in",
            FadeDirection::Out => "out",
        }
    }
}

/// One labeled processing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Scale to exact dimensions.
    Scale { w: u32, h: u32 },
    /// Keep a `w`x`h` window at `(x, y)`.
    Crop { w: u32, h: u32, x: u32, y: u32 },
    /// Grow to `w`x`h`, placing the input at `(x, y)` on a solid fill.
    Pad {
        w: u32,
        h: u32,
        x: u32,
        y: u32,
        color: Rgb,
    },
    /// Grow to `w`x`h` on a fully transparent fill, so a later overlay
    /// blends instead of covering.
    PadTransparent { w: u32, h: u32, x: u32, y: u32 },
    /// Alpha fade starting at `start_secs`.
    Fade {
        direction: FadeDirection,
        start_secs: f64,
        duration_secs: f64,
    },
    /// Uniform transparency via the alpha channel.
    Opacity { alpha: f32 },
    /// Composite the second input onto the first at a position expression.
    Overlay { x: String, y: String },
    /// Burn text at a position expression.
    DrawText {
        text: String,
        size_px: u32,
        color: Rgb,
        x: String,
        y: String,
    },
    /// Solid color source (no inputs).
    ColorSource { color: Rgb, w: u32, h: u32 },
    /// Procedural border glow source (no inputs).
    GlowSource {
        border_w: u32,
        w: u32,
        h: u32,
        color: Rgb,
        speed: f64,
    },
    /// Per-pixel blend of two equally sized inputs.
    Blend { mode: BlendMode },
}

impl Stage {
    /// Number of input streams the stage consumes.
    pub fn arity(&self) -> usize {
        match self {
            Stage::ColorSource { .. } | Stage::GlowSource { .. } => 0,
            Stage::Overlay { .. } | Stage::Blend { .. } => 2,
            _ => 1,
        }
    }

    /// Render the filter arguments (without stream labels).
    pub fn filter_args(&self) -> String {
        match self {
            Stage::Scale { w, h } => format!("scale={w}:{h}"),
            Stage::Crop { w, h, x, y } => format!("crop={w}:{h}:{x}:{y}"),
            Stage::Pad { w, h, x, y, color } => {
                format!("pad={w}:{h}:{x}:{y}:{}", color.to_ffmpeg())
            }
            Stage::PadTransparent { w, h, x, y } => {
                format!("format=yuva420p,pad={w}:{h}:{x}:{y}:black@0")
            }
            Stage::Fade {
                direction,
                start_secs,
                duration_secs,
            } => format!(
                "fade={}:st={}:d={}:alpha=1",
                direction.as_str(),
                fmt_secs(*start_secs),
                fmt_secs(*duration_secs)
            ),
            Stage::Opacity { alpha } => {
                format!("format=rgba,colorchannelmixer=aa={alpha:.2}")
            }
            Stage::Overlay { x, y } => format!("overlay={x}:{y}"),
            Stage::DrawText {
                text,
                size_px,
                color,
                x,
                y,
            } => format!(
                "drawtext=text='{}':fontfile={}:fontsize={}:fontcolor={}:x={}:y={}:shadowcolor=black:shadowx=2:shadowy=2",
                escape_text(text),
                TEXT_FONT_FILE,
                size_px,
                color.to_ffmpeg(),
                x,
                y
            ),
            Stage::ColorSource { color, w, h } => {
                format!("color=c={}:size={w}x{h}", color.to_ffmpeg())
            }
            Stage::GlowSource {
                border_w,
                w,
                h,
                color,
                speed,
            } => {
                let [r, g, b] = glow_expressions(*border_w, *w, *h, *color, *speed);
                format!("color=c=black:size={w}x{h},format=rgb24,geq=r='{r}':g='{g}':b='{b}'")
            }
            Stage::Blend { mode } => format!("blend=all_mode={}", blend_mode_name(*mode)),
        }
    }
}

fn blend_mode_name(mode: BlendMode) -> &'static str {
    match mode {
        BlendMode::Over => "normal",
        BlendMode::Lighten => "lighten",
        BlendMode::Screen => "screen",
    }
}

/// Trim trailing zeros so `0.50` serializes as `0.5` and `60.0` as `60`.
fn fmt_secs(secs: f64) -> String {
    let s = format!("{secs:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

/// Escape characters meaningful to the filter-graph syntax.
///
/// Applied to user-supplied text only at this boundary; stage fields hold
/// the raw value.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '\'' | ':' | '%' | ',' | ';' | '[' | ']' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_args() {
        let stage = Stage::Scale { w: 1080, h: 1920 };
        assert_eq!(stage.filter_args(), "scale=1080:1920");
    }

    #[test]
    fn test_fade_args_trim_zeros() {
        let stage = Stage::Fade {
            direction: FadeDirection::Out,
            start_secs: 0.0,
            duration_secs: 0.5,
        };
        assert_eq!(stage.filter_args(), "fade=out:st=0:d=0.5:alpha=1");
    }

    #[test]
    fn test_pad_includes_fill_color() {
        let stage = Stage::Pad {
            w: 1100,
            h: 1940,
            x: 10,
            y: 10,
            color: Rgb::NEON_BLUE,
        };
        assert_eq!(stage.filter_args(), "pad=1100:1940:10:10:0x00BFFF");
    }

    #[test]
    fn test_drawtext_escapes_user_text() {
        let stage = Stage::DrawText {
            text: "it's 50%: [a,b];c".to_string(),
            size_px: 30,
            color: Rgb::WHITE,
            x: "(w-text_w)/2".to_string(),
            y: "(h-text_h)/2".to_string(),
        };
        let args = stage.filter_args();
        assert!(args.contains("it\\'s 50\\%\\: \\[a\\,b\\]\\;c"));
        // The structural quotes and separators survive intact.
        assert!(args.starts_with("drawtext=text='"));
        assert!(args.contains(":fontsize=30:"));
    }

    #[test]
    fn test_glow_source_embeds_expressions() {
        let stage = Stage::GlowSource {
            border_w: 10,
            w: 1100,
            h: 1940,
            color: Rgb::NEON_BLUE,
            speed: 1.0,
        };
        let args = stage.filter_args();
        assert!(args.starts_with("color=c=black:size=1100x1940"));
        assert!(args.contains("geq=r='"));
        assert!(args.contains("sin("));
    }

    #[test]
    fn test_arity() {
        assert_eq!(Stage::ColorSource { color: Rgb::BLACK, w: 1, h: 1 }.arity(), 0);
        assert_eq!(Stage::Scale { w: 1, h: 1 }.arity(), 1);
        assert_eq!(
            Stage::Overlay {
                x: "0".to_string(),
                y: "0".to_string()
            }
            .arity(),
            2
        );
    }
}
