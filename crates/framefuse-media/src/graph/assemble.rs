//! Graph assembly: one configurable path from a composition request to a
//! validated filter graph.
//!
//! Pure and deterministic: no I/O, no clock. The animated border's time
//! dependence is evaluated by the renderer, not here. Disabled features
//! produce no stages at all rather than passthrough nodes, which is what
//! keeps every intermediate label consumed.

use framefuse_models::{
    BlendMode, CompositionRequest, CompositionError, Layout, Rgb,
};

use crate::geometry::{
    anchor_position_px, make_even, resolve_canvas, text_position_expr,
};
use crate::graph::stage::{FadeDirection, Stage, StreamLabel};
use crate::graph::{FilterGraph, GraphBuilder};

/// Declared input stream labels for one composition.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSet {
    pub background: StreamLabel,
    pub foreground: StreamLabel,
    pub third_layer: Option<StreamLabel>,
}

impl SourceSet {
    /// Background and foreground only, in renderer input order.
    pub fn primary() -> Self {
        Self {
            background: StreamLabel::new("0:v"),
            foreground: StreamLabel::new("1:v"),
            third_layer: None,
        }
    }

    /// Background, foreground, and a third decorative layer.
    pub fn with_third_layer() -> Self {
        Self {
            third_layer: Some(StreamLabel::new("2:v")),
            ..Self::primary()
        }
    }

    fn labels(&self) -> Vec<StreamLabel> {
        let mut labels = vec![self.background.clone(), self.foreground.clone()];
        if let Some(third) = &self.third_layer {
            labels.push(third.clone());
        }
        labels
    }
}

/// Build the filter graph for a validated request.
pub fn assemble(
    request: &CompositionRequest,
    sources: &SourceSet,
) -> Result<FilterGraph, CompositionError> {
    request.validate()?;
    let (canvas_w, canvas_h) = resolve_canvas(&request.format)?;

    let mut builder = GraphBuilder::new(sources.labels());

    let mut current = match request.layout {
        Layout::Overlay => primary_overlay(&mut builder, request, sources, canvas_w, canvas_h),
        Layout::SplitVertical => {
            primary_split(&mut builder, request, sources, canvas_w, canvas_h, Axis::Vertical)
        }
        Layout::SplitHorizontal => {
            primary_split(&mut builder, request, sources, canvas_w, canvas_h, Axis::Horizontal)
        }
        Layout::AvatarOnTop => primary_avatar(&mut builder, request, sources, canvas_w, canvas_h),
    };

    // The border grows the canvas; later stages see the padded dimensions.
    let mut current_w = canvas_w;
    let mut current_h = canvas_h;

    if let Some(border) = &request.border {
        if border.enabled {
            current_w += 2 * border.width_px;
            current_h += 2 * border.width_px;
            current = builder.add(
                vec![current],
                Stage::Pad {
                    w: current_w,
                    h: current_h,
                    x: border.width_px,
                    y: border.width_px,
                    color: border.color,
                },
                "bordered",
            );
            if border.animated {
                let glow = builder.add(
                    vec![],
                    Stage::GlowSource {
                        border_w: border.width_px,
                        w: current_w,
                        h: current_h,
                        color: border.color,
                        speed: border.animation_speed,
                    },
                    "glow",
                );
                current = builder.add(
                    vec![current, glow],
                    Stage::Blend {
                        mode: BlendMode::Lighten,
                    },
                    "glowing",
                );
            }
        }
    }

    if let Some(text) = &request.text {
        if !text.is_blank() {
            let (x, y) = text_position_expr(text.anchor);
            current = builder.add(
                vec![current],
                Stage::DrawText {
                    text: text.content.clone(),
                    size_px: text.size_px,
                    color: text.color,
                    x,
                    y,
                },
                "texted",
            );
        }
    }

    if let Some(third) = &request.third_layer {
        let source = sources.third_layer.clone().ok_or_else(|| {
            CompositionError::InvalidParameters(
                "third layer configured but no source stream declared".to_string(),
            )
        })?;

        // Frame mode covers the whole (possibly bordered) output; the
        // decorative mode keeps the configured square size. Blend modes
        // need matching dimensions, so they always use full coverage.
        let (layer_w, layer_h) = match third.size_px {
            Some(size) if third.blend == BlendMode::Over => (size, size),
            _ => (current_w, current_h),
        };
        let scaled = builder.add(
            vec![source],
            Stage::Scale {
                w: layer_w,
                h: layer_h,
            },
            "third",
        );

        current = if third.blend == BlendMode::Over {
            let (x, y) =
                anchor_position_px(third.anchor, layer_w, layer_h, current_w, current_h);
            let (x, y) = if third.size_px.is_none() {
                (0, 0)
            } else {
                (x, y)
            };
            builder.add(
                vec![current, scaled],
                Stage::Overlay {
                    x: x.to_string(),
                    y: y.to_string(),
                },
                "framed",
            )
        } else {
            builder.add(
                vec![current, scaled],
                Stage::Blend { mode: third.blend },
                "framed",
            )
        };
    }

    builder.finish(current)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Vertical,
    Horizontal,
}

/// Foreground cropped to leave a fade zone, padded back, faded out and
/// composited over the full-canvas background.
fn primary_overlay(
    builder: &mut GraphBuilder,
    request: &CompositionRequest,
    sources: &SourceSet,
    canvas_w: u32,
    canvas_h: u32,
) -> StreamLabel {
    let bg = builder.add(
        vec![sources.background.clone()],
        Stage::Scale {
            w: canvas_w,
            h: canvas_h,
        },
        "bg",
    );
    let mut fg = builder.add(
        vec![sources.foreground.clone()],
        Stage::Scale {
            w: canvas_w,
            h: canvas_h,
        },
        "fg",
    );

    if let Some(fade) = &request.fade {
        // validate() guarantees zone_px < canvas_h here.
        let crop_h = canvas_h - fade.zone_px;
        fg = builder.add(
            vec![fg],
            Stage::Crop {
                w: canvas_w,
                h: crop_h,
                x: 0,
                y: 0,
            },
            "fg_cropped",
        );
        fg = builder.add(
            vec![fg],
            Stage::Pad {
                w: canvas_w,
                h: canvas_h,
                x: 0,
                y: 0,
                color: Rgb::BLACK,
            },
            "fg_padded",
        );
        // A zero-length fade means the renderer's default fade, not "no
        // fade", so the stage is only emitted for positive durations.
        if fade.duration_secs > 0.0 {
            fg = builder.add(
                vec![fg],
                Stage::Fade {
                    direction: FadeDirection::Out,
                    start_secs: 0.0,
                    duration_secs: fade.duration_secs,
                },
                "fg_faded",
            );
        }
    }

    builder.add(
        vec![bg, fg],
        Stage::Overlay {
            x: "0".to_string(),
            y: "0".to_string(),
        },
        "vout",
    )
}

/// Two half-canvas layers with opposing fades at the seam, composited onto
/// a solid black canvas.
fn primary_split(
    builder: &mut GraphBuilder,
    request: &CompositionRequest,
    sources: &SourceSet,
    canvas_w: u32,
    canvas_h: u32,
    axis: Axis,
) -> StreamLabel {
    let (half_w, half_h) = match axis {
        Axis::Vertical => (canvas_w, make_even(canvas_h / 2)),
        Axis::Horizontal => (make_even(canvas_w / 2), canvas_h),
    };
    let zone = request.fade.map(|f| f.zone_px).unwrap_or(0);
    // Second half shifted back by half the fade zone so the seams overlap.
    let seam_offset = match axis {
        Axis::Vertical => half_h.saturating_sub(zone / 2),
        Axis::Horizontal => half_w.saturating_sub(zone / 2),
    };

    let canvas = builder.add(
        vec![],
        Stage::ColorSource {
            color: Rgb::BLACK,
            w: canvas_w,
            h: canvas_h,
        },
        "canvas",
    );

    let first = split_half(
        builder,
        request,
        sources.background.clone(),
        half_w,
        half_h,
        canvas_w,
        canvas_h,
        (0, 0),
        FadeDirection::Out,
        "first",
    );
    let offset = match axis {
        Axis::Vertical => (0, seam_offset),
        Axis::Horizontal => (seam_offset, 0),
    };
    let second = split_half(
        builder,
        request,
        sources.foreground.clone(),
        half_w,
        half_h,
        canvas_w,
        canvas_h,
        offset,
        FadeDirection::In,
        "second",
    );

    let composed = builder.add(
        vec![canvas, first],
        Stage::Overlay {
            x: "0".to_string(),
            y: "0".to_string(),
        },
        "base",
    );
    builder.add(
        vec![composed, second],
        Stage::Overlay {
            x: "0".to_string(),
            y: "0".to_string(),
        },
        "vout",
    )
}

#[allow(clippy::too_many_arguments)]
fn split_half(
    builder: &mut GraphBuilder,
    request: &CompositionRequest,
    source: StreamLabel,
    half_w: u32,
    half_h: u32,
    canvas_w: u32,
    canvas_h: u32,
    offset: (u32, u32),
    direction: FadeDirection,
    hint: &str,
) -> StreamLabel {
    let mut label = builder.add(
        vec![source],
        Stage::Scale {
            w: half_w,
            h: half_h,
        },
        hint,
    );
    if let Some(fade) = &request.fade {
        if fade.duration_secs > 0.0 {
            label = builder.add(
                vec![label],
                Stage::Fade {
                    direction,
                    start_secs: 0.0,
                    duration_secs: fade.duration_secs,
                },
                &format!("{hint}_faded"),
            );
        }
    }
    builder.add(
        vec![label],
        Stage::PadTransparent {
            w: canvas_w,
            h: canvas_h,
            x: offset.0,
            y: offset.1,
        },
        &format!("{hint}_padded"),
    )
}

/// Background full canvas, foreground shrunk to an anchored square avatar.
fn primary_avatar(
    builder: &mut GraphBuilder,
    request: &CompositionRequest,
    sources: &SourceSet,
    canvas_w: u32,
    canvas_h: u32,
) -> StreamLabel {
    let avatar_opts = request.avatar.unwrap_or_default();

    let bg = builder.add(
        vec![sources.background.clone()],
        Stage::Scale {
            w: canvas_w,
            h: canvas_h,
        },
        "bg",
    );
    let mut avatar = builder.add(
        vec![sources.foreground.clone()],
        Stage::Scale {
            w: avatar_opts.size_px,
            h: avatar_opts.size_px,
        },
        "avatar",
    );
    if avatar_opts.opacity < 1.0 {
        avatar = builder.add(
            vec![avatar],
            Stage::Opacity {
                alpha: avatar_opts.opacity,
            },
            "avatar_alpha",
        );
    }

    let (x, y) = anchor_position_px(
        avatar_opts.anchor,
        avatar_opts.size_px,
        avatar_opts.size_px,
        canvas_w,
        canvas_h,
    );
    builder.add(
        vec![bg, avatar],
        Stage::Overlay {
            x: x.to_string(),
            y: y.to_string(),
        },
        "vout",
    )
}
