//! Canvas and anchor geometry resolution.

use framefuse_models::{Anchor, CanvasFormat, CompositionError};

/// Default margin between an anchored element and the canvas edge.
pub const ANCHOR_MARGIN: u32 = 20;

/// Resolve a canvas format to positive pixel dimensions.
pub fn resolve_canvas(format: &CanvasFormat) -> Result<(u32, u32), CompositionError> {
    let (w, h) = format.resolve();
    if w == 0 || h == 0 {
        return Err(CompositionError::InvalidFormat(format!(
            "canvas resolves to {}x{}",
            w, h
        )));
    }
    Ok((w, h))
}

/// Concrete anchored position for an element of known size.
///
/// Centers ignore the margin; edge anchors keep `ANCHOR_MARGIN` pixels of
/// clearance.
pub fn anchor_position_px(
    anchor: Anchor,
    elem_w: u32,
    elem_h: u32,
    canvas_w: u32,
    canvas_h: u32,
) -> (i64, i64) {
    let m = ANCHOR_MARGIN as i64;
    let (ew, eh) = (elem_w as i64, elem_h as i64);
    let (cw, ch) = (canvas_w as i64, canvas_h as i64);

    match anchor {
        Anchor::TopLeft => (m, m),
        Anchor::TopRight => (cw - ew - m, m),
        Anchor::BottomLeft => (m, ch - eh - m),
        Anchor::BottomRight => (cw - ew - m, ch - eh - m),
        Anchor::Center => ((cw - ew) / 2, (ch - eh) / 2),
    }
}

/// Symbolic overlay position relative to runtime sizes.
///
/// `W`/`H` are the base dimensions, `w`/`h` the overlaid element's, as the
/// renderer defines them for overlay expressions.
pub fn overlay_position_expr(anchor: Anchor) -> (String, String) {
    let m = ANCHOR_MARGIN;
    match anchor {
        Anchor::TopLeft => (m.to_string(), m.to_string()),
        Anchor::TopRight => (format!("W-w-{m}"), m.to_string()),
        Anchor::BottomLeft => (m.to_string(), format!("H-h-{m}")),
        Anchor::BottomRight => (format!("W-w-{m}"), format!("H-h-{m}")),
        Anchor::Center => ("(W-w)/2".to_string(), "(H-h)/2".to_string()),
    }
}

/// Symbolic text position; text extents are only known at render time.
pub fn text_position_expr(anchor: Anchor) -> (String, String) {
    let m = ANCHOR_MARGIN;
    match anchor {
        Anchor::TopLeft => (m.to_string(), m.to_string()),
        Anchor::TopRight => (format!("w-text_w-{m}"), m.to_string()),
        Anchor::BottomLeft => (m.to_string(), format!("h-text_h-{m}")),
        Anchor::BottomRight => (format!("w-text_w-{m}"), format!("h-text_h-{m}")),
        Anchor::Center => ("(w-text_w)/2".to_string(), "(h-text_h)/2".to_string()),
    }
}

/// Round down to the nearest even value; encoders reject odd dimensions.
pub fn make_even(value: u32) -> u32 {
    value & !1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_canvas_presets() {
        assert_eq!(resolve_canvas(&CanvasFormat::Reels).unwrap(), (1080, 1920));
        assert!(resolve_canvas(&CanvasFormat::Custom { width: 0, height: 1080 }).is_err());
    }

    #[test]
    fn test_bottom_right_avatar_position() {
        // 200px avatar on a 1920x1080 canvas with the 20px margin.
        let (x, y) = anchor_position_px(Anchor::BottomRight, 200, 200, 1920, 1080);
        assert_eq!((x, y), (1700, 860));
    }

    #[test]
    fn test_center_position() {
        let (x, y) = anchor_position_px(Anchor::Center, 200, 100, 1920, 1080);
        assert_eq!((x, y), (860, 490));
    }

    #[test]
    fn test_overlay_exprs() {
        let (x, y) = overlay_position_expr(Anchor::TopRight);
        assert_eq!(x, "W-w-20");
        assert_eq!(y, "20");

        let (x, y) = overlay_position_expr(Anchor::Center);
        assert_eq!(x, "(W-w)/2");
        assert_eq!(y, "(H-h)/2");
    }

    #[test]
    fn test_text_exprs_use_text_extents() {
        let (x, y) = text_position_expr(Anchor::Center);
        assert_eq!(x, "(w-text_w)/2");
        assert_eq!(y, "(h-text_h)/2");
    }

    #[test]
    fn test_make_even() {
        assert_eq!(make_even(961), 960);
        assert_eq!(make_even(960), 960);
    }
}
