//! Procedural animated border glow.
//!
//! The glow is a sinusoidal color field confined to the border band of the
//! padded canvas. It is expressed twice: as plain arithmetic
//! ([`glow_color`]) so it can be tested without a renderer, and as the
//! per-channel `geq` expressions the renderer evaluates per pixel. Both
//! forms compute the same function of `(x, y, t)`.

use std::f64::consts::TAU;

use framefuse_models::Rgb;

/// Spatial wavelength of the glow, in multiples of the border width.
const WAVE_SPREAD: f64 = 4.0;

/// Whether `(x, y)` lies inside the border band of a `w`x`h` canvas.
pub fn in_border_band(x: u32, y: u32, border_w: u32, w: u32, h: u32) -> bool {
    x < border_w || y < border_w || x >= w.saturating_sub(border_w) || y >= h.saturating_sub(border_w)
}

/// Oscillation factor in [0, 1] for a point at time `t`.
fn glow_factor(x: u32, y: u32, t: f64, border_w: u32, speed: f64) -> f64 {
    let spread = WAVE_SPREAD * border_w.max(1) as f64;
    0.5 + 0.5 * (TAU * speed * t + (x + y) as f64 / spread).sin()
}

/// Glow color at `(x, y)` and time `t`.
///
/// Returns black outside the border band so a lighten blend leaves the
/// interior untouched. Deterministic in all arguments.
pub fn glow_color(
    x: u32,
    y: u32,
    t: f64,
    border_w: u32,
    canvas_w: u32,
    canvas_h: u32,
    base: Rgb,
    speed: f64,
) -> Rgb {
    if !in_border_band(x, y, border_w, canvas_w, canvas_h) {
        return Rgb::BLACK;
    }
    let factor = glow_factor(x, y, t, border_w, speed);
    Rgb::new(
        (base.r as f64 * factor).round() as u8,
        (base.g as f64 * factor).round() as u8,
        (base.b as f64 * factor).round() as u8,
    )
}

/// Per-channel `geq` expressions matching [`glow_color`].
///
/// `X`, `Y` and `T` are the renderer's pixel coordinates and stream time.
pub fn glow_expressions(
    border_w: u32,
    canvas_w: u32,
    canvas_h: u32,
    base: Rgb,
    speed: f64,
) -> [String; 3] {
    let spread = WAVE_SPREAD * border_w.max(1) as f64;
    let band = format!(
        "lt(X,{bw})+lt(Y,{bw})+gte(X,{xmax})+gte(Y,{ymax})",
        bw = border_w,
        xmax = canvas_w.saturating_sub(border_w),
        ymax = canvas_h.saturating_sub(border_w),
    );
    let factor = format!(
        "(0.5+0.5*sin({omega:.6}*T+(X+Y)/{spread:.1}))",
        omega = TAU * speed,
    );

    [base.r, base.g, base.b]
        .map(|channel| format!("if({band},{channel}*{factor},0)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_is_black() {
        let c = glow_color(500, 500, 1.0, 10, 1000, 1000, Rgb::NEON_BLUE, 1.0);
        assert_eq!(c, Rgb::BLACK);
    }

    #[test]
    fn test_band_membership() {
        assert!(in_border_band(0, 500, 10, 1000, 1000));
        assert!(in_border_band(500, 995, 10, 1000, 1000));
        assert!(!in_border_band(10, 10, 10, 1000, 1000));
    }

    #[test]
    fn test_deterministic() {
        let a = glow_color(3, 700, 2.5, 10, 1000, 1000, Rgb::NEON_BLUE, 1.5);
        let b = glow_color(3, 700, 2.5, 10, 1000, 1000, Rgb::NEON_BLUE, 1.5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_oscillates_over_time() {
        // With speed 1.0 the factor completes a full cycle per second, so a
        // quarter period apart the values must differ.
        let a = glow_color(0, 0, 0.0, 10, 1000, 1000, Rgb::WHITE, 1.0);
        let b = glow_color(0, 0, 0.25, 10, 1000, 1000, Rgb::WHITE, 1.0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_bounded_by_base_color() {
        for t in 0..100 {
            let c = glow_color(5, 5, t as f64 * 0.01, 10, 1000, 1000, Rgb::NEON_BLUE, 2.0);
            assert!(c.r <= Rgb::NEON_BLUE.r);
            assert!(c.g <= Rgb::NEON_BLUE.g);
            assert!(c.b <= Rgb::NEON_BLUE.b);
        }
    }

    #[test]
    fn test_expressions_reference_band_and_time() {
        let [r, g, b] = glow_expressions(10, 1000, 800, Rgb::NEON_BLUE, 1.0);
        for expr in [&r, &g, &b] {
            assert!(expr.contains("lt(X,10)"));
            assert!(expr.contains("gte(X,990)"));
            assert!(expr.contains("gte(Y,790)"));
            assert!(expr.contains("*T"));
        }
        // Channel coefficients follow the base color.
        assert!(r.contains(",0*"));
        assert!(g.contains(",191*"));
        assert!(b.contains(",255*"));
    }
}
