// ============================================================================
// STROKE RASTERIZATION — distance-field coverage for brush, line, rect, circle
// ============================================================================

use crate::canvas::{Color, PixelBuffer};

/// How covered pixels are written.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    /// Source-over composite of the color.
    Color(Color),
    /// Destination-out: covered pixels become transparent.
    Erase,
}

impl Paint {
    #[inline]
    fn apply(self, buffer: &mut PixelBuffer, x: u32, y: u32) {
        match self {
            Paint::Color(c) => buffer.blend_pixel(x, y, c),
            Paint::Erase => buffer.erase_pixel(x, y),
        }
    }
}

/// Distance from (px, py) to segment a→b. Degenerates to point distance.
#[inline]
fn sdf_line_segment(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let cx = ax + t * dx;
    let cy = ay + t * dy;
    ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt()
}

/// Signed distance to an axis-aligned box centred at the origin.
#[inline]
fn sdf_box(px: f32, py: f32, hx: f32, hy: f32) -> f32 {
    let dx = px.abs() - hx;
    let dy = py.abs() - hy;
    let outside = (dx.max(0.0) * dx.max(0.0) + dy.max(0.0) * dy.max(0.0)).sqrt();
    let inside = dx.max(dy).min(0.0);
    outside + inside
}

#[inline]
fn half_width(size: f32) -> f32 {
    (size * 0.5).max(0.5)
}

/// Visit every pixel in the float bounds (clamped to the buffer) whose centre
/// has `dist(cx, cy) <= half`, and paint it.
fn rasterize<F>(
    buffer: &mut PixelBuffer,
    bounds: (f32, f32, f32, f32),
    half: f32,
    paint: Paint,
    dist: F,
) where
    F: Fn(f32, f32) -> f32,
{
    let (min_x, min_y, max_x, max_y) = bounds;
    let (w, h) = buffer.dimensions();
    if max_x < 0.0 || max_y < 0.0 || min_x >= w as f32 || min_y >= h as f32 {
        return;
    }
    let x0 = min_x.floor().max(0.0) as u32;
    let y0 = min_y.floor().max(0.0) as u32;
    let x1 = (max_x.ceil().max(0.0) as u32).min(w - 1);
    let y1 = (max_y.ceil().max(0.0) as u32).min(h - 1);

    for y in y0..=y1 {
        let cy = y as f32 + 0.5;
        for x in x0..=x1 {
            let cx = x as f32 + 0.5;
            if dist(cx, cy) <= half {
                paint.apply(buffer, x, y);
            }
        }
    }
}

/// Round-capped segment of width `size`.
pub fn stroke_segment(
    buffer: &mut PixelBuffer,
    from: (f32, f32),
    to: (f32, f32),
    size: f32,
    paint: Paint,
) {
    let half = half_width(size);
    let bounds = (
        from.0.min(to.0) - half,
        from.1.min(to.1) - half,
        from.0.max(to.0) + half,
        from.1.max(to.1) + half,
    );
    rasterize(buffer, bounds, half, paint, |px, py| {
        sdf_line_segment(px, py, from.0, from.1, to.0, to.1)
    });
}

/// Rectangle outline between two opposite corners, centred on the box edge.
pub fn stroke_rect(
    buffer: &mut PixelBuffer,
    corner_a: (f32, f32),
    corner_b: (f32, f32),
    size: f32,
    paint: Paint,
) {
    let half = half_width(size);
    let cx = (corner_a.0 + corner_b.0) * 0.5;
    let cy = (corner_a.1 + corner_b.1) * 0.5;
    let hx = (corner_b.0 - corner_a.0).abs() * 0.5;
    let hy = (corner_b.1 - corner_a.1).abs() * 0.5;
    let bounds = (cx - hx - half, cy - hy - half, cx + hx + half, cy + hy + half);
    rasterize(buffer, bounds, half, paint, |px, py| {
        sdf_box(px - cx, py - cy, hx, hy).abs()
    });
}

/// Circle outline of `radius` around `centre`.
pub fn stroke_circle(
    buffer: &mut PixelBuffer,
    centre: (f32, f32),
    radius: f32,
    size: f32,
    paint: Paint,
) {
    let half = half_width(size);
    let r = radius.max(0.0);
    let reach = r + half;
    let bounds = (centre.0 - reach, centre.1 - reach, centre.0 + reach, centre.1 + reach);
    rasterize(buffer, bounds, half, paint, |px, py| {
        let dx = px - centre.0;
        let dy = py - centre.1;
        ((dx * dx + dy * dy).sqrt() - r).abs()
    });
}
