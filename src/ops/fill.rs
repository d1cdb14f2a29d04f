// ============================================================================
// FLOOD FILL — 4-connected, exact RGB match, explicit LIFO frontier
// ============================================================================

use crate::canvas::{Color, PixelBuffer};

/// Summary of a flood fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FillResult {
    /// Number of pixel writes performed.
    pub pixels: usize,
    /// (min_x, min_y, max_x, max_y) of written pixels, `None` when nothing changed.
    pub bbox: Option<(u32, u32, u32, u32)>,
}

impl FillResult {
    pub fn is_noop(&self) -> bool {
        self.pixels == 0
    }
}

/// Replace the region 4-connected to (`seed_x`, `seed_y`) whose r,g,b equals
/// the seed's with `fill` (alpha forced to 255).
///
/// No-op when the seed already has `fill`'s r,g,b, and when the seed is out of
/// bounds (callers clamp coordinates first).
///
/// The frontier is a stack of coordinate pairs. Pixels are tested when popped,
/// so a pixel may sit on the stack several times; only the first pop writes.
pub fn flood_fill(buffer: &mut PixelBuffer, seed_x: u32, seed_y: u32, fill: Color) -> FillResult {
    debug_assert!(
        buffer.in_bounds(seed_x, seed_y),
        "flood_fill seed ({}, {}) outside {}×{}",
        seed_x,
        seed_y,
        buffer.width(),
        buffer.height()
    );
    if !buffer.in_bounds(seed_x, seed_y) {
        return FillResult::default();
    }

    let target = buffer.get_pixel(seed_x, seed_y);
    if target.rgb_eq(&fill) {
        return FillResult::default();
    }

    let fill = fill.opaque();
    let (width, height) = buffer.dimensions();

    let mut written = 0usize;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (seed_x, seed_y, seed_x, seed_y);

    let mut frontier: Vec<(u32, u32)> = Vec::with_capacity(4096);
    frontier.push((seed_x, seed_y));

    while let Some((x, y)) = frontier.pop() {
        if !buffer.get_pixel(x, y).rgb_eq(&target) {
            continue;
        }
        buffer.put_pixel(x, y, fill);
        written += 1;

        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);

        if x > 0 {
            frontier.push((x - 1, y));
        }
        if x + 1 < width {
            frontier.push((x + 1, y));
        }
        if y > 0 {
            frontier.push((x, y - 1));
        }
        if y + 1 < height {
            frontier.push((x, y + 1));
        }
    }

    FillResult {
        pixels: written,
        bbox: Some((min_x, min_y, max_x, max_y)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(w: u32, h: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let c = if (x + y) % 2 == 0 { Color::WHITE } else { Color::BLACK };
                buf.put_pixel(x, y, c);
            }
        }
        buf
    }

    /// Reference region: pixels 4-connected to the seed through the seed color.
    fn connected_region(buf: &PixelBuffer, sx: u32, sy: u32) -> Vec<bool> {
        let (w, h) = buf.dimensions();
        let target = buf.get_pixel(sx, sy);
        let mut seen = vec![false; (w * h) as usize];
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((sx, sy));
        seen[(sy * w + sx) as usize] = true;
        while let Some((x, y)) = queue.pop_front() {
            let neighbours = [
                (x.wrapping_sub(1), y),
                (x + 1, y),
                (x, y.wrapping_sub(1)),
                (x, y + 1),
            ];
            for (nx, ny) in neighbours {
                if nx >= w || ny >= h {
                    continue;
                }
                let i = (ny * w + nx) as usize;
                if !seen[i] && buf.get_pixel(nx, ny).rgb_eq(&target) {
                    seen[i] = true;
                    queue.push_back((nx, ny));
                }
            }
        }
        seen
    }

    #[test]
    fn fills_uniform_buffer_completely() {
        let mut buf = PixelBuffer::new_filled(3, 3, Color::WHITE);
        let result = flood_fill(&mut buf, 1, 1, Color::BLACK);
        assert_eq!(result.pixels, 9);
        assert_eq!(result.bbox, Some((0, 0, 2, 2)));
        assert_eq!(buf, PixelBuffer::new_filled(3, 3, Color::BLACK));
    }

    #[test]
    fn checkerboard_fills_single_pixel() {
        let mut buf = checkerboard(4, 4);
        let before = buf.clone();
        let red = Color::rgb(255, 0, 0);
        let result = flood_fill(&mut buf, 0, 0, red);
        assert_eq!(result.pixels, 1);
        assert_eq!(buf.get_pixel(0, 0), red);
        for y in 0..4 {
            for x in 0..4 {
                if (x, y) != (0, 0) {
                    assert_eq!(buf.get_pixel(x, y), before.get_pixel(x, y));
                }
            }
        }
    }

    #[test]
    fn same_color_fill_is_noop() {
        let mut buf = checkerboard(5, 5);
        let before = buf.clone();
        let seed = buf.get_pixel(2, 3);
        let result = flood_fill(&mut buf, 2, 3, seed);
        assert!(result.is_noop());
        assert_eq!(result.bbox, None);
        assert_eq!(buf.as_raw(), before.as_raw());
    }

    #[test]
    fn noop_check_ignores_alpha() {
        let mut buf = PixelBuffer::new(3, 3);
        let before = buf.clone();
        // Transparent black seed vs opaque black fill: same rgb, so no-op.
        let result = flood_fill(&mut buf, 0, 0, Color::BLACK);
        assert!(result.is_noop());
        assert_eq!(buf, before);
    }

    #[test]
    fn fill_forces_full_opacity() {
        let mut buf = PixelBuffer::new(2, 2);
        flood_fill(&mut buf, 0, 0, Color::rgba(10, 20, 30, 40));
        assert_eq!(buf.get_pixel(1, 1), Color::rgb(10, 20, 30));
    }

    #[test]
    fn wall_blocks_the_region() {
        // Vertical black wall at x == 2 splits a white 5×4 buffer.
        let mut buf = PixelBuffer::new_filled(5, 4, Color::WHITE);
        for y in 0..4 {
            buf.put_pixel(2, y, Color::BLACK);
        }
        let blue = Color::rgb(0, 0, 255);
        let result = flood_fill(&mut buf, 0, 0, blue);
        assert_eq!(result.pixels, 8);
        assert_eq!(result.bbox, Some((0, 0, 1, 3)));
        for y in 0..4 {
            assert_eq!(buf.get_pixel(0, y), blue);
            assert_eq!(buf.get_pixel(1, y), blue);
            assert_eq!(buf.get_pixel(2, y), Color::BLACK);
            assert_eq!(buf.get_pixel(3, y), Color::WHITE);
            assert_eq!(buf.get_pixel(4, y), Color::WHITE);
        }
    }

    #[test]
    fn diagonal_neighbours_are_not_connected() {
        let mut buf = PixelBuffer::new_filled(3, 3, Color::BLACK);
        buf.put_pixel(0, 0, Color::WHITE);
        buf.put_pixel(1, 1, Color::WHITE);
        flood_fill(&mut buf, 0, 0, Color::rgb(0, 255, 0));
        assert_eq!(buf.get_pixel(0, 0), Color::rgb(0, 255, 0));
        assert_eq!(buf.get_pixel(1, 1), Color::WHITE);
    }

    #[test]
    fn matches_reference_region_on_irregular_buffer() {
        // Deterministic pseudo-random two-color pattern.
        let (w, h) = (23u32, 17u32);
        let mut buf = PixelBuffer::new(w, h);
        let mut state = 0x2545_f491u32;
        for y in 0..h {
            for x in 0..w {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                let c = if state % 3 == 0 { Color::BLACK } else { Color::WHITE };
                buf.put_pixel(x, y, c);
            }
        }
        let (sx, sy) = (11, 8);
        let region = connected_region(&buf, sx, sy);
        let before = buf.clone();
        let fill = Color::rgb(255, 0, 255);

        let result = flood_fill(&mut buf, sx, sy, fill);

        assert_eq!(result.pixels, region.iter().filter(|&&r| r).count());
        for y in 0..h {
            for x in 0..w {
                if region[(y * w + x) as usize] {
                    assert_eq!(buf.get_pixel(x, y), fill, "({}, {}) should be filled", x, y);
                } else {
                    assert_eq!(buf.get_pixel(x, y), before.get_pixel(x, y), "({}, {}) changed", x, y);
                }
            }
        }
    }

    #[test]
    fn large_region_does_not_recurse() {
        let mut buf = PixelBuffer::new_filled(512, 512, Color::WHITE);
        let result = flood_fill(&mut buf, 511, 511, Color::BLACK);
        assert_eq!(result.pixels, 512 * 512);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside")]
    fn out_of_bounds_seed_asserts_in_debug() {
        let mut buf = PixelBuffer::new_filled(2, 2, Color::WHITE);
        flood_fill(&mut buf, 2, 0, Color::BLACK);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn out_of_bounds_seed_is_ignored() {
        let mut buf = PixelBuffer::new_filled(2, 2, Color::WHITE);
        assert!(flood_fill(&mut buf, 9, 9, Color::BLACK).is_noop());
    }
}
