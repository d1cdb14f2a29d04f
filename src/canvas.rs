use image::{ImageError, Rgba, RgbaImage};
use rayon::prelude::*;
use std::path::Path;

use crate::log_warn;

/// Largest buffer accepted by [`PixelBuffer::new`] (~256 megapixels).
pub const MAX_CANVAS_PIXELS: u64 = 256_000_000;

// ============================================================================
// COLOR
// ============================================================================

/// An 8-bit RGBA color. Three-channel colors carry `a = 255`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional, case-insensitive).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        if !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Exact equality on r, g, b. Alpha is ignored.
    #[inline]
    pub fn rgb_eq(&self, other: &Color) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }

    /// Same color with alpha forced to 255.
    #[inline]
    pub const fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    #[inline]
    pub const fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl From<Rgba<u8>> for Color {
    fn from(p: Rgba<u8>) -> Self {
        Self::rgba(p[0], p[1], p[2], p[3])
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        c.to_rgba()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ============================================================================
// PIXEL BUFFER
// ============================================================================

/// Row-major RGBA raster owned by a drawing surface.
///
/// `Clone` is the only way to copy one; history snapshots and stroke previews
/// call it explicitly.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Create a fully transparent buffer.
    ///
    /// Zero-sized or oversized dimensions are a caller error; they are clamped
    /// to 1×1 and logged instead of panicking.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = sanitize_dimensions(width, height);
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Create a buffer filled with `color`.
    pub fn new_filled(width: u32, height: u32, color: Color) -> Self {
        let mut buf = Self::new(width, height);
        if color != Color::TRANSPARENT {
            buf.fill(color);
        }
        buf
    }

    /// Wrap an existing image. Empty images are replaced by a 1×1 buffer.
    pub fn from_image(image: RgbaImage) -> Self {
        if image.width() == 0 || image.height() == 0 {
            return Self::new(image.width(), image.height());
        }
        Self { image }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    #[inline]
    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height()
    }

    /// Color at (x, y). Out-of-bounds reads return transparent.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        if !self.in_bounds(x, y) {
            return Color::TRANSPARENT;
        }
        Color::from(*self.image.get_pixel(x, y))
    }

    /// Overwrite (x, y). Out-of-bounds writes are ignored.
    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Color) {
        if !self.in_bounds(x, y) {
            return;
        }
        self.image.put_pixel(x, y, color.to_rgba());
    }

    /// Source-over composite `color` onto (x, y).
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Color) {
        if !self.in_bounds(x, y) || color.a == 0 {
            return;
        }
        if color.a == 255 {
            self.put_pixel(x, y, color);
            return;
        }
        let dst = self.get_pixel(x, y);
        let sa = color.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let mix = |s: u8, d: u8| -> u8 {
            let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        self.put_pixel(
            x,
            y,
            Color::rgba(
                mix(color.r, dst.r),
                mix(color.g, dst.g),
                mix(color.b, dst.b),
                (out_a * 255.0).round() as u8,
            ),
        );
    }

    /// Destination-out: make (x, y) fully transparent.
    #[inline]
    pub fn erase_pixel(&mut self, x: u32, y: u32) {
        self.put_pixel(x, y, Color::TRANSPARENT);
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: Color) {
        let px = [color.r, color.g, color.b, color.a];
        let row_bytes = self.width() as usize * 4;
        let raw: &mut [u8] = &mut self.image;
        raw.par_chunks_mut(row_bytes)
            .for_each(|row| {
                for chunk in row.chunks_exact_mut(4) {
                    chunk.copy_from_slice(&px);
                }
            });
    }

    /// Make the whole buffer transparent.
    pub fn clear(&mut self) {
        self.fill(Color::TRANSPARENT);
    }

    /// Raw RGBA bytes, row-major.
    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    #[inline]
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Bytes of pixel storage owned by this buffer.
    pub fn memory_bytes(&self) -> usize {
        self.image.as_raw().len()
    }

    /// Encode the buffer as PNG at `path`.
    pub fn save_png(&self, path: &Path) -> Result<(), ImageError> {
        self.image
            .save_with_format(path, image::ImageFormat::Png)
    }
}

fn sanitize_dimensions(width: u32, height: u32) -> (u32, u32) {
    let total = width as u64 * height as u64;
    if width == 0 || height == 0 || total > MAX_CANVAS_PIXELS {
        log_warn!(
            "PixelBuffer: dimensions {}×{} outside 1..={} pixels, clamped to 1×1",
            width,
            height,
            MAX_CANVAS_PIXELS
        );
        (1, 1)
    } else {
        (width, height)
    }
}
