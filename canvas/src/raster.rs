//! Software raster: a deterministic [`Surface`] over an `image::RgbaImage`.
//!
//! Coverage is decided per pixel by testing the pixel center against the
//! exact geometry (no anti-aliasing), so identical inputs always produce
//! bit-identical output. That makes this backend the reference used by tests
//! and by offline replay.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use std::path::Path;

use frames::Point;
use image::{ImageResult, Rgba as Pixel, RgbaImage};

use crate::color::{Rgba, TRANSPARENT, resolve_color};
use crate::consts::{BACKGROUND_COLOR, GLYPH_ADVANCE, GLYPH_ASCENT, GLYPH_WIDTH};
use crate::surface::{Composite, Ink, Surface};

/// How a covered pixel is modified.
#[derive(Debug, Clone, Copy)]
enum Paint {
    Over(Rgba),
    Erase,
}

impl Paint {
    fn from_ink(ink: Ink<'_>) -> Self {
        match ink.composite {
            Composite::SourceOver => Self::Over(resolve_color(ink.color)),
            Composite::DestinationOut => Self::Erase,
        }
    }
}

/// Axis-aligned bounds in surface coordinates.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

/// An in-memory RGBA surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Pixmap {
    image: RgbaImage,
}

impl Pixmap {
    /// A surface of the given size, filled with the background color.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { image: RgbaImage::from_pixel(width, height, Pixel(resolve_color(BACKGROUND_COLOR))) }
    }

    /// Wrap an existing image.
    #[must_use]
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The pixel at `(x, y)`, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Number of pixels exactly equal to `rgba`.
    #[must_use]
    pub fn count(&self, rgba: Rgba) -> usize {
        self.image.pixels().filter(|p| p.0 == rgba).count()
    }

    #[must_use]
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Encode the surface as a PNG file.
    ///
    /// # Errors
    ///
    /// Returns the encoder or I/O error from the `image` crate.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.image.save_with_format(path, image::ImageFormat::Png)
    }

    /// Apply `paint` to every pixel within `bounds` whose center satisfies `covers`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn cover(&mut self, bounds: Bounds, paint: Paint, covers: impl Fn(f64, f64) -> bool) {
        let (w, h) = (self.image.width(), self.image.height());
        if w == 0 || h == 0 || !bounds.min_x.is_finite() || !bounds.max_x.is_finite() {
            return;
        }
        let x0 = bounds.min_x.floor().max(0.0) as u32;
        let y0 = bounds.min_y.floor().max(0.0) as u32;
        let x1 = (bounds.max_x.ceil().max(0.0) as u32).min(w);
        let y1 = (bounds.max_y.ceil().max(0.0) as u32).min(h);

        for y in y0..y1 {
            for x in x0..x1 {
                let (cx, cy) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
                if !covers(cx, cy) {
                    continue;
                }
                let px = self.image.get_pixel_mut(x, y);
                px.0 = match paint {
                    Paint::Over(src) => blend_over(px.0, src),
                    Paint::Erase => TRANSPARENT,
                };
            }
        }
    }

    fn fill_box(&mut self, bounds: Bounds, paint: Paint) {
        self.cover(bounds, paint, |x, y| {
            x >= bounds.min_x && x < bounds.max_x && y >= bounds.min_y && y < bounds.max_y
        });
    }
}

impl Surface for Pixmap {
    type Snapshot = RgbaImage;

    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn stroke_segment(&mut self, from: Point, to: Point, ink: Ink<'_>) {
        let hw = ink.width / 2.0;
        let bounds = Bounds {
            min_x: from.x.min(to.x) - hw,
            min_y: from.y.min(to.y) - hw,
            max_x: from.x.max(to.x) + hw,
            max_y: from.y.max(to.y) + hw,
        };
        self.cover(bounds, Paint::from_ink(ink), |x, y| {
            distance_to_segment(Point::new(x, y), from, to) <= hw
        });
    }

    fn stroke_rect(&mut self, origin: Point, width: f64, height: f64, ink: Ink<'_>) {
        let hw = ink.width / 2.0;
        // Normalize so a rectangle dragged in any direction covers the same pixels.
        let (left, right) = (origin.x.min(origin.x + width), origin.x.max(origin.x + width));
        let (top, bottom) = (origin.y.min(origin.y + height), origin.y.max(origin.y + height));
        let outer = Bounds { min_x: left - hw, min_y: top - hw, max_x: right + hw, max_y: bottom + hw };
        let inner = Bounds { min_x: left + hw, min_y: top + hw, max_x: right - hw, max_y: bottom - hw };

        self.cover(outer, Paint::from_ink(ink), |x, y| {
            let in_outer = x >= outer.min_x && x <= outer.max_x && y >= outer.min_y && y <= outer.max_y;
            let in_inner = x > inner.min_x && x < inner.max_x && y > inner.min_y && y < inner.max_y;
            in_outer && !in_inner
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, ink: Ink<'_>) {
        let hw = ink.width / 2.0;
        let reach = radius + hw;
        let bounds = Bounds {
            min_x: center.x - reach,
            min_y: center.y - reach,
            max_x: center.x + reach,
            max_y: center.y + reach,
        };
        self.cover(bounds, Paint::from_ink(ink), |x, y| {
            (center.distance_to(Point::new(x, y)) - radius).abs() <= hw
        });
    }

    #[allow(clippy::cast_precision_loss)]
    fn fill_text(&mut self, at: Point, text: &str, font_px: f64, color: &str) {
        let paint = Paint::Over(resolve_color(color));
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = at.x + i as f64 * font_px * GLYPH_ADVANCE;
            let cell = Bounds {
                min_x: left,
                min_y: at.y - font_px * GLYPH_ASCENT,
                max_x: left + font_px * GLYPH_WIDTH,
                max_y: at.y,
            };
            self.fill_box(cell, paint);
        }
    }

    fn fill_background(&mut self) {
        let background = Pixel(resolve_color(BACKGROUND_COLOR));
        for px in self.image.pixels_mut() {
            *px = background;
        }
    }

    fn snapshot(&self) -> Self::Snapshot {
        self.image.clone()
    }

    fn restore(&mut self, snapshot: &Self::Snapshot) {
        self.image.clone_from(snapshot);
    }
}

/// Shortest distance from `p` to the segment `a`–`b`.
fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Porter-Duff source-over for non-premultiplied RGBA.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend_over(dst: Rgba, src: Rgba) -> Rgba {
    if src[3] == 0xff {
        return src;
    }
    let sa = f64::from(src[3]) / 255.0;
    let da = f64::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return TRANSPARENT;
    }
    let channel = |i: usize| {
        let value = (f64::from(src[i]) * sa + f64::from(dst[i]) * da * (1.0 - sa)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    [channel(0), channel(1), channel(2), (out_a * 255.0).round().clamp(0.0, 255.0) as u8]
}
