//! The raster target abstraction.
//!
//! Everything the engine draws goes through [`Surface`]. Two implementations
//! exist: [`crate::raster::Pixmap`], a deterministic software raster used
//! natively and in tests, and [`crate::render::CanvasSurface`], which drives a
//! browser `CanvasRenderingContext2d`.
//!
//! Surfaces never report failures to the caller. A backend that cannot
//! complete a call leaves its pixels untouched.

use frames::Point;

/// How stroked pixels combine with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    /// Paint the stroke color over existing pixels.
    SourceOver,
    /// Remove existing pixels under the stroke.
    DestinationOut,
}

/// Stroke parameters shared by every outline primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ink<'a> {
    /// CSS hex color; ignored for [`Composite::DestinationOut`].
    pub color: &'a str,
    /// Line width in surface pixels.
    pub width: f64,
    pub composite: Composite,
}

impl<'a> Ink<'a> {
    #[must_use]
    pub fn paint(color: &'a str, width: f64) -> Self {
        Self { color, width, composite: Composite::SourceOver }
    }

    #[must_use]
    pub fn erase(width: f64) -> Self {
        Self { color: "", width, composite: Composite::DestinationOut }
    }
}

/// A 2D raster that DrawOps can be rendered onto and snapshotted.
pub trait Surface {
    /// A full copy of the surface pixels.
    type Snapshot: Clone;

    /// `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    /// Round-capped, round-joined segment from `from` to `to`.
    fn stroke_segment(&mut self, from: Point, to: Point, ink: Ink<'_>);

    /// Rectangle outline with a corner at `origin` and signed dimensions.
    fn stroke_rect(&mut self, origin: Point, width: f64, height: f64, ink: Ink<'_>);

    /// Circle outline around `center`.
    fn stroke_circle(&mut self, center: Point, radius: f64, ink: Ink<'_>);

    /// Single-line text with its alphabetic baseline starting at `at`.
    fn fill_text(&mut self, at: Point, text: &str, font_px: f64, color: &str);

    /// Wipe the surface back to the background color.
    fn fill_background(&mut self);

    /// Copy the current pixels.
    fn snapshot(&self) -> Self::Snapshot;

    /// Replace the current pixels with a previous snapshot.
    fn restore(&mut self, snapshot: &Self::Snapshot);
}
