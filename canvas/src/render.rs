//! Rendering: turns [`DrawOp`]s into surface calls, plus the browser backend.
//!
//! [`draw_op`] is the single dispatch used for local gestures, remote ops and
//! offline replay, so every participant rasterizes an op the same way.
//!
//! [`CanvasSurface`] is the only place that touches
//! [`web_sys::CanvasRenderingContext2d`]. Canvas calls that fail are reported
//! to the browser console and otherwise ignored; the [`Surface`] contract has
//! no error channel.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::TAU;

use frames::{DrawOp, Point, Tool};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::consts::{BACKGROUND_COLOR, ERASER_SCALE, TEXT_SCALE};
use crate::surface::{Composite, Ink, Surface};

// =============================================================
// Op dispatch
// =============================================================

/// Render one operation onto `surface`.
///
/// Ops with a non-finite or non-positive brush size, or non-finite
/// coordinates, are skipped.
pub fn draw_op<S: Surface>(surface: &mut S, op: &DrawOp) {
    if !is_drawable(op) {
        return;
    }
    let ink = Ink::paint(&op.color, op.brush_size);
    match op.tool {
        Tool::Pen | Tool::Line => surface.stroke_segment(op.from, op.to, ink),
        Tool::Eraser => surface.stroke_segment(op.from, op.to, Ink::erase(op.brush_size * ERASER_SCALE)),
        Tool::Rectangle => {
            let (width, height) = op.extent();
            surface.stroke_rect(op.from, width, height, ink);
        }
        Tool::Circle => surface.stroke_circle(op.from, op.from.distance_to(op.to), ink),
        Tool::Text => {
            if let Some(text) = op.text.as_deref().filter(|t| !t.is_empty()) {
                surface.fill_text(op.from, text, op.brush_size * TEXT_SCALE, &op.color);
            }
        }
    }
}

fn is_drawable(op: &DrawOp) -> bool {
    let finite = |p: Point| p.x.is_finite() && p.y.is_finite();
    let (width, height) = op.extent();
    op.brush_size.is_finite()
        && op.brush_size > 0.0
        && finite(op.from)
        && finite(op.to)
        && width.is_finite()
        && height.is_finite()
}

// =============================================================
// Browser backend
// =============================================================

/// A [`Surface`] backed by an HTML canvas 2D context.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: u32,
    height: u32,
}

impl CanvasSurface {
    /// Acquire the 2D context of `canvas`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the context cannot be created or is not a 2D context.
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { ctx, width: canvas.width(), height: canvas.height() })
    }

    fn apply_ink(&self, ink: Ink<'_>) -> Result<(), JsValue> {
        let op = match ink.composite {
            Composite::SourceOver => "source-over",
            Composite::DestinationOut => "destination-out",
        };
        self.ctx.set_global_composite_operation(op)?;
        self.ctx.set_stroke_style_str(ink.color);
        self.ctx.set_line_width(ink.width);
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
        Ok(())
    }

    fn try_segment(&self, from: Point, to: Point, ink: Ink<'_>) -> Result<(), JsValue> {
        self.apply_ink(ink)?;
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
        self.reset_composite()
    }

    fn try_rect(&self, origin: Point, width: f64, height: f64, ink: Ink<'_>) -> Result<(), JsValue> {
        self.apply_ink(ink)?;
        self.ctx.stroke_rect(origin.x, origin.y, width, height);
        self.reset_composite()
    }

    fn try_circle(&self, center: Point, radius: f64, ink: Ink<'_>) -> Result<(), JsValue> {
        self.apply_ink(ink)?;
        self.ctx.begin_path();
        self.ctx.arc(center.x, center.y, radius, 0.0, TAU)?;
        self.ctx.stroke();
        self.reset_composite()
    }

    fn try_text(&self, at: Point, text: &str, font_px: f64, color: &str) -> Result<(), JsValue> {
        self.ctx.set_global_composite_operation("source-over")?;
        self.ctx.set_fill_style_str(color);
        self.ctx.set_font(&format!("{font_px:.0}px sans-serif"));
        self.ctx.set_text_baseline("alphabetic");
        self.ctx.fill_text(text, at.x, at.y)
    }

    fn try_background(&self) -> Result<(), JsValue> {
        self.ctx.set_global_composite_operation("source-over")?;
        self.ctx.set_fill_style_str(BACKGROUND_COLOR);
        self.ctx.fill_rect(0.0, 0.0, f64::from(self.width), f64::from(self.height));
        Ok(())
    }

    fn try_snapshot(&self) -> Result<ImageData, JsValue> {
        self.ctx.get_image_data(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    fn reset_composite(&self) -> Result<(), JsValue> {
        self.ctx.set_global_composite_operation("source-over")
    }
}

impl Surface for CanvasSurface {
    /// `None` when the pixels could not be read back.
    type Snapshot = Option<ImageData>;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn stroke_segment(&mut self, from: Point, to: Point, ink: Ink<'_>) {
        report("stroke segment", self.try_segment(from, to, ink));
    }

    fn stroke_rect(&mut self, origin: Point, width: f64, height: f64, ink: Ink<'_>) {
        report("stroke rect", self.try_rect(origin, width, height, ink));
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, ink: Ink<'_>) {
        report("stroke circle", self.try_circle(center, radius, ink));
    }

    fn fill_text(&mut self, at: Point, text: &str, font_px: f64, color: &str) {
        report("fill text", self.try_text(at, text, font_px, color));
    }

    fn fill_background(&mut self) {
        report("fill background", self.try_background());
    }

    fn snapshot(&self) -> Self::Snapshot {
        match self.try_snapshot() {
            Ok(data) => Some(data),
            Err(err) => {
                warn("snapshot", &err);
                None
            }
        }
    }

    fn restore(&mut self, snapshot: &Self::Snapshot) {
        if let Some(data) = snapshot {
            report("restore", self.ctx.put_image_data(data, 0.0, 0.0));
        }
    }
}

fn report(what: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        warn(what, &err);
    }
}

fn warn(what: &str, err: &JsValue) {
    web_sys::console::warn_2(&JsValue::from_str(&format!("canvas {what} failed")), err);
}
