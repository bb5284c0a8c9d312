//! Drawing primitives shared by the engine and the wire.
//!
//! A [`DrawOp`] is one atomic instruction: a freehand segment, a finished
//! shape outline, or a placed text label. Field names follow the camelCase
//! wire convention (`brushSize`), so the same struct is rendered locally and
//! relayed verbatim.

#[cfg(test)]
#[path = "draw_test.rs"]
mod draw_test;

use serde::{Deserialize, Serialize};

/// A point in canvas-local surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Which drawing tool produced an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Freehand ink.
    #[default]
    Pen,
    /// Freehand eraser; removes pixels instead of painting.
    Eraser,
    /// Axis-aligned rectangle outline.
    Rectangle,
    /// Circle outline centred on the gesture start.
    Circle,
    /// Straight line segment.
    Line,
    /// Single-shot text label.
    Text,
}

impl Tool {
    /// Pen and eraser emit a stream of segments while the pointer moves.
    #[must_use]
    pub fn is_freehand(self) -> bool {
        matches!(self, Self::Pen | Self::Eraser)
    }

    /// Rectangle, circle and line preview locally and emit once on release.
    #[must_use]
    pub fn is_shape(self) -> bool {
        matches!(self, Self::Rectangle | Self::Circle | Self::Line)
    }
}

/// One atomic drawing action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawOp {
    pub from: Point,
    pub to: Point,
    /// CSS hex color, e.g. `"#ff0000"`.
    pub color: String,
    pub brush_size: f64,
    pub tool: Tool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Signed bounding-box width for shapes; negative when dragged leftwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Signed bounding-box height for shapes; negative when dragged upwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl DrawOp {
    /// A freehand segment (pen or eraser).
    #[must_use]
    pub fn segment(tool: Tool, from: Point, to: Point, color: impl Into<String>, brush_size: f64) -> Self {
        Self {
            from,
            to,
            color: color.into(),
            brush_size,
            tool,
            text: None,
            width: None,
            height: None,
        }
    }

    /// A finished shape spanning `from` to `to`, with signed dimensions.
    #[must_use]
    pub fn shape(tool: Tool, from: Point, to: Point, color: impl Into<String>, brush_size: f64) -> Self {
        Self {
            width: Some(to.x - from.x),
            height: Some(to.y - from.y),
            ..Self::segment(tool, from, to, color, brush_size)
        }
    }

    /// A text label anchored at `at`.
    #[must_use]
    pub fn text(at: Point, text: impl Into<String>, color: impl Into<String>, brush_size: f64) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::segment(Tool::Text, at, at, color, brush_size)
        }
    }

    /// Signed `(width, height)` of the shape, derived from the endpoints when
    /// the sender omitted them.
    #[must_use]
    pub fn extent(&self) -> (f64, f64) {
        (
            self.width.unwrap_or(self.to.x - self.from.x),
            self.height.unwrap_or(self.to.y - self.from.y),
        )
    }
}
