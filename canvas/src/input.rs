//! Input model: drawing settings and the gesture state machine.
//!
//! `UiState` holds the settings a new gesture is started with. `InputState`
//! is the active gesture being tracked between pointer-down and pointer-up,
//! carrying everything needed to render incremental segments or restore the
//! shape preview on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use frames::{Point, Tool};

use crate::consts::{DEFAULT_BRUSH_SIZE, DEFAULT_COLOR, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};

/// Settings applied to the next gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    /// Currently active drawing tool.
    pub tool: Tool,
    /// Ink color as a CSS hex string.
    pub color: String,
    /// Stroke width in pixels, always within the brush range.
    pub brush_size: f64,
}

impl Default for UiState {
    fn default() -> Self {
        Self { tool: Tool::default(), color: DEFAULT_COLOR.to_owned(), brush_size: DEFAULT_BRUSH_SIZE }
    }
}

/// Clamp a requested brush size into the selectable range.
///
/// Returns `None` for non-finite input, which callers ignore.
#[must_use]
pub fn clamp_brush_size(size: f64) -> Option<f64> {
    size.is_finite().then(|| size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE))
}

/// Internal state for the gesture state machine.
///
/// `P` is the surface snapshot type used as the shape preview backup.
#[derive(Debug, Clone)]
pub enum InputState<P> {
    /// No gesture in progress; waiting for the next pointer-down.
    Idle,
    /// Pen or eraser held down.
    Stroking {
        /// Tool the stroke was started with.
        tool: Tool,
        /// End of the previous segment; the next segment starts here.
        last: Point,
    },
    /// Rectangle, circle or line being dragged out.
    Shaping {
        /// Tool the shape was started with.
        tool: Tool,
        /// Anchor of the shape.
        start: Point,
        /// Latest pointer position; the outline currently previewed ends here.
        last: Point,
        /// The committed surface before the gesture began.
        preview: P,
    },
    /// Waiting for the host to supply (or cancel) the text to place.
    TextEntry {
        /// Where the label will be anchored.
        position: Point,
    },
}

impl<P> Default for InputState<P> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<P> InputState<P> {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether a pointer gesture (stroke or shape drag) is in progress.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Stroking { .. } | Self::Shaping { .. })
    }
}
