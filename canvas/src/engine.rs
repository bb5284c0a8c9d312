//! The drawing session: gesture handling, history and remote apply.
//!
//! [`EngineCore`] owns the surface, the gesture state machine and the undo
//! stack. Input handlers mutate the surface synchronously and return
//! [`Action`]s for the host to forward (usually to the relay), so local
//! rendering always happens before the corresponding broadcast.
//!
//! LIFECYCLE
//! =========
//! `Idle → Stroking | Shaping | TextEntry → Idle`. Every completed gesture,
//! confirmed text label and local clear pushes exactly one history snapshot.
//! Ops received from peers are drawn without touching history.
//!
//! Without a mounted surface every operation is a silent no-op.

use frames::{DrawOp, Point, Tool};
use wasm_bindgen::JsValue;
use web_sys::HtmlCanvasElement;

use crate::history::History;
use crate::input::{InputState, UiState, clamp_brush_size};
use crate::render::{CanvasSurface, draw_op};
use crate::surface::Surface;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Send this op to the other participants.
    Broadcast(DrawOp),
    /// The surface was cleared locally; tell the room.
    Cleared,
    /// The text tool was pressed here; ask the user for the label.
    TextRequested { position: Point },
    /// Pixels changed without anything to broadcast.
    RenderNeeded,
}

/// Core engine state, generic over the raster backend.
///
/// Separated from the browser canvas so it can be tested natively with
/// [`crate::raster::Pixmap`].
pub struct EngineCore<S: Surface> {
    surface: Option<S>,
    pub ui: UiState,
    input: InputState<S::Snapshot>,
    history: History<S::Snapshot>,
}

impl<S: Surface> Default for EngineCore<S> {
    fn default() -> Self {
        Self {
            surface: None,
            ui: UiState::default(),
            input: InputState::Idle,
            history: History::default(),
        }
    }
}

impl<S: Surface> EngineCore<S> {
    /// An engine with no surface mounted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine drawing onto `surface`.
    #[must_use]
    pub fn with_surface(surface: S) -> Self {
        let mut core = Self::default();
        core.mount(surface);
        core
    }

    // --- Surface lifecycle ---

    /// Attach a render target, dropping any gesture and history tied to the
    /// previous one.
    pub fn mount(&mut self, surface: S) {
        self.surface = Some(surface);
        self.input = InputState::Idle;
        self.history.reset();
    }

    /// Detach and return the render target.
    pub fn unmount(&mut self) -> Option<S> {
        self.input = InputState::Idle;
        self.history.reset();
        self.surface.take()
    }

    // --- Settings ---

    /// Set the active tool. Pending text entry is abandoned.
    pub fn set_tool(&mut self, tool: Tool) {
        if matches!(self.input, InputState::TextEntry { .. }) {
            self.input = InputState::Idle;
        }
        self.ui.tool = tool;
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.ui.color = color.into();
    }

    /// Set the brush size, clamped to the selectable range. Non-finite
    /// values are ignored.
    pub fn set_brush_size(&mut self, size: f64) {
        if let Some(size) = clamp_brush_size(size) {
            self.ui.brush_size = size;
        }
    }

    // --- Pointer input ---

    /// Pointer pressed at `p`.
    pub fn on_pointer_down(&mut self, p: Point) -> Vec<Action> {
        if !self.input.is_idle() || !is_finite(p) {
            return Vec::new();
        }
        let Some(surface) = self.surface.as_ref() else {
            return Vec::new();
        };
        let tool = self.ui.tool;
        match tool {
            Tool::Pen | Tool::Eraser => {
                self.input = InputState::Stroking { tool, last: p };
                Vec::new()
            }
            Tool::Rectangle | Tool::Circle | Tool::Line => {
                self.input = InputState::Shaping { tool, start: p, last: p, preview: surface.snapshot() };
                Vec::new()
            }
            Tool::Text => {
                self.input = InputState::TextEntry { position: p };
                vec![Action::TextRequested { position: p }]
            }
        }
    }

    /// Pointer moved to `p` while pressed.
    pub fn on_pointer_move(&mut self, p: Point) -> Vec<Action> {
        if !is_finite(p) {
            return Vec::new();
        }
        let Some(surface) = self.surface.as_mut() else {
            return Vec::new();
        };
        match &mut self.input {
            InputState::Stroking { tool, last } => {
                let op = DrawOp::segment(*tool, *last, p, self.ui.color.clone(), self.ui.brush_size);
                draw_op(surface, &op);
                *last = p;
                vec![Action::Broadcast(op)]
            }
            InputState::Shaping { tool, start, last, preview } => {
                *last = p;
                surface.restore(preview);
                draw_op(surface, &DrawOp::shape(*tool, *start, p, self.ui.color.clone(), self.ui.brush_size));
                vec![Action::RenderNeeded]
            }
            InputState::Idle | InputState::TextEntry { .. } => Vec::new(),
        }
    }

    /// Pointer released, at `p` if the platform reports a position.
    ///
    /// Without a position the gesture ends where the last move left it.
    pub fn on_pointer_up(&mut self, p: Option<Point>) -> Vec<Action> {
        if !self.input.is_drawing() {
            return Vec::new();
        }
        let Some(surface) = self.surface.as_mut() else {
            return Vec::new();
        };
        match std::mem::take(&mut self.input) {
            InputState::Stroking { .. } => {
                self.history.push(surface.snapshot());
                Vec::new()
            }
            InputState::Shaping { tool, start, last, preview } => {
                let end = p.filter(|p| is_finite(*p)).unwrap_or(last);
                surface.restore(&preview);
                let op = DrawOp::shape(tool, start, end, self.ui.color.clone(), self.ui.brush_size);
                draw_op(surface, &op);
                self.history.push(surface.snapshot());
                vec![Action::Broadcast(op)]
            }
            other @ (InputState::Idle | InputState::TextEntry { .. }) => {
                self.input = other;
                Vec::new()
            }
        }
    }

    /// Pointer left the surface or the platform cancelled the touch.
    ///
    /// A shape preview is discarded. A freehand stroke has already been
    /// broadcast segment by segment, so it is committed.
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        self.abandon_gesture()
    }

    // --- Text entry ---

    /// Place the label requested by [`Action::TextRequested`].
    ///
    /// Blank input is treated as [`EngineCore::cancel_text`].
    pub fn confirm_text(&mut self, text: &str) -> Vec<Action> {
        let InputState::TextEntry { position } = self.input else {
            return Vec::new();
        };
        self.input = InputState::Idle;
        if text.trim().is_empty() {
            return Vec::new();
        }
        let Some(surface) = self.surface.as_mut() else {
            return Vec::new();
        };
        let op = DrawOp::text(position, text, self.ui.color.clone(), self.ui.brush_size);
        draw_op(surface, &op);
        self.history.push(surface.snapshot());
        vec![Action::Broadcast(op)]
    }

    /// Dismiss a pending text entry without drawing anything.
    pub fn cancel_text(&mut self) {
        if matches!(self.input, InputState::TextEntry { .. }) {
            self.input = InputState::Idle;
        }
    }

    // --- History ---

    /// Step back one snapshot. An active gesture is ended first.
    pub fn undo(&mut self) -> Vec<Action> {
        let mut actions = self.abandon_gesture();
        let Some(surface) = self.surface.as_mut() else {
            return actions;
        };
        if let Some(snapshot) = self.history.undo() {
            surface.restore(snapshot);
            push_render(&mut actions);
        }
        actions
    }

    /// Step forward one snapshot. An active gesture is ended first.
    pub fn redo(&mut self) -> Vec<Action> {
        let mut actions = self.abandon_gesture();
        let Some(surface) = self.surface.as_mut() else {
            return actions;
        };
        if let Some(snapshot) = self.history.redo() {
            surface.restore(snapshot);
            push_render(&mut actions);
        }
        actions
    }

    /// Wipe the surface locally and record it as an undoable step.
    pub fn clear(&mut self) -> Vec<Action> {
        let mut actions = self.abandon_gesture();
        let Some(surface) = self.surface.as_mut() else {
            return actions;
        };
        surface.fill_background();
        self.history.push(surface.snapshot());
        actions.retain(|a| !matches!(a, Action::RenderNeeded));
        actions.push(Action::Cleared);
        actions
    }

    // --- Remote ops ---

    /// Draw an op received from a peer. History is not touched.
    ///
    /// A shape preview in progress is kept on top: the op lands on the
    /// committed pixels underneath it.
    pub fn apply_remote(&mut self, op: &DrawOp) {
        self.apply_underneath(|surface| draw_op(surface, op));
    }

    /// Clear the surface on a peer's request. History is not touched.
    pub fn apply_remote_clear(&mut self) {
        self.apply_underneath(S::fill_background);
    }

    fn apply_underneath(&mut self, paint: impl FnOnce(&mut S)) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        match &mut self.input {
            InputState::Shaping { tool, start, last, preview } => {
                surface.restore(preview);
                paint(surface);
                *preview = surface.snapshot();
                draw_op(surface, &DrawOp::shape(*tool, *start, *last, self.ui.color.clone(), self.ui.brush_size));
            }
            _ => paint(surface),
        }
    }

    // --- Queries ---

    /// The mounted surface, if any.
    #[must_use]
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    #[must_use]
    pub fn input(&self) -> &InputState<S::Snapshot> {
        &self.input
    }

    #[must_use]
    pub fn history(&self) -> &History<S::Snapshot> {
        &self.history
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.ui.tool
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.ui.color
    }

    #[must_use]
    pub fn brush_size(&self) -> f64 {
        self.ui.brush_size
    }

    /// End whatever gesture is active the way a pointer cancel would.
    fn abandon_gesture(&mut self) -> Vec<Action> {
        let state = std::mem::take(&mut self.input);
        let Some(surface) = self.surface.as_mut() else {
            return Vec::new();
        };
        match state {
            InputState::Shaping { preview, .. } => {
                surface.restore(&preview);
                vec![Action::RenderNeeded]
            }
            InputState::Stroking { .. } => {
                self.history.push(surface.snapshot());
                Vec::new()
            }
            InputState::Idle | InputState::TextEntry { .. } => Vec::new(),
        }
    }
}

/// The browser engine: the core bound to an HTML canvas.
pub type Engine = EngineCore<CanvasSurface>;

impl EngineCore<CanvasSurface> {
    /// Create an engine drawing onto `canvas`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context.
    pub fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        Ok(Self::with_surface(CanvasSurface::new(canvas)?))
    }
}

fn push_render(actions: &mut Vec<Action>) {
    if !actions.contains(&Action::RenderNeeded) {
        actions.push(Action::RenderNeeded);
    }
}

fn is_finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}
