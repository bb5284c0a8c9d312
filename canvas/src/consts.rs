//! Shared numeric constants for the canvas crate.

// ── History ─────────────────────────────────────────────────────

/// Maximum number of raster snapshots kept for undo/redo.
pub const HISTORY_LIMIT: usize = 50;

// ── Brushes ─────────────────────────────────────────────────────

/// Brush size selected on startup.
pub const DEFAULT_BRUSH_SIZE: f64 = 4.0;

/// Smallest selectable brush size.
pub const MIN_BRUSH_SIZE: f64 = 1.0;

/// Largest selectable brush size.
pub const MAX_BRUSH_SIZE: f64 = 30.0;

/// The eraser sweeps a wider path than the pen at the same brush size.
pub const ERASER_SCALE: f64 = 3.0;

/// Text font size in pixels per unit of brush size.
pub const TEXT_SCALE: f64 = 3.0;

// ── Colors ──────────────────────────────────────────────────────

/// Ink color selected on startup, also used when a color fails to parse.
pub const DEFAULT_COLOR: &str = "#1a1a2e";

/// Background the surface is filled with on creation and on clear.
pub const BACKGROUND_COLOR: &str = "#ffffff";

// ── Text metrics (software raster) ──────────────────────────────

/// Horizontal advance per character, as a fraction of the font size.
pub const GLYPH_ADVANCE: f64 = 0.6;

/// Inked width of a glyph cell, as a fraction of the font size.
pub const GLYPH_WIDTH: f64 = 0.5;

/// Inked height above the baseline, as a fraction of the font size.
pub const GLYPH_ASCENT: f64 = 0.7;
