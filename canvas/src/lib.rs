//! Raster drawing engine for the collaborative whiteboard.
//!
//! This crate owns everything that touches pixels: rendering [`DrawOp`]s onto
//! a surface, the pointer gesture state machine, and snapshot-based
//! undo/redo. It compiles natively (the software [`raster::Pixmap`] backend,
//! used by tests and offline replay) and to WebAssembly (the
//! [`render::CanvasSurface`] backend). The host is responsible only for
//! wiring pointer events to the engine and forwarding the resulting
//! [`engine::Action`]s to the relay.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Drawing session: [`engine::EngineCore`] and its actions |
//! | [`input`] | Drawing settings and the gesture state machine |
//! | [`history`] | Bounded undo/redo stack over surface snapshots |
//! | [`surface`] | The [`surface::Surface`] trait every backend implements |
//! | [`raster`] | Deterministic software raster |
//! | [`render`] | `DrawOp` dispatch and the browser canvas backend |
//! | [`color`] | Hex color parsing |
//! | [`consts`] | Shared constants (history limit, brush range, colors) |

pub mod color;
pub mod consts;
pub mod engine;
pub mod history;
pub mod input;
pub mod raster;
pub mod render;
pub mod surface;

pub use frames::{DrawOp, Point, Tool};
