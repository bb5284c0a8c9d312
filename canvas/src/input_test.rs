use super::*;

// =============================================================
// UiState
// =============================================================

#[test]
fn ui_state_defaults() {
    let ui = UiState::default();
    assert_eq!(ui.tool, Tool::Pen);
    assert_eq!(ui.color, DEFAULT_COLOR);
    assert!((ui.brush_size - DEFAULT_BRUSH_SIZE).abs() < f64::EPSILON);
}

// =============================================================
// Brush clamping
// =============================================================

#[test]
fn brush_size_within_range_is_kept() {
    assert_eq!(clamp_brush_size(12.5), Some(12.5));
}

#[test]
fn brush_size_is_clamped_to_range() {
    assert_eq!(clamp_brush_size(0.0), Some(MIN_BRUSH_SIZE));
    assert_eq!(clamp_brush_size(-4.0), Some(MIN_BRUSH_SIZE));
    assert_eq!(clamp_brush_size(500.0), Some(MAX_BRUSH_SIZE));
}

#[test]
fn non_finite_brush_size_is_rejected() {
    assert_eq!(clamp_brush_size(f64::NAN), None);
    assert_eq!(clamp_brush_size(f64::INFINITY), None);
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    let state: InputState<()> = InputState::default();
    assert!(state.is_idle());
    assert!(!state.is_drawing());
}

#[test]
fn stroking_and_shaping_count_as_drawing() {
    let stroking: InputState<()> = InputState::Stroking { tool: Tool::Pen, last: Point::new(1.0, 2.0) };
    let shaping = InputState::Shaping {
        tool: Tool::Circle,
        start: Point::default(),
        last: Point::default(),
        preview: (),
    };
    assert!(stroking.is_drawing());
    assert!(shaping.is_drawing());
}

#[test]
fn text_entry_is_not_drawing() {
    let state: InputState<()> = InputState::TextEntry { position: Point::new(3.0, 4.0) };
    assert!(!state.is_idle());
    assert!(!state.is_drawing());
}
