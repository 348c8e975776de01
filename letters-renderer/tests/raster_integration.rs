//! Integration tests for stroke rasterization (letters-renderer).
//!
//! Tests coordinate mapping, paint order, dots and strokes captured through
//! the canvas state.

use letters_core::{CanvasSize, CanvasState, InputEvent, Pencil, Point, Stroke, StrokeColor, TouchPhase};
use letters_renderer::{FitMode, PixelFormat, RasterConfig, Rasterizer};

/// Rasterizer producing RGBA output of the given fit mode.
fn rasterizer(fit: FitMode) -> Rasterizer {
    Rasterizer::new(RasterConfig {
        format: PixelFormat::Rgba8,
        fit,
        ..RasterConfig::default()
    })
}

fn line(color: StrokeColor, from: (f32, f32), to: (f32, f32)) -> Stroke {
    Stroke::with_points(color, vec![Point::from(from), Point::from(to)])
}

fn is_background(color: Option<StrokeColor>) -> bool {
    color == Some(StrokeColor::WHITE)
}

// ==========================================================================
// Paint order
// ==========================================================================

#[test]
fn test_later_strokes_paint_over_earlier() {
    let red = Pencil::Red.color();
    let blue = Pencil::Blue.color();
    let strokes = vec![
        line(red, (10.5, 100.5), (200.5, 100.5)),
        line(blue, (100.5, 10.5), (100.5, 200.5)),
    ];

    let buffer = rasterizer(FitMode::Stretch)
        .rasterize(&strokes, CanvasSize::new(224.0, 224.0))
        .expect("rasterize");

    assert_eq!(buffer.pixel(100, 100), Some(blue));
    assert_eq!(buffer.pixel(50, 100), Some(red));
}

// ==========================================================================
// Coordinate mapping
// ==========================================================================

#[test]
fn test_scaled_dot_lands_at_mapped_position() {
    // 448 -> 224 halves every coordinate.
    let tap = Stroke::with_points(StrokeColor::BLACK, vec![Point::new(201.0, 201.0)]);
    let buffer = rasterizer(FitMode::Contain)
        .rasterize(&[tap], CanvasSize::new(448.0, 448.0))
        .expect("rasterize");

    assert!(!is_background(buffer.pixel(100, 100)));
    assert!(is_background(buffer.pixel(200, 200)));
}

#[test]
fn test_contain_letterboxes_wide_canvas() {
    // 200x100 -> scale 1.12, content rows 56..168.
    let top_edge = line(StrokeColor::BLACK, (0.0, 0.0), (200.0, 0.0));
    let buffer = rasterizer(FitMode::Contain)
        .rasterize(&[top_edge], CanvasSize::new(200.0, 100.0))
        .expect("rasterize");

    assert!(!is_background(buffer.pixel(112, 56)));
    for y in 0..50 {
        assert!(is_background(buffer.pixel(112, y)), "row {y} should be letterbox");
    }
}

#[test]
fn test_cover_crops_overflow() {
    // 200x100 -> scale 2.24, the left 50 canvas units fall outside.
    let strokes = vec![
        Stroke::with_points(StrokeColor::BLACK, vec![Point::new(10.0, 50.0)]),
        Stroke::with_points(StrokeColor::BLACK, vec![Point::new(100.0, 50.0)]),
    ];
    let buffer = rasterizer(FitMode::Cover)
        .rasterize(&strokes, CanvasSize::new(200.0, 100.0))
        .expect("rasterize");

    assert!(!is_background(buffer.pixel(112, 112)));
    let ink = buffer.colors().filter(|c| *c != StrokeColor::WHITE).count();
    assert!(ink > 0);
    assert!(buffer.pixel(0, 112).is_some_and(|c| c == StrokeColor::WHITE));
}

// ==========================================================================
// Canvas capture to buffer
// ==========================================================================

#[test]
fn test_tap_on_canvas_is_visible_after_rasterizing() {
    let mut canvas = CanvasState::new(224.0, 224.0);
    canvas
        .process_event(&InputEvent::pointer(TouchPhase::Start, 50.5, 60.5))
        .expect("start");
    canvas
        .process_event(&InputEvent::pointer(TouchPhase::End, 50.5, 60.5))
        .expect("end");

    let buffer = Rasterizer::with_defaults()
        .rasterize(canvas.strokes(), canvas.size)
        .expect("rasterize");

    assert_eq!(buffer.format(), PixelFormat::Bgra8);
    assert!(!is_background(buffer.pixel(50, 60)));
}

#[test]
fn test_in_progress_stroke_is_rendered() {
    let mut canvas = CanvasState::new(224.0, 224.0);
    canvas
        .process_event(&InputEvent::pointer(TouchPhase::Start, 20.5, 20.5))
        .expect("start");
    canvas
        .process_event(&InputEvent::pointer(TouchPhase::Move, 120.5, 20.5))
        .expect("move");

    let buffer = Rasterizer::with_defaults()
        .rasterize(&canvas.recorder().snapshot(), canvas.size)
        .expect("rasterize");
    assert!(!is_background(buffer.pixel(70, 20)));
}
