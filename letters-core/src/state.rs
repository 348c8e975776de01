//! Drawing surface state management.

use crate::{InputEvent, LettersResult, Pencil, Stroke, StrokeRecorder, TouchPhase};

/// Size of the drawing surface in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    /// Width in canvas units.
    pub width: f32,
    /// Height in canvas units.
    pub height: f32,
}

impl CanvasSize {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(768.0, 768.0)
    }
}

/// The complete state of a drawing surface.
#[derive(Debug, Clone)]
pub struct CanvasState {
    /// Strokes drawn so far.
    recorder: StrokeRecorder,
    /// Pencil used for the next stroke.
    pencil: Pencil,
    /// Viewport size in canvas units.
    pub size: CanvasSize,
}

impl CanvasState {
    /// Create a new canvas with the given viewport size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            recorder: StrokeRecorder::new(),
            pencil: Pencil::default(),
            size: CanvasSize::new(width, height),
        }
    }

    /// Process an input event, driving the stroke recorder.
    ///
    /// Returns `true` when the strokes changed and the surface should redraw.
    ///
    /// # Errors
    ///
    /// Propagates recorder protocol errors. A `Start` while a stroke is open
    /// closes the stale stroke first, so that path does not fail.
    pub fn process_event(&mut self, event: &InputEvent) -> LettersResult<bool> {
        let Some((phase, point)) = event.primary() else {
            return Ok(false);
        };

        match phase {
            TouchPhase::Start => {
                if self.recorder.is_drawing() {
                    tracing::debug!("Start without End, closing previous stroke");
                    self.recorder.end_stroke();
                }
                self.recorder.begin_stroke(self.pencil.color())?;
                self.recorder.append_point(point)?;
                Ok(true)
            }
            TouchPhase::Move => {
                if !self.recorder.is_drawing() {
                    return Ok(false);
                }
                self.recorder.append_point(point)?;
                Ok(true)
            }
            TouchPhase::End => {
                if !self.recorder.is_drawing() {
                    return Ok(false);
                }
                let last = self.recorder.open_stroke().and_then(Stroke::last_point);
                if last != Some(point) {
                    self.recorder.append_point(point)?;
                }
                self.recorder.end_stroke();
                Ok(true)
            }
            TouchPhase::Cancel => Ok(self.recorder.end_stroke().is_some()),
        }
    }

    /// Select the pencil for subsequent strokes.
    pub fn select_pencil(&mut self, pencil: Pencil) {
        tracing::debug!("Pencil selected: {}", pencil.name());
        self.pencil = pencil;
    }

    /// Currently selected pencil.
    #[must_use]
    pub fn pencil(&self) -> Pencil {
        self.pencil
    }

    /// Erase the drawing.
    pub fn clear(&mut self) {
        self.recorder.clear();
    }

    /// Strokes for rendering.
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        self.recorder.current_strokes()
    }

    /// The underlying recorder.
    #[must_use]
    pub fn recorder(&self) -> &StrokeRecorder {
        &self.recorder
    }

    /// Whether the submit affordance should be enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.recorder.can_submit()
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        let size = CanvasSize::default();
        Self::new(size.width, size.height)
    }
}
