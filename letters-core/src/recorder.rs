//! Stroke recording.
//!
//! Accumulates pointer samples into ordered strokes. At most one stroke is
//! open at a time and it is always the last stroke of the drawing.

use crate::{LettersError, LettersResult, Point, Stroke, StrokeColor, StrokeId};

/// Accumulates strokes for one drawing surface.
#[derive(Debug, Clone, Default)]
pub struct StrokeRecorder {
    /// Strokes in drawing order; the open stroke, if any, is last.
    strokes: Vec<Stroke>,
    /// Whether the last stroke is still being drawn.
    open: bool,
}

impl StrokeRecorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new stroke with zero points.
    ///
    /// # Errors
    ///
    /// Returns [`LettersError::InvalidState`] if a stroke is already open.
    pub fn begin_stroke(&mut self, color: StrokeColor) -> LettersResult<StrokeId> {
        if self.open {
            return Err(LettersError::InvalidState(
                "a stroke is already in progress".to_string(),
            ));
        }
        let stroke = Stroke::new(color);
        let id = stroke.id;
        self.strokes.push(stroke);
        self.open = true;
        tracing::debug!("Stroke {id} started");
        Ok(id)
    }

    /// Append a point to the open stroke.
    ///
    /// # Errors
    ///
    /// Returns [`LettersError::InvalidState`] if no stroke is open.
    pub fn append_point(&mut self, point: Point) -> LettersResult<()> {
        match self.open_stroke_mut() {
            Some(stroke) => {
                stroke.push(point);
                Ok(())
            }
            None => Err(LettersError::InvalidState(
                "no stroke in progress".to_string(),
            )),
        }
    }

    /// Close the open stroke, returning its ID. No-op if none is open.
    pub fn end_stroke(&mut self) -> Option<StrokeId> {
        if !self.open {
            return None;
        }
        self.open = false;
        let stroke = self.strokes.last()?;
        tracing::debug!("Stroke {} ended with {} points", stroke.id, stroke.len());
        Some(stroke.id)
    }

    /// Discard every stroke, open or closed.
    pub fn clear(&mut self) {
        if !self.strokes.is_empty() {
            tracing::debug!("Cleared {} strokes", self.strokes.len());
        }
        self.strokes.clear();
        self.open = false;
    }

    /// Closed and in-progress strokes in drawing order.
    #[must_use]
    pub fn current_strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Owned copy of the current strokes for submission.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Stroke> {
        self.strokes.clone()
    }

    /// The stroke currently being drawn.
    #[must_use]
    pub fn open_stroke(&self) -> Option<&Stroke> {
        if self.open {
            self.strokes.last()
        } else {
            None
        }
    }

    /// Whether a stroke is being drawn.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.open
    }

    /// Whether anything has been drawn since the last clear.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.strokes.is_empty()
    }

    /// Number of strokes, including the open one.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    fn open_stroke_mut(&mut self) -> Option<&mut Stroke> {
        if self.open {
            self.strokes.last_mut()
        } else {
            None
        }
    }
}
