//! Input events from the drawing surface.

use serde::{Deserialize, Serialize};

use crate::Point;

/// Where a drag is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Pen or finger went down; a stroke begins.
    Start,
    /// Dragging; extends the open stroke.
    Move,
    /// Lifted; the stroke is finished.
    End,
    /// The platform took the gesture away; keep what was drawn.
    Cancel,
}

/// One finger on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Finger identifier, stable for the duration of a drag.
    pub id: u32,
    /// Horizontal canvas coordinate.
    pub x: f32,
    /// Vertical canvas coordinate.
    pub y: f32,
    /// Normalized pressure, when the hardware reports it. Not used for ink.
    pub pressure: Option<f32>,
}

impl TouchPoint {
    /// Position of this touch.
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A touch sample. Only the first finger draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Drag phase.
    pub phase: TouchPhase,
    /// Fingers on the surface, primary first.
    pub touches: Vec<TouchPoint>,
    /// Timestamp in milliseconds since the surface appeared.
    pub timestamp_ms: u64,
}

impl TouchEvent {
    /// Build a touch sample.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>, timestamp_ms: u64) -> Self {
        Self {
            phase,
            touches,
            timestamp_ms,
        }
    }

    /// The finger that draws.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Whether more than one finger is down.
    #[must_use]
    pub fn is_multi_touch(&self) -> bool {
        self.touches.len() > 1
    }
}

/// All input events the drawing surface can deliver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Finger input.
    Touch(TouchEvent),

    /// Mouse or stylus input.
    Pointer {
        /// Phase of the drag.
        phase: TouchPhase,
        /// Horizontal canvas coordinate.
        x: f32,
        /// Vertical canvas coordinate.
        y: f32,
    },
}

impl InputEvent {
    /// Convenience constructor for a pointer event.
    #[must_use]
    pub fn pointer(phase: TouchPhase, x: f32, y: f32) -> Self {
        Self::Pointer { phase, x, y }
    }

    /// Phase and primary position, if the event carries one.
    #[must_use]
    pub fn primary(&self) -> Option<(TouchPhase, Point)> {
        match self {
            Self::Touch(touch) => touch
                .primary_touch()
                .map(|point| (touch.phase, point.position())),
            Self::Pointer { phase, x, y } => Some((*phase, Point::new(*x, *y))),
        }
    }
}
