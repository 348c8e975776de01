//! Recorded drawing scripts and headless lesson replay.
//!
//! A script is a canvas size and a list of attempts, each a list of strokes
//! in canvas coordinates:
//!
//! ```json
//! {
//!   "canvas": { "width": 224, "height": 224 },
//!   "attempts": [
//!     { "pencil": "blue", "strokes": [[[112, 20], [112, 200]]] }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

use letters_core::{
    CanvasSize, CanvasState, InputEvent, LessonEvent, LessonState, Pencil, Stroke, TouchPhase,
};

use crate::error::{TutorError, TutorResult};
use crate::tutor::{Command, Tutor};

/// One attempt at the current letter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    /// Pencil name; the current pencil is kept when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pencil: Option<String>,
    /// Strokes as lists of `[x, y]` points.
    pub strokes: Vec<Vec<[f32; 2]>>,
}

impl Attempt {
    /// Commands that draw this attempt on a canvas.
    ///
    /// Each stroke becomes a start, moves, and an end event.
    ///
    /// # Errors
    ///
    /// Returns [`TutorError::Script`] for an unknown pencil name or a stroke
    /// without points.
    pub fn commands(&self) -> TutorResult<Vec<Command>> {
        let mut commands = Vec::new();

        if let Some(name) = &self.pencil {
            let pencil = Pencil::from_name(name)
                .ok_or_else(|| TutorError::Script(format!("unknown pencil '{name}'")))?;
            commands.push(Command::SelectPencil(pencil));
        }

        for (index, stroke) in self.strokes.iter().enumerate() {
            let Some((&last, rest)) = stroke.split_last() else {
                return Err(TutorError::Script(format!("stroke {index} has no points")));
            };
            let (start, middle) = rest
                .split_first()
                .map_or((last, &[][..]), |(&first, middle)| (first, middle));
            let [sx, sy] = start;
            let [lx, ly] = last;

            commands.push(Command::Input(InputEvent::pointer(TouchPhase::Start, sx, sy)));
            commands.extend(
                middle
                    .iter()
                    .map(|&[x, y]| Command::Input(InputEvent::pointer(TouchPhase::Move, x, y))),
            );
            commands.push(Command::Input(InputEvent::pointer(TouchPhase::End, lx, ly)));
        }
        Ok(commands)
    }

    /// The strokes this attempt leaves on a canvas of `size`.
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt is malformed.
    pub fn strokes(&self, size: CanvasSize) -> TutorResult<Vec<Stroke>> {
        let mut canvas = CanvasState::new(size.width, size.height);
        for command in self.commands()? {
            match command {
                Command::Input(event) => {
                    canvas.process_event(&event)?;
                }
                Command::SelectPencil(pencil) => canvas.select_pencil(pencil),
                Command::Clear | Command::Submit => {}
            }
        }
        Ok(canvas.strokes().to_vec())
    }
}

/// A canvas size and the attempts drawn on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingScript {
    /// Viewport the strokes were drawn in.
    #[serde(default)]
    pub canvas: CanvasSize,
    /// Attempts in order.
    pub attempts: Vec<Attempt>,
}

impl DrawingScript {
    /// Parse a script from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the canvas is empty.
    pub fn from_json(json: &str) -> TutorResult<Self> {
        let script: Self = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }

    /// Load a script from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> TutorResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let script = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            attempts = script.attempts.len(),
            "Loaded drawing script"
        );
        Ok(script)
    }

    fn validate(&self) -> TutorResult<()> {
        let CanvasSize { width, height } = self.canvas;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(TutorError::Script(format!(
                "canvas must have a positive size, got {width}x{height}"
            )));
        }
        Ok(())
    }

    /// The attempt at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TutorError::Script`] if there is no such attempt.
    pub fn attempt(&self, index: usize) -> TutorResult<&Attempt> {
        self.attempts.get(index).ok_or_else(|| {
            TutorError::Script(format!(
                "attempt {index} out of range ({} attempts)",
                self.attempts.len()
            ))
        })
    }
}

/// Outcome of replaying a script.
#[derive(Debug, Clone, PartialEq)]
pub struct Replay {
    /// Where the lesson ended up.
    pub state: LessonState,
    /// Every lesson event, in order.
    pub events: Vec<LessonEvent>,
}

/// Drive `tutor` through every attempt in `script`.
///
/// Each attempt starts from a cleared canvas, is submitted, and is
/// followed by waiting for its verdict. Replay stops early once the lesson
/// completes; attempts without strokes are skipped.
///
/// # Errors
///
/// Returns an error if an attempt is malformed or the driver task fails.
pub async fn replay(tutor: Tutor, script: &DrawingScript) -> TutorResult<Replay> {
    let mut events = tutor.subscribe();
    let (commands, rx) = mpsc::channel(64);
    let driver = tokio::spawn(tutor.run(rx));
    let mut log = Vec::new();

    'attempts: for (number, attempt) in script.attempts.iter().enumerate() {
        if attempt.strokes.is_empty() {
            tracing::warn!(attempt = number, "Skipping attempt without strokes");
            continue;
        }

        let drawing = attempt.commands()?;
        tracing::debug!(attempt = number, commands = drawing.len(), "Replaying attempt");
        let sequence = std::iter::once(Command::Clear)
            .chain(drawing)
            .chain(std::iter::once(Command::Submit));
        for command in sequence {
            if commands.send(command).await.is_err() {
                break 'attempts;
            }
        }

        loop {
            match events.recv().await {
                Ok(event) => {
                    let verdict = matches!(
                        event,
                        LessonEvent::Success { .. }
                            | LessonEvent::Failure { .. }
                            | LessonEvent::Error { .. }
                    );
                    let complete = event == LessonEvent::Complete;
                    log.push(event);
                    if complete {
                        break 'attempts;
                    }
                    if verdict {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Replay fell behind lesson events");
                }
                Err(RecvError::Closed) => break 'attempts,
            }
        }
    }

    drop(commands);
    let state = driver
        .await
        .map_err(|e| TutorError::Driver(e.to_string()))?;
    while let Ok(event) = events.try_recv() {
        log.push(event);
    }

    Ok(Replay { state, events: log })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"{
        "canvas": { "width": 300, "height": 200 },
        "attempts": [
            { "pencil": "dark_green", "strokes": [[[10, 10], [20, 20], [30, 10]], [[50, 50]]] },
            { "strokes": [] }
        ]
    }"#;

    #[test]
    fn test_parse_script() {
        let script = DrawingScript::from_json(SCRIPT).unwrap();
        assert_eq!(script.canvas, CanvasSize::new(300.0, 200.0));
        assert_eq!(script.attempts.len(), 2);
        assert_eq!(script.attempts[0].pencil.as_deref(), Some("dark_green"));
    }

    #[test]
    fn test_missing_canvas_uses_default() {
        let script = DrawingScript::from_json(r#"{ "attempts": [] }"#).unwrap();
        assert_eq!(script.canvas, CanvasSize::default());
    }

    #[test]
    fn test_zero_canvas_is_rejected() {
        let err = DrawingScript::from_json(r#"{ "canvas": {"width": 0, "height": 10}, "attempts": [] }"#)
            .unwrap_err();
        assert!(matches!(err, TutorError::Script(_)));
    }

    #[test]
    fn test_commands_trace_each_stroke() {
        let script = DrawingScript::from_json(SCRIPT).unwrap();
        let commands = script.attempts[0].commands().unwrap();

        assert_eq!(commands[0], Command::SelectPencil(Pencil::DarkGreen));
        assert_eq!(
            commands[1],
            Command::Input(InputEvent::pointer(TouchPhase::Start, 10.0, 10.0))
        );
        assert_eq!(
            commands[2],
            Command::Input(InputEvent::pointer(TouchPhase::Move, 20.0, 20.0))
        );
        assert_eq!(
            commands[3],
            Command::Input(InputEvent::pointer(TouchPhase::End, 30.0, 10.0))
        );
        // Single-point stroke: start and end on the same spot.
        assert_eq!(commands.len(), 6);
    }

    #[test]
    fn test_strokes_match_drawn_shape() {
        let script = DrawingScript::from_json(SCRIPT).unwrap();
        let strokes = script.attempts[0].strokes(script.canvas).unwrap();

        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0].len(), 3);
        assert_eq!(strokes[0].color(), Pencil::DarkGreen.color());
        assert!(strokes[1].is_dot());
    }

    #[test]
    fn test_unknown_pencil_is_rejected() {
        let attempt = Attempt {
            pencil: Some("magenta".into()),
            strokes: vec![vec![[1.0, 1.0]]],
        };
        assert!(matches!(attempt.commands(), Err(TutorError::Script(_))));
    }

    #[test]
    fn test_empty_stroke_is_rejected() {
        let attempt = Attempt {
            pencil: None,
            strokes: vec![vec![]],
        };
        assert!(attempt.commands().is_err());
    }

    #[test]
    fn test_attempt_out_of_range() {
        let script = DrawingScript::from_json(SCRIPT).unwrap();
        assert!(script.attempt(1).is_ok());
        assert!(script.attempt(2).is_err());
    }
}
