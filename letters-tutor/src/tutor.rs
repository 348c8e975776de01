//! The lesson driver.
//!
//! A [`Tutor`] owns the canvas and the lesson session and is driven from a
//! single task. Submissions are rasterized and classified on a background
//! task; the result comes back over a channel and is applied on the
//! driver's task, so canvas and session state are only touched in one place.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use letters_classifier::{ClassifierAdapter, ModelHandle};
use letters_core::{
    CanvasSize, CanvasState, ErrorKind, InputEvent, LessonEvent, LessonSession, LessonState,
    LettersError, LettersResult, Pencil, PredictionResult, Verdict,
};
use letters_renderer::Rasterizer;

use crate::TutorConfig;

/// Capacity of the lesson event channel.
const EVENT_CAPACITY: usize = 64;

/// A request from the input surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A pointer or touch event on the canvas.
    Input(InputEvent),
    /// Switch the pencil used for the next stroke.
    SelectPencil(Pencil),
    /// Erase the canvas.
    Clear,
    /// Hand the current drawing in for evaluation.
    Submit,
}

/// A finished evaluation waiting to be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Curriculum index the drawing was submitted for.
    pub index: usize,
    /// What the classifier said.
    pub result: PredictionResult,
}

/// Binds capture, rasterization, classification and the lesson together.
#[derive(Debug)]
pub struct Tutor {
    canvas: CanvasState,
    session: LessonSession,
    rasterizer: Rasterizer,
    classifier: Arc<ClassifierAdapter>,
    completions_tx: mpsc::Sender<Completion>,
    completions_rx: mpsc::Receiver<Completion>,
    events: broadcast::Sender<LessonEvent>,
}

impl Tutor {
    /// Create a tutor from its parts.
    #[must_use]
    pub fn new(
        canvas: CanvasSize,
        session: LessonSession,
        rasterizer: Rasterizer,
        classifier: Arc<ClassifierAdapter>,
    ) -> Self {
        // One outstanding evaluation at a time, so one slot is enough.
        let (completions_tx, completions_rx) = mpsc::channel(1);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            canvas: CanvasState::new(canvas.width, canvas.height),
            session,
            rasterizer,
            classifier,
            completions_tx,
            completions_rx,
            events,
        }
    }

    /// Create a tutor whose model is loaded lazily from `config.model`.
    ///
    /// # Errors
    ///
    /// Returns [`LettersError::Config`] if the lesson configuration is invalid.
    pub fn from_config(config: &TutorConfig) -> LettersResult<Self> {
        let session = LessonSession::new(config.lesson.clone())?;
        let handle = Arc::new(ModelHandle::from_path(&config.model));
        let classifier = Arc::new(ClassifierAdapter::new(handle, config.classifier));
        tracing::debug!(
            model = %config.model.display(),
            curriculum = ?config.lesson.curriculum,
            "Tutor configured"
        );
        Ok(Self::new(
            config.canvas,
            session,
            Rasterizer::new(config.raster.clone()),
            classifier,
        ))
    }

    /// Receive lesson events from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LessonEvent> {
        self.events.subscribe()
    }

    /// The drawing surface.
    #[must_use]
    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    /// The lesson session.
    #[must_use]
    pub fn session(&self) -> &LessonSession {
        &self.session
    }

    /// Current lesson state.
    #[must_use]
    pub fn state(&self) -> LessonState {
        self.session.state()
    }

    /// Announce the current target, or completion.
    pub fn announce(&self) {
        match self.session.state() {
            LessonState::Complete => self.emit(LessonEvent::Complete),
            state => {
                if let (Some(index), Some(target)) = (state.index(), self.session.current_target())
                {
                    self.emit(LessonEvent::Prompt {
                        index,
                        target: target.to_string(),
                    });
                }
            }
        }
    }

    /// Apply one command from the input surface.
    ///
    /// # Errors
    ///
    /// Returns [`LettersError::InvalidState`] for a submission that is not
    /// allowed right now, and propagates canvas protocol errors.
    pub fn handle(&mut self, command: Command) -> LettersResult<()> {
        match command {
            Command::Input(event) => {
                self.canvas.process_event(&event)?;
            }
            Command::SelectPencil(pencil) => {
                self.canvas.select_pencil(pencil);
                tracing::debug!(pencil = pencil.name(), "Pencil selected");
            }
            Command::Clear => {
                self.canvas.clear();
                let state = self.session.clear();
                tracing::debug!(?state, "Canvas cleared");
            }
            Command::Submit => self.submit()?,
        }
        Ok(())
    }

    /// Hand the current drawing in for evaluation.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`LettersError::InvalidState`] if nothing is drawn, an
    /// evaluation is already outstanding, the last attempt has not been
    /// cleared, or the lesson is complete.
    pub fn submit(&mut self) -> LettersResult<()> {
        if !self.session.accepts_submission() {
            return Err(LettersError::InvalidState(format!(
                "cannot submit while {:?}",
                self.session.state()
            )));
        }
        if !self.canvas.can_submit() {
            return Err(LettersError::InvalidState(
                "nothing drawn to submit".to_string(),
            ));
        }
        let index = self.session.submit()?;

        let strokes = self.canvas.recorder().snapshot();
        let size = self.canvas.size;
        let rasterizer = self.rasterizer.clone();
        let classifier = Arc::clone(&self.classifier);
        let completions = self.completions_tx.clone();

        tracing::info!(index, strokes = strokes.len(), "Drawing submitted");

        tokio::spawn(async move {
            let rendered =
                tokio::task::spawn_blocking(move || rasterizer.rasterize(&strokes, size)).await;
            let result = match rendered {
                Ok(Ok(buffer)) => classifier.classify(buffer).await,
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Rasterization failed");
                    PredictionResult::failed(e.kind(), e.to_string())
                }
                Err(e) => PredictionResult::failed(
                    ErrorKind::Render,
                    format!("render worker failed: {e}"),
                ),
            };
            if completions.send(Completion { index, result }).await.is_err() {
                tracing::debug!(index, "Tutor dropped before evaluation finished");
            }
        });
        Ok(())
    }

    /// Wait for the outstanding evaluation to finish.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.recv().await
    }

    /// Apply a finished evaluation to the lesson.
    ///
    /// On success the canvas is cleared and the next target (or completion)
    /// is announced.
    ///
    /// # Errors
    ///
    /// Returns [`LettersError::InvalidState`] if the completion does not
    /// belong to the evaluation in progress.
    pub fn apply(&mut self, completion: &Completion) -> LettersResult<Verdict> {
        if self.session.state() != LessonState::Evaluating(completion.index) {
            return Err(LettersError::InvalidState(format!(
                "stale result for index {} while {:?}",
                completion.index,
                self.session.state()
            )));
        }
        let target = self
            .session
            .current_target()
            .map(str::to_string)
            .unwrap_or_default();

        let verdict = self.session.resolve(&completion.result)?;
        self.emit(LessonEvent::from_verdict(&target, verdict.clone()));

        if verdict.is_success() {
            self.session.proceed()?;
            self.canvas.clear();
            self.announce();
        }
        Ok(verdict)
    }

    /// Drive the lesson until it completes or `commands` closes.
    ///
    /// Announces the first target before reading any command.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> LessonState {
        tracing::info!(targets = self.session.curriculum().len(), "Lesson started");
        self.announce();

        while !self.session.is_complete() {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if let Err(e) = self.handle(command) {
                        tracing::warn!(error = %e, "Command rejected");
                    }
                }
                Some(completion) = self.completions_rx.recv() => {
                    if let Err(e) = self.apply(&completion) {
                        tracing::warn!(error = %e, "Evaluation result dropped");
                    }
                }
            }
        }

        let state = self.session.state();
        tracing::info!(?state, "Lesson stopped");
        state
    }

    fn emit(&self, event: LessonEvent) {
        tracing::debug!(event = event.name(), "{}", event.message());
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letters_classifier::{
        ClassifierConfig, ClassifierResult, ImageModel, InputSignature,
    };
    use letters_core::{TouchPhase, DEFAULT_CONFIDENCE_THRESHOLD};
    use letters_renderer::{PixelBuffer, PixelFormat};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Answers with queued distributions over "A" and "B".
    struct Queued {
        labels: Vec<String>,
        answers: Mutex<VecDeque<Vec<f32>>>,
    }

    impl ImageModel for Queued {
        fn signature(&self) -> InputSignature {
            InputSignature {
                width: 224,
                height: 224,
                format: PixelFormat::Bgra8,
            }
        }

        fn labels(&self) -> &[String] {
            &self.labels
        }

        fn predict(&self, _input: &PixelBuffer) -> ClassifierResult<Vec<f32>> {
            Ok(self
                .answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default())
        }
    }

    fn tutor(answers: Vec<Vec<f32>>) -> Tutor {
        let model = Queued {
            labels: vec!["A".into(), "B".into()],
            answers: Mutex::new(answers.into()),
        };
        let handle = Arc::new(ModelHandle::preloaded(Arc::new(model)));
        let classifier = Arc::new(ClassifierAdapter::new(handle, ClassifierConfig::default()));
        Tutor::new(
            CanvasSize::new(224.0, 224.0),
            LessonSession::with_targets(["A", "B"]).unwrap(),
            Rasterizer::with_defaults(),
            classifier,
        )
    }

    fn draw(tutor: &mut Tutor) {
        for (phase, x, y) in [
            (TouchPhase::Start, 40.0, 40.0),
            (TouchPhase::Move, 100.0, 180.0),
            (TouchPhase::End, 160.0, 40.0),
        ] {
            tutor
                .handle(Command::Input(InputEvent::pointer(phase, x, y)))
                .unwrap();
        }
    }

    async fn evaluate(tutor: &mut Tutor) -> Verdict {
        let completion = tutor.next_completion().await.unwrap();
        tutor.apply(&completion).unwrap()
    }

    #[tokio::test]
    async fn test_submit_without_drawing_is_rejected() {
        let mut tutor = tutor(vec![]);
        let err = tutor.handle(Command::Submit).unwrap_err();
        assert!(matches!(err, LettersError::InvalidState(_)));
        assert_eq!(tutor.state(), LessonState::AwaitingSubmission(0));
    }

    #[tokio::test]
    async fn test_second_submit_while_evaluating_is_rejected() {
        let mut tutor = tutor(vec![vec![0.99, 0.01]]);
        draw(&mut tutor);
        tutor.handle(Command::Submit).unwrap();
        assert!(tutor.handle(Command::Submit).is_err());
        assert_eq!(tutor.state(), LessonState::Evaluating(0));
    }

    #[tokio::test]
    async fn test_success_advances_and_clears_canvas() {
        let mut tutor = tutor(vec![vec![0.95, 0.05]]);
        let mut events = tutor.subscribe();
        draw(&mut tutor);
        tutor.handle(Command::Submit).unwrap();

        let verdict = evaluate(&mut tutor).await;

        assert!(verdict.is_success());
        assert_eq!(tutor.state(), LessonState::AwaitingSubmission(1));
        assert!(tutor.canvas().strokes().is_empty());
        assert_eq!(events.recv().await.unwrap().name(), "success");
        assert_eq!(
            events.recv().await.unwrap(),
            LessonEvent::Prompt {
                index: 1,
                target: "B".into()
            }
        );
    }

    #[tokio::test]
    async fn test_low_confidence_requires_clear_before_retry() {
        let mut tutor = tutor(vec![vec![0.6, 0.4], vec![0.97, 0.03]]);
        draw(&mut tutor);
        tutor.handle(Command::Submit).unwrap();

        let verdict = evaluate(&mut tutor).await;
        assert!(matches!(verdict, Verdict::Mismatch { .. }));
        assert_eq!(tutor.state(), LessonState::Retry(0));
        assert!(!tutor.canvas().strokes().is_empty());
        assert!(tutor.handle(Command::Submit).is_err());

        tutor.handle(Command::Clear).unwrap();
        assert_eq!(tutor.state(), LessonState::AwaitingSubmission(0));
        draw(&mut tutor);
        tutor.handle(Command::Submit).unwrap();
        assert!(evaluate(&mut tutor).await.is_success());
    }

    #[tokio::test]
    async fn test_submit_in_retry_starts_no_evaluation() {
        let mut tutor = tutor(vec![vec![0.6, 0.4], vec![0.99, 0.01]]);
        draw(&mut tutor);
        tutor.handle(Command::Submit).unwrap();
        assert!(!evaluate(&mut tutor).await.is_success());

        let err = tutor.submit().unwrap_err();
        assert!(err.to_string().contains("Retry(0)"), "{err}");
        tokio::task::yield_now().await;
        assert!(tutor.completions_rx.try_recv().is_err());
        assert_eq!(tutor.state(), LessonState::Retry(0));
    }

    #[tokio::test]
    async fn test_threshold_is_strict() {
        let exact = DEFAULT_CONFIDENCE_THRESHOLD;
        let mut tutor = tutor(vec![vec![exact, 1.0 - exact]]);
        draw(&mut tutor);
        tutor.handle(Command::Submit).unwrap();
        assert!(!evaluate(&mut tutor).await.is_success());
    }

    #[tokio::test]
    async fn test_inference_failure_routes_to_retry() {
        // An empty distribution is an inference failure.
        let mut tutor = tutor(vec![vec![]]);
        let mut events = tutor.subscribe();
        draw(&mut tutor);
        tutor.handle(Command::Submit).unwrap();

        let verdict = evaluate(&mut tutor).await;
        assert!(matches!(
            verdict,
            Verdict::Error {
                kind: ErrorKind::Inference,
                ..
            }
        ));
        assert_eq!(tutor.state(), LessonState::Retry(0));
        assert_eq!(events.recv().await.unwrap().name(), "error");
    }

    #[tokio::test]
    async fn test_drawing_continues_while_evaluating() {
        let mut tutor = tutor(vec![vec![0.2, 0.8]]);
        draw(&mut tutor);
        tutor.handle(Command::Submit).unwrap();

        tutor
            .handle(Command::Input(InputEvent::pointer(TouchPhase::Start, 10.0, 10.0)))
            .unwrap();
        tutor
            .handle(Command::Input(InputEvent::pointer(TouchPhase::End, 20.0, 20.0)))
            .unwrap();
        assert_eq!(tutor.canvas().strokes().len(), 2);

        evaluate(&mut tutor).await;
        assert_eq!(tutor.state(), LessonState::Retry(0));
    }

    #[tokio::test]
    async fn test_stale_completion_is_rejected() {
        let mut tutor = tutor(vec![]);
        let stale = Completion {
            index: 0,
            result: PredictionResult::label("A", 1.0),
        };
        assert!(tutor.apply(&stale).is_err());
        assert_eq!(tutor.state(), LessonState::AwaitingSubmission(0));
    }

    #[tokio::test]
    async fn test_run_completes_curriculum() {
        let tutor = tutor(vec![vec![0.99, 0.01], vec![0.02, 0.98]]);
        let mut events = tutor.subscribe();
        let (tx, rx) = mpsc::channel(16);
        let driver = tokio::spawn(tutor.run(rx));

        let stroke = [
            Command::Input(InputEvent::pointer(TouchPhase::Start, 50.0, 50.0)),
            Command::Input(InputEvent::pointer(TouchPhase::End, 150.0, 150.0)),
            Command::Submit,
        ];

        let mut names = Vec::new();
        for _ in 0..2 {
            for command in stroke.clone() {
                tx.send(command).await.unwrap();
            }
            loop {
                let event = events.recv().await.unwrap();
                names.push(event.name());
                if event.name() == "success" {
                    break;
                }
            }
        }

        let final_state = driver.await.unwrap();
        while let Ok(event) = events.try_recv() {
            names.push(event.name());
        }

        assert_eq!(final_state, LessonState::Complete);
        assert_eq!(
            names,
            ["prompt", "success", "prompt", "success", "complete"]
        );
    }
}
