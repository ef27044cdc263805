use {
    crate::{Command, Snapshot, TrainerError},
    exercise::{Feedback, Phase, Registry, RepCounter, RepUpdate},
    pose::{BackendError, BackendKind, BackendSelector, Frame, Keypoints, PoseBackend},
    std::sync::Arc,
};

/// The per-frame core: detect, guard, measure, count.
///
/// Owns the active backend and the live rep counter. Whoever holds the
/// pipeline is its only writer; concurrent callers go through [`Command`]s.
pub struct Pipeline {
    registry: Arc<Registry>,
    selector: BackendSelector,
    counter: RepCounter,
    min_visibility: f32,
    loading: Option<BackendKind>,
    // newest switch generation the worker has heard of
    latest_switch: u64,
    last_update: RepUpdate,
    last_keypoints: Keypoints,
}

fn idle_update() -> RepUpdate {
    RepUpdate {
        phase: Phase::Up,
        reps: 0,
        angle: None,
        feedback: Feedback::Neutral,
        completed_rep: false,
    }
}

impl Pipeline {
    pub fn new(
        registry: Arc<Registry>,
        selector: BackendSelector,
        exercise_id: u32,
        min_visibility: f32,
    ) -> Result<Self, TrainerError> {
        let exercise = registry.require(exercise_id)?.clone();
        Ok(Self {
            counter: RepCounter::new(exercise, min_visibility),
            registry,
            selector,
            min_visibility,
            loading: None,
            latest_switch: 0,
            last_update: idle_update(),
            last_keypoints: Keypoints::missing(),
        })
    }

    /// Run one frame through the active backend and the rep counter.
    ///
    /// A failed detection counts as "nobody visible": the counter is left
    /// alone and the tick reports out-of-frame.
    pub fn process(&mut self, frame: &Frame) -> Snapshot {
        let (keypoints, update) = match self.selector.detect(frame) {
            Ok(keypoints) => (keypoints, self.counter.update_keypoints(&keypoints)),
            Err(BackendError::NotReady) => {
                log::error!("no pose backend is ready");
                (Keypoints::missing(), self.counter.out_of_frame())
            }
            Err(error) => {
                log::warn!("detection failed, tick skipped: {}", error);
                (Keypoints::missing(), self.counter.out_of_frame())
            }
        };
        self.last_keypoints = keypoints;
        self.last_update = update;
        self.snapshot()
    }

    /// Start a fresh counter for another exercise. Unknown ids leave the
    /// current exercise and its progress untouched.
    pub fn select_exercise(&mut self, id: u32) -> Result<(), TrainerError> {
        let exercise = self.registry.require(id)?.clone();
        log::info!("exercise selected: {} ({})", exercise.name, id);
        self.counter = RepCounter::new(exercise, self.min_visibility);
        self.last_update = idle_update();
        Ok(())
    }

    pub fn reset_reps(&mut self) {
        self.counter.reset();
        self.last_update = idle_update();
    }

    /// Load and activate another backend in place, blocking on the model load.
    pub fn switch_backend(&mut self, kind: BackendKind) -> Result<(), TrainerError> {
        self.selector.switch(kind)?;
        Ok(())
    }

    /// Show that a switch to `kind` is under way. A request older than one
    /// already seen is ignored.
    pub fn begin_switch(&mut self, kind: BackendKind, generation: u64) {
        if generation <= self.latest_switch {
            log::debug!("switch {} to {} already superseded", generation, kind);
            return;
        }
        self.latest_switch = generation;
        self.loading = Some(kind);
    }

    /// Activate a backend prepared elsewhere, unless a newer switch was
    /// requested meanwhile. A superseded backend is shut down unused.
    pub fn install_backend(
        &mut self,
        mut backend: Box<dyn PoseBackend>,
        generation: u64,
    ) -> Result<(), TrainerError> {
        if generation < self.latest_switch {
            log::info!(
                "dropping {} backend from superseded switch {}",
                backend.kind(),
                generation
            );
            backend.shutdown();
            return Ok(());
        }
        self.latest_switch = generation;
        self.loading = None;
        self.selector.install(backend)?;
        Ok(())
    }

    pub fn abort_switch(&mut self, kind: BackendKind, generation: u64, error: &BackendError) {
        if generation >= self.latest_switch {
            self.latest_switch = generation;
            self.loading = None;
        }
        log::warn!(
            "switch to {} failed, keeping {}: {}",
            kind,
            self.active_backend()
                .map(|active| active.name())
                .unwrap_or("no backend"),
            error
        );
    }

    /// Apply a user command. Failures are logged and leave the pipeline as it was.
    pub fn apply(&mut self, command: Command) {
        let result = match command {
            Command::SelectExercise(id) => self.select_exercise(id),
            Command::ResetReps => {
                self.reset_reps();
                Ok(())
            }
            Command::BeginSwitch { kind, generation } => {
                self.begin_switch(kind, generation);
                Ok(())
            }
            Command::InstallBackend {
                backend,
                generation,
            } => self.install_backend(backend, generation),
            Command::AbortSwitch {
                kind,
                generation,
                error,
            } => {
                self.abort_switch(kind, generation, &error);
                Ok(())
            }
        };
        if let Err(error) = result {
            log::warn!("command rejected: {}", error);
        }
    }

    /// The state as of the last processed frame.
    pub fn snapshot(&self) -> Snapshot {
        let exercise = self.counter.exercise();
        Snapshot {
            exercise_id: exercise.id,
            exercise_name: exercise.name.clone(),
            tip: exercise.tip.clone(),
            joints: exercise.joints,
            reps: self.counter.reps(),
            phase: self.counter.phase(),
            angle: self.last_update.angle,
            message: self.last_update.feedback.message().to_string(),
            color: self.last_update.feedback.color(),
            backend: self.active_backend(),
            loading: self.loading,
            keypoints: self.last_keypoints,
        }
    }

    pub fn counter(&self) -> &RepCounter {
        &self.counter
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn selector(&self) -> &BackendSelector {
        &self.selector
    }

    pub fn active_backend(&self) -> Option<BackendKind> {
        self.selector.active_kind()
    }

    pub fn shutdown(&mut self) {
        self.selector.shutdown();
    }
}
