use {
    crate::{
        BackendError, BackendKind, BackendState, BlazePoseBackend, DetectorOptions, Frame,
        Keypoints, ModelSource, PoseBackend, Runtime, YoloPoseBackend,
    },
    std::sync::Arc,
};

/// Builds uninitialized backends by kind.
pub trait BackendFactory: Send + Sync {
    fn create(&self, kind: BackendKind) -> Box<dyn PoseBackend>;
}

/// Factory for the two model-backed backends sharing one runtime.
pub struct ModelBackendFactory {
    runtime: Arc<dyn Runtime>,
    blazepose_model: ModelSource,
    yolo_model: ModelSource,
    options: DetectorOptions,
}

impl ModelBackendFactory {
    pub fn new(
        runtime: Arc<dyn Runtime>,
        blazepose_model: ModelSource,
        yolo_model: ModelSource,
        options: DetectorOptions,
    ) -> Self {
        Self {
            runtime,
            blazepose_model,
            yolo_model,
            options,
        }
    }

    pub fn model_source(&self, kind: BackendKind) -> &ModelSource {
        match kind {
            BackendKind::BlazePose => &self.blazepose_model,
            BackendKind::YoloPose => &self.yolo_model,
        }
    }
}

impl BackendFactory for ModelBackendFactory {
    fn create(&self, kind: BackendKind) -> Box<dyn PoseBackend> {
        let source = self.model_source(kind).clone();
        match kind {
            BackendKind::BlazePose => Box::new(BlazePoseBackend::new(
                Arc::clone(&self.runtime),
                source,
                self.options,
            )),
            BackendKind::YoloPose => Box::new(YoloPoseBackend::new(
                Arc::clone(&self.runtime),
                source,
                self.options,
            )),
        }
    }
}

/// Owns the active pose backend and swaps it all-or-nothing.
///
/// A replacement is always initialized before the active backend is shut
/// down, so a failed switch leaves the previous backend in place.
pub struct BackendSelector {
    factory: Arc<dyn BackendFactory>,
    active: Option<Box<dyn PoseBackend>>,
}

impl BackendSelector {
    pub fn new(factory: Arc<dyn BackendFactory>) -> Self {
        Self {
            factory,
            active: None,
        }
    }

    /// Create and initialize a backend without touching any selector.
    ///
    /// This is the slow part of a switch (model load) and can run on another
    /// thread while the active backend keeps serving frames.
    pub fn prepare(
        factory: &dyn BackendFactory,
        kind: BackendKind,
    ) -> Result<Box<dyn PoseBackend>, BackendError> {
        let mut backend = factory.create(kind);
        match backend.initialize() {
            Ok(()) => Ok(backend),
            Err(error) => {
                backend.shutdown();
                log::warn!("failed to initialize {} backend: {}", kind, error);
                Err(error)
            }
        }
    }

    /// Make a prepared backend active and shut the previous one down.
    pub fn install(&mut self, backend: Box<dyn PoseBackend>) -> Result<(), BackendError> {
        if backend.state() != BackendState::Ready {
            return Err(BackendError::NotReady);
        }
        let kind = backend.kind();
        if let Some(mut previous) = self.active.replace(backend) {
            previous.shutdown();
        }
        log::info!("active pose backend: {}", kind);
        Ok(())
    }

    /// `prepare` + `install`.
    pub fn switch(&mut self, kind: BackendKind) -> Result<(), BackendError> {
        let backend = Self::prepare(self.factory.as_ref(), kind)?;
        self.install(backend)
    }

    pub fn detect(&mut self, frame: &Frame) -> Result<Keypoints, BackendError> {
        match self.active.as_mut() {
            Some(backend) => backend.detect(frame),
            None => Err(BackendError::NotReady),
        }
    }

    pub fn active_kind(&self) -> Option<BackendKind> {
        self.active.as_ref().map(|backend| backend.kind())
    }

    pub fn factory(&self) -> Arc<dyn BackendFactory> {
        Arc::clone(&self.factory)
    }

    pub fn shutdown(&mut self) {
        if let Some(mut backend) = self.active.take() {
            backend.shutdown();
        }
    }
}

impl Drop for BackendSelector {
    fn drop(&mut self) {
        self.shutdown();
    }
}
