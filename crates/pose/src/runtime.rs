use {
    crate::{BackendError, BackendState},
    base::Tensor,
    std::{collections::HashMap, fmt, path::PathBuf, sync::Arc},
};

#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    File(PathBuf),
    Memory(Vec<u8>),
}

impl ModelSource {
    /// Fails with `ModelUnavailable` if the model bytes cannot possibly be loaded.
    pub fn check_available(&self) -> Result<(), BackendError> {
        match self {
            ModelSource::File(path) if !path.is_file() => Err(BackendError::ModelUnavailable(
                format!("model file not found: {}", path.display()),
            )),
            ModelSource::Memory(bytes) if bytes.is_empty() => Err(
                BackendError::ModelUnavailable("in-memory model is empty".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::File(path) => write!(f, "{}", path.display()),
            ModelSource::Memory(bytes) => write!(f, "<{} bytes in memory>", bytes.len()),
        }
    }
}

/// A loaded model that maps named input tensors to named output tensors.
pub trait Session: Send {
    fn run(
        &mut self,
        inputs: &[(&str, Tensor<f32>)],
    ) -> Result<HashMap<String, Tensor<f32>>, BackendError>;
    fn input_names(&self) -> &[String];
    fn output_names(&self) -> &[String];
}

/// Something that can turn model bytes into a [`Session`].
pub trait Runtime: Send + Sync {
    fn name(&self) -> &str;
    fn load_model(&self, model: &ModelSource) -> Result<Box<dyn Session>, BackendError>;
}

/// Session bookkeeping shared by the model-backed pose backends.
pub(crate) struct ModelSlot {
    runtime: Arc<dyn Runtime>,
    source: ModelSource,
    session: Option<Box<dyn Session>>,
    closed: bool,
}

impl ModelSlot {
    pub(crate) fn new(runtime: Arc<dyn Runtime>, source: ModelSource) -> Self {
        Self {
            runtime,
            source,
            session: None,
            closed: false,
        }
    }

    pub(crate) fn state(&self) -> BackendState {
        match (&self.session, self.closed) {
            (_, true) => BackendState::Closed,
            (Some(_), false) => BackendState::Ready,
            (None, false) => BackendState::Uninitialized,
        }
    }

    pub(crate) fn load(&mut self, label: &str) -> Result<(), BackendError> {
        match self.state() {
            BackendState::Ready => return Ok(()),
            BackendState::Closed => return Err(BackendError::NotReady),
            BackendState::Uninitialized => {}
        }
        self.source.check_available()?;
        let session = self.runtime.load_model(&self.source)?;
        if session.input_names().is_empty() {
            return Err(BackendError::ModelUnavailable(format!(
                "{label} model {} declares no inputs",
                self.source
            )));
        }
        log::info!(
            "{} model loaded from {} on {} runtime",
            label,
            self.source,
            self.runtime.name()
        );
        self.session = Some(session);
        Ok(())
    }

    pub(crate) fn session(&mut self) -> Result<&mut (dyn Session + 'static), BackendError> {
        if self.closed {
            return Err(BackendError::NotReady);
        }
        match self.session.as_deref_mut() {
            Some(session) => Ok(session),
            None => Err(BackendError::NotReady),
        }
    }

    pub(crate) fn release(&mut self) {
        self.session = None;
        self.closed = true;
    }
}

/// Name of the first model input.
pub(crate) fn first_input(session: &dyn Session) -> Result<String, BackendError> {
    session
        .input_names()
        .first()
        .cloned()
        .ok_or_else(|| BackendError::Inference("model has no inputs".to_string()))
}
