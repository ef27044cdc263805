use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Model assets are missing or could not be loaded.
    ModelUnavailable(String),
    /// The frame was malformed or the model run failed.
    Inference(String),
    /// `detect` was called on a backend that is not `Ready`.
    NotReady,
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::ModelUnavailable(msg) => write!(f, "model unavailable: {msg}"),
            BackendError::Inference(msg) => write!(f, "inference error: {msg}"),
            BackendError::NotReady => write!(f, "backend not ready"),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<base::TensorError> for BackendError {
    fn from(err: base::TensorError) -> Self {
        BackendError::Inference(err.to_string())
    }
}
