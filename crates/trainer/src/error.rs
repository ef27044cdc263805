use {exercise::RegistryError, pose::BackendError, std::fmt};

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureError {
    Device(String),
    Stream(String),
    Decode(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Device(msg) => write!(f, "device error: {msg}"),
            CaptureError::Stream(msg) => write!(f, "stream error: {msg}"),
            CaptureError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Device(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainerError {
    Backend(BackendError),
    Registry(RegistryError),
    Capture(CaptureError),
    Config(String),
    Channel(String),
}

impl fmt::Display for TrainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainerError::Backend(err) => write!(f, "backend error: {err}"),
            TrainerError::Registry(err) => write!(f, "registry error: {err}"),
            TrainerError::Capture(err) => write!(f, "capture error: {err}"),
            TrainerError::Config(msg) => write!(f, "config error: {msg}"),
            TrainerError::Channel(msg) => write!(f, "channel error: {msg}"),
        }
    }
}

impl std::error::Error for TrainerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrainerError::Backend(err) => Some(err),
            TrainerError::Registry(err) => Some(err),
            TrainerError::Capture(err) => Some(err),
            TrainerError::Config(_) | TrainerError::Channel(_) => None,
        }
    }
}

impl From<BackendError> for TrainerError {
    fn from(err: BackendError) -> Self {
        TrainerError::Backend(err)
    }
}

impl From<RegistryError> for TrainerError {
    fn from(err: RegistryError) -> Self {
        TrainerError::Registry(err)
    }
}

impl From<CaptureError> for TrainerError {
    fn from(err: CaptureError) -> Self {
        TrainerError::Capture(err)
    }
}
