use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// A catalog entry failed validation. Nothing from that load is registered.
    InvalidExerciseDefinition { id: u32, reason: String },
    /// The catalog could not be read or parsed.
    Catalog(String),
    /// No exercise with this id is registered.
    UnknownExercise(u32),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidExerciseDefinition { id, reason } => {
                write!(f, "invalid exercise definition {id}: {reason}")
            }
            RegistryError::Catalog(msg) => write!(f, "catalog error: {msg}"),
            RegistryError::UnknownExercise(id) => write!(f, "unknown exercise id {id}"),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Catalog(err.to_string())
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::Catalog(err.to_string())
    }
}
