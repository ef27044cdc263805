use {
    pose::{BackendError, BackendKind, PoseBackend},
    std::fmt,
};

/// User actions, applied by the worker between frames.
///
/// Backend switches carry a generation, increasing with every request made
/// through a handle. Only the newest requested switch may install.
pub enum Command {
    SelectExercise(u32),
    ResetReps,
    /// A backend of this kind is being prepared off the worker.
    BeginSwitch {
        kind: BackendKind,
        generation: u64,
    },
    /// The prepared backend, ready to replace the active one.
    InstallBackend {
        backend: Box<dyn PoseBackend>,
        generation: u64,
    },
    /// Preparing the backend failed; the active backend stays.
    AbortSwitch {
        kind: BackendKind,
        generation: u64,
        error: BackendError,
    },
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SelectExercise(id) => f.debug_tuple("SelectExercise").field(id).finish(),
            Command::ResetReps => f.write_str("ResetReps"),
            Command::BeginSwitch { kind, generation } => f
                .debug_struct("BeginSwitch")
                .field("kind", kind)
                .field("generation", generation)
                .finish(),
            Command::InstallBackend {
                backend,
                generation,
            } => f
                .debug_struct("InstallBackend")
                .field("kind", &backend.kind())
                .field("generation", generation)
                .finish(),
            Command::AbortSwitch {
                kind,
                generation,
                error,
            } => f
                .debug_struct("AbortSwitch")
                .field("kind", kind)
                .field("generation", generation)
                .field("error", error)
                .finish(),
        }
    }
}
