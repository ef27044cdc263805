use {
    exercise::{Color, Phase},
    pose::{BackendKind, Frame, Keypoints, Landmark},
};

/// Everything the display needs for one tick. Plain data, no callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub exercise_id: u32,
    pub exercise_name: String,
    pub tip: String,
    /// The active exercise's joint triplet, vertex in the middle.
    pub joints: [Landmark; 3],
    pub reps: u32,
    pub phase: Phase,
    /// `None` when the joints were not visible enough to measure.
    pub angle: Option<f32>,
    pub message: String,
    pub color: Color,
    pub backend: Option<BackendKind>,
    /// Set while a backend switch to this kind is being prepared.
    pub loading: Option<BackendKind>,
    pub keypoints: Keypoints,
}

/// A captured frame and the pipeline's verdict on it.
#[derive(Debug)]
pub struct Tick {
    pub frame: Frame,
    pub snapshot: Snapshot,
}
