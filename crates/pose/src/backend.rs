use {
    crate::{BackendError, Frame, Keypoints},
    serde::{Deserialize, Serialize},
    std::{fmt, str::FromStr},
};

/// Which pose model family a backend runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// 33-landmark model, native vocabulary equals the canonical set.
    #[serde(rename = "blazepose", alias = "mediapipe")]
    BlazePose,
    /// 17-keypoint COCO model, mapped into the canonical set.
    #[serde(rename = "yolo", alias = "yolo-pose")]
    YoloPose,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::BlazePose, BackendKind::YoloPose];

    pub const fn name(self) -> &'static str {
        match self {
            BackendKind::BlazePose => "blazepose",
            BackendKind::YoloPose => "yolo",
        }
    }

    /// The other backend, for toggling.
    pub const fn other(self) -> BackendKind {
        match self {
            BackendKind::BlazePose => BackendKind::YoloPose,
            BackendKind::YoloPose => BackendKind::BlazePose,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blazepose" | "mediapipe" => Ok(BackendKind::BlazePose),
            "yolo" | "yolo-pose" => Ok(BackendKind::YoloPose),
            other => Err(format!(
                "unknown pose backend: {other:?}, expected \"blazepose\" or \"yolo\""
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    Uninitialized,
    Ready,
    Closed,
}

/// Confidence thresholds handed to a backend at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorOptions {
    /// Minimum score to accept a person when not tracking one.
    pub detection_confidence: f32,
    /// Minimum score to keep a person that was found on the previous frame.
    pub tracking_confidence: f32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            detection_confidence: 0.55,
            tracking_confidence: 0.55,
        }
    }
}

/// A pose estimator producing canonical keypoints.
///
/// Lifecycle is `Uninitialized -> Ready -> Closed`. `detect` only works while
/// `Ready`. A frame without a person is not an error: it yields
/// [`Keypoints::missing`].
pub trait PoseBackend: Send {
    fn kind(&self) -> BackendKind;
    fn state(&self) -> BackendState;
    fn initialize(&mut self) -> Result<(), BackendError>;
    fn detect(&mut self, frame: &Frame) -> Result<Keypoints, BackendError>;
    fn shutdown(&mut self);
}

/// `(height, width)` of a well-formed RGB frame, or an inference error.
pub fn frame_dimensions(frame: &Frame) -> Result<(usize, usize), BackendError> {
    match frame.hwc() {
        Some((h, w, 3)) if h > 0 && w > 0 => Ok((h, w)),
        _ => Err(BackendError::Inference(format!(
            "malformed frame: expected [H, W, 3] with matching data, got shape {:?} and {} bytes",
            frame.shape,
            frame.len()
        ))),
    }
}
