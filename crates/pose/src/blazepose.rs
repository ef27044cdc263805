use {
    crate::{
        BackendError, BackendKind, BackendState, DetectorOptions, Frame, Keypoint, Keypoints,
        LANDMARK_COUNT, ModelSlot, ModelSource, PoseBackend, Runtime, first_input,
        preprocess::{Layout, LetterboxInfo, letterbox},
    },
    base::Tensor,
    std::sync::Arc,
};

/// Square input resolution of the BlazePose landmark model.
pub const BLAZEPOSE_INPUT_SIZE: usize = 256;

/// Landmarks emitted by the model: 33 body landmarks followed by 6 auxiliary ones.
const MODEL_LANDMARKS: usize = 39;

/// `x, y, z, visibility logit, presence logit`
const VALUES_PER_LANDMARK: usize = 5;

const LANDMARK_VALUES: usize = MODEL_LANDMARKS * VALUES_PER_LANDMARK;

/// Rich-landmark backend: a BlazePose full-body landmark model whose 33
/// body landmarks map 1:1 onto the canonical slots.
pub struct BlazePoseBackend {
    model: ModelSlot,
    options: DetectorOptions,
    tracking: bool,
}

impl BlazePoseBackend {
    pub fn new(runtime: Arc<dyn Runtime>, source: ModelSource, options: DetectorOptions) -> Self {
        Self {
            model: ModelSlot::new(runtime, source),
            options,
            tracking: false,
        }
    }

    /// Threshold for the pose flag on the next frame.
    fn threshold(&self) -> f32 {
        if self.tracking {
            self.options.tracking_confidence
        } else {
            self.options.detection_confidence
        }
    }
}

impl PoseBackend for BlazePoseBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::BlazePose
    }

    fn state(&self) -> BackendState {
        self.model.state()
    }

    fn initialize(&mut self) -> Result<(), BackendError> {
        self.tracking = false;
        self.model.load("blazepose")
    }

    fn detect(&mut self, frame: &Frame) -> Result<Keypoints, BackendError> {
        let threshold = self.threshold();
        let session = self.model.session()?;
        let (input, info) = letterbox(frame, BLAZEPOSE_INPUT_SIZE, Layout::Nhwc, 0.0)?;
        let (height, width) = (frame.shape[0], frame.shape[1]);

        let input_name = first_input(session)?;
        let outputs = session.run(&[(input_name.as_str(), input)])?;

        // outputs are told apart by size: landmarks [1, 195], pose flag [1, 1]
        let landmarks = outputs
            .values()
            .find(|tensor| tensor.len() == LANDMARK_VALUES)
            .ok_or_else(|| {
                BackendError::Inference(format!(
                    "no landmark output with {LANDMARK_VALUES} values"
                ))
            })?;
        let pose_flag = outputs
            .values()
            .find(|tensor| tensor.len() == 1)
            .map(|tensor| tensor.data[0])
            .ok_or_else(|| BackendError::Inference("no pose flag output".to_string()))?;

        if pose_flag < threshold {
            if self.tracking {
                log::debug!("blazepose lost track (pose flag {:.2})", pose_flag);
            }
            self.tracking = false;
            return Ok(Keypoints::missing());
        }
        self.tracking = true;

        decode_landmarks(landmarks, &info, width, height)
    }

    fn shutdown(&mut self) {
        if self.model.state() != BackendState::Closed {
            log::info!("blazepose backend shut down");
        }
        self.tracking = false;
        self.model.release();
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Decode the `[1, 195]` landmark tensor into canonical keypoints.
///
/// Coordinates come in model input pixels and are mapped back through the
/// letterbox, then normalized by the frame size. Visibility is the sigmoid of
/// the visibility logit.
pub fn decode_landmarks(
    landmarks: &Tensor<f32>,
    letterbox: &LetterboxInfo,
    frame_width: usize,
    frame_height: usize,
) -> Result<Keypoints, BackendError> {
    if landmarks.len() != LANDMARK_VALUES {
        return Err(BackendError::Inference(format!(
            "landmark output has {} values, expected {}",
            landmarks.len(),
            LANDMARK_VALUES
        )));
    }

    let mut keypoints = [Keypoint::MISSING; LANDMARK_COUNT];
    for (slot, keypoint) in keypoints.iter_mut().enumerate() {
        let base = slot * VALUES_PER_LANDMARK;
        let (x, y) = letterbox.to_frame(landmarks.data[base], landmarks.data[base + 1]);
        let visibility = sigmoid(landmarks.data[base + 3]);
        *keypoint = Keypoint::new(
            x / frame_width as f32,
            y / frame_height as f32,
            if visibility.is_finite() { visibility } else { 0.0 },
        );
    }
    Ok(Keypoints::from_array(keypoints))
}
