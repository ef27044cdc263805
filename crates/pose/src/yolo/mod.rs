//! Compact-landmark backend: YOLO pose models with 17 COCO keypoints.

mod postprocess;
pub use postprocess::*;

use {
    crate::{
        BackendError, BackendKind, BackendState, DetectorOptions, Frame, Keypoints, ModelSlot,
        ModelSource, PoseBackend, Runtime, first_input,
        preprocess::{Layout, letterbox},
    },
    std::sync::Arc,
};

/// Square input resolution of YOLO pose models.
pub const YOLO_INPUT_SIZE: usize = 640;

/// Gray padding in normalized range
const PAD_VALUE: f32 = 114.0 / 255.0;

pub const NMS_IOU_THRESHOLD: f32 = 0.45;

pub struct YoloPoseBackend {
    model: ModelSlot,
    options: DetectorOptions,
}

impl YoloPoseBackend {
    pub fn new(runtime: Arc<dyn Runtime>, source: ModelSource, options: DetectorOptions) -> Self {
        Self {
            model: ModelSlot::new(runtime, source),
            options,
        }
    }
}

impl PoseBackend for YoloPoseBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::YoloPose
    }

    fn state(&self) -> BackendState {
        self.model.state()
    }

    fn initialize(&mut self) -> Result<(), BackendError> {
        self.model.load("yolo")
    }

    fn detect(&mut self, frame: &Frame) -> Result<Keypoints, BackendError> {
        let session = self.model.session()?;
        let (input, info) = letterbox(frame, YOLO_INPUT_SIZE, Layout::Nchw, PAD_VALUE)?;
        let (height, width) = (frame.shape[0], frame.shape[1]);

        let input_name = first_input(session)?;
        let output_name = session
            .output_names()
            .first()
            .cloned()
            .ok_or_else(|| BackendError::Inference("model has no outputs".to_string()))?;
        let mut outputs = session.run(&[(input_name.as_str(), input)])?;
        let output = outputs.remove(&output_name).ok_or_else(|| {
            BackendError::Inference(format!("output {output_name:?} missing from results"))
        })?;

        let detections = postprocess(
            &output,
            &info,
            self.options.detection_confidence,
            NMS_IOU_THRESHOLD,
        )?;
        Ok(match best_person(&detections) {
            Some(person) => person.to_keypoints(width, height),
            None => Keypoints::missing(),
        })
    }

    fn shutdown(&mut self) {
        if self.model.state() != BackendState::Closed {
            log::info!("yolo backend shut down");
        }
        self.model.release();
    }
}
