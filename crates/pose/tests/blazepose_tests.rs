use {
    base::Tensor,
    pose::{
        BLAZEPOSE_INPUT_SIZE, BackendError, BackendKind, BackendState, BlazePoseBackend,
        DetectorOptions, Landmark, ModelSource, PoseBackend, Runtime, Session, decode_landmarks,
        preprocess::LetterboxInfo,
    },
    std::{
        collections::{HashMap, VecDeque},
        path::PathBuf,
        sync::{Arc, Mutex},
    },
};

/// Replays pose flags; every landmark sits at model pixel (128, 64) with visibility logit 4.
struct MockSession {
    flags: Arc<Mutex<VecDeque<f32>>>,
    input_shapes: Arc<Mutex<Vec<Vec<usize>>>>,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl Session for MockSession {
    fn run(
        &mut self,
        inputs: &[(&str, Tensor<f32>)],
    ) -> Result<HashMap<String, Tensor<f32>>, BackendError> {
        self.input_shapes
            .lock()
            .unwrap()
            .push(inputs[0].1.shape.clone());
        let flag = self.flags.lock().unwrap().pop_front().unwrap_or(1.0);

        let mut landmarks = vec![0.0; 195];
        for slot in 0..39 {
            landmarks[slot * 5] = 128.0;
            landmarks[slot * 5 + 1] = 64.0;
            landmarks[slot * 5 + 3] = 4.0;
        }

        let mut outputs = HashMap::new();
        outputs.insert(
            "Identity".to_string(),
            Tensor::new(vec![1, 195], landmarks).unwrap(),
        );
        outputs.insert(
            "Identity_1".to_string(),
            Tensor::new(vec![1, 1], vec![flag]).unwrap(),
        );
        outputs.insert(
            "Identity_2".to_string(),
            Tensor::new(vec![1, 2, 2, 1], vec![0.0; 4]).unwrap(),
        );
        Ok(outputs)
    }

    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }
}

#[derive(Default)]
struct MockRuntime {
    flags: Arc<Mutex<VecDeque<f32>>>,
    input_shapes: Arc<Mutex<Vec<Vec<usize>>>>,
}

impl Runtime for MockRuntime {
    fn name(&self) -> &str {
        "mock"
    }

    fn load_model(&self, _model: &ModelSource) -> Result<Box<dyn Session>, BackendError> {
        Ok(Box::new(MockSession {
            flags: Arc::clone(&self.flags),
            input_shapes: Arc::clone(&self.input_shapes),
            input_names: vec!["input_1".to_string()],
            output_names: vec![
                "Identity".to_string(),
                "Identity_1".to_string(),
                "Identity_2".to_string(),
            ],
        }))
    }
}

fn model() -> ModelSource {
    ModelSource::Memory(vec![1, 2, 3])
}

/// 128 x 128 frame, so the letterbox scale is exactly 2 with no padding.
fn frame() -> Tensor<u8> {
    Tensor::new(vec![128, 128, 3], vec![0u8; 128 * 128 * 3]).unwrap()
}

#[test]
fn test_lifecycle() {
    let mut backend =
        BlazePoseBackend::new(Arc::new(MockRuntime::default()), model(), DetectorOptions::default());
    assert_eq!(backend.kind(), BackendKind::BlazePose);
    assert_eq!(backend.state(), BackendState::Uninitialized);
    assert_eq!(backend.detect(&frame()), Err(BackendError::NotReady));

    backend.initialize().unwrap();
    assert_eq!(backend.state(), BackendState::Ready);
    assert!(backend.detect(&frame()).is_ok());

    backend.shutdown();
    assert_eq!(backend.state(), BackendState::Closed);
    assert_eq!(backend.detect(&frame()), Err(BackendError::NotReady));
}

#[test]
fn test_missing_model_file() {
    let missing = PathBuf::from("/nonexistent/repcoach/pose_landmark_full.onnx");
    let mut backend = BlazePoseBackend::new(
        Arc::new(MockRuntime::default()),
        ModelSource::File(missing),
        DetectorOptions::default(),
    );
    assert!(matches!(
        backend.initialize(),
        Err(BackendError::ModelUnavailable(_))
    ));
    assert_eq!(backend.state(), BackendState::Uninitialized);
}

#[test]
fn test_detect_decodes_all_slots() {
    let runtime = Arc::new(MockRuntime::default());
    let mut backend =
        BlazePoseBackend::new(runtime.clone(), model(), DetectorOptions::default());
    backend.initialize().unwrap();

    let keypoints = backend.detect(&frame()).unwrap();
    for (_, keypoint) in keypoints.iter() {
        assert!((keypoint.position.x - 0.5).abs() < 1e-6);
        assert!((keypoint.position.y - 0.25).abs() < 1e-6);
        assert!(keypoint.visibility > 0.98);
    }

    let shapes = runtime.input_shapes.lock().unwrap();
    assert_eq!(
        shapes[0],
        vec![1, BLAZEPOSE_INPUT_SIZE, BLAZEPOSE_INPUT_SIZE, 3]
    );
}

#[test]
fn test_low_pose_flag_means_nobody() {
    let runtime = Arc::new(MockRuntime::default());
    runtime.flags.lock().unwrap().push_back(0.1);
    let mut backend =
        BlazePoseBackend::new(runtime.clone(), model(), DetectorOptions::default());
    backend.initialize().unwrap();

    let keypoints = backend.detect(&frame()).unwrap();
    assert!(!keypoints.any_visible());
    assert_eq!(keypoints.get(Landmark::Nose).visibility, 0.0);
}

#[test]
fn test_tracking_threshold_applies_after_first_detection() {
    let runtime = Arc::new(MockRuntime::default());
    runtime
        .flags
        .lock()
        .unwrap()
        .extend([0.5, 0.9, 0.5, 0.2, 0.5]);
    let options = DetectorOptions {
        detection_confidence: 0.8,
        tracking_confidence: 0.3,
    };
    let mut backend = BlazePoseBackend::new(runtime.clone(), model(), options);
    backend.initialize().unwrap();

    let seen: Vec<bool> = (0..5)
        .map(|_| backend.detect(&frame()).unwrap().any_visible())
        .collect();
    // 0.5 < detection, 0.9 found, 0.5 kept while tracking, 0.2 lost, 0.5 < detection again
    assert_eq!(seen, vec![false, true, true, false, false]);
}

#[test]
fn test_malformed_frame_is_inference_error() {
    let mut backend =
        BlazePoseBackend::new(Arc::new(MockRuntime::default()), model(), DetectorOptions::default());
    backend.initialize().unwrap();
    let bad = Tensor::new(vec![4, 4], vec![0u8; 16]).unwrap();
    assert!(matches!(
        backend.detect(&bad),
        Err(BackendError::Inference(_))
    ));
    // backend stays usable
    assert!(backend.detect(&frame()).is_ok());
}

#[test]
fn test_decode_landmarks_rejects_wrong_size() {
    let landmarks = Tensor::new(vec![1, 10], vec![0.0; 10]).unwrap();
    let info = LetterboxInfo {
        scale: 1.0,
        pad_x: 0.0,
        pad_y: 0.0,
    };
    assert!(decode_landmarks(&landmarks, &info, 100, 100).is_err());
}

#[test]
fn test_decode_landmarks_undoes_padding() {
    let mut data = vec![0.0; 195];
    let knee = Landmark::LeftKnee.index() * 5;
    data[knee] = 40.0;
    data[knee + 1] = 90.0;
    data[knee + 3] = 0.0;
    let landmarks = Tensor::new(vec![1, 195], data).unwrap();
    let info = LetterboxInfo {
        scale: 0.5,
        pad_x: 0.0,
        pad_y: 30.0,
    };

    let keypoints = decode_landmarks(&landmarks, &info, 200, 240).unwrap();
    let knee = keypoints.get(Landmark::LeftKnee);
    assert!((knee.position.x - 0.4).abs() < 1e-6);
    assert!((knee.position.y - 0.5).abs() < 1e-6);
    assert!((knee.visibility - 0.5).abs() < 1e-6);
}
