use {
    base::Tensor,
    pose::{
        BackendError, BackendFactory, BackendKind, BackendSelector, BackendState,
        DetectorOptions, Frame, Keypoint, Keypoints, Landmark, ModelBackendFactory, ModelSource,
        PoseBackend, Runtime, Session,
    },
    std::{
        collections::HashMap,
        path::PathBuf,
        sync::{Arc, Mutex},
    },
};

/// Backend whose keypoints carry its kind in the nose x coordinate.
struct MockBackend {
    kind: BackendKind,
    fail_init: bool,
    state: BackendState,
    events: Arc<Mutex<Vec<String>>>,
}

impl PoseBackend for MockBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn state(&self) -> BackendState {
        self.state
    }

    fn initialize(&mut self) -> Result<(), BackendError> {
        self.events.lock().unwrap().push(format!("init {}", self.kind));
        if self.fail_init {
            return Err(BackendError::ModelUnavailable("simulated".to_string()));
        }
        self.state = BackendState::Ready;
        Ok(())
    }

    fn detect(&mut self, _frame: &Frame) -> Result<Keypoints, BackendError> {
        if self.state != BackendState::Ready {
            return Err(BackendError::NotReady);
        }
        let mut keypoints = Keypoints::missing();
        let marker = match self.kind {
            BackendKind::BlazePose => 0.25,
            BackendKind::YoloPose => 0.75,
        };
        keypoints.set(Landmark::Nose, Keypoint::new(marker, 0.5, 1.0));
        Ok(keypoints)
    }

    fn shutdown(&mut self) {
        self.events
            .lock()
            .unwrap()
            .push(format!("shutdown {}", self.kind));
        self.state = BackendState::Closed;
    }
}

#[derive(Default)]
struct MockFactory {
    failing: Mutex<Vec<BackendKind>>,
    events: Arc<Mutex<Vec<String>>>,
}

impl MockFactory {
    fn fail(&self, kind: BackendKind) {
        self.failing.lock().unwrap().push(kind);
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl BackendFactory for MockFactory {
    fn create(&self, kind: BackendKind) -> Box<dyn PoseBackend> {
        Box::new(MockBackend {
            kind,
            fail_init: self.failing.lock().unwrap().contains(&kind),
            state: BackendState::Uninitialized,
            events: Arc::clone(&self.events),
        })
    }
}

fn frame() -> Frame {
    Tensor::new(vec![2, 2, 3], vec![0u8; 12]).unwrap()
}

fn nose_x(selector: &mut BackendSelector) -> f32 {
    selector.detect(&frame()).unwrap().get(Landmark::Nose).position.x
}

#[test]
fn test_detect_without_backend_is_not_ready() {
    let mut selector = BackendSelector::new(Arc::new(MockFactory::default()));
    assert_eq!(selector.active_kind(), None);
    assert_eq!(selector.detect(&frame()), Err(BackendError::NotReady));
}

#[test]
fn test_switch_replaces_backend() {
    let factory = Arc::new(MockFactory::default());
    let mut selector = BackendSelector::new(factory.clone());

    selector.switch(BackendKind::BlazePose).unwrap();
    assert_eq!(selector.active_kind(), Some(BackendKind::BlazePose));
    assert_eq!(nose_x(&mut selector), 0.25);

    selector.switch(BackendKind::YoloPose).unwrap();
    assert_eq!(selector.active_kind(), Some(BackendKind::YoloPose));
    assert_eq!(nose_x(&mut selector), 0.75);

    // new backend is up before the old one goes down
    assert_eq!(
        factory.events(),
        vec!["init blazepose", "init yolo", "shutdown blazepose"]
    );
}

#[test]
fn test_failed_switch_keeps_previous_backend() {
    let factory = Arc::new(MockFactory::default());
    factory.fail(BackendKind::YoloPose);
    let mut selector = BackendSelector::new(factory.clone());
    selector.switch(BackendKind::BlazePose).unwrap();

    let result = selector.switch(BackendKind::YoloPose);
    assert!(matches!(result, Err(BackendError::ModelUnavailable(_))));
    assert_eq!(selector.active_kind(), Some(BackendKind::BlazePose));
    assert_eq!(nose_x(&mut selector), 0.25);
    assert_eq!(
        factory.events(),
        vec!["init blazepose", "init yolo", "shutdown yolo"]
    );
}

#[test]
fn test_prepare_then_install() {
    let factory = Arc::new(MockFactory::default());
    let mut selector = BackendSelector::new(factory.clone());
    selector.switch(BackendKind::YoloPose).unwrap();

    let prepared = BackendSelector::prepare(factory.as_ref(), BackendKind::BlazePose).unwrap();
    assert_eq!(prepared.state(), BackendState::Ready);
    // the active backend keeps serving until install
    assert_eq!(nose_x(&mut selector), 0.75);

    selector.install(prepared).unwrap();
    assert_eq!(nose_x(&mut selector), 0.25);
}

#[test]
fn test_install_rejects_unready_backend() {
    let factory = Arc::new(MockFactory::default());
    let mut selector = BackendSelector::new(factory.clone());
    selector.switch(BackendKind::BlazePose).unwrap();

    let raw = factory.create(BackendKind::YoloPose);
    assert_eq!(selector.install(raw), Err(BackendError::NotReady));
    assert_eq!(selector.active_kind(), Some(BackendKind::BlazePose));
}

#[test]
fn test_shutdown_and_drop_release_backend() {
    let factory = Arc::new(MockFactory::default());
    {
        let mut selector = BackendSelector::new(factory.clone());
        selector.switch(BackendKind::YoloPose).unwrap();
        selector.shutdown();
        assert_eq!(selector.active_kind(), None);
        selector.switch(BackendKind::BlazePose).unwrap();
    }
    assert_eq!(
        factory.events(),
        vec!["init yolo", "shutdown yolo", "init blazepose", "shutdown blazepose"]
    );
}

#[test]
fn test_backend_kind_parsing_and_display() {
    assert_eq!("blazepose".parse::<BackendKind>(), Ok(BackendKind::BlazePose));
    assert_eq!("MediaPipe".parse::<BackendKind>(), Ok(BackendKind::BlazePose));
    assert_eq!("yolo".parse::<BackendKind>(), Ok(BackendKind::YoloPose));
    assert_eq!(" yolo-pose ".parse::<BackendKind>(), Ok(BackendKind::YoloPose));
    assert!("openpose".parse::<BackendKind>().is_err());

    assert_eq!(BackendKind::BlazePose.to_string(), "blazepose");
    assert_eq!(BackendKind::YoloPose.to_string(), "yolo");
    assert_eq!(BackendKind::YoloPose.other(), BackendKind::BlazePose);
}

#[test]
fn test_backend_kind_serde() {
    assert_eq!(
        serde_json::to_string(&BackendKind::YoloPose).unwrap(),
        "\"yolo\""
    );
    let kind: BackendKind = serde_json::from_str("\"mediapipe\"").unwrap();
    assert_eq!(kind, BackendKind::BlazePose);
}

struct NeverRuntime;

impl Runtime for NeverRuntime {
    fn name(&self) -> &str {
        "never"
    }

    fn load_model(&self, _model: &ModelSource) -> Result<Box<dyn Session>, BackendError> {
        panic!("runtime must not be asked to load a missing file");
    }
}

#[derive(Default)]
struct EchoSession {
    names: Vec<String>,
}

impl Session for EchoSession {
    fn run(
        &mut self,
        _inputs: &[(&str, Tensor<f32>)],
    ) -> Result<HashMap<String, Tensor<f32>>, BackendError> {
        Ok(HashMap::new())
    }

    fn input_names(&self) -> &[String] {
        &self.names
    }

    fn output_names(&self) -> &[String] {
        &self.names
    }
}

struct NoInputRuntime;

impl Runtime for NoInputRuntime {
    fn name(&self) -> &str {
        "no-input"
    }

    fn load_model(&self, _model: &ModelSource) -> Result<Box<dyn Session>, BackendError> {
        Ok(Box::new(EchoSession::default()))
    }
}

#[test]
fn test_model_factory_missing_file_is_unavailable() {
    let factory = ModelBackendFactory::new(
        Arc::new(NeverRuntime),
        ModelSource::File(PathBuf::from("/nonexistent/blazepose.onnx")),
        ModelSource::File(PathBuf::from("/nonexistent/yolo.onnx")),
        DetectorOptions::default(),
    );
    for kind in BackendKind::ALL {
        let backend = factory.create(kind);
        assert_eq!(backend.kind(), kind);
        assert_eq!(backend.state(), BackendState::Uninitialized);
        assert!(matches!(
            BackendSelector::prepare(&factory, kind),
            Err(BackendError::ModelUnavailable(_))
        ));
    }
}

#[test]
fn test_model_without_inputs_is_unavailable() {
    let factory = ModelBackendFactory::new(
        Arc::new(NoInputRuntime),
        ModelSource::Memory(vec![1]),
        ModelSource::Memory(vec![1]),
        DetectorOptions::default(),
    );
    assert!(matches!(
        BackendSelector::prepare(&factory, BackendKind::YoloPose),
        Err(BackendError::ModelUnavailable(_))
    ));
}
