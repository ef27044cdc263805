use {
    crate::TrainerError,
    exercise::DEFAULT_MIN_VISIBILITY,
    pose::{BackendKind, DetectorOptions},
    std::{path::PathBuf, str::FromStr},
};

/// Where the default YOLO pose model is published.
pub const DEFAULT_YOLO_MODEL_URL: &str =
    "https://github.com/ultralytics/assets/releases/download/v8.3.0/yolo11n-pose.onnx";

/// Configuration for a training session.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainerConfig {
    device: String,
    width: u32,
    height: u32,
    fps: u32,
    mirror: bool,
    detection_confidence: f32,
    tracking_confidence: f32,
    min_landmark_visibility: f32,
    backend: BackendKind,
    blazepose_model: PathBuf,
    yolo_model: PathBuf,
    blazepose_model_url: Option<String>,
    yolo_model_url: Option<String>,
    exercise: u32,
    catalog: Option<PathBuf>,
    log_dir: Option<PathBuf>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        let detector = DetectorOptions::default();
        Self {
            device: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            fps: 30,
            mirror: true,
            detection_confidence: detector.detection_confidence,
            tracking_confidence: detector.tracking_confidence,
            min_landmark_visibility: DEFAULT_MIN_VISIBILITY,
            backend: BackendKind::BlazePose,
            blazepose_model: PathBuf::from("models/pose_landmark_full.onnx"),
            yolo_model: PathBuf::from("models/yolo11n-pose.onnx"),
            blazepose_model_url: None,
            yolo_model_url: Some(DEFAULT_YOLO_MODEL_URL.to_string()),
            exercise: 0,
            catalog: None,
            log_dir: None,
        }
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, TrainerError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| TrainerError::Config(format!("{key}={value:?}: {e}")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, TrainerError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(TrainerError::Config(format!(
            "{key}={value:?}: expected a boolean"
        ))),
    }
}

impl TrainerConfig {
    /// Defaults overlaid with `REPCOACH_*` environment variables.
    pub fn from_env() -> Result<Self, TrainerError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values looked up by `REPCOACH_*` key. Unset keys keep their current value.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, TrainerError> {
        let get = |key: &str| lookup(key).map(|value| (key.to_string(), value));

        if let Some((_, value)) = get("REPCOACH_CAMERA") {
            self.device = value;
        }
        if let Some((key, value)) = get("REPCOACH_WIDTH") {
            self.width = parse(&key, &value)?;
        }
        if let Some((key, value)) = get("REPCOACH_HEIGHT") {
            self.height = parse(&key, &value)?;
        }
        if let Some((key, value)) = get("REPCOACH_FPS") {
            self.fps = parse(&key, &value)?;
        }
        if let Some((key, value)) = get("REPCOACH_MIRROR") {
            self.mirror = parse_bool(&key, &value)?;
        }
        if let Some((key, value)) = get("REPCOACH_DETECTION_CONFIDENCE") {
            self.detection_confidence = parse(&key, &value)?;
        }
        if let Some((key, value)) = get("REPCOACH_TRACKING_CONFIDENCE") {
            self.tracking_confidence = parse(&key, &value)?;
        }
        if let Some((key, value)) = get("REPCOACH_MIN_VISIBILITY") {
            self.min_landmark_visibility = parse(&key, &value)?;
        }
        if let Some((key, value)) = get("REPCOACH_BACKEND") {
            self.backend = parse(&key, &value)?;
        }
        if let Some((_, value)) = get("REPCOACH_BLAZEPOSE_MODEL") {
            self.blazepose_model = value.into();
        }
        if let Some((_, value)) = get("REPCOACH_YOLO_MODEL") {
            self.yolo_model = value.into();
        }
        // an empty url turns fetching off
        let url = |value: String| Some(value).filter(|url| !url.trim().is_empty());
        if let Some((_, value)) = get("REPCOACH_BLAZEPOSE_MODEL_URL") {
            self.blazepose_model_url = url(value);
        }
        if let Some((_, value)) = get("REPCOACH_YOLO_MODEL_URL") {
            self.yolo_model_url = url(value);
        }
        if let Some((key, value)) = get("REPCOACH_EXERCISE") {
            self.exercise = parse(&key, &value)?;
        }
        if let Some((_, value)) = get("REPCOACH_CATALOG") {
            self.catalog = Some(value.into());
        }
        if let Some((_, value)) = get("REPCOACH_LOG_DIR") {
            self.log_dir = Some(value.into());
        }
        Ok(self)
    }

    /// Reject thresholds outside `[0, 1]` and empty capture sizes.
    pub fn validate(&self) -> Result<(), TrainerError> {
        for (name, value) in [
            ("detection_confidence", self.detection_confidence),
            ("tracking_confidence", self.tracking_confidence),
            ("min_landmark_visibility", self.min_landmark_visibility),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TrainerError::Config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.width == 0 || self.height == 0 {
            return Err(TrainerError::Config(format!(
                "camera resolution must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(TrainerError::Config("fps must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Set the camera device path (e.g., "/dev/video0").
    pub fn with_device(mut self, device: String) -> Self {
        self.device = device;
        self
    }

    /// Set the capture width in pixels.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Set the capture height in pixels.
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Set the frames per second.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Flip frames horizontally so the display acts like a mirror.
    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn with_detection_confidence(mut self, confidence: f32) -> Self {
        self.detection_confidence = confidence;
        self
    }

    pub fn with_tracking_confidence(mut self, confidence: f32) -> Self {
        self.tracking_confidence = confidence;
        self
    }

    pub fn with_min_landmark_visibility(mut self, visibility: f32) -> Self {
        self.min_landmark_visibility = visibility;
        self
    }

    /// Set the backend used at startup.
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_model_path(mut self, kind: BackendKind, path: PathBuf) -> Self {
        match kind {
            BackendKind::BlazePose => self.blazepose_model = path,
            BackendKind::YoloPose => self.yolo_model = path,
        }
        self
    }

    /// Fetch the `kind` model from `url` when its file is missing. `None` disables fetching.
    pub fn with_model_url(mut self, kind: BackendKind, url: Option<String>) -> Self {
        match kind {
            BackendKind::BlazePose => self.blazepose_model_url = url,
            BackendKind::YoloPose => self.yolo_model_url = url,
        }
        self
    }

    /// Set the exercise selected at startup.
    pub fn with_exercise(mut self, exercise: u32) -> Self {
        self.exercise = exercise;
        self
    }

    /// Load exercises from this JSON file instead of the bundled catalog.
    pub fn with_catalog(mut self, catalog: Option<PathBuf>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Log to daily files in this directory instead of stdout.
    pub fn with_log_dir(mut self, log_dir: Option<PathBuf>) -> Self {
        self.log_dir = log_dir;
        self
    }

    // Getters
    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn mirror(&self) -> bool {
        self.mirror
    }

    pub fn min_landmark_visibility(&self) -> f32 {
        self.min_landmark_visibility
    }

    pub fn detector_options(&self) -> DetectorOptions {
        DetectorOptions {
            detection_confidence: self.detection_confidence,
            tracking_confidence: self.tracking_confidence,
        }
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn model_path(&self, kind: BackendKind) -> &PathBuf {
        match kind {
            BackendKind::BlazePose => &self.blazepose_model,
            BackendKind::YoloPose => &self.yolo_model,
        }
    }

    pub fn model_url(&self, kind: BackendKind) -> Option<&str> {
        match kind {
            BackendKind::BlazePose => self.blazepose_model_url.as_deref(),
            BackendKind::YoloPose => self.yolo_model_url.as_deref(),
        }
    }

    pub fn exercise(&self) -> u32 {
        self.exercise
    }

    pub fn catalog(&self) -> Option<&PathBuf> {
        self.catalog.as_ref()
    }

    pub fn log_dir(&self) -> Option<&PathBuf> {
        self.log_dir.as_ref()
    }
}
