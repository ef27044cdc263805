mod draw;
mod frame;

#[cfg(feature = "v4l2")]
mod camera;

#[cfg(feature = "download")]
mod fetch;

use {
    base::log_fatal,
    draw::{draw_joints, draw_skeleton, draw_status, rgb, rgb_to_argb, status_line},
    exercise::Registry,
    minifb::{Key, KeyRepeat, Window, WindowOptions},
    pose::{BackendKind, BackendSelector, Device, ModelBackendFactory, ModelSource, OnnxRuntime},
    std::sync::Arc,
    tokio::task::JoinHandle,
    trainer::{
        FrameSource, Snapshot, Tick, Trainer, TrainerConfig, TrainerError, TrainerHandle,
    },
};

// skeleton joints are drawn from this visibility up
const SKELETON_VISIBILITY: f32 = 0.4;

fn init_logging(config: &TrainerConfig) {
    match config.log_dir() {
        Some(dir) => {
            if let Err(error) = base::init_file_logger(dir) {
                base::init_stdout_logger();
                log::warn!("cannot log to {}: {}", dir.display(), error);
            }
        }
        None => base::init_stdout_logger(),
    }
}

#[cfg(feature = "v4l2")]
fn open_source(config: &TrainerConfig) -> Box<dyn FrameSource> {
    Box::new(camera::V4l2Source::new(config))
}

#[cfg(not(feature = "v4l2"))]
fn open_source(_config: &TrainerConfig) -> Box<dyn FrameSource> {
    log_fatal!("rep-coach was built without a camera backend, enable the v4l2 feature");
}

#[cfg(feature = "download")]
fn fetch_models(config: &TrainerConfig) {
    for kind in [BackendKind::BlazePose, BackendKind::YoloPose] {
        let Some(url) = config.model_url(kind) else {
            continue;
        };
        if let Err(error) = fetch::ensure_model(config.model_path(kind), url) {
            log::warn!("cannot fetch {} model: {}", kind, error);
        }
    }
}

#[cfg(not(feature = "download"))]
fn fetch_models(_config: &TrainerConfig) {}

fn device() -> Device {
    if cfg!(feature = "cuda") {
        Device::Cuda { device_id: 0 }
    } else {
        Device::Cpu
    }
}

fn exercise_key(key: Key) -> Option<u32> {
    let keys = [
        Key::Key0,
        Key::Key1,
        Key::Key2,
        Key::Key3,
        Key::Key4,
        Key::Key5,
        Key::Key6,
        Key::Key7,
        Key::Key8,
        Key::Key9,
    ];
    keys.iter().position(|k| *k == key).map(|id| id as u32)
}

// backend switch requested from the keyboard and still loading
struct PendingSwitch {
    kind: BackendKind,
    task: JoinHandle<Result<(), TrainerError>>,
}

async fn handle_key(
    key: Key,
    handle: &TrainerHandle,
    last: Option<&Snapshot>,
    pending: &mut Option<PendingSwitch>,
) {
    if let Some(id) = exercise_key(key) {
        if let Err(error) = handle.select_exercise(id).await {
            log::warn!("cannot select exercise {}: {}", id, error);
        }
        return;
    }
    match key {
        Key::R => {
            if let Err(error) = handle.reset_reps().await {
                log::warn!("cannot reset reps: {}", error);
            }
        }
        Key::B => {
            // toggle relative to the newest request, the worker may not show it yet
            let current = match pending.as_ref() {
                Some(switch) if !switch.task.is_finished() => Some(switch.kind),
                _ => last.and_then(|snapshot| snapshot.backend),
            };
            let next = current
                .map(BackendKind::other)
                .unwrap_or(BackendKind::BlazePose);
            log::info!("switching pose backend to {}", next);
            // runs in the background, the outcome is logged by the worker
            *pending = Some(PendingSwitch {
                kind: next,
                task: handle.switch_backend(next),
            });
        }
        _ => {}
    }
}

fn render(tick: Tick) -> (Vec<u32>, usize, usize) {
    let Tick { frame, snapshot } = tick;
    let Some((height, width, _)) = frame.hwc() else {
        return (Vec::new(), 0, 0);
    };
    let mut buf = frame.data;
    draw_skeleton(&mut buf, width, height, &snapshot.keypoints, SKELETON_VISIBILITY);
    draw_joints(
        &mut buf,
        width,
        height,
        &snapshot.keypoints,
        snapshot.joints,
        SKELETON_VISIBILITY,
        rgb(snapshot.color),
    );
    draw_status(
        &mut buf,
        width,
        height,
        rgb(snapshot.color),
        snapshot.angle,
        snapshot.phase,
        snapshot.reps,
    );
    (rgb_to_argb(&buf, width, height), width, height)
}

#[tokio::main]
async fn main() {
    let config = match TrainerConfig::from_env().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(error) => {
            base::init_stdout_logger();
            log_fatal!("invalid configuration: {}", error);
        }
    };
    init_logging(&config);

    let registry = match config.catalog() {
        Some(path) => Registry::from_file(path),
        None => Registry::builtin(),
    };
    let registry = match registry {
        Ok(registry) => Arc::new(registry),
        Err(error) => log_fatal!("cannot load exercises: {}", error),
    };

    // missing models are fetched before any backend loads
    fetch_models(&config);

    let runtime = Arc::new(OnnxRuntime::new(device()));
    let factory = Arc::new(ModelBackendFactory::new(
        runtime,
        ModelSource::File(config.model_path(BackendKind::BlazePose).clone()),
        ModelSource::File(config.model_path(BackendKind::YoloPose).clone()),
        config.detector_options(),
    ));

    // fall back to the other backend when the configured one cannot load
    let mut selector = BackendSelector::new(factory);
    let preferred = config.backend();
    if let Err(error) = selector.switch(preferred) {
        log::warn!("{} backend unavailable ({}), trying {}", preferred, error, preferred.other());
        if let Err(error) = selector.switch(preferred.other()) {
            log_fatal!("no pose backend could be loaded: {}", error);
        }
    }

    let source = open_source(&config);
    let mut trainer = match Trainer::spawn(&config, registry, selector, source).await {
        Ok(trainer) => trainer,
        Err(error) => log_fatal!("cannot start trainer: {}", error),
    };
    let handle = trainer.handle();

    let mut window = match Window::new(
        "rep-coach",
        config.width() as usize,
        config.height() as usize,
        WindowOptions::default(),
    ) {
        Ok(window) => window,
        Err(error) => log_fatal!("cannot open window: {}", error),
    };
    window.set_target_fps(config.fps() as usize);

    log::info!("controls: 0-9 exercise, R reset, B switch backend, ESC quit");

    let mut last: Option<Snapshot> = None;
    let mut pending: Option<PendingSwitch> = None;
    let mut title = String::new();
    while window.is_open() && !window.is_key_down(Key::Escape) {
        for key in window.get_keys_pressed(KeyRepeat::No) {
            handle_key(key, &handle, last.as_ref(), &mut pending).await;
        }

        let Some(tick) = trainer.recv().await else {
            log::error!("trainer worker stopped");
            break;
        };
        let snapshot = tick.snapshot.clone();
        let (argb, width, height) = render(tick);
        if width == 0 {
            continue;
        }
        if let Err(error) = window.update_with_buffer(&argb, width, height) {
            log::error!("cannot update window: {}", error);
            break;
        }

        let line = status_line(&snapshot);
        if line != title {
            window.set_title(&line);
            title = line;
        }
        last = Some(snapshot);
    }

    log::info!("exiting");
    trainer.stop().await;
}
