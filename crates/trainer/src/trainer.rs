use {
    crate::*,
    exercise::Registry,
    pose::{BackendFactory, BackendKind, BackendSelector},
    std::{
        sync::{
            Arc,
            atomic::{AtomicBool, AtomicU64, Ordering},
        },
        time::Duration,
    },
    tokio::{
        sync::{mpsc, oneshot},
        task::{JoinHandle, spawn_blocking},
    },
};

// capacity of the tick channel
const CHANNEL_CAPACITY: usize = 4;

// capacity of the command queue
const COMMAND_CAPACITY: usize = 32;

// delay before reopening the source after failure
const WAIT_BEFORE_RECONNECT_MS: u64 = 100;

// delay after a capture that produced no frame
const WAIT_AFTER_MISS_MS: u64 = 5;

/// Runs a [`Pipeline`] on a dedicated worker thread.
///
/// The worker owns the frame source and the pipeline. Each captured frame
/// comes out of [`Trainer::recv`] as a [`Tick`]; user actions go in through
/// a [`TrainerHandle`] and are applied between frames.
pub struct Trainer {
    ticks: mpsc::Receiver<Tick>,
    handle: TrainerHandle,
    cancel: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl Trainer {
    /// Open `source` on the worker and start processing frames.
    ///
    /// Fails if the exercise configured in `config` is unknown or the source
    /// cannot be opened.
    pub async fn spawn(
        config: &TrainerConfig,
        registry: Arc<Registry>,
        selector: BackendSelector,
        mut source: Box<dyn FrameSource>,
    ) -> Result<Self, TrainerError> {
        let factory = selector.factory();
        let mut pipeline = Pipeline::new(
            Arc::clone(&registry),
            selector,
            config.exercise(),
            config.min_landmark_visibility(),
        )?;

        let (tick_tx, tick_rx) = mpsc::channel::<Tick>(CHANNEL_CAPACITY);
        let (command_tx, mut command_rx) = mpsc::channel::<Command>(COMMAND_CAPACITY);
        let cancel = Arc::new(AtomicBool::new(false));

        // the source is opened on the worker so capture stays on one OS thread
        let (init_tx, init_rx) = oneshot::channel::<Result<(), CaptureError>>();

        let join_handle = spawn_blocking({
            let cancel = Arc::clone(&cancel);
            move || {
                if let Err(error) = source.open() {
                    let _ = init_tx.send(Err(error));
                    return;
                }
                let _ = init_tx.send(Ok(()));

                'run: while !cancel.load(Ordering::Relaxed) {
                    log::info!("trainer worker: starting capture loop");
                    loop {
                        if cancel.load(Ordering::Relaxed) {
                            break 'run;
                        }
                        while let Ok(command) = command_rx.try_recv() {
                            log::debug!("trainer worker: applying {:?}", command);
                            pipeline.apply(command);
                        }
                        match source.blocking_capture() {
                            Ok(Some(frame)) => {
                                let snapshot = pipeline.process(&frame);
                                if tick_tx.blocking_send(Tick { frame, snapshot }).is_err() {
                                    log::info!("trainer worker: tick receiver closed");
                                    break 'run;
                                }
                            }
                            Ok(None) => {
                                std::thread::sleep(Duration::from_millis(WAIT_AFTER_MISS_MS));
                            }
                            Err(error) => {
                                log::error!("trainer worker: capture failed: {}", error);
                                break;
                            }
                        }
                    }

                    // close, wait, and reopen the source
                    while !cancel.load(Ordering::Relaxed) {
                        log::info!("trainer worker: reconnecting...");
                        source.close();
                        std::thread::sleep(Duration::from_millis(WAIT_BEFORE_RECONNECT_MS));
                        match source.open() {
                            Ok(()) => break,
                            Err(error) => log::warn!("trainer worker: reopen failed: {}", error),
                        }
                    }
                }

                pipeline.shutdown();
                source.close();
                log::info!("trainer worker: stopped");
            }
        });

        init_rx
            .await
            .map_err(|_| TrainerError::Channel("worker thread died during init".to_string()))??;

        Ok(Self {
            ticks: tick_rx,
            handle: TrainerHandle {
                commands: command_tx,
                registry,
                factory,
                switches: Arc::new(AtomicU64::new(0)),
            },
            cancel,
            join_handle: Some(join_handle),
        })
    }

    /// Next processed frame. `None` once the worker has stopped.
    pub async fn recv(&mut self) -> Option<Tick> {
        self.ticks.recv().await
    }

    /// Next processed frame if one is already waiting.
    pub fn try_recv(&mut self) -> Option<Tick> {
        self.ticks.try_recv().ok()
    }

    pub fn handle(&self) -> TrainerHandle {
        self.handle.clone()
    }

    /// Stop the worker and wait until it has released the backend and the source.
    pub async fn stop(mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.ticks.close();
        if let Some(join_handle) = self.join_handle.take() {
            if let Err(error) = join_handle.await {
                log::error!("trainer worker panicked: {}", error);
            }
        }
    }
}

// The blocking worker cannot be aborted. It sees the cancel flag or the
// closed tick channel and releases the backend and the source by itself.
impl Drop for Trainer {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.ticks.close();
    }
}

/// Cloneable sender of user actions to a running [`Trainer`].
#[derive(Clone)]
pub struct TrainerHandle {
    commands: mpsc::Sender<Command>,
    registry: Arc<Registry>,
    factory: Arc<dyn BackendFactory>,
    // generation of the newest backend switch requested through any clone
    switches: Arc<AtomicU64>,
}

impl TrainerHandle {
    /// Queue a switch to another exercise. Unknown ids are rejected here and
    /// never reach the worker.
    pub async fn select_exercise(&self, id: u32) -> Result<(), TrainerError> {
        self.registry.require(id)?;
        self.send(Command::SelectExercise(id)).await
    }

    pub async fn reset_reps(&self) -> Result<(), TrainerError> {
        self.send(Command::ResetReps).await
    }

    /// Load a `kind` backend off the worker, then hand it over for installation.
    ///
    /// The worker keeps detecting with the current backend while the model
    /// loads. The returned task resolves once the outcome has been queued;
    /// dropping it does not cancel the switch.
    ///
    /// Switches that overlap resolve in request order: the most recent call
    /// wins, whichever model finishes loading first.
    pub fn switch_backend(&self, kind: BackendKind) -> JoinHandle<Result<(), TrainerError>> {
        let commands = self.commands.clone();
        let factory = Arc::clone(&self.factory);
        let generation = self.switches.fetch_add(1, Ordering::SeqCst) + 1;
        spawn_blocking(move || {
            let closed = |_| TrainerError::Channel("trainer worker stopped".to_string());
            commands
                .blocking_send(Command::BeginSwitch { kind, generation })
                .map_err(closed)?;
            match BackendSelector::prepare(factory.as_ref(), kind) {
                Ok(backend) => commands
                    .blocking_send(Command::InstallBackend {
                        backend,
                        generation,
                    })
                    .map_err(closed),
                Err(error) => {
                    commands
                        .blocking_send(Command::AbortSwitch {
                            kind,
                            generation,
                            error: error.clone(),
                        })
                        .map_err(closed)?;
                    Err(error.into())
                }
            }
        })
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    async fn send(&self, command: Command) -> Result<(), TrainerError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| TrainerError::Channel("trainer worker stopped".to_string()))
    }
}
