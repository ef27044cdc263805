use {crate::CaptureError, pose::Frame};

/// A camera or other producer of RGB frames, driven from the trainer worker.
///
/// All methods run on the worker thread, so devices with thread affinity
/// are fine.
pub trait FrameSource: Send {
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Wait for the next frame. `Ok(None)` is a normal miss (no frame ready);
    /// an error means the device failed and the worker will reopen it.
    fn blocking_capture(&mut self) -> Result<Option<Frame>, CaptureError>;

    fn close(&mut self);
}
