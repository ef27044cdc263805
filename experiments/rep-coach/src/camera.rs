use {
    crate::frame::{decode_mjpeg, mirror_horizontal},
    pose::Frame,
    trainer::{CaptureError, FrameSource, TrainerConfig},
    v4l::{
        Device, Format, FourCC, buffer::Type, io::mmap::Stream as MmapStream,
        io::traits::CaptureStream, video::Capture,
    },
};

// number of mmap buffers queued with the driver
const BUFFER_COUNT: u32 = 4;

/// MJPEG capture from a V4L2 device, decoded to RGB.
pub struct V4l2Source {
    path: String,
    width: u32,
    height: u32,
    fps: u32,
    mirror: bool,
    stream: Option<MmapStream<'static>>,
}

impl V4l2Source {
    pub fn new(config: &TrainerConfig) -> Self {
        Self {
            path: config.device().to_string(),
            width: config.width(),
            height: config.height(),
            fps: config.fps(),
            mirror: config.mirror(),
            stream: None,
        }
    }
}

impl FrameSource for V4l2Source {
    fn open(&mut self) -> Result<(), CaptureError> {
        self.stream.take();

        let device = Device::with_path(&self.path)?;
        let format = Capture::set_format(
            &device,
            &Format::new(self.width, self.height, FourCC::new(b"MJPG")),
        )?;
        if format.fourcc != FourCC::new(b"MJPG") {
            return Err(CaptureError::Device(format!(
                "{} does not support MJPEG (offered {})",
                self.path, format.fourcc
            )));
        }

        let params = Capture::set_params(
            &device,
            &v4l::video::capture::Parameters::with_fps(self.fps),
        )?;
        log::info!(
            "camera {}: {}x{} MJPEG at {}/{} s",
            self.path,
            format.width,
            format.height,
            params.interval.numerator,
            params.interval.denominator
        );

        self.stream = Some(
            MmapStream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)
                .map_err(|error| CaptureError::Stream(error.to_string()))?,
        );
        Ok(())
    }

    fn blocking_capture(&mut self) -> Result<Option<Frame>, CaptureError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| CaptureError::Stream("no stream".to_string()))?;
        let (data, _metadata) =
            CaptureStream::next(stream).map_err(|error| CaptureError::Stream(error.to_string()))?;

        // a torn MJPEG buffer is dropped, not treated as a device failure
        let mut frame = match decode_mjpeg(data) {
            Ok(frame) => frame,
            Err(error) => {
                log::warn!("camera {}: {}", self.path, error);
                return Ok(None);
            }
        };
        if self.mirror {
            mirror_horizontal(&mut frame);
        }
        Ok(Some(frame))
    }

    fn close(&mut self) {
        self.stream.take();
    }
}
