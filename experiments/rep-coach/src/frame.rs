use {
    base::Tensor,
    crates_image::ImageFormat,
    pose::Frame,
    trainer::CaptureError,
};

/// Decode one MJPEG buffer into an `[H, W, 3]` RGB frame.
pub fn decode_mjpeg(data: &[u8]) -> Result<Frame, CaptureError> {
    let image = crates_image::load_from_memory_with_format(data, ImageFormat::Jpeg)
        .map_err(|error| CaptureError::Decode(error.to_string()))?
        .to_rgb8();
    let (width, height) = (image.width() as usize, image.height() as usize);
    Tensor::new(vec![height, width, 3], image.into_raw())
        .map_err(|error| CaptureError::Decode(error.to_string()))
}

/// Flip an `[H, W, C]` frame left to right, in place.
pub fn mirror_horizontal(frame: &mut Frame) {
    let Some((_, width, channels)) = frame.hwc() else {
        return;
    };
    let stride = width * channels;
    if stride == 0 {
        return;
    }
    for row in frame.data.chunks_exact_mut(stride) {
        for x in 0..width / 2 {
            let (left, right) = (x * channels, (width - 1 - x) * channels);
            for c in 0..channels {
                row.swap(left + c, right + c);
            }
        }
    }
}
