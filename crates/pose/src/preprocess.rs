//! Frame -> model input conversion.

use {
    crate::{BackendError, Frame, frame_dimensions},
    base::Tensor,
};

/// Memory layout of the model input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `[1, 3, size, size]`
    Nchw,
    /// `[1, size, size, 3]`
    Nhwc,
}

/// Letterbox transformation parameters for coordinate rescaling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxInfo {
    /// Scale factor applied to the frame (min(size/H, size/W))
    pub scale: f32,
    /// Horizontal padding added (in pixels)
    pub pad_x: f32,
    /// Vertical padding added (in pixels)
    pub pad_y: f32,
}

impl LetterboxInfo {
    /// Map a point in model input pixels back to frame pixels.
    pub fn to_frame(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Letterbox a frame into a square `size` x `size` model input.
///
/// The frame is resized with nearest-neighbour sampling keeping its aspect
/// ratio, centred, padded with `pad_value` and rescaled from `[0, 255]` to
/// `[0.0, 1.0]`.
pub fn letterbox(
    frame: &Frame,
    size: usize,
    layout: Layout,
    pad_value: f32,
) -> Result<(Tensor<f32>, LetterboxInfo), BackendError> {
    let (h, w) = frame_dimensions(frame)?;

    let scale = (size as f32 / w as f32).min(size as f32 / h as f32);
    let new_w = ((w as f32 * scale) as usize).clamp(1, size);
    let new_h = ((h as f32 * scale) as usize).clamp(1, size);
    let pad_x = (size - new_w) / 2;
    let pad_y = (size - new_h) / 2;

    let plane = size * size;
    let mut data = vec![pad_value; 3 * plane];

    for out_y in 0..new_h {
        let src_y = ((out_y as f32 / scale).floor() as usize).min(h - 1);
        for out_x in 0..new_w {
            let src_x = ((out_x as f32 / scale).floor() as usize).min(w - 1);
            let src = (src_y * w + src_x) * 3;
            let dst_y = out_y + pad_y;
            let dst_x = out_x + pad_x;
            for ch in 0..3 {
                let value = frame.data[src + ch] as f32 / 255.0;
                let dst = match layout {
                    Layout::Nchw => ch * plane + dst_y * size + dst_x,
                    Layout::Nhwc => (dst_y * size + dst_x) * 3 + ch,
                };
                data[dst] = value;
            }
        }
    }

    let shape = match layout {
        Layout::Nchw => vec![1, 3, size, size],
        Layout::Nhwc => vec![1, size, size, 3],
    };
    let input = Tensor::new(shape, data)?;

    Ok((
        input,
        LetterboxInfo {
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
        },
    ))
}
