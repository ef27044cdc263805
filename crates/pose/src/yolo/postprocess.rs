use {
    crate::{
        BackendError, COCO_KEYPOINT_COUNT, COCO_TO_LANDMARK, Keypoint, Keypoints,
        preprocess::LetterboxInfo,
    },
    base::{Tensor, Vec2},
};

/// Rows per candidate: 4 box values, 1 score, 17 x (x, y, confidence).
pub const YOLO_OUTPUT_ROWS: usize = 5 + COCO_KEYPOINT_COUNT * 3;

/// Axis-aligned box in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec2<f32>,
    pub max: Vec2<f32>,
}

impl BoundingBox {
    pub fn from_center(center: Vec2<f32>, size: Vec2<f32>) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn area(&self) -> f32 {
        (self.max.x - self.min.x).max(0.0) * (self.max.y - self.min.y).max(0.0)
    }
}

/// Compute Intersection over Union (IoU) between two bounding boxes
///
/// Returns 0.0 for non-overlapping boxes or zero-area boxes (no division by zero).
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let area_a = a.area();
    let area_b = b.area();
    if area_a <= 0.0 || area_b <= 0.0 {
        return 0.0;
    }

    let overlap_w = (a.max.x.min(b.max.x) - a.min.x.max(b.min.x)).max(0.0);
    let overlap_h = (a.max.y.min(b.max.y) - a.min.y.max(b.min.y)).max(0.0);
    let intersection = overlap_w * overlap_h;

    let union = area_a + area_b - intersection;
    if union <= 0.0 {
        return 0.0;
    }
    intersection / union
}

/// A detected person in frame pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseDetection {
    pub bbox: BoundingBox,
    pub confidence: f32,
    /// COCO keypoints, positions in frame pixels.
    pub keypoints: [Keypoint; COCO_KEYPOINT_COUNT],
}

impl PoseDetection {
    pub fn mean_keypoint_confidence(&self) -> f32 {
        self.keypoints.iter().map(|kp| kp.visibility).sum::<f32>() / COCO_KEYPOINT_COUNT as f32
    }

    /// Spread the COCO keypoints into canonical slots, normalized by the frame size.
    pub fn to_keypoints(&self, frame_width: usize, frame_height: usize) -> Keypoints {
        let mut keypoints = Keypoints::missing();
        for (coco, landmark) in self.keypoints.iter().zip(COCO_TO_LANDMARK) {
            keypoints.set(
                landmark,
                Keypoint::new(
                    coco.position.x / frame_width as f32,
                    coco.position.y / frame_height as f32,
                    if coco.visibility.is_finite() {
                        coco.visibility.clamp(0.0, 1.0)
                    } else {
                        0.0
                    },
                ),
            );
        }
        keypoints
    }
}

/// Post-process YOLO pose model output
///
/// Takes the raw `[1, 56, N]` output, drops candidates scoring below
/// `conf_threshold`, rescales through the letterbox and applies greedy NMS.
/// Detections come back sorted by confidence, highest first.
pub fn postprocess(
    output: &Tensor<f32>,
    letterbox: &LetterboxInfo,
    conf_threshold: f32,
    iou_threshold: f32,
) -> Result<Vec<PoseDetection>, BackendError> {
    if output.shape.len() != 3
        || output.shape[0] != 1
        || output.shape[1] != YOLO_OUTPUT_ROWS
        || output.len() != YOLO_OUTPUT_ROWS * output.shape[2]
    {
        return Err(BackendError::Inference(format!(
            "expected output shape [1, {}, N], got {:?}",
            YOLO_OUTPUT_ROWS, output.shape
        )));
    }

    let n = output.shape[2];
    // element [0, row, col] lives at row * n + col
    let at = |row: usize, col: usize| output.data[row * n + col];

    let mut candidates = Vec::new();
    for i in 0..n {
        let confidence = at(4, i);
        if confidence.is_nan() || confidence < conf_threshold {
            continue;
        }

        let mut keypoints = [Keypoint::MISSING; COCO_KEYPOINT_COUNT];
        for (k, keypoint) in keypoints.iter_mut().enumerate() {
            let row = 5 + k * 3;
            let (x, y) = letterbox.to_frame(at(row, i), at(row + 1, i));
            *keypoint = Keypoint::new(x, y, at(row + 2, i));
        }

        let (cx, cy) = letterbox.to_frame(at(0, i), at(1, i));
        let size = Vec2::new(at(2, i), at(3, i)) * (1.0 / letterbox.scale);
        candidates.push(PoseDetection {
            bbox: BoundingBox::from_center(Vec2::new(cx, cy), size),
            confidence,
            keypoints,
        });
    }

    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<PoseDetection> = Vec::new();
    for candidate in candidates {
        if keep
            .iter()
            .all(|kept| iou(&kept.bbox, &candidate.bbox) <= iou_threshold)
        {
            keep.push(candidate);
        }
    }
    Ok(keep)
}

/// The detection whose keypoints are, on average, the most confident.
pub fn best_person(detections: &[PoseDetection]) -> Option<&PoseDetection> {
    detections.iter().max_by(|a, b| {
        a.mean_keypoint_confidence()
            .total_cmp(&b.mean_keypoint_confidence())
    })
}
