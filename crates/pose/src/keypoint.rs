use {
    crate::{LANDMARK_COUNT, Landmark},
    base::Vec2,
    std::ops::{Index, IndexMut},
};

/// One body joint in normalized frame coordinates (`0..1` on both axes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub position: Vec2<f32>,
    /// Confidence the joint is visible, in `[0, 1]`.
    pub visibility: f32,
}

impl Keypoint {
    /// Placeholder for joints that were not detected or that a backend cannot produce.
    pub const MISSING: Keypoint = Keypoint {
        position: Vec2::new(0.0, 0.0),
        visibility: 0.0,
    };

    pub const fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            visibility,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.visibility <= 0.0
    }
}

impl Default for Keypoint {
    fn default() -> Self {
        Keypoint::MISSING
    }
}

/// The canonical keypoint set, one slot per [`Landmark`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoints([Keypoint; LANDMARK_COUNT]);

impl Keypoints {
    /// "Nothing detected": every slot is [`Keypoint::MISSING`].
    pub const fn missing() -> Self {
        Keypoints([Keypoint::MISSING; LANDMARK_COUNT])
    }

    pub const fn from_array(keypoints: [Keypoint; LANDMARK_COUNT]) -> Self {
        Keypoints(keypoints)
    }

    pub fn get(&self, landmark: Landmark) -> Keypoint {
        self.0[landmark.index()]
    }

    pub fn set(&mut self, landmark: Landmark, keypoint: Keypoint) {
        self.0[landmark.index()] = keypoint;
    }

    /// The three keypoints of a joint triplet, in order.
    pub fn triplet(&self, joints: [Landmark; 3]) -> [Keypoint; 3] {
        joints.map(|landmark| self.get(landmark))
    }

    pub fn any_visible(&self) -> bool {
        self.0.iter().any(|keypoint| !keypoint.is_missing())
    }

    pub fn as_slice(&self) -> &[Keypoint] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Landmark, &Keypoint)> {
        Landmark::ALL.iter().copied().zip(self.0.iter())
    }
}

impl Default for Keypoints {
    fn default() -> Self {
        Keypoints::missing()
    }
}

impl Index<Landmark> for Keypoints {
    type Output = Keypoint;

    fn index(&self, landmark: Landmark) -> &Keypoint {
        &self.0[landmark.index()]
    }
}

impl IndexMut<Landmark> for Keypoints {
    fn index_mut(&mut self, landmark: Landmark) -> &mut Keypoint {
        &mut self.0[landmark.index()]
    }
}

impl Index<usize> for Keypoints {
    type Output = Keypoint;

    fn index(&self, index: usize) -> &Keypoint {
        &self.0[index]
    }
}
