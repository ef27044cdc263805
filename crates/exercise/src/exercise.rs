use {
    crate::{Color, RegistryError},
    pose::Landmark,
    serde::{Deserialize, Serialize},
};

/// Upper end of the interior joint angle domain, in degrees.
pub const MAX_ANGLE: f32 = 180.0;

/// A coaching message shown while the joint angle lies in `[angle_min, angle_max)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackRule {
    pub angle_min: f32,
    pub angle_max: f32,
    pub message: String,
    pub color: Color,
}

impl FeedbackRule {
    /// Half-open match, except that a rule reaching 180 also matches 180 itself.
    pub fn matches(&self, angle: f32) -> bool {
        angle >= self.angle_min
            && (angle < self.angle_max || (self.angle_max >= MAX_ANGLE && angle <= self.angle_max))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: u32,
    pub name: String,
    /// Angle is measured at the middle joint.
    pub joints: [Landmark; 3],
    /// Entering the bottom position: angle at or below this.
    pub down_max: f32,
    /// Completing a rep: angle at or above this after the bottom.
    pub up_min: f32,
    pub tip: String,
    /// Checked in order, first match wins.
    pub feedback: Vec<FeedbackRule>,
}

impl Exercise {
    pub fn vertex(&self) -> Landmark {
        self.joints[1]
    }

    pub fn feedback_for(&self, angle: f32) -> Option<&FeedbackRule> {
        self.feedback.iter().find(|rule| rule.matches(angle))
    }
}

/// One exercise as written in a JSON catalog, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRecord {
    pub id: u32,
    pub name: String,
    pub joints: [String; 3],
    pub down_max: f32,
    pub up_min: f32,
    #[serde(default)]
    pub tip: String,
    #[serde(default)]
    pub feedback: Vec<FeedbackRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub angle_min: f32,
    pub angle_max: f32,
    pub message: String,
    pub color: String,
}

fn in_angle_domain(angle: f32) -> bool {
    (0.0..=MAX_ANGLE).contains(&angle)
}

impl TryFrom<ExerciseRecord> for Exercise {
    type Error = RegistryError;

    fn try_from(record: ExerciseRecord) -> Result<Self, Self::Error> {
        let id = record.id;
        let invalid = |reason: String| RegistryError::InvalidExerciseDefinition { id, reason };

        if record.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }

        let mut joints = [Landmark::Nose; 3];
        for (slot, name) in joints.iter_mut().zip(&record.joints) {
            *slot = Landmark::from_name(name)
                .ok_or_else(|| invalid(format!("unknown joint {name:?}")))?;
        }
        if joints[0] == joints[1] || joints[1] == joints[2] || joints[0] == joints[2] {
            return Err(invalid(format!("joints must be distinct, got {:?}", record.joints)));
        }

        if !in_angle_domain(record.down_max) || !in_angle_domain(record.up_min) {
            return Err(invalid(format!(
                "thresholds must lie in [0, 180], got down_max {} and up_min {}",
                record.down_max, record.up_min
            )));
        }
        if record.down_max >= record.up_min {
            return Err(invalid(format!(
                "down_max {} must be below up_min {}",
                record.down_max, record.up_min
            )));
        }

        let mut feedback = Vec::with_capacity(record.feedback.len());
        for (index, rule) in record.feedback.into_iter().enumerate() {
            if !in_angle_domain(rule.angle_min) || !in_angle_domain(rule.angle_max) {
                return Err(invalid(format!(
                    "feedback rule {index} bounds [{}, {}) leave [0, 180]",
                    rule.angle_min, rule.angle_max
                )));
            }
            if rule.angle_min >= rule.angle_max {
                return Err(invalid(format!(
                    "feedback rule {index} is empty: [{}, {})",
                    rule.angle_min, rule.angle_max
                )));
            }
            let color = rule
                .color
                .parse()
                .map_err(|e| invalid(format!("feedback rule {index}: {e}")))?;
            feedback.push(FeedbackRule {
                angle_min: rule.angle_min,
                angle_max: rule.angle_max,
                message: rule.message,
                color,
            });
        }

        Ok(Exercise {
            id,
            name: record.name,
            joints,
            down_max: record.down_max,
            up_min: record.up_min,
            tip: record.tip,
            feedback,
        })
    }
}
