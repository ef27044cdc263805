use {
    crate::{Color, Exercise},
    pose::{Keypoint, Keypoints, angle_between},
    std::fmt,
};

/// Joints at or below this visibility are treated as out of frame.
pub const DEFAULT_MIN_VISIBILITY: f32 = 0.6;

pub const OUT_OF_FRAME_MESSAGE: &str = "⚠ Keep full body in frame";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Top / starting position.
    #[default]
    Up,
    /// Bottom position reached, waiting for the return.
    Down,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Up => write!(f, "UP"),
            Phase::Down => write!(f, "DOWN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    /// The first matching feedback rule of the exercise.
    Rule { message: String, color: Color },
    /// The tracked joints were not visible enough to measure.
    OutOfFrame,
    /// Measured, but no rule covers the angle.
    Neutral,
}

impl Feedback {
    pub fn message(&self) -> &str {
        match self {
            Feedback::Rule { message, .. } => message,
            Feedback::OutOfFrame => OUT_OF_FRAME_MESSAGE,
            Feedback::Neutral => "",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Feedback::Rule { color, .. } => *color,
            Feedback::OutOfFrame => Color::WARNING,
            Feedback::Neutral => Color::NEUTRAL,
        }
    }
}

/// Result of one counter tick.
#[derive(Debug, Clone, PartialEq)]
pub struct RepUpdate {
    pub phase: Phase,
    pub reps: u32,
    /// `None` when the tick was skipped by the visibility guard.
    pub angle: Option<f32>,
    pub feedback: Feedback,
    /// This tick finished a repetition.
    pub completed_rep: bool,
}

/// Two-state rep counter for one exercise.
///
/// `Up -> Down` when the angle drops to `down_max`, `Down -> Up` (one rep)
/// when it climbs back to `up_min`. Angles strictly between the two leave the
/// phase alone, so jitter around one threshold cannot double count.
#[derive(Debug, Clone)]
pub struct RepCounter {
    exercise: Exercise,
    min_visibility: f32,
    phase: Phase,
    reps: u32,
    last_valid_angle: Option<f32>,
}

impl RepCounter {
    pub fn new(exercise: Exercise, min_visibility: f32) -> Self {
        Self {
            exercise,
            min_visibility,
            phase: Phase::Up,
            reps: 0,
            last_valid_angle: None,
        }
    }

    /// Feed the exercise's three joints, in triplet order.
    ///
    /// If any joint's visibility is at or below the threshold the tick changes
    /// nothing and reports [`Feedback::OutOfFrame`].
    pub fn update(&mut self, joints: [Keypoint; 3]) -> RepUpdate {
        let visible = joints
            .iter()
            .all(|joint| joint.visibility > self.min_visibility);
        if !visible {
            return self.out_of_frame();
        }
        let [a, vertex, c] = joints;
        self.advance(angle_between(a, vertex, c))
    }

    /// [`RepCounter::update`] on the exercise's joints picked from a full keypoint set.
    pub fn update_keypoints(&mut self, keypoints: &Keypoints) -> RepUpdate {
        self.update(keypoints.triplet(self.exercise.joints))
    }

    /// Step the state machine with an already trusted angle.
    pub fn advance(&mut self, angle: f32) -> RepUpdate {
        self.last_valid_angle = Some(angle);

        let mut completed_rep = false;
        match self.phase {
            Phase::Up if angle <= self.exercise.down_max => {
                self.phase = Phase::Down;
            }
            Phase::Down if angle >= self.exercise.up_min => {
                self.phase = Phase::Up;
                self.reps += 1;
                completed_rep = true;
                log::debug!("{}: rep {} completed", self.exercise.name, self.reps);
            }
            _ => {}
        }

        let feedback = match self.exercise.feedback_for(angle) {
            Some(rule) => Feedback::Rule {
                message: rule.message.clone(),
                color: rule.color,
            },
            None => Feedback::Neutral,
        };

        RepUpdate {
            phase: self.phase,
            reps: self.reps,
            angle: Some(angle),
            feedback,
            completed_rep,
        }
    }

    /// The no-op tick reported when the body cannot be measured.
    pub fn out_of_frame(&self) -> RepUpdate {
        RepUpdate {
            phase: self.phase,
            reps: self.reps,
            angle: None,
            feedback: Feedback::OutOfFrame,
            completed_rep: false,
        }
    }

    pub fn reset(&mut self) {
        self.reps = 0;
        self.phase = Phase::Up;
        self.last_valid_angle = None;
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn last_valid_angle(&self) -> Option<f32> {
        self.last_valid_angle
    }

    pub fn min_visibility(&self) -> f32 {
        self.min_visibility
    }
}
