use bevy::prelude::*;

use crate::{FpsControllerInput, MotionParameters, SprintRequirement};

/// Gait the controller is moving in this tick, by priority.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gait {
    Crouch,
    Sprint,
    Walk,
}

impl Gait {
    /// Crouching beats sprinting, which beats walking.
    pub fn select(
        crouching: bool,
        input: &FpsControllerInput,
        can_sprint: bool,
        requirement: SprintRequirement,
    ) -> Self {
        let require_forward = requirement == SprintRequirement::ForwardInput;
        if crouching {
            Gait::Crouch
        } else if can_sprint && input.wants_sprint(require_forward) {
            Gait::Sprint
        } else {
            Gait::Walk
        }
    }

    pub fn speed(self, motion: &MotionParameters) -> f32 {
        match self {
            Gait::Crouch => motion.crouch_speed,
            Gait::Sprint => motion.sprint_speed,
            Gait::Walk => motion.walk_speed,
        }
    }
}
