use bevy::prelude::*;

use crate::MotionParameters;

/// Accumulated camera pitch in degrees. Positive looks down, matching the
/// screen-space sign of the look-Y axis; [`PitchAccumulator::camera_rotation`]
/// applies the inverse.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct PitchAccumulator(f32);

impl PitchAccumulator {
    pub fn degrees(self) -> f32 {
        self.0
    }

    /// Adds the scaled look delta and clamps to `[-lower, upper]`.
    pub fn accumulate(&mut self, look_y: f32, motion: &MotionParameters) {
        self.0 = (self.0 + look_y * motion.look_sensitivity_y)
            .clamp(-motion.lower_look_limit, motion.upper_look_limit);
    }

    pub fn camera_rotation(self) -> Quat {
        Quat::from_rotation_x(self.0.to_radians()).inverse()
    }
}

/// Incremental yaw for this tick's look-X delta. Positive turns right.
pub fn yaw_step(look_x: f32, motion: &MotionParameters) -> Quat {
    Quat::from_rotation_y(-(look_x * motion.look_sensitivity_x).to_radians())
}
