//! Tuning for the locomotion controller.
//!
//! Every value here is fixed once the controller is attached. Override
//! fields at spawn time the same way the rest of the crate does:
//!
//! ```
//! # use fps_locomotion::*;
//! let config = FpsControllerConfig {
//!     motion: MotionParameters {
//!         walk_speed: 4.0,
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! assert_eq!(config.motion.sprint_speed, 6.0);
//! ```

use bevy::prelude::*;

/// Speeds, gravity, jump and look tuning. Angles are in degrees.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct MotionParameters {
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub crouch_speed: f32,
    /// Downward acceleration applied while airborne, units/s².
    pub gravity: f32,
    /// Vertical velocity set on a grounded jump.
    pub jump_force: f32,
    /// Degrees of yaw per unit of look-X input.
    pub look_sensitivity_x: f32,
    /// Degrees of pitch per unit of look-Y input.
    pub look_sensitivity_y: f32,
    pub upper_look_limit: f32,
    pub lower_look_limit: f32,
}

impl Default for MotionParameters {
    fn default() -> Self {
        Self {
            walk_speed: 3.0,
            sprint_speed: 6.0,
            crouch_speed: 1.5,
            gravity: 30.0,
            jump_force: 8.0,
            look_sensitivity_x: 0.12,
            look_sensitivity_y: 0.12,
            upper_look_limit: 80.0,
            lower_look_limit: 80.0,
        }
    }
}

/// Body collision shape at rest in each stance.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct BodyGeometry {
    pub height: f32,
    /// Offset of the collision shape from the body pivot.
    pub center: Vec3,
}

impl BodyGeometry {
    pub const fn new(height: f32, center: Vec3) -> Self {
        Self { height, center }
    }

    /// Height of the top of the shape above the body pivot.
    pub fn top(&self) -> f32 {
        self.center.y + self.height * 0.5
    }

    pub fn lerp(self, target: Self, t: f32) -> Self {
        Self {
            height: self.height + (target.height - self.height) * t,
            center: self.center.lerp(target.center, t),
        }
    }
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct CrouchGeometry {
    pub standing: BodyGeometry,
    pub crouching: BodyGeometry,
    /// Seconds to ease between the two shapes.
    pub transition_duration: f32,
    /// How far above the camera a ceiling blocks standing up. The check
    /// never stops short of the standing shape's top.
    pub ceiling_probe_distance: f32,
}

impl CrouchGeometry {
    pub fn for_stance(&self, crouching: bool) -> BodyGeometry {
        if crouching {
            self.crouching
        } else {
            self.standing
        }
    }

    /// How far the eye sits below its standing height for `current`, so the
    /// camera rides the top of the shape.
    pub fn eye_drop(&self, current: BodyGeometry) -> Vec3 {
        Vec3::Y * (current.top() - self.standing.top())
    }
}

impl Default for CrouchGeometry {
    fn default() -> Self {
        Self {
            standing: BodyGeometry::new(2.0, Vec3::ZERO),
            // Keeps the feet where they were.
            crouching: BodyGeometry::new(1.0, Vec3::new(0.0, -0.5, 0.0)),
            transition_duration: 0.25,
            ceiling_probe_distance: 1.0,
        }
    }
}

/// Frequency (rad/s) and amplitude of the camera bob for one gait.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct BobWave {
    pub frequency: f32,
    pub amplitude: f32,
}

impl BobWave {
    pub const fn new(frequency: f32, amplitude: f32) -> Self {
        Self {
            frequency,
            amplitude,
        }
    }
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct HeadbobProfile {
    pub walk: BobWave,
    pub sprint: BobWave,
    pub crouch: BobWave,
    /// Per-axis horizontal speed above which the bob runs.
    pub trigger_speed: f32,
    /// Rest blend factor per second; the camera moves `return_rate * dt`
    /// of the remaining distance each tick.
    pub return_rate: f32,
    /// Distance from rest under which the camera counts as settled.
    pub rest_epsilon: f32,
}

impl Default for HeadbobProfile {
    fn default() -> Self {
        Self {
            walk: BobWave::new(10.0, 0.015),
            sprint: BobWave::new(14.0, 0.03),
            crouch: BobWave::new(6.0, 0.01),
            trigger_speed: 0.1,
            return_rate: 2.0,
            rest_epsilon: 1.0e-3,
        }
    }
}

/// Feature switches. A disabled capability ignores its input entirely.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_sprint: bool,
    pub can_jump: bool,
    pub can_crouch: bool,
    pub can_headbob: bool,
}

impl Capabilities {
    pub const ALL: Self = Self {
        can_sprint: true,
        can_jump: true,
        can_crouch: true,
        can_headbob: true,
    };

    /// Walk and look only.
    pub const NONE: Self = Self {
        can_sprint: false,
        can_jump: false,
        can_crouch: false,
        can_headbob: false,
    };
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::ALL
    }
}

/// When a held sprint key actually selects sprint speed.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SprintRequirement {
    /// Sprint whenever the key is held, in any direction.
    #[default]
    AnyDirection,
    /// Sprint only while pushing forward past [`SPRINT_FORWARD_THRESHOLD`].
    ForwardInput,
}

pub const SPRINT_FORWARD_THRESHOLD: f32 = 0.1;

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct FpsControllerConfig {
    pub motion: MotionParameters,
    pub crouch: CrouchGeometry,
    pub headbob: HeadbobProfile,
    pub capabilities: Capabilities,
    pub sprint_requirement: SprintRequirement,
}

impl FpsControllerConfig {
    /// The bare walk-and-look controller with every extra capability off.
    pub fn walk_only() -> Self {
        Self {
            capabilities: Capabilities::NONE,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stance_geometry_lookup() {
        let crouch = CrouchGeometry::default();
        assert_eq!(crouch.for_stance(false), crouch.standing);
        assert_eq!(crouch.for_stance(true), crouch.crouching);
    }

    #[test]
    fn eye_drops_with_top_of_shape() {
        let crouch = CrouchGeometry::default();
        assert_eq!(crouch.eye_drop(crouch.standing), Vec3::ZERO);
        assert_eq!(crouch.eye_drop(crouch.crouching), Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn geometry_lerp_endpoints_and_midpoint() {
        let a = BodyGeometry::new(2.0, Vec3::ZERO);
        let b = BodyGeometry::new(1.0, Vec3::new(0.0, -0.5, 0.0));
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        let mid = a.lerp(b, 0.5);
        assert_eq!(mid.height, 1.5);
        assert_eq!(mid.center, Vec3::new(0.0, -0.25, 0.0));
    }

    #[test]
    fn walk_only_disables_everything() {
        let config = FpsControllerConfig::walk_only();
        assert_eq!(config.capabilities, Capabilities::NONE);
        assert_eq!(config.motion, MotionParameters::default());
    }
}
