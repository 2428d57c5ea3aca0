use bevy::prelude::*;

use crate::{BobWave, CameraSink, Gait, HeadbobProfile};

/// Procedural camera bob. Runs while the body is grounded and moving, then
/// eases the camera back to rest and resets its phase once it settles.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct Headbob {
    rest: Vec3,
    timer: f32,
}

impl Headbob {
    pub fn new(rest: Vec3) -> Self {
        Self { rest, timer: 0.0 }
    }

    pub fn rest(&self) -> Vec3 {
        self.rest
    }

    /// Seconds the oscillator has run since it last settled.
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Component-wise test on the world horizontal velocity.
    pub fn is_triggered(profile: &HeadbobProfile, grounded: bool, move_direction: Vec3) -> bool {
        grounded
            && (move_direction.x.abs() > profile.trigger_speed
                || move_direction.z.abs() > profile.trigger_speed)
    }

    pub fn wave(profile: &HeadbobProfile, gait: Gait) -> BobWave {
        match gait {
            Gait::Crouch => profile.crouch,
            Gait::Sprint => profile.sprint,
            Gait::Walk => profile.walk,
        }
    }

    /// Offset from rest at the current phase: lateral sway at half the
    /// frequency and twice the amplitude of the vertical bounce.
    pub fn offset(&self, wave: BobWave) -> Vec3 {
        let vertical = (self.timer * wave.frequency).sin() * wave.amplitude;
        let horizontal = (self.timer * wave.frequency / 2.0).sin() * wave.amplitude * 2.0;
        Vec3::new(horizontal, vertical, 0.0)
    }

    pub fn update(
        &mut self,
        profile: &HeadbobProfile,
        gait: Gait,
        grounded: bool,
        move_direction: Vec3,
        dt: f32,
        camera: &mut impl CameraSink,
    ) {
        if Self::is_triggered(profile, grounded, move_direction) {
            self.timer += dt;
            camera.set_local_position(self.rest + self.offset(Self::wave(profile, gait)));
            return;
        }

        let current = camera.local_position();
        if current.distance(self.rest) <= profile.rest_epsilon {
            camera.set_local_position(self.rest);
            self.timer = 0.0;
            return;
        }
        let blend = (profile.return_rate * dt).min(1.0);
        camera.set_local_position(current.lerp(self.rest, blend));
    }
}
