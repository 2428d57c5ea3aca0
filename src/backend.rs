//! Collaborators the controller drives but does not own.
//!
//! The controller never touches world geometry, the camera entity or the
//! input devices directly. Each tick it talks to these traits, which lets
//! the same state machine run against avian3d in a Bevy app (see
//! [`crate::AvianMover`]) or against scripted fakes in tests.

use bevy::prelude::*;

/// Resolves requested displacement against world geometry.
pub trait Mover {
    /// Move by `displacement`, sliding along whatever it hits.
    fn move_by(&mut self, displacement: Vec3);

    /// Whether the body ended the last move resting on walkable ground.
    fn is_grounded(&self) -> bool;

    /// World-space pivot of the body.
    fn position(&self) -> Vec3;
}

/// Short-range obstruction test.
pub trait SpatialProbe {
    /// Returns `true` if something blocks `origin` within `max_distance`
    /// along `direction`.
    fn probe(&self, origin: Vec3, direction: Dir3, max_distance: f32) -> bool;
}

/// The view camera, posed relative to the body it rides on.
pub trait CameraSink {
    fn local_position(&self) -> Vec3;

    fn set_local_position(&mut self, position: Vec3);

    fn set_local_rotation(&mut self, rotation: Quat);
}

