use bevy::prelude::*;

use crate::FpsControllerInput;

/// Scales the movement axes by `speed` and caps each axis of a diagonal
/// so the combined move is no faster than a straight one.
///
/// Returns `(forward, strafe)`.
pub fn wish_input(input: &FpsControllerInput, speed: f32) -> Vec2 {
    clamp_diagonal(Vec2::new(speed * input.forward, speed * input.strafe), speed)
}

/// Clamps both components to ±sqrt(speed²/2) when both are non-zero.
pub fn clamp_diagonal(raw: Vec2, speed: f32) -> Vec2 {
    if raw.x == 0.0 || raw.y == 0.0 {
        return raw;
    }
    let limit = (speed * speed / 2.0).sqrt();
    raw.clamp(Vec2::splat(-limit), Vec2::splat(limit))
}

/// Rebuilds the horizontal part of `move_direction` from the wish input in
/// the body's current basis. The vertical channel is carried over as-is.
pub fn steer(move_direction: Vec3, wish: Vec2, orientation: Quat) -> Vec3 {
    // Forward is -Z
    let forward = orientation * Vec3::NEG_Z;
    let right = orientation * Vec3::X;
    let mut steered = forward * wish.x + right * wish.y;
    steered.y = move_direction.y;
    steered
}

/// Semi-implicit Euler step of the vertical velocity. There is no
/// terminal velocity.
pub fn fall(vertical_velocity: f32, gravity: f32, grounded: bool, dt: f32) -> f32 {
    if grounded {
        vertical_velocity
    } else {
        vertical_velocity - gravity * dt
    }
}
