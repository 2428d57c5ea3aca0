use bevy::prelude::*;

use crate::SPRINT_FORWARD_THRESHOLD;

/// Analog channels the controller reads each tick.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAxis {
    /// Forward (+) / back (-), in [-1, 1].
    Forward,
    /// Right (+) / left (-), in [-1, 1].
    Strafe,
    /// Horizontal look delta, positive turns right.
    LookX,
    /// Vertical look delta, positive looks down.
    LookY,
}

/// Raw per-tick input queries.
pub trait InputSource {
    fn axis(&self, axis: InputAxis) -> f32;

    /// `true` only on the tick the key went down.
    fn key_down(&self, key: KeyCode) -> bool;

    /// `true` only on the tick the key was released.
    fn key_up(&self, key: KeyCode) -> bool;

    fn key_held(&self, key: KeyCode) -> bool;
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBindings {
    pub key_forward: KeyCode,
    pub key_back: KeyCode,
    pub key_left: KeyCode,
    pub key_right: KeyCode,
    pub key_sprint: KeyCode,
    pub key_jump: KeyCode,
    pub key_crouch: KeyCode,
}

impl Default for ControlBindings {
    fn default() -> Self {
        Self {
            key_forward: KeyCode::KeyW,
            key_back: KeyCode::KeyS,
            key_left: KeyCode::KeyA,
            key_right: KeyCode::KeyD,
            key_sprint: KeyCode::ShiftLeft,
            key_jump: KeyCode::Space,
            key_crouch: KeyCode::ControlLeft,
        }
    }
}

/// Everything the controller needs from the input devices for one tick,
/// sampled once so every derived flag sees the same reading.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Default)]
#[reflect(Component)]
pub struct FpsControllerInput {
    pub forward: f32,
    pub strafe: f32,
    pub look: Vec2,
    pub sprint_held: bool,
    pub jump_pressed: bool,
    pub crouch_pressed: bool,
    pub crouch_released: bool,
    pub crouch_held: bool,
}

impl FpsControllerInput {
    pub fn sample(source: &impl InputSource, bindings: &ControlBindings) -> Self {
        Self {
            forward: source.axis(InputAxis::Forward).clamp(-1.0, 1.0),
            strafe: source.axis(InputAxis::Strafe).clamp(-1.0, 1.0),
            look: Vec2::new(source.axis(InputAxis::LookX), source.axis(InputAxis::LookY)),
            sprint_held: source.key_held(bindings.key_sprint),
            jump_pressed: source.key_down(bindings.key_jump),
            crouch_pressed: source.key_down(bindings.key_crouch),
            crouch_released: source.key_up(bindings.key_crouch),
            crouch_held: source.key_held(bindings.key_crouch),
        }
    }

    /// Whether a held sprint key counts under the forward-input rule.
    pub fn wants_sprint(&self, require_forward: bool) -> bool {
        self.sprint_held && (!require_forward || self.forward > SPRINT_FORWARD_THRESHOLD)
    }

    /// Any of the events that flip the stance: key down, key up, or the key
    /// no longer held while still crouched.
    pub fn crouch_trigger(&self, crouching: bool) -> bool {
        self.crouch_pressed || self.crouch_released || (crouching && !self.crouch_held)
    }
}
