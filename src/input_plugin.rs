use bevy::{
    input::mouse::MouseMotion,
    prelude::*,
    window::{CursorGrabMode, PrimaryWindow},
};

use crate::{
    ControlBindings, FpsController, FpsControllerInput, InputAxis, InputSource,
    LocomotionController,
};

/// Click to capture the cursor and drive the controllers, Escape to let go
/// and freeze them.
///
/// Capturing is never done implicitly when a controller is spawned; add
/// this plugin or call [`acquire_input_focus`] yourself.
pub struct InputFocusPlugin;

impl Plugin for InputFocusPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, manage_input_focus);
    }
}

/// Keyboard movement keys plus the frame's summed mouse motion.
pub struct KeyboardMouseSource<'a> {
    pub keys: &'a ButtonInput<KeyCode>,
    pub bindings: &'a ControlBindings,
    pub mouse_delta: Vec2,
}

impl InputSource for KeyboardMouseSource<'_> {
    fn axis(&self, axis: InputAxis) -> f32 {
        let bindings = self.bindings;
        match axis {
            InputAxis::Forward => get_axis(self.keys, bindings.key_forward, bindings.key_back),
            InputAxis::Strafe => get_axis(self.keys, bindings.key_right, bindings.key_left),
            InputAxis::LookX => self.mouse_delta.x,
            InputAxis::LookY => self.mouse_delta.y,
        }
    }

    fn key_down(&self, key: KeyCode) -> bool {
        self.keys.just_pressed(key)
    }

    fn key_up(&self, key: KeyCode) -> bool {
        self.keys.just_released(key)
    }

    fn key_held(&self, key: KeyCode) -> bool {
        self.keys.pressed(key)
    }
}

/// Samples this frame's input into every controller's [`FpsControllerInput`].
pub fn fps_controller_input(
    key_input: Res<ButtonInput<KeyCode>>,
    mut mouse_events: EventReader<MouseMotion>,
    mut query: Query<(&FpsController, &mut FpsControllerInput)>,
) {
    let mut mouse_delta = Vec2::ZERO;
    for mouse_event in mouse_events.read() {
        mouse_delta += mouse_event.delta;
    }

    for (controller, mut input) in query.iter_mut() {
        if !controller.enable_input {
            *input = FpsControllerInput::default();
            continue;
        }
        let source = KeyboardMouseSource {
            keys: &key_input,
            bindings: &controller.bindings,
            mouse_delta,
        };
        *input = FpsControllerInput::sample(&source, &controller.bindings);
    }
}

pub fn acquire_input_focus(window: &mut Window) {
    window.cursor_options.grab_mode = CursorGrabMode::Locked;
    window.cursor_options.visible = false;
}

pub fn release_input_focus(window: &mut Window) {
    window.cursor_options.grab_mode = CursorGrabMode::None;
    window.cursor_options.visible = true;
}

pub fn manage_input_focus(
    btn: Res<ButtonInput<MouseButton>>,
    key: Res<ButtonInput<KeyCode>>,
    mut window_query: Query<&mut Window, With<PrimaryWindow>>,
    mut controller_query: Query<(&mut FpsController, Option<&mut LocomotionController>)>,
) {
    let focus = if btn.just_pressed(MouseButton::Left) {
        true
    } else if key.just_pressed(KeyCode::Escape) {
        false
    } else {
        return;
    };

    for mut window in &mut window_query {
        if focus {
            acquire_input_focus(&mut window);
        } else {
            release_input_focus(&mut window);
        }
    }
    for (mut fps, locomotion) in &mut controller_query {
        fps.enable_input = focus;
        if let Some(mut locomotion) = locomotion {
            locomotion.set_enabled(focus);
        }
    }
    debug!(focus, "input focus");
}

fn get_pressed(key_input: &ButtonInput<KeyCode>, key: KeyCode) -> f32 {
    if key_input.pressed(key) { 1.0 } else { 0.0 }
}

fn get_axis(key_input: &ButtonInput<KeyCode>, key_pos: KeyCode, key_neg: KeyCode) -> f32 {
    get_pressed(key_input, key_pos) - get_pressed(key_input, key_neg)
}
