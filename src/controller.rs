use bevy::prelude::*;

use crate::{
    BodyGeometry, CameraSink, FpsControllerConfig, FpsControllerInput, Gait, Headbob, Mover,
    PitchAccumulator, SpatialProbe, Stance, StanceChange, fall, steer, wish_input, yaw_step,
};

/// What one main-pass tick did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickOutcome {
    /// Displacement handed to the mover.
    pub displacement: Vec3,
    pub jumped: bool,
    pub stance_change: Option<StanceChange>,
    /// Grounded state reported by the mover after the move.
    pub grounded: bool,
}

/// Runtime first-person locomotion for one body.
///
/// Built at attach time from its config and the camera's resting pose.
/// Each frame the host calls [`LocomotionController::update`] (the main
/// pass) and then [`LocomotionController::update_headbob`].
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct LocomotionController {
    config: FpsControllerConfig,
    enabled: bool,
    gait: Gait,
    current_speed: f32,
    /// World-space velocity: horizontal from input, vertical from
    /// jump and gravity.
    move_direction: Vec3,
    grounded: bool,
    pitch: PitchAccumulator,
    stance: Stance,
    headbob: Headbob,
}

impl LocomotionController {
    pub fn attach(config: FpsControllerConfig, camera: &impl CameraSink, grounded: bool) -> Self {
        Self {
            gait: Gait::Walk,
            current_speed: config.motion.walk_speed,
            enabled: true,
            move_direction: Vec3::ZERO,
            grounded,
            pitch: PitchAccumulator::default(),
            stance: Stance::standing(&config.crouch),
            headbob: Headbob::new(camera.local_position()),
            config,
        }
    }

    pub fn config(&self) -> &FpsControllerConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A disabled controller ignores input and stops moving altogether.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn gait(&self) -> Gait {
        self.gait
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn move_direction(&self) -> Vec3 {
        self.move_direction
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.move_direction.y
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_crouching(&self) -> bool {
        self.stance.is_crouching()
    }

    pub fn pitch(&self) -> PitchAccumulator {
        self.pitch
    }

    pub fn stance(&self) -> &Stance {
        &self.stance
    }

    pub fn geometry(&self) -> BodyGeometry {
        self.stance.geometry()
    }

    /// Offset from the camera's standing pose for the current body shape.
    pub fn eye_drop(&self) -> Vec3 {
        self.config.crouch.eye_drop(self.stance.geometry())
    }

    pub fn headbob(&self) -> &Headbob {
        &self.headbob
    }

    /// Main pass: speed, movement and jump, stance, look, then the move.
    pub fn update(
        &mut self,
        dt: f32,
        input: &FpsControllerInput,
        orientation: &mut Quat,
        mover: &mut impl Mover,
        probe: &impl SpatialProbe,
        camera: &mut impl CameraSink,
    ) -> TickOutcome {
        if !self.enabled {
            return TickOutcome {
                grounded: self.grounded,
                ..Default::default()
            };
        }
        let capabilities = self.config.capabilities;
        let motion = self.config.motion;
        let mut outcome = TickOutcome::default();

        self.gait = Gait::select(
            self.stance.is_crouching(),
            input,
            capabilities.can_sprint,
            self.config.sprint_requirement,
        );
        self.current_speed = self.gait.speed(&motion);

        let wish = wish_input(input, self.current_speed);
        self.move_direction = steer(self.move_direction, wish, *orientation);

        if capabilities.can_jump && input.jump_pressed && mover.is_grounded() {
            self.move_direction.y = motion.jump_force;
            outcome.jumped = true;
            debug!(jump_force = motion.jump_force, "jump");
        }

        if capabilities.can_crouch {
            if input.crouch_trigger(self.stance.is_crouching()) {
                let change = self.toggle_stance(mover, probe, camera, *orientation);
                outcome.stance_change = Some(change);
            }
            self.stance.tick(dt);
        }

        self.pitch.accumulate(input.look.y, &motion);
        camera.set_local_rotation(self.pitch.camera_rotation());
        *orientation *= yaw_step(input.look.x, &motion);

        self.move_direction.y = fall(
            self.move_direction.y,
            motion.gravity,
            mover.is_grounded(),
            dt,
        );
        outcome.displacement = self.move_direction * dt;
        mover.move_by(outcome.displacement);
        self.grounded = mover.is_grounded();
        outcome.grounded = self.grounded;
        outcome
    }

    /// Late pass: camera bob from the movement this tick produced.
    pub fn update_headbob(&mut self, dt: f32, camera: &mut impl CameraSink) {
        if !self.enabled || !self.config.capabilities.can_headbob {
            return;
        }
        self.headbob.update(
            &self.config.headbob,
            self.gait,
            self.grounded,
            self.move_direction,
            dt,
            camera,
        );
    }

    fn toggle_stance(
        &mut self,
        mover: &impl Mover,
        probe: &impl SpatialProbe,
        camera: &impl CameraSink,
        orientation: Quat,
    ) -> StanceChange {
        let eye_drop = self.eye_drop();
        let crouch = &self.config.crouch;
        let blocked = self.stance.is_crouching() && {
            let eye_offset = camera.local_position() + eye_drop;
            let eye = mover.position() + orientation * eye_offset;
            // The check always covers the space the standing shape will fill.
            let reach = crouch
                .ceiling_probe_distance
                .max(crouch.standing.top() - eye_offset.y);
            probe.probe(eye, Dir3::Y, reach)
        };
        let change = self.stance.toggle(crouch, blocked);
        match change {
            StanceChange::Blocked => debug!("stand blocked overhead"),
            _ => debug!(?change, height = self.stance.geometry().height, "stance"),
        }
        change
    }
}
