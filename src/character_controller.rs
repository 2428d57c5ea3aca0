use avian3d::prelude::*;
use bevy::{prelude::*, transform::TransformSystem};

use crate::{
    AvianMover, AvianProbe, BodyCollider, CameraSink, ControlBindings, FpsControllerConfig,
    FpsControllerInput, KinematicMover, LocomotionController, SetupError, apply_body_geometry,
    fps_controller_input,
};

/// Runs the first-person controllers.
///
/// Input is sampled in `PreUpdate`, after bevy's internal input processing
/// is finished. The main pass (movement, jump, crouch, look) runs in
/// `Update`. Headbob, collider resizing and camera placement run in
/// `PostUpdate` before transforms propagate.
///
/// If you need a system in `Update` to see this frame's movement, order it
/// like so:
///
/// ```
/// # use bevy::prelude::*;
///
/// struct MyPlugin;
/// impl Plugin for MyPlugin {
///     fn build(&self, app: &mut App) {
///         app.add_systems(
///             Update,
///             my_system.after(fps_locomotion::fps_controller_move),
///         );
///     }
/// }
///
/// fn my_system() { }
/// ```
pub struct FpsControllerPlugin;

impl Plugin for FpsControllerPlugin {
    fn build(&self, app: &mut App) {
        use bevy::input::{keyboard, mouse};

        app.register_type::<FpsController>()
            .register_type::<FpsControllerInput>()
            .register_type::<LocomotionController>()
            .register_type::<KinematicMover>()
            .register_type::<BodyCollider>()
            .register_type::<CameraRig>()
            .add_systems(
                PreUpdate,
                fps_controller_input
                    .after(mouse::mouse_button_input_system)
                    .after(keyboard::keyboard_input_system),
            )
            .add_systems(
                Update,
                (attach_fps_controllers, fps_controller_move).chain(),
            )
            .add_systems(
                PostUpdate,
                (
                    fps_controller_headbob,
                    fps_controller_body,
                    fps_controller_render,
                )
                    .chain()
                    .before(TransformSystem::TransformPropagate),
            );
    }
}

/// Spawn-time settings for a first-person body. Once attached, the config
/// is copied into a [`LocomotionController`] and no longer read.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
#[require(LogicalPlayer, FpsControllerInput, KinematicMover)]
pub struct FpsController {
    pub config: FpsControllerConfig,
    pub bindings: ControlBindings,
    pub enable_input: bool,
}

impl Default for FpsController {
    fn default() -> Self {
        Self {
            config: FpsControllerConfig::default(),
            bindings: ControlBindings::default(),
            enable_input: true,
        }
    }
}

#[derive(Component, Default)]
pub struct LogicalPlayer;

/// The camera that views the world from `logical_entity`.
#[derive(Component)]
#[require(CameraRig)]
pub struct RenderPlayer {
    pub logical_entity: Entity,
}

/// Camera pose relative to the logical body.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct CameraRig {
    pub local_position: Vec3,
    pub local_rotation: Quat,
}

impl CameraRig {
    pub fn at(local_position: Vec3) -> Self {
        Self {
            local_position,
            local_rotation: Quat::IDENTITY,
        }
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::at(Vec3::new(0.0, 0.7, 0.0))
    }
}

impl CameraSink for CameraRig {
    fn local_position(&self) -> Vec3 {
        self.local_position
    }

    fn set_local_position(&mut self, position: Vec3) {
        self.local_position = position;
    }

    fn set_local_rotation(&mut self, rotation: Quat) {
        self.local_rotation = rotation;
    }
}

/// Entities an attached controller drives.
#[derive(Component, Debug, Clone, Copy)]
pub struct ControllerLinks {
    pub body: Entity,
    pub camera: Entity,
}

// ██╗      ██████╗  ██████╗ ██╗ ██████╗
// ██║     ██╔═══██╗██╔════╝ ██║██╔════╝
// ██║     ██║   ██║██║  ███╗██║██║
// ██║     ██║   ██║██║   ██║██║██║
// ███████╗╚██████╔╝╚██████╔╝██║╚██████╗
// ╚══════╝ ╚═════╝  ╚═════╝ ╚═╝ ╚═════╝

/// Builds a [`LocomotionController`] for every new [`FpsController`].
///
/// A controller without a [`BodyCollider`] child or a [`RenderPlayer`]
/// camera cannot run, so this fails the system instead of skipping it.
pub fn attach_fps_controllers(
    mut commands: Commands,
    pending: Query<(Entity, &FpsController, Option<&Children>), Without<LocomotionController>>,
    bodies: Query<(), With<BodyCollider>>,
    cameras: Query<(Entity, &RenderPlayer, &CameraRig)>,
) -> Result {
    for (entity, fps, children) in &pending {
        let body = children
            .and_then(|children| {
                children[..]
                    .iter()
                    .copied()
                    .find(|&child| bodies.contains(child))
            })
            .ok_or(SetupError::MissingMover(entity))?;
        let (camera, _, rig) = cameras
            .iter()
            .find(|(_, render, _)| render.logical_entity == entity)
            .ok_or(SetupError::MissingCamera(entity))?;

        let controller = LocomotionController::attach(fps.config, rig, false);
        commands
            .entity(entity)
            .insert((controller, ControllerLinks { body, camera }));
        info!(?entity, ?body, ?camera, "attached fps controller");
    }
    Ok(())
}

pub fn fps_controller_move(
    time: Res<Time>,
    spatial_query_pipeline: Res<SpatialQueryPipeline>,
    mut query: Query<
        (
            Entity,
            &FpsControllerInput,
            &ControllerLinks,
            &mut LocomotionController,
            &mut KinematicMover,
            &mut Transform,
        ),
        With<LogicalPlayer>,
    >,
    bodies: Query<&Collider, With<BodyCollider>>,
    mut rigs: Query<&mut CameraRig>,
) {
    let dt = time.delta_secs();

    for (entity, input, links, mut controller, mut settings, mut transform) in query.iter_mut() {
        let (Ok(collider), Ok(mut rig)) = (bodies.get(links.body), rigs.get_mut(links.camera))
        else {
            continue;
        };
        let filter = SpatialQueryFilter::default().with_excluded_entities([entity, links.body]);
        let center = controller.geometry().center;
        let Transform {
            translation,
            rotation,
            ..
        } = &mut *transform;

        let mut mover = AvianMover::new(
            &spatial_query_pipeline,
            &filter,
            &mut settings,
            translation,
            *rotation,
            collider,
            center,
        );
        let probe = AvianProbe::new(&spatial_query_pipeline, &filter);
        controller.update(dt, input, rotation, &mut mover, &probe, &mut *rig);
    }
}

pub fn fps_controller_headbob(
    time: Res<Time>,
    mut query: Query<(&mut LocomotionController, &ControllerLinks)>,
    mut rigs: Query<&mut CameraRig>,
) {
    let dt = time.delta_secs();

    for (mut controller, links) in query.iter_mut() {
        if let Ok(mut rig) = rigs.get_mut(links.camera) {
            controller.update_headbob(dt, &mut *rig);
        }
    }
}

/// Pushes the crouch-interpolated body shape onto the collider child.
pub fn fps_controller_body(
    query: Query<(&LocomotionController, &ControllerLinks)>,
    mut bodies: Query<(&mut Collider, &mut Transform), With<BodyCollider>>,
) {
    for (controller, links) in query.iter() {
        if let Ok((mut collider, mut transform)) = bodies.get_mut(links.body) {
            apply_body_geometry(&mut collider, &mut transform, controller.geometry());
        }
    }
}

// ██████╗ ███████╗███╗   ██╗██████╗ ███████╗██████╗
// ██╔══██╗██╔════╝████╗  ██║██╔══██╗██╔════╝██╔══██╗
// ██████╔╝█████╗  ██╔██╗ ██║██║  ██║█████╗  ██████╔╝
// ██╔══██╗██╔══╝  ██║╚██╗██║██║  ██║██╔══╝  ██╔══██╗
// ██║  ██║███████╗██║ ╚████║██████╔╝███████╗██║  ██║
// ╚═╝  ╚═╝╚══════╝╚═╝  ╚═══╝╚═════╝ ╚══════╝╚═╝  ╚═╝

/// Places each camera on its body. The eye rides the top of the body shape,
/// so it sinks while crouched.
pub fn fps_controller_render(
    mut render_query: Query<(&mut Transform, &RenderPlayer, &CameraRig)>,
    logical_query: Query<
        (&Transform, Option<&LocomotionController>),
        (With<LogicalPlayer>, Without<RenderPlayer>),
    >,
) {
    for (mut render_transform, render_player, rig) in render_query.iter_mut() {
        if let Ok((logical_transform, controller)) = logical_query.get(render_player.logical_entity)
        {
            let eye_drop = controller.map_or(Vec3::ZERO, LocomotionController::eye_drop);
            render_transform.translation = logical_transform.translation
                + logical_transform.rotation * (rig.local_position + eye_drop);
            render_transform.rotation = logical_transform.rotation * rig.local_rotation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    fn spawn_body(world: &mut World) -> Entity {
        let logical = world.spawn(FpsController::default()).id();
        let body = world.spawn(BodyCollider).id();
        world.entity_mut(logical).add_child(body);
        logical
    }

    #[test]
    fn attach_links_body_and_camera() {
        let mut world = World::new();
        let logical = spawn_body(&mut world);
        let camera = world
            .spawn((
                RenderPlayer {
                    logical_entity: logical,
                },
                CameraRig::at(Vec3::new(0.0, 0.9, 0.0)),
            ))
            .id();

        let result = world.run_system_once(attach_fps_controllers).unwrap();
        assert!(result.is_ok());

        let links = world.get::<ControllerLinks>(logical).unwrap();
        assert_eq!(links.camera, camera);
        let controller = world.get::<LocomotionController>(logical).unwrap();
        assert_eq!(controller.headbob().rest(), Vec3::new(0.0, 0.9, 0.0));
    }

    #[test]
    fn attach_without_camera_fails() {
        let mut world = World::new();
        spawn_body(&mut world);

        let result = world.run_system_once(attach_fps_controllers).unwrap();
        let error = result.unwrap_err();
        assert!(error.to_string().contains("RenderPlayer"));
    }

    #[test]
    fn attach_without_body_fails() {
        let mut world = World::new();
        let logical = world.spawn(FpsController::default()).id();
        world.spawn(RenderPlayer {
            logical_entity: logical,
        });

        let result = world.run_system_once(attach_fps_controllers).unwrap();
        let error = result.unwrap_err();
        assert!(error.to_string().contains("BodyCollider"));
        assert!(world.get::<LocomotionController>(logical).is_none());
    }

    #[test]
    fn render_places_camera_on_body() {
        let mut world = World::new();
        let logical = world
            .spawn((
                LogicalPlayer,
                Transform::from_xyz(1.0, 2.0, 3.0)
                    .with_rotation(Quat::from_rotation_y(std::f32::consts::PI)),
            ))
            .id();
        let camera = world
            .spawn((
                RenderPlayer {
                    logical_entity: logical,
                },
                CameraRig::at(Vec3::new(0.5, 0.7, 0.0)),
                Transform::default(),
            ))
            .id();

        world.run_system_once(fps_controller_render).unwrap();

        let transform = world.get::<Transform>(camera).unwrap();
        let expected = Vec3::new(0.5, 2.7, 3.0);
        assert!((transform.translation - expected).length() < 1.0e-5);
    }
}
