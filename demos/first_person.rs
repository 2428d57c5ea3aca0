//! First-person walk-around.
//!
//! - WASD to move, mouse to look
//! - Shift to sprint, Space to jump
//! - Hold Ctrl to crouch; you stay down under the low slab until you clear it
//! - Click to capture the cursor, Escape to release it

use std::f32::consts::TAU;

use avian3d::prelude::*;
use bevy::{
    diagnostic::{EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin},
    prelude::*,
    render::camera::Exposure,
};
use bevy_framepace::{FramepacePlugin, FramepaceSettings, Limiter};
use fps_locomotion::*;
use iyes_perf_ui::prelude::*;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            PhysicsPlugins::default(),
            FramepacePlugin,
            FrameTimeDiagnosticsPlugin::default(),
            EntityCountDiagnosticsPlugin,
            PerfUiPlugin,
            InputFocusPlugin,
            FpsControllerPlugin,
        ))
        .insert_resource(FramepaceSettings {
            limiter: Limiter::from_framerate(96.0),
        })
        .add_systems(Startup, setup)
        .add_systems(Update, display_text.after(fps_controller_move))
        .run();
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn(PerfUiDefaultEntries::default());

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::FULL_DAYLIGHT,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 7.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Note that we have two entities for the player
    // One is a "logical" player that handles the movement and collision
    // The other is a "render" player that is what is displayed to the user
    let config = FpsControllerConfig::default();
    let logical_entity = commands
        .spawn((
            RigidBody::Kinematic,
            Transform::from_xyz(0.0, 1.5, 0.0)
                .with_rotation(Quat::from_rotation_y(TAU * 5.0 / 8.0)),
            FpsController {
                config,
                ..default()
            },
        ))
        .with_children(|body| {
            body.spawn((
                BodyCollider,
                Collider::cylinder(0.5, config.crouch.standing.height),
            ));
        })
        .id();

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: TAU / 5.0,
            ..default()
        }),
        Exposure::SUNLIGHT,
        RenderPlayer { logical_entity },
        CameraRig::at(Vec3::new(0.0, 0.7, 0.0)),
    ));

    let stone = materials.add(Color::srgb(0.8, 0.7, 0.6));

    // floor
    commands.spawn((
        RigidBody::Static,
        Collider::cuboid(100.0, 1.0, 100.0),
        Mesh3d(meshes.add(Cuboid::new(100.0, 1.0, 100.0))),
        MeshMaterial3d(stone.clone()),
        Transform::from_xyz(10.0, -0.5, 3.0),
    ));

    // A low slab to crouch under
    commands.spawn((
        RigidBody::Static,
        Collider::cuboid(4.0, 0.5, 4.0),
        Mesh3d(meshes.add(Cuboid::new(4.0, 0.5, 4.0))),
        MeshMaterial3d(stone.clone()),
        Transform::from_xyz(6.0, 1.75, 0.0),
    ));
    for (x, z) in [(4.25, -1.75), (4.25, 1.75), (7.75, -1.75), (7.75, 1.75)] {
        commands.spawn((
            RigidBody::Static,
            Collider::cuboid(0.5, 1.5, 0.5),
            Mesh3d(meshes.add(Cuboid::new(0.5, 1.5, 0.5))),
            MeshMaterial3d(stone.clone()),
            Transform::from_xyz(x, 0.75, z),
        ));
    }

    // Light
    commands.spawn((
        PointLight {
            intensity: 2_000_000.0,
            range: 50.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(0.0, 15.0, 0.0),
    ));

    commands.spawn((
        Text::default(),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));
}

fn display_text(
    controller_query: Query<
        (&Transform, &LocomotionController, &KinematicMover),
        With<LogicalPlayer>,
    >,
    mut text_query: Query<&mut Text>,
) {
    for (transform, controller, mover) in &controller_query {
        for mut text in &mut text_query {
            let velocity = controller.move_direction();
            text.0 = format!(
                "vel: {:.2}, {:.2}, {:.2}\npos: {:.2}, {:.2}, {:.2}\n\
                 gait: {:?} ({:.1})\ngrounded: {} crouching: {}",
                velocity.x,
                velocity.y,
                velocity.z,
                transform.translation.x,
                transform.translation.y,
                transform.translation.z,
                controller.gait(),
                controller.current_speed(),
                mover.is_grounded(),
                controller.is_crouching(),
            );
        }
    }
}
