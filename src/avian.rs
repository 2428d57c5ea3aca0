//! avian3d-backed collaborators: a kinematic collide-and-slide mover and a
//! ray probe, both reading the spatial query pipeline.

use avian3d::{parry::shape::SharedShape, prelude::*};
use bevy::prelude::*;

use crate::{BodyGeometry, Mover, SpatialProbe};

// Used by the ground cast so a wall the body is pressed against does not
// count as floor.
const SLIGHT_SCALE_DOWN: f32 = 0.9375;

/// Marks the child entity that carries the body's collider. Its local
/// translation is the body geometry center.
#[derive(Component, Reflect, Debug, Default)]
#[reflect(Component)]
#[require(Transform)]
pub struct BodyCollider;

/// Tuning and last-known ground state for [`AvianMover`].
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct KinematicMover {
    /// If the distance to the ground is less than this value, the body is
    /// considered grounded.
    pub grounded_distance: f32,
    /// If the dot product of the ground normal and up is greater than this
    /// value, the surface is walkable.
    pub traction_normal_cutoff: f32,
    /// Gap kept between the collider and whatever it hits.
    pub skin_width: f32,
    pub max_slides: u8,
    grounded: bool,
}

impl Default for KinematicMover {
    fn default() -> Self {
        Self {
            grounded_distance: 0.125,
            traction_normal_cutoff: 0.7,
            skin_width: 0.01,
            max_slides: 4,
            grounded: false,
        }
    }
}

impl KinematicMover {
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }
}

pub struct AvianMover<'a> {
    pipeline: &'a SpatialQueryPipeline,
    filter: &'a SpatialQueryFilter,
    settings: &'a mut KinematicMover,
    translation: &'a mut Vec3,
    rotation: Quat,
    collider: &'a Collider,
    center: Vec3,
}

impl<'a> AvianMover<'a> {
    pub fn new(
        pipeline: &'a SpatialQueryPipeline,
        filter: &'a SpatialQueryFilter,
        settings: &'a mut KinematicMover,
        translation: &'a mut Vec3,
        rotation: Quat,
        collider: &'a Collider,
        center: Vec3,
    ) -> Self {
        Self {
            pipeline,
            filter,
            settings,
            translation,
            rotation,
            collider,
            center,
        }
    }

    fn shape_origin(&self) -> Vec3 {
        *self.translation + self.rotation * self.center
    }

    fn touches_ground(&self) -> bool {
        // Shape cast downwards to find ground
        // Better than a ray cast as it handles when you are near the edge of a surface
        self.pipeline
            .cast_shape(
                &scaled_collider_laterally(self.collider, SLIGHT_SCALE_DOWN),
                self.shape_origin(),
                self.rotation,
                Dir3::NEG_Y,
                &ShapeCastConfig::from_max_distance(self.settings.grounded_distance),
                self.filter,
            )
            .is_some_and(|hit| {
                Vec3::dot(hit.normal1, Vec3::Y) > self.settings.traction_normal_cutoff
            })
    }
}

impl Mover for AvianMover<'_> {
    fn move_by(&mut self, displacement: Vec3) {
        let skin = self.settings.skin_width;
        let mut remaining = displacement;
        for _ in 0..self.settings.max_slides {
            let Ok((direction, distance)) = Dir3::new_and_length(remaining) else {
                break;
            };
            let hit = self.pipeline.cast_shape(
                self.collider,
                self.shape_origin(),
                self.rotation,
                direction,
                &ShapeCastConfig::from_max_distance(distance + skin),
                self.filter,
            );
            let Some(hit) = hit else {
                *self.translation += remaining;
                break;
            };
            let travel = (hit.distance - skin).clamp(0.0, distance);
            *self.translation += direction * travel;

            // Slide the rest along the surface we hit.
            let leftover = direction * (distance - travel);
            remaining = leftover - Vec3::dot(leftover, hit.normal1) * hit.normal1;
        }
        self.settings.grounded = displacement.y <= 0.0 && self.touches_ground();
    }

    fn is_grounded(&self) -> bool {
        self.settings.grounded
    }

    fn position(&self) -> Vec3 {
        *self.translation
    }
}

pub struct AvianProbe<'a> {
    pipeline: &'a SpatialQueryPipeline,
    filter: &'a SpatialQueryFilter,
}

impl<'a> AvianProbe<'a> {
    pub fn new(pipeline: &'a SpatialQueryPipeline, filter: &'a SpatialQueryFilter) -> Self {
        Self { pipeline, filter }
    }
}

impl SpatialProbe for AvianProbe<'_> {
    fn probe(&self, origin: Vec3, direction: Dir3, max_distance: f32) -> bool {
        self.pipeline
            .cast_ray(origin, direction, max_distance, true, self.filter)
            .is_some()
    }
}

/// Resizes a cylinder or capsule collider to `geometry.height` and moves it
/// to `geometry.center`. Other shapes only move.
pub fn apply_body_geometry(
    collider: &mut Collider,
    transform: &mut Transform,
    geometry: BodyGeometry,
) {
    if transform.translation != geometry.center {
        transform.translation = geometry.center;
    }

    let shape = collider.shape();
    let resized = if let Some(cylinder) = shape.as_cylinder() {
        let half_height = geometry.height * 0.5;
        (cylinder.half_height != half_height)
            .then(|| SharedShape::cylinder(half_height, cylinder.radius))
    } else if let Some(capsule) = shape.as_capsule() {
        let half_segment = (geometry.height * 0.5 - capsule.radius).max(0.0);
        (capsule.half_height() != half_segment)
            .then(|| SharedShape::capsule_y(half_segment, capsule.radius))
    } else {
        None
    };
    if let Some(resized) = resized {
        collider.set_shape(resized);
    }
}

/// Return a collider that is scaled laterally (XZ plane) but not vertically (Y axis).
fn scaled_collider_laterally(collider: &Collider, scale: f32) -> Collider {
    if let Some(cylinder) = collider.shape().as_cylinder() {
        Collider::cylinder(cylinder.radius * scale, cylinder.half_height * 2.0)
    } else if let Some(capsule) = collider.shape().as_capsule() {
        Collider::capsule(capsule.radius * scale, capsule.half_height() * 2.0)
    } else {
        collider.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::{ecs::system::RunSystemOnce, time::TimeUpdateStrategy};
    use std::time::Duration;

    fn physics_app() -> App {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            TransformPlugin,
            PhysicsPlugins::default(),
            bevy::asset::AssetPlugin::default(),
            bevy::scene::ScenePlugin,
        ))
        .init_resource::<Assets<Mesh>>()
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            1.0 / 60.0,
        )));
        app.finish();
        app
    }

    /// A static slab whose top face is at `top`.
    fn spawn_slab(app: &mut App, top: f32) {
        app.world_mut().spawn((
            RigidBody::Static,
            Collider::cuboid(20.0, 0.5, 20.0),
            Transform::from_xyz(0.0, top - 0.25, 0.0),
        ));
    }

    fn settle(app: &mut App) {
        for _ in 0..4 {
            app.update();
        }
        app.world_mut()
            .run_system_once(|mut spatial_query: SpatialQuery| spatial_query.update_pipeline())
            .unwrap();
    }

    /// Moves a 2 unit tall cylinder pivoted at its center from `start` and
    /// reports where it ended and whether it landed.
    fn move_body(app: &mut App, start: Vec3, displacement: Vec3) -> (Vec3, bool) {
        app.world_mut()
            .run_system_once(move |pipeline: Res<SpatialQueryPipeline>| {
                let filter = SpatialQueryFilter::default();
                let collider = Collider::cylinder(0.5, 2.0);
                let mut settings = KinematicMover::default();
                let mut translation = start;
                let mut mover = AvianMover::new(
                    &pipeline,
                    &filter,
                    &mut settings,
                    &mut translation,
                    Quat::IDENTITY,
                    &collider,
                    Vec3::ZERO,
                );
                mover.move_by(displacement);
                let grounded = mover.is_grounded();
                assert_eq!(grounded, settings.is_grounded());
                (translation, grounded)
            })
            .unwrap()
    }

    fn probe(app: &mut App, origin: Vec3, max_distance: f32) -> bool {
        app.world_mut()
            .run_system_once(move |pipeline: Res<SpatialQueryPipeline>| {
                let filter = SpatialQueryFilter::default();
                AvianProbe::new(&pipeline, &filter).probe(origin, Dir3::Y, max_distance)
            })
            .unwrap()
    }

    #[test]
    fn falling_body_stops_a_skin_above_the_floor_and_lands() {
        let mut app = physics_app();
        spawn_slab(&mut app, 0.0);
        settle(&mut app);

        let (end, grounded) = move_body(&mut app, Vec3::new(0.0, 1.5, 0.0), Vec3::NEG_Y);

        let skin = KinematicMover::default().skin_width;
        assert!((end.y - (1.0 + skin)).abs() < 1.0e-3, "ended at {end}");
        assert!(grounded);
    }

    #[test]
    fn rising_body_is_never_grounded() {
        let mut app = physics_app();
        spawn_slab(&mut app, 0.0);
        settle(&mut app);

        let (end, grounded) = move_body(&mut app, Vec3::new(0.0, 1.01, 0.0), Vec3::Y * 0.1);

        assert!((end.y - 1.11).abs() < 1.0e-4);
        assert!(!grounded);
    }

    #[test]
    fn falling_far_above_the_floor_is_airborne() {
        let mut app = physics_app();
        spawn_slab(&mut app, 0.0);
        settle(&mut app);

        let (end, grounded) = move_body(&mut app, Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y * 0.1);

        assert!((end.y - 4.9).abs() < 1.0e-4);
        assert!(!grounded);
    }

    #[test]
    fn probe_hits_slab_within_reach_only() {
        let mut app = physics_app();
        spawn_slab(&mut app, 3.0);
        settle(&mut app);

        // The slab's underside is at 2.5.
        assert!(probe(&mut app, Vec3::new(0.0, 2.0, 0.0), 1.0));
        assert!(!probe(&mut app, Vec3::new(0.0, 1.0, 0.0), 1.0));
    }

    #[test]
    fn geometry_resizes_cylinder_and_moves_center() {
        let mut collider = Collider::cylinder(0.5, 2.0);
        let mut transform = Transform::default();
        let geometry = BodyGeometry::new(1.0, Vec3::new(0.0, -0.5, 0.0));

        apply_body_geometry(&mut collider, &mut transform, geometry);

        let cylinder = collider.shape().as_cylinder().unwrap();
        assert_eq!(cylinder.half_height, 0.5);
        assert_eq!(cylinder.radius, 0.5);
        assert_eq!(transform.translation, geometry.center);
    }

    #[test]
    fn geometry_resizes_capsule_segment() {
        let mut collider = Collider::capsule(0.4, 1.2);
        let mut transform = Transform::default();

        apply_body_geometry(&mut collider, &mut transform, BodyGeometry::new(1.0, Vec3::ZERO));

        let capsule = collider.shape().as_capsule().unwrap();
        assert!((capsule.half_height() - 0.1).abs() < 1.0e-5);
        assert_eq!(capsule.radius, 0.4);
    }

    #[test]
    fn lateral_scale_keeps_height() {
        let collider = Collider::cylinder(0.5, 2.0);
        let scaled = scaled_collider_laterally(&collider, 0.5);
        let cylinder = scaled.shape().as_cylinder().unwrap();
        assert_eq!(cylinder.radius, 0.25);
        assert_eq!(cylinder.half_height, 1.0);
    }
}
