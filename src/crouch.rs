//! Stance changes between the standing and crouching body shapes.
//!
//! A change is a single in-flight [`CrouchTransition`] advanced once per
//! tick. Re-triggering replaces it with a new transition that starts from
//! whatever shape the body has at that moment, so the body never jumps.
//!
//! The transition ends once `elapsed >= duration` without snapping to the
//! target; the last sample is at most one tick short of it.

use bevy::prelude::*;

use crate::{BodyGeometry, CrouchGeometry};

#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct CrouchTransition {
    pub start: BodyGeometry,
    pub target: BodyGeometry,
    pub elapsed: f32,
    pub duration: f32,
}

impl CrouchTransition {
    pub fn new(start: BodyGeometry, target: BodyGeometry, duration: f32) -> Self {
        Self {
            start,
            target,
            elapsed: 0.0,
            duration,
        }
    }

    /// Shape at the current elapsed time.
    pub fn sample(&self) -> BodyGeometry {
        let t = if self.duration > 0.0 {
            (self.elapsed / self.duration).min(1.0)
        } else {
            1.0
        };
        self.start.lerp(self.target, t)
    }

    /// Samples, then moves time forward. Returns the sample and whether the
    /// transition is still running.
    pub fn advance(&mut self, dt: f32) -> (BodyGeometry, bool) {
        let geometry = self.sample();
        self.elapsed += dt;
        (geometry, self.elapsed < self.duration)
    }
}

/// Why a stance change did or did not happen this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StanceChange {
    Crouched,
    Stood,
    /// Standing up was refused because of something overhead.
    Blocked,
}

/// Body shape and stance, plus the in-flight transition if any.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct Stance {
    crouching: bool,
    geometry: BodyGeometry,
    transition: Option<CrouchTransition>,
}

impl Stance {
    pub fn standing(crouch: &CrouchGeometry) -> Self {
        Self {
            crouching: false,
            geometry: crouch.standing,
            transition: None,
        }
    }

    pub fn is_crouching(&self) -> bool {
        self.crouching
    }

    pub fn geometry(&self) -> BodyGeometry {
        self.geometry
    }

    pub fn transition(&self) -> Option<&CrouchTransition> {
        self.transition.as_ref()
    }

    /// Flips the stance and restarts the transition from the current shape.
    /// `blocked_overhead` is only consulted when standing up.
    pub fn toggle(&mut self, crouch: &CrouchGeometry, blocked_overhead: bool) -> StanceChange {
        if self.crouching && blocked_overhead {
            return StanceChange::Blocked;
        }
        self.crouching = !self.crouching;
        self.transition = Some(CrouchTransition::new(
            self.geometry,
            crouch.for_stance(self.crouching),
            crouch.transition_duration,
        ));
        if self.crouching {
            StanceChange::Crouched
        } else {
            StanceChange::Stood
        }
    }

    /// Runs the in-flight transition for one tick.
    pub fn tick(&mut self, dt: f32) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        let (geometry, running) = transition.advance(dt);
        self.geometry = geometry;
        if !running {
            self.transition = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1.0e-5
    }

    fn crouch() -> CrouchGeometry {
        CrouchGeometry {
            standing: BodyGeometry::new(2.0, Vec3::ZERO),
            crouching: BodyGeometry::new(1.0, Vec3::new(0.0, -0.5, 0.0)),
            transition_duration: 0.25,
            ceiling_probe_distance: 1.0,
        }
    }

    #[test]
    fn first_sample_is_start() {
        let crouch = crouch();
        let mut transition = CrouchTransition::new(crouch.standing, crouch.crouching, 0.25);
        let (geometry, running) = transition.advance(0.1);
        assert_eq!(geometry, crouch.standing);
        assert!(running);
    }

    #[test]
    fn ends_within_one_step_of_target() {
        let crouch = crouch();
        let dt = 0.1;
        let mut stance = Stance::standing(&crouch);
        stance.toggle(&crouch, false);

        let mut ticks = 0;
        while stance.transition().is_some() {
            stance.tick(dt);
            ticks += 1;
            assert!(ticks < 100);
        }

        let step = (crouch.standing.height - crouch.crouching.height) * dt / 0.25;
        let height = stance.geometry().height;
        assert!(height >= crouch.crouching.height);
        assert!(height - crouch.crouching.height <= step + 1.0e-5);
    }

    #[test]
    fn blocked_stand_changes_nothing() {
        let crouch = crouch();
        let mut stance = Stance::standing(&crouch);
        stance.toggle(&crouch, false);
        for _ in 0..10 {
            stance.tick(0.1);
        }
        let before = stance;

        assert_eq!(stance.toggle(&crouch, true), StanceChange::Blocked);
        assert_eq!(stance, before);
        assert!(stance.is_crouching());
    }

    #[test]
    fn crouching_ignores_overhead() {
        let crouch = crouch();
        let mut stance = Stance::standing(&crouch);
        assert_eq!(stance.toggle(&crouch, true), StanceChange::Crouched);
        assert!(stance.is_crouching());
    }

    #[test]
    fn retrigger_starts_from_mid_transition_shape() {
        let crouch = crouch();
        let mut stance = Stance::standing(&crouch);
        stance.toggle(&crouch, false);
        stance.tick(0.1);
        stance.tick(0.1);
        let midway = stance.geometry();
        assert!(midway.height < 2.0 && midway.height > 1.0);

        assert_eq!(stance.toggle(&crouch, false), StanceChange::Stood);
        let transition = stance.transition().copied().unwrap();
        assert_eq!(transition.start, midway);
        assert_eq!(transition.target, crouch.standing);
        assert_eq!(transition.elapsed, 0.0);
    }

    #[test]
    fn midpoint_interpolates_height_and_center() {
        let crouch = crouch();
        let mut transition = CrouchTransition::new(crouch.standing, crouch.crouching, 0.2);
        transition.elapsed = 0.1;
        let geometry = transition.sample();
        assert!(approx_eq(geometry.height, 1.5));
        assert!(approx_eq(geometry.center.y, -0.25));
    }
}
