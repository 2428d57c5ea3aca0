use bevy::prelude::*;
use thiserror::Error;

/// A controller was spawned without the entities it needs to run.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("controller {0:?} has no BodyCollider child to move")]
    MissingMover(Entity),
    #[error("controller {0:?} has no RenderPlayer camera pointing at it")]
    MissingCamera(Entity),
}
