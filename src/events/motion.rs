use bevy_ecs::prelude::*;
use glam::IVec2;

/// Event fired on the tick a motion reaches its target cell.
///
/// By the time observers run, the entity's position is exactly `cell` and
/// its move state is idle.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct MotionCompletedEvent {
    pub entity: Entity,
    pub cell: IVec2,
    /// Tick timestamp (ms) of arrival.
    pub finished_at: f64,
}
