//! Move-state transition event.
//!
//! Triggered after every [`MoveState`](crate::components::movestate::MoveState)
//! transition, whether or not it changed the observable state. The graphic
//! resolver relies on the unchanged case too: a transition back to the
//! state already on screen discards a staged swap.

use bevy_ecs::prelude::*;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveStateChangedEvent {
    pub entity: Entity,
}
