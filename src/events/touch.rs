//! Avatar touch events.
//!
//! When the avatar arrives in a cell, or bumps into a solid entity, every
//! other entity in that cell is touched once. Game logic (dialogue,
//! pickups, exits) subscribes to [`TouchEvent`].

use bevy_ecs::prelude::*;
use glam::IVec2;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchEvent {
    /// The avatar doing the touching.
    pub avatar: Entity,
    /// The entity being touched.
    pub target: Entity,
    /// Cell the touch happened in.
    pub cell: IVec2,
}
