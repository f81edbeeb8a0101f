use bevy_ecs::prelude::*;

use crate::components::graphicfields::TileId;

/// Event fired when a staged tile swap is written to the live graphic.
///
/// `tile` is `None` when the resolved field had no data and the entity is
/// now drawn with nothing.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct GraphicCommittedEvent {
    pub entity: Entity,
    pub field_name: String,
    pub tile: Option<TileId>,
}
