use bevy_ecs::prelude::Component;

/// Marker for entities that block the cell they stand in.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Solid;
