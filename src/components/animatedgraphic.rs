//! Bookkeeping for entities whose tile follows their move state.
//!
//! Attaching [`AnimatedGraphic`] opts an entity into the graphic resolver.
//! The component remembers which field was last committed to the live
//! `graphic` field and, after the first state change, a snapshot of every
//! field the resolver may pick with its fallbacks already applied.

use bevy_ecs::prelude::Component;
use rustc_hash::FxHashMap;

use crate::components::graphicfields::TileId;

/// Resolved tiles for every field name the resolver can produce.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSnapshot {
    /// The entity uses the single `graphic-idle`/`graphic-move` pair.
    pub uses_alt_tiles: bool,
    pub tiles: FxHashMap<String, Option<TileId>>,
}

impl FieldSnapshot {
    /// Tile for a resolved field name. Unknown names draw nothing.
    pub fn tile(&self, name: &str) -> Option<TileId> {
        self.tiles.get(name).copied().flatten()
    }
}

#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct AnimatedGraphic {
    /// Field name last copied into the live graphic.
    pub current_name: Option<String>,
    /// Filled in lazily on the first state change.
    pub snapshot: Option<FieldSnapshot>,
}

impl AnimatedGraphic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uses_alt_tiles(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.uses_alt_tiles)
    }
}
