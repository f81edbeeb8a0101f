//! Named tile fields owned by the host.
//!
//! An entity's look is a set of named tile fields (`graphic`,
//! `graphic-left`, `graphic-up-move`, ...). The renderer only ever draws the
//! live [`GRAPHIC_FIELD`]; the graphic resolver copies one of the other
//! fields into it as the entity turns and moves.

use bevy_ecs::prelude::Component;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Identifier of a tile in the host's tileset.
pub type TileId = u32;

/// Name of the field the renderer draws.
pub const GRAPHIC_FIELD: &str = "graphic";

#[derive(Component, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphicFields {
    fields: FxHashMap<String, TileId>,
}

impl GraphicFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, tile: TileId) -> Self {
        self.fields.insert(name.into(), tile);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<TileId> {
        self.fields.get(name).copied()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Write a field. `None` removes it, which makes the entity invisible
    /// when done to [`GRAPHIC_FIELD`].
    pub fn set_field(&mut self, name: impl Into<String>, tile: Option<TileId>) {
        let name = name.into();
        match tile {
            Some(tile) => {
                self.fields.insert(name, tile);
            }
            None => {
                self.fields.remove(&name);
            }
        }
    }

    /// Tile currently drawn for the entity, if any.
    pub fn graphic(&self) -> Option<TileId> {
        self.get_field(GRAPHIC_FIELD)
    }
}
