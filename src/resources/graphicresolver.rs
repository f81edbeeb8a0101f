//! Move-state to tile-field resolution with debounced swaps.
//!
//! The resolver maps an entity's `(facing, is_moving)` state to the name of
//! one of its tile fields, then copies that field into the live `graphic`
//! field after a short delay.
//!
//! # Field names
//!
//! | state             | field               |
//! |-------------------|---------------------|
//! | idle, down        | `graphic`           |
//! | idle, other       | `graphic-<facing>`  |
//! | moving, any       | `graphic-<facing>-move` |
//! | alt pair, idle    | `graphic-idle`      |
//! | alt pair, moving  | `graphic-move`      |
//!
//! Missing fields fall back: a moving field to its facing's idle field, any
//! idle field to `graphic`. No `graphic` means nothing is drawn.
//!
//! # Debounce
//!
//! Crossing several cells in a row produces an idle state that lasts a
//! single tick. Swaps are therefore staged with a tick delay and dropped if
//! the state returns to the committed field before the delay runs out.

use arrayvec::ArrayVec;
use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;

use crate::components::animatedgraphic::FieldSnapshot;
use crate::components::graphicfields::{GRAPHIC_FIELD, GraphicFields};
use crate::components::movestate::Facing;

const MOVE_SUFFIX: &str = "-move";
const ALT_MOVE_FIELD: &str = "graphic-move";
const ALT_IDLE_FIELD: &str = "graphic-idle";

/// Field name for a move state.
pub fn resolve_field_name(facing: Facing, is_moving: bool, uses_alt_tiles: bool) -> String {
    if uses_alt_tiles {
        let name = if is_moving { ALT_MOVE_FIELD } else { ALT_IDLE_FIELD };
        return name.to_string();
    }
    match (facing, is_moving) {
        (Facing::Down, false) => GRAPHIC_FIELD.to_string(),
        (facing, false) => format!("{}-{}", GRAPHIC_FIELD, facing.as_str()),
        (facing, true) => format!("{}-{}{}", GRAPHIC_FIELD, facing.as_str(), MOVE_SUFFIX),
    }
}

/// Names to try, in order, when looking up the data for `name`.
pub fn fallback_chain(name: &str) -> ArrayVec<String, 3> {
    let mut chain = ArrayVec::new();
    chain.push(name.to_string());
    if name == GRAPHIC_FIELD {
        return chain;
    }
    if let Some(direction) = name
        .strip_prefix("graphic-")
        .and_then(|rest| rest.strip_suffix(MOVE_SUFFIX))
    {
        if direction != Facing::Down.as_str() {
            chain.push(format!("{}-{}", GRAPHIC_FIELD, direction));
        }
    }
    chain.push(GRAPHIC_FIELD.to_string());
    chain
}

/// Every field name the resolver can produce for an entity.
fn used_field_names(smooth_motion: bool, uses_alt_tiles: bool) -> Vec<String> {
    if uses_alt_tiles {
        return vec![
            GRAPHIC_FIELD.to_string(),
            ALT_IDLE_FIELD.to_string(),
            ALT_MOVE_FIELD.to_string(),
        ];
    }
    let mut names = Vec::with_capacity(8);
    for facing in Facing::ALL {
        names.push(resolve_field_name(facing, false, false));
        if smooth_motion {
            names.push(resolve_field_name(facing, true, false));
        }
    }
    names
}

/// Resolve every used field of an entity through its fallback chain.
///
/// The alternate idle/move pair is only honoured with smooth motion, since
/// instant moves never show a moving state.
pub fn snapshot_fields(fields: &GraphicFields, smooth_motion: bool) -> FieldSnapshot {
    let uses_alt_tiles = smooth_motion && fields.has_field(ALT_MOVE_FIELD);
    let tiles = used_field_names(smooth_motion, uses_alt_tiles)
        .into_iter()
        .map(|name| {
            let tile = fallback_chain(&name)
                .iter()
                .find_map(|candidate| fields.get_field(candidate));
            (name, tile)
        })
        .collect();
    FieldSnapshot {
        uses_alt_tiles,
        tiles,
    }
}

/// A swap waiting for its delay to run out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGraphicChange {
    pub field_name: String,
    pub ticks_left: u32,
}

/// What [`GraphicResolver::stage`] did with a resolved name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageResult {
    Staged,
    /// The name is already on screen; any staged swap was dropped.
    Discarded,
}

#[derive(Resource, Debug, Default)]
pub struct GraphicResolver {
    pending: FxHashMap<Entity, PendingGraphicChange>,
}

impl GraphicResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `field_name` for `entity`, replacing any earlier staged swap.
    pub fn stage(
        &mut self,
        entity: Entity,
        field_name: String,
        committed: Option<&str>,
        delay: u32,
    ) -> StageResult {
        if committed == Some(field_name.as_str()) {
            self.pending.remove(&entity);
            return StageResult::Discarded;
        }
        self.pending.insert(
            entity,
            PendingGraphicChange {
                field_name,
                ticks_left: delay,
            },
        );
        StageResult::Staged
    }

    pub fn pending(&self, entity: Entity) -> Option<&PendingGraphicChange> {
        self.pending.get(&entity)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Count down staged swaps and return those due for commit this tick.
    pub fn tick(&mut self) -> Vec<(Entity, String)> {
        let mut due = Vec::new();
        self.pending.retain(|entity, change| {
            if change.ticks_left > 0 {
                change.ticks_left -= 1;
                return true;
            }
            due.push((*entity, std::mem::take(&mut change.field_name)));
            false
        });
        due
    }
}
