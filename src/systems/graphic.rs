//! Graphic swaps driven by move state.
//!
//! - [`stage_graphic_change_observer`] reacts to every
//!   [`MoveStateChangedEvent`] by resolving the field name for the new state
//!   and staging it in the [`GraphicResolver`].
//! - [`commit_pending_graphics_system`] runs last in the tick and copies due
//!   swaps into the live `graphic` field.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::animatedgraphic::AnimatedGraphic;
use crate::components::graphicfields::{GRAPHIC_FIELD, GraphicFields};
use crate::components::movestate::MoveState;
use crate::events::graphic::GraphicCommittedEvent;
use crate::events::movestate::MoveStateChangedEvent;
use crate::resources::graphicresolver::{
    GraphicResolver, StageResult, resolve_field_name, snapshot_fields,
};
use crate::resources::motionconfig::MotionConfig;

/// Stage the field matching an entity's new move state.
///
/// The field snapshot is taken here on the first change, before anything
/// has been written to the live field.
pub fn stage_graphic_change_observer(
    trigger: On<MoveStateChangedEvent>,
    config: Res<MotionConfig>,
    mut resolver: ResMut<GraphicResolver>,
    mut animated: Query<(&MoveState, &mut AnimatedGraphic, Option<&GraphicFields>)>,
) {
    let entity = trigger.event().entity;
    let Ok((state, mut graphic, fields)) = animated.get_mut(entity) else {
        return;
    };
    if graphic.snapshot.is_none() {
        let snapshot = match fields {
            Some(fields) => snapshot_fields(fields, config.smooth_motion),
            None => snapshot_fields(&GraphicFields::new(), config.smooth_motion),
        };
        graphic.snapshot = Some(snapshot);
    }

    let name = resolve_field_name(state.facing, state.is_moving, graphic.uses_alt_tiles());
    let result = resolver.stage(
        entity,
        name,
        graphic.current_name.as_deref(),
        config.graphic_swap_delay(),
    );
    if result == StageResult::Discarded {
        debug!("{:?}: state returned to the committed graphic", entity);
    }
}

/// Commit staged graphic swaps whose delay ran out.
pub fn commit_pending_graphics_system(
    mut resolver: ResMut<GraphicResolver>,
    mut animated: Query<(&mut AnimatedGraphic, &mut GraphicFields)>,
    mut commands: Commands,
) {
    for (entity, field_name) in resolver.tick() {
        let Ok((mut graphic, mut fields)) = animated.get_mut(entity) else {
            continue;
        };
        let tile = graphic
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.tile(&field_name));
        fields.set_field(GRAPHIC_FIELD, tile);
        graphic.current_name = Some(field_name.clone());
        commands.trigger(GraphicCommittedEvent {
            entity,
            field_name,
            tile,
        });
    }
}
