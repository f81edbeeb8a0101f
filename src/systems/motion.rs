//! Motion systems.
//!
//! - [`advance_motion_system`] advances every in-flight motion once per tick
//!   and lands arriving entities exactly on their target cell.
//! - [`MotionRequests`] is the system parameter commands use to start
//!   motions and turn entities in place.
//! - [`begin_motion`] starts a motion from outside a system.
//!
//! # Per-tick flow
//!
//! 1. Each task samples its phase at [`WorldTime::now`].
//! 2. In-flight tasks write a pixel-snapped lerp to [`MapPosition`].
//! 3. Arriving tasks write the exact target, switch [`MoveState`] to idle,
//!    stamp [`MotionHistory`], resolve their completion and trigger
//!    [`MoveStateChangedEvent`] and [`MotionCompletedEvent`].
//!
//! Position and `is_moving` are written together inside one closure call,
//! so no reader ever sees one without the other.

use bevy_ecs::prelude::*;
use bevy_ecs::system::{SystemParam, SystemState};
use glam::IVec2;
use log::debug;
use smallvec::SmallVec;

use crate::completion::{Completion, resolved};
use crate::components::mapposition::MapPosition;
use crate::components::motionhistory::MotionHistory;
use crate::components::movestate::{Facing, MoveState};
use crate::events::motion::MotionCompletedEvent;
use crate::events::movestate::MoveStateChangedEvent;
use crate::resources::motionconfig::MotionConfig;
use crate::resources::motionscheduler::{
    MotionError, MotionOutcome, MotionProgress, MotionScheduler,
};
use crate::resources::worldtime::WorldTime;

/// Advance all active motions to the current tick.
pub fn advance_motion_system(
    time: Res<WorldTime>,
    config: Res<MotionConfig>,
    mut scheduler: ResMut<MotionScheduler>,
    mut movers: Query<(&mut MapPosition, &mut MoveState, Option<&mut MotionHistory>)>,
    mut commands: Commands,
) {
    let now = time.now();
    let mut unstamped: SmallVec<[Entity; 4]> = SmallVec::new();
    let arrived = scheduler.advance(now, config.tile_px, |entity, progress| {
        let Ok((mut position, mut state, history)) = movers.get_mut(entity) else {
            return false;
        };
        match progress {
            MotionProgress::InFlight(pos) => position.pos = pos,
            MotionProgress::Arrived(pos) => {
                position.pos = pos;
                state.on_motion_complete();
                match history {
                    Some(mut history) => history.latest_motion_end_time = Some(now),
                    None => unstamped.push(entity),
                }
            }
        }
        true
    });

    for entity in unstamped {
        commands.entity(entity).insert(MotionHistory {
            latest_motion_end_time: Some(now),
        });
    }
    for outcome in arrived {
        commands.trigger(MoveStateChangedEvent {
            entity: outcome.entity,
        });
        commands.trigger(MotionCompletedEvent {
            entity: outcome.entity,
            cell: outcome.cell,
            finished_at: outcome.finished_at,
        });
    }
}

/// System parameter for starting motions.
///
/// Reads positions but never writes them for smooth motion: the entity stays
/// on its start cell until the next tick advances the task. Instant moves
/// write the new position through `Commands`.
#[derive(SystemParam)]
pub struct MotionRequests<'w, 's> {
    scheduler: ResMut<'w, MotionScheduler>,
    time: Res<'w, WorldTime>,
    config: Res<'w, MotionConfig>,
    movers: Query<
        'w,
        's,
        (
            &'static MapPosition,
            &'static mut MoveState,
            Option<&'static mut MotionHistory>,
        ),
    >,
    commands: Commands<'w, 's>,
}

impl<'w, 's> MotionRequests<'w, 's> {
    pub fn now(&self) -> f64 {
        self.time.now()
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn commands(&mut self) -> &mut Commands<'w, 's> {
        &mut self.commands
    }

    pub fn is_moving(&self, entity: Entity) -> bool {
        self.scheduler.is_active(entity)
    }

    /// Cell the entity currently stands on (nearest cell while moving).
    pub fn cell_of(&self, entity: Entity) -> Option<IVec2> {
        self.movers.get(entity).ok().map(|(pos, _, _)| pos.cell())
    }

    /// Move `entity` one cell toward `facing`.
    pub fn begin(
        &mut self,
        entity: Entity,
        facing: Facing,
        duration: f64,
    ) -> Result<Completion<MotionOutcome>, MotionError> {
        let cell = self.cell_of(entity).ok_or(MotionError::NotMovable(entity))?;
        self.begin_to(entity, cell + facing.delta(), duration)
    }

    /// Move `entity` into the adjacent cell `target`.
    ///
    /// Rejected while the entity already has a motion in flight. With smooth
    /// motion off the entity lands on `target` immediately and the returned
    /// completion is already resolved.
    pub fn begin_to(
        &mut self,
        entity: Entity,
        target: IVec2,
        duration: f64,
    ) -> Result<Completion<MotionOutcome>, MotionError> {
        if self.scheduler.is_active(entity) {
            return Err(MotionError::AlreadyMoving(entity));
        }
        let now = self.time.now();
        let smooth = self.config.smooth_motion;
        let grace = self.config.continuity_grace;
        let Ok((position, mut state, history)) = self.movers.get_mut(entity) else {
            return Err(MotionError::NotMovable(entity));
        };
        let start = position.pos;
        let delta = target - position.cell();
        let Some(facing) = Facing::from_unit_delta(delta.x, delta.y) else {
            return Err(MotionError::NotAdjacent {
                start,
                target: target.as_vec2(),
            });
        };
        let delta = facing.delta();

        if !smooth {
            state.on_turn(delta.x, delta.y);
            self.commands.entity(entity).insert((
                MapPosition::from_cell(target),
                MotionHistory {
                    latest_motion_end_time: Some(now),
                },
            ));
            self.commands.trigger(MoveStateChangedEvent { entity });
            self.commands.trigger(MotionCompletedEvent {
                entity,
                cell: target,
                finished_at: now,
            });
            debug!("Instant move {:?} -> {:?}", entity, target);
            return Ok(resolved(MotionOutcome {
                entity,
                cell: target,
                finished_at: now,
            }));
        }

        let last_end = history.and_then(|h| h.latest_motion_end_time);
        let handle = self.scheduler.begin(
            entity,
            start,
            target.as_vec2(),
            duration,
            now,
            grace,
            last_end,
        )?;
        state.on_motion_start(delta.x, delta.y);
        self.commands.trigger(MoveStateChangedEvent { entity });
        Ok(handle)
    }

    /// Turn `entity` toward `facing` without moving it.
    pub fn turn(&mut self, entity: Entity, facing: Facing) -> Result<(), MotionError> {
        if self.scheduler.is_active(entity) {
            return Err(MotionError::AlreadyMoving(entity));
        }
        let Ok((_, mut state, _)) = self.movers.get_mut(entity) else {
            return Err(MotionError::NotMovable(entity));
        };
        let delta = facing.delta();
        state.on_turn(delta.x, delta.y);
        self.commands.trigger(MoveStateChangedEvent { entity });
        Ok(())
    }

    /// Drop the continuity stamp so the next motion starts on its own time.
    pub fn forget_continuity(&mut self, entity: Entity) {
        if let Ok((_, _, Some(mut history))) = self.movers.get_mut(entity) {
            history.latest_motion_end_time = None;
        }
    }
}

/// Start a motion of `entity` into the adjacent cell `target` from outside a
/// system.
pub fn begin_motion(
    world: &mut World,
    entity: Entity,
    target: IVec2,
    duration: f64,
) -> Result<Completion<MotionOutcome>, MotionError> {
    let mut state: SystemState<MotionRequests> = SystemState::new(world);
    let result = {
        let mut requests = state.get_mut(world);
        requests.begin_to(entity, target, duration)
    };
    state.apply(world);
    result
}
