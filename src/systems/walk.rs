//! Scripted walks.
//!
//! [`start_walk`] attaches a [`WalkScript`] and starts its first step in the
//! same call. [`walk_script_system`] then moves every walk forward once per
//! tick, after motions were advanced, so a step that landed this tick is
//! followed by the next one without losing a frame.
//!
//! A step rejected because the entity is still moving is retried next tick.
//! A pause drops the entity's continuity stamp: the step after it always
//! takes its full duration.

use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemState;
use log::{debug, warn};
use thiserror::Error;

use crate::completion::{Completion, CompletionState, completion};
use crate::components::mapposition::MapPosition;
use crate::components::movestate::MoveState;
use crate::components::walkscript::{
    WalkOutcome, WalkProgress, WalkScript, WalkStep, parse_walk_sequence,
};
use crate::resources::motionscheduler::MotionError;
use crate::systems::motion::MotionRequests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WalkError {
    #[error("entity {0:?} is already walking")]
    AlreadyWalking(Entity),
    #[error("entity {0:?} cannot walk (missing position or move state)")]
    NotWalkable(Entity),
}

/// Walk `entity` through `sequence`, one cell per `step_duration` ms and
/// `pause_duration` ms per `.`.
pub fn start_walk(
    world: &mut World,
    entity: Entity,
    sequence: &str,
    step_duration: f64,
    pause_duration: f64,
) -> Result<Completion<WalkOutcome>, WalkError> {
    let Ok(entity_ref) = world.get_entity(entity) else {
        return Err(WalkError::NotWalkable(entity));
    };
    if !entity_ref.contains::<MapPosition>() || !entity_ref.contains::<MoveState>() {
        return Err(WalkError::NotWalkable(entity));
    }
    if entity_ref.contains::<WalkScript>() {
        return Err(WalkError::AlreadyWalking(entity));
    }

    let steps = parse_walk_sequence(sequence);
    debug!("Walk {:?}: {} step(s) from {:?}", entity, steps.len(), sequence);
    let (done, handle) = completion();
    world
        .entity_mut(entity)
        .insert(WalkScript::new(steps, step_duration, pause_duration, done));

    let mut state: SystemState<(Query<&mut WalkScript>, MotionRequests)> = SystemState::new(world);
    {
        let (mut walks, mut motion) = state.get_mut(world);
        if let Ok(mut script) = walks.get_mut(entity) {
            drive_walk(entity, &mut script, &mut motion);
        }
    }
    state.apply(world);
    Ok(handle)
}

/// Advance one walk as far as it can go this tick.
///
/// Returns `true` once the walk has finished; the script component has then
/// been removed and its completion resolved.
pub fn drive_walk(entity: Entity, script: &mut WalkScript, motion: &mut MotionRequests) -> bool {
    let now = motion.now();
    let smooth = motion.config().smooth_motion;
    loop {
        match &mut script.progress {
            WalkProgress::Moving(step) => match step.poll() {
                CompletionState::Pending => return false,
                CompletionState::Resolved => {
                    script.cells_walked += 1;
                    script.progress = WalkProgress::Ready;
                }
                CompletionState::Abandoned => {
                    warn!("Walk {:?}: step was abandoned", entity);
                    script.progress = WalkProgress::Ready;
                }
            },
            WalkProgress::Pausing { until } => {
                if now < *until {
                    return false;
                }
                script.progress = WalkProgress::Ready;
            }
            WalkProgress::Ready => {
                let Some(step) = script.steps.front().copied() else {
                    finish_walk(entity, script, motion, now);
                    return true;
                };
                match step {
                    WalkStep::Pause => {
                        script.steps.pop_front();
                        motion.forget_continuity(entity);
                        script.progress = WalkProgress::Pausing {
                            until: now + script.pause_duration,
                        };
                    }
                    WalkStep::Move(facing) => {
                        match motion.begin(entity, facing, script.step_duration) {
                            Ok(handle) => {
                                script.steps.pop_front();
                                if smooth {
                                    script.progress = WalkProgress::Moving(handle);
                                } else {
                                    // Instant moves land through commands; wait
                                    // out the step before reading the position again.
                                    script.cells_walked += 1;
                                    script.progress = WalkProgress::Pausing {
                                        until: now + script.step_duration,
                                    };
                                    return false;
                                }
                            }
                            Err(MotionError::AlreadyMoving(_)) => return false,
                            Err(err) => {
                                warn!("Walk {:?}: skipping step {}: {}", entity, facing.as_str(), err);
                                script.steps.pop_front();
                            }
                        }
                    }
                }
            }
        }
    }
}

fn finish_walk(entity: Entity, script: &mut WalkScript, motion: &mut MotionRequests, now: f64) {
    debug!("Walk {:?} finished after {} cell(s)", entity, script.cells_walked);
    if let Some(done) = script.done.take() {
        done.resolve(WalkOutcome {
            entity,
            cells_walked: script.cells_walked,
            finished_at: now,
        });
    }
    motion.commands().entity(entity).remove::<WalkScript>();
}

/// Advance every scripted walk.
pub fn walk_script_system(mut walks: Query<(Entity, &mut WalkScript)>, mut motion: MotionRequests) {
    for (entity, mut script) in walks.iter_mut() {
        if script.done.is_none() {
            continue;
        }
        drive_walk(entity, &mut script, &mut motion);
    }
}
