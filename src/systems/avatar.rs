//! Player-driven avatar moves.
//!
//! [`AvatarMover::request_move`] is the `move(dx, dy)` command. It checks the
//! playback guard, then the destination cell:
//!
//! - outside the room, a wall, or a [`Solid`] entity: the avatar turns in
//!   place and waits out a cooldown of one step duration, so blocked input
//!   repeats no faster than real movement. Entities it bumped into are
//!   touched right away.
//! - otherwise a motion is started and the step ends when it lands. Instant
//!   moves land at once, touch right away, and still hold the avatar for
//!   one step duration.
//!
//! [`avatar_step_system`] finishes steps and triggers [`TouchEvent`]s for
//! whatever shares the destination cell. [`avatar_input_system`] turns the
//! held direction into the next move.

use bevy_ecs::prelude::*;
use bevy_ecs::system::{SystemParam, SystemState};
use glam::IVec2;
use log::{debug, warn};
use smallvec::SmallVec;
use thiserror::Error;

use crate::completion::{Completion, CompletionState, completion};
use crate::components::avatar::{Avatar, AvatarStep, StepOutcome};
use crate::components::mapposition::MapPosition;
use crate::components::movestate::Facing;
use crate::components::roomid::RoomId;
use crate::components::solid::Solid;
use crate::events::touch::TouchEvent;
use crate::resources::input::MoveInput;
use crate::resources::motionscheduler::MotionError;
use crate::resources::playback::PlaybackState;
use crate::resources::rooms::Rooms;
use crate::resources::worldtime::WorldTime;
use crate::systems::motion::MotionRequests;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MoveError {
    #[error("({dx}, {dy}) is not a unit direction")]
    InvalidDirection { dx: i32, dy: i32 },
    #[error("the avatar cannot move right now")]
    CannotMove,
    #[error("the avatar is still busy with its previous step")]
    Busy,
    #[error("there is no single avatar to move")]
    NoAvatar,
    #[error(transparent)]
    Motion(#[from] MotionError),
}

type Occupants<'w, 's> =
    Query<'w, 's, (Entity, &'static MapPosition, &'static RoomId, Has<Solid>)>;

/// Entities other than `except` standing on `cell` of `room`, with whether
/// each is solid.
pub fn entities_at(
    occupants: &Occupants,
    room: RoomId,
    cell: IVec2,
    except: Entity,
) -> SmallVec<[(Entity, bool); 4]> {
    occupants
        .iter()
        .filter(|(entity, pos, entity_room, _)| {
            *entity != except && **entity_room == room && pos.cell() == cell
        })
        .map(|(entity, _, _, solid)| (entity, solid))
        .collect()
}

#[derive(SystemParam)]
pub struct AvatarMover<'w, 's> {
    motion: MotionRequests<'w, 's>,
    playback: Res<'w, PlaybackState>,
    rooms: Res<'w, Rooms>,
    avatars: Query<'w, 's, (Entity, &'static mut Avatar, &'static RoomId)>,
    occupants: Occupants<'w, 's>,
}

impl<'w, 's> AvatarMover<'w, 's> {
    pub fn is_busy(&self) -> bool {
        self.avatars
            .single()
            .is_ok_and(|(entity, avatar, _)| avatar.is_busy() || self.motion.is_moving(entity))
    }

    /// Move the avatar one cell by `(dx, dy)`.
    ///
    /// The returned completion resolves once the step, or the cooldown after
    /// a blocked step, is over.
    pub fn request_move(&mut self, dx: i32, dy: i32) -> Result<Completion<StepOutcome>, MoveError> {
        let Some(facing) = Facing::from_unit_delta(dx, dy) else {
            warn!("Ignoring move by ({}, {}): not a unit direction", dx, dy);
            return Err(MoveError::InvalidDirection { dx, dy });
        };
        if !self.playback.can_move() {
            return Err(MoveError::CannotMove);
        }
        let Ok((entity, mut avatar, room)) = self.avatars.single_mut() else {
            return Err(MoveError::NoAvatar);
        };
        if avatar.is_busy() || self.motion.is_moving(entity) {
            return Err(MoveError::Busy);
        }
        let room = *room;
        let cell = self
            .motion
            .cell_of(entity)
            .ok_or(MotionError::NotMovable(entity))?;
        let target = cell + facing.delta();
        let duration = self.motion.config().avatar_move_speed;
        let now = self.motion.now();

        let bounded =
            !self.rooms.in_bounds(room, target) || self.rooms.cell_is_solid(room, target.x, target.y);
        let bumped = if bounded {
            SmallVec::new()
        } else {
            entities_at(&self.occupants, room, target, entity)
        };
        let (done, handle) = completion();

        if bounded || bumped.iter().any(|(_, solid)| *solid) {
            self.motion.turn(entity, facing)?;
            for (other, _) in bumped {
                self.motion.commands().trigger(TouchEvent {
                    avatar: entity,
                    target: other,
                    cell: target,
                });
            }
            debug!("Avatar blocked at {:?}, facing {}", target, facing.as_str());
            avatar.step = AvatarStep::Cooldown {
                until: now + duration,
                cell: target,
                done,
            };
            return Ok(handle);
        }

        let motion = self.motion.begin_to(entity, target, duration)?;
        if !self.motion.config().smooth_motion {
            for (other, _) in bumped {
                self.motion.commands().trigger(TouchEvent {
                    avatar: entity,
                    target: other,
                    cell: target,
                });
            }
            avatar.step = AvatarStep::Landed {
                until: now + duration,
                cell: target,
                finished_at: now,
                done,
            };
            return Ok(handle);
        }
        avatar.step = AvatarStep::Moving {
            motion,
            cell: target,
            done,
        };
        Ok(handle)
    }
}

/// Finish avatar steps whose motion landed or whose cooldown ran out.
pub fn avatar_step_system(
    time: Res<WorldTime>,
    mut avatars: Query<(Entity, &mut Avatar, &RoomId)>,
    occupants: Occupants,
    mut commands: Commands,
) {
    let now = time.now();
    for (entity, mut avatar, room) in avatars.iter_mut() {
        avatar.step = match std::mem::take(&mut avatar.step) {
            AvatarStep::Idle => AvatarStep::Idle,
            AvatarStep::Moving {
                mut motion,
                cell,
                done,
            } => match motion.poll() {
                CompletionState::Pending => AvatarStep::Moving { motion, cell, done },
                CompletionState::Resolved => {
                    let finished_at = motion.value().map_or(now, |outcome| outcome.finished_at);
                    for (other, _) in entities_at(&occupants, *room, cell, entity) {
                        commands.trigger(TouchEvent {
                            avatar: entity,
                            target: other,
                            cell,
                        });
                    }
                    done.resolve(StepOutcome::Moved { cell, finished_at });
                    AvatarStep::Idle
                }
                CompletionState::Abandoned => {
                    warn!("Avatar motion into {:?} was abandoned", cell);
                    AvatarStep::Idle
                }
            },
            AvatarStep::Landed {
                until,
                cell,
                finished_at,
                done,
            } => {
                if now < until {
                    AvatarStep::Landed {
                        until,
                        cell,
                        finished_at,
                        done,
                    }
                } else {
                    done.resolve(StepOutcome::Moved { cell, finished_at });
                    AvatarStep::Idle
                }
            }
            AvatarStep::Cooldown { until, cell, done } => {
                if now < until {
                    AvatarStep::Cooldown { until, cell, done }
                } else {
                    done.resolve(StepOutcome::Blocked {
                        cell,
                        finished_at: now,
                    });
                    AvatarStep::Idle
                }
            }
        };
    }
}

/// Issue a move for the direction held (or freshly pressed) this frame.
pub fn avatar_input_system(input: Res<MoveInput>, mut mover: AvatarMover) {
    let fresh_press_only = mover.motion.config().one_move_per_press;
    let Some(facing) = input.direction(fresh_press_only) else {
        return;
    };
    if mover.is_busy() {
        return;
    }
    let delta = facing.delta();
    match mover.request_move(delta.x, delta.y) {
        Ok(_) | Err(MoveError::CannotMove) | Err(MoveError::NoAvatar) => {}
        Err(err) => warn!("Avatar move {} failed: {}", facing.as_str(), err),
    }
}

/// Run the `move(dx, dy)` command against `world` outside the schedule.
pub fn request_avatar_move(
    world: &mut World,
    dx: i32,
    dy: i32,
) -> Result<Completion<StepOutcome>, MoveError> {
    let mut state: SystemState<AvatarMover> = SystemState::new(world);
    let result = state.get_mut(world).request_move(dx, dy);
    state.apply(world);
    result
}
