//! Host-side playback.
//!
//! [`Playback`] owns the ECS [`World`] and the per-tick [`Schedule`]. The
//! host feeds it one timestamp per display refresh through
//! [`Playback::tick`] and calls [`Playback::move_avatar`] and
//! [`Playback::walk`] as commands.
//!
//! Tick order:
//! 1. [`update_world_time`]
//! 2. [`advance_motion_system`]
//! 3. [`avatar_step_system`]
//! 4. [`avatar_input_system`]
//! 5. [`walk_script_system`]
//! 6. [`commit_pending_graphics_system`]
//!
//! Move-state changes reach the graphic resolver through
//! [`stage_graphic_change_observer`] as they happen.

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use glam::{IVec2, Vec2};
use log::info;

use crate::completion::Completion;
use crate::components::animatedgraphic::AnimatedGraphic;
use crate::components::avatar::{Avatar, StepOutcome};
use crate::components::graphicfields::{GraphicFields, TileId};
use crate::components::mapposition::MapPosition;
use crate::components::motionhistory::MotionHistory;
use crate::components::movestate::{Facing, MoveState};
use crate::components::roomid::RoomId;
use crate::components::solid::Solid;
use crate::components::walkscript::WalkOutcome;
use crate::resources::graphicresolver::GraphicResolver;
use crate::resources::input::MoveInput;
use crate::resources::motionconfig::MotionConfig;
use crate::resources::motionscheduler::{MotionError, MotionOutcome, MotionScheduler};
use crate::resources::playback::PlaybackState;
use crate::resources::rooms::Rooms;
use crate::resources::worldtime::WorldTime;
use crate::systems::avatar::{
    MoveError, avatar_input_system, avatar_step_system, request_avatar_move,
};
use crate::systems::graphic::{commit_pending_graphics_system, stage_graphic_change_observer};
use crate::systems::motion::{advance_motion_system, begin_motion};
use crate::systems::time::update_world_time;
use crate::systems::walk::{WalkError, start_walk, walk_script_system};

/// Build the per-tick schedule.
pub fn build_update_schedule() -> Schedule {
    let mut update = Schedule::default();
    update.add_systems(
        (
            advance_motion_system,
            avatar_step_system,
            avatar_input_system,
            walk_script_system,
            commit_pending_graphics_system,
        )
            .chain(),
    );
    update
}

/// Insert the resources and observers the motion core needs.
pub fn setup_world(world: &mut World, config: MotionConfig, rooms: Rooms) {
    world.insert_resource(WorldTime::default());
    world.insert_resource(MotionScheduler::new());
    world.insert_resource(GraphicResolver::new());
    world.insert_resource(PlaybackState::default());
    world.insert_resource(MoveInput::default());
    world.insert_resource(rooms);
    world.insert_resource(config);
    world.spawn(Observer::new(stage_graphic_change_observer));
    world.flush();
}

pub struct Playback {
    world: World,
    update: Schedule,
}

impl Playback {
    pub fn new(config: MotionConfig, rooms: Rooms) -> Self {
        info!(
            "Playback: avatar {} ms/cell, walks {} ms/cell, smooth motion {}",
            config.avatar_move_speed, config.event_move_speed, config.smooth_motion
        );
        let mut world = World::new();
        setup_world(&mut world, config, rooms);
        Playback {
            world,
            update: build_update_schedule(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &MotionConfig {
        self.world.resource::<MotionConfig>()
    }

    pub fn now(&self) -> f64 {
        self.world.resource::<WorldTime>().now()
    }

    /// Run one frame at timestamp `now` (ms).
    pub fn tick(&mut self, now: f64) {
        update_world_time(&mut self.world, now);
        self.update.run(&mut self.world);
        self.world.clear_trackers();
    }

    /// Hold `facing` (or nothing) for the coming frame.
    pub fn hold(&mut self, facing: Option<Facing>) {
        let mut input = self.world.resource_mut::<MoveInput>();
        for f in Facing::ALL {
            input.set_held(f, Some(f) == facing);
        }
    }

    pub fn playback_state_mut(&mut self) -> Mut<'_, PlaybackState> {
        self.world.resource_mut::<PlaybackState>()
    }

    /// The `move(dx, dy)` command for the avatar.
    pub fn move_avatar(&mut self, dx: i32, dy: i32) -> Result<Completion<StepOutcome>, MoveError> {
        request_avatar_move(&mut self.world, dx, dy)
    }

    /// Walk `entity` through `sequence`.
    pub fn walk(
        &mut self,
        entity: Entity,
        sequence: &str,
        step_duration: f64,
        pause_duration: f64,
    ) -> Result<Completion<WalkOutcome>, WalkError> {
        start_walk(&mut self.world, entity, sequence, step_duration, pause_duration)
    }

    /// Walk with the configured event speed and pause.
    pub fn walk_with_defaults(
        &mut self,
        entity: Entity,
        sequence: &str,
    ) -> Result<Completion<WalkOutcome>, WalkError> {
        let (step, pause) = {
            let config = self.config();
            (config.event_move_speed, config.walk_pause)
        };
        self.walk(entity, sequence, step, pause)
    }

    pub fn begin_motion(
        &mut self,
        entity: Entity,
        target: IVec2,
        duration: f64,
    ) -> Result<Completion<MotionOutcome>, MotionError> {
        begin_motion(&mut self.world, entity, target, duration)
    }

    /// Spawn the avatar on `cell` of `room`.
    ///
    /// The avatar's graphic follows its move state unless
    /// `manage_avatar_graphic` is off.
    pub fn spawn_avatar(&mut self, room: RoomId, cell: IVec2, fields: GraphicFields) -> Entity {
        let managed = self.config().manage_avatar_graphic;
        let mut avatar = self.world.spawn((
            Avatar::new(),
            room,
            MapPosition::from_cell(cell),
            MoveState::default(),
            MotionHistory::default(),
            fields,
        ));
        if managed {
            avatar.insert(AnimatedGraphic::new());
        }
        avatar.id()
    }

    /// Spawn a scripted actor. Solid actors block the avatar.
    pub fn spawn_actor(
        &mut self,
        room: RoomId,
        cell: IVec2,
        fields: GraphicFields,
        solid: bool,
    ) -> Entity {
        let mut actor = self.world.spawn((
            room,
            MapPosition::from_cell(cell),
            MoveState::default(),
            MotionHistory::default(),
            fields,
            AnimatedGraphic::new(),
        ));
        if solid {
            actor.insert(Solid);
        }
        actor.id()
    }

    pub fn position(&self, entity: Entity) -> Option<Vec2> {
        self.world.get::<MapPosition>(entity).map(|p| p.pos)
    }

    pub fn move_state(&self, entity: Entity) -> Option<MoveState> {
        self.world.get::<MoveState>(entity).copied()
    }

    /// Tile currently drawn for `entity`.
    pub fn graphic(&self, entity: Entity) -> Option<TileId> {
        self.world
            .get::<GraphicFields>(entity)
            .and_then(|fields| fields.graphic())
    }

    pub fn is_moving(&self, entity: Entity) -> bool {
        self.world.resource::<MotionScheduler>().is_active(entity)
    }
}
