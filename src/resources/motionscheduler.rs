//! In-flight cell-to-cell motions.
//!
//! [`MotionScheduler`] owns every active [`MotionTask`], at most one per
//! entity. Tasks are created by [`MotionScheduler::begin`] and advanced once
//! per frame by
//! [`advance_motion_system`](crate::systems::motion::advance_motion_system),
//! which writes the interpolated position back to the entity. A task leaves
//! the scheduler exactly once, on the tick its phase reaches 1, and resolves
//! its [`Completion`] at that moment.
//!
//! # Continuity
//!
//! A motion that begins less than `grace` milliseconds after the entity's
//! previous motion ended is backdated to that end time. Holding a direction
//! across several cells then costs no dead time between ticks.

use bevy_ecs::prelude::*;
use glam::{IVec2, Vec2};
use log::debug;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::completion::{Completion, CompletionSender, completion};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MotionError {
    #[error("entity {0:?} already has a motion in flight")]
    AlreadyMoving(Entity),
    #[error("motion from {start:?} to {target:?} is not a single-cell step")]
    NotAdjacent { start: Vec2, target: Vec2 },
    #[error("entity {0:?} cannot be moved (missing position or move state)")]
    NotMovable(Entity),
}

/// Result delivered through a motion's completion handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionOutcome {
    pub entity: Entity,
    /// Cell the entity arrived at.
    pub cell: IVec2,
    /// Tick timestamp (ms) of arrival.
    pub finished_at: f64,
}

/// One interpolation between two adjacent cells.
#[derive(Debug)]
pub struct MotionTask {
    start: Vec2,
    target: Vec2,
    start_time: f64,
    duration: f64,
    done: CompletionSender<MotionOutcome>,
}

impl MotionTask {
    pub fn start(&self) -> Vec2 {
        self.start
    }
    pub fn target(&self) -> Vec2 {
        self.target
    }
    pub fn start_time(&self) -> f64 {
        self.start_time
    }
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Normalized progress at `now`. A non-positive duration is complete
    /// immediately.
    pub fn phase(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return f64::INFINITY;
        }
        ((now - self.start_time) / self.duration).max(0.0)
    }

    /// Position at `now`, snapped to a `tile_px` pixel grid while in flight.
    pub fn sample(&self, now: f64, tile_px: u32) -> MotionProgress {
        let phase = self.phase(now);
        if phase < 1.0 {
            let pos = snap_to_pixels(lerp_v2(self.start, self.target, phase as f32), tile_px);
            MotionProgress::InFlight(pos)
        } else {
            MotionProgress::Arrived(self.target)
        }
    }
}

/// What a task contributes to its entity on a given tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionProgress {
    InFlight(Vec2),
    Arrived(Vec2),
}

/// Linearly interpolate between two 2D vectors.
pub(crate) fn lerp_v2(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    Vec2 {
        x: a.x * (1.0 - t) + b.x * t,
        y: a.y * (1.0 - t) + b.y * t,
    }
}

/// Round a cell-space position to the nearest screen pixel.
pub(crate) fn snap_to_pixels(pos: Vec2, tile_px: u32) -> Vec2 {
    if tile_px == 0 {
        return pos;
    }
    let px = tile_px as f32;
    (pos * px).round() / px
}

/// True when `target` is exactly one cell away from `start` along one axis.
fn is_single_step(start: Vec2, target: Vec2) -> bool {
    let d = target - start;
    (d.x.abs() == 1.0 && d.y == 0.0) || (d.x == 0.0 && d.y.abs() == 1.0)
}

#[derive(Resource, Debug, Default)]
pub struct MotionScheduler {
    active: FxHashMap<Entity, MotionTask>,
}

impl MotionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, entity: Entity) -> bool {
        self.active.contains_key(&entity)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn task(&self, entity: Entity) -> Option<&MotionTask> {
        self.active.get(&entity)
    }

    /// Register a motion of `entity` from `start` to `target`.
    ///
    /// Rejects a second motion for an entity that already has one. The start
    /// time is `now`, or `last_end` when that lies within `grace` of `now`.
    #[allow(clippy::too_many_arguments)]
    pub fn begin(
        &mut self,
        entity: Entity,
        start: Vec2,
        target: Vec2,
        duration: f64,
        now: f64,
        grace: f64,
        last_end: Option<f64>,
    ) -> Result<Completion<MotionOutcome>, MotionError> {
        if self.active.contains_key(&entity) {
            return Err(MotionError::AlreadyMoving(entity));
        }
        if !is_single_step(start, target) {
            return Err(MotionError::NotAdjacent { start, target });
        }

        let start_time = match last_end {
            Some(end) if now >= end && now - end < grace => end,
            _ => now,
        };
        let (done, handle) = completion();
        debug!(
            "Motion begin {:?}: {:?} -> {:?} over {}ms (start {}, now {})",
            entity, start, target, duration, start_time, now
        );
        self.active.insert(
            entity,
            MotionTask {
                start,
                target,
                start_time,
                duration,
                done,
            },
        );
        Ok(handle)
    }

    /// Advance every task to `now`.
    ///
    /// `apply` writes the progress to the entity and returns false if the
    /// entity no longer exists; such tasks are dropped and their completion
    /// is abandoned. Arrived tasks are removed and resolved. Returns the
    /// outcomes of the tasks that arrived on this tick.
    pub fn advance(
        &mut self,
        now: f64,
        tile_px: u32,
        mut apply: impl FnMut(Entity, MotionProgress) -> bool,
    ) -> Vec<MotionOutcome> {
        let mut arrived = Vec::new();
        let mut gone = Vec::new();
        for (entity, task) in self.active.iter() {
            let progress = task.sample(now, tile_px);
            if !apply(*entity, progress) {
                gone.push(*entity);
                continue;
            }
            if let MotionProgress::Arrived(_) = progress {
                arrived.push(*entity);
            }
        }

        for entity in gone {
            debug!("Dropping motion of missing entity {:?}", entity);
            self.active.remove(&entity);
        }

        let mut outcomes = Vec::with_capacity(arrived.len());
        for entity in arrived {
            if let Some(task) = self.active.remove(&entity) {
                let outcome = MotionOutcome {
                    entity,
                    cell: task.target.round().as_ivec2(),
                    finished_at: now,
                };
                debug!("Motion end {:?} at {:?} ({}ms)", entity, outcome.cell, now);
                task.done.resolve(outcome);
                outcomes.push(outcome);
            }
        }
        outcomes
    }
}
