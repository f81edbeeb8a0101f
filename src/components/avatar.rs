//! The player-controlled avatar.
//!
//! [`Avatar`] marks the entity moved by [`move`](crate::game::Playback::move_avatar)
//! and holds the step it is currently busy with. While a step is in flight
//! (a motion, an instant move's step duration, or the cooldown after a
//! blocked move) further moves are rejected.

use bevy_ecs::prelude::Component;
use glam::IVec2;

use crate::completion::{Completion, CompletionSender};
use crate::resources::motionscheduler::MotionOutcome;

/// How a single avatar step ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// The avatar arrived in `cell`.
    Moved { cell: IVec2, finished_at: f64 },
    /// The avatar turned toward `cell` but could not enter it.
    Blocked { cell: IVec2, finished_at: f64 },
}

/// Step the avatar is busy with.
#[derive(Debug, Default)]
pub enum AvatarStep {
    #[default]
    Idle,
    /// Waiting for a motion into `cell`.
    Moving {
        motion: Completion<MotionOutcome>,
        cell: IVec2,
        done: CompletionSender<StepOutcome>,
    },
    /// Landed in `cell` without interpolation; waiting out the step
    /// duration before the next move.
    Landed {
        until: f64,
        cell: IVec2,
        finished_at: f64,
        done: CompletionSender<StepOutcome>,
    },
    /// Blocked; waiting out the step duration so blocked input cannot repeat
    /// faster than real movement.
    Cooldown {
        until: f64,
        cell: IVec2,
        done: CompletionSender<StepOutcome>,
    },
}

#[derive(Component, Debug, Default)]
pub struct Avatar {
    pub step: AvatarStep,
}

impl Avatar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        !matches!(self.step, AvatarStep::Idle)
    }
}
