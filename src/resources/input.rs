//! Per-frame directional input resource.
//!
//! The host writes the state of the four direction buttons here each frame
//! (keyboard, gamepad or touch; the source does not matter). The avatar
//! input system reads it to issue moves.
use bevy_ecs::prelude::*;

use crate::components::movestate::Facing;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Boolean button state.
pub struct BoolState {
    /// Whether the button is held this frame.
    pub active: bool,
    /// Whether the button went down this frame.
    pub just_pressed: bool,
    /// Whether the button went up this frame.
    pub just_released: bool,
}

impl BoolState {
    /// Feed the raw held state for a new frame.
    pub fn update(&mut self, held: bool) {
        self.just_pressed = held && !self.active;
        self.just_released = !held && self.active;
        self.active = held;
    }
}

/// Resource capturing direction input for the current frame.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub up: BoolState,
    pub down: BoolState,
    pub left: BoolState,
    pub right: BoolState,
}

impl MoveInput {
    pub fn button(&self, facing: Facing) -> &BoolState {
        match facing {
            Facing::Up => &self.up,
            Facing::Down => &self.down,
            Facing::Left => &self.left,
            Facing::Right => &self.right,
        }
    }

    pub fn button_mut(&mut self, facing: Facing) -> &mut BoolState {
        match facing {
            Facing::Up => &mut self.up,
            Facing::Down => &mut self.down,
            Facing::Left => &mut self.left,
            Facing::Right => &mut self.right,
        }
    }

    /// Feed the raw held state of one direction for a new frame.
    pub fn set_held(&mut self, facing: Facing, held: bool) {
        self.button_mut(facing).update(held);
    }

    /// Release every direction.
    pub fn release_all(&mut self) {
        for facing in Facing::ALL {
            self.set_held(facing, false);
        }
    }

    /// Direction to move this frame, if any.
    ///
    /// With `fresh_press_only`, only a button pressed this frame counts.
    /// When several directions qualify the order is up, down, left, right.
    pub fn direction(&self, fresh_press_only: bool) -> Option<Facing> {
        [Facing::Up, Facing::Down, Facing::Left, Facing::Right]
            .into_iter()
            .find(|facing| {
                let b = self.button(*facing);
                if fresh_press_only {
                    b.just_pressed
                } else {
                    b.active
                }
            })
    }
}
