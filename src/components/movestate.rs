//! Facing/moving state machine.
//!
//! Every entity that moves on the grid carries a [`MoveState`]: one of the
//! eight combinations of [`Facing`] and `is_moving`. The state only changes
//! through two transitions, driven by the motion scheduler and the move
//! commands:
//!
//! - [`MoveState::on_motion_start`] – begin moving, turning toward the delta
//! - [`MoveState::on_motion_complete`] – stop moving, keep facing
//!
//! Each transition is announced with a
//! [`MoveStateChangedEvent`](crate::events::movestate::MoveStateChangedEvent)
//! so the graphic resolver can pick a new tile.

use bevy_ecs::prelude::Component;
use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Direction an entity faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::Up, Facing::Down, Facing::Left, Facing::Right];

    /// Facing for a movement delta.
    ///
    /// The horizontal axis wins when both components are non-zero, giving the
    /// order right > left > up > down. Returns `None` for a zero delta.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Facing> {
        if dx > 0 {
            Some(Facing::Right)
        } else if dx < 0 {
            Some(Facing::Left)
        } else if dy < 0 {
            Some(Facing::Up)
        } else if dy > 0 {
            Some(Facing::Down)
        } else {
            None
        }
    }

    /// Facing for an axis-aligned unit delta. Anything else is not a
    /// direction and yields `None`.
    pub fn from_unit_delta(dx: i32, dy: i32) -> Option<Facing> {
        match (dx, dy) {
            (1, 0) => Some(Facing::Right),
            (-1, 0) => Some(Facing::Left),
            (0, -1) => Some(Facing::Up),
            (0, 1) => Some(Facing::Down),
            _ => None,
        }
    }

    /// Unit cell offset for this direction (y grows downward).
    pub fn delta(self) -> IVec2 {
        match self {
            Facing::Up => IVec2::new(0, -1),
            Facing::Down => IVec2::new(0, 1),
            Facing::Left => IVec2::new(-1, 0),
            Facing::Right => IVec2::new(1, 0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Facing::Up => "up",
            Facing::Down => "down",
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }
}

/// Derived movement state of an entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveState {
    pub facing: Facing,
    pub is_moving: bool,
}

impl MoveState {
    pub fn new(facing: Facing) -> Self {
        MoveState {
            facing,
            is_moving: false,
        }
    }

    /// Enter the moving state, turning toward `(dx, dy)`.
    ///
    /// A zero delta keeps the current facing. Returns true if the observable
    /// state changed.
    pub fn on_motion_start(&mut self, dx: i32, dy: i32) -> bool {
        let before = *self;
        self.is_moving = true;
        if let Some(facing) = Facing::from_delta(dx, dy) {
            self.facing = facing;
        }
        before != *self
    }

    /// Turn toward `(dx, dy)` without moving. Used for blocked steps and for
    /// instant (non-interpolated) moves.
    pub fn on_turn(&mut self, dx: i32, dy: i32) -> bool {
        let before = *self;
        self.is_moving = false;
        if let Some(facing) = Facing::from_delta(dx, dy) {
            self.facing = facing;
        }
        before != *self
    }

    /// Leave the moving state. Facing is unchanged.
    pub fn on_motion_complete(&mut self) -> bool {
        let changed = self.is_moving;
        self.is_moving = false;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle_facing_down() {
        let state = MoveState::default();
        assert_eq!(state.facing, Facing::Down);
        assert!(!state.is_moving);
    }

    #[test]
    fn test_motion_start_sets_facing_and_moving() {
        let mut state = MoveState::default();
        assert!(state.on_motion_start(1, 0));
        assert_eq!(state.facing, Facing::Right);
        assert!(state.is_moving);

        state.on_motion_start(0, -1);
        assert_eq!(state.facing, Facing::Up);
        state.on_motion_start(-1, 0);
        assert_eq!(state.facing, Facing::Left);
        state.on_motion_start(0, 1);
        assert_eq!(state.facing, Facing::Down);
    }

    #[test]
    fn test_zero_delta_keeps_facing() {
        let mut state = MoveState::new(Facing::Left);
        state.on_motion_start(0, 0);
        assert_eq!(state.facing, Facing::Left);
        assert!(state.is_moving);
    }

    #[test]
    fn test_diagonal_prefers_horizontal() {
        assert_eq!(Facing::from_delta(1, 1), Some(Facing::Right));
        assert_eq!(Facing::from_delta(-1, -1), Some(Facing::Left));
        assert_eq!(Facing::from_delta(1, -5), Some(Facing::Right));
        assert_eq!(Facing::from_delta(0, 0), None);
    }

    #[test]
    fn test_motion_complete_keeps_facing() {
        let mut state = MoveState::default();
        state.on_motion_start(-1, 0);
        assert!(state.on_motion_complete());
        assert_eq!(state.facing, Facing::Left);
        assert!(!state.is_moving);
        // Completing twice is not a change.
        assert!(!state.on_motion_complete());
    }

    #[test]
    fn test_turn_in_place() {
        let mut state = MoveState::default();
        assert!(state.on_turn(0, -1));
        assert_eq!(state.facing, Facing::Up);
        assert!(!state.is_moving);
        assert!(!state.on_turn(0, -1));
    }

    #[test]
    fn test_unit_delta_rejects_non_unit_vectors() {
        assert_eq!(Facing::from_unit_delta(0, 1), Some(Facing::Down));
        assert_eq!(Facing::from_unit_delta(1, 1), None);
        assert_eq!(Facing::from_unit_delta(2, 0), None);
        assert_eq!(Facing::from_unit_delta(0, 0), None);
    }

    #[test]
    fn test_facing_delta_matches_from_delta() {
        for facing in Facing::ALL {
            let d = facing.delta();
            assert_eq!(Facing::from_delta(d.x, d.y), Some(facing));
        }
    }
}
