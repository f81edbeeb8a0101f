//! Scripted multi-cell walks.
//!
//! A walk is a string of direction characters played back one cell at a
//! time. Each step waits for the previous one to finish, so a walk never has
//! two motions in flight.
//!
//! | chars            | step        |
//! |------------------|-------------|
//! | `l` `L` `<`      | left        |
//! | `r` `R` `>`      | right       |
//! | `u` `U` `^`      | up          |
//! | `d` `D` `v` `V`  | down        |
//! | `.`              | pause       |
//!
//! Whitespace is ignored. Any other character is logged and skipped.

use bevy_ecs::prelude::*;
use log::warn;
use smallvec::SmallVec;
use std::collections::VecDeque;

use crate::completion::{Completion, CompletionSender};
use crate::components::movestate::Facing;
use crate::resources::motionscheduler::MotionOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStep {
    Move(Facing),
    Pause,
}

impl WalkStep {
    pub fn from_char(c: char) -> Option<WalkStep> {
        match c {
            'l' | 'L' | '<' => Some(WalkStep::Move(Facing::Left)),
            'r' | 'R' | '>' => Some(WalkStep::Move(Facing::Right)),
            'u' | 'U' | '^' => Some(WalkStep::Move(Facing::Up)),
            'd' | 'D' | 'v' | 'V' => Some(WalkStep::Move(Facing::Down)),
            '.' => Some(WalkStep::Pause),
            _ => None,
        }
    }
}

/// Parse a walk sequence, skipping characters that are not steps.
pub fn parse_walk_sequence(sequence: &str) -> SmallVec<[WalkStep; 16]> {
    let mut steps = SmallVec::new();
    for c in sequence.chars() {
        if c.is_whitespace() {
            continue;
        }
        match WalkStep::from_char(c) {
            Some(step) => steps.push(step),
            None => warn!("Ignoring unknown walk step {:?} in {:?}", c, sequence),
        }
    }
    steps
}

/// Result delivered when a walk finishes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkOutcome {
    pub entity: Entity,
    /// Number of cells actually walked.
    pub cells_walked: usize,
    pub finished_at: f64,
}

/// What the walk is waiting on.
#[derive(Debug, Default)]
pub enum WalkProgress {
    /// Ready to start the next step.
    #[default]
    Ready,
    Moving(Completion<MotionOutcome>),
    Pausing { until: f64 },
}

#[derive(Component, Debug)]
pub struct WalkScript {
    pub steps: VecDeque<WalkStep>,
    /// Milliseconds per cell.
    pub step_duration: f64,
    /// Milliseconds per pause.
    pub pause_duration: f64,
    pub progress: WalkProgress,
    pub cells_walked: usize,
    pub done: Option<CompletionSender<WalkOutcome>>,
}

impl WalkScript {
    pub fn new(
        steps: impl IntoIterator<Item = WalkStep>,
        step_duration: f64,
        pause_duration: f64,
        done: CompletionSender<WalkOutcome>,
    ) -> Self {
        WalkScript {
            steps: steps.into_iter().collect(),
            step_duration,
            pause_duration,
            progress: WalkProgress::Ready,
            cells_walked: 0,
            done: Some(done),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sequence() {
        let steps = parse_walk_sequence("rr.d");
        assert_eq!(
            steps.as_slice(),
            &[
                WalkStep::Move(Facing::Right),
                WalkStep::Move(Facing::Right),
                WalkStep::Pause,
                WalkStep::Move(Facing::Down),
            ]
        );
    }

    #[test]
    fn test_parse_accepts_case_and_arrows() {
        let steps = parse_walk_sequence("L<U^dVR>");
        let facings: Vec<_> = steps
            .iter()
            .map(|s| match s {
                WalkStep::Move(f) => *f,
                WalkStep::Pause => panic!("unexpected pause"),
            })
            .collect();
        assert_eq!(
            facings,
            vec![
                Facing::Left,
                Facing::Left,
                Facing::Up,
                Facing::Up,
                Facing::Down,
                Facing::Down,
                Facing::Right,
                Facing::Right,
            ]
        );
    }

    #[test]
    fn test_parse_skips_unknown_and_whitespace() {
        let steps = parse_walk_sequence(" r x . ?");
        assert_eq!(
            steps.as_slice(),
            &[WalkStep::Move(Facing::Right), WalkStep::Pause]
        );
    }

    #[test]
    fn test_empty_sequence() {
        assert!(parse_walk_sequence("").is_empty());
    }
}
