//! Motion systems.
//!
//! This module groups all ECS systems and observers that advance motions,
//! run the move and walk commands, and keep graphics in step.
//!
//! Submodules overview
//! - [`avatar`] – the `move(dx, dy)` command, step completion and held-key input
//! - [`graphic`] – stage graphic swaps on state changes and commit them
//! - [`motion`] – start motions and advance them every tick
//! - [`time`] – update the tick timestamp and delta
//! - [`walk`] – scripted walks, one cell or pause at a time

pub mod avatar;
pub mod graphic;
pub mod motion;
pub mod time;
pub mod walk;
