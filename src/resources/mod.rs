//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution: timing, configuration, the motion
//! and graphic registries, and the host collaborators the move command
//! consults.
//!
//! Overview
//! - `graphicresolver` – field-name resolution and staged graphic swaps
//! - `input` – per-frame state of the four direction buttons
//! - `motionconfig` – speeds, grace window and switches loaded from INI
//! - `motionscheduler` – in-flight cell-to-cell motion tasks
//! - `playback` – dialogue/ended/ready flags guarding avatar moves
//! - `rooms` – room bounds and walls loaded from JSON
//! - `worldtime` – tick timestamp and delta
pub mod graphicresolver;
pub mod input;
pub mod motionconfig;
pub mod motionscheduler;
pub mod playback;
pub mod rooms;
pub mod worldtime;
