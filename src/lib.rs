//! Gridglide library.
//!
//! Smooth cell-to-cell movement for tile games: a frame-driven motion
//! scheduler, a per-entity facing/moving state, and debounced graphic swaps
//! that follow that state. Exposes the ECS components, resources, systems,
//! and events for use in integration tests and by a host game.

pub mod completion;
pub mod components;
pub mod events;
pub mod frameclock;
pub mod game;
pub mod resources;
pub mod systems;
