//! ECS components for entities.
//!
//! This module groups all component types that can be attached to entities
//! moved by the motion core. Most of them are owned by the host (position,
//! room, tile fields); the rest hold per-entity motion bookkeeping.
//!
//! Submodules overview:
//! - [`animatedgraphic`] – opt-in marker and field snapshot for graphic swaps
//! - [`avatar`] – the player-controlled entity and the step it is busy with
//! - [`graphicfields`] – host-owned named tile fields, including the live `graphic`
//! - [`mapposition`] – grid position in cells, fractional while moving
//! - [`motionhistory`] – end time of the last motion, for continuity
//! - [`movestate`] – facing and moving flag derived from motions
//! - [`roomid`] – room an entity is in
//! - [`solid`] – marker for entities that block the avatar
//! - [`walkscript`] – a scripted multi-cell walk in progress

pub mod animatedgraphic;
pub mod avatar;
pub mod graphicfields;
pub mod mapposition;
pub mod motionhistory;
pub mod movestate;
pub mod roomid;
pub mod solid;
pub mod walkscript;
