//! Event types used by the motion core.
//!
//! Events decouple the motion scheduler and commands from whoever reacts to
//! them (graphic resolver, renderer, scripting hooks). All of them are
//! global events carrying the entity they concern; trigger them with
//! `commands.trigger(...)` or `world.trigger(...)` and subscribe with an
//! observer taking `On<E>`.
//!
//! Submodules:
//! - [`graphic`] – a staged tile swap was committed to the live graphic
//! - [`motion`] – a cell-to-cell motion arrived
//! - [`movestate`] – an entity's facing/moving state was transitioned
//! - [`touch`] – the avatar touched (or bumped into) another entity
pub mod graphic;
pub mod motion;
pub mod movestate;
pub mod touch;
