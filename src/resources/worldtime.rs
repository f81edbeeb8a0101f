//! Frame time resource.
//!
//! Timestamps are milliseconds, as delivered by the frame clock. The first
//! tick establishes the origin: its `delta` is zero.
use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct WorldTime {
    /// Timestamp of the current tick in milliseconds.
    pub elapsed: f64,
    /// Milliseconds since the previous tick.
    pub delta: f64,
    /// Number of ticks processed so far.
    pub frame_count: u64,
}

impl WorldTime {
    /// Current timestamp in milliseconds.
    pub fn now(&self) -> f64 {
        self.elapsed
    }
}
