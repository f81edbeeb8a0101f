use bevy_ecs::prelude::Component;

/// Timing of the last motion an entity finished.
///
/// Read by the motion scheduler when the next motion begins: a start inside
/// the continuity grace window is backdated to `latest_motion_end_time` so
/// consecutive cells flow without a hitch.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionHistory {
    /// Tick timestamp (ms) at which the last motion arrived.
    pub latest_motion_end_time: Option<f64>,
}
