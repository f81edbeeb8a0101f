//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per frame from the timestamp handed over by the
//! [`FrameClock`](crate::frameclock::FrameClock).
use bevy_ecs::prelude::*;
use log::warn;

use crate::resources::worldtime::WorldTime;

/// Record the tick timestamp on the `WorldTime` resource.
///
/// `now` is an absolute timestamp in milliseconds. A timestamp older than the
/// previous one is clamped so time never runs backwards.
pub fn update_world_time(world: &mut World, now: f64) {
    let mut wt = world.resource_mut::<WorldTime>();
    let now = if now < wt.elapsed {
        warn!(
            "Frame timestamp went backwards ({} < {}), clamping",
            now, wt.elapsed
        );
        wt.elapsed
    } else {
        now
    };
    wt.delta = if wt.frame_count == 0 {
        0.0
    } else {
        now - wt.elapsed
    };
    wt.elapsed = now;
    wt.frame_count += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_has_zero_delta() {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        update_world_time(&mut world, 1000.0);
        let wt = world.resource::<WorldTime>();
        assert_eq!(wt.elapsed, 1000.0);
        assert_eq!(wt.delta, 0.0);
        assert_eq!(wt.frame_count, 1);
    }

    #[test]
    fn test_delta_between_ticks() {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        update_world_time(&mut world, 10.0);
        update_world_time(&mut world, 26.5);
        let wt = world.resource::<WorldTime>();
        assert_eq!(wt.delta, 16.5);
        assert_eq!(wt.frame_count, 2);
    }

    #[test]
    fn test_backwards_timestamp_is_clamped() {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        update_world_time(&mut world, 50.0);
        update_world_time(&mut world, 40.0);
        let wt = world.resource::<WorldTime>();
        assert_eq!(wt.elapsed, 50.0);
        assert_eq!(wt.delta, 0.0);
    }
}
