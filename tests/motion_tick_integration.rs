//! Tick integration tests for motions, continuity and scripted walks.

use std::sync::{Arc, Mutex};

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use glam::{IVec2, Vec2};

use gridglide::completion::CompletionState;
use gridglide::components::graphicfields::GraphicFields;
use gridglide::components::movestate::Facing;
use gridglide::components::roomid::RoomId;
use gridglide::events::motion::MotionCompletedEvent;
use gridglide::game::Playback;
use gridglide::resources::motionconfig::MotionConfig;
use gridglide::resources::motionscheduler::{MotionError, MotionScheduler};
use gridglide::resources::rooms::{RoomGrid, Rooms};

const ROOM: RoomId = RoomId(0);
const EPSILON: f32 = 1e-6;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn make_playback(config: MotionConfig) -> Playback {
    let mut rooms = Rooms::new();
    rooms.insert(ROOM, RoomGrid::new(16, 16));
    let mut playback = Playback::new(config, rooms);
    playback.tick(0.0);
    playback
}

fn spawn_actor(playback: &mut Playback, x: i32, y: i32) -> Entity {
    playback.spawn_actor(
        ROOM,
        IVec2::new(x, y),
        GraphicFields::new().with_field("graphic", 1),
        false,
    )
}

/// Tick every `step` ms from just after the current time up to `until`.
fn run_until(playback: &mut Playback, step: f64, until: f64) {
    let mut now = playback.now();
    while now + step <= until + 1e-9 {
        now += step;
        playback.tick(now);
    }
}

fn record_completions(playback: &mut Playback) -> Arc<Mutex<Vec<(IVec2, f64)>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    playback
        .world_mut()
        .add_observer(move |trigger: On<MotionCompletedEvent>| {
            let event = trigger.event();
            sink.lock().unwrap().push((event.cell, event.finished_at));
        });
    log
}

#[test]
fn test_exact_arrival_for_odd_durations() {
    for duration in [1.0, 37.0, 137.5, 200.0, 999.0] {
        let mut playback = make_playback(MotionConfig::new());
        let actor = spawn_actor(&mut playback, 5, 5);
        playback
            .begin_motion(actor, IVec2::new(5, 4), duration)
            .unwrap();
        run_until(&mut playback, 16.6, duration + 20.0);
        assert_eq!(playback.position(actor), Some(Vec2::new(5.0, 4.0)));
        assert!(!playback.move_state(actor).unwrap().is_moving);
    }
}

#[test]
fn test_position_converges_monotonically() {
    let mut playback = make_playback(MotionConfig::new());
    let actor = spawn_actor(&mut playback, 2, 2);
    playback.begin_motion(actor, IVec2::new(3, 2), 300.0).unwrap();
    let target = Vec2::new(3.0, 2.0);
    let mut last = f32::INFINITY;
    let mut now = 0.0;
    while now < 300.0 {
        now += 7.0;
        playback.tick(now);
        let distance = playback.position(actor).unwrap().distance(target);
        assert!(distance <= last, "moved away from target at {now} ms");
        last = distance;
    }
    assert!(approx_eq(last, 0.0));
}

#[test]
fn test_position_stays_between_start_and_target() {
    let mut playback = make_playback(MotionConfig::new());
    let actor = spawn_actor(&mut playback, 2, 2);
    playback.begin_motion(actor, IVec2::new(2, 3), 100.0).unwrap();
    for i in 1..=10 {
        playback.tick(i as f64 * 10.0);
        let pos = playback.position(actor).unwrap();
        assert!(approx_eq(pos.x, 2.0));
        assert!((2.0..=3.0).contains(&pos.y));
    }
}

#[test]
fn test_is_moving_exactly_while_task_is_active() {
    let mut playback = make_playback(MotionConfig::new());
    let actor = spawn_actor(&mut playback, 1, 1);
    playback.begin_motion(actor, IVec2::new(1, 2), 100.0).unwrap();
    let state = playback.move_state(actor).unwrap();
    assert!(state.is_moving);
    assert_eq!(state.facing, Facing::Down);

    for i in 1..10 {
        playback.tick(i as f64 * 10.0);
        assert!(playback.move_state(actor).unwrap().is_moving);
        assert!(playback.is_moving(actor));
    }
    playback.tick(100.0);
    assert!(!playback.move_state(actor).unwrap().is_moving);
    assert!(!playback.is_moving(actor));
}

#[test]
fn test_second_motion_is_rejected_while_active() {
    let mut playback = make_playback(MotionConfig::new());
    let actor = spawn_actor(&mut playback, 1, 1);
    playback.begin_motion(actor, IVec2::new(2, 1), 100.0).unwrap();
    let err = playback
        .begin_motion(actor, IVec2::new(1, 0), 100.0)
        .unwrap_err();
    assert_eq!(err, MotionError::AlreadyMoving(actor));
    assert_eq!(playback.move_state(actor).unwrap().facing, Facing::Right);
    assert_eq!(
        playback.world().resource::<MotionScheduler>().active_count(),
        1
    );
}

#[test]
fn test_non_adjacent_target_is_rejected() {
    let mut playback = make_playback(MotionConfig::new());
    let actor = spawn_actor(&mut playback, 1, 1);
    let err = playback
        .begin_motion(actor, IVec2::new(3, 1), 100.0)
        .unwrap_err();
    assert!(matches!(err, MotionError::NotAdjacent { .. }));
    assert!(!playback.move_state(actor).unwrap().is_moving);
}

#[test]
fn test_zero_duration_lands_on_next_tick() {
    let mut playback = make_playback(MotionConfig::new());
    let actor = spawn_actor(&mut playback, 1, 1);
    let mut done = playback.begin_motion(actor, IVec2::new(0, 1), 0.0).unwrap();
    assert_eq!(done.poll(), CompletionState::Pending);
    playback.tick(1.0);
    assert_eq!(playback.position(actor), Some(Vec2::new(0.0, 1.0)));
    let outcome = done.take().unwrap();
    assert_eq!(outcome.cell, IVec2::new(0, 1));
    assert_eq!(outcome.finished_at, 1.0);
}

#[test]
fn test_negative_duration_lands_on_next_tick() {
    let mut playback = make_playback(MotionConfig::new());
    let actor = spawn_actor(&mut playback, 1, 1);
    let mut done = playback
        .begin_motion(actor, IVec2::new(1, 2), -50.0)
        .unwrap();
    assert_eq!(done.poll(), CompletionState::Pending);
    playback.tick(1.0);
    assert_eq!(playback.position(actor), Some(Vec2::new(1.0, 2.0)));
    assert!(!playback.move_state(actor).unwrap().is_moving);
    let outcome = done.take().unwrap();
    assert_eq!(outcome.cell, IVec2::new(1, 2));
    assert_eq!(outcome.finished_at, 1.0);
}

#[test]
fn test_motion_within_grace_is_backdated() {
    let mut playback = make_playback(MotionConfig::new());
    let actor = spawn_actor(&mut playback, 0, 0);
    playback.begin_motion(actor, IVec2::new(1, 0), 100.0).unwrap();
    run_until(&mut playback, 10.0, 100.0);
    assert!(!playback.is_moving(actor));

    // Issued 30 ms after the first motion ended; starts at its end time.
    run_until(&mut playback, 10.0, 130.0);
    let mut second = playback.begin_motion(actor, IVec2::new(2, 0), 100.0).unwrap();
    run_until(&mut playback, 10.0, 190.0);
    assert_eq!(second.poll(), CompletionState::Pending);
    run_until(&mut playback, 10.0, 200.0);
    let outcome = second.take().unwrap();
    assert_eq!(outcome.finished_at, 200.0);
    assert!(outcome.finished_at - 130.0 < 100.0);
    assert_eq!(playback.position(actor), Some(Vec2::new(2.0, 0.0)));
}

#[test]
fn test_motion_after_grace_takes_full_duration() {
    let mut playback = make_playback(MotionConfig::new());
    let actor = spawn_actor(&mut playback, 0, 0);
    playback.begin_motion(actor, IVec2::new(1, 0), 100.0).unwrap();
    run_until(&mut playback, 10.0, 170.0);

    let mut second = playback.begin_motion(actor, IVec2::new(2, 0), 100.0).unwrap();
    run_until(&mut playback, 10.0, 260.0);
    assert_eq!(second.poll(), CompletionState::Pending);
    assert!(playback.position(actor).unwrap().x < 2.0);
    run_until(&mut playback, 10.0, 270.0);
    assert_eq!(second.take().unwrap().finished_at, 270.0);
}

#[test]
fn test_despawned_entity_abandons_its_motion() {
    let mut playback = make_playback(MotionConfig::new());
    let actor = spawn_actor(&mut playback, 0, 0);
    let mut done = playback.begin_motion(actor, IVec2::new(1, 0), 100.0).unwrap();
    playback.world_mut().despawn(actor);
    playback.tick(10.0);
    assert_eq!(done.poll(), CompletionState::Abandoned);
    assert_eq!(
        playback.world().resource::<MotionScheduler>().active_count(),
        0
    );
}

#[test]
fn test_walk_runs_steps_in_order_without_overlap() {
    let mut playback = make_playback(MotionConfig::new());
    let actor = spawn_actor(&mut playback, 2, 2);
    let arrivals = record_completions(&mut playback);

    let mut walk = playback.walk(actor, "rr.d", 100.0, 50.0).unwrap();
    let mut now = 0.0;
    while now < 400.0 {
        now += 10.0;
        playback.tick(now);
        assert!(playback.world().resource::<MotionScheduler>().active_count() <= 1);
        if now == 260.0 {
            let scheduler = playback.world().resource::<MotionScheduler>();
            let task = scheduler.task(actor).expect("down step in flight");
            assert_eq!(task.start_time(), 250.0);
        }
    }

    let arrivals = arrivals.lock().unwrap().clone();
    assert_eq!(
        arrivals,
        vec![
            (IVec2::new(3, 2), 100.0),
            (IVec2::new(4, 2), 200.0),
            (IVec2::new(4, 3), 350.0),
        ]
    );
    let outcome = walk.take().unwrap();
    assert_eq!(outcome.cells_walked, 3);
    assert_eq!(outcome.finished_at, 350.0);
    assert_eq!(playback.move_state(actor).unwrap().facing, Facing::Down);
}

#[test]
fn test_walk_skips_unknown_characters() {
    let mut playback = make_playback(MotionConfig::new());
    let actor = spawn_actor(&mut playback, 2, 2);
    let mut walk = playback.walk(actor, "r x >", 50.0, 50.0).unwrap();
    run_until(&mut playback, 10.0, 200.0);
    assert_eq!(walk.take().unwrap().cells_walked, 2);
    assert_eq!(playback.position(actor), Some(Vec2::new(4.0, 2.0)));
}

#[test]
fn test_second_walk_is_rejected_while_walking() {
    let mut playback = make_playback(MotionConfig::new());
    let actor = spawn_actor(&mut playback, 2, 2);
    let _walk = playback.walk(actor, "rr", 100.0, 50.0).unwrap();
    assert!(playback.walk(actor, "l", 100.0, 50.0).is_err());
}

#[test]
fn test_walk_waits_for_a_motion_already_in_flight() {
    let mut playback = make_playback(MotionConfig::new());
    let actor = spawn_actor(&mut playback, 2, 2);
    playback.begin_motion(actor, IVec2::new(2, 3), 100.0).unwrap();
    let mut walk = playback.walk(actor, "r", 100.0, 50.0).unwrap();
    run_until(&mut playback, 10.0, 100.0);
    assert_eq!(playback.position(actor), Some(Vec2::new(2.0, 3.0)));
    run_until(&mut playback, 10.0, 200.0);
    assert_eq!(walk.take().unwrap().cells_walked, 1);
    assert_eq!(playback.position(actor), Some(Vec2::new(3.0, 3.0)));
}

#[test]
fn test_instant_walk_moves_one_cell_per_step() {
    let mut config = MotionConfig::new();
    config.smooth_motion = false;
    let mut playback = make_playback(config);
    let actor = spawn_actor(&mut playback, 2, 2);

    let mut walk = playback.walk(actor, "rr", 100.0, 50.0).unwrap();
    assert_eq!(playback.position(actor), Some(Vec2::new(3.0, 2.0)));
    assert!(!playback.move_state(actor).unwrap().is_moving);

    run_until(&mut playback, 10.0, 90.0);
    assert_eq!(playback.position(actor), Some(Vec2::new(3.0, 2.0)));
    run_until(&mut playback, 10.0, 100.0);
    assert_eq!(playback.position(actor), Some(Vec2::new(4.0, 2.0)));
    run_until(&mut playback, 10.0, 200.0);
    assert_eq!(walk.take().unwrap().cells_walked, 2);
}
