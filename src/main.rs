use clap::Parser;
use glam::IVec2;
use gridglide::components::graphicfields::GraphicFields;
use gridglide::components::movestate::Facing;
use gridglide::components::roomid::RoomId;
use gridglide::frameclock::FrameClock;
use gridglide::game::Playback;
use gridglide::resources::motionconfig::MotionConfig;
use gridglide::resources::rooms::{DEFAULT_ROOM_SIZE, RoomGrid, Rooms};
use gridglide::resources::worldtime::WorldTime;
use log::{error, info, warn};
use std::path::PathBuf;

const WANDER_STEPS: &[char] = &['l', 'r', 'u', 'd', '.'];

#[derive(Parser)]
#[command(version, about = "Headless playback of smooth cell-to-cell movement")]
struct Cli {
    /// INI file with [motion] and [graphics] settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON file describing the rooms.
    #[arg(long, value_name = "PATH")]
    room: Option<PathBuf>,

    #[arg(long, default_value_t = 240)]
    frames: u64,

    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Walk sequence for the actor, e.g. "rr.d".
    #[arg(long, value_name = "SEQUENCE")]
    walk: Option<String>,

    /// Append this many random steps to the actor's walk.
    #[arg(long, value_name = "STEPS")]
    wander: Option<usize>,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Direction the avatar holds for the whole run (l, r, u, d).
    #[arg(long, value_name = "DIR")]
    hold: Option<char>,

    /// Pace frames with the wall clock instead of stepping time.
    #[arg(long)]
    realtime: bool,
}

fn demo_fields(base: u32) -> GraphicFields {
    GraphicFields::new()
        .with_field("graphic", base)
        .with_field("graphic-up", base + 1)
        .with_field("graphic-left", base + 2)
        .with_field("graphic-right", base + 3)
        .with_field("graphic-right-move", base + 4)
        .with_field("graphic-left-move", base + 5)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MotionConfig::with_path(path),
        None => MotionConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        if cli.config.is_some() {
            warn!("{}; using defaults", e);
        } else {
            info!("No motion config found, using defaults");
        }
    }

    let rooms = match &cli.room {
        Some(path) => match Rooms::load_json(path) {
            Ok(rooms) => rooms,
            Err(e) => {
                error!("Failed to load rooms: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            let mut rooms = Rooms::new();
            rooms.insert(
                RoomId(0),
                RoomGrid::new(DEFAULT_ROOM_SIZE, DEFAULT_ROOM_SIZE).with_wall(6, 1),
            );
            rooms
        }
    };
    let room = rooms.rooms.keys().min().copied().unwrap_or_default();

    let mut playback = Playback::new(config, rooms);
    let avatar = playback.spawn_avatar(room, IVec2::new(1, 1), demo_fields(10));
    let actor = playback.spawn_actor(room, IVec2::new(4, 4), demo_fields(20), true);

    let mut sequence = cli.walk.clone().unwrap_or_default();
    if let Some(steps) = cli.wander {
        let mut rng = fastrand::Rng::with_seed(cli.seed);
        sequence.extend((0..steps).filter_map(|_| rng.choice(WANDER_STEPS.iter().copied())));
    }

    let held = cli.hold.and_then(|c| match c.to_ascii_lowercase() {
        'l' => Some(Facing::Left),
        'r' => Some(Facing::Right),
        'u' => Some(Facing::Up),
        'd' => Some(Facing::Down),
        _ => {
            warn!("Unknown hold direction {:?}", c);
            None
        }
    });

    let mut clock = if cli.realtime {
        FrameClock::realtime(cli.fps)
    } else {
        FrameClock::fixed(cli.fps)
    };

    // The first tick sets the time origin before any command runs.
    playback.tick(clock.next_timestamp());
    let mut walk = if sequence.is_empty() {
        None
    } else {
        match playback.walk_with_defaults(actor, &sequence) {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Walk not started: {}", e);
                None
            }
        }
    };

    let report_every = u64::from(cli.fps.max(1));
    clock.run(cli.frames.saturating_sub(1), |now| {
        playback.hold(held);
        playback.tick(now);

        if let Some(handle) = walk.as_mut()
            && let Some(outcome) = handle.take()
        {
            info!(
                "Actor walked {} cell(s), finished at {:.0} ms",
                outcome.cells_walked, outcome.finished_at
            );
            walk = None;
        }

        if playback.world().resource::<WorldTime>().frame_count % report_every == 0 {
            for (name, entity) in [("avatar", avatar), ("actor", actor)] {
                if let (Some(pos), Some(state)) = (playback.position(entity), playback.move_state(entity)) {
                    info!(
                        "{:>6.0} ms {}: ({:.3}, {:.3}) facing {} moving {} tile {:?}",
                        now,
                        name,
                        pos.x,
                        pos.y,
                        state.facing.as_str(),
                        state.is_moving,
                        playback.graphic(entity)
                    );
                }
            }
        }
    });

    info!("Stopped after {} frame(s)", clock.ticks());
}
