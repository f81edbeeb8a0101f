//! Frame clock.
//!
//! The frame clock is the only thing that moves time forward. Each call to
//! [`FrameClock::next_timestamp`] yields the timestamp (ms) of the next
//! display refresh:
//!
//! - `Fixed` steps by exactly `1000 / fps` ms, so runs are reproducible.
//! - `Realtime` sleeps until the next frame is due and reports the elapsed
//!   wall-clock time since the clock started.
use log::warn;
use std::time::{Duration, Instant};

const DEFAULT_FPS: u32 = 60;

#[derive(Debug, Clone, Copy)]
pub enum ClockMode {
    Fixed,
    Realtime { origin: Instant },
}

#[derive(Debug, Clone)]
pub struct FrameClock {
    mode: ClockMode,
    frame_ms: f64,
    next: f64,
    ticks: u64,
}

impl FrameClock {
    /// Deterministic clock starting at 0 ms.
    pub fn fixed(fps: u32) -> Self {
        FrameClock {
            mode: ClockMode::Fixed,
            frame_ms: frame_ms(fps),
            next: 0.0,
            ticks: 0,
        }
    }

    /// Wall-clock paced clock starting now.
    pub fn realtime(fps: u32) -> Self {
        FrameClock {
            mode: ClockMode::Realtime {
                origin: Instant::now(),
            },
            frame_ms: frame_ms(fps),
            next: 0.0,
            ticks: 0,
        }
    }

    pub fn frame_ms(&self) -> f64 {
        self.frame_ms
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Timestamp in milliseconds of the next refresh.
    pub fn next_timestamp(&mut self) -> f64 {
        let now = match self.mode {
            ClockMode::Fixed => self.next,
            ClockMode::Realtime { origin } => {
                let elapsed = origin.elapsed().as_secs_f64() * 1000.0;
                if elapsed < self.next {
                    std::thread::sleep(Duration::from_secs_f64((self.next - elapsed) / 1000.0));
                }
                origin.elapsed().as_secs_f64() * 1000.0
            }
        };
        self.next += self.frame_ms;
        self.ticks += 1;
        now
    }

    /// Call `on_tick` once per refresh for `frames` refreshes.
    pub fn run(&mut self, frames: u64, mut on_tick: impl FnMut(f64)) {
        for _ in 0..frames {
            let now = self.next_timestamp();
            on_tick(now);
        }
    }
}

fn frame_ms(fps: u32) -> f64 {
    let fps = if fps == 0 {
        warn!("Frame rate of 0 requested, using {}", DEFAULT_FPS);
        DEFAULT_FPS
    } else {
        fps
    };
    1000.0 / fps as f64
}
