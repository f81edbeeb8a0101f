//! Motion configuration resource.
//!
//! Tunables for smooth movement and graphic management, loaded from an INI
//! file. Every key is optional; anything missing or unparsable keeps its
//! default.
//!
//! # Configuration File Format
//!
//! ```ini
//! [motion]
//! avatar_move_speed = 190
//! event_move_speed = 400
//! walk_pause = 400
//! continuity_grace = 60
//! tile_px = 8
//! smooth_motion = true
//! one_move_per_press = false
//!
//! [graphics]
//! manage_avatar_graphic = true
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_AVATAR_MOVE_SPEED: f64 = 190.0;
const DEFAULT_EVENT_MOVE_SPEED: f64 = 400.0;
const DEFAULT_WALK_PAUSE: f64 = 400.0;
const DEFAULT_CONTINUITY_GRACE: f64 = 60.0;
const DEFAULT_TILE_PX: u32 = 8;
const DEFAULT_SMOOTH_MOTION: bool = true;
const DEFAULT_ONE_MOVE_PER_PRESS: bool = false;
const DEFAULT_MANAGE_AVATAR_GRAPHIC: bool = true;
const DEFAULT_CONFIG_PATH: &str = "./gridglide.ini";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config file {path:?}: {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("failed to save config file {path:?}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Motion and graphic settings.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MotionConfig {
    /// Milliseconds the avatar takes to cross one cell.
    pub avatar_move_speed: f64,
    /// Milliseconds a scripted walk takes per cell.
    pub event_move_speed: f64,
    /// Milliseconds slept for each `.` in a walk sequence.
    pub walk_pause: f64,
    /// Window (ms) after a motion ends in which the next one is backdated.
    pub continuity_grace: f64,
    /// Pixels per cell used to snap lerped positions. 0 disables snapping.
    pub tile_px: u32,
    /// Interpolate moves between cells. When false, moves are instant.
    pub smooth_motion: bool,
    /// Only a fresh key press moves the avatar; holding does not repeat.
    pub one_move_per_press: bool,
    /// Let the graphic resolver drive the avatar's tile.
    pub manage_avatar_graphic: bool,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionConfig {
    pub fn new() -> Self {
        Self {
            avatar_move_speed: DEFAULT_AVATAR_MOVE_SPEED,
            event_move_speed: DEFAULT_EVENT_MOVE_SPEED,
            walk_pause: DEFAULT_WALK_PAUSE,
            continuity_grace: DEFAULT_CONTINUITY_GRACE,
            tile_px: DEFAULT_TILE_PX,
            smooth_motion: DEFAULT_SMOOTH_MOTION,
            one_move_per_press: DEFAULT_ONE_MOVE_PER_PRESS,
            manage_avatar_graphic: DEFAULT_MANAGE_AVATAR_GRAPHIC,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Ticks a staged graphic change waits before it is committed.
    ///
    /// Smooth motion produces a one-tick idle state between chained cells,
    /// so swaps wait one tick; instant moves never do.
    pub fn graphic_swap_delay(&self) -> u32 {
        if self.smooth_motion { 1 } else { 0 }
    }

    /// Load configuration from the INI file at `config_path`.
    pub fn load_from_file(&mut self) -> Result<(), ConfigError> {
        let mut ini = Ini::new();
        ini.load(&self.config_path).map_err(|reason| ConfigError::Load {
            path: self.config_path.clone(),
            reason,
        })?;
        self.apply(&ini);
        info!(
            "Loaded motion config from {:?}: avatar={}ms event={}ms grace={}ms smooth={}",
            self.config_path,
            self.avatar_move_speed,
            self.event_move_speed,
            self.continuity_grace,
            self.smooth_motion
        );
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), ConfigError> {
        let mut ini = Ini::new();
        ini.read(text.to_string()).map_err(ConfigError::Parse)?;
        self.apply(&ini);
        Ok(())
    }

    fn apply(&mut self, ini: &Ini) {
        if let Some(v) = read_speed(ini, "motion", "avatar_move_speed") {
            self.avatar_move_speed = v;
        }
        if let Some(v) = read_speed(ini, "motion", "event_move_speed") {
            self.event_move_speed = v;
        }
        if let Some(v) = read_float(ini, "motion", "walk_pause") {
            self.walk_pause = v.max(0.0);
        }
        if let Some(v) = read_float(ini, "motion", "continuity_grace") {
            self.continuity_grace = v.max(0.0);
        }
        match ini.getuint("motion", "tile_px") {
            Ok(Some(v)) => self.tile_px = v as u32,
            Ok(None) => {}
            Err(e) => warn!("Ignoring motion.tile_px: {}", e),
        }
        if let Some(v) = read_bool(ini, "motion", "smooth_motion") {
            self.smooth_motion = v;
        }
        if let Some(v) = read_bool(ini, "motion", "one_move_per_press") {
            self.one_move_per_press = v;
        }
        if let Some(v) = read_bool(ini, "graphics", "manage_avatar_graphic") {
            self.manage_avatar_graphic = v;
        }
    }

    /// Save configuration to the INI file, creating it if needed.
    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        let mut ini = Ini::new();
        ini.set("motion", "avatar_move_speed", Some(self.avatar_move_speed.to_string()));
        ini.set("motion", "event_move_speed", Some(self.event_move_speed.to_string()));
        ini.set("motion", "walk_pause", Some(self.walk_pause.to_string()));
        ini.set("motion", "continuity_grace", Some(self.continuity_grace.to_string()));
        ini.set("motion", "tile_px", Some(self.tile_px.to_string()));
        ini.set("motion", "smooth_motion", Some(self.smooth_motion.to_string()));
        ini.set("motion", "one_move_per_press", Some(self.one_move_per_press.to_string()));
        ini.set(
            "graphics",
            "manage_avatar_graphic",
            Some(self.manage_avatar_graphic.to_string()),
        );
        ini.write(&self.config_path).map_err(|source| ConfigError::Save {
            path: self.config_path.clone(),
            source,
        })?;
        info!("Saved motion config to {:?}", self.config_path);
        Ok(())
    }
}

fn read_float(ini: &Ini, section: &str, key: &str) -> Option<f64> {
    match ini.getfloat(section, key) {
        Ok(v) => v,
        Err(e) => {
            warn!("Ignoring {}.{}: {}", section, key, e);
            None
        }
    }
}

// A zero or negative speed falls back to the default, like an unset key.
fn read_speed(ini: &Ini, section: &str, key: &str) -> Option<f64> {
    read_float(ini, section, key).filter(|v| *v > 0.0)
}

fn read_bool(ini: &Ini, section: &str, key: &str) -> Option<bool> {
    match ini.getbool(section, key) {
        Ok(v) => v,
        Err(e) => {
            warn!("Ignoring {}.{}: {}", section, key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MotionConfig::new();
        assert_eq!(config.avatar_move_speed, 190.0);
        assert_eq!(config.event_move_speed, 400.0);
        assert_eq!(config.continuity_grace, 60.0);
        assert_eq!(config.tile_px, 8);
        assert!(config.smooth_motion);
        assert!(!config.one_move_per_press);
        assert!(config.manage_avatar_graphic);
        assert_eq!(config.graphic_swap_delay(), 1);
    }

    #[test]
    fn test_load_from_str_overrides_present_keys() {
        let mut config = MotionConfig::new();
        config
            .load_from_str(
                "[motion]\navatar_move_speed = 120\nsmooth_motion = false\n\n[graphics]\nmanage_avatar_graphic = false\n",
            )
            .unwrap();
        assert_eq!(config.avatar_move_speed, 120.0);
        assert_eq!(config.event_move_speed, 400.0);
        assert!(!config.smooth_motion);
        assert!(!config.manage_avatar_graphic);
        assert_eq!(config.graphic_swap_delay(), 0);
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let mut config = MotionConfig::new();
        config
            .load_from_str("[motion]\navatar_move_speed = fast\nevent_move_speed = 0\ntile_px = -3\n")
            .unwrap();
        assert_eq!(config.avatar_move_speed, 190.0);
        assert_eq!(config.event_move_speed, 400.0);
        assert_eq!(config.tile_px, 8);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut config = MotionConfig::with_path("./definitely/not/here.ini");
        assert!(matches!(
            config.load_from_file(),
            Err(ConfigError::Load { .. })
        ));
        assert_eq!(config, MotionConfig::with_path("./definitely/not/here.ini"));
    }
}
