//! Room grids the avatar moves through.
//!
//! A room is a rectangle of cells, some of which are walls. Rooms are
//! identified by [`RoomId`](crate::components::roomid::RoomId) and can be
//! loaded from JSON:
//!
//! ```json
//! { "rooms": { "1": { "width": 16, "height": 16, "walls": [[0, 0], [1, 0]] } } }
//! ```

use bevy_ecs::prelude::Resource;
use glam::IVec2;
use log::info;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::components::roomid::RoomId;

/// Side length of a room when none is given.
pub const DEFAULT_ROOM_SIZE: i32 = 16;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("failed to read room file {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid room data: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_size() -> i32 {
    DEFAULT_ROOM_SIZE
}

/// Walls and bounds of a single room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomGrid {
    #[serde(default = "default_size")]
    pub width: i32,
    #[serde(default = "default_size")]
    pub height: i32,
    #[serde(default)]
    pub walls: FxHashSet<IVec2>,
}

impl Default for RoomGrid {
    fn default() -> Self {
        Self::new(DEFAULT_ROOM_SIZE, DEFAULT_ROOM_SIZE)
    }
}

impl RoomGrid {
    pub fn new(width: i32, height: i32) -> Self {
        RoomGrid {
            width,
            height,
            walls: FxHashSet::default(),
        }
    }

    pub fn with_wall(mut self, x: i32, y: i32) -> Self {
        self.walls.insert(IVec2::new(x, y));
        self
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    pub fn is_wall(&self, cell: IVec2) -> bool {
        self.walls.contains(&cell)
    }
}

/// Registry of rooms by id.
#[derive(Resource, Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rooms {
    pub rooms: FxHashMap<RoomId, RoomGrid>,
}

impl Rooms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: RoomId, room: RoomGrid) {
        self.rooms.insert(id, room);
    }

    pub fn get(&self, id: RoomId) -> Option<&RoomGrid> {
        self.rooms.get(&id)
    }

    /// Whether `cell` exists in `room`. Unknown rooms contain no cells.
    pub fn in_bounds(&self, room: RoomId, cell: IVec2) -> bool {
        self.get(room).is_some_and(|r| r.in_bounds(cell))
    }

    /// Whether a wall occupies `(x, y)` in `room`.
    pub fn cell_is_solid(&self, room: RoomId, x: i32, y: i32) -> bool {
        self.get(room).is_some_and(|r| r.is_wall(IVec2::new(x, y)))
    }

    pub fn from_json(text: &str) -> Result<Self, RoomError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, RoomError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RoomError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rooms = Self::from_json(&text)?;
        info!("Loaded {} room(s) from {:?}", rooms.rooms.len(), path);
        Ok(rooms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_and_walls() {
        let mut rooms = Rooms::new();
        rooms.insert(RoomId(1), RoomGrid::new(4, 3).with_wall(2, 1));
        assert!(rooms.in_bounds(RoomId(1), IVec2::new(3, 2)));
        assert!(!rooms.in_bounds(RoomId(1), IVec2::new(4, 0)));
        assert!(!rooms.in_bounds(RoomId(1), IVec2::new(0, -1)));
        assert!(rooms.cell_is_solid(RoomId(1), 2, 1));
        assert!(!rooms.cell_is_solid(RoomId(1), 1, 1));
        assert!(!rooms.in_bounds(RoomId(9), IVec2::ZERO));
    }

    #[test]
    fn test_from_json_with_defaults() {
        let rooms = Rooms::from_json(
            r#"{"rooms":{"1":{"walls":[[0,0],[5,5]]},"2":{"width":8,"height":4}}}"#,
        )
        .unwrap();
        let first = rooms.get(RoomId(1)).unwrap();
        assert_eq!(first.width, DEFAULT_ROOM_SIZE);
        assert!(first.is_wall(IVec2::new(5, 5)));
        let second = rooms.get(RoomId(2)).unwrap();
        assert_eq!((second.width, second.height), (8, 4));
        assert!(second.walls.is_empty());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(Rooms::from_json("{"), Err(RoomError::Json(_))));
    }
}
