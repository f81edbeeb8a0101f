use bevy_ecs::prelude::Component;
use glam::{IVec2, Vec2};

/// Grid position of an entity, in cells.
///
/// Real-valued because an entity crossing between two cells sits somewhere
/// on the segment joining them. With no motion in flight it is always an
/// exact cell coordinate.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct MapPosition {
    pub pos: Vec2,
}

impl MapPosition {
    pub fn new(x: f32, y: f32) -> Self {
        MapPosition {
            pos: Vec2::new(x, y),
        }
    }

    pub fn from_cell(cell: IVec2) -> Self {
        MapPosition {
            pos: cell.as_vec2(),
        }
    }

    /// Nearest cell to the current position.
    pub fn cell(&self) -> IVec2 {
        self.pos.round().as_ivec2()
    }

    /// Whether the position sits exactly on a cell.
    pub fn is_grid_aligned(&self) -> bool {
        self.pos == self.pos.round()
    }
}
