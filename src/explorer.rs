//! Camera walker over the chunked world
//!
//! Moves a camera position through world pixels and feeds it to
//! [`World::calculate_chunks_in_view`] once per tick, the way an interactive
//! front end would.

use tracing::{debug, info};

use crate::grid::{Cell, WorldPos};
use crate::world::{ViewUpdate, World};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }
}

/// Explorer state
pub struct Explorer {
    /// Camera position in world pixels
    pos: WorldPos,
    /// Pixels moved per step
    speed: i32,
    recenters: usize,
}

impl Explorer {
    /// Build the world around `start` and place the camera at its chunk centre.
    /// Returns `None` when `start` is not on the map.
    pub fn spawn(world: &mut World, start: &Cell, speed: i32) -> Option<Self> {
        let chunk = world.generate_world(start, true)?;
        info!(start = ?start.grid_pos(), in_view = world.chunks_in_view().len(), "explorer spawned");
        Some(Self {
            pos: chunk.center(),
            speed,
            recenters: 0,
        })
    }

    /// Move one step, scroll the viewport along and update the view.
    pub fn step(&mut self, world: &mut World, direction: Direction) -> ViewUpdate {
        let (dx, dy) = direction.offset();
        let (dx, dy) = (dx * self.speed, dy * self.speed);
        self.pos = self.pos + WorldPos::new(dx, dy);
        world.scroll(dx, dy);

        let update = world.calculate_chunks_in_view(self.pos);
        match update {
            ViewUpdate::Recentered(cell) => {
                self.recenters += 1;
                debug!(
                    cell = ?cell.grid_pos(),
                    group = world.selected_group().map(|g| g.name.as_str()).unwrap_or("none"),
                    generated = world.chunks_generated(),
                    "recentered"
                );
            }
            ViewUpdate::OutOfView => debug!(pos = ?self.pos, "camera outside view"),
            ViewUpdate::Unchanged => {}
        }
        update
    }

    pub fn pos(&self) -> WorldPos {
        self.pos
    }

    /// Camera position relative to the viewport corner.
    pub fn screen_pos(&self, world: &World) -> WorldPos {
        self.pos - world.top_left()
    }

    /// Map cell whose chunk holds the camera.
    pub fn map_cell(&self, world: &World) -> Option<Cell> {
        world.chunk_gen().map_cell_at(self.pos, &world.map().grid)
    }

    pub fn recenters(&self) -> usize {
        self.recenters
    }
}
