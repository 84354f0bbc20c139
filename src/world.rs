//! World streaming
//!
//! Owns the generated map and streams it as chunks around a center cell.
//! Chunks are built the first time a view pass reaches them and kept for the
//! life of the world; each recenter only rebuilds the in-view list.

use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::chunk::{ChunkGen, MapChunk};
use crate::config::WorldGenConfig;
use crate::grid::{Cell, CellGrid, CellSize, WorldPos};
use crate::groups::Group;
use crate::map::Map;

/// Outcome of a per-tick view update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewUpdate {
    /// Position is still inside the center chunk.
    Unchanged,
    /// Position moved into another in-view chunk; the view was rebuilt around this map cell.
    Recentered(Cell),
    /// Position is outside every in-view chunk; nothing changed this tick.
    OutOfView,
}

pub struct World {
    map: Map,
    chunk_gen: ChunkGen,
    /// Every chunk ever generated, keyed by chunk world position. Never shrinks.
    generated: HashMap<WorldPos, Rc<MapChunk>>,
    in_view: Vec<Rc<MapChunk>>,
    in_view_positions: HashSet<WorldPos>,
    center_chunk: Option<Rc<MapChunk>>,
    view_distance: usize,
    viewport: CellSize,
    top_left: WorldPos,
    selected_cell: Option<Cell>,
}

impl World {
    pub fn new(map: Map, chunk_rows: usize, chunk_cols: usize, view_distance: usize, viewport: CellSize) -> Self {
        let chunk_gen = ChunkGen::new(chunk_rows, chunk_cols, map.cell_size());
        Self {
            map,
            chunk_gen,
            generated: HashMap::new(),
            in_view: Vec::new(),
            in_view_positions: HashSet::new(),
            center_chunk: None,
            view_distance,
            viewport,
            top_left: WorldPos::default(),
            selected_cell: None,
        }
    }

    pub fn from_config(map: Map, config: &WorldGenConfig) -> Self {
        Self::new(
            map,
            config.chunk_rows,
            config.chunk_cols,
            config.view_distance,
            config.viewport_size(),
        )
    }

    /// Rebuild the in-view chunk set around `center`, generating chunks that
    /// do not exist yet.
    ///
    /// Neighbours are explored breadth-first up to `view_distance` hops, so
    /// each position is reached with its shortest hop count and visited once.
    /// With `is_full_generation` the viewport is also recentered on the
    /// center chunk. Returns the new center chunk, or `None` (and leaves the
    /// world untouched) when `center` is not a map cell.
    pub fn generate_world(&mut self, center: &Cell, is_full_generation: bool) -> Option<Rc<MapChunk>> {
        let center = self.map.grid.cell(center.grid_pos())?;

        self.clear_chunks_in_view();
        let before = self.chunk_gen.generated_count();

        let mut queue = VecDeque::from([(center, 0usize)]);
        while let Some((cell, hops)) = queue.pop_front() {
            let pos = self.chunk_gen.chunk_pos(&cell);
            if !self.in_view_positions.insert(pos) {
                continue;
            }

            let chunk = match self.generated.get(&pos) {
                Some(chunk) => {
                    trace!(?pos, "chunk cache hit");
                    Rc::clone(chunk)
                }
                None => {
                    let terrain = self.map.terrain_at(&cell).unwrap_or_default();
                    let chunk = Rc::new(self.chunk_gen.generate_map_chunk(&cell, terrain));
                    self.generated.insert(pos, Rc::clone(&chunk));
                    chunk
                }
            };
            self.in_view.push(chunk);

            if hops < self.view_distance {
                for next in self.map.grid.connected_cells(&cell) {
                    if !self.in_view_positions.contains(&self.chunk_gen.chunk_pos(&next)) {
                        queue.push_back((next, hops + 1));
                    }
                }
            }
        }

        let center_chunk = self.generated.get(&self.chunk_gen.chunk_pos(&center)).cloned();
        if let Some(chunk) = &center_chunk {
            if is_full_generation {
                self.set_top_left(chunk.world_pos());
            }
        }
        self.center_chunk = center_chunk.clone();

        debug!(
            center = ?center.grid_pos(),
            in_view = self.in_view.len(),
            new_chunks = self.chunk_gen.generated_count() - before,
            cached = self.generated.len(),
            "world generated"
        );
        center_chunk
    }

    /// Recenter on whichever in-view chunk contains `world_pos`.
    ///
    /// Called once per tick with the camera position. Moving into another
    /// chunk rebuilds the view around that chunk's map cell without moving the
    /// viewport. A position outside every in-view chunk is ignored.
    pub fn calculate_chunks_in_view(&mut self, world_pos: WorldPos) -> ViewUpdate {
        let Some(chunk) = self.get_map_chunk_from_world(world_pos).cloned() else {
            return ViewUpdate::OutOfView;
        };
        if let Some(center) = &self.center_chunk {
            if Rc::ptr_eq(center, &chunk) {
                return ViewUpdate::Unchanged;
            }
        }

        let cell = *chunk.anchor();
        self.generate_world(&cell, false);
        self.selected_cell = Some(cell);
        ViewUpdate::Recentered(cell)
    }

    /// In-view chunk whose bounds contain `world_pos`.
    pub fn get_map_chunk_from_world(&self, world_pos: WorldPos) -> Option<&Rc<MapChunk>> {
        self.in_view.iter().find(|chunk| chunk.contains(world_pos))
    }

    /// Cached chunk at a chunk world position.
    pub fn get_map_chunk(&self, chunk_pos: WorldPos) -> Option<&Rc<MapChunk>> {
        self.generated.get(&chunk_pos)
    }

    pub fn is_chunk_generated(&self, chunk_pos: WorldPos) -> bool {
        self.generated.contains_key(&chunk_pos)
    }

    pub fn is_chunk_in_view(&self, chunk_pos: WorldPos) -> bool {
        self.in_view_positions.contains(&chunk_pos)
    }

    pub fn clear_chunks_in_view(&mut self) {
        self.in_view.clear();
        self.in_view_positions.clear();
    }

    /// Place the viewport so the chunk at `chunk_pos` sits in its middle.
    pub fn set_top_left(&mut self, chunk_pos: WorldPos) {
        let chunk = self.chunk_gen.chunk_size();
        self.top_left = WorldPos::new(
            chunk_pos.x - self.viewport.w / 2 + chunk.w / 2,
            chunk_pos.y - self.viewport.h / 2 + chunk.h / 2,
        );
    }

    /// Shift the viewport by a pixel offset.
    pub fn scroll(&mut self, dx: i32, dy: i32) {
        self.top_left = self.top_left + WorldPos::new(dx, dy);
    }

    pub fn top_left(&self) -> WorldPos {
        self.top_left
    }

    pub fn chunks_in_view(&self) -> &[Rc<MapChunk>] {
        &self.in_view
    }

    pub fn center_chunk(&self) -> Option<&Rc<MapChunk>> {
        self.center_chunk.as_ref()
    }

    /// Map cell picked by the most recent recenter.
    pub fn selected_cell(&self) -> Option<Cell> {
        self.selected_cell
    }

    /// Group under the selected cell, for status displays.
    pub fn selected_group(&self) -> Option<&Group> {
        self.selected_cell.and_then(|cell| self.map.get_group(&cell))
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn chunk_gen(&self) -> &ChunkGen {
        &self.chunk_gen
    }

    pub fn chunk_size(&self) -> CellSize {
        self.chunk_gen.chunk_size()
    }

    pub fn view_distance(&self) -> usize {
        self.view_distance
    }

    pub fn viewport(&self) -> CellSize {
        self.viewport
    }

    /// Number of chunk constructions so far; each position counts once.
    pub fn chunks_generated(&self) -> usize {
        self.chunk_gen.generated_count()
    }

    pub fn cached_chunks(&self) -> usize {
        self.generated.len()
    }
}
