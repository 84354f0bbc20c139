//! Map chunks
//!
//! A chunk is a `chunk_rows × chunk_cols` block of cells standing in for one
//! map cell when the map is explored up close. Chunk space is an unbounded
//! grid whose cell size is the chunk's pixel size, so the chunk anchored at
//! map cell `(i, j)` sits at `(j * chunk_w, i * chunk_h)`.

use tracing::trace;

use crate::grid::{BoundedGrid, Cell, CellGrid, CellSize, GridPos, InfiniteGrid, WorldPos};
use crate::terrain::Terrain;
use crate::tilemap::Tilemap;

/// One generated chunk. Content is fixed at construction.
#[derive(Clone, Debug)]
pub struct MapChunk {
    anchor: Cell,
    world_pos: WorldPos,
    grid: BoundedGrid,
    terrain: Tilemap<Terrain>,
}

impl MapChunk {
    /// Map cell this chunk was generated from.
    pub fn anchor(&self) -> &Cell {
        &self.anchor
    }

    /// Top-left corner in world pixels.
    pub fn world_pos(&self) -> WorldPos {
        self.world_pos
    }

    /// Pixel extent of the chunk.
    pub fn size(&self) -> CellSize {
        self.grid.size()
    }

    pub fn rows(&self) -> usize {
        self.grid.rows
    }

    pub fn cols(&self) -> usize {
        self.grid.cols
    }

    /// Chunk-local grid; cell world positions are relative to the chunk corner.
    pub fn grid(&self) -> &BoundedGrid {
        &self.grid
    }

    pub fn terrain_at(&self, local: GridPos) -> Option<Terrain> {
        self.terrain.get_at(local).copied()
    }

    /// Half-open rectangle test against the chunk's world bounds.
    pub fn contains(&self, pos: WorldPos) -> bool {
        let size = self.size();
        pos.x >= self.world_pos.x
            && pos.x < self.world_pos.x + size.w
            && pos.y >= self.world_pos.y
            && pos.y < self.world_pos.y + size.h
    }

    /// World position of the chunk's centre pixel.
    pub fn center(&self) -> WorldPos {
        let size = self.size();
        WorldPos::new(self.world_pos.x + size.w / 2, self.world_pos.y + size.h / 2)
    }
}

/// Builds chunks and maps anchor cells into chunk space.
#[derive(Clone, Debug)]
pub struct ChunkGen {
    pub chunk_rows: usize,
    pub chunk_cols: usize,
    cell_size: CellSize,
    chunk_space: InfiniteGrid,
    generated: usize,
}

impl ChunkGen {
    pub fn new(chunk_rows: usize, chunk_cols: usize, cell_size: CellSize) -> Self {
        Self {
            chunk_rows,
            chunk_cols,
            cell_size,
            chunk_space: InfiniteGrid::new(cell_size.scaled(chunk_rows, chunk_cols)),
            generated: 0,
        }
    }

    /// Pixel extent of every chunk.
    pub fn chunk_size(&self) -> CellSize {
        self.chunk_space.cell_size()
    }

    /// World position of the chunk anchored at a map cell.
    pub fn chunk_pos(&self, anchor: &Cell) -> WorldPos {
        Cell::from_grid(anchor.grid_pos(), self.chunk_size()).world_pos()
    }

    /// Map cell whose chunk covers `world_pos`, `None` beyond the map.
    pub fn map_cell_at(&self, world_pos: WorldPos, map_grid: &BoundedGrid) -> Option<Cell> {
        let chunk_cell = self.chunk_space.cell_from_world(world_pos)?;
        map_grid.cell(chunk_cell.grid_pos())
    }

    /// Build the chunk for `anchor`, filling every cell with `terrain`.
    pub fn generate_map_chunk(&mut self, anchor: &Cell, terrain: Terrain) -> MapChunk {
        let world_pos = self.chunk_pos(anchor);
        self.generated += 1;
        trace!(anchor = ?anchor.grid_pos(), ?world_pos, ?terrain, "generated chunk");

        MapChunk {
            anchor: *anchor,
            world_pos,
            grid: BoundedGrid::new(self.chunk_rows, self.chunk_cols, self.cell_size),
            terrain: Tilemap::new_with(self.chunk_rows, self.chunk_cols, terrain),
        }
    }

    /// Number of chunks built so far.
    pub fn generated_count(&self) -> usize {
        self.generated
    }
}
