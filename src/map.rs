//! Map generation
//!
//! `MapGen` runs the whole pipeline once per seed: heightmap, terrain
//! classification, region grouping, water labelling and river carving. The
//! resulting `Map` is read-only.

use tracing::{debug, info};

use crate::config::WorldGenConfig;
use crate::grid::{BoundedGrid, Cell, CellGrid, CellSize, GridPos, WorldPos};
use crate::groups::{self, Group, GroupKind, GroupMap};
use crate::heightmap::{self, NoiseParams};
use crate::render::GlyphMetrics;
use crate::rivers::{self, RiverPath};
use crate::terrain::Terrain;
use crate::tilemap::Tilemap;

/// Map generator for one seed and size.
#[derive(Clone, Debug)]
pub struct MapGen {
    pub seed: u64,
    pub rows: usize,
    pub cols: usize,
    pub cell_size: CellSize,
    pub noise: NoiseParams,
}

impl MapGen {
    pub fn new(seed: u64, rows: usize, cols: usize, cell_size: CellSize) -> Self {
        Self {
            seed,
            rows,
            cols,
            cell_size,
            noise: NoiseParams::default(),
        }
    }

    /// Build a generator from config, fixing the cell size to the measured
    /// extent of the water glyph in the map font.
    pub fn from_config(config: &WorldGenConfig, metrics: &impl GlyphMetrics) -> Self {
        let cell_size = metrics.measure_glyph(Terrain::Water.info().symbol, &config.map_font);
        Self {
            seed: config.seed,
            rows: config.map_rows,
            cols: config.map_cols,
            cell_size,
            noise: config.noise.clone(),
        }
    }

    pub fn with_noise(mut self, noise: NoiseParams) -> Self {
        self.noise = noise;
        self
    }

    /// Pixel width of the generated map.
    pub fn width(&self) -> i32 {
        self.cols as i32 * self.cell_size.w
    }

    /// Pixel height of the generated map.
    pub fn height(&self) -> i32 {
        self.rows as i32 * self.cell_size.h
    }

    pub fn generate_map(&self) -> Map {
        info!(seed = self.seed, rows = self.rows, cols = self.cols, "generating map");

        let grid = BoundedGrid::new(self.rows, self.cols, self.cell_size);
        let heightmap = heightmap::generate_heightmap(self.seed, self.rows, self.cols, &self.noise);
        let (min_h, max_h) = heightmap.min_max();
        debug!(min_h, max_h, "heightmap generated");

        let mut terrain = heightmap::classify_heightmap(&heightmap);

        let mut groups = groups::group_terrain(&terrain);
        groups::classify_water_groups(&mut groups);
        debug_assert!(groups.check_partition().is_ok());

        let rivers = rivers::carve_rivers(&grid, &heightmap, &mut terrain, &mut groups);
        debug_assert!(groups.check_partition().is_ok());

        info!(
            groups = groups.len(),
            seas = groups.count_kind(GroupKind::Sea),
            mountains = groups.count_kind(GroupKind::Mountain),
            rivers = rivers.len(),
            "map generated"
        );

        Map {
            seed: self.seed,
            grid,
            heightmap,
            terrain,
            groups,
            rivers,
        }
    }
}

/// A finished map: grid, heights, terrain bytes and the group partition.
#[derive(Clone, Debug)]
pub struct Map {
    pub seed: u64,
    pub grid: BoundedGrid,
    pub heightmap: Tilemap<f32>,
    pub terrain: Tilemap<Terrain>,
    pub groups: GroupMap,
    pub rivers: Vec<RiverPath>,
}

impl Map {
    pub fn rows(&self) -> usize {
        self.grid.rows
    }

    pub fn cols(&self) -> usize {
        self.grid.cols
    }

    pub fn cell_size(&self) -> CellSize {
        self.grid.cell_size()
    }

    /// Pixel extent of the whole map.
    pub fn size(&self) -> CellSize {
        self.grid.size()
    }

    /// Cell under a world position, `None` off the map.
    pub fn get_cell(&self, world_pos: WorldPos) -> Option<Cell> {
        self.grid.cell_from_world(world_pos)
    }

    pub fn get_cell_from_grid(&self, grid_pos: GridPos) -> Option<Cell> {
        self.grid.cell(grid_pos)
    }

    pub fn get_group(&self, cell: &Cell) -> Option<&Group> {
        self.groups.group_at(cell.grid_pos())
    }

    pub fn is_cell_grouped(&self, cell: &Cell) -> bool {
        self.groups.is_grouped(cell.grid_pos())
    }

    pub fn terrain_at(&self, cell: &Cell) -> Option<Terrain> {
        self.terrain.get_at(cell.grid_pos()).copied()
    }

    pub fn height_at(&self, cell: &Cell) -> Option<f32> {
        self.heightmap.get_at(cell.grid_pos()).copied()
    }

    /// Cell at the centre of the map.
    pub fn center_cell(&self) -> Cell {
        Cell::from_grid(
            GridPos::new((self.rows() / 2) as i32, (self.cols() / 2) as i32),
            self.cell_size(),
        )
    }

    /// Terrain as raw bytes, row-major.
    pub fn terrain_bytes(&self) -> Vec<u8> {
        self.terrain.as_slice().iter().map(|t| t.as_byte()).collect()
    }
}
