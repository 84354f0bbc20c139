//! Grid/cell coordinate mapping
//!
//! Converts between grid indices `(row, col)` and world-pixel positions
//! `(x, y)`. The unbounded grid accepts any coordinate; the bounded grid only
//! answers for cells inside `[0, rows) × [0, cols)`.

use serde::{Deserialize, Serialize};

/// Grid index of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub row: i32,
    pub col: i32,
}

impl GridPos {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

/// Pixel position in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: i32,
    pub y: i32,
}

impl WorldPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for WorldPos {
    type Output = WorldPos;

    fn add(self, rhs: WorldPos) -> WorldPos {
        WorldPos::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for WorldPos {
    type Output = WorldPos;

    fn sub(self, rhs: WorldPos) -> WorldPos {
        WorldPos::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Pixel extent of one cell (or of anything measured in pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellSize {
    pub w: i32,
    pub h: i32,
}

impl CellSize {
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    /// Size of a block of `rows × cols` cells.
    pub fn scaled(self, rows: usize, cols: usize) -> CellSize {
        CellSize::new(self.w * cols as i32, self.h * rows as i32)
    }
}

/// A grid-addressed tile. The world position is always derived from the
/// grid position, so the two can never disagree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    grid_pos: GridPos,
    size: CellSize,
}

impl Cell {
    pub fn from_grid(grid_pos: GridPos, size: CellSize) -> Self {
        Self { grid_pos, size }
    }

    /// Cell containing `world_pos`. Uses floored division so positions left
    /// of or above the origin land in negative rows/columns.
    pub fn from_world(world_pos: WorldPos, size: CellSize) -> Self {
        let grid_pos = GridPos::new(world_pos.y.div_euclid(size.h), world_pos.x.div_euclid(size.w));
        Self { grid_pos, size }
    }

    pub fn grid_pos(&self) -> GridPos {
        self.grid_pos
    }

    pub fn world_pos(&self) -> WorldPos {
        WorldPos::new(self.grid_pos.col * self.size.w, self.grid_pos.row * self.size.h)
    }

    pub fn size(&self) -> CellSize {
        self.size
    }

    pub fn row(&self) -> i32 {
        self.grid_pos.row
    }

    pub fn col(&self) -> i32 {
        self.grid_pos.col
    }
}

/// Offsets of the 8 connected cells, in NW, N, NE, W, E, SW, S, SE order.
const CONNECTED_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Common interface of bounded and unbounded grids.
pub trait CellGrid {
    fn cell_size(&self) -> CellSize;

    /// Cell at a grid position, `None` when the grid rejects it.
    fn cell(&self, grid_pos: GridPos) -> Option<Cell>;

    /// Cell containing a world position, `None` when the grid rejects it.
    fn cell_from_world(&self, world_pos: WorldPos) -> Option<Cell>;

    /// Up to 8 adjacent cells; never yields a cell the grid would reject.
    fn connected_cells(&self, cell: &Cell) -> Vec<Cell> {
        let origin = cell.grid_pos();
        CONNECTED_OFFSETS
            .iter()
            .filter_map(|&(dr, dc)| self.cell(GridPos::new(origin.row + dr, origin.col + dc)))
            .collect()
    }
}

/// Grid without extent.
#[derive(Clone, Copy, Debug)]
pub struct InfiniteGrid {
    cell_size: CellSize,
}

impl InfiniteGrid {
    pub fn new(cell_size: CellSize) -> Self {
        Self { cell_size }
    }
}

impl CellGrid for InfiniteGrid {
    fn cell_size(&self) -> CellSize {
        self.cell_size
    }

    fn cell(&self, grid_pos: GridPos) -> Option<Cell> {
        Some(Cell::from_grid(grid_pos, self.cell_size))
    }

    fn cell_from_world(&self, world_pos: WorldPos) -> Option<Cell> {
        Some(Cell::from_world(world_pos, self.cell_size))
    }
}

/// Grid of `rows × cols` cells anchored at the world origin.
#[derive(Clone, Copy, Debug)]
pub struct BoundedGrid {
    pub rows: usize,
    pub cols: usize,
    cell_size: CellSize,
}

impl BoundedGrid {
    pub fn new(rows: usize, cols: usize, cell_size: CellSize) -> Self {
        Self { rows, cols, cell_size }
    }

    /// Pixel extent of the whole grid.
    pub fn size(&self) -> CellSize {
        self.cell_size.scaled(self.rows, self.cols)
    }

    pub fn is_in_grid(&self, grid_pos: GridPos) -> bool {
        grid_pos.row >= 0
            && grid_pos.col >= 0
            && (grid_pos.row as usize) < self.rows
            && (grid_pos.col as usize) < self.cols
    }

    /// Flat index `row * cols + col` of an in-bounds position.
    pub fn index(&self, grid_pos: GridPos) -> Option<usize> {
        if self.is_in_grid(grid_pos) {
            Some(grid_pos.row as usize * self.cols + grid_pos.col as usize)
        } else {
            None
        }
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols).map(move |col| Cell::from_grid(GridPos::new(row as i32, col as i32), self.cell_size))
        })
    }
}

impl CellGrid for BoundedGrid {
    fn cell_size(&self) -> CellSize {
        self.cell_size
    }

    fn cell(&self, grid_pos: GridPos) -> Option<Cell> {
        if self.is_in_grid(grid_pos) {
            Some(Cell::from_grid(grid_pos, self.cell_size))
        } else {
            None
        }
    }

    fn cell_from_world(&self, world_pos: WorldPos) -> Option<Cell> {
        let size = self.size();
        if world_pos.x >= 0 && world_pos.x < size.w && world_pos.y >= 0 && world_pos.y < size.h {
            Some(Cell::from_world(world_pos, self.cell_size))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: CellSize = CellSize::new(8, 14);

    #[test]
    fn test_world_pos_derived_from_grid() {
        let cell = Cell::from_grid(GridPos::new(3, 5), SIZE);
        assert_eq!(cell.world_pos(), WorldPos::new(40, 42));
    }

    #[test]
    fn test_cell_from_world_floors_within_cell() {
        let grid = BoundedGrid::new(10, 10, SIZE);
        assert_eq!(grid.cell(GridPos::new(0, 0)).map(|c| c.world_pos()), Some(WorldPos::new(0, 0)));
        assert_eq!(grid.cell_from_world(WorldPos::new(7, 13)).map(|c| c.grid_pos()), Some(GridPos::new(0, 0)));
        assert_eq!(grid.cell_from_world(WorldPos::new(8, 0)).map(|c| c.grid_pos()), Some(GridPos::new(0, 1)));
    }

    #[test]
    fn test_negative_world_positions_use_floored_division() {
        let grid = InfiniteGrid::new(SIZE);
        let cell = grid.cell_from_world(WorldPos::new(-1, -1)).unwrap();
        assert_eq!(cell.grid_pos(), GridPos::new(-1, -1));
        assert_eq!(cell.world_pos(), WorldPos::new(-8, -14));

        let cell = grid.cell_from_world(WorldPos::new(-8, -15)).unwrap();
        assert_eq!(cell.grid_pos(), GridPos::new(-2, -1));
    }

    #[test]
    fn test_cell_from_world_contains_point() {
        let grid = InfiniteGrid::new(SIZE);
        for y in -30..30 {
            for x in -20..20 {
                let p = WorldPos::new(x, y);
                let origin = grid.cell_from_world(p).unwrap().world_pos();
                assert!(origin.x <= p.x && p.x < origin.x + SIZE.w);
                assert!(origin.y <= p.y && p.y < origin.y + SIZE.h);
            }
        }
    }

    #[test]
    fn test_grid_round_trip() {
        let grid = BoundedGrid::new(6, 9, SIZE);
        for cell in grid.cells() {
            let back = grid.cell_from_world(cell.world_pos()).unwrap();
            assert_eq!(back.grid_pos(), cell.grid_pos());
        }
    }

    #[test]
    fn test_bounded_grid_rejects_outside() {
        let grid = BoundedGrid::new(4, 4, SIZE);
        assert!(grid.cell(GridPos::new(4, 0)).is_none());
        assert!(grid.cell(GridPos::new(0, -1)).is_none());
        assert!(grid.cell_from_world(WorldPos::new(-1, 0)).is_none());
        assert!(grid.cell_from_world(WorldPos::new(32, 0)).is_none());
        assert!(grid.cell_from_world(WorldPos::new(31, 55)).is_some());
        assert!(grid.cell_from_world(WorldPos::new(31, 56)).is_none());
    }

    #[test]
    fn test_connected_cells_bounded() {
        let grid = BoundedGrid::new(4, 4, SIZE);
        let corner = grid.cell(GridPos::new(0, 0)).unwrap();
        let edge = grid.cell(GridPos::new(0, 2)).unwrap();
        let inner = grid.cell(GridPos::new(1, 1)).unwrap();

        assert_eq!(grid.connected_cells(&corner).len(), 3);
        assert_eq!(grid.connected_cells(&edge).len(), 5);
        assert_eq!(grid.connected_cells(&inner).len(), 8);

        for cell in grid.cells() {
            for n in grid.connected_cells(&cell) {
                assert!(grid.is_in_grid(n.grid_pos()));
            }
        }
    }

    #[test]
    fn test_connected_cells_unbounded_always_eight() {
        let grid = InfiniteGrid::new(SIZE);
        let cell = grid.cell(GridPos::new(0, 0)).unwrap();
        let neighbours: Vec<GridPos> = grid.connected_cells(&cell).iter().map(|c| c.grid_pos()).collect();
        assert_eq!(neighbours.len(), 8);
        assert_eq!(neighbours[0], GridPos::new(-1, -1));
        assert_eq!(neighbours[7], GridPos::new(1, 1));
    }
}
