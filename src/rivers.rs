//! River carving
//!
//! Each mountain group sheds one river from its highest cell. The river walks
//! downhill toward the map edge of the quadrant the peak sits in, turning every
//! visited cell into water and moving it into a fresh River group.

use tracing::{debug, trace};

use crate::grid::{BoundedGrid, Cell, CellGrid, GridPos};
use crate::groups::{GroupKind, GroupMap};
use crate::terrain::Terrain;
use crate::tilemap::Tilemap;

/// Map quadrant of a peak, by world position against half the map size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Quadrant {
    pub fn of(cell: &Cell, grid: &BoundedGrid) -> Quadrant {
        let size = grid.size();
        let pos = cell.world_pos();
        let west = pos.x <= size.w / 2;
        let north = pos.y <= size.h / 2;
        match (north, west) {
            (true, true) => Quadrant::NorthWest,
            (true, false) => Quadrant::NorthEast,
            (false, true) => Quadrant::SouthWest,
            (false, false) => Quadrant::SouthEast,
        }
    }

    fn flows_west(self) -> bool {
        matches!(self, Quadrant::NorthWest | Quadrant::SouthWest)
    }

    fn flows_north(self) -> bool {
        matches!(self, Quadrant::NorthWest | Quadrant::NorthEast)
    }

    /// First river cell: the peak's neighbour on the same row, on the outer side.
    pub fn is_start(self, candidate: GridPos, peak: GridPos) -> bool {
        candidate.row == peak.row
            && if self.flows_west() { candidate.col < peak.col } else { candidate.col > peak.col }
    }

    /// Later river cells never move back toward the interior on either axis.
    pub fn continues(self, candidate: GridPos, current: GridPos) -> bool {
        let vertical = if self.flows_north() {
            candidate.row <= current.row
        } else {
            candidate.row >= current.row
        };
        let horizontal = if self.flows_west() {
            candidate.col <= current.col
        } else {
            candidate.col >= current.col
        };
        vertical && horizontal
    }
}

/// One carved river.
#[derive(Clone, Debug)]
pub struct RiverPath {
    pub peak: GridPos,
    pub quadrant: Quadrant,
    /// Cells turned into water, in carving order.
    pub cells: Vec<GridPos>,
}

/// Carve one river per mountain group, updating terrain and group membership.
///
/// Groups emptied by the carve are dropped afterwards, so group ids are dense
/// again when this returns.
pub fn carve_rivers(
    grid: &BoundedGrid,
    heightmap: &Tilemap<f32>,
    terrain: &mut Tilemap<Terrain>,
    groups: &mut GroupMap,
) -> Vec<RiverPath> {
    let mountains: Vec<_> = groups
        .iter()
        .filter(|g| g.kind == GroupKind::Mountain)
        .map(|g| g.id)
        .collect();

    let mut rivers = Vec::with_capacity(mountains.len());

    for mountain in mountains {
        let Some(peak) = groups.get(mountain).and_then(|g| highest_cell(g.cells(), heightmap)) else {
            continue;
        };
        let Some(peak_cell) = grid.cell(peak) else {
            continue;
        };

        let quadrant = Quadrant::of(&peak_cell, grid);
        let start = grid
            .connected_cells(&peak_cell)
            .into_iter()
            .find(|c| quadrant.is_start(c.grid_pos(), peak))
            .unwrap_or(peak_cell);

        let cells = carve_river(grid, heightmap, terrain, groups, start, quadrant);
        trace!(?peak, ?quadrant, length = cells.len(), "carved river");

        if !cells.is_empty() {
            rivers.push(RiverPath { peak, quadrant, cells });
        }
    }

    let dropped = groups.remove_empty();
    debug!(rivers = rivers.len(), dropped_groups = dropped, "river carving done");
    rivers
}

/// Walk from `start`, carving until water is reached or no cell qualifies.
///
/// Every accepted step moves at least one axis strictly outward and neither
/// axis inward, so the walk cannot revisit a cell and ends within `rows + cols` steps.
fn carve_river(
    grid: &BoundedGrid,
    heightmap: &Tilemap<f32>,
    terrain: &mut Tilemap<Terrain>,
    groups: &mut GroupMap,
    start: Cell,
    quadrant: Quadrant,
) -> Vec<GridPos> {
    let river = groups.push_group(GroupKind::River);
    let mut path = Vec::new();
    let mut current = start;

    loop {
        let pos = current.grid_pos();
        let (row, col) = (pos.row as usize, pos.col as usize);
        if terrain.get(row, col).is_water() {
            break;
        }

        terrain.set(row, col, Terrain::Water);
        groups.reassign(pos, river);
        path.push(pos);

        let next = grid
            .connected_cells(&current)
            .into_iter()
            .filter(|c| quadrant.continues(c.grid_pos(), pos))
            .filter(|c| groups.owner(c.grid_pos()) != Some(river))
            .min_by(|a, b| height_at(heightmap, a.grid_pos()).total_cmp(&height_at(heightmap, b.grid_pos())));

        match next {
            Some(cell) => current = cell,
            None => break,
        }
    }

    path
}

/// Highest member cell; ties keep the first cell in row-major order.
fn highest_cell(cells: impl Iterator<Item = GridPos>, heightmap: &Tilemap<f32>) -> Option<GridPos> {
    let mut best: Option<(GridPos, f32)> = None;
    for pos in cells {
        let h = height_at(heightmap, pos);
        match best {
            Some((_, best_h)) if h <= best_h => {}
            _ => best = Some((pos, h)),
        }
    }
    best.map(|(pos, _)| pos)
}

fn height_at(heightmap: &Tilemap<f32>, pos: GridPos) -> f32 {
    *heightmap.get(pos.row as usize, pos.col as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellSize;
    use crate::groups::{classify_water_groups, group_terrain};
    use crate::heightmap::classify_heightmap;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const SIZE: CellSize = CellSize::new(8, 14);

    struct Fixture {
        grid: BoundedGrid,
        heightmap: Tilemap<f32>,
        terrain: Tilemap<Terrain>,
        groups: GroupMap,
    }

    fn fixture(heightmap: Tilemap<f32>) -> Fixture {
        let grid = BoundedGrid::new(heightmap.rows, heightmap.cols, SIZE);
        let terrain = classify_heightmap(&heightmap);
        let mut groups = group_terrain(&terrain);
        classify_water_groups(&mut groups);
        Fixture { grid, heightmap, terrain, groups }
    }

    /// Island whose height rises linearly toward (peak_row, peak_col).
    fn cone(rows: usize, cols: usize, peak_row: usize, peak_col: usize) -> Tilemap<f32> {
        let mut heightmap = Tilemap::new_with(rows, cols, 0.0f32);
        for row in 0..rows {
            for col in 0..cols {
                let d = (row as f32 - peak_row as f32).abs().max((col as f32 - peak_col as f32).abs());
                heightmap.set(row, col, (90.0 - d * 12.0).max(0.0));
            }
        }
        heightmap
    }

    #[test]
    fn test_quadrants() {
        let grid = BoundedGrid::new(10, 10, SIZE);
        let cell = |r, c| grid.cell(GridPos::new(r, c)).unwrap();
        assert_eq!(Quadrant::of(&cell(1, 1), &grid), Quadrant::NorthWest);
        assert_eq!(Quadrant::of(&cell(1, 8), &grid), Quadrant::NorthEast);
        assert_eq!(Quadrant::of(&cell(8, 1), &grid), Quadrant::SouthWest);
        assert_eq!(Quadrant::of(&cell(8, 8), &grid), Quadrant::SouthEast);
        assert_eq!(Quadrant::of(&cell(5, 5), &grid), Quadrant::NorthWest);
    }

    #[test]
    fn test_predicates_point_outward() {
        let peak = GridPos::new(5, 5);
        assert!(Quadrant::NorthWest.is_start(GridPos::new(5, 4), peak));
        assert!(!Quadrant::NorthWest.is_start(GridPos::new(5, 6), peak));
        assert!(!Quadrant::NorthWest.is_start(GridPos::new(4, 4), peak));
        assert!(Quadrant::SouthEast.is_start(GridPos::new(5, 6), peak));

        assert!(Quadrant::NorthEast.continues(GridPos::new(4, 6), peak));
        assert!(Quadrant::NorthEast.continues(GridPos::new(5, 6), peak));
        assert!(!Quadrant::NorthEast.continues(GridPos::new(6, 6), peak));
        assert!(!Quadrant::NorthEast.continues(GridPos::new(4, 4), peak));
        assert!(Quadrant::SouthWest.continues(GridPos::new(6, 4), peak));
    }

    #[test]
    fn test_river_carves_outward_and_keeps_partition() {
        let mut f = fixture(cone(12, 12, 3, 3));
        let rivers = carve_rivers(&f.grid, &f.heightmap, &mut f.terrain, &mut f.groups);

        assert_eq!(rivers.len(), 1);
        let river = &rivers[0];
        assert_eq!(river.peak, GridPos::new(3, 3));
        assert_eq!(river.quadrant, Quadrant::NorthWest);
        assert_eq!(river.cells[0], GridPos::new(3, 2));

        for pos in &river.cells {
            assert_eq!(*f.terrain.get(pos.row as usize, pos.col as usize), Terrain::Water);
            assert_eq!(f.groups.group_at(*pos).map(|g| g.kind), Some(GroupKind::River));
        }
        f.groups.check_partition().unwrap();
        assert_eq!(f.groups.count_kind(GroupKind::River), 1);
        assert_eq!(f.groups.count_kind(GroupKind::Ocean), 1);
    }

    #[test]
    fn test_river_is_connected_and_monotone() {
        let mut f = fixture(cone(16, 16, 11, 12));
        let rivers = carve_rivers(&f.grid, &f.heightmap, &mut f.terrain, &mut f.groups);
        let river = &rivers[0];
        assert_eq!(river.quadrant, Quadrant::SouthEast);

        for pair in river.cells.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!((a.row - b.row).abs() <= 1 && (a.col - b.col).abs() <= 1);
            assert!(b.row >= a.row && b.col >= a.col);
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_river_never_reenters_own_cells() {
        let mut f = fixture(cone(14, 14, 4, 9));
        let rivers = carve_rivers(&f.grid, &f.heightmap, &mut f.terrain, &mut f.groups);
        for river in &rivers {
            let mut seen = std::collections::HashSet::new();
            for pos in &river.cells {
                assert!(seen.insert(*pos), "river revisited {:?}", pos);
            }
        }
    }

    #[test]
    fn test_flat_mountain_terminates() {
        let heightmap = Tilemap::new_with(20, 20, 80.0f32);
        let mut f = fixture(heightmap);
        assert_eq!(f.groups.count_kind(GroupKind::Mountain), 1);

        let rivers = carve_rivers(&f.grid, &f.heightmap, &mut f.terrain, &mut f.groups);
        assert_eq!(rivers.len(), 1);
        assert!(rivers[0].cells.len() <= 40);
        f.groups.check_partition().unwrap();
    }

    #[test]
    fn test_random_heightmaps_keep_partition() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5EED);
        for _ in 0..20 {
            let mut heightmap = Tilemap::new_with(18, 23, 0.0f32);
            for (_, _, h) in heightmap.iter_mut() {
                *h = rng.gen_range(0.0..100.0);
            }
            let mut f = fixture(heightmap);
            let mountains = f.groups.count_kind(GroupKind::Mountain);
            let rivers = carve_rivers(&f.grid, &f.heightmap, &mut f.terrain, &mut f.groups);

            assert!(rivers.len() <= mountains);
            f.groups.check_partition().unwrap();
            for group in f.groups.iter() {
                for pos in group.cells() {
                    assert_eq!(
                        group.kind.terrain(),
                        *f.terrain.get(pos.row as usize, pos.col as usize)
                    );
                }
            }
        }
    }

    #[test]
    fn test_single_cell_mountain_is_removed_when_carved() {
        let mut heightmap = Tilemap::new_with(5, 5, 30.0f32);
        heightmap.set(2, 0, 70.0);
        let mut f = fixture(heightmap);
        let rivers = carve_rivers(&f.grid, &f.heightmap, &mut f.terrain, &mut f.groups);

        // No western neighbour at column 0, so the peak itself is carved.
        assert_eq!(rivers[0].cells[0], GridPos::new(2, 0));
        assert_eq!(f.groups.count_kind(GroupKind::Mountain), 0);
        f.groups.check_partition().unwrap();
    }
}
