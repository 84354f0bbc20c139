//! Region grouping and water classification
//!
//! Partitions the terrain grid into maximal 8-connected groups of equal terrain,
//! then separates the one ocean from the inland seas. Every cell ends up in
//! exactly one group; the owner index keeps that lookup O(1).

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::error::InvariantViolation;
use crate::grid::GridPos;
use crate::terrain::Terrain;
use crate::tilemap::Tilemap;

/// Group identifier, equal to the group's position in the `GroupMap`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupId(pub u32);

impl GroupId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Category of a group. Water groups are refined into Ocean, Sea or River.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum GroupKind {
    Water,
    Ocean,
    Sea,
    River,
    Sand,
    Grass,
    Dirt,
    Hill,
    Mountain,
}

impl GroupKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            GroupKind::Water => "Water",
            GroupKind::Ocean => "Ocean",
            GroupKind::Sea => "Sea",
            GroupKind::River => "River",
            GroupKind::Sand => "Sand",
            GroupKind::Grass => "Grass",
            GroupKind::Dirt => "Dirt",
            GroupKind::Hill => "Hill",
            GroupKind::Mountain => "Mountain",
        }
    }

    pub fn is_water(&self) -> bool {
        matches!(self, GroupKind::Water | GroupKind::Ocean | GroupKind::Sea | GroupKind::River)
    }

    /// Terrain byte every member cell carries.
    pub fn terrain(&self) -> Terrain {
        match self {
            GroupKind::Water | GroupKind::Ocean | GroupKind::Sea | GroupKind::River => Terrain::Water,
            GroupKind::Sand => Terrain::Sand,
            GroupKind::Grass => Terrain::Grass,
            GroupKind::Dirt => Terrain::Dirt,
            GroupKind::Hill => Terrain::Hill,
            GroupKind::Mountain => Terrain::Mountain,
        }
    }
}

impl From<Terrain> for GroupKind {
    fn from(terrain: Terrain) -> Self {
        match terrain {
            Terrain::Water => GroupKind::Water,
            Terrain::Sand => GroupKind::Sand,
            Terrain::Grass => GroupKind::Grass,
            Terrain::Dirt => GroupKind::Dirt,
            Terrain::Hill => GroupKind::Hill,
            Terrain::Mountain => GroupKind::Mountain,
        }
    }
}

/// A connected set of cells sharing one category.
#[derive(Clone, Debug)]
pub struct Group {
    pub id: GroupId,
    pub kind: GroupKind,
    pub name: String,
    cells: BTreeSet<GridPos>,
}

impl Group {
    fn new(id: GroupId, kind: GroupKind) -> Self {
        Self {
            id,
            kind,
            name: kind.display_name().to_string(),
            cells: BTreeSet::new(),
        }
    }

    fn relabel(&mut self, kind: GroupKind) {
        self.kind = kind;
        self.name = kind.display_name().to_string();
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.cells.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Member cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.cells.iter().copied()
    }

    /// Bounding box `(min_row, min_col, max_row, max_col)`, `None` when empty.
    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        let first = self.cells.iter().next()?;
        let mut bounds = (first.row, first.col, first.row, first.col);
        for pos in &self.cells {
            bounds.0 = bounds.0.min(pos.row);
            bounds.1 = bounds.1.min(pos.col);
            bounds.2 = bounds.2.max(pos.row);
            bounds.3 = bounds.3.max(pos.col);
        }
        Some(bounds)
    }
}

/// Ordered list of groups plus a per-cell owner index.
#[derive(Clone, Debug)]
pub struct GroupMap {
    groups: Vec<Group>,
    owner: Tilemap<Option<GroupId>>,
}

impl GroupMap {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            groups: Vec::new(),
            owner: Tilemap::new_with(rows, cols, None),
        }
    }

    /// Start a new, empty group and return its id.
    pub fn push_group(&mut self, kind: GroupKind) -> GroupId {
        let id = GroupId(self.groups.len() as u32);
        self.groups.push(Group::new(id, kind));
        id
    }

    /// Give an ungrouped cell to `id`. Returns false if the cell already has an owner.
    pub fn assign(&mut self, pos: GridPos, id: GroupId) -> bool {
        if self.owner(pos).is_some() {
            return false;
        }
        self.owner.set(pos.row as usize, pos.col as usize, Some(id));
        self.groups[id.index()].cells.insert(pos);
        true
    }

    /// Move a cell to `id`, removing it from its previous owner first.
    pub fn reassign(&mut self, pos: GridPos, id: GroupId) {
        if let Some(previous) = self.owner(pos) {
            self.groups[previous.index()].cells.remove(&pos);
        }
        self.owner.set(pos.row as usize, pos.col as usize, Some(id));
        self.groups[id.index()].cells.insert(pos);
    }

    pub fn owner(&self, pos: GridPos) -> Option<GroupId> {
        self.owner.get_at(pos).copied().flatten()
    }

    pub fn is_grouped(&self, pos: GridPos) -> bool {
        self.owner(pos).is_some()
    }

    pub fn get(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.index())
    }

    pub fn group_at(&self, pos: GridPos) -> Option<&Group> {
        self.owner(pos).and_then(|id| self.get(id))
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn count_kind(&self, kind: GroupKind) -> usize {
        self.groups.iter().filter(|g| g.kind == kind).count()
    }

    /// Drop groups left without members and renumber the rest densely.
    pub fn remove_empty(&mut self) -> usize {
        let before = self.groups.len();
        self.groups.retain(|g| !g.is_empty());
        let removed = before - self.groups.len();
        if removed == 0 {
            return 0;
        }

        for (index, group) in self.groups.iter_mut().enumerate() {
            group.id = GroupId(index as u32);
        }
        self.owner.fill(None);
        for group in &self.groups {
            for pos in &group.cells {
                self.owner.set(pos.row as usize, pos.col as usize, Some(group.id));
            }
        }
        removed
    }

    /// Verify the groups partition the whole grid and agree with the owner index.
    pub fn check_partition(&self) -> Result<(), InvariantViolation> {
        let mut claimed: Tilemap<Option<GroupId>> = Tilemap::new_with(self.owner.rows, self.owner.cols, None);

        for (index, group) in self.groups.iter().enumerate() {
            if group.id.index() != index {
                return Err(InvariantViolation::IdMismatch { index, id: group.id });
            }
            if group.is_empty() {
                return Err(InvariantViolation::EmptyGroup(group.id));
            }
            for pos in group.cells() {
                let slot = claimed.get_mut(pos.row as usize, pos.col as usize);
                if let Some(first) = *slot {
                    return Err(InvariantViolation::CellClaimedTwice { pos, first, second: group.id });
                }
                *slot = Some(group.id);

                let indexed = self.owner(pos);
                if indexed != Some(group.id) {
                    return Err(InvariantViolation::OwnerMismatch { pos, indexed, actual: group.id });
                }
            }
        }

        for (row, col, slot) in claimed.iter() {
            if slot.is_none() {
                return Err(InvariantViolation::CellUngrouped(GridPos::new(row as i32, col as i32)));
            }
        }

        Ok(())
    }
}

/// Flood-fill the terrain grid into groups, scanning row-major.
///
/// Uses an explicit stack so large regions cannot overflow the call stack.
pub fn group_terrain(terrain: &Tilemap<Terrain>) -> GroupMap {
    let mut groups = GroupMap::new(terrain.rows, terrain.cols);
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for row in 0..terrain.rows {
        for col in 0..terrain.cols {
            if groups.is_grouped(GridPos::new(row as i32, col as i32)) {
                continue;
            }

            let seed_terrain = *terrain.get(row, col);
            let id = groups.push_group(GroupKind::from(seed_terrain));

            stack.push((row, col));
            while let Some((r, c)) = stack.pop() {
                if !groups.assign(GridPos::new(r as i32, c as i32), id) {
                    continue;
                }

                for (nr, nc) in terrain.neighbors_8(r, c) {
                    if *terrain.get(nr, nc) == seed_terrain && !groups.is_grouped(GridPos::new(nr as i32, nc as i32)) {
                        stack.push((nr, nc));
                    }
                }
            }
        }
    }

    debug!(groups = groups.len(), "grouped terrain");
    groups
}

/// Relabel water groups: one Ocean, every other water group a Sea.
///
/// The Ocean is the water group owning cell (0,0). The edge falloff makes that
/// the normal case; if (0,0) is land the first water group in scan order is used.
pub fn classify_water_groups(groups: &mut GroupMap) {
    let corner_owner = groups
        .group_at(GridPos::new(0, 0))
        .filter(|g| g.kind == GroupKind::Water)
        .map(|g| g.id);
    let ocean = corner_owner.or_else(|| {
        groups.iter().find(|g| g.kind == GroupKind::Water).map(|g| g.id)
    });

    for group in groups.groups.iter_mut() {
        if group.kind != GroupKind::Water {
            continue;
        }
        if Some(group.id) == ocean {
            group.relabel(GroupKind::Ocean);
        } else {
            group.relabel(GroupKind::Sea);
        }
    }
}
