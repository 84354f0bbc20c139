use crate::grid::GridPos;

/// A dense 2D grid stored row-major (`row * cols + col`). Edges do not wrap.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub rows: usize,
    pub cols: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::default(); rows * cols],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Index into the backing array. Callers must pass in-range coordinates.
    pub fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row * self.cols + col
    }

    pub fn get(&self, row: usize, col: usize) -> &T {
        &self.data[self.index(row, col)]
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        let idx = self.index(row, col);
        &mut self.data[idx]
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        let idx = self.index(row, col);
        self.data[idx] = value;
    }

    /// Checked lookup by grid position; `None` outside the map.
    pub fn get_at(&self, pos: GridPos) -> Option<&T> {
        if self.contains(pos) {
            Some(self.get(pos.row as usize, pos.col as usize))
        } else {
            None
        }
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.row >= 0 && pos.col >= 0 && (pos.row as usize) < self.rows && (pos.col as usize) < self.cols
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw row-major slice, used for byte-level comparisons.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// 8-connected neighbours clipped to the map, in NW, N, NE, W, E, SW, S, SE order.
    pub fn neighbors_8(&self, row: usize, col: usize) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(8);

        for dr in -1i64..=1 {
            for dc in -1i64..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }

                let nr = row as i64 + dr;
                let nc = col as i64 + dc;
                if nr >= 0 && nc >= 0 && (nr as usize) < self.rows && (nc as usize) < self.cols {
                    result.push((nr as usize, nc as usize));
                }
            }
        }

        result
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let cols = self.cols;
        self.data.iter().enumerate().map(move |(idx, val)| (idx / cols, idx % cols, val))
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let cols = self.cols;
        self.data.iter_mut().enumerate().map(move |(idx, val)| (idx / cols, idx % cols, val))
    }
}

impl Tilemap<f32> {
    /// Minimum and maximum sample, `(f32::MAX, f32::MIN)` for an empty map.
    pub fn min_max(&self) -> (f32, f32) {
        let mut min_h = f32::MAX;
        let mut max_h = f32::MIN;
        for &h in &self.data {
            if h < min_h { min_h = h; }
            if h > max_h { max_h = h; }
        }
        (min_h, max_h)
    }
}
