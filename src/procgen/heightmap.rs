//! Heightmap grid backing a terrain patch

/// Grid of elevations, one per lattice point
#[derive(Debug, Clone, PartialEq)]
pub struct Heightmap {
    /// Lattice points across the road
    pub columns: usize,
    /// Lattice points along the road
    pub rows: usize,
    /// Flattened height values (row-major order: heights[y * columns + x])
    pub heights: Vec<f32>,
}

impl Heightmap {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            heights: vec![0.0; columns * rows],
        }
    }

    /// Get height at grid coordinates (zero outside the grid)
    pub fn get(&self, x: usize, y: usize) -> f32 {
        if x >= self.columns || y >= self.rows {
            return 0.0;
        }
        self.heights[y * self.columns + x]
    }

    pub fn set(&mut self, x: usize, y: usize, height: f32) {
        if x < self.columns && y < self.rows {
            self.heights[y * self.columns + x] = height;
        }
    }

    /// Iterate `(x, y, height)` over every lattice point
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        self.heights
            .iter()
            .enumerate()
            .map(move |(i, &h)| (i % self.columns, i / self.columns, h))
    }
}
