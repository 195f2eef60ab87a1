//! Spatial grid
//!
//! A row-major matrix of non-negative scalars covering the document at a fixed
//! cell resolution. Resizing keeps the top-left anchored overlap.

use serde::{Deserialize, Serialize};

/// Heat values over the document surface
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpatialGrid {
    cell_size: f64,
    rows: usize,
    cols: usize,
    cells: Vec<f32>,
}

/// Grid dimensions for a document size
pub fn grid_dimensions(cell_size: f64, document_width: f64, document_height: f64) -> (usize, usize) {
    let rows = (document_height.max(0.0) / cell_size).ceil() as usize;
    let cols = (document_width.max(0.0) / cell_size).ceil() as usize;
    (rows, cols)
}

impl SpatialGrid {
    /// Allocate a zeroed grid sized to the document
    pub fn new(cell_size: f64, document_width: f64, document_height: f64) -> Self {
        let (rows, cols) = grid_dimensions(cell_size, document_width, document_height);
        Self {
            cell_size,
            rows,
            cols,
            cells: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// True until the first allocation
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.cells[row * self.cols + col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col] = value.max(0.0);
        }
    }

    /// Raise a cell to `value` if it is currently lower
    pub fn raise(&mut self, row: usize, col: usize, value: f32) {
        if row < self.rows && col < self.cols {
            let cell = &mut self.cells[row * self.cols + col];
            if value > *cell {
                *cell = value;
            }
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.cells
    }

    pub fn fill_zero(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = 0.0);
    }

    /// Match the grid to a new document size.
    ///
    /// Returns `true` when the dimensions changed. The overlapping top-left
    /// region is copied, new cells are zero and out-of-bounds content is lost.
    pub fn resize(&mut self, document_width: f64, document_height: f64) -> bool {
        let (rows, cols) = grid_dimensions(self.cell_size, document_width, document_height);
        if rows == self.rows && cols == self.cols {
            return false;
        }

        let mut cells = vec![0.0; rows * cols];
        let keep_rows = rows.min(self.rows);
        let keep_cols = cols.min(self.cols);
        for row in 0..keep_rows {
            let old_start = row * self.cols;
            let new_start = row * cols;
            cells[new_start..new_start + keep_cols]
                .copy_from_slice(&self.cells[old_start..old_start + keep_cols]);
        }

        self.rows = rows;
        self.cols = cols;
        self.cells = cells;
        true
    }

    /// Largest value and the number of non-zero cells
    pub fn summary(&self) -> GridSummary {
        let peak = self.cells.iter().copied().fold(0.0_f32, f32::max);
        let active_cells = self.cells.iter().filter(|&&c| c > 0.0).count();
        GridSummary {
            rows: self.rows,
            cols: self.cols,
            cell_size: self.cell_size,
            peak,
            active_cells,
        }
    }
}

/// Compact description of a grid for reports
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSummary {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: f64,
    pub peak: f32,
    pub active_cells: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_round_up() {
        let grid = SpatialGrid::new(15.0, 2000.0, 4000.0);
        assert_eq!(grid.cols(), 134);
        assert_eq!(grid.rows(), 267);
        assert!(grid.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_resize_grow_preserves_overlap() {
        let mut grid = SpatialGrid::new(10.0, 30.0, 20.0);
        grid.set(0, 0, 1.0);
        grid.set(1, 2, 2.0);

        assert!(grid.resize(50.0, 40.0));
        assert_eq!((grid.rows(), grid.cols()), (4, 5));
        assert_eq!(grid.get(0, 0), Some(1.0));
        assert_eq!(grid.get(1, 2), Some(2.0));
        assert_eq!(grid.get(1, 4), Some(0.0));
        assert_eq!(grid.get(3, 0), Some(0.0));
        assert_eq!(grid.values().iter().filter(|&&v| v != 0.0).count(), 2);
    }

    #[test]
    fn test_resize_shrink_discards_outside() {
        let mut grid = SpatialGrid::new(10.0, 50.0, 50.0);
        grid.set(0, 1, 3.0);
        grid.set(4, 4, 9.0);

        assert!(grid.resize(20.0, 20.0));
        assert_eq!((grid.rows(), grid.cols()), (2, 2));
        assert_eq!(grid.get(0, 1), Some(3.0));
        assert_eq!(grid.get(4, 4), None);
    }

    #[test]
    fn test_resize_same_size_is_noop() {
        let mut grid = SpatialGrid::new(15.0, 100.0, 100.0);
        grid.set(2, 2, 1.5);
        assert!(!grid.resize(99.0, 91.0));
        assert_eq!(grid.get(2, 2), Some(1.5));
    }

    #[test]
    fn test_raise_keeps_max() {
        let mut grid = SpatialGrid::new(10.0, 10.0, 10.0);
        grid.raise(0, 0, 4.0);
        grid.raise(0, 0, 3.0);
        assert_eq!(grid.get(0, 0), Some(4.0));
    }
}
