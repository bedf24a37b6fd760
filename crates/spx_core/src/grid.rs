//! Court grid and flat cell indexing
//!
//! Every flattened spatial array in this crate uses the same convention:
//!
//! - `flat = row * cols + col`, with rows iterated outer and columns inner
//! - rows follow `y_edges` (court length direction), columns follow `x_edges`
//! - a cell's center is the midpoint of its bounding edges
//!
//! The aggregation, contribution and render layers all consume arrays laid
//! out this way; a consumer that iterates in any other order draws values at
//! the wrong court locations without any error being raised, so the helpers
//! here are the only sanctioned way to go between (row, col), flat indices
//! and court coordinates.

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};

/// Default NBA half-court binning: 17 columns across the width,
/// 16 rows from baseline to past half court, in tenths of feet.
pub const NBA_X_BINS: usize = 17;
pub const NBA_Y_BINS: usize = 16;
pub const NBA_X_RANGE: (f32, f32) = (-250.0, 250.0);
pub const NBA_Y_RANGE: (f32, f32) = (-47.5, 422.5);

/// Spatial binning of the court.
///
/// `x_edges` has `cols + 1` entries, `y_edges` has `rows + 1`, both strictly
/// increasing. Constructed once per initialization payload and treated as
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourtGrid {
    x_edges: Vec<f32>,
    y_edges: Vec<f32>,
}

impl CourtGrid {
    /// Build a grid from explicit bin edges.
    ///
    /// Rejects axes with fewer than two edges or non-increasing edges;
    /// callers treat that as "metadata not ready" and render nothing.
    pub fn new(x_edges: Vec<f32>, y_edges: Vec<f32>) -> Result<Self> {
        for (name, edges) in [("x", &x_edges), ("y", &y_edges)] {
            if edges.len() < 2 {
                return Err(ExplorerError::InvalidGrid(format!(
                    "{name}_edges needs at least 2 entries, got {}",
                    edges.len()
                )));
            }
            if edges.windows(2).any(|w| w[1] <= w[0]) {
                return Err(ExplorerError::InvalidGrid(format!(
                    "{name}_edges must be strictly increasing"
                )));
            }
        }
        Ok(Self { x_edges, y_edges })
    }

    /// Evenly spaced default grid over the NBA half court.
    pub fn nba_default() -> Self {
        Self {
            x_edges: linspace(NBA_X_RANGE.0, NBA_X_RANGE.1, NBA_X_BINS + 1),
            y_edges: linspace(NBA_Y_RANGE.0, NBA_Y_RANGE.1, NBA_Y_BINS + 1),
        }
    }

    pub fn x_edges(&self) -> &[f32] {
        &self.x_edges
    }

    pub fn y_edges(&self) -> &[f32] {
        &self.y_edges
    }

    /// Number of columns (x-direction bins).
    pub fn cols(&self) -> usize {
        self.x_edges.len() - 1
    }

    /// Number of rows (y-direction bins).
    pub fn rows(&self) -> usize {
        self.y_edges.len() - 1
    }

    /// Total cell count; the length every flattened spatial array must have.
    pub fn cell_count(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Flatten (row, col) to a cell index: `row * cols + col`.
    #[inline]
    pub fn cell_index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows() && col < self.cols());
        row * self.cols() + col
    }

    /// Invert [`cell_index`](Self::cell_index) back to (row, col).
    #[inline]
    pub fn cell_rc(&self, index: usize) -> (usize, usize) {
        debug_assert!(index < self.cell_count());
        (index / self.cols(), index % self.cols())
    }

    /// Center of the cell at (row, col): midpoint of its bounding edges.
    #[inline]
    pub fn cell_center(&self, row: usize, col: usize) -> (f32, f32) {
        (
            (self.x_edges[col] + self.x_edges[col + 1]) / 2.0,
            (self.y_edges[row] + self.y_edges[row + 1]) / 2.0,
        )
    }

    /// Center of the cell at a flat index.
    #[inline]
    pub fn center_of(&self, index: usize) -> (f32, f32) {
        let (row, col) = self.cell_rc(index);
        self.cell_center(row, col)
    }

    /// Map a court location to its flat cell index.
    ///
    /// Half-open bins: `edges[i] <= v < edges[i + 1]`. Locations outside the
    /// grid (including exactly on the upper-most edge) return `None` and are
    /// dropped by callers, matching how shots outside the binned court are
    /// discarded during session building.
    pub fn locate(&self, x: f32, y: f32) -> Option<usize> {
        let col = bin_of(&self.x_edges, x)?;
        let row = bin_of(&self.y_edges, y)?;
        Some(self.cell_index(row, col))
    }

    /// Diagonal of the first cell, used as the reference mark extent for
    /// fixed-max size scaling. Grids here are evenly spaced, so any cell
    /// would do.
    pub fn cell_diagonal(&self) -> f32 {
        let w = self.x_edges[1] - self.x_edges[0];
        let h = self.y_edges[1] - self.y_edges[0];
        (w * w + h * h).sqrt()
    }

    /// Cell centers in flat-index order (rows outer, columns inner).
    pub fn iter_centers(&self) -> impl Iterator<Item = (usize, (f32, f32))> + '_ {
        (0..self.rows()).flat_map(move |row| {
            (0..self.cols()).map(move |col| (self.cell_index(row, col), self.cell_center(row, col)))
        })
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f32, end: f32, n: usize) -> Vec<f32> {
    debug_assert!(n >= 2);
    let step = (end - start) / (n - 1) as f32;
    (0..n)
        .map(|i| if i == n - 1 { end } else { start + step * i as f32 })
        .collect()
}

/// Index `i` with `edges[i] <= v < edges[i + 1]`, or `None` outside.
fn bin_of(edges: &[f32], v: f32) -> Option<usize> {
    if v < edges[0] || v >= edges[edges.len() - 1] {
        return None;
    }
    let i = edges.partition_point(|e| *e <= v);
    Some(i - 1)
}
