//! Time × cell tensors fetched from the analysis backend
//!
//! Tensors arrive over the wire as nested arrays (`[time][cell]`, or
//! `[time][cell][channel]` for the per-channel contribution variant) and are
//! validated into a dense row-major layout here. Cell order follows the grid
//! convention in [`crate::grid`].

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};
use crate::models::channel::TimeSelector;

/// Dense `[time][cell]` tensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeCellTensor {
    time_bins: usize,
    cells: usize,
    values: Vec<f32>,
}

impl TimeCellTensor {
    /// Validate a wire-shaped `[time][cell]` payload.
    ///
    /// Every time slice must have `expected_cells` entries; ragged or
    /// mis-sized payloads are rejected so they never reach the renderer.
    pub fn from_rows(rows: Vec<Vec<f32>>, expected_cells: usize) -> Result<Self> {
        let time_bins = rows.len();
        let mut values = Vec::with_capacity(time_bins * expected_cells);
        for row in &rows {
            if row.len() != expected_cells {
                return Err(ExplorerError::ShapeMismatch {
                    expected: expected_cells,
                    found: row.len(),
                });
            }
            values.extend_from_slice(row);
        }
        Ok(Self { time_bins, cells: expected_cells, values })
    }

    /// Validate and fold a per-channel `[time][cell][channel]` payload by
    /// summing the channel axis.
    pub fn from_channel_rows(rows: Vec<Vec<Vec<f32>>>, expected_cells: usize) -> Result<Self> {
        let time_bins = rows.len();
        let mut values = Vec::with_capacity(time_bins * expected_cells);
        for row in &rows {
            if row.len() != expected_cells {
                return Err(ExplorerError::ShapeMismatch {
                    expected: expected_cells,
                    found: row.len(),
                });
            }
            for channels in row {
                values.push(channels.iter().sum());
            }
        }
        Ok(Self { time_bins, cells: expected_cells, values })
    }

    pub fn time_bins(&self) -> usize {
        self.time_bins
    }

    pub fn cells(&self) -> usize {
        self.cells
    }

    /// One time slice, `cells` long.
    pub fn slice(&self, time_bin: usize) -> Result<&[f32]> {
        if time_bin >= self.time_bins {
            return Err(ExplorerError::TimeBinOutOfRange { bin: time_bin, bins: self.time_bins });
        }
        let start = time_bin * self.cells;
        Ok(&self.values[start..start + self.cells])
    }

    /// Reduce over the time axis: `All` sums slices elementwise, `Bin(i)`
    /// copies that slice. Pure client-side; never triggers a refetch.
    pub fn reduce(&self, selector: TimeSelector) -> Result<Vec<f32>> {
        match selector {
            TimeSelector::Bin(i) => Ok(self.slice(i)?.to_vec()),
            TimeSelector::All => {
                let mut out = vec![0.0f32; self.cells];
                for t in 0..self.time_bins {
                    let start = t * self.cells;
                    for (acc, v) in out.iter_mut().zip(&self.values[start..start + self.cells]) {
                        *acc += v;
                    }
                }
                Ok(out)
            }
        }
    }
}

/// Contribution and dominance for one (cluster A, cluster B) pair.
///
/// Fetched in a single backend call, replaced wholesale whenever either
/// cluster changes; the two tensors always share a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionData {
    contrib: TimeCellTensor,
    dominance: TimeCellTensor,
}

impl ContributionData {
    pub fn new(contrib: TimeCellTensor, dominance: TimeCellTensor) -> Result<Self> {
        if contrib.time_bins != dominance.time_bins || contrib.cells != dominance.cells {
            return Err(ExplorerError::ShapeMismatch {
                expected: contrib.values.len(),
                found: dominance.values.len(),
            });
        }
        Ok(Self { contrib, dominance })
    }

    pub fn contrib(&self) -> &TimeCellTensor {
        &self.contrib
    }

    pub fn dominance(&self) -> &TimeCellTensor {
        &self.dominance
    }

    pub fn time_bins(&self) -> usize {
        self.contrib.time_bins
    }

    pub fn cells(&self) -> usize {
        self.contrib.cells
    }

    /// Per-cell (value, sign) arrays for the selected time segment.
    pub fn reduce(&self, selector: TimeSelector) -> Result<ReducedContribution> {
        Ok(ReducedContribution {
            values: self.contrib.reduce(selector)?,
            dominance: self.dominance.reduce(selector)?,
        })
    }
}

/// Result of reducing [`ContributionData`] over a time segment.
///
/// `values[i]` is the unsigned importance of cell `i`, `dominance[i]` its
/// signed attribution (positive = cluster A), same flat cell indexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReducedContribution {
    pub values: Vec<f32>,
    pub dominance: Vec<f32>,
}
