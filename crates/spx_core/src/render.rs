//! Mapping reduced per-cell values to mark size and color
//!
//! Size and color are decided here and nowhere else, independent of which
//! reduction produced the values. Two size normalizations exist and they are
//! not interchangeable:
//!
//! - dynamic max rescales to the currently displayed maximum, so the argmax
//!   cell always renders at full diameter but marks are not comparable
//!   across different selections;
//! - fixed max divides by a calibrated constant, comparable across
//!   selections but clipping above it.
//!
//! The court comparison view uses dynamic max; hosts that line up several
//! selections side by side should build their cells with a fixed-max policy.

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};
use crate::grid::CourtGrid;

/// Largest mark diameter drawn by the dynamic-max policy, in court units
/// (tenths of feet); just under the default grid's cell width.
pub const MAX_DIAMETER: f32 = 28.0;

/// Dead zone around zero dominance. Reduction sums carry floating-point
/// noise, and without the dead zone a near-tied cell flickers between the
/// two cluster colors.
pub const DOMINANCE_EPS: f32 = 1e-4;

/// Default calibration for the fixed-max policy: per-cell value treated as
/// full scale, and the fraction of the cell diagonal a full-scale mark spans.
pub const FIXED_MAX_VALUE: f32 = 30.0;
pub const FIXED_MAX_SCALE: f32 = 0.9;

/// Size normalization rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SizePolicy {
    /// `size = value / max(values) * max_diameter`, recomputed from the
    /// displayed set; an all-zero set substitutes a max of 1.0.
    DynamicMax { max_diameter: f32 },
    /// `size = min(value / fixed_max, 1.0) * cell_diagonal * scale`, with a
    /// selection-independent `fixed_max`.
    FixedMax { fixed_max: f32, cell_diagonal: f32, scale: f32 },
}

impl SizePolicy {
    pub fn dynamic() -> Self {
        SizePolicy::DynamicMax { max_diameter: MAX_DIAMETER }
    }

    pub fn fixed(grid: &CourtGrid) -> Self {
        SizePolicy::FixedMax {
            fixed_max: FIXED_MAX_VALUE,
            cell_diagonal: grid.cell_diagonal(),
            scale: FIXED_MAX_SCALE,
        }
    }

    /// Mark sizes for a reduced value array.
    pub fn sizes(&self, values: &[f32]) -> Vec<f32> {
        match *self {
            SizePolicy::DynamicMax { max_diameter } => {
                let mut max = values.iter().cloned().fold(0.0f32, f32::max);
                if max == 0.0 {
                    max = 1.0;
                }
                values.iter().map(|v| v / max * max_diameter).collect()
            }
            SizePolicy::FixedMax { fixed_max, cell_diagonal, scale } => values
                .iter()
                .map(|v| (v / fixed_max).min(1.0) * cell_diagonal * scale)
                .collect(),
        }
    }
}

/// Which side of the comparison a cell's color attributes it to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DominanceColor {
    Neutral,
    ClusterA,
    ClusterB,
}

/// Classify a signed dominance value, with the default dead zone.
#[inline]
pub fn classify_dominance(dominance: f32) -> DominanceColor {
    classify_dominance_with(dominance, DOMINANCE_EPS)
}

/// Three-way classification: |d| < eps neutral, d > eps cluster A, else B.
/// Total over all finite inputs.
#[inline]
pub fn classify_dominance_with(dominance: f32, eps: f32) -> DominanceColor {
    if dominance.abs() < eps {
        DominanceColor::Neutral
    } else if dominance > eps {
        DominanceColor::ClusterA
    } else {
        DominanceColor::ClusterB
    }
}

/// One drawable court mark. Ephemeral: rebuilt on every reduction or policy
/// change, cheap enough that nothing caches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderCell {
    pub x: f32,
    pub y: f32,
    pub value: f32,
    pub sign: f32,
    pub size: f32,
    pub color: DominanceColor,
}

/// Zip reduced values with the grid into drawable marks, flat-index order.
///
/// `values` and `dominance` must both be `grid.cell_count()` long; anything
/// else is a shape mismatch and nothing is drawn from it.
pub fn build_render_cells(
    grid: &CourtGrid,
    values: &[f32],
    dominance: &[f32],
    policy: &SizePolicy,
) -> Result<Vec<RenderCell>> {
    let cells = grid.cell_count();
    if values.len() != cells {
        return Err(ExplorerError::ShapeMismatch { expected: cells, found: values.len() });
    }
    if dominance.len() != cells {
        return Err(ExplorerError::ShapeMismatch { expected: cells, found: dominance.len() });
    }
    let sizes = policy.sizes(values);
    Ok(grid
        .iter_centers()
        .map(|(i, (x, y))| RenderCell {
            x,
            y,
            value: values[i],
            sign: dominance[i],
            size: sizes[i],
            color: classify_dominance(dominance[i]),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_max_sizes_worked_example() {
        // vals=[0,2,4,0] -> sizes [0, 0.5*D, 1.0*D, 0]
        let sizes = SizePolicy::dynamic().sizes(&[0.0, 2.0, 4.0, 0.0]);
        assert_eq!(sizes, vec![0.0, 0.5 * MAX_DIAMETER, MAX_DIAMETER, 0.0]);
    }

    #[test]
    fn test_dynamic_max_hits_full_diameter_once_at_argmax() {
        let vals = [1.0, 3.0, 2.0, 0.5];
        let sizes = SizePolicy::dynamic().sizes(&vals);
        let full: Vec<usize> =
            sizes.iter().enumerate().filter(|(_, s)| **s == MAX_DIAMETER).map(|(i, _)| i).collect();
        assert_eq!(full, vec![1]);
    }

    #[test]
    fn test_dynamic_max_all_zero_is_safe() {
        let sizes = SizePolicy::dynamic().sizes(&[0.0, 0.0, 0.0]);
        assert_eq!(sizes, vec![0.0, 0.0, 0.0]);
        assert!(sizes.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_fixed_max_clips_at_full_scale() {
        let policy = SizePolicy::FixedMax { fixed_max: 10.0, cell_diagonal: 40.0, scale: 0.5 };
        let sizes = policy.sizes(&[5.0, 10.0, 25.0]);
        assert_eq!(sizes, vec![10.0, 20.0, 20.0]);
    }

    #[test]
    fn test_dominance_classification_total_with_boundaries() {
        let eps = DOMINANCE_EPS;
        let delta = eps / 10.0;

        assert_eq!(classify_dominance(0.0), DominanceColor::Neutral);
        assert_eq!(classify_dominance(eps - delta), DominanceColor::Neutral);
        assert_eq!(classify_dominance(-(eps - delta)), DominanceColor::Neutral);
        // Exactly eps: |d| < eps is false, d > eps is false -> cluster B side
        // of the branch; the dead zone is strictly open.
        assert_eq!(classify_dominance(eps), DominanceColor::ClusterB);
        assert_eq!(classify_dominance(eps + delta), DominanceColor::ClusterA);
        assert_eq!(classify_dominance(-(eps + delta)), DominanceColor::ClusterB);
        assert_eq!(classify_dominance(3.5), DominanceColor::ClusterA);
        assert_eq!(classify_dominance(-3.5), DominanceColor::ClusterB);
    }

    #[test]
    fn test_build_cells_row_major_alignment() {
        let grid = CourtGrid::new(vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 20.0]).unwrap();
        let cells = build_render_cells(
            &grid,
            &[0.0, 2.0, 4.0, 0.0],
            &[0.0, 0.2, -0.2, 0.0],
            &SizePolicy::dynamic(),
        )
        .unwrap();

        assert_eq!(cells.len(), 4);
        // Flat indices 0..3 in row-major order land on the edge midpoints.
        assert_eq!((cells[0].x, cells[0].y), (0.5, 5.0));
        assert_eq!((cells[1].x, cells[1].y), (1.5, 5.0));
        assert_eq!((cells[2].x, cells[2].y), (0.5, 15.0));
        assert_eq!((cells[3].x, cells[3].y), (1.5, 15.0));

        assert_eq!(cells[2].size, MAX_DIAMETER);
        assert_eq!(cells[1].color, DominanceColor::ClusterA);
        assert_eq!(cells[2].color, DominanceColor::ClusterB);
        assert_eq!(cells[0].color, DominanceColor::Neutral);
    }

    #[test]
    fn test_build_cells_rejects_wrong_lengths() {
        let grid = CourtGrid::new(vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 20.0]).unwrap();
        assert!(build_render_cells(&grid, &[1.0], &[0.0], &SizePolicy::dynamic()).is_err());
        assert!(build_render_cells(
            &grid,
            &[1.0, 1.0, 1.0, 1.0],
            &[0.0; 3],
            &SizePolicy::dynamic()
        )
        .is_err());
    }
}
