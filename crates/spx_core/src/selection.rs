//! Cluster selection state machine
//!
//! Point selections in the embedding view become two named clusters through
//! a three-click cycle:
//!
//! - `Empty`: nothing selected. A non-empty selection fills cluster A.
//! - `FillingA`: A is set. The next non-empty selection fills cluster B.
//! - `Complete`: both set. The next non-empty selection clears B and reseeds
//!   A, starting a fresh comparison.
//!
//! An empty selection never transitions, and `reset` returns to `Empty` from
//! anywhere. A and B stay disjoint: indices already in A are excluded when B
//! is filled, and a selection left empty by that exclusion is a no-op.

use serde::{Deserialize, Serialize};

/// Where the interaction cycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPhase {
    Empty,
    FillingA,
    Complete,
}

/// The two point-index clusters under comparison.
///
/// Indices are kept sorted and deduplicated so request payloads derived from
/// them are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSelection {
    a: Vec<usize>,
    b: Vec<usize>,
}

impl ClusterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SelectionPhase {
        match (self.a.is_empty(), self.b.is_empty()) {
            (true, _) => SelectionPhase::Empty,
            (false, true) => SelectionPhase::FillingA,
            (false, false) => SelectionPhase::Complete,
        }
    }

    pub fn cluster_a(&self) -> &[usize] {
        &self.a
    }

    pub fn cluster_b(&self) -> &[usize] {
        &self.b
    }

    pub fn is_complete(&self) -> bool {
        self.phase() == SelectionPhase::Complete
    }

    /// Apply one selection event.
    ///
    /// Returns `true` if the state changed. Empty input (including a B-fill
    /// whose every index already belongs to A) is a no-op.
    pub fn select(&mut self, indices: &[usize]) -> bool {
        let picked = normalized(indices);
        if picked.is_empty() {
            return false;
        }
        match self.phase() {
            SelectionPhase::Empty => {
                self.a = picked;
            }
            SelectionPhase::FillingA => {
                let b: Vec<usize> =
                    picked.into_iter().filter(|i| self.a.binary_search(i).is_err()).collect();
                if b.is_empty() {
                    return false;
                }
                self.b = b;
            }
            SelectionPhase::Complete => {
                self.b.clear();
                self.a = picked;
            }
        }
        true
    }

    /// Clear both clusters.
    pub fn reset(&mut self) {
        self.a.clear();
        self.b.clear();
    }
}

fn normalized(indices: &[usize]) -> Vec<usize> {
    let mut v = indices.to_vec();
    v.sort_unstable();
    v.dedup();
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_click_cycle() {
        let mut sel = ClusterSelection::new();
        assert_eq!(sel.phase(), SelectionPhase::Empty);

        assert!(sel.select(&[1, 3]));
        assert_eq!(sel.phase(), SelectionPhase::FillingA);
        assert_eq!(sel.cluster_a(), &[1, 3]);

        assert!(sel.select(&[0, 2]));
        assert_eq!(sel.phase(), SelectionPhase::Complete);
        assert_eq!(sel.cluster_a(), &[1, 3]);
        assert_eq!(sel.cluster_b(), &[0, 2]);

        // Third click restarts with a fresh A.
        assert!(sel.select(&[5, 6]));
        assert_eq!(sel.phase(), SelectionPhase::FillingA);
        assert_eq!(sel.cluster_a(), &[5, 6]);
        assert!(sel.cluster_b().is_empty());
    }

    #[test]
    fn test_empty_selection_is_noop_everywhere() {
        let mut sel = ClusterSelection::new();
        assert!(!sel.select(&[]));
        assert_eq!(sel.phase(), SelectionPhase::Empty);

        sel.select(&[1]);
        assert!(!sel.select(&[]));
        assert_eq!(sel.phase(), SelectionPhase::FillingA);
        assert_eq!(sel.cluster_a(), &[1]);

        sel.select(&[2]);
        assert!(!sel.select(&[]));
        assert_eq!(sel.phase(), SelectionPhase::Complete);
    }

    #[test]
    fn test_clusters_stay_disjoint() {
        let mut sel = ClusterSelection::new();
        sel.select(&[1, 2, 3]);
        // Overlapping picks land in B only where they are not already in A.
        assert!(sel.select(&[2, 3, 4, 5]));
        assert_eq!(sel.cluster_a(), &[1, 2, 3]);
        assert_eq!(sel.cluster_b(), &[4, 5]);
    }

    #[test]
    fn test_b_fill_fully_overlapping_is_noop() {
        let mut sel = ClusterSelection::new();
        sel.select(&[1, 2]);
        assert!(!sel.select(&[1, 2]));
        assert_eq!(sel.phase(), SelectionPhase::FillingA);
        assert!(sel.cluster_b().is_empty());
    }

    #[test]
    fn test_reset_from_any_phase() {
        let mut sel = ClusterSelection::new();
        sel.select(&[1]);
        sel.select(&[2]);
        sel.reset();
        assert_eq!(sel.phase(), SelectionPhase::Empty);
        assert!(sel.cluster_a().is_empty() && sel.cluster_b().is_empty());
    }

    #[test]
    fn test_input_deduplicated_and_sorted() {
        let mut sel = ClusterSelection::new();
        sel.select(&[7, 3, 7, 1, 3]);
        assert_eq!(sel.cluster_a(), &[1, 3, 7]);
    }

    #[cfg(all(test, feature = "proptest"))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: A and B are disjoint after any selection sequence.
            #[test]
            fn prop_always_disjoint(seqs in proptest::collection::vec(
                proptest::collection::vec(0usize..32, 0..8), 0..12
            )) {
                let mut sel = ClusterSelection::new();
                for s in &seqs {
                    sel.select(s);
                    prop_assert!(sel
                        .cluster_a()
                        .iter()
                        .all(|i| sel.cluster_b().binary_search(i).is_err()));
                }
            }

            /// Property: three non-empty selections always end in FillingA
            /// with A equal to the last pick.
            #[test]
            fn prop_third_click_restarts(
                s1 in proptest::collection::vec(0usize..16, 1..6),
                s2 in proptest::collection::vec(16usize..32, 1..6),
                s3 in proptest::collection::vec(32usize..48, 1..6),
            ) {
                let mut sel = ClusterSelection::new();
                sel.select(&s1);
                sel.select(&s2);
                sel.select(&s3);
                let mut expected = s3.clone();
                expected.sort_unstable();
                expected.dedup();
                prop_assert_eq!(sel.phase(), SelectionPhase::FillingA);
                prop_assert_eq!(sel.cluster_a(), &expected[..]);
                prop_assert!(sel.cluster_b().is_empty());
            }
        }
    }
}
