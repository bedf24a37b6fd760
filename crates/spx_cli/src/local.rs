//! Offline analysis backend
//!
//! Serves the core's backend boundary from a binned [`SessionTensor`]
//! instead of a remote service. Aggregation matches the remote semantics
//! exactly (channel sums over cluster games, optional time slice).
//!
//! The production contribution analysis trains a classifier remotely and
//! maps feature importances back to court cells; that computation is out of
//! scope here. This backend substitutes the standardized mean difference of
//! per-game counts between the two clusters: its sign gives dominance
//! directly, its magnitude stands in for the unsigned importance. Good
//! enough to drive and demo the full client loop deterministically.

use log::debug;

use spx_core::{
    AggregateRequest, AggregateResponse, AnalysisBackend, ContribPayload, ContributionRequest,
    ContributionResponse, ExplorerError, InitSnapshot, Result, StatChannel,
};

use crate::session::{SessionInput, SessionTensor, ShotEvent, TIME_BIN_SECONDS};

/// In-process stand-in for the remote analysis service.
pub struct LocalBackend {
    input: SessionInput,
    tensor: SessionTensor,
}

impl LocalBackend {
    pub fn new(input: SessionInput, grid: spx_core::CourtGrid) -> Self {
        let tensor = SessionTensor::build(&input, grid);
        Self { input, tensor }
    }

    pub fn tensor(&self) -> &SessionTensor {
        &self.tensor
    }

    fn check_games(&self, indices: &[usize]) -> Result<()> {
        match indices.iter().find(|i| **i >= self.tensor.games()) {
            Some(bad) => Err(ExplorerError::Backend(format!(
                "unknown point index {bad} (have {} games)",
                self.tensor.games()
            ))),
            None => Ok(()),
        }
    }

    /// Raw shots of a cluster, optionally restricted to one time bin's
    /// elapsed-second window.
    pub fn shots_for_cluster(
        &self,
        cluster: &[usize],
        time_bin: Option<usize>,
    ) -> Result<Vec<&ShotEvent>> {
        self.check_games(cluster)?;
        let window = time_bin.map(|t| {
            let start = t as u32 * TIME_BIN_SECONDS;
            (start, start + TIME_BIN_SECONDS)
        });
        Ok(cluster
            .iter()
            .flat_map(|&g| self.input.games[g].shots.iter())
            .filter(|shot| match window {
                Some((start, end)) => {
                    let elapsed = shot.elapsed_seconds();
                    elapsed >= start && elapsed < end
                }
                None => true,
            })
            .collect())
    }

    /// Signed standardized mean difference per channel for one (time, cell).
    fn smd_per_channel(&self, a: &[usize], b: &[usize], time_bin: usize, cell: usize) -> Vec<f32> {
        StatChannel::ALL
            .iter()
            .map(|&ch| {
                let sa = self.tensor.game_series(a, time_bin, cell, ch);
                let sb = self.tensor.game_series(b, time_bin, cell, ch);
                standardized_mean_diff(&sa, &sb)
            })
            .collect()
    }
}

impl AnalysisBackend for LocalBackend {
    fn aggregate(&self, request: &AggregateRequest) -> Result<AggregateResponse> {
        if request.point_indices.is_empty() {
            return Ok(AggregateResponse { values: Vec::new() });
        }
        self.check_games(&request.point_indices)?;
        if let Some(t) = request.time_bin {
            if t >= self.tensor.time_bins() {
                return Err(ExplorerError::TimeBinOutOfRange {
                    bin: t,
                    bins: self.tensor.time_bins(),
                });
            }
        }
        Ok(AggregateResponse {
            values: self.tensor.channel_sum(
                &request.point_indices,
                request.channel,
                request.time_bin,
            ),
        })
    }

    fn compute_contribution(&self, request: &ContributionRequest) -> Result<ContributionResponse> {
        if request.cluster_a.is_empty() || request.cluster_b.is_empty() {
            return Err(ExplorerError::EmptyCluster);
        }
        self.check_games(&request.cluster_a)?;
        self.check_games(&request.cluster_b)?;
        debug!(
            "contribution analysis: {} vs {} games, per_channel={}",
            request.cluster_a.len(),
            request.cluster_b.len(),
            request.per_channel
        );

        let bins = self.tensor.time_bins();
        let cells = self.tensor.cells();

        let mut per_channel = Vec::with_capacity(bins);
        let mut dominance = Vec::with_capacity(bins);
        for t in 0..bins {
            let mut cells_row = Vec::with_capacity(cells);
            let mut dom_row = Vec::with_capacity(cells);
            for cell in 0..cells {
                let smds = self.smd_per_channel(&request.cluster_a, &request.cluster_b, t, cell);
                dom_row.push(smds.iter().sum::<f32>());
                cells_row.push(smds.iter().map(|s| s.abs()).collect::<Vec<f32>>());
            }
            per_channel.push(cells_row);
            dominance.push(dom_row);
        }

        let contrib_tensor = if request.per_channel {
            ContribPayload::PerChannel(per_channel)
        } else {
            ContribPayload::Reduced(
                per_channel
                    .into_iter()
                    .map(|row| row.into_iter().map(|chs| chs.iter().sum()).collect())
                    .collect(),
            )
        };

        Ok(ContributionResponse { contrib_tensor, dominance_tensor: dominance })
    }

    fn init_snapshot(&self) -> Result<InitSnapshot> {
        Ok(InitSnapshot {
            points: self.input.points(),
            group_names: self.input.group_names.clone(),
            grid: Some(self.tensor.grid().clone()),
        })
    }
}

/// `(mean_a - mean_b) / pooled_std` over per-game counts.
///
/// The pooled spread is floored at one count: shot counts are integers, so
/// constant series (single-game clusters, cells one side never shoots from)
/// would otherwise zero out or blow up the difference instead of passing it
/// through bounded.
fn standardized_mean_diff(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let mean = |s: &[f32]| s.iter().sum::<f32>() / s.len() as f32;
    let (ma, mb) = (mean(a), mean(b));
    let ssq = |s: &[f32], m: f32| s.iter().map(|v| (v - m) * (v - m)).sum::<f32>();
    let pooled_var = (ssq(a, ma) + ssq(b, mb)) / (a.len() + b.len()) as f32;
    (ma - mb) / pooled_var.sqrt().max(1.0)
}
