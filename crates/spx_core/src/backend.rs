//! Analysis backend boundary
//!
//! The core never computes embeddings or per-cluster statistics itself; it
//! talks to an [`AnalysisBackend`] through the request/response shapes below.
//! How those calls travel (in-process, HTTP, anything else) is the host's
//! business; the host performs the call and feeds the outcome back into the
//! pipeline that issued it.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::CourtGrid;
use crate::models::{GamePoint, StatChannel};

/// Request one spatial statistic for a set of games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRequest {
    pub point_indices: Vec<usize>,
    pub channel: StatChannel,
    /// `None` asks the backend for the all-time reduction; this is a request
    /// parameter, not a client-side fold.
    #[serde(default)]
    pub time_bin: Option<usize>,
}

/// Flat spatial array, grid cell order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResponse {
    pub values: Vec<f32>,
}

/// Request the contribution analysis for two disjoint game clusters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionRequest {
    pub cluster_a: Vec<usize>,
    pub cluster_b: Vec<usize>,
    /// When set the backend returns the raw `[time][cell][channel]` tensor
    /// and the client folds the channel axis; otherwise the backend has
    /// already reduced it. Explicit so the reduction point is never inferred
    /// from the response shape.
    #[serde(default)]
    pub per_channel: bool,
}

/// Contribution tensor in either reduction variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContribPayload {
    PerChannel(Vec<Vec<Vec<f32>>>),
    Reduced(Vec<Vec<f32>>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionResponse {
    pub contrib_tensor: ContribPayload,
    /// Signed `[time][cell]`: positive attributes a cell to cluster A,
    /// negative to cluster B, magnitude proportional to the standardized
    /// mean difference.
    pub dominance_tensor: Vec<Vec<f32>>,
}

/// Everything the core consumes from backend initialization or an embedding
/// recompute. Grid metadata may be absent while the backend is still
/// preparing; consumers then render an empty view instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitSnapshot {
    pub points: Vec<GamePoint>,
    pub group_names: Vec<String>,
    #[serde(default)]
    pub grid: Option<CourtGrid>,
}

/// The remote analysis service, seen from the core.
pub trait AnalysisBackend {
    fn aggregate(&self, request: &AggregateRequest) -> Result<AggregateResponse>;

    fn compute_contribution(&self, request: &ContributionRequest) -> Result<ContributionResponse>;

    fn init_snapshot(&self) -> Result<InitSnapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contrib_payload_untagged_shapes() {
        let reduced: ContribPayload = serde_json::from_str("[[1.0, 2.0]]").unwrap();
        assert!(matches!(reduced, ContribPayload::Reduced(_)));

        let per_channel: ContribPayload = serde_json::from_str("[[[1.0], [2.0]]]").unwrap();
        assert!(matches!(per_channel, ContribPayload::PerChannel(_)));
    }

    #[test]
    fn test_aggregate_request_defaults() {
        let req: AggregateRequest =
            serde_json::from_str(r#"{"point_indices":[0,1],"channel":"attempts"}"#).unwrap();
        assert_eq!(req.time_bin, None);
        assert_eq!(req.channel, StatChannel::Attempts);
    }
}
