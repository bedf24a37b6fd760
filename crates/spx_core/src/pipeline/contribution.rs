//! Contribution/dominance fetch pipeline
//!
//! One backend call per (cluster A, cluster B) pair returns the unsigned
//! contribution tensor and the signed dominance tensor together; they are
//! validated into a [`ContributionData`] and replaced as a unit. Changing
//! the time-segment selection afterwards only re-reduces the cached pair
//! ([`ContributionData::reduce`]); it never re-fetches.

use log::debug;

use crate::backend::{ContribPayload, ContributionRequest, ContributionResponse};
use crate::error::{ExplorerError, Result};
use crate::models::{ContributionData, TimeCellTensor};
use crate::pipeline::Completion;

/// Identifies one in-flight contribution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContributionTicket {
    seq: u64,
    per_channel: bool,
    expected_cells: Option<usize>,
}

/// What a contribution invocation turned into.
#[derive(Debug)]
pub enum ContributionStart {
    /// A cluster was empty: no request issued, and any displayed
    /// contribution data must be cleared.
    Cleared,
    /// Hand `request` to the backend, then feed the outcome to
    /// [`ContributionPipeline::complete`] with `ticket`.
    Fetch { ticket: ContributionTicket, request: ContributionRequest },
}

/// Sequences contribution fetches for the comparison view.
#[derive(Debug, Default)]
pub struct ContributionPipeline {
    next_seq: u64,
    current_seq: u64,
}

impl ContributionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin the contribution analysis for two clusters.
    ///
    /// Both must be non-empty; otherwise nothing is requested and the caller
    /// clears its displayed data. Either way any outstanding request is
    /// superseded, so a fetch started for an abandoned pair can no longer
    /// land.
    pub fn start(
        &mut self,
        cluster_a: &[usize],
        cluster_b: &[usize],
        per_channel: bool,
        expected_cells: Option<usize>,
    ) -> ContributionStart {
        self.next_seq += 1;
        self.current_seq = self.next_seq;
        if cluster_a.is_empty() || cluster_b.is_empty() {
            return ContributionStart::Cleared;
        }
        ContributionStart::Fetch {
            ticket: ContributionTicket { seq: self.current_seq, per_channel, expected_cells },
            request: ContributionRequest {
                cluster_a: cluster_a.to_vec(),
                cluster_b: cluster_b.to_vec(),
                per_channel,
            },
        }
    }

    /// Feed a finished backend call back in.
    pub fn complete(
        &mut self,
        ticket: ContributionTicket,
        outcome: Result<ContributionResponse>,
    ) -> Completion<ContributionData> {
        if ticket.seq != self.current_seq {
            debug!(
                "discarding stale contribution response (ticket {} != current {})",
                ticket.seq, self.current_seq
            );
            return Completion::Stale;
        }
        let response = match outcome {
            Ok(response) => response,
            Err(err) => return Completion::Failed(err),
        };
        match Self::convert(ticket, response) {
            Ok(data) => Completion::Applied(data),
            Err(err) => Completion::Failed(err),
        }
    }

    /// Validate the wire payload into a dense tensor pair, folding the
    /// channel axis when the per-channel variant was requested.
    fn convert(ticket: ContributionTicket, response: ContributionResponse) -> Result<ContributionData> {
        let cells = ticket
            .expected_cells
            .unwrap_or_else(|| first_slice_len(&response));

        let contrib = match (ticket.per_channel, response.contrib_tensor) {
            (true, ContribPayload::PerChannel(rows)) => {
                TimeCellTensor::from_channel_rows(rows, cells)?
            }
            (false, ContribPayload::Reduced(rows)) => TimeCellTensor::from_rows(rows, cells)?,
            (requested, _) => {
                return Err(ExplorerError::Backend(format!(
                    "contribution variant mismatch: requested per_channel={requested}, \
                     response has the other shape"
                )))
            }
        };
        let dominance = TimeCellTensor::from_rows(response.dominance_tensor, cells)?;
        ContributionData::new(contrib, dominance)
    }
}

fn first_slice_len(response: &ContributionResponse) -> usize {
    response
        .dominance_tensor
        .first()
        .map(|row| row.len())
        .unwrap_or(0)
}
