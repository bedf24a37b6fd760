//! Aggregation request orchestrator
//!
//! Issues one backend call per invocation, no caching; identical repeats
//! re-fetch. The empty-selection case never reaches the backend: it resolves
//! immediately to an empty array, which callers display as "no data".

use log::debug;

use crate::backend::{AggregateRequest, AggregateResponse};
use crate::error::{ExplorerError, Result};
use crate::models::StatChannel;
use crate::pipeline::Completion;

/// Identifies one in-flight aggregation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateTicket {
    seq: u64,
    expected_cells: Option<usize>,
}

/// What an aggregation invocation turned into.
#[derive(Debug)]
pub enum AggregateStart {
    /// Empty point set: resolved locally to an empty array, no backend call.
    NoData,
    /// Hand `request` to the backend, then feed the outcome to
    /// [`Aggregator::complete`] with `ticket`.
    Fetch { ticket: AggregateTicket, request: AggregateRequest },
}

/// Sequences aggregation fetches for one display surface.
#[derive(Debug, Default)]
pub struct Aggregator {
    next_seq: u64,
    current_seq: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin an aggregation for `point_indices`.
    ///
    /// `time_bin = None` requests the backend's all-time reduction.
    /// `expected_cells` is the grid's cell count when known; responses of a
    /// different length are then rejected before they can be rendered.
    /// Any request still in flight is superseded either way.
    pub fn start(
        &mut self,
        point_indices: &[usize],
        channel: StatChannel,
        time_bin: Option<usize>,
        expected_cells: Option<usize>,
    ) -> AggregateStart {
        self.next_seq += 1;
        self.current_seq = self.next_seq;
        if point_indices.is_empty() {
            return AggregateStart::NoData;
        }
        AggregateStart::Fetch {
            ticket: AggregateTicket { seq: self.current_seq, expected_cells },
            request: AggregateRequest {
                point_indices: point_indices.to_vec(),
                channel,
                time_bin,
            },
        }
    }

    /// Feed a finished backend call back in.
    pub fn complete(
        &mut self,
        ticket: AggregateTicket,
        outcome: Result<AggregateResponse>,
    ) -> Completion<Vec<f32>> {
        if ticket.seq != self.current_seq {
            debug!(
                "discarding stale aggregate response (ticket {} != current {})",
                ticket.seq, self.current_seq
            );
            return Completion::Stale;
        }
        match outcome {
            Err(err) => Completion::Failed(err),
            Ok(response) => {
                if let Some(expected) = ticket.expected_cells {
                    if response.values.len() != expected {
                        return Completion::Failed(ExplorerError::ShapeMismatch {
                            expected,
                            found: response.values.len(),
                        });
                    }
                }
                Completion::Applied(response.values)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch(start: AggregateStart) -> (AggregateTicket, AggregateRequest) {
        match start {
            AggregateStart::Fetch { ticket, request } => (ticket, request),
            AggregateStart::NoData => panic!("expected a fetch"),
        }
    }

    #[test]
    fn test_empty_indices_never_fetch() {
        let mut agg = Aggregator::new();
        let start = agg.start(&[], StatChannel::Attempts, None, Some(4));
        assert!(matches!(start, AggregateStart::NoData));
    }

    #[test]
    fn test_request_carries_parameters() {
        let mut agg = Aggregator::new();
        let (_, request) = fetch(agg.start(&[2, 5], StatChannel::Makes, Some(1), None));
        assert_eq!(request.point_indices, vec![2, 5]);
        assert_eq!(request.channel, StatChannel::Makes);
        assert_eq!(request.time_bin, Some(1));
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut agg = Aggregator::new();
        let (old, _) = fetch(agg.start(&[0], StatChannel::Attempts, None, None));
        let (new, _) = fetch(agg.start(&[1], StatChannel::Attempts, None, None));

        // The superseded response must not be applied regardless of which
        // completion arrives first.
        let late = agg.complete(old, Ok(AggregateResponse { values: vec![9.0] }));
        assert!(matches!(late, Completion::Stale));

        let current = agg.complete(new, Ok(AggregateResponse { values: vec![1.0] }));
        match current {
            Completion::Applied(values) => assert_eq!(values, vec![1.0]),
            other => panic!("expected Applied, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_start_invalidates_in_flight() {
        let mut agg = Aggregator::new();
        let (old, _) = fetch(agg.start(&[0], StatChannel::Attempts, None, None));
        agg.start(&[], StatChannel::Attempts, None, None);
        let late = agg.complete(old, Ok(AggregateResponse { values: vec![9.0] }));
        assert!(matches!(late, Completion::Stale));
    }

    #[test]
    fn test_backend_error_is_failed_not_fatal() {
        let mut agg = Aggregator::new();
        let (ticket, _) = fetch(agg.start(&[0], StatChannel::Points, None, None));
        let done = agg.complete(ticket, Err(ExplorerError::Backend("connection reset".into())));
        match done {
            Completion::Failed(err) => assert!(err.is_recoverable()),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_length_rejected() {
        let mut agg = Aggregator::new();
        let (ticket, _) = fetch(agg.start(&[0], StatChannel::Attempts, None, Some(4)));
        let done = agg.complete(ticket, Ok(AggregateResponse { values: vec![1.0, 2.0] }));
        assert!(matches!(
            done,
            Completion::Failed(ExplorerError::ShapeMismatch { expected: 4, found: 2 })
        ));
    }
}
