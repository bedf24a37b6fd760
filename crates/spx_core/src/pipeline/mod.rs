//! Request orchestration for remote aggregation and contribution calls
//!
//! Both pipelines hand a ticket to the caller when a fetch is needed; the
//! host performs the backend call (however it likes, without blocking the
//! interaction loop) and feeds the outcome back together with the ticket.
//! Each new request supersedes the previous one, so a slow response that
//! belongs to an abandoned selection comes back `Stale` and is discarded
//! instead of overwriting newer display state.

pub mod aggregate;
pub mod contribution;

pub use aggregate::{AggregateStart, AggregateTicket, Aggregator};
pub use contribution::{ContributionPipeline, ContributionStart, ContributionTicket};

use crate::error::ExplorerError;

/// Outcome of feeding a completed backend call back into a pipeline.
#[derive(Debug)]
pub enum Completion<T> {
    /// The response belongs to the current request; apply its payload.
    Applied(T),
    /// Superseded by a newer request; discard, keep current display state.
    Stale,
    /// The request failed or its payload was malformed; keep the previous
    /// display data and surface a notice.
    Failed(ExplorerError),
}

impl<T> Completion<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Completion::Applied(_))
    }
}
