//! # spx_core - Shot Pattern Explorer core
//!
//! Client-side core for comparing two clusters of basketball games on a
//! court grid. Point selections in a 2D embedding become two named clusters;
//! per-cluster spatial statistics and a contribution/dominance analysis are
//! fetched from an analysis backend and mapped to drawable court marks.
//!
//! ## What lives here
//! - one grid indexing convention shared by every flattened spatial array
//! - the three-click cluster selection state machine
//! - request orchestration with stale-response protection
//! - client-side time reduction of fetched tensors
//! - size/color scaling of reduced values
//!
//! The embedding computation and the statistical analysis themselves are the
//! backend's job; this crate only consumes them through
//! [`backend::AnalysisBackend`]. Nothing is persisted across sessions.

// Large payload variants - boxing would change the wire types
#![allow(clippy::large_enum_variant)]

pub mod backend;
pub mod error;
pub mod grid;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod selection;
pub mod state;


pub use backend::{
    AggregateRequest, AggregateResponse, AnalysisBackend, ContribPayload, ContributionRequest,
    ContributionResponse, InitSnapshot,
};
pub use error::{ExplorerError, Result};
pub use grid::CourtGrid;
pub use models::{
    ContributionData, GamePoint, ObservationId, ReducedContribution, SeasonTag, StatChannel,
    TimeCellTensor, TimeSelector,
};
pub use render::{
    build_render_cells, classify_dominance, DominanceColor, RenderCell, SizePolicy, DOMINANCE_EPS,
    MAX_DIAMETER,
};
pub use selection::{ClusterSelection, SelectionPhase};
pub use state::{Action, ClusterSide, Effect, ExplorerState, ExplorerStore, Notice};
