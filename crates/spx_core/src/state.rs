//! Explorer state store
//!
//! Single source of truth for one explorer session. All mutation goes
//! through [`ExplorerStore::dispatch`]: the reducer applies the action to
//! the owned [`ExplorerState`], hands back the backend fetches the host must
//! perform as [`Effect`]s, and notifies subscribed observers. Nothing here
//! blocks; completed fetches come back in as `AggregateDone` /
//! `ContributionDone` actions carrying the ticket of the request they
//! answer, and superseded tickets are dropped by the pipelines.
//!
//! Remote failures never escape: they become transient [`Notice`]s while the
//! previous display data stays in place.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::backend::{
    AggregateRequest, AggregateResponse, ContributionRequest, ContributionResponse, InitSnapshot,
};
use crate::error::Result;
use crate::grid::CourtGrid;
use crate::models::{ContributionData, GamePoint, StatChannel, TimeSelector};
use crate::pipeline::{
    AggregateStart, AggregateTicket, Aggregator, Completion, ContributionPipeline,
    ContributionStart, ContributionTicket,
};
use crate::render::{build_render_cells, DominanceColor, RenderCell, SizePolicy};
use crate::selection::ClusterSelection;

/// One side of the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterSide {
    A,
    B,
}

impl ClusterSide {
    pub const BOTH: [ClusterSide; 2] = [ClusterSide::A, ClusterSide::B];

    fn index(self) -> usize {
        match self {
            ClusterSide::A => 0,
            ClusterSide::B => 1,
        }
    }
}

/// Transient, dismissible message surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: u64,
    pub message: String,
}

/// Everything an observer can read about the session.
#[derive(Debug, Default)]
pub struct ExplorerState {
    pub points: Vec<GamePoint>,
    pub group_names: Vec<String>,
    /// Absent until initialization delivers usable edges; views render
    /// nothing in the meantime.
    pub grid: Option<CourtGrid>,
    pub selection: ClusterSelection,
    pub channel: StatChannel,
    /// Aggregation request parameter; `None` asks the backend for all time.
    pub time_bin: Option<usize>,
    /// Client-side reduction of the fetched contribution pair.
    pub time_selector: TimeSelector,
    pub per_channel: bool,
    /// Last applied spatial array per side; an empty array means "no data".
    pub aggregates: [Option<Vec<f32>>; 2],
    pub contribution: Option<ContributionData>,
    pub notices: Vec<Notice>,
}

impl ExplorerState {
    pub fn aggregate(&self, side: ClusterSide) -> Option<&[f32]> {
        self.aggregates[side.index()].as_deref()
    }
}

/// An input to the reducer.
#[derive(Debug)]
pub enum Action {
    /// Fresh initialization (or embedding recompute) payload. Clears the
    /// selection and every fetched tensor.
    LoadSnapshot(InitSnapshot),
    /// A point-selection event from the embedding view.
    Select(Vec<usize>),
    ResetSelection,
    SetChannel(StatChannel),
    SetTimeBin(Option<usize>),
    /// Changes only the client-side reduction; never causes a fetch.
    SetTimeSelector(TimeSelector),
    SetPerChannel(bool),
    AggregateDone {
        side: ClusterSide,
        ticket: AggregateTicket,
        outcome: Result<AggregateResponse>,
    },
    ContributionDone {
        ticket: ContributionTicket,
        outcome: Result<ContributionResponse>,
    },
    DismissNotice(u64),
}

/// A backend call the host must perform on the store's behalf.
#[derive(Debug)]
pub enum Effect {
    FetchAggregate { side: ClusterSide, ticket: AggregateTicket, request: AggregateRequest },
    FetchContribution { ticket: ContributionTicket, request: ContributionRequest },
}

type Observer = Box<dyn Fn(&ExplorerState)>;

/// Owns the state and the request pipelines.
#[derive(Default)]
pub struct ExplorerStore {
    state: ExplorerState,
    aggregators: [Aggregator; 2],
    contribution: ContributionPipeline,
    next_notice_id: u64,
    observers: Vec<Observer>,
}

impl ExplorerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ExplorerState {
        &self.state
    }

    /// Register an observer called after every dispatched action.
    pub fn subscribe(&mut self, observer: impl Fn(&ExplorerState) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Apply one action, returning the fetches the host must perform.
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        let effects = self.reduce(action);
        for observer in &self.observers {
            observer(&self.state);
        }
        effects
    }

    fn reduce(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::LoadSnapshot(snapshot) => self.load_snapshot(snapshot),
            Action::Select(indices) => {
                if !self.state.selection.select(&indices) {
                    return Vec::new();
                }
                let mut effects = self.refresh_aggregates();
                effects.extend(self.refresh_contribution());
                effects
            }
            Action::ResetSelection => {
                self.state.selection.reset();
                self.clear_fetched();
                Vec::new()
            }
            Action::SetChannel(channel) => {
                if self.state.channel == channel {
                    return Vec::new();
                }
                self.state.channel = channel;
                self.refresh_aggregates()
            }
            Action::SetTimeBin(time_bin) => {
                if self.state.time_bin == time_bin {
                    return Vec::new();
                }
                self.state.time_bin = time_bin;
                self.refresh_aggregates()
            }
            Action::SetTimeSelector(selector) => {
                self.state.time_selector = selector;
                Vec::new()
            }
            Action::SetPerChannel(per_channel) => {
                if self.state.per_channel == per_channel {
                    return Vec::new();
                }
                self.state.per_channel = per_channel;
                self.refresh_contribution()
            }
            Action::AggregateDone { side, ticket, outcome } => {
                match self.aggregators[side.index()].complete(ticket, outcome) {
                    Completion::Applied(values) => {
                        self.state.aggregates[side.index()] = Some(values);
                    }
                    Completion::Stale => {}
                    Completion::Failed(err) => {
                        self.push_notice(format!("aggregation failed: {err}"));
                    }
                }
                Vec::new()
            }
            Action::ContributionDone { ticket, outcome } => {
                match self.contribution.complete(ticket, outcome) {
                    Completion::Applied(data) => {
                        self.state.contribution = Some(data);
                    }
                    Completion::Stale => {}
                    Completion::Failed(err) => {
                        self.push_notice(format!("cluster analysis failed: {err}"));
                    }
                }
                Vec::new()
            }
            Action::DismissNotice(id) => {
                self.state.notices.retain(|n| n.id != id);
                Vec::new()
            }
        }
    }

    fn load_snapshot(&mut self, snapshot: InitSnapshot) -> Vec<Effect> {
        let InitSnapshot { points, group_names, grid } = snapshot;
        // Re-validate the edges: the payload came over the wire and a
        // malformed grid must degrade to "not ready", not panic downstream.
        self.state.grid = match grid {
            Some(g) => match CourtGrid::new(g.x_edges().to_vec(), g.y_edges().to_vec()) {
                Ok(valid) => Some(valid),
                Err(err) => {
                    warn!("initialization carried unusable grid metadata: {err}");
                    self.push_notice(format!("grid metadata not usable: {err}"));
                    None
                }
            },
            None => None,
        };
        self.state.points = points;
        self.state.group_names = group_names;
        self.state.selection.reset();
        self.clear_fetched();
        Vec::new()
    }

    /// Drop fetched display data and supersede anything in flight. The
    /// pipelines are invalidated with empty starts rather than recreated so
    /// their sequence counters keep increasing and old tickets stay stale.
    fn clear_fetched(&mut self) {
        self.state.aggregates = [None, None];
        self.state.contribution = None;
        for aggregator in &mut self.aggregators {
            aggregator.start(&[], self.state.channel, None, None);
        }
        self.contribution.start(&[], &[], self.state.per_channel, None);
    }

    fn refresh_aggregates(&mut self) -> Vec<Effect> {
        let expected_cells = self.state.grid.as_ref().map(|g| g.cell_count());
        let mut effects = Vec::new();
        for side in ClusterSide::BOTH {
            let indices = match side {
                ClusterSide::A => self.state.selection.cluster_a().to_vec(),
                ClusterSide::B => self.state.selection.cluster_b().to_vec(),
            };
            let start = self.aggregators[side.index()].start(
                &indices,
                self.state.channel,
                self.state.time_bin,
                expected_cells,
            );
            match start {
                AggregateStart::NoData => {
                    self.state.aggregates[side.index()] = Some(Vec::new());
                }
                AggregateStart::Fetch { ticket, request } => {
                    effects.push(Effect::FetchAggregate { side, ticket, request });
                }
            }
        }
        effects
    }

    fn refresh_contribution(&mut self) -> Vec<Effect> {
        let expected_cells = self.state.grid.as_ref().map(|g| g.cell_count());
        let a = self.state.selection.cluster_a().to_vec();
        let b = self.state.selection.cluster_b().to_vec();
        match self.contribution.start(&a, &b, self.state.per_channel, expected_cells) {
            ContributionStart::Cleared => {
                self.state.contribution = None;
                Vec::new()
            }
            ContributionStart::Fetch { ticket, request } => {
                vec![Effect::FetchContribution { ticket, request }]
            }
        }
    }

    fn push_notice(&mut self, message: String) {
        warn!("{message}");
        self.next_notice_id += 1;
        self.state.notices.push(Notice { id: self.next_notice_id, message });
    }

    /// Drawable marks for the contribution comparison, or empty while the
    /// grid or data is not ready. Reduction errors degrade to empty output.
    pub fn contribution_cells(&self, policy: &SizePolicy) -> Vec<RenderCell> {
        let (Some(grid), Some(data)) = (&self.state.grid, &self.state.contribution) else {
            return Vec::new();
        };
        let reduced = match data.reduce(self.state.time_selector) {
            Ok(reduced) => reduced,
            Err(err) => {
                warn!("contribution reduction failed: {err}");
                return Vec::new();
            }
        };
        match build_render_cells(grid, &reduced.values, &reduced.dominance, policy) {
            Ok(cells) => cells,
            Err(err) => {
                warn!("contribution render skipped: {err}");
                Vec::new()
            }
        }
    }

    /// Drawable marks for one cluster's aggregated statistic, colored by
    /// side. Empty while the grid or data is not ready.
    pub fn aggregate_cells(&self, side: ClusterSide, policy: &SizePolicy) -> Vec<RenderCell> {
        let Some(grid) = &self.state.grid else {
            return Vec::new();
        };
        let Some(values) = self.state.aggregate(side) else {
            return Vec::new();
        };
        if values.len() != grid.cell_count() {
            // Covers the "no data" empty array as well as any residue from
            // a grid swap.
            return Vec::new();
        }
        let sizes = policy.sizes(values);
        let color = match side {
            ClusterSide::A => DominanceColor::ClusterA,
            ClusterSide::B => DominanceColor::ClusterB,
        };
        grid.iter_centers()
            .map(|(i, (x, y))| RenderCell {
                x,
                y,
                value: values[i],
                sign: 0.0,
                size: sizes[i],
                color,
            })
            .collect()
    }
}
