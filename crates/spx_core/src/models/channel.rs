//! Statistic channels and time selection

use serde::{Deserialize, Serialize};

/// Per-cell statistic channel of the session tensor.
///
/// Wire indices are fixed by the session tensor layout: attempts 0, makes 1,
/// points 2, misses 3. Points are raw point totals (2 or 3 per make); the
/// effective field goal weighting is derived from them as `points / 2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatChannel {
    #[default]
    Attempts,
    Makes,
    Points,
    Misses,
}

impl StatChannel {
    pub const ALL: [StatChannel; 4] = [
        StatChannel::Attempts,
        StatChannel::Makes,
        StatChannel::Points,
        StatChannel::Misses,
    ];

    /// Index into the session tensor's channel axis.
    #[inline]
    pub fn wire_index(&self) -> usize {
        match self {
            StatChannel::Attempts => 0,
            StatChannel::Makes => 1,
            StatChannel::Points => 2,
            StatChannel::Misses => 3,
        }
    }

    pub fn from_wire_index(idx: usize) -> Option<Self> {
        StatChannel::ALL.get(idx).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatChannel::Attempts => "attempts",
            StatChannel::Makes => "makes",
            StatChannel::Points => "points",
            StatChannel::Misses => "misses",
        }
    }
}

impl std::fmt::Display for StatChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which game-time segment a reduction covers.
///
/// `All` sums every time bin elementwise; `Bin(i)` selects one slice. This
/// drives the client-side reduction of already-fetched tensors and is
/// distinct from the `time_bin` request parameter of aggregation calls,
/// where the backend performs the all-time reduction itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSelector {
    All,
    Bin(usize),
}

impl Default for TimeSelector {
    fn default() -> Self {
        TimeSelector::All
    }
}
