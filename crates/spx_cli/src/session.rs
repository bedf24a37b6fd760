//! Shot events and session tensor binning
//!
//! A session file carries raw shot events per game; binning turns them into
//! the per-game `[time][cell][channel]` count tensor the local backend
//! aggregates over.
//!
//! ## Binning rules
//! - elapsed seconds from tip-off: `(period - 1) * 720 + (720 - (min * 60 + sec))`
//! - periods past regulation (> 4) are dropped
//! - shots outside the grid are dropped
//! - 720 s time bins, so regulation play spans 4 bins; a shot landing exactly
//!   on the final boundary is dropped with the overtime ones
//! - channels: attempts 0, makes 1, points 2, misses 3

use serde::{Deserialize, Serialize};

use spx_core::{CourtGrid, GamePoint, ObservationId, StatChannel};

/// Seconds per time bin and per period; one bin spans one quarter.
pub const TIME_BIN_SECONDS: u32 = 720;
/// Regulation periods kept by the binning.
pub const MAX_PERIODS: u32 = 4;
/// Time bins across regulation play.
pub const TIME_BINS: usize = 4;
/// Channel axis length (attempts, makes, points, misses).
pub const CHANNELS: usize = 4;

/// One shot attempt, court units in tenths of feet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotEvent {
    pub loc_x: f32,
    pub loc_y: f32,
    pub period: u32,
    pub minutes_remaining: u32,
    pub seconds_remaining: u32,
    pub made: bool,
    pub is_three: bool,
}

impl ShotEvent {
    /// Seconds since tip-off. Saturating: a clock reading past the period
    /// length clamps to the period start instead of wrapping.
    pub fn elapsed_seconds(&self) -> u32 {
        let remaining = self.minutes_remaining * 60 + self.seconds_remaining;
        self.period.saturating_sub(1) * TIME_BIN_SECONDS
            + TIME_BIN_SECONDS.saturating_sub(remaining)
    }

    /// Points scored by this shot.
    pub fn points(&self) -> u32 {
        match (self.made, self.is_three) {
            (false, _) => 0,
            (true, false) => 2,
            (true, true) => 3,
        }
    }
}

/// One game's shots plus its identity and embedding coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub observation: ObservationId,
    pub group_label: usize,
    pub embedding: (f32, f32),
    pub shots: Vec<ShotEvent>,
}

/// Raw session file: what `synth` writes and `bin`/`compare` read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInput {
    pub group_names: Vec<String>,
    pub games: Vec<GameRecord>,
}

impl SessionInput {
    /// Points for the initialization snapshot, one per game in file order.
    pub fn points(&self) -> Vec<GamePoint> {
        self.games
            .iter()
            .map(|g| GamePoint {
                embedding: g.embedding,
                group_label: g.group_label,
                observation: g.observation,
            })
            .collect()
    }
}

/// Dense per-game count tensor, laid out `[game][time][cell][channel]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTensor {
    grid: CourtGrid,
    games: usize,
    values: Vec<f32>,
}

impl SessionTensor {
    /// Bin every game's shots onto `grid`.
    pub fn build(input: &SessionInput, grid: CourtGrid) -> Self {
        let cells = grid.cell_count();
        let mut values = vec![0.0f32; input.games.len() * TIME_BINS * cells * CHANNELS];

        for (game_idx, game) in input.games.iter().enumerate() {
            for shot in &game.shots {
                if shot.period == 0 || shot.period > MAX_PERIODS {
                    continue;
                }
                let time_bin = (shot.elapsed_seconds() / TIME_BIN_SECONDS) as usize;
                if time_bin >= TIME_BINS {
                    continue;
                }
                let Some(cell) = grid.locate(shot.loc_x, shot.loc_y) else {
                    continue;
                };
                let base = ((game_idx * TIME_BINS + time_bin) * cells + cell) * CHANNELS;
                values[base + StatChannel::Attempts.wire_index()] += 1.0;
                if shot.made {
                    values[base + StatChannel::Makes.wire_index()] += 1.0;
                    values[base + StatChannel::Points.wire_index()] += shot.points() as f32;
                } else {
                    values[base + StatChannel::Misses.wire_index()] += 1.0;
                }
            }
        }

        Self { grid, games: input.games.len(), values }
    }

    pub fn grid(&self) -> &CourtGrid {
        &self.grid
    }

    pub fn games(&self) -> usize {
        self.games
    }

    pub fn time_bins(&self) -> usize {
        TIME_BINS
    }

    pub fn cells(&self) -> usize {
        self.grid.cell_count()
    }

    /// One count.
    #[inline]
    pub fn value(&self, game: usize, time_bin: usize, cell: usize, channel: StatChannel) -> f32 {
        let cells = self.grid.cell_count();
        self.values[((game * TIME_BINS + time_bin) * cells + cell) * CHANNELS
            + channel.wire_index()]
    }

    /// Sum of one channel over a set of games, one value per cell.
    ///
    /// `time_bin = None` folds all bins, mirroring the all-time reduction the
    /// remote service performs for aggregation requests.
    pub fn channel_sum(
        &self,
        games: &[usize],
        channel: StatChannel,
        time_bin: Option<usize>,
    ) -> Vec<f32> {
        let cells = self.grid.cell_count();
        let bins: Vec<usize> = match time_bin {
            Some(t) => vec![t],
            None => (0..TIME_BINS).collect(),
        };
        let mut out = vec![0.0f32; cells];
        for &game in games {
            for &t in &bins {
                for (cell, acc) in out.iter_mut().enumerate() {
                    *acc += self.value(game, t, cell, channel);
                }
            }
        }
        out
    }

    /// Per-game totals of one channel in one (time, cell) position.
    pub fn game_series(
        &self,
        games: &[usize],
        time_bin: usize,
        cell: usize,
        channel: StatChannel,
    ) -> Vec<f32> {
        games.iter().map(|&g| self.value(g, time_bin, cell, channel)).collect()
    }
}

/// Field goal percentage per cell with a zero-attempt guard.
pub fn fg_pct(makes: &[f32], attempts: &[f32]) -> Vec<f32> {
    makes
        .iter()
        .zip(attempts)
        .map(|(m, a)| if *a > 0.0 { m / a } else { 0.0 })
        .collect()
}

/// Effective field goal percentage per cell: `(points / 2) / attempts`,
/// which equals `(FGM + 0.5 * 3PM) / FGA`.
pub fn efg_pct(points: &[f32], attempts: &[f32]) -> Vec<f32> {
    points
        .iter()
        .zip(attempts)
        .map(|(p, a)| if *a > 0.0 { (p / 2.0) / a } else { 0.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(x: f32, y: f32, period: u32, min: u32, sec: u32, made: bool, three: bool) -> ShotEvent {
        ShotEvent {
            loc_x: x,
            loc_y: y,
            period,
            minutes_remaining: min,
            seconds_remaining: sec,
            made,
            is_three: three,
        }
    }

    fn one_game_session(shots: Vec<ShotEvent>) -> SessionInput {
        SessionInput {
            group_names: vec!["Test".into()],
            games: vec![GameRecord {
                observation: ObservationId::new(1),
                group_label: 0,
                embedding: (0.0, 0.0),
                shots,
            }],
        }
    }

    fn small_grid() -> CourtGrid {
        CourtGrid::new(vec![0.0, 1.0, 2.0], vec![0.0, 10.0, 20.0]).unwrap()
    }

    #[test]
    fn test_elapsed_seconds() {
        // Start of game: 12:00 left in period 1.
        assert_eq!(shot(0.0, 0.0, 1, 12, 0, false, false).elapsed_seconds(), 0);
        // 3:30 left in period 2.
        assert_eq!(shot(0.0, 0.0, 2, 3, 30, false, false).elapsed_seconds(), 720 + 510);
        // Buzzer of period 4.
        assert_eq!(shot(0.0, 0.0, 4, 0, 0, false, false).elapsed_seconds(), 2880);
        // Malformed clock readings clamp instead of wrapping.
        assert_eq!(shot(0.0, 0.0, 2, 13, 30, false, false).elapsed_seconds(), 720);
        assert_eq!(shot(0.0, 0.0, 0, 12, 0, false, false).elapsed_seconds(), 0);
    }

    #[test]
    fn test_period_zero_dropped() {
        let input = one_game_session(vec![shot(0.5, 5.0, 0, 10, 0, true, false)]);
        let tensor = SessionTensor::build(&input, small_grid());
        let all = tensor.channel_sum(&[0], StatChannel::Attempts, None);
        assert!(all.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_binning_channels() {
        let input = one_game_session(vec![
            shot(0.5, 5.0, 1, 10, 0, true, false),  // cell 0, 2 points
            shot(0.5, 5.0, 1, 8, 0, true, true),    // cell 0, 3 points
            shot(0.5, 5.0, 1, 6, 0, false, false),  // cell 0, miss
            shot(1.5, 15.0, 3, 6, 0, true, false),  // cell 3, later bin
        ]);
        let tensor = SessionTensor::build(&input, small_grid());

        assert_eq!(tensor.value(0, 0, 0, StatChannel::Attempts), 3.0);
        assert_eq!(tensor.value(0, 0, 0, StatChannel::Makes), 2.0);
        assert_eq!(tensor.value(0, 0, 0, StatChannel::Points), 5.0);
        assert_eq!(tensor.value(0, 0, 0, StatChannel::Misses), 1.0);
        assert_eq!(tensor.value(0, 2, 3, StatChannel::Attempts), 1.0);
    }

    #[test]
    fn test_overtime_and_buzzer_dropped() {
        let input = one_game_session(vec![
            shot(0.5, 5.0, 5, 10, 0, true, false), // overtime
            shot(0.5, 5.0, 4, 0, 0, true, false),  // elapsed 2880 -> bin 4
        ]);
        let tensor = SessionTensor::build(&input, small_grid());
        let all = tensor.channel_sum(&[0], StatChannel::Attempts, None);
        assert!(all.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_out_of_grid_dropped() {
        let input = one_game_session(vec![
            shot(-0.5, 5.0, 1, 10, 0, true, false),
            shot(2.0, 5.0, 1, 10, 0, true, false), // on the upper edge
        ]);
        let tensor = SessionTensor::build(&input, small_grid());
        let all = tensor.channel_sum(&[0], StatChannel::Attempts, None);
        assert!(all.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_channel_sum_time_slicing() {
        let input = one_game_session(vec![
            shot(0.5, 5.0, 1, 10, 0, false, false),
            shot(0.5, 5.0, 2, 10, 0, false, false),
        ]);
        let tensor = SessionTensor::build(&input, small_grid());

        assert_eq!(tensor.channel_sum(&[0], StatChannel::Attempts, Some(0)), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(tensor.channel_sum(&[0], StatChannel::Attempts, Some(1)), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(tensor.channel_sum(&[0], StatChannel::Attempts, None), vec![2.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_percentages_guard_zero_attempts() {
        let attempts = vec![4.0, 0.0];
        let makes = vec![2.0, 0.0];
        let points = vec![5.0, 0.0];
        assert_eq!(fg_pct(&makes, &attempts), vec![0.5, 0.0]);
        assert_eq!(efg_pct(&points, &attempts), vec![0.625, 0.0]);
    }
}
