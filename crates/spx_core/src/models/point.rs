//! Analyzed games as points in the embedding view
//!
//! One `GamePoint` per analyzed game. Points are produced by the backend's
//! initialization (or embedding recompute) and are immutable until the next
//! one; everything selection-related refers to them by index into that list.

use serde::{Deserialize, Serialize};

/// Season a game belongs to, for datasets that mix seasons in one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonTag {
    S2022_23,
    S2023_24,
}

impl SeasonTag {
    /// Numeric label used by legacy combined ids (0 = 2022-23, 1 = 2023-24).
    pub fn label(&self) -> u32 {
        match self {
            SeasonTag::S2022_23 => 0,
            SeasonTag::S2023_24 => 1,
        }
    }

    pub fn from_label(label: u32) -> Option<Self> {
        match label {
            0 => Some(SeasonTag::S2022_23),
            1 => Some(SeasonTag::S2023_24),
            _ => None,
        }
    }
}

/// Identity of one observed game.
///
/// The season is carried as an explicit optional tag. Older exports encoded
/// it arithmetically as `season * 1_000_000 + game_id`, which collides once
/// ids grow past the offset; here the encoded form survives only as a
/// conversion for those legacy ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservationId {
    pub base_id: u32,
    pub season: Option<SeasonTag>,
}

/// Offset used by legacy season-combined game ids.
const LEGACY_SEASON_OFFSET: u32 = 1_000_000;

impl ObservationId {
    pub fn new(base_id: u32) -> Self {
        Self { base_id, season: None }
    }

    pub fn with_season(base_id: u32, season: SeasonTag) -> Self {
        Self { base_id, season: Some(season) }
    }

    /// Decode a legacy season-combined id.
    ///
    /// Total: ids whose quotient is not a known season label (including every
    /// plain id below the offset) come back untagged with the raw value as
    /// `base_id`, never split.
    pub fn from_legacy(raw: u32) -> Self {
        match SeasonTag::from_label(raw / LEGACY_SEASON_OFFSET) {
            Some(season) if raw >= LEGACY_SEASON_OFFSET => Self {
                base_id: raw % LEGACY_SEASON_OFFSET,
                season: Some(season),
            },
            _ => Self { base_id: raw, season: None },
        }
    }

    /// Re-encode into the legacy combined form, for display or export only.
    pub fn legacy_encoded(&self) -> u32 {
        match self.season {
            Some(season) => season.label() * LEGACY_SEASON_OFFSET + self.base_id,
            None => self.base_id,
        }
    }
}

/// One analyzed game as shown in the embedding view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePoint {
    /// 2D projection coordinate.
    pub embedding: (f32, f32),
    /// Index into the session's group names (player or team-season).
    pub group_label: usize,
    pub observation: ObservationId,
}
