//! Deterministic synthetic sessions
//!
//! Generates two stylistically distinct game populations so the comparison
//! loop has something to separate: a rim-pressure group shooting from short
//! range and a perimeter group living on the arc. Same seed, same session.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use spx_core::{ObservationId, SeasonTag};

use crate::session::{GameRecord, SessionInput, ShotEvent};

/// Three-point arc distance in court units (23.75 ft). Corner threes are
/// shorter in reality; the generator only uses the arc rule.
const THREE_POINT_RADIUS: f32 = 237.5;

#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub seed: u64,
    /// Games generated per group.
    pub games_per_group: usize,
    pub shots_per_game: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self { seed: 42, games_per_group: 24, shots_per_game: 80 }
    }
}

/// Shooting profile of one synthetic group.
struct GroupProfile {
    name: &'static str,
    embedding_center: (f32, f32),
    make_probability: f64,
}

const PROFILES: [GroupProfile; 2] = [
    GroupProfile {
        name: "Rim Pressure",
        embedding_center: (-2.5, 0.5),
        make_probability: 0.58,
    },
    GroupProfile {
        name: "Perimeter Motion",
        embedding_center: (2.5, -0.5),
        make_probability: 0.37,
    },
];

/// Generate a full session. Deterministic in `config.seed`.
pub fn synth_session(config: &SynthConfig) -> SessionInput {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let embedding_jitter = Normal::new(0.0f32, 0.8).expect("finite normal parameters");

    let mut games = Vec::with_capacity(config.games_per_group * PROFILES.len());
    for (label, profile) in PROFILES.iter().enumerate() {
        for game_no in 0..config.games_per_group {
            // Split each group across the two seasons.
            let season = if game_no < config.games_per_group / 2 {
                SeasonTag::S2022_23
            } else {
                SeasonTag::S2023_24
            };
            let base_id = (label * 10_000 + game_no) as u32 + 1;

            let shots = (0..config.shots_per_game)
                .map(|_| synth_shot(&mut rng, label, profile.make_probability))
                .collect();

            games.push(GameRecord {
                observation: ObservationId::with_season(base_id, season),
                group_label: label,
                embedding: (
                    profile.embedding_center.0 + embedding_jitter.sample(&mut rng),
                    profile.embedding_center.1 + embedding_jitter.sample(&mut rng),
                ),
                shots,
            });
        }
    }

    SessionInput {
        group_names: PROFILES.iter().map(|p| p.name.to_string()).collect(),
        games,
    }
}

fn synth_shot(rng: &mut ChaCha8Rng, label: usize, make_probability: f64) -> ShotEvent {
    let (loc_x, loc_y) = if label == 0 {
        // Short range around the rim.
        let x = Normal::new(0.0f32, 70.0).expect("finite normal parameters").sample(rng);
        let y = Normal::new(60.0f32, 50.0).expect("finite normal parameters").sample(rng);
        (x, y)
    } else {
        // On and around the arc, sweeping corner to corner.
        let radius = Normal::new(250.0f32, 25.0).expect("finite normal parameters").sample(rng);
        let angle = rng.gen_range(0.26f32..2.88); // ~15..165 degrees
        (radius * angle.cos(), radius * angle.sin())
    };

    let made = rng.gen_bool(make_probability);
    let distance = (loc_x * loc_x + loc_y * loc_y).sqrt();

    ShotEvent {
        loc_x,
        loc_y,
        period: rng.gen_range(1..=4),
        minutes_remaining: rng.gen_range(0..12),
        seconds_remaining: rng.gen_range(0..60),
        made,
        is_three: distance >= THREE_POINT_RADIUS,
    }
}
