//! Shot Pattern Explorer CLI
//!
//! Generate synthetic sessions, build compressed session caches, and run a
//! two-cluster comparison end to end through the core store.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use spx_core::{
    Action, AnalysisBackend, ClusterSide, DominanceColor, Effect, ExplorerStore, SizePolicy,
    StatChannel, TimeSelector,
};
use spx_cli::{
    cache,
    local::LocalBackend,
    session::SessionInput,
    synth::{synth_session, SynthConfig},
};

#[derive(Parser)]
#[command(name = "spx")]
#[command(about = "Shot pattern explorer, offline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic session JSON file
    Synth {
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Games per group
        #[arg(long, default_value_t = 24)]
        games: usize,

        /// Shots per game
        #[arg(long, default_value_t = 80)]
        shots: usize,

        /// Output JSON file path
        #[arg(long)]
        out: PathBuf,
    },

    /// Build a compressed session cache from a session JSON file
    Bin {
        /// Input session JSON file
        #[arg(long)]
        r#in: PathBuf,

        /// Output cache file path
        #[arg(long)]
        out: PathBuf,
    },

    /// Compare two clusters of games and print a court summary
    Compare {
        /// Session file (.json, or a cache built by `bin`)
        #[arg(long)]
        session: PathBuf,

        /// Cluster A game indices, comma separated
        #[arg(long)]
        cluster_a: String,

        /// Cluster B game indices, comma separated
        #[arg(long)]
        cluster_b: String,

        /// Statistic for the per-cluster aggregates
        #[arg(long, default_value = "attempts")]
        channel: String,

        /// Restrict to one quarter (0-3); omit for the whole game
        #[arg(long)]
        time_bin: Option<usize>,

        /// How many cells to list
        #[arg(long, default_value_t = 8)]
        top: usize,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Synth { seed, games, shots, out } => {
            let config = SynthConfig { seed, games_per_group: games, shots_per_game: shots };
            let session = synth_session(&config);
            let json = serde_json::to_string_pretty(&session)?;
            std::fs::write(&out, json)
                .with_context(|| format!("Failed to write session: {}", out.display()))?;
            println!(
                "wrote {} games ({} groups) to {}",
                session.games.len(),
                session.group_names.len(),
                out.display()
            );
        }

        Commands::Bin { r#in, out } => {
            let session = load_session_json(&r#in)?;
            let metadata = cache::write_cache(&session, &out)?;
            cache::write_sidecar(&out, &metadata)?;
            println!(
                "cached {} games: {} -> {} bytes ({:.0}% of original), checksum {}",
                session.games.len(),
                metadata.original_size,
                metadata.compressed_size,
                metadata.compression_ratio * 100.0,
                &metadata.checksum[..12]
            );
        }

        Commands::Compare { session, cluster_a, cluster_b, channel, time_bin, top } => {
            compare(&session, &cluster_a, &cluster_b, &channel, time_bin, top)?;
        }
    }

    Ok(())
}

fn compare(
    session_path: &Path,
    cluster_a: &str,
    cluster_b: &str,
    channel: &str,
    time_bin: Option<usize>,
    top: usize,
) -> Result<()> {
    let input = load_session(session_path)?;
    let cluster_a = parse_indices(cluster_a).context("bad --cluster-a")?;
    let cluster_b = parse_indices(cluster_b).context("bad --cluster-b")?;
    let channel = parse_channel(channel)?;

    let backend = LocalBackend::new(input, spx_core::CourtGrid::nba_default());
    let snapshot = backend
        .init_snapshot()
        .map_err(|e| anyhow::anyhow!("initialization failed: {e}"))?;
    let group_names = snapshot.group_names.clone();

    let mut store = ExplorerStore::new();
    store.dispatch(Action::LoadSnapshot(snapshot));
    store.dispatch(Action::SetChannel(channel));
    store.dispatch(Action::SetTimeBin(time_bin));
    store.dispatch(Action::SetTimeSelector(match time_bin {
        Some(t) => TimeSelector::Bin(t),
        None => TimeSelector::All,
    }));

    drive(&mut store, &backend, Action::Select(cluster_a.clone()));
    drive(&mut store, &backend, Action::Select(cluster_b.clone()));

    for notice in &store.state().notices {
        eprintln!("notice: {}", notice.message);
    }

    println!("groups: {}", group_names.join(" vs "));
    println!(
        "cluster A: {} games {:?}  |  cluster B: {} games {:?}",
        cluster_a.len(),
        cluster_a,
        cluster_b.len(),
        cluster_b
    );

    for side in ClusterSide::BOTH {
        if let Some(values) = store.state().aggregate(side) {
            let total: f32 = values.iter().sum();
            println!("{channel} total, cluster {side:?}: {total}");
        }
    }

    let cells = store.contribution_cells(&SizePolicy::dynamic());
    if cells.is_empty() {
        bail!("no contribution data; were both clusters non-empty and in range?");
    }

    let (mut a_cells, mut b_cells, mut neutral) = (0usize, 0usize, 0usize);
    for cell in &cells {
        match cell.color {
            DominanceColor::ClusterA => a_cells += 1,
            DominanceColor::ClusterB => b_cells += 1,
            DominanceColor::Neutral => neutral += 1,
        }
    }
    println!("cells leaning A: {a_cells}, leaning B: {b_cells}, neutral: {neutral}");

    let mut ranked: Vec<_> = cells.iter().filter(|c| c.value > 0.0).collect();
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));

    println!("top {} cells by contribution:", top.min(ranked.len()));
    println!("{:>8} {:>8} {:>10} {:>8}  side", "x", "y", "value", "size");
    for cell in ranked.iter().take(top) {
        let side = match cell.color {
            DominanceColor::ClusterA => "A",
            DominanceColor::ClusterB => "B",
            DominanceColor::Neutral => "-",
        };
        println!(
            "{:>8.1} {:>8.1} {:>10.4} {:>8.2}  {side}",
            cell.x, cell.y, cell.value, cell.size
        );
    }

    Ok(())
}

/// Perform the store's requested fetches against the local backend until the
/// action settles, the way a UI event loop would resume completed calls.
fn drive(store: &mut ExplorerStore, backend: &LocalBackend, action: Action) {
    let mut pending = store.dispatch(action);
    while let Some(effect) = pending.pop() {
        let followups = match effect {
            Effect::FetchAggregate { side, ticket, request } => {
                let outcome = backend.aggregate(&request);
                store.dispatch(Action::AggregateDone { side, ticket, outcome })
            }
            Effect::FetchContribution { ticket, request } => {
                let outcome = backend.compute_contribution(&request);
                store.dispatch(Action::ContributionDone { ticket, outcome })
            }
        };
        pending.extend(followups);
    }
}

fn load_session(path: &Path) -> Result<SessionInput> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_session_json(path),
        _ => cache::read_cache(path),
    }
}

fn load_session_json(path: &Path) -> Result<SessionInput> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {}", path.display()))?;
    serde_json::from_str(&json).context("Failed to parse session JSON")
}

fn parse_indices(s: &str) -> Result<Vec<usize>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<usize>().with_context(|| format!("not an index: {part}")))
        .collect()
}

fn parse_channel(s: &str) -> Result<StatChannel> {
    match s {
        "attempts" => Ok(StatChannel::Attempts),
        "makes" => Ok(StatChannel::Makes),
        "points" => Ok(StatChannel::Points),
        "misses" => Ok(StatChannel::Misses),
        other => bail!("unknown channel {other:?} (attempts, makes, points, misses)"),
    }
}
