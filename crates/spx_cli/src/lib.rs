//! # spx_cli - offline host for the shot pattern explorer
//!
//! Everything the core treats as remote, served locally: session binning,
//! an in-process analysis backend, a compressed session cache and a
//! deterministic synthetic-data generator. The binary in `main.rs` wires
//! them to a small command line.

pub mod cache;
pub mod local;
pub mod session;
pub mod synth;

pub use cache::{read_cache, verify_cache, write_cache, CacheMetadata, SCHEMA_VERSION};
pub use local::LocalBackend;
pub use session::{GameRecord, SessionInput, SessionTensor, ShotEvent};
pub use synth::{synth_session, SynthConfig};
