//! Session cache files
//!
//! Session JSON → MessagePack → LZ4 with a SHA-256 checksum, plus a JSON
//! metadata sidecar. Loading verifies the checksum before decoding.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Bump when the session file layout changes.
pub const SCHEMA_VERSION: &str = "v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub schema_version: String,
    /// SHA-256 of the compressed bytes, hex.
    pub checksum: String,
    /// RFC3339 creation time.
    pub created_at: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_ratio: f64,
}

/// Serialize, compress and write `value`, returning the cache metadata.
pub fn write_cache<T: Serialize>(value: &T, out: &Path) -> Result<CacheMetadata> {
    let msgpack_bytes = rmp_serde::to_vec(value).context("Failed to serialize to MessagePack")?;
    let original_size = msgpack_bytes.len() as u64;

    let compressed = lz4_flex::compress_prepend_size(&msgpack_bytes);
    let compressed_size = compressed.len() as u64;

    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = format!("{:x}", hasher.finalize());

    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    fs::write(out, &compressed)
        .with_context(|| format!("Failed to write cache file: {}", out.display()))?;

    Ok(CacheMetadata {
        schema_version: SCHEMA_VERSION.to_string(),
        checksum,
        created_at: chrono::Utc::now().to_rfc3339(),
        original_size,
        compressed_size,
        compression_ratio: compressed_size as f64 / original_size as f64,
    })
}

/// Whether the file on disk still hashes to `expected_checksum`.
pub fn verify_cache(cache_file: &Path, expected_checksum: &str) -> Result<bool> {
    let bytes = fs::read(cache_file)
        .with_context(|| format!("Failed to read cache file: {}", cache_file.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()) == expected_checksum)
}

/// Read a cache file back, checking it against its metadata sidecar when one
/// sits next to it.
pub fn read_cache<T: DeserializeOwned>(cache_file: &Path) -> Result<T> {
    if let Some(metadata) = read_sidecar(cache_file)? {
        if metadata.schema_version != SCHEMA_VERSION {
            bail!(
                "cache schema mismatch: file is {}, expected {}",
                metadata.schema_version,
                SCHEMA_VERSION
            );
        }
        if !verify_cache(cache_file, &metadata.checksum)? {
            bail!("cache checksum mismatch: {}", cache_file.display());
        }
    }

    let compressed = fs::read(cache_file)
        .with_context(|| format!("Failed to read cache file: {}", cache_file.display()))?;
    let msgpack_bytes =
        lz4_flex::decompress_size_prepended(&compressed).context("Failed to decompress LZ4")?;
    rmp_serde::from_slice(&msgpack_bytes).context("Failed to deserialize MessagePack")
}

/// Conventional sidecar path: `<cache>.meta.json`.
pub fn sidecar_path(cache_file: &Path) -> std::path::PathBuf {
    let mut name = cache_file.as_os_str().to_owned();
    name.push(".meta.json");
    name.into()
}

/// Write the metadata sidecar next to the cache file.
pub fn write_sidecar(cache_file: &Path, metadata: &CacheMetadata) -> Result<()> {
    let path = sidecar_path(cache_file);
    let json = serde_json::to_string_pretty(metadata)?;
    fs::write(&path, json)
        .with_context(|| format!("Failed to write metadata: {}", path.display()))
}

fn read_sidecar(cache_file: &Path) -> Result<Option<CacheMetadata>> {
    let path = sidecar_path(cache_file);
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
    Ok(Some(serde_json::from_str(&json).context("Failed to parse cache metadata")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spx_core::ObservationId;
    use tempfile::tempdir;

    use crate::session::{GameRecord, SessionInput};

    fn session() -> SessionInput {
        SessionInput {
            group_names: vec!["A".into(), "B".into()],
            games: vec![GameRecord {
                observation: ObservationId::new(7),
                group_label: 0,
                embedding: (1.0, -1.0),
                shots: Vec::new(),
            }],
        }
    }

    #[test]
    fn test_roundtrip_with_sidecar() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("session.spc");

        let metadata = write_cache(&session(), &path)?;
        write_sidecar(&path, &metadata)?;

        assert_eq!(metadata.schema_version, SCHEMA_VERSION);
        assert!(verify_cache(&path, &metadata.checksum)?);

        let loaded: SessionInput = read_cache(&path)?;
        assert_eq!(loaded, session());
        Ok(())
    }

    #[test]
    fn test_tampered_cache_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("session.spc");

        let metadata = write_cache(&session(), &path)?;
        write_sidecar(&path, &metadata)?;

        let mut bytes = fs::read(&path)?;
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        fs::write(&path, &bytes)?;

        assert!(!verify_cache(&path, &metadata.checksum)?);
        assert!(read_cache::<SessionInput>(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_cache_without_sidecar_loads() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("session.spc");
        write_cache(&session(), &path)?;

        let loaded: SessionInput = read_cache(&path)?;
        assert_eq!(loaded.games.len(), 1);
        Ok(())
    }
}
