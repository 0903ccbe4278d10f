//! JSON sidecar describing one encoded file.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::merkle;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ShardManifest {
    pub created_utc: String,
    pub file_name: String,
    pub file_size: u64,
    pub config: CodecConfig,
    pub shard_size: usize,
    /// BLAKE3 hex digest per shard, indexed by shard index.
    pub shard_hashes: Vec<String>,
    pub merkle_root_hex: String,
}

pub fn shard_digest(shard: &[u8]) -> [u8; 32] {
    *blake3::hash(shard).as_bytes()
}

impl ShardManifest {
    /// Records digests for a complete shard set (data then parity).
    pub fn build<S: AsRef<[u8]>>(
        file_name: &str,
        file_size: u64,
        config: CodecConfig,
        shards: &[S],
    ) -> Result<Self> {
        config.validate()?;
        check_file_name(file_name)?;
        if shards.len() != config.total_shards() {
            return Err(CodecError::ShardCountMismatch {
                expected: config.total_shards(),
                got: shards.len(),
            });
        }
        let shard_size = shards[0].as_ref().len();
        let mut digests = Vec::with_capacity(shards.len());
        for (index, s) in shards.iter().enumerate() {
            let s = s.as_ref();
            if s.len() != shard_size {
                return Err(CodecError::ShardSizeMismatch { index, expected: shard_size, got: s.len() });
            }
            digests.push(shard_digest(s));
        }
        Ok(Self {
            created_utc: chrono::Utc::now().to_rfc3339(),
            file_name: file_name.to_string(),
            file_size,
            config,
            shard_size,
            shard_hashes: digests.iter().map(|d| blake3::Hash::from(*d).to_hex().to_string()).collect(),
            merkle_root_hex: blake3::Hash::from(merkle::root(&digests)).to_hex().to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let mf: Self = serde_json::from_str(s)?;
        mf.config.validate()?;
        check_file_name(&mf.file_name)?;
        if mf.shard_hashes.len() != mf.config.total_shards() {
            return Err(CodecError::ShardCountMismatch {
                expected: mf.config.total_shards(),
                got: mf.shard_hashes.len(),
            });
        }
        Ok(mf)
    }

    /// Merkle root recomputed from the recorded shard digests. `None` when a
    /// recorded digest is not valid hex.
    pub fn recomputed_root_hex(&self) -> Option<String> {
        let leaves: Option<Vec<[u8; 32]>> = self
            .shard_hashes
            .iter()
            .map(|h| blake3::Hash::from_hex(h).ok().map(|d| *d.as_bytes()))
            .collect();
        leaves.map(|l| blake3::Hash::from(merkle::root(&l)).to_hex().to_string())
    }
}

/// Shard files live next to the manifest, so the name must be exactly one
/// normal path component.
fn check_file_name(name: &str) -> Result<()> {
    let mut parts = Path::new(name).components();
    match (parts.next(), parts.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(CodecError::InvalidFileName(name.to_string())),
    }
}
