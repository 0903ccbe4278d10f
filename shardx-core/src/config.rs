//! Shard-count configuration shared by every coding call.

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// Size in bytes of the big-endian file length header that prefixes the
/// concatenated data-shard stream.
pub const HEADER_SIZE: usize = 4;

/// GF(2^8) offers 256 distinct Vandermonde row generators.
pub const MAX_TOTAL_SHARDS: usize = 256;

/// Number of data and parity shards for one encoding.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CodecConfig {
    pub data_shards: usize,
    pub parity_shards: usize,
}

impl CodecConfig {
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self> {
        if data_shards == 0 {
            return Err(CodecError::InvalidConfig("data_shards must be at least 1".into()));
        }
        if parity_shards == 0 {
            return Err(CodecError::InvalidConfig("parity_shards must be at least 1".into()));
        }
        if data_shards.checked_add(parity_shards).filter(|&t| t <= MAX_TOTAL_SHARDS).is_none() {
            return Err(CodecError::InvalidConfig(format!(
                "data_shards ({data_shards}) + parity_shards ({parity_shards}) exceeds {MAX_TOTAL_SHARDS}"
            )));
        }
        Ok(Self { data_shards, parity_shards })
    }

    /// Saturates for configs that never went through [`CodecConfig::new`].
    pub fn total_shards(&self) -> usize {
        self.data_shards.saturating_add(self.parity_shards)
    }

    /// Manifests come from disk, so re-check what `new` enforces.
    pub fn validate(&self) -> Result<()> {
        Self::new(self.data_shards, self.parity_shards).map(|_| ())
    }
}

impl Default for CodecConfig {
    /// 4 data + 2 parity.
    fn default() -> Self {
        Self { data_shards: 4, parity_shards: 2 }
    }
}
