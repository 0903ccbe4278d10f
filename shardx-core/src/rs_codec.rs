//! Reed-Solomon encode and decode over a cached systematic coding matrix.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::coding_matrix::coding_matrix;
use crate::compute::{ComputeBackend, RayonBackend};
use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::matrix::Matrix;

pub struct RsCodec {
    config: CodecConfig,
    matrix: Arc<Matrix>,
    backend: Box<dyn ComputeBackend>,
}

impl RsCodec {
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self> {
        Self::from_config(CodecConfig::new(data_shards, parity_shards)?)
    }

    pub fn from_config(config: CodecConfig) -> Result<Self> {
        Self::with_backend(config, RayonBackend::default())
    }

    pub fn with_backend(config: CodecConfig, backend: impl ComputeBackend + 'static) -> Result<Self> {
        let matrix = coding_matrix(&config)?;
        Ok(Self { config, matrix, backend: Box::new(backend) })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Computes the parity shards for `data_shards`.
    ///
    /// Exactly `data_shards` inputs of one common length are required. The
    /// returned parity shards have that same length.
    pub fn encode_parity<S: AsRef<[u8]>>(&self, data_shards: &[S]) -> Result<Vec<Vec<u8>>> {
        let k = self.config.data_shards;
        if data_shards.len() != k {
            return Err(CodecError::ShardCountMismatch { expected: k, got: data_shards.len() });
        }
        let shard_size = data_shards[0].as_ref().len();
        let inputs = check_lengths(data_shards.iter().map(|s| s.as_ref()), shard_size)?;

        let rows: Vec<&[u8]> =
            (k..self.config.total_shards()).map(|r| self.matrix.row(r)).collect();
        let parity = self.apply(&rows, &inputs, shard_size);
        debug!(k, m = self.config.parity_shards, shard_size, "encoded parity shards");
        Ok(parity)
    }

    /// Returns all `total_shards` shards, rebuilding those absent from
    /// `present` (keyed by original shard index).
    ///
    /// The lowest `data_shards` present indices are used for reconstruction.
    pub fn decode_missing<S: AsRef<[u8]>>(
        &self,
        present: &BTreeMap<usize, S>,
        shard_size: usize,
    ) -> Result<Vec<Vec<u8>>> {
        let k = self.config.data_shards;
        let total = self.config.total_shards();
        for (&index, shard) in present {
            if index >= total {
                return Err(CodecError::ShardIndexOutOfRange { index, total });
            }
            let got = shard.as_ref().len();
            if got != shard_size {
                return Err(CodecError::ShardSizeMismatch { index, expected: shard_size, got });
            }
        }
        if present.len() < k {
            return Err(CodecError::InsufficientShards { needed: k, got: present.len() });
        }

        let mut shards: Vec<Vec<u8>> = (0..total)
            .map(|i| present.get(&i).map(|s| s.as_ref().to_vec()).unwrap_or_default())
            .collect();

        let missing_data: Vec<usize> = (0..k).filter(|i| !present.contains_key(i)).collect();
        if !missing_data.is_empty() {
            let chosen: Vec<usize> = present.keys().take(k).copied().collect();
            let decode_matrix = self.matrix.submatrix(&chosen)?.invert()?;
            let rows: Vec<&[u8]> = missing_data.iter().map(|&i| decode_matrix.row(i)).collect();
            let inputs: Vec<&[u8]> = chosen.iter().map(|&i| shards[i].as_slice()).collect();
            let rebuilt = self.apply(&rows, &inputs, shard_size);
            debug!(k, ?chosen, ?missing_data, shard_size, "reconstructed data shards");
            for (i, shard) in missing_data.into_iter().zip(rebuilt) {
                shards[i] = shard;
            }
        }

        let missing_parity: Vec<usize> = (k..total).filter(|i| !present.contains_key(i)).collect();
        if !missing_parity.is_empty() {
            let rows: Vec<&[u8]> = missing_parity.iter().map(|&r| self.matrix.row(r)).collect();
            let inputs: Vec<&[u8]> = shards[..k].iter().map(Vec::as_slice).collect();
            let rebuilt = self.apply(&rows, &inputs, shard_size);
            debug!(k, ?missing_parity, shard_size, "regenerated parity shards");
            for (i, shard) in missing_parity.into_iter().zip(rebuilt) {
                shards[i] = shard;
            }
        }
        Ok(shards)
    }

    /// Recomputes parity from the data shards of a complete shard set and
    /// reports whether every stored parity shard matches.
    pub fn verify_parity<S: AsRef<[u8]>>(&self, shards: &[S]) -> Result<bool> {
        let k = self.config.data_shards;
        let total = self.config.total_shards();
        if shards.len() != total {
            return Err(CodecError::ShardCountMismatch { expected: total, got: shards.len() });
        }
        let shard_size = shards[0].as_ref().len();
        check_lengths(shards.iter().map(|s| s.as_ref()), shard_size)?;
        let expected = self.encode_parity(&shards[..k])?;
        Ok(expected.iter().zip(&shards[k..]).all(|(e, s)| e.as_slice() == s.as_ref()))
    }

    fn apply(&self, rows: &[&[u8]], inputs: &[&[u8]], shard_size: usize) -> Vec<Vec<u8>> {
        let mut out = vec![vec![0u8; shard_size]; rows.len()];
        let mut refs: Vec<&mut [u8]> = out.iter_mut().map(Vec::as_mut_slice).collect();
        self.backend.apply(rows, inputs, &mut refs);
        out
    }
}

fn check_lengths<'a>(
    shards: impl Iterator<Item = &'a [u8]>,
    shard_size: usize,
) -> Result<Vec<&'a [u8]>> {
    shards
        .enumerate()
        .map(|(index, s)| {
            if s.len() == shard_size {
                Ok(s)
            } else {
                Err(CodecError::ShardSizeMismatch { index, expected: shard_size, got: s.len() })
            }
        })
        .collect()
}

/// Parity shards for `data_shards`, using `parity_shards` parity rows.
pub fn encode_parity<S: AsRef<[u8]>>(data_shards: &[S], parity_shards: usize) -> Result<Vec<Vec<u8>>> {
    RsCodec::new(data_shards.len(), parity_shards)?.encode_parity(data_shards)
}

/// Complete shard set rebuilt from the shards in `present`.
pub fn decode_missing<S: AsRef<[u8]>>(
    present: &BTreeMap<usize, S>,
    data_shards: usize,
    parity_shards: usize,
    shard_size: usize,
) -> Result<Vec<Vec<u8>>> {
    RsCodec::new(data_shards, parity_shards)?.decode_missing(present, shard_size)
}
