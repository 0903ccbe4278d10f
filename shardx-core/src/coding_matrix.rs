//! Systematic coding matrix construction and the process-wide cache.
//!
//! The matrix is `total_shards x data_shards`. Its top block is the identity,
//! so data shards pass through encoding unchanged, and every square submatrix
//! formed from any `data_shards` of its rows is invertible.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::trace;

use crate::config::CodecConfig;
use crate::error::Result;
use crate::galois;
use crate::matrix::Matrix;

/// `rows x cols` Vandermonde matrix with entry `(r, c) = r^c`.
pub fn vandermonde(rows: usize, cols: usize) -> Matrix {
    let mut m = Matrix::zeros(rows, cols);
    for r in 0..rows {
        for c in 0..cols {
            m.set(r, c, galois::pow(r as u8, c));
        }
    }
    m
}

/// Builds the coding matrix for `config` without touching the cache.
///
/// The Vandermonde matrix is right-multiplied by the inverse of its top
/// square block. Column operations preserve the invertibility of every
/// `data_shards`-row subset, and the top block becomes the identity.
pub fn build_coding_matrix(config: &CodecConfig) -> Result<Matrix> {
    config.validate()?;
    let k = config.data_shards;
    let v = vandermonde(config.total_shards(), k);
    let top: Vec<usize> = (0..k).collect();
    let top_inv = v.submatrix(&top)?.invert()?;
    v.multiply(&top_inv)
}

type Cache = RwLock<HashMap<CodecConfig, Arc<Matrix>>>;

static CACHE: OnceLock<Cache> = OnceLock::new();

/// Shared coding matrix for `config`, built on first request.
pub fn coding_matrix(config: &CodecConfig) -> Result<Arc<Matrix>> {
    let cache = CACHE.get_or_init(|| RwLock::new(HashMap::new()));
    if let Some(m) = cache.read().unwrap_or_else(|e| e.into_inner()).get(config) {
        trace!(k = config.data_shards, m = config.parity_shards, "coding matrix cache hit");
        return Ok(Arc::clone(m));
    }
    let built = Arc::new(build_coding_matrix(config)?);
    trace!(k = config.data_shards, m = config.parity_shards, "coding matrix cache miss");
    let mut guard = cache.write().unwrap_or_else(|e| e.into_inner());
    // A concurrent builder may have won the race; both results are identical.
    let entry = guard.entry(*config).or_insert(built);
    Ok(Arc::clone(entry))
}
