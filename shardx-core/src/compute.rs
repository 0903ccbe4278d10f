use rayon::prelude::*;

use crate::galois;

/// Default byte span each rayon task processes.
pub const DEFAULT_SPAN: usize = 64 * 1024;

/// A compute backend that applies coefficient rows to equal-length shards.
pub trait ComputeBackend: Send + Sync {
    /// Fills each output with a weighted sum of the inputs.
    /// - rows: one coefficient row per output, each `inputs.len()` wide
    /// - inputs: shards of length C each
    /// - outputs: zeroed slices of length C each
    ///
    /// `outputs[r][b] = sum_j rows[r][j] * inputs[j][b]` over GF(2^8).
    fn apply(&self, rows: &[&[u8]], inputs: &[&[u8]], outputs: &mut [&mut [u8]]);
}

/// Single-threaded implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl ComputeBackend for CpuBackend {
    fn apply(&self, rows: &[&[u8]], inputs: &[&[u8]], outputs: &mut [&mut [u8]]) {
        for (row, out) in rows.iter().zip(outputs.iter_mut()) {
            for (&coef, input) in row.iter().zip(inputs) {
                galois::mul_add_slice(coef, input, out);
            }
        }
    }
}

/// Splits every output shard into byte-offset ranges of `span` bytes and
/// computes the ranges in parallel. Ranges are independent.
#[derive(Debug, Clone, Copy)]
pub struct RayonBackend {
    span: usize,
}

impl RayonBackend {
    pub fn new(span: usize) -> Self {
        Self { span: span.max(1) }
    }
}

impl Default for RayonBackend {
    fn default() -> Self {
        Self::new(DEFAULT_SPAN)
    }
}

impl ComputeBackend for RayonBackend {
    fn apply(&self, rows: &[&[u8]], inputs: &[&[u8]], outputs: &mut [&mut [u8]]) {
        let span = self.span;
        outputs.par_iter_mut().zip(rows.par_iter()).for_each(|(out, row)| {
            out.par_chunks_mut(span).enumerate().for_each(|(ci, range)| {
                let start = ci * span;
                let end = start + range.len();
                for (&coef, input) in row.iter().zip(inputs) {
                    galois::mul_add_slice(coef, &input[start..end], range);
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(backend: &dyn ComputeBackend, rows: &[Vec<u8>], inputs: &[Vec<u8>]) -> Vec<Vec<u8>> {
        let len = inputs[0].len();
        let rows: Vec<&[u8]> = rows.iter().map(Vec::as_slice).collect();
        let inputs: Vec<&[u8]> = inputs.iter().map(Vec::as_slice).collect();
        let mut outs = vec![vec![0u8; len]; rows.len()];
        let mut refs: Vec<&mut [u8]> = outs.iter_mut().map(Vec::as_mut_slice).collect();
        backend.apply(&rows, &inputs, &mut refs);
        outs
    }

    #[test]
    fn identity_rows_copy_inputs() {
        let inputs = vec![vec![1u8, 2, 3], vec![4, 5, 6]];
        let rows = vec![vec![1u8, 0], vec![0, 1]];
        assert_eq!(run(&CpuBackend, &rows, &inputs), inputs);
    }

    #[test]
    fn rayon_matches_cpu_with_ragged_tail() {
        fastrand::seed(7);
        let inputs: Vec<Vec<u8>> =
            (0..5).map(|_| (0..1000).map(|_| fastrand::u8(..)).collect()).collect();
        let rows: Vec<Vec<u8>> = (0..3).map(|_| (0..5).map(|_| fastrand::u8(..)).collect()).collect();
        let cpu = run(&CpuBackend, &rows, &inputs);
        // 1000 is not a multiple of 64
        assert_eq!(run(&RayonBackend::new(64), &rows, &inputs), cpu);
        assert_eq!(run(&RayonBackend::new(1), &rows, &inputs), cpu);
        assert_eq!(run(&RayonBackend::default(), &rows, &inputs), cpu);
    }
}
