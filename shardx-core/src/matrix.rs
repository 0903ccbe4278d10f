//! Dense row-major matrices over GF(2^8).

use crate::error::{CodecError, Result};
use crate::galois;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl Matrix {
    /// Zero-filled `rows x cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0u8; rows * cols] }
    }

    pub fn identity(size: usize) -> Self {
        let mut m = Self::zeros(size, size);
        for i in 0..size {
            m.set(i, i, 1);
        }
        m
    }

    /// Builds a matrix from explicit rows; every row must have the same width.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for r in &rows {
            if r.len() != cols {
                return Err(CodecError::DimensionMismatch { expected: cols, got: r.len() });
            }
            data.extend_from_slice(r);
        }
        Ok(Self { rows: rows.len(), cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> u8 {
        self.data[r * self.cols + c]
    }

    #[inline]
    pub fn set(&mut self, r: usize, c: usize, v: u8) {
        self.data[r * self.cols + c] = v;
    }

    pub fn row(&self, r: usize) -> &[u8] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    fn row_mut(&mut self, r: usize) -> &mut [u8] {
        &mut self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.data.chunks(self.cols.max(1)).take(self.rows).map(<[u8]>::to_vec).collect()
    }

    /// Standard matrix product `self * rhs`.
    pub fn multiply(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(CodecError::DimensionMismatch { expected: self.cols, got: rhs.rows });
        }
        let mut out = Matrix::zeros(self.rows, rhs.cols);
        for r in 0..self.rows {
            for c in 0..rhs.cols {
                let mut acc = 0u8;
                for i in 0..self.cols {
                    acc = galois::add(acc, galois::mul(self.get(r, i), rhs.get(i, c)));
                }
                out.set(r, c, acc);
            }
        }
        Ok(out)
    }

    /// Rows at `row_indices`, in the given order.
    pub fn submatrix(&self, row_indices: &[usize]) -> Result<Matrix> {
        let mut out = Matrix::zeros(row_indices.len(), self.cols);
        for (dst, &src) in row_indices.iter().enumerate() {
            if src >= self.rows {
                return Err(CodecError::ShardIndexOutOfRange { index: src, total: self.rows });
            }
            out.row_mut(dst).copy_from_slice(self.row(src));
        }
        Ok(out)
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.cols {
            self.data.swap(a * self.cols + c, b * self.cols + c);
        }
    }

    /// Inverse by Gauss-Jordan elimination.
    ///
    /// Fails with [`CodecError::SingularMatrix`] when some column has no
    /// nonzero pivot at or below the diagonal.
    pub fn invert(&self) -> Result<Matrix> {
        if self.rows != self.cols {
            return Err(CodecError::DimensionMismatch { expected: self.rows, got: self.cols });
        }
        let n = self.rows;
        let mut work = self.clone();
        let mut inv = Matrix::identity(n);

        for col in 0..n {
            let pivot = (col..n)
                .find(|&r| work.get(r, col) != 0)
                .ok_or(CodecError::SingularMatrix { column: col })?;
            work.swap_rows(col, pivot);
            inv.swap_rows(col, pivot);

            let scale = galois::inv(work.get(col, col))?;
            if scale != 1 {
                for c in 0..n {
                    work.set(col, c, galois::mul(work.get(col, c), scale));
                    inv.set(col, c, galois::mul(inv.get(col, c), scale));
                }
            }

            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = work.get(r, col);
                if factor == 0 {
                    continue;
                }
                for c in 0..n {
                    let w = galois::mul(factor, work.get(col, c));
                    work.set(r, c, galois::sub(work.get(r, c), w));
                    let v = galois::mul(factor, inv.get(col, c));
                    inv.set(r, c, galois::sub(inv.get(r, c), v));
                }
            }
        }
        Ok(inv)
    }
}
