//! Minimal COO sparse matrix for operator export.
//!
//! [`LinOp::to_sparse`](crate::LinOp::to_sparse) returns this triplet form;
//! it supports exactly the compositions the operator layer needs (Kronecker
//! product, vertical stacking) plus dense round-trips. It is an exchange
//! format, not a sparse computation engine.

use scirs2_core::ndarray_ext::{Array2, ArrayView2};

use crate::error::{OpError, OpResult};

/// Sparse matrix in coordinate (triplet) format.
///
/// Entries are stored as `(row, col, value)` triplets. Duplicate
/// coordinates are allowed and sum on densification, as is conventional
/// for COO.
#[derive(Debug, Clone, PartialEq)]
pub struct CooMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl CooMatrix {
    /// Create a COO matrix from triplets, validating bounds.
    ///
    /// # Errors
    ///
    /// Returns [`OpError::ShapeMismatch`] if any triplet lies outside
    /// `rows × cols`.
    pub fn new(rows: usize, cols: usize, entries: Vec<(usize, usize, f64)>) -> OpResult<Self> {
        for &(r, c, _) in &entries {
            if r >= rows || c >= cols {
                return Err(OpError::shape_mismatch(
                    "CooMatrix::new",
                    vec![rows, cols],
                    vec![r, c],
                    "entry coordinate out of bounds",
                ));
            }
        }
        Ok(Self {
            rows,
            cols,
            entries,
        })
    }

    /// The `n × n` identity.
    pub fn identity(n: usize) -> Self {
        Self {
            rows: n,
            cols: n,
            entries: (0..n).map(|i| (i, i, 1.0)).collect(),
        }
    }

    /// The matrix of the permutation `out[i] = v[perm[i]]`: a single one
    /// per row at `(i, perm[i])`.
    ///
    /// `perm` must be a permutation of `0..perm.len()`.
    pub fn permutation(perm: &[usize]) -> Self {
        Self {
            rows: perm.len(),
            cols: perm.len(),
            entries: perm.iter().enumerate().map(|(i, &j)| (i, j, 1.0)).collect(),
        }
    }

    /// Build from a dense matrix, dropping exact zeros.
    pub fn from_dense(a: &ArrayView2<f64>) -> Self {
        let (rows, cols) = a.dim();
        let mut entries = Vec::new();
        for ((r, c), &v) in a.indexed_iter() {
            if v != 0.0 {
                entries.push((r, c, v));
            }
        }
        Self {
            rows,
            cols,
            entries,
        }
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Matrix dimensions as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Stored triplets in insertion order.
    pub fn entries(&self) -> &[(usize, usize, f64)] {
        &self.entries
    }

    /// Materialize as a dense array, summing duplicate coordinates.
    pub fn to_dense(&self) -> Array2<f64> {
        let mut out = Array2::zeros((self.rows, self.cols));
        for &(r, c, v) in &self.entries {
            out[[r, c]] += v;
        }
        out
    }

    /// Kronecker product of two sparse matrices.
    pub fn kron(&self, other: &CooMatrix) -> CooMatrix {
        let (p, q) = other.shape();
        let mut entries = Vec::with_capacity(self.nnz() * other.nnz());
        for &(r1, c1, v1) in &self.entries {
            for &(r2, c2, v2) in &other.entries {
                entries.push((r1 * p + r2, c1 * q + c2, v1 * v2));
            }
        }
        CooMatrix {
            rows: self.rows * p,
            cols: self.cols * q,
            entries,
        }
    }

    /// Stack matrices vertically.
    ///
    /// # Errors
    ///
    /// Returns [`OpError::ShapeMismatch`] if the blocks disagree on column
    /// count or the list is empty.
    pub fn vstack(blocks: &[CooMatrix]) -> OpResult<CooMatrix> {
        let first = blocks.first().ok_or_else(|| {
            OpError::shape_mismatch("CooMatrix::vstack", vec![1], vec![0], "empty block list")
        })?;
        let cols = first.cols;
        let mut entries = Vec::new();
        let mut offset = 0;
        for block in blocks {
            if block.cols != cols {
                return Err(OpError::shape_mismatch(
                    "CooMatrix::vstack",
                    vec![cols],
                    vec![block.cols],
                    "blocks must agree on column count",
                ));
            }
            entries.extend(block.entries.iter().map(|&(r, c, v)| (r + offset, c, v)));
            offset += block.rows;
        }
        Ok(CooMatrix {
            rows: offset,
            cols,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    #[test]
    fn test_new_rejects_out_of_bounds() {
        let err = CooMatrix::new(2, 2, vec![(2, 0, 1.0)]).unwrap_err();
        assert!(matches!(err, OpError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_identity_dense() {
        let eye = CooMatrix::identity(3);
        assert_eq!(eye.nnz(), 3);
        assert_eq!(eye.to_dense(), Array2::<f64>::eye(3));
    }

    #[test]
    fn test_permutation_dense() {
        let p = CooMatrix::permutation(&[2, 0, 1]);
        let dense = p.to_dense();
        assert_eq!(dense, array![[0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    }

    #[test]
    fn test_from_dense_drops_zeros() {
        let a = array![[0.0, 1.5], [0.0, 0.0]];
        let coo = CooMatrix::from_dense(&a.view());
        assert_eq!(coo.nnz(), 1);
        assert_eq!(coo.to_dense(), a);
    }

    #[test]
    fn test_duplicates_sum_on_densify() {
        let coo = CooMatrix::new(1, 1, vec![(0, 0, 1.0), (0, 0, 2.5)]).unwrap();
        assert_eq!(coo.to_dense()[[0, 0]], 3.5);
    }

    #[test]
    fn test_kron_matches_dense_kron() {
        let a = array![[1.0, 0.0], [0.0, 2.0]];
        let b = array![[0.0, 3.0], [4.0, 0.0]];
        let sk = CooMatrix::from_dense(&a.view()).kron(&CooMatrix::from_dense(&b.view()));
        let dk = crate::dense::kronecker(&a.view(), &b.view());
        assert_eq!(sk.to_dense(), dk);
        assert_eq!(sk.nnz(), 4);
    }

    #[test]
    fn test_vstack() {
        let a = CooMatrix::from_dense(&array![[1.0, 0.0]].view());
        let b = CooMatrix::from_dense(&array![[0.0, 2.0], [3.0, 0.0]].view());
        let s = CooMatrix::vstack(&[a, b]).unwrap();
        assert_eq!(s.shape(), (3, 2));
        assert_eq!(
            s.to_dense(),
            array![[1.0, 0.0], [0.0, 2.0], [3.0, 0.0]]
        );
    }

    #[test]
    fn test_vstack_rejects_column_mismatch() {
        let a = CooMatrix::identity(2);
        let b = CooMatrix::identity(3);
        assert!(CooMatrix::vstack(&[a, b]).is_err());
    }
}
