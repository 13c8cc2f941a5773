//! Dense kernels backing the matrix-free operators.
//!
//! These materialize the small building blocks (Kronecker products and
//! sums, block diagonals, permutation matrices) that `LinOp::to_dense`
//! folds over. They are generic over `scirs2_core::numeric::Num` elements;
//! the operator layer instantiates them at `f64`.

use scirs2_core::ndarray_ext::{s, Array2, ArrayView2};
use scirs2_core::numeric::{Num, One, Zero};

use crate::error::{OpError, OpResult};

/// Compute the Kronecker product of two dense matrices.
///
/// For `a` of shape `(m, n)` and `b` of shape `(p, q)`, the result has
/// shape `(m*p, n*q)` with `result[[i*p + k, j*q + l]] = a[[i, j]] * b[[k, l]]`.
///
/// # Arguments
///
/// * `a` - Left factor
/// * `b` - Right factor
///
/// # Returns
///
/// The dense Kronecker product `a ⊗ b`
///
/// # Complexity
///
/// O(m·n·p·q) time and space.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use equirso_ops::dense::kronecker;
///
/// let a = array![[1.0, 2.0], [3.0, 4.0]];
/// let b = array![[0.0, 1.0], [1.0, 0.0]];
/// let k = kronecker(&a.view(), &b.view());
/// assert_eq!(k.shape(), &[4, 4]);
/// assert_eq!(k[[0, 1]], 1.0);
/// assert_eq!(k[[2, 3]], 3.0);
/// ```
pub fn kronecker<T>(a: &ArrayView2<T>, b: &ArrayView2<T>) -> Array2<T>
where
    T: Clone + Num,
{
    let (m, n) = a.dim();
    let (p, q) = b.dim();
    let mut result = Array2::zeros((m * p, n * q));

    for i in 0..m {
        for j in 0..n {
            let a_ij = a[[i, j]].clone();
            for k in 0..p {
                for l in 0..q {
                    result[[i * p + k, j * q + l]] = a_ij.clone() * b[[k, l]].clone();
                }
            }
        }
    }

    result
}

/// Compute the Kronecker sum `a ⊗ I + I ⊗ b` of two square matrices.
///
/// # Errors
///
/// Returns [`OpError::ShapeMismatch`] if either input is not square.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use equirso_ops::dense::kron_sum;
///
/// let a = array![[2.0]];
/// let b = array![[0.0, 1.0], [1.0, 0.0]];
/// let s = kron_sum(&a.view(), &b.view()).unwrap();
/// assert_eq!(s, array![[2.0, 1.0], [1.0, 2.0]]);
/// ```
pub fn kron_sum<T>(a: &ArrayView2<T>, b: &ArrayView2<T>) -> OpResult<Array2<T>>
where
    T: Clone + Num,
{
    let (m, n) = a.dim();
    let (p, q) = b.dim();
    if m != n {
        return Err(OpError::shape_mismatch(
            "kron_sum",
            vec![m, m],
            vec![m, n],
            "left factor must be square",
        ));
    }
    if p != q {
        return Err(OpError::shape_mismatch(
            "kron_sum",
            vec![p, p],
            vec![p, q],
            "right factor must be square",
        ));
    }
    let eye_p: Array2<T> = Array2::eye(p);
    let eye_m: Array2<T> = Array2::eye(m);
    Ok(kronecker(a, &eye_p.view()) + kronecker(&eye_m.view(), b))
}

/// Assemble a block-diagonal matrix from a list of blocks.
pub fn block_diag<T>(blocks: &[ArrayView2<T>]) -> Array2<T>
where
    T: Clone + Zero,
{
    let rows: usize = blocks.iter().map(|b| b.nrows()).sum();
    let cols: usize = blocks.iter().map(|b| b.ncols()).sum();
    let mut result = Array2::zeros((rows, cols));

    let mut r = 0;
    let mut c = 0;
    for block in blocks {
        let (br, bc) = block.dim();
        result.slice_mut(s![r..r + br, c..c + bc]).assign(block);
        r += br;
        c += bc;
    }

    result
}

/// Dense matrix of the permutation `out[i] = v[perm[i]]`.
///
/// `perm` must be a permutation of `0..perm.len()`.
pub fn permutation_matrix<T>(perm: &[usize]) -> Array2<T>
where
    T: Clone + Zero + One,
{
    let n = perm.len();
    let mut result = Array2::zeros((n, n));
    for (i, &j) in perm.iter().enumerate() {
        result[[i, j]] = T::one();
    }
    result
}

/// Check whether `indices` is a permutation of `0..indices.len()`.
pub fn is_permutation(indices: &[usize]) -> bool {
    let n = indices.len();
    let mut seen = vec![false; n];
    for &i in indices {
        if i >= n || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}

/// Invert an index permutation: `inv[perm[i]] = i`.
///
/// `perm` must be a permutation of `0..perm.len()`.
pub fn invert_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0usize; perm.len()];
    for (i, &j) in perm.iter().enumerate() {
        inv[j] = i;
    }
    inv
}
