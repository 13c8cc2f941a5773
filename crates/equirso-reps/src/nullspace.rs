//! Numerical null spaces with explicit rank decisions.

use scirs2_core::ndarray_ext::{s, Array2, ArrayView2};
use scirs2_linalg::svd;

use crate::error::{SubspaceError, SubspaceResult};

/// Default singular-value threshold separating constraint-satisfying
/// directions from constraint-violating ones.
pub const DEFAULT_NULLSPACE_THRESHOLD: f64 = 1e-5;

/// Rank-decision options for null-space extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NullspaceOptions {
    /// Singular values above this count toward the row rank.
    pub threshold: f64,
    /// Width of the ambiguity band around the threshold, as a ratio.
    /// A singular value inside `(threshold/guard, threshold*guard)` makes
    /// the rank decision untrustworthy and is surfaced as
    /// [`SubspaceError::RankAmbiguity`]. A guard of 1.0 disables the
    /// band.
    pub guard: f64,
}

impl Default for NullspaceOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_NULLSPACE_THRESHOLD,
            guard: 10.0,
        }
    }
}

impl NullspaceOptions {
    /// Options with a custom threshold and the default guard.
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }
}

/// Compute an orthonormal basis of the right null space of `p`, as rows.
///
/// Uses a full-matrices SVD: the numerical rank is the number of singular
/// values above the threshold, and the basis is the trailing rows of Vᵀ.
///
/// # Arguments
///
/// * `p` - Constraint matrix with shape (m, n)
/// * `opts` - Threshold and guard-band settings for the rank decision
///
/// # Returns
///
/// A basis with shape (n - rank, n), possibly zero rows, whose rows are
/// orthonormal and annihilated by `p`
///
/// # Errors
///
/// Returns [`SubspaceError::RankAmbiguity`] if a singular value falls
/// inside the guard band and [`SubspaceError::Factorization`] if the SVD
/// backend fails.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use equirso_reps::nullspace::{null_space_basis, NullspaceOptions};
///
/// let p = array![[1.0, 1.0, 0.0]];
/// let basis = null_space_basis(&p.view(), &NullspaceOptions::default()).unwrap();
/// assert_eq!(basis.shape(), &[2, 3]); // one constraint row, rank 1
/// let residual = p.dot(&basis.t());
/// assert!(residual.iter().all(|x| x.abs() < 1e-10));
/// ```
pub fn null_space_basis(
    p: &ArrayView2<f64>,
    opts: &NullspaceOptions,
) -> SubspaceResult<Array2<f64>> {
    let (_u, sigma, vt) =
        svd(p, true, None).map_err(|e| SubspaceError::Factorization(format!("svd failed: {e}")))?;

    let rank = sigma.iter().filter(|&&s| s > opts.threshold).count();

    if opts.guard > 1.0 {
        let lo = opts.threshold / opts.guard;
        let hi = opts.threshold * opts.guard;
        if let Some(&ambiguous) = sigma.iter().find(|&&s| s > lo && s < hi) {
            return Err(SubspaceError::RankAmbiguity {
                threshold: opts.threshold,
                rank,
                sigma: ambiguous,
            });
        }
    }

    Ok(vt.slice(s![rank.., ..]).to_owned())
}
