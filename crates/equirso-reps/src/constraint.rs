//! Symmetry constraint assembly for tensor ranks.
//!
//! A rank-(p, q) tensor is invariant under a group exactly when it is
//! annihilated by the infinitesimal action of every Lie generator and
//! fixed by the finite action of every discrete generator. Stacking those
//! conditions gives one tall constraint matrix whose null space is the
//! invariant subspace.

use scirs2_core::ndarray::concatenate;
use scirs2_core::ndarray_ext::{Array2, ArrayView2, Axis};

use equirso_ops::LinOp;

use crate::error::{SubspaceError, SubspaceResult};
use crate::group::Group;
use crate::rank::TensorRank;

fn require_square(name: &str, m: &ArrayView2<f64>) -> SubspaceResult<()> {
    let (r, c) = m.dim();
    if r != c {
        return Err(SubspaceError::ShapeMismatch(format!(
            "{name} must be square, got [{r}, {c}]"
        )));
    }
    Ok(())
}

/// Infinitesimal action of a Lie-algebra generator `a` on rank-(p, q)
/// tensors: the Kronecker sum of p copies of `a` and q copies of `-aᵀ`.
///
/// A tensor is invariant under the one-parameter subgroup generated by
/// `a` exactly when this operator annihilates it. The scalar rank yields
/// the 1 × 1 zero operator.
pub fn lie_action(a: &ArrayView2<f64>, rank: TensorRank) -> SubspaceResult<LinOp> {
    require_square("Lie generator", a)?;
    if rank.is_scalar() {
        return Ok(LinOp::dense(Array2::zeros((1, 1))));
    }
    let mut factors = Vec::with_capacity(rank.order());
    for _ in 0..rank.p {
        factors.push(LinOp::dense(a.to_owned()));
    }
    if rank.q > 0 {
        let neg_t = a.t().mapv(|x| -x);
        for _ in 0..rank.q {
            factors.push(LinOp::dense(neg_t.clone()));
        }
    }
    Ok(LinOp::kron_sum(factors)?)
}

/// Finite action of a group element `h` on rank-(p, q) tensors: the
/// Kronecker product of p copies of `h` and q copies of `h⁻ᵀ`.
///
/// The scalar rank yields the 1 × 1 identity.
///
/// # Errors
///
/// Returns [`SubspaceError::ShapeMismatch`] if `h` is not square and an
/// operator error if `h` is singular while q > 0.
pub fn finite_action(h: &ArrayView2<f64>, rank: TensorRank) -> SubspaceResult<LinOp> {
    require_square("discrete generator", h)?;
    if rank.is_scalar() {
        return Ok(LinOp::identity(1));
    }
    let base = LinOp::dense(h.to_owned());
    let mut factors = Vec::with_capacity(rank.order());
    for _ in 0..rank.p {
        factors.push(base.clone());
    }
    if rank.q > 0 {
        let inv_t = base.inverse_transpose()?;
        for _ in 0..rank.q {
            factors.push(inv_t.clone());
        }
    }
    Ok(LinOp::kron(factors)?)
}

/// Stacked constraint matrix whose null space is the invariant subspace
/// of `rank` under `group`.
///
/// One [`lie_action`] block per Lie generator and one `finite_action - I`
/// block per discrete generator, stacked vertically. A generator-free
/// group contributes a single zero row, so the null space is the full
/// space.
pub fn constraint_matrix<G: Group + ?Sized>(
    group: &G,
    rank: TensorRank,
) -> SubspaceResult<Array2<f64>> {
    let n = rank.size(group.dim());
    let mut blocks: Vec<Array2<f64>> = Vec::new();
    for a in group.lie_generators() {
        blocks.push(lie_action(&a.view(), rank)?.to_dense()?);
    }
    if !group.discrete_generators().is_empty() {
        let eye: Array2<f64> = Array2::eye(n);
        for h in group.discrete_generators() {
            let rho = finite_action(&h.view(), rank)?.to_dense()?;
            blocks.push(rho - &eye);
        }
    }
    if blocks.is_empty() {
        return Ok(Array2::zeros((1, n)));
    }
    let views: Vec<ArrayView2<f64>> = blocks.iter().map(|b| b.view()).collect();
    concatenate(Axis(0), &views)
        .map_err(|e| SubspaceError::ShapeMismatch(format!("constraint stacking failed: {e}")))
}
