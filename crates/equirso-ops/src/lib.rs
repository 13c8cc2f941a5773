//! # equirso-ops
//!
//! Matrix-free linear operator algebra for equirso.
//!
//! **Version:** 0.1.0
//! **Status:** Core operator algebra complete
//!
//! ## Overview
//!
//! This crate provides the structured linear operators out of which
//! equivariant subspace maps are composed. Operators stay lazy: a
//! Kronecker product over a dozen factors applies itself by axis-wise
//! contraction without ever materializing the product matrix.
//!
//! **Key Features:**
//! - ✅ **Closed operator enum** - identity, dense, permutation, Kronecker
//!   product/sum, direct sum with multiplicities, concatenation, injected
//!   directional derivatives; exhaustive-`match` dispatch
//! - ✅ **Column-batch contract** - `apply` maps `cols × k` to `rows × k`,
//!   shape-checked at entry
//! - ✅ **Structural adjoints** - transposes and inverse-transposes stay
//!   structured where the mathematics allows; everything else is a typed
//!   `Unsupported` error, never a silent dense fallback
//! - ✅ **Explicit materialization** - `to_dense` / `to_sparse` (COO)
//!   agree with `apply` on standard basis vectors
//! - ✅ **Dense kernels** - generic Kronecker product/sum, block diagonal,
//!   permutation matrices
//!
//! ## Quick Start
//!
//! ```rust
//! use equirso_ops::LinOp;
//! use scirs2_core::ndarray_ext::array;
//!
//! # fn main() -> equirso_ops::OpResult<()> {
//! // Rotation ⊗ identity, applied without forming the 6×6 matrix.
//! let rotate = array![[0.0, -1.0], [1.0, 0.0]];
//! let op = LinOp::kron(vec![LinOp::dense(rotate), LinOp::identity(3)])?;
//! assert_eq!(op.shape(), (6, 6));
//!
//! let v = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
//! let w = op.apply(&v.view())?;
//! assert_eq!(w.shape(), &[6, 1]);
//! assert_eq!(w[[0, 0]], -4.0);
//!
//! // Adjoints stay structural.
//! let adj = op.adjoint()?;
//! assert_eq!(adj.shape(), (6, 6));
//! # Ok(())
//! # }
//! ```
//!
//! ## SciRS2 Integration
//!
//! This crate uses `scirs2-core` for all array operations and
//! `scirs2-linalg` for matrix inversion. Direct use of `ndarray`, `rand`,
//! or `num-traits` is not permitted. See `SCIRS2_INTEGRATION_POLICY.md`
//! for details.

pub mod dense;
pub mod error;
pub mod operator;
pub mod sparse;


// Re-exports
pub use dense::{
    block_diag, invert_permutation, is_permutation, kron_sum, kronecker, permutation_matrix,
};
pub use error::{OpError, OpResult};
pub use operator::{JvpBackend, LinOp};
pub use sparse::CooMatrix;
