//! # equirso-reps
//!
//! Symmetry groups, tensor representations, and invariant subspaces for
//! equirso.
//!
//! **Version:** 0.1.0
//! **Status:** Subspace computation and parameterizations complete
//!
//! ## Overview
//!
//! This crate turns a finite list of group generators into the invariant
//! subspace of any tensor representation built over them. The pipeline
//! is: assemble one constraint block per generator, stack them, take the
//! numerical null space, and lift the per-rank bases to whole
//! representations through cached block-diagonal operators.
//!
//! **Key Features:**
//! - ✅ **Generator-presented groups** - any matrix Lie group with finite
//!   Lie-algebra and discrete generator lists, behind the [`Group`] trait
//! - ✅ **Tensor representations** - ordered direct sums of ranks with
//!   duals, tensor products, and row-major product layouts
//! - ✅ **Guarded rank decisions** - singular values near the null-space
//!   threshold surface as [`SubspaceError::RankAmbiguity`] instead of a
//!   silently wrong basis
//! - ✅ **Shared subspace cache** - content-fingerprint keys, hit/miss
//!   statistics, explicit invalidation, thread-safe
//! - ✅ **Equivariant parameterizations** - bilinear weight maps and
//!   capped tensor products for building equivariant layers
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use equirso_reps::{MatrixGroup, NullspaceOptions, Representation, SubspaceCache};
//! use scirs2_core::ndarray_ext::array;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Planar rotations, generated by the infinitesimal 90° turn.
//! let so2 = MatrixGroup::new(2, vec![array![[0.0, -1.0], [1.0, 0.0]]], vec![])?;
//!
//! // Five vectors plus one linear map.
//! let rep = Representation::vector()
//!     .repeat(5)
//!     .combine(&Representation::matrix())
//!     .bind(Arc::new(so2));
//!
//! let cache = SubspaceCache::new();
//! let map = rep.symmetric_subspace(&cache, &NullspaceOptions::default())?;
//!
//! // Rotations fix no vector, and exactly two directions of a matrix.
//! assert_eq!(map.size(), 14);
//! assert_eq!(map.dim(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## SciRS2 Integration
//!
//! This crate uses `scirs2-core` for arrays and random number generation
//! and `scirs2-linalg` for the SVD behind null spaces. Direct use of
//! `ndarray`, `rand`, or `num-traits` is not permitted. See
//! `SCIRS2_INTEGRATION_POLICY.md` for details.

pub mod bilinear;
pub mod cache;
pub mod constraint;
pub mod error;
pub mod group;
pub mod nullspace;
pub mod projector;
pub mod rank;
pub mod rep;

#[cfg(test)]
mod property_tests;

// Re-exports
pub use bilinear::{bilinear_weights, capped_tensor_ids, BilinearMap};
pub use cache::{CacheStats, RankSubspace, SubspaceCache};
pub use constraint::{constraint_matrix, finite_action, lie_action};
pub use error::{SubspaceError, SubspaceResult};
pub use group::{Group, MatrixGroup};
pub use nullspace::{null_space_basis, NullspaceOptions, DEFAULT_NULLSPACE_THRESHOLD};
pub use projector::{SubspaceMap, SymmetricProjection};
pub use rank::TensorRank;
pub use rep::Representation;
