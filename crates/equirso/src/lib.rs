//! # EquiRSO - Equivariant Subspace Computation
//!
//! **Invariant subspaces of tensor representations** over generator-presented
//! symmetry groups, with matrix-free operator algebra and equivariant
//! parameterizations.
//!
//! **Version:** 0.1.0
//! **Status:** Subspace core complete
//!
//! This is the **meta crate** that re-exports all EquiRSO components for
//! convenient access.
//!
//! ## Quick Start
//!
//! ```
//! use equirso::prelude::*;
//! use scirs2_core::ndarray_ext::array;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Planar rotations, presented by one Lie-algebra generator.
//! let so2 = MatrixGroup::new(2, vec![array![[0.0, -1.0], [1.0, 0.0]]], vec![])?;
//!
//! // Five vectors plus one linear map.
//! let rep = Representation::vector()
//!     .repeat(5)
//!     .combine(&Representation::matrix())
//!     .bind(Arc::new(so2));
//!
//! // Rotations fix no vector and two directions of a matrix.
//! let cache = SubspaceCache::new();
//! let map = rep.symmetric_subspace(&cache, &NullspaceOptions::default())?;
//! assert_eq!((map.size(), map.dim()), (14, 2));
//! # Ok(())
//! # }
//! ```
//!
//! ## Components
//!
//! ### Operator Algebra ([`ops`])
//!
//! Lazy structured operators: Kronecker products and sums, direct sums
//! with multiplicities, permutations, concatenation, injected directional
//! derivatives.
//!
//! ```
//! use equirso::ops::LinOp;
//! use scirs2_core::ndarray_ext::array;
//!
//! let rotate = array![[0.0, -1.0], [1.0, 0.0]];
//! let op = LinOp::kron(vec![LinOp::dense(rotate), LinOp::identity(3)]).unwrap();
//! assert_eq!(op.shape(), (6, 6));
//! ```
//!
//! ### Representations and Subspaces ([`reps`])
//!
//! Generator-presented groups, tensor representations, cached invariant
//! subspaces with guarded numerical rank decisions, and equivariant
//! bilinear parameterizations.
//!
//! ```
//! use equirso::reps::{MatrixGroup, NullspaceOptions, Representation, SubspaceCache};
//! use scirs2_core::ndarray_ext::array;
//! use std::sync::Arc;
//!
//! // Rotations plus a reflection leave only multiples of the identity
//! // matrix invariant.
//! let o2 = MatrixGroup::new(
//!     2,
//!     vec![array![[0.0, -1.0], [1.0, 0.0]]],
//!     vec![array![[1.0, 0.0], [0.0, -1.0]]],
//! )
//! .unwrap();
//! let rep = Representation::matrix().bind(Arc::new(o2));
//!
//! let cache = SubspaceCache::new();
//! let map = rep
//!     .symmetric_subspace(&cache, &NullspaceOptions::default())
//!     .unwrap();
//! assert_eq!(map.dim(), 1);
//! ```
//!
//! ## Documentation
//!
//! - [GitHub Repository](https://github.com/cool-japan/equirso)

// Re-export all components
pub use equirso_ops as ops;
pub use equirso_reps as reps;

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! # Example
    //!
    //! ```
    //! use equirso::prelude::*;
    //!
    //! let rep = Representation::vector().combine(&Representation::scalar());
    //! assert_eq!(rep.ranks().len(), 2);
    //! ```

    // Operator algebra
    pub use crate::ops::{CooMatrix, JvpBackend, LinOp, OpError, OpResult};

    // Groups and representations
    pub use crate::reps::{Group, MatrixGroup, Representation, TensorRank};

    // Subspace computation
    pub use crate::reps::{
        null_space_basis, NullspaceOptions, RankSubspace, SubspaceCache, SubspaceError,
        SubspaceMap, SubspaceResult, SymmetricProjection, DEFAULT_NULLSPACE_THRESHOLD,
    };

    // Equivariant parameterizations
    pub use crate::reps::{bilinear_weights, capped_tensor_ids, BilinearMap};
}
