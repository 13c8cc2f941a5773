//! Whole-representation invariant subspaces and projections.
//!
//! Per-rank bases from the cache are lifted to a full representation in
//! three stages: a block-diagonal operator over the grouped rank runs,
//! the inverse ordering permutation back to declaration order, and, for
//! tensor products, the layout permutation into row-major multi-axis
//! order. Both directions stay matrix-free; `to_dense` exists for tests
//! and small problems.

use scirs2_core::ndarray_ext::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use equirso_ops::{invert_permutation, LinOp};

use crate::cache::SubspaceCache;
use crate::error::{SubspaceError, SubspaceResult};
use crate::nullspace::NullspaceOptions;
use crate::rep::Representation;

/// Matrix-free map from invariant-subspace coefficients to full
/// representation vectors.
#[derive(Debug, Clone)]
pub struct SubspaceMap {
    expand: LinOp,
    reorder: LinOp,
    layout: Option<LinOp>,
    dim: usize,
    size: usize,
}

impl SubspaceMap {
    /// Invariant dimension: the number of free coefficients.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Full representation dimension.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Map a `dim x k` coefficient batch to a `size x k` batch of full
    /// representation vectors. Product representations come out in their
    /// row-major multi-component layout.
    pub fn apply(&self, coeffs: &ArrayView2<f64>) -> SubspaceResult<Array2<f64>> {
        let grouped = self.expand.apply(coeffs)?;
        let declared = self.reorder.apply(&grouped.view())?;
        match &self.layout {
            Some(perm) => Ok(perm.apply(&declared.view())?),
            None => Ok(declared),
        }
    }

    /// Single-vector convenience over [`apply`](Self::apply).
    pub fn apply_vec(&self, coeffs: &ArrayView1<f64>) -> SubspaceResult<Array1<f64>> {
        let col = coeffs.to_owned().insert_axis(Axis(1));
        let out = self.apply(&col.view())?;
        Ok(out.index_axis(Axis(1), 0).to_owned())
    }

    /// The expansion as a dense `size x dim` matrix.
    pub fn to_dense(&self) -> SubspaceResult<Array2<f64>> {
        let eye = Array2::eye(self.dim);
        self.apply(&eye.view())
    }
}

/// Idempotent projection onto the invariant subspace of a
/// representation, applied in the representation's own layout.
#[derive(Debug, Clone)]
pub struct SymmetricProjection {
    gather: LinOp,
    blocks: LinOp,
    scatter: LinOp,
    layout_in: Option<LinOp>,
    layout_out: Option<LinOp>,
    size: usize,
}

impl SymmetricProjection {
    /// Full representation dimension.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Project a `size x k` batch onto the invariant subspace.
    pub fn apply(&self, v: &ArrayView2<f64>) -> SubspaceResult<Array2<f64>> {
        let declared = match &self.layout_in {
            Some(perm) => perm.apply(v)?,
            None => v.to_owned(),
        };
        let grouped = self.gather.apply(&declared.view())?;
        let projected = self.blocks.apply(&grouped.view())?;
        let back = self.scatter.apply(&projected.view())?;
        match &self.layout_out {
            Some(perm) => Ok(perm.apply(&back.view())?),
            None => Ok(back),
        }
    }

    /// Single-vector convenience over [`apply`](Self::apply).
    pub fn apply_vec(&self, v: &ArrayView1<f64>) -> SubspaceResult<Array1<f64>> {
        let col = v.to_owned().insert_axis(Axis(1));
        let out = self.apply(&col.view())?;
        Ok(out.index_axis(Axis(1), 0).to_owned())
    }

    /// The projection as a dense `size x size` matrix.
    pub fn to_dense(&self) -> SubspaceResult<Array2<f64>> {
        let eye = Array2::eye(self.size);
        self.apply(&eye.view())
    }
}

impl Representation {
    /// Compute the invariant subspace of the whole representation.
    ///
    /// Per grouped rank the cached basis contributes `multiplicity x
    /// basis-dim` coefficient slots; the expansion applies each Qᵀ
    /// block-diagonally, restores declaration order, and for products
    /// applies the layout permutation.
    ///
    /// # Arguments
    ///
    /// * `cache` - Shared per-rank subspace cache, consulted before any SVD
    /// * `opts` - Threshold and guard-band settings for the rank decisions
    ///
    /// # Returns
    ///
    /// A matrix-free [`SubspaceMap`] from `dim` free coefficients to
    /// `size`-dimensional invariant vectors
    ///
    /// # Errors
    ///
    /// Fails when the representation is empty or unbound, and propagates
    /// rank-ambiguity and factorization errors from the null-space solve.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use scirs2_core::ndarray_ext::array;
    /// use equirso_reps::{MatrixGroup, NullspaceOptions, Representation, SubspaceCache};
    ///
    /// let so2 = MatrixGroup::new(2, vec![array![[0.0, -1.0], [1.0, 0.0]]], vec![]).unwrap();
    /// let rep = Representation::matrix().bind(Arc::new(so2));
    /// let cache = SubspaceCache::new();
    /// let map = rep.symmetric_subspace(&cache, &NullspaceOptions::default()).unwrap();
    /// assert_eq!(map.size(), 4);
    /// assert_eq!(map.dim(), 2); // span of vec(I) and vec(J)
    /// ```
    pub fn symmetric_subspace(
        &self,
        cache: &SubspaceCache,
        opts: &NullspaceOptions,
    ) -> SubspaceResult<SubspaceMap> {
        if self.ranks().is_empty() {
            return Err(SubspaceError::ShapeMismatch(
                "empty representation has no subspace".into(),
            ));
        }
        let group = self.require_group()?;
        let mults = self.multiplicities();

        let mut blocks = Vec::with_capacity(mults.len());
        let mut mult_counts = Vec::with_capacity(mults.len());
        let mut dim = 0usize;
        for (&rank, &mult) in mults.iter() {
            let subspace = cache.subspace(group.as_ref(), rank, opts)?;
            dim += mult * subspace.dim();
            blocks.push(LinOp::dense(subspace.basis().t().to_owned()));
            mult_counts.push(mult);
        }

        let expand = LinOp::direct_sum(blocks, mult_counts)?;
        let size = expand.rows();
        let reorder = LinOp::perm(self.inverse_ordering_permutation()?.to_vec())?;
        let layout = if self.is_product() {
            Some(LinOp::perm(self.product_permutation()?.to_vec())?)
        } else {
            None
        };
        Ok(SubspaceMap {
            expand,
            reorder,
            layout,
            dim,
            size,
        })
    }

    /// Idempotent projection onto the invariant subspace, acting on full
    /// representation vectors in their own layout.
    ///
    /// Equals `M Mᵀ` for the orthonormal expansion `M` of
    /// [`symmetric_subspace`](Self::symmetric_subspace), but is assembled
    /// from the cached per-rank projectors without forming `M`.
    ///
    /// # Errors
    ///
    /// Fails when the representation is empty or unbound, and propagates
    /// rank-ambiguity and factorization errors from the null-space solve.
    pub fn symmetric_projection(
        &self,
        cache: &SubspaceCache,
        opts: &NullspaceOptions,
    ) -> SubspaceResult<SymmetricProjection> {
        if self.ranks().is_empty() {
            return Err(SubspaceError::ShapeMismatch(
                "empty representation has no projection".into(),
            ));
        }
        let group = self.require_group()?;
        let mults = self.multiplicities();

        let mut rank_projectors = Vec::with_capacity(mults.len());
        let mut mult_counts = Vec::with_capacity(mults.len());
        for (&rank, &mult) in mults.iter() {
            rank_projectors.push(group.projector(rank, cache, opts)?);
            mult_counts.push(mult);
        }
        let blocks = LinOp::direct_sum(rank_projectors, mult_counts)?;
        let size = blocks.rows();

        let gather = LinOp::perm(self.ordering_permutation()?.to_vec())?;
        let scatter = LinOp::perm(self.inverse_ordering_permutation()?.to_vec())?;
        let (layout_in, layout_out) = if self.is_product() {
            let layout = self.product_permutation()?.to_vec();
            let inverse = invert_permutation(&layout);
            (Some(LinOp::perm(inverse)?), Some(LinOp::perm(layout)?))
        } else {
            (None, None)
        };
        Ok(SymmetricProjection {
            gather,
            blocks,
            scatter,
            layout_in,
            layout_out,
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{Group, MatrixGroup};
    use crate::rank::TensorRank;
    use std::sync::Arc;

    use scirs2_core::ndarray_ext::{array, Array1};

    fn so2() -> Arc<dyn Group> {
        Arc::new(MatrixGroup::new(2, vec![array![[0.0, -1.0], [1.0, 0.0]]], vec![]).unwrap())
    }

    fn o2_like() -> Arc<dyn Group> {
        Arc::new(
            MatrixGroup::new(
                2,
                vec![array![[0.0, -1.0], [1.0, 0.0]]],
                vec![array![[1.0, 0.0], [0.0, -1.0]]],
            )
            .unwrap(),
        )
    }

    fn assert_close(a: &Array2<f64>, b: &Array2<f64>, tol: f64) {
        assert_eq!(a.shape(), b.shape());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < tol, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_rotation_matrix_rank_has_two_invariants() {
        // The commutant of SO(2) acting on 2x2 matrices is spanned by the
        // identity and the rotation generator itself.
        let rep = Representation::matrix().bind(so2());
        let cache = SubspaceCache::new();
        let map = rep
            .symmetric_subspace(&cache, &NullspaceOptions::default())
            .unwrap();
        assert_eq!(map.dim(), 2);
        assert_eq!(map.size(), 4);

        // Every column of the expansion is annihilated by the generator
        // action on matrices.
        let j = array![[0.0, -1.0], [1.0, 0.0]];
        let action = rep.lie_action(&j.view()).unwrap();
        let basis = map.to_dense().unwrap();
        let residual = action.apply(&basis.view()).unwrap();
        for x in residual.iter() {
            assert!(x.abs() < 1e-8, "basis not invariant: {residual:?}");
        }
    }

    #[test]
    fn test_reflection_cuts_matrix_invariants_to_identity_span() {
        let rep = Representation::matrix().bind(o2_like());
        let cache = SubspaceCache::new();
        let map = rep
            .symmetric_subspace(&cache, &NullspaceOptions::default())
            .unwrap();
        assert_eq!(map.dim(), 1);

        // The single basis column is proportional to vec(I).
        let basis = map.to_dense().unwrap();
        assert!(basis[[1, 0]].abs() < 1e-8);
        assert!(basis[[2, 0]].abs() < 1e-8);
        assert!((basis[[0, 0]] - basis[[3, 0]]).abs() < 1e-8);
        assert!((basis[[0, 0]].abs() - 1.0 / 2.0_f64.sqrt()).abs() < 1e-8);
    }

    #[test]
    fn test_rotation_vector_rank_has_no_invariants() {
        let rep = Representation::vector().bind(so2());
        let cache = SubspaceCache::new();
        let map = rep
            .symmetric_subspace(&cache, &NullspaceOptions::default())
            .unwrap();
        assert_eq!(map.dim(), 0);
        assert_eq!(map.size(), 2);
        let coeffs = Array2::<f64>::zeros((0, 3));
        let out = map.apply(&coeffs.view()).unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        for x in out.iter() {
            assert!(x.abs() < 1e-12);
        }
    }

    #[test]
    fn test_trivial_group_keeps_everything() {
        let rep = Representation::matrix().bind(Arc::new(MatrixGroup::trivial(2)));
        let cache = SubspaceCache::new();
        let map = rep
            .symmetric_subspace(&cache, &NullspaceOptions::default())
            .unwrap();
        assert_eq!(map.dim(), 4);
        assert_eq!(map.size(), 4);

        // Full-dimensional expansions are orthogonal.
        let dense = map.to_dense().unwrap();
        let gram = dense.t().dot(&dense);
        assert_close(&gram, &Array2::eye(4), 1e-10);
    }

    #[test]
    fn test_composite_representation_layout() {
        // vector + matrix + scalar + vector under rotations: only the
        // matrix run (two dims) and the scalar survive.
        let rep = Representation::new(vec![
            TensorRank::new(1, 0),
            TensorRank::new(1, 1),
            TensorRank::new(0, 0),
            TensorRank::new(1, 0),
        ])
        .bind(so2());
        let cache = SubspaceCache::new();
        let map = rep
            .symmetric_subspace(&cache, &NullspaceOptions::default())
            .unwrap();
        assert_eq!(map.dim(), 3);
        assert_eq!(map.size(), 9);

        let coeffs = Array1::from_vec(vec![0.3, -1.2, 2.5]);
        let out = map.apply_vec(&coeffs.view()).unwrap();

        // Vector slots carry nothing.
        for &i in &[0usize, 1, 7, 8] {
            assert!(out[i].abs() < 1e-10, "vector slot {i} leaked: {out:?}");
        }
        // The scalar coefficient passes straight through.
        assert!((out[6] - 2.5).abs() < 1e-10);

        // The full vector is invariant.
        let j = array![[0.0, -1.0], [1.0, 0.0]];
        let action = rep.lie_action(&j.view()).unwrap();
        let residual = action
            .apply(&out.clone().insert_axis(Axis(1)).view())
            .unwrap();
        for x in residual.iter() {
            assert!(x.abs() < 1e-8);
        }
    }

    #[test]
    fn test_projection_is_idempotent_and_matches_subspace() {
        let rep = Representation::matrix().bind(so2());
        let cache = SubspaceCache::new();
        let opts = NullspaceOptions::default();
        let proj = rep.symmetric_projection(&cache, &opts).unwrap();
        let p = proj.to_dense().unwrap();

        assert_close(&p.dot(&p), &p, 1e-10);

        // P = M Mᵀ for the orthonormal expansion M.
        let m = rep
            .symmetric_subspace(&cache, &opts)
            .unwrap()
            .to_dense()
            .unwrap();
        assert_close(&p, &m.dot(&m.t()), 1e-10);

        // vec(I) is fixed.
        let vec_i = Array1::from_vec(vec![1.0, 0.0, 0.0, 1.0]);
        let fixed = proj.apply_vec(&vec_i.view()).unwrap();
        for (x, y) in fixed.iter().zip(vec_i.iter()) {
            assert!((x - y).abs() < 1e-8);
        }
    }

    #[test]
    fn test_projection_of_product_under_trivial_group_is_identity() {
        let factor = Representation::vector().combine(&Representation::scalar());
        let product = factor
            .tensor_product(&factor)
            .bind(Arc::new(MatrixGroup::trivial(2)));
        let cache = SubspaceCache::new();
        let proj = product
            .symmetric_projection(&cache, &NullspaceOptions::default())
            .unwrap();
        assert_eq!(proj.size(), 9);
        assert_close(&proj.to_dense().unwrap(), &Array2::eye(9), 1e-10);
    }

    #[test]
    fn test_product_projection_is_symmetric_and_idempotent() {
        let factor = Representation::vector().combine(&Representation::scalar());
        let product = factor.tensor_product(&factor).bind(so2());
        let cache = SubspaceCache::new();
        let proj = product
            .symmetric_projection(&cache, &NullspaceOptions::default())
            .unwrap();
        let p = proj.to_dense().unwrap();

        assert_close(&p.dot(&p), &p, 1e-10);
        assert_close(&p, &p.t().to_owned(), 1e-10);
    }

    #[test]
    fn test_product_subspace_dimension() {
        // (vector + scalar)^2 under rotations: ranks (2,0), (1,0) x2,
        // (0,0); only the matrix-like run (2 dims) and the scalar count.
        let factor = Representation::vector().combine(&Representation::scalar());
        let product = factor.tensor_product(&factor).bind(so2());
        let cache = SubspaceCache::new();
        let map = product
            .symmetric_subspace(&cache, &NullspaceOptions::default())
            .unwrap();
        assert_eq!(map.dim(), 3);
        assert_eq!(map.size(), 9);

        // Expanded vectors are invariant in the product layout as well.
        let j = array![[0.0, -1.0], [1.0, 0.0]];
        let action = product.lie_action(&j.view()).unwrap();
        let layout = product.product_permutation().unwrap().to_vec();
        let gather_to_blocks = LinOp::perm(invert_permutation(&layout)).unwrap();

        let dense = map.to_dense().unwrap();
        let in_block_order = gather_to_blocks.apply(&dense.view()).unwrap();
        let residual = action.apply(&in_block_order.view()).unwrap();
        for x in residual.iter() {
            assert!(x.abs() < 1e-8);
        }
    }

    #[test]
    fn test_unbound_representation_is_rejected() {
        let rep = Representation::matrix();
        let cache = SubspaceCache::new();
        let err = rep
            .symmetric_subspace(&cache, &NullspaceOptions::default())
            .unwrap_err();
        assert!(matches!(err, SubspaceError::Unsupported(_)));
    }

    #[test]
    fn test_cache_is_reused_across_calls() {
        let rep = Representation::matrix()
            .repeat(3)
            .combine(&Representation::scalar())
            .bind(so2());
        let cache = SubspaceCache::new();
        let opts = NullspaceOptions::default();

        rep.symmetric_subspace(&cache, &opts).unwrap();
        let misses_after_first = cache.stats().misses;
        rep.symmetric_subspace(&cache, &opts).unwrap();

        assert_eq!(cache.stats().misses, misses_after_first);
        assert!(cache.stats().hits > 0);
    }
}
