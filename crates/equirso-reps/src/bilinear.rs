//! Equivariant bilinear parameterizations.
//!
//! A weight tensor that must transform like `w_rep` can be produced
//! equivariantly from features transforming like `x_rep` by contracting
//! free parameters against feature elements of the matching rank. Only
//! the pairing structure depends on the group; the parameters themselves
//! are unconstrained, which keeps the map cheap to evaluate compared to
//! projecting a full weight space.
//!
//! Feature elements are subsampled per rank to bound the parameter
//! count, which mirrors how the weight side rarely needs every copy of a
//! rank that the feature side provides.

use std::sync::Arc;

use indexmap::IndexMap;

use scirs2_core::ndarray::concatenate;
use scirs2_core::ndarray_ext::{s, Array2, ArrayView1, ArrayView2, Axis};
use scirs2_core::random::{thread_rng, Rng, SeedableRng};

use equirso_ops::{invert_permutation, LinOp};

use crate::error::{SubspaceError, SubspaceResult};
use crate::rank::TensorRank;
use crate::rep::Representation;

/// Sampled feature source of one weight-side rank group.
#[derive(Debug, Clone)]
struct BlockSource {
    /// Flat feature-row indices, element-major
    feature_ids: Vec<usize>,
    /// Sampled element count
    n: usize,
    /// Offset into the flat parameter vector
    param_offset: usize,
}

/// One weight-side rank group of a [`BilinearMap`].
#[derive(Debug, Clone)]
struct BilinearBlock {
    /// d^(p+q) of the grouped rank
    size: usize,
    /// Weight-side multiplicity
    w_mult: usize,
    /// `None` when the rank is absent on the feature side; the block is
    /// then structurally zero
    source: Option<BlockSource>,
}

/// Parameterization of equivariant bilinear maps from a feature
/// representation into a weight representation.
#[derive(Debug, Clone)]
pub struct BilinearMap {
    param_count: usize,
    x_size: usize,
    w_size: usize,
    blocks: Vec<BilinearBlock>,
    reorder: LinOp,
}

fn seeded_rng(seed: Option<u64>) -> scirs2_core::random::StdRng {
    if let Some(s) = seed {
        scirs2_core::random::StdRng::seed_from_u64(s)
    } else {
        let mut thread_rng_instance = thread_rng();
        scirs2_core::random::StdRng::from_rng(&mut thread_rng_instance)
    }
}

/// Sample `n` distinct indices from `0..count` in selection order
/// (partial Fisher-Yates).
fn sample_without_replacement<R: Rng>(count: usize, n: usize, rng: &mut R) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..count).collect();
    for i in 0..n {
        let j = rng.random_range(i..count);
        pool.swap(i, j);
    }
    pool.truncate(n);
    pool
}

fn require_same_group(
    w_rep: &Representation,
    x_rep: &Representation,
) -> SubspaceResult<usize> {
    let wg = w_rep.require_group()?;
    let xg = x_rep.require_group()?;
    if wg.fingerprint() != xg.fingerprint() {
        return Err(SubspaceError::Unsupported(
            "weight and feature representations must be bound to the same group".into(),
        ));
    }
    Ok(wg.dim())
}

/// Build the bilinear parameterization from `x_rep` features into
/// `w_rep` weights.
///
/// Scalar features carry no bilinear information and are excluded from
/// the feature side. For each weight-side rank group, up to
/// `min(feature multiplicity, rank size)` feature elements are sampled
/// without replacement with the caller-seeded generator; the parameter
/// count is the sum over groups of weight multiplicity times sampled
/// count. Weight ranks absent from the features come out as zero blocks.
///
/// # Arguments
///
/// * `w_rep` - Weight representation the output must transform like
/// * `x_rep` - Feature representation of the inputs, bound to the same group
/// * `seed` - Seed for the feature subsampling; `None` draws one from the
///   thread-local generator
///
/// # Returns
///
/// A [`BilinearMap`] whose [`apply`](BilinearMap::apply) contracts a flat
/// parameter vector against a feature batch
///
/// # Errors
///
/// Fails when `w_rep` is empty, when either representation is unbound, or
/// when the two representations are bound to different groups.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use equirso_reps::{bilinear_weights, Group, MatrixGroup, Representation};
///
/// let group: Arc<dyn Group> = Arc::new(MatrixGroup::trivial(2));
/// let w_rep = Representation::vector().bind(Arc::clone(&group));
/// let x_rep = Representation::vector().repeat(3).bind(group);
///
/// let map = bilinear_weights(&w_rep, &x_rep, Some(0)).unwrap();
/// assert_eq!(map.param_count(), 2); // one weight copy, min(3, 2) samples
/// assert_eq!(map.x_size(), 6);
/// assert_eq!(map.w_size(), 2);
/// ```
pub fn bilinear_weights(
    w_rep: &Representation,
    x_rep: &Representation,
    seed: Option<u64>,
) -> SubspaceResult<BilinearMap> {
    if w_rep.ranks().is_empty() {
        return Err(SubspaceError::ShapeMismatch(
            "weight representation has no ranks".into(),
        ));
    }
    let d = require_same_group(w_rep, x_rep)?;
    let x_unimodular = x_rep
        .group()
        .map(|g| g.is_unimodular())
        .unwrap_or(false);

    // Feature element positions per grouped rank, in declaration order.
    let mut feature_elements: IndexMap<TensorRank, Vec<Vec<usize>>> = IndexMap::new();
    let mut offset = 0usize;
    for rank in x_rep.ranks() {
        let size = rank.size(d);
        let grouped = rank.grouped(x_unimodular);
        if !grouped.is_scalar() {
            feature_elements
                .entry(grouped)
                .or_default()
                .push((offset..offset + size).collect());
        }
        offset += size;
    }
    let x_size = offset;

    let mut rng = seeded_rng(seed);

    let w_mults = w_rep.multiplicities();
    let mut blocks = Vec::with_capacity(w_mults.len());
    let mut param_count = 0usize;
    for (&rank, &w_mult) in w_mults.iter() {
        let size = rank.size(d);
        let source = match feature_elements.get(&rank) {
            Some(elements) => {
                let n = elements.len().min(size);
                let chosen = sample_without_replacement(elements.len(), n, &mut rng);
                let mut feature_ids = Vec::with_capacity(n * size);
                for &e in &chosen {
                    feature_ids.extend_from_slice(&elements[e]);
                }
                let source = BlockSource {
                    feature_ids,
                    n,
                    param_offset: param_count,
                };
                param_count += w_mult * n;
                Some(source)
            }
            None => None,
        };
        blocks.push(BilinearBlock {
            size,
            w_mult,
            source,
        });
    }

    let w_size = blocks.iter().map(|b| b.w_mult * b.size).sum();
    let reorder = LinOp::perm(w_rep.inverse_ordering_permutation()?.to_vec())?;
    Ok(BilinearMap {
        param_count,
        x_size,
        w_size,
        blocks,
        reorder,
    })
}

impl BilinearMap {
    /// Number of free parameters.
    pub fn param_count(&self) -> usize {
        self.param_count
    }

    /// Feature vector length expected of `x`.
    pub fn x_size(&self) -> usize {
        self.x_size
    }

    /// Weight vector length produced.
    pub fn w_size(&self) -> usize {
        self.w_size
    }

    /// Evaluate the parameterization on a flat parameter vector and an
    /// `x_size x batch` feature batch, yielding the `w_size x batch`
    /// weight batch in the weight representation's declaration order.
    pub fn apply(
        &self,
        params: &ArrayView1<f64>,
        x: &ArrayView2<f64>,
    ) -> SubspaceResult<Array2<f64>> {
        if params.len() != self.param_count {
            return Err(SubspaceError::ShapeMismatch(format!(
                "expected {} parameters, got {}",
                self.param_count,
                params.len()
            )));
        }
        if x.nrows() != self.x_size {
            return Err(SubspaceError::ShapeMismatch(format!(
                "expected a feature batch with {} rows, got {}",
                self.x_size,
                x.nrows()
            )));
        }
        let batch = x.ncols();

        let mut parts = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            let rows = block.w_mult * block.size;
            match &block.source {
                Some(source) => {
                    let gathered = x.select(Axis(0), &source.feature_ids);
                    let stacked = gathered
                        .into_shape_with_order((source.n, block.size * batch))
                        .map_err(|e| {
                            SubspaceError::ShapeMismatch(format!(
                                "feature gather reshape failed: {e}"
                            ))
                        })?;
                    let param_block = params
                        .slice(s![
                            source.param_offset..source.param_offset + block.w_mult * source.n
                        ])
                        .to_owned()
                        .into_shape_with_order((block.w_mult, source.n))
                        .map_err(|e| {
                            SubspaceError::ShapeMismatch(format!(
                                "parameter reshape failed: {e}"
                            ))
                        })?;
                    let product = param_block.dot(&stacked);
                    let part = product.into_shape_with_order((rows, batch)).map_err(|e| {
                        SubspaceError::ShapeMismatch(format!("weight reshape failed: {e}"))
                    })?;
                    parts.push(part);
                }
                None => parts.push(Array2::zeros((rows, batch))),
            }
        }

        let views: Vec<ArrayView2<f64>> = parts.iter().map(|p| p.view()).collect();
        let grouped = concatenate(Axis(0), &views).map_err(|e| {
            SubspaceError::ShapeMismatch(format!("weight concatenation failed: {e}"))
        })?;
        Ok(self.reorder.apply(&grouped.view())?)
    }
}

/// Cap the multiplicities of `rep (x) rep` by those of `max_rep`,
/// sampling the kept copies with the caller-seeded generator.
///
/// Returns the capped representation, bound to `rep`'s group, together
/// with the flat positions of the kept entries in the row-major product
/// layout of `rep (x) rep`. The kept copies of each rank land in the
/// capped representation in grouped order.
pub fn capped_tensor_ids(
    rep: &Representation,
    max_rep: &Representation,
    seed: Option<u64>,
) -> SubspaceResult<(Representation, Vec<usize>)> {
    let group = rep.require_group()?;
    let d = group.dim();

    let product = rep.tensor_product(rep);
    let product_mults = product.multiplicities();
    let max_mults = max_rep.multiplicities();

    let mut rng = seeded_rng(seed);

    // Kept positions in the grouped layout of the product.
    let mut kept_ids: Vec<usize> = Vec::new();
    let mut kept_ranks: Vec<TensorRank> = Vec::new();
    let mut offset = 0usize;
    for (&rank, &mult) in product_mults.iter() {
        let size = rank.size(d);
        let cap = max_mults.get(&rank).copied().unwrap_or(0);
        let keep = mult.min(cap);
        if keep > 0 {
            let chosen = sample_without_replacement(mult, keep, &mut rng);
            for &c in &chosen {
                let base = offset + c * size;
                kept_ids.extend(base..base + size);
            }
            kept_ranks.extend(std::iter::repeat(rank).take(keep));
        }
        offset += mult * size;
    }

    // Map grouped positions back through the ordering permutation and
    // the product layout permutation.
    let ordering = product.ordering_permutation()?;
    let layout = product.product_permutation()?;
    let inverse_layout = invert_permutation(layout);
    let ids = kept_ids
        .iter()
        .map(|&i| inverse_layout[ordering[i]])
        .collect();

    let capped = Representation::new(kept_ranks).bind(Arc::clone(group));
    Ok((capped, ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{Group, MatrixGroup};
    use scirs2_core::ndarray_ext::Array1;

    fn trivial() -> Arc<dyn Group> {
        Arc::new(MatrixGroup::trivial(2))
    }

    fn weight_rep() -> Representation {
        Representation::new(vec![
            TensorRank::new(1, 0),
            TensorRank::new(0, 0),
            TensorRank::new(1, 0),
        ])
        .bind(trivial())
    }

    fn feature_rep() -> Representation {
        Representation::new(vec![
            TensorRank::new(0, 0),
            TensorRank::new(1, 0),
            TensorRank::new(1, 0),
            TensorRank::new(1, 0),
        ])
        .bind(trivial())
    }

    #[test]
    fn test_parameter_count() {
        // Two weight vectors pair with min(3, 2) sampled feature vectors;
        // the weight scalar has no feature source.
        let map = bilinear_weights(&weight_rep(), &feature_rep(), Some(7)).unwrap();
        assert_eq!(map.param_count(), 4);
        assert_eq!(map.x_size(), 7);
        assert_eq!(map.w_size(), 5);
    }

    #[test]
    fn test_scalar_weight_block_is_zero() {
        let map = bilinear_weights(&weight_rep(), &feature_rep(), Some(7)).unwrap();
        let params = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let x = Array2::from_shape_fn((7, 2), |(i, j)| (i as f64) + 10.0 * (j as f64));
        let out = map.apply(&params.view(), &x.view()).unwrap();
        assert_eq!(out.shape(), &[5, 2]);
        // Declared order is vector, scalar, vector; the scalar row is 2.
        for j in 0..2 {
            assert_eq!(out[[2, j]], 0.0);
        }
    }

    #[test]
    fn test_identical_feature_vectors_sum_parameters() {
        // With every feature vector equal, any sampled pair contracts to
        // (row sums of the parameter block) times the shared vector.
        let w = weight_rep();
        let x_rep = feature_rep();
        let map = bilinear_weights(&w, &x_rep, Some(3)).unwrap();

        let v = [0.5, -2.0];
        let mut x = Array2::zeros((7, 1));
        for base in [1usize, 3, 5] {
            x[[base, 0]] = v[0];
            x[[base + 1, 0]] = v[1];
        }
        let params = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let out = map.apply(&params.view(), &x.view()).unwrap();

        // First weight copy scales by 1 + 2, second by 3 + 4.
        assert!((out[[0, 0]] - 3.0 * v[0]).abs() < 1e-12);
        assert!((out[[1, 0]] - 3.0 * v[1]).abs() < 1e-12);
        assert!((out[[3, 0]] - 7.0 * v[0]).abs() < 1e-12);
        assert!((out[[4, 0]] - 7.0 * v[1]).abs() < 1e-12);
        assert_eq!(out[[2, 0]], 0.0);
    }

    #[test]
    fn test_linear_in_parameters_and_deterministic() {
        let map = bilinear_weights(&weight_rep(), &feature_rep(), Some(11)).unwrap();
        let params = Array1::from_vec(vec![0.5, -1.0, 2.0, 0.25]);
        let doubled = params.mapv(|p| 2.0 * p);
        let x = Array2::from_shape_fn((7, 3), |(i, j)| ((i * 3 + j) as f64).sin());

        let out = map.apply(&params.view(), &x.view()).unwrap();
        let out2 = map.apply(&doubled.view(), &x.view()).unwrap();
        for (a, b) in out.iter().zip(out2.iter()) {
            assert!((2.0 * a - b).abs() < 1e-12);
        }

        let again = bilinear_weights(&weight_rep(), &feature_rep(), Some(11)).unwrap();
        let out3 = again.apply(&params.view(), &x.view()).unwrap();
        for (a, b) in out.iter().zip(out3.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_argument_validation() {
        let map = bilinear_weights(&weight_rep(), &feature_rep(), Some(1)).unwrap();
        let short = Array1::from_vec(vec![1.0]);
        let x = Array2::zeros((7, 1));
        assert!(map.apply(&short.view(), &x.view()).is_err());

        let params = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let bad_x = Array2::zeros((6, 1));
        assert!(map.apply(&params.view(), &bad_x.view()).is_err());

        let unbound = Representation::vector();
        assert!(bilinear_weights(&unbound, &feature_rep(), None).is_err());

        let other_group = Representation::vector().bind(Arc::new(MatrixGroup::trivial(3)));
        assert!(bilinear_weights(&other_group, &feature_rep(), None).is_err());
    }

    #[test]
    fn test_capped_tensor_ids_layout() {
        // (vector + scalar)^2 over d = 2 lives on a 3 x 3 grid. Keeping
        // one of the two mixed vector copies selects either the last
        // column or the last row of the grid minus the corner; the kept
        // scalar is always the corner.
        let rep = Representation::vector()
            .combine(&Representation::scalar())
            .bind(trivial());
        let max_rep = Representation::new(vec![TensorRank::new(1, 0), TensorRank::new(0, 0)])
            .bind(trivial());

        let (capped, ids) = capped_tensor_ids(&rep, &max_rep, Some(5)).unwrap();
        assert_eq!(
            capped.ranks(),
            &[TensorRank::new(1, 0), TensorRank::new(0, 0)]
        );
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[2], 8);
        assert!(ids[..2] == [2, 5] || ids[..2] == [6, 7], "ids = {ids:?}");
    }

    #[test]
    fn test_capped_tensor_ids_cap_zero_drops_rank() {
        let rep = Representation::vector()
            .combine(&Representation::scalar())
            .bind(trivial());
        // Only matrix-like entries are allowed through.
        let max_rep = Representation::new(vec![TensorRank::new(2, 0)]).bind(trivial());

        let (capped, ids) = capped_tensor_ids(&rep, &max_rep, Some(5)).unwrap();
        assert_eq!(capped.ranks(), &[TensorRank::new(2, 0)]);
        assert_eq!(ids, vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_capped_ids_are_deterministic_under_seed() {
        let rep = Representation::vector()
            .repeat(2)
            .combine(&Representation::scalar())
            .bind(trivial());
        let max_rep = Representation::new(vec![
            TensorRank::new(2, 0),
            TensorRank::new(1, 0),
            TensorRank::new(0, 0),
        ])
        .bind(trivial());

        let (_, a) = capped_tensor_ids(&rep, &max_rep, Some(9)).unwrap();
        let (_, b) = capped_tensor_ids(&rep, &max_rep, Some(9)).unwrap();
        assert_eq!(a, b);
        let product_size = 25;
        for &id in &a {
            assert!(id < product_size);
        }
        let mut sorted = a.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), a.len());
    }
}
