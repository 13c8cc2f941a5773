//! Property-based tests for representation-level invariants.

use proptest::prelude::*;
use std::sync::Arc;

use scirs2_core::ndarray_ext::{array, Array2};

use crate::cache::SubspaceCache;
use crate::group::{Group, MatrixGroup};
use crate::nullspace::NullspaceOptions;
use crate::rank::TensorRank;
use crate::rep::Representation;

fn so2() -> Arc<dyn Group> {
    Arc::new(MatrixGroup::new(2, vec![array![[0.0, -1.0], [1.0, 0.0]]], vec![]).unwrap())
}

fn shear() -> Arc<dyn Group> {
    Arc::new(MatrixGroup::new(2, vec![array![[0.0, 1.0], [0.0, 0.0]]], vec![]).unwrap())
}

fn rank_strategy() -> impl Strategy<Value = TensorRank> {
    (0usize..=2, 0usize..=2)
        .prop_filter("keep tensor orders small", |(p, q)| p + q <= 2)
        .prop_map(|(p, q)| TensorRank::new(p, q))
}

fn ranks_strategy() -> impl Strategy<Value = Vec<TensorRank>> {
    proptest::collection::vec(rank_strategy(), 1..5)
}

fn max_abs_diff(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

proptest! {
    #[test]
    fn prop_ordering_permutation_roundtrips(
        ranks in ranks_strategy(),
        unimodular in any::<bool>(),
    ) {
        let group = if unimodular { so2() } else { shear() };
        let rep = Representation::new(ranks).bind(group);
        let perm = rep.ordering_permutation().unwrap().to_vec();
        let inverse = rep.inverse_ordering_permutation().unwrap().to_vec();

        prop_assert_eq!(perm.len(), rep.size().unwrap());
        prop_assert!(equirso_ops::is_permutation(&perm));
        for i in 0..perm.len() {
            prop_assert_eq!(inverse[perm[i]], i);
        }
    }

    #[test]
    fn prop_multiplicities_count_every_rank(ranks in ranks_strategy()) {
        let rep = Representation::new(ranks.clone()).bind(so2());
        let mults = rep.multiplicities();

        let total: usize = mults.values().sum();
        prop_assert_eq!(total, ranks.len());

        let grouped_size: usize = mults.iter().map(|(r, &m)| m * r.size(2)).sum();
        prop_assert_eq!(grouped_size, rep.size().unwrap());
    }

    #[test]
    fn prop_projection_is_idempotent(ranks in ranks_strategy()) {
        let rep = Representation::new(ranks).bind(so2());
        let cache = SubspaceCache::new();
        let proj = rep
            .symmetric_projection(&cache, &NullspaceOptions::default())
            .unwrap();
        let p = proj.to_dense().unwrap();
        let pp = p.dot(&p);
        prop_assert!(max_abs_diff(&pp, &p) < 1e-8);
    }

    #[test]
    fn prop_projection_fixes_expanded_coefficients(ranks in ranks_strategy()) {
        let rep = Representation::new(ranks).bind(so2());
        let cache = SubspaceCache::new();
        let opts = NullspaceOptions::default();
        let map = rep.symmetric_subspace(&cache, &opts).unwrap();
        let proj = rep.symmetric_projection(&cache, &opts).unwrap();

        let m = map.to_dense().unwrap();
        let fixed = proj.apply(&m.view()).unwrap();
        prop_assert!(max_abs_diff(&fixed, &m) < 1e-8);
    }

    #[test]
    fn prop_product_permutation_is_permutation(
        left in ranks_strategy(),
        right in ranks_strategy(),
    ) {
        let product = Representation::new(left)
            .tensor_product(&Representation::new(right))
            .bind(so2());
        let perm = product.product_permutation().unwrap().to_vec();

        prop_assert_eq!(perm.len(), product.size().unwrap());
        prop_assert!(equirso_ops::is_permutation(&perm));
    }
}
