//! Shared cache of invariant subspaces.
//!
//! Constraint assembly and the SVD behind a null space are by far the
//! most expensive steps in this crate, and the same (group, rank) pair
//! recurs across representations. The cache keys on the group content
//! fingerprint plus the rank, computes outside the lock, and stores
//! immutable results behind `Arc`, so readers never observe a partially
//! built basis.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use scirs2_core::ndarray_ext::Array2;

use equirso_ops::LinOp;

use crate::constraint::constraint_matrix;
use crate::error::SubspaceResult;
use crate::group::Group;
use crate::nullspace::{null_space_basis, NullspaceOptions};
use crate::rank::TensorRank;

/// Invariant subspace of one (group, rank) pair.
#[derive(Debug, Clone)]
pub struct RankSubspace {
    basis: Array2<f64>,
    projector: Array2<f64>,
}

impl RankSubspace {
    fn from_basis(basis: Array2<f64>) -> Self {
        let projector = basis.t().dot(&basis);
        Self { basis, projector }
    }

    /// Orthonormal basis rows Q, shaped dim × ambient.
    pub fn basis(&self) -> &Array2<f64> {
        &self.basis
    }

    /// The derived projector QᵀQ, shaped ambient × ambient.
    pub fn projector(&self) -> &Array2<f64> {
        &self.projector
    }

    /// Invariant dimension.
    pub fn dim(&self) -> usize {
        self.basis.nrows()
    }

    /// Ambient dimension d^(p+q).
    pub fn ambient(&self) -> usize {
        self.basis.ncols()
    }
}

/// Cache statistics snapshot.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that computed a fresh subspace
    pub misses: u64,
    /// Entries removed by invalidation or clearing
    pub invalidations: u64,
    /// Current entry count
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate in [0, 1]; zero when no lookups have happened.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<(u64, TensorRank), Arc<RankSubspace>>,
    stats: CacheStats,
}

/// Shared cache of invariant subspaces keyed by (group fingerprint,
/// rank). Cloning shares the underlying storage.
#[derive(Debug, Clone, Default)]
pub struct SubspaceCache {
    inner: Arc<Mutex<CacheInner>>,
}

impl SubspaceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Invariant subspace of `rank` under `group`, computed on first use.
    ///
    /// The scalar rank is constraint-free and gets the 1 × 1 ones basis
    /// directly. Otherwise the constraint matrix and its null space are
    /// computed outside the lock; when two threads race on the same key
    /// the first insert wins and both observe the same entry.
    pub fn subspace<G: Group + ?Sized>(
        &self,
        group: &G,
        rank: TensorRank,
        opts: &NullspaceOptions,
    ) -> SubspaceResult<Arc<RankSubspace>> {
        let key = (group.fingerprint(), rank);

        {
            let mut inner = self.inner.lock().unwrap();
            if let Some(entry) = inner.entries.get(&key).cloned() {
                inner.stats.hits += 1;
                return Ok(entry);
            }
            inner.stats.misses += 1;
        }

        let basis = if rank.is_scalar() {
            Array2::ones((1, 1))
        } else {
            let constraint = constraint_matrix(group, rank)?;
            null_space_basis(&constraint.view(), opts)?
        };
        let fresh = Arc::new(RankSubspace::from_basis(basis));

        let mut inner = self.inner.lock().unwrap();
        let entry = Arc::clone(inner.entries.entry(key).or_insert(fresh));
        inner.stats.entries = inner.entries.len();
        Ok(entry)
    }

    /// The projector QᵀQ for (group, rank) as a dense operator.
    pub fn projector_op<G: Group + ?Sized>(
        &self,
        group: &G,
        rank: TensorRank,
        opts: &NullspaceOptions,
    ) -> SubspaceResult<LinOp> {
        let subspace = self.subspace(group, rank, opts)?;
        Ok(LinOp::dense(subspace.projector().clone()))
    }

    /// Remove every entry belonging to `group`.
    pub fn invalidate<G: Group + ?Sized>(&self, group: &G) {
        let fingerprint = group.fingerprint();
        let mut inner = self.inner.lock().unwrap();
        let before = inner.entries.len();
        inner.entries.retain(|&(fp, _), _| fp != fingerprint);
        let removed = before - inner.entries.len();
        inner.stats.invalidations += removed as u64;
        inner.stats.entries = inner.entries.len();
    }

    /// Remove all entries.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        let removed = inner.entries.len();
        inner.entries.clear();
        inner.stats.invalidations += removed as u64;
        inner.stats.entries = 0;
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().unwrap().stats.clone()
    }

    /// Zero the counters, keeping entries.
    pub fn reset_stats(&self) {
        let mut inner = self.inner.lock().unwrap();
        let entries = inner.entries.len();
        inner.stats = CacheStats {
            entries,
            ..CacheStats::default()
        };
    }
}
