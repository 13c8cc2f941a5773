//! Symmetry groups presented by generator matrices.
//!
//! A group enters the subspace machinery only through its finite list of
//! Lie-algebra generators and discrete generators in the defining
//! representation. Everything downstream (constraint assembly, null
//! spaces, caching) is derived from those matrices, so any matrix Lie
//! group with finitely many generating elements fits behind the [`Group`]
//! trait.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use scirs2_core::ndarray_ext::Array2;

use equirso_ops::LinOp;

use crate::cache::SubspaceCache;
use crate::error::{SubspaceError, SubspaceResult};
use crate::nullspace::NullspaceOptions;
use crate::rank::TensorRank;

/// Tolerance for the generator structure checks behind unimodularity
/// detection.
const STRUCTURE_TOL: f64 = 1e-10;

/// A symmetry group presented by generator matrices.
pub trait Group: fmt::Debug + Send + Sync {
    /// Base dimension d of the defining representation.
    fn dim(&self) -> usize;

    /// Lie-algebra generators, each d × d.
    fn lie_generators(&self) -> &[Array2<f64>];

    /// Discrete generators, each d × d and invertible.
    fn discrete_generators(&self) -> &[Array2<f64>];

    /// Whether covariant and contravariant indices transform identically,
    /// so rank (p, q) bookkeeping collapses to the total order p + q.
    fn is_unimodular(&self) -> bool;

    /// Content fingerprint over dimension, generators, and the
    /// unimodularity flag. Used as the cache key, so two groups with the
    /// same generator matrices share cached subspaces.
    fn fingerprint(&self) -> u64 {
        content_fingerprint(
            self.dim(),
            self.lie_generators(),
            self.discrete_generators(),
            self.is_unimodular(),
        )
    }

    /// Projector onto the invariant subspace at `rank`, as an operator.
    ///
    /// The default is the cached dense QᵀQ. Groups with a cheaper exact
    /// projector can override this.
    fn projector(
        &self,
        rank: TensorRank,
        cache: &SubspaceCache,
        opts: &NullspaceOptions,
    ) -> SubspaceResult<LinOp> {
        cache.projector_op(self, rank, opts)
    }
}

fn content_fingerprint(
    d: usize,
    lie: &[Array2<f64>],
    discrete: &[Array2<f64>],
    unimodular: bool,
) -> u64 {
    let mut hasher = DefaultHasher::new();
    d.hash(&mut hasher);
    unimodular.hash(&mut hasher);
    lie.len().hash(&mut hasher);
    for gen in lie {
        for &x in gen.iter() {
            x.to_bits().hash(&mut hasher);
        }
    }
    discrete.len().hash(&mut hasher);
    for gen in discrete {
        for &x in gen.iter() {
            x.to_bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}

/// A group given by explicit generator lists.
#[derive(Debug, Clone)]
pub struct MatrixGroup {
    d: usize,
    lie: Vec<Array2<f64>>,
    discrete: Vec<Array2<f64>>,
    unimodular: bool,
}

impl MatrixGroup {
    /// Construct a group over base dimension `d` from generator lists.
    ///
    /// Unimodularity is detected from the generators: skew-symmetric Lie
    /// generators together with orthogonal discrete generators mean the
    /// defining representation is self-dual, so covariant and
    /// contravariant indices collapse. The detected flag can be
    /// overridden with [`with_unimodular`](MatrixGroup::with_unimodular).
    ///
    /// # Errors
    ///
    /// Returns [`SubspaceError::ShapeMismatch`] if `d` is zero or any
    /// generator is not d × d.
    pub fn new(
        d: usize,
        lie: Vec<Array2<f64>>,
        discrete: Vec<Array2<f64>>,
    ) -> SubspaceResult<Self> {
        if d == 0 {
            return Err(SubspaceError::ShapeMismatch(
                "group dimension must be positive".into(),
            ));
        }
        for (kind, gens) in [("lie", &lie), ("discrete", &discrete)] {
            for (i, gen) in gens.iter().enumerate() {
                if gen.dim() != (d, d) {
                    return Err(SubspaceError::ShapeMismatch(format!(
                        "{kind} generator {i} has shape {:?}, expected [{d}, {d}]",
                        gen.shape()
                    )));
                }
            }
        }
        let unimodular =
            lie.iter().all(is_skew_symmetric) && discrete.iter().all(is_orthogonal);
        Ok(Self {
            d,
            lie,
            discrete,
            unimodular,
        })
    }

    /// The generator-free group over `d` dimensions: every tensor is
    /// invariant.
    pub fn trivial(d: usize) -> Self {
        Self {
            d,
            lie: Vec::new(),
            discrete: Vec::new(),
            unimodular: true,
        }
    }

    /// Override the detected unimodularity flag.
    pub fn with_unimodular(mut self, unimodular: bool) -> Self {
        self.unimodular = unimodular;
        self
    }
}

fn is_skew_symmetric(a: &Array2<f64>) -> bool {
    let n = a.nrows();
    for i in 0..n {
        for j in 0..n {
            if (a[[i, j]] + a[[j, i]]).abs() > STRUCTURE_TOL {
                return false;
            }
        }
    }
    true
}

fn is_orthogonal(h: &Array2<f64>) -> bool {
    let gram = h.t().dot(h);
    let n = h.nrows();
    for i in 0..n {
        for j in 0..n {
            let expected = if i == j { 1.0 } else { 0.0 };
            if (gram[[i, j]] - expected).abs() > STRUCTURE_TOL {
                return false;
            }
        }
    }
    true
}

impl Group for MatrixGroup {
    fn dim(&self) -> usize {
        self.d
    }

    fn lie_generators(&self) -> &[Array2<f64>] {
        &self.lie
    }

    fn discrete_generators(&self) -> &[Array2<f64>] {
        &self.discrete
    }

    fn is_unimodular(&self) -> bool {
        self.unimodular
    }
}
