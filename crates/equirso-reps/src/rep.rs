//! Representations: ordered direct sums of tensor ranks.
//!
//! A representation is a list of [`TensorRank`]s in declaration order,
//! optionally bound to a [`Group`]. Tensor products additionally remember
//! the rank lists of their factors so that flattened data can be laid out
//! in the row-major multi-axis order users expect, rather than the
//! internal concatenated-block order.
//!
//! Equality and hashing look only at the rank structure; two
//! representations with the same ranks compare equal regardless of
//! binding. The derived permutations are cached per instance and rebuilt
//! when a representation is bound to a different group.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;

use scirs2_core::ndarray_ext::ArrayView2;

use equirso_ops::{invert_permutation, LinOp};

use crate::constraint;
use crate::error::{SubspaceError, SubspaceResult};
use crate::group::Group;
use crate::rank::TensorRank;

/// Ordering permutation pair of a bound representation.
#[derive(Debug, Clone)]
struct OrderingPerms {
    perm: Vec<usize>,
    inverse: Vec<usize>,
}

/// An ordered direct sum of tensor ranks, optionally bound to a group.
#[derive(Debug, Clone)]
pub struct Representation {
    ranks: Vec<TensorRank>,
    /// Component rank lists of a tensor product; a plain sum has a single
    /// component equal to `ranks`.
    shapes: Vec<Vec<TensorRank>>,
    group: Option<Arc<dyn Group>>,
    ordering: OnceLock<OrderingPerms>,
    product_perm: OnceLock<Vec<usize>>,
}

impl Representation {
    /// Direct sum of `ranks` in the given order, unbound.
    pub fn new(ranks: Vec<TensorRank>) -> Self {
        let shapes = vec![ranks.clone()];
        Self {
            ranks,
            shapes,
            group: None,
            ordering: OnceLock::new(),
            product_perm: OnceLock::new(),
        }
    }

    /// The single rank T(p, q).
    pub fn tensor(p: usize, q: usize) -> Self {
        Self::new(vec![TensorRank::new(p, q)])
    }

    /// The scalar rank T(0, 0).
    pub fn scalar() -> Self {
        Self::tensor(0, 0)
    }

    /// The vector rank T(1, 0).
    pub fn vector() -> Self {
        Self::tensor(1, 0)
    }

    /// The linear-map rank T(1, 1).
    pub fn matrix() -> Self {
        Self::tensor(1, 1)
    }

    /// The quadratic-form rank T(0, 2).
    pub fn quad() -> Self {
        Self::tensor(0, 2)
    }

    /// Bind to a group. Rebinding replaces any previous group; the
    /// derived permutations are rebuilt lazily for the new binding.
    pub fn bind(&self, group: Arc<dyn Group>) -> Representation {
        Representation {
            ranks: self.ranks.clone(),
            shapes: self.shapes.clone(),
            group: Some(group),
            ordering: OnceLock::new(),
            product_perm: OnceLock::new(),
        }
    }

    /// The bound group, if any.
    pub fn group(&self) -> Option<&Arc<dyn Group>> {
        self.group.as_ref()
    }

    pub(crate) fn require_group(&self) -> SubspaceResult<&Arc<dyn Group>> {
        self.group.as_ref().ok_or_else(|| {
            SubspaceError::Unsupported(
                "representation is not bound to a symmetry group".into(),
            )
        })
    }

    /// Ranks in declaration order.
    pub fn ranks(&self) -> &[TensorRank] {
        &self.ranks
    }

    /// Base dimension of the bound group.
    pub fn dim(&self) -> Option<usize> {
        self.group.as_ref().map(|g| g.dim())
    }

    /// Total dimension, the sum of d^(p+q) over the ranks. `None` when
    /// unbound.
    pub fn size(&self) -> Option<usize> {
        self.dim()
            .map(|d| self.ranks.iter().map(|r| r.size(d)).sum())
    }

    /// Per-component dimensions of a product representation. A plain sum
    /// reports one entry. `None` when unbound.
    pub fn shape(&self) -> Option<Vec<usize>> {
        self.dim().map(|d| {
            self.shapes
                .iter()
                .map(|component| component.iter().map(|r| r.size(d)).sum())
                .collect()
        })
    }

    /// Whether this representation carries more than one product
    /// component.
    pub fn is_product(&self) -> bool {
        self.shapes.len() > 1
    }

    fn merged_group(&self, other: &Representation) -> Option<Arc<dyn Group>> {
        self.group.clone().or_else(|| other.group.clone())
    }

    /// Direct sum with `other`: ranks concatenate in order. Product
    /// bookkeeping resets to a single component.
    pub fn combine(&self, other: &Representation) -> Representation {
        let mut ranks = self.ranks.clone();
        ranks.extend_from_slice(&other.ranks);
        let mut rep = Representation::new(ranks);
        rep.group = self.merged_group(other);
        rep
    }

    /// `times`-fold direct sum with itself.
    pub fn repeat(&self, times: usize) -> Representation {
        let mut rep = Representation::new(self.ranks.repeat(times));
        rep.group = self.group.clone();
        rep
    }

    /// Tensor product with `other`: pairwise rank sums in row-major
    /// product order, with the component lists of both factors kept for
    /// layout bookkeeping.
    pub fn tensor_product(&self, other: &Representation) -> Representation {
        let mut ranks = Vec::with_capacity(self.ranks.len() * other.ranks.len());
        for a in &self.ranks {
            for b in &other.ranks {
                ranks.push(TensorRank::new(a.p + b.p, a.q + b.q));
            }
        }
        let mut shapes = self.shapes.clone();
        shapes.extend(other.shapes.iter().cloned());
        Representation {
            ranks,
            shapes,
            group: self.merged_group(other),
            ordering: OnceLock::new(),
            product_perm: OnceLock::new(),
        }
    }

    /// Rank-wise dual.
    pub fn dual(&self) -> Representation {
        let mut rep = Representation::new(self.ranks.iter().map(|r| r.dual()).collect());
        rep.group = self.group.clone();
        rep
    }

    fn unimodular(&self) -> bool {
        self.group
            .as_ref()
            .map(|g| g.is_unimodular())
            .unwrap_or(false)
    }

    /// Grouped multiplicities in first-occurrence order: each declared
    /// rank is collapsed under the bound group's unimodularity and mapped
    /// to its count.
    pub fn multiplicities(&self) -> IndexMap<TensorRank, usize> {
        let unimodular = self.unimodular();
        let mut mults = IndexMap::new();
        for rank in &self.ranks {
            *mults.entry(rank.grouped(unimodular)).or_insert(0) += 1;
        }
        mults
    }

    fn compute_ordering(&self, d: usize, unimodular: bool) -> OrderingPerms {
        let mut buckets: IndexMap<TensorRank, Vec<usize>> = IndexMap::new();
        let mut offset = 0;
        for rank in &self.ranks {
            let size = rank.size(d);
            buckets
                .entry(rank.grouped(unimodular))
                .or_default()
                .extend(offset..offset + size);
            offset += size;
        }
        let perm: Vec<usize> = buckets.into_values().flatten().collect();
        let inverse = invert_permutation(&perm);
        OrderingPerms { perm, inverse }
    }

    fn ordering(&self) -> SubspaceResult<&OrderingPerms> {
        let group = self.require_group()?;
        let d = group.dim();
        let unimodular = group.is_unimodular();
        Ok(self
            .ordering
            .get_or_init(|| self.compute_ordering(d, unimodular)))
    }

    /// Permutation gathering equal collapsed ranks into contiguous runs:
    /// entry j of the grouped layout is entry `perm[j]` of the declared
    /// layout.
    pub fn ordering_permutation(&self) -> SubspaceResult<&[usize]> {
        Ok(&self.ordering()?.perm)
    }

    /// Inverse of [`ordering_permutation`](Self::ordering_permutation).
    pub fn inverse_ordering_permutation(&self) -> SubspaceResult<&[usize]> {
        Ok(&self.ordering()?.inverse)
    }

    fn compute_product_perm(&self, d: usize) -> Vec<usize> {
        let sizes: Vec<Vec<usize>> = self
            .shapes
            .iter()
            .map(|component| component.iter().map(|r| r.size(d)).collect())
            .collect();
        let offsets: Vec<Vec<usize>> = sizes
            .iter()
            .map(|s| {
                let mut acc = 0;
                let mut offs = Vec::with_capacity(s.len());
                for &size in s {
                    offs.push(acc);
                    acc += size;
                }
                offs
            })
            .collect();
        let totals: Vec<usize> = sizes.iter().map(|s| s.iter().sum()).collect();
        let total: usize = totals.iter().product();
        if total == 0 || sizes.iter().any(|s| s.is_empty()) {
            return Vec::new();
        }

        // Row-major strides over the component axes.
        let ncomp = totals.len();
        let mut strides = vec![1usize; ncomp];
        for c in (0..ncomp.saturating_sub(1)).rev() {
            strides[c] = strides[c + 1] * totals[c + 1];
        }

        let mut perm = vec![0usize; total];
        let mut seq = 0usize;

        // Outer odometer walks one rank index per component, last
        // component fastest; the inner odometer walks the element offsets
        // of the selected block in the same order. Each block is filled
        // with consecutive sequence numbers, which is exactly the
        // concatenated-block order of the product's rank list.
        let mut block = vec![0usize; ncomp];
        loop {
            let base: usize = block
                .iter()
                .enumerate()
                .map(|(c, &j)| offsets[c][j] * strides[c])
                .sum();
            let dims: Vec<usize> = block
                .iter()
                .enumerate()
                .map(|(c, &j)| sizes[c][j])
                .collect();
            let chunk: usize = dims.iter().product();

            let mut elem = vec![0usize; ncomp];
            for _ in 0..chunk {
                let flat: usize = base
                    + elem
                        .iter()
                        .enumerate()
                        .map(|(c, &e)| e * strides[c])
                        .sum::<usize>();
                perm[flat] = seq;
                seq += 1;
                for c in (0..ncomp).rev() {
                    elem[c] += 1;
                    if elem[c] < dims[c] {
                        break;
                    }
                    elem[c] = 0;
                }
            }

            let mut done = true;
            for c in (0..ncomp).rev() {
                block[c] += 1;
                if block[c] < sizes[c].len() {
                    done = false;
                    break;
                }
                block[c] = 0;
            }
            if done {
                break;
            }
        }
        perm
    }

    /// Layout permutation of a product representation: entry f of the
    /// row-major multi-component layout is entry `perm[f]` of the
    /// concatenated-block layout. The identity for plain sums.
    pub fn product_permutation(&self) -> SubspaceResult<&[usize]> {
        let group = self.require_group()?;
        let d = group.dim();
        Ok(self.product_perm.get_or_init(|| self.compute_product_perm(d)))
    }

    /// Block-diagonal infinitesimal action of `a` over the declared
    /// ranks.
    pub fn lie_action(&self, a: &ArrayView2<f64>) -> SubspaceResult<LinOp> {
        let blocks = self
            .ranks
            .iter()
            .map(|&rank| constraint::lie_action(a, rank))
            .collect::<SubspaceResult<Vec<_>>>()?;
        let mults = vec![1; blocks.len()];
        Ok(LinOp::direct_sum(blocks, mults)?)
    }

    /// Block-diagonal finite action of `h` over the declared ranks.
    pub fn finite_action(&self, h: &ArrayView2<f64>) -> SubspaceResult<LinOp> {
        let blocks = self
            .ranks
            .iter()
            .map(|&rank| constraint::finite_action(h, rank))
            .collect::<SubspaceResult<Vec<_>>>()?;
        let mults = vec![1; blocks.len()];
        Ok(LinOp::direct_sum(blocks, mults)?)
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unimodular = self.unimodular();
        let mults = self.multiplicities();
        let terms: Vec<String> = mults
            .iter()
            .map(|(rank, &mult)| {
                let body = if unimodular {
                    format!("T({})", rank.p)
                } else {
                    format!("T({},{})", rank.p, rank.q)
                };
                if mult > 1 {
                    format!("{mult}{body}")
                } else {
                    body
                }
            })
            .collect();
        if terms.is_empty() {
            write!(f, "0")?;
        } else {
            write!(f, "{}", terms.join("+"))?;
        }
        if let Some(d) = self.dim() {
            write!(f, " @ d={d}")?;
        }
        Ok(())
    }
}

impl PartialEq for Representation {
    fn eq(&self, other: &Self) -> bool {
        self.ranks == other.ranks && self.shapes == other.shapes
    }
}

impl Eq for Representation {}

impl Hash for Representation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ranks.hash(state);
        self.shapes.hash(state);
    }
}
