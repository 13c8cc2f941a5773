//! Matrix-free linear operators.
//!
//! [`LinOp`] is a closed algebra of structured operators dispatched by
//! exhaustive `match`: identity, dense, permutation, Kronecker product,
//! Kronecker sum, direct sum with multiplicities, vertical concatenation,
//! and externally differentiated operator families. Composite operators
//! apply themselves without materializing dense matrices; `to_dense` and
//! `to_sparse` are explicit, and capabilities an operator cannot honor
//! surface [`OpError::Unsupported`] rather than falling back silently.

use std::fmt;
use std::sync::Arc;

use scirs2_core::ndarray::concatenate;
use scirs2_core::ndarray_ext::{s, Array1, Array2, ArrayD, ArrayView1, ArrayView2, Axis, IxDyn};
use scirs2_linalg::inv;

use crate::dense;
use crate::error::{OpError, OpResult};
use crate::sparse::CooMatrix;

/// Forward-mode directional-derivative primitive supplied by an external
/// differentiation engine.
///
/// The backend represents the derivative of a parameterized operator
/// family at a fixed base point along a fixed tangent. `jvp` applies that
/// derivative to a column batch; `jvp_transpose` applies the derivative of
/// the transposed family. The operator layer treats the backend as opaque
/// and never differentiates anything itself; in particular it is not a
/// finite-difference fallback.
pub trait JvpBackend: fmt::Debug + Send + Sync {
    /// Operator dimensions as `(rows, cols)`.
    fn shape(&self) -> (usize, usize);

    /// Apply the directional derivative to a `cols × k` batch.
    fn jvp(&self, v: &ArrayView2<f64>) -> OpResult<Array2<f64>>;

    /// Apply the transposed family's directional derivative to a
    /// `rows × k` batch.
    fn jvp_transpose(&self, v: &ArrayView2<f64>) -> OpResult<Array2<f64>>;
}

/// A matrix-free linear operator.
///
/// Acts on column batches: [`apply`](LinOp::apply) maps a `cols × k`
/// array to `rows × k`. Structure is preserved where the mathematics
/// allows (adjoints and inverse-transposes stay structured); dense and
/// sparse materialization are explicit and agree with `apply` on standard
/// basis vectors.
///
/// The enum is closed on purpose: consumers dispatch with exhaustive
/// `match`, and new operator kinds are a semver event.
#[derive(Debug, Clone)]
pub enum LinOp {
    /// Identity on `n` dimensions.
    Identity(usize),
    /// Dense matrix.
    Dense(Array2<f64>),
    /// Row gather `out[i] = v[perm[i]]`.
    Perm(Vec<usize>),
    /// Kronecker product of the factors, leftmost factor slowest.
    Kron(Vec<LinOp>),
    /// Kronecker sum of square factors.
    KronSum(Vec<LinOp>),
    /// Block diagonal; each block repeated by its multiplicity.
    DirectSum {
        /// Distinct blocks in order
        blocks: Vec<LinOp>,
        /// Repetition count per block
        mults: Vec<usize>,
    },
    /// Vertical stack of operators sharing a column count.
    Concat(Vec<LinOp>),
    /// Externally differentiated operator family.
    Jvp(Arc<dyn JvpBackend>),
}

impl LinOp {
    /// Identity operator on `n` dimensions.
    pub fn identity(n: usize) -> Self {
        LinOp::Identity(n)
    }

    /// Wrap a dense matrix.
    pub fn dense(a: Array2<f64>) -> Self {
        LinOp::Dense(a)
    }

    /// Permutation operator `out[i] = v[perm[i]]`.
    ///
    /// # Errors
    ///
    /// Returns [`OpError::ShapeMismatch`] if `perm` is not a permutation
    /// of `0..perm.len()`.
    pub fn perm(perm: Vec<usize>) -> OpResult<Self> {
        if !dense::is_permutation(&perm) {
            return Err(OpError::shape_mismatch(
                "LinOp::perm",
                vec![perm.len()],
                vec![perm.len()],
                "index vector is not a permutation of 0..n",
            ));
        }
        Ok(LinOp::Perm(perm))
    }

    /// Kronecker product of `factors`.
    ///
    /// A single factor is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`OpError::ShapeMismatch`] if the factor list is empty.
    pub fn kron(mut factors: Vec<LinOp>) -> OpResult<Self> {
        if factors.is_empty() {
            return Err(OpError::shape_mismatch(
                "LinOp::kron",
                vec![1],
                vec![0],
                "factor list must be non-empty",
            ));
        }
        if factors.len() == 1 {
            return Ok(factors.remove(0));
        }
        Ok(LinOp::Kron(factors))
    }

    /// Kronecker sum of square `factors`.
    ///
    /// A single factor is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`OpError::ShapeMismatch`] if the factor list is empty or
    /// any factor is not square.
    pub fn kron_sum(mut factors: Vec<LinOp>) -> OpResult<Self> {
        if factors.is_empty() {
            return Err(OpError::shape_mismatch(
                "LinOp::kron_sum",
                vec![1],
                vec![0],
                "factor list must be non-empty",
            ));
        }
        for f in &factors {
            let (r, c) = f.shape();
            if r != c {
                return Err(OpError::shape_mismatch(
                    "LinOp::kron_sum",
                    vec![r, r],
                    vec![r, c],
                    "factors must be square",
                ));
            }
        }
        if factors.len() == 1 {
            return Ok(factors.remove(0));
        }
        Ok(LinOp::KronSum(factors))
    }

    /// Block-diagonal operator; `blocks[i]` is repeated `mults[i]` times.
    ///
    /// A single block with multiplicity one is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`OpError::ShapeMismatch`] if the block list is empty or
    /// the block and multiplicity lists disagree in length.
    pub fn direct_sum(mut blocks: Vec<LinOp>, mults: Vec<usize>) -> OpResult<Self> {
        if blocks.is_empty() {
            return Err(OpError::shape_mismatch(
                "LinOp::direct_sum",
                vec![1],
                vec![0],
                "block list must be non-empty",
            ));
        }
        if blocks.len() != mults.len() {
            return Err(OpError::shape_mismatch(
                "LinOp::direct_sum",
                vec![blocks.len()],
                vec![mults.len()],
                "one multiplicity per block",
            ));
        }
        if blocks.len() == 1 && mults[0] == 1 {
            return Ok(blocks.remove(0));
        }
        Ok(LinOp::DirectSum { blocks, mults })
    }

    /// Vertical stack of operators with equal column counts.
    ///
    /// A single block is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`OpError::ShapeMismatch`] if the block list is empty or
    /// the blocks disagree on column count.
    pub fn concat(mut blocks: Vec<LinOp>) -> OpResult<Self> {
        let cols = match blocks.first() {
            Some(b) => b.cols(),
            None => {
                return Err(OpError::shape_mismatch(
                    "LinOp::concat",
                    vec![1],
                    vec![0],
                    "block list must be non-empty",
                ))
            }
        };
        for b in &blocks[1..] {
            if b.cols() != cols {
                return Err(OpError::shape_mismatch(
                    "LinOp::concat",
                    vec![cols],
                    vec![b.cols()],
                    "blocks must agree on column count",
                ));
            }
        }
        if blocks.len() == 1 {
            return Ok(blocks.remove(0));
        }
        Ok(LinOp::Concat(blocks))
    }

    /// Wrap an external directional-derivative backend.
    pub fn jvp(backend: Arc<dyn JvpBackend>) -> Self {
        LinOp::Jvp(backend)
    }

    /// Operator dimensions as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            LinOp::Identity(n) => (*n, *n),
            LinOp::Dense(a) => a.dim(),
            LinOp::Perm(p) => (p.len(), p.len()),
            LinOp::Kron(fs) => fs.iter().fold((1, 1), |(r, c), f| {
                let (fr, fc) = f.shape();
                (r * fr, c * fc)
            }),
            LinOp::KronSum(fs) => fs.iter().fold((1, 1), |(r, c), f| {
                let (fr, fc) = f.shape();
                (r * fr, c * fc)
            }),
            LinOp::DirectSum { blocks, mults } => {
                let mut rows = 0;
                let mut cols = 0;
                for (block, &mult) in blocks.iter().zip(mults) {
                    let (br, bc) = block.shape();
                    rows += mult * br;
                    cols += mult * bc;
                }
                (rows, cols)
            }
            LinOp::Concat(bs) => {
                let rows = bs.iter().map(|b| b.rows()).sum();
                let cols = bs.first().map(|b| b.cols()).unwrap_or(0);
                (rows, cols)
            }
            LinOp::Jvp(b) => b.shape(),
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.shape().0
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.shape().1
    }

    /// Apply the operator to a `cols × k` column batch.
    ///
    /// # Errors
    ///
    /// Returns [`OpError::ShapeMismatch`] if `v` has the wrong number of
    /// rows, and propagates failures from nested operators or the Jvp
    /// backend.
    pub fn apply(&self, v: &ArrayView2<f64>) -> OpResult<Array2<f64>> {
        let (rows, cols) = self.shape();
        if v.nrows() != cols {
            return Err(OpError::shape_mismatch(
                "LinOp::apply",
                vec![cols, v.ncols()],
                vec![v.nrows(), v.ncols()],
                "input rows must equal operator columns",
            ));
        }
        match self {
            LinOp::Identity(_) => Ok(v.to_owned()),
            LinOp::Dense(a) => Ok(a.dot(v)),
            LinOp::Perm(p) => Ok(v.select(Axis(0), p)),
            LinOp::Kron(fs) => apply_kron(fs, v),
            LinOp::KronSum(fs) => apply_kron_sum(fs, v),
            LinOp::DirectSum { blocks, mults } => {
                let k = v.ncols();
                let mut parts = Vec::new();
                let mut offset = 0;
                for (block, &mult) in blocks.iter().zip(mults) {
                    let bc = block.cols();
                    for _ in 0..mult {
                        let chunk = v.slice(s![offset..offset + bc, ..]);
                        parts.push(block.apply(&chunk)?);
                        offset += bc;
                    }
                }
                if parts.is_empty() {
                    return Ok(Array2::zeros((rows, k)));
                }
                vconcat(&parts, "LinOp::apply")
            }
            LinOp::Concat(bs) => {
                let k = v.ncols();
                let mut parts = Vec::new();
                for block in bs {
                    parts.push(block.apply(v)?);
                }
                if parts.is_empty() {
                    return Ok(Array2::zeros((rows, k)));
                }
                vconcat(&parts, "LinOp::apply")
            }
            LinOp::Jvp(backend) => {
                let out = backend.jvp(v)?;
                if out.dim() != (rows, v.ncols()) {
                    return Err(OpError::shape_mismatch(
                        "LinOp::apply",
                        vec![rows, v.ncols()],
                        out.shape().to_vec(),
                        "jvp backend returned a wrongly shaped batch",
                    ));
                }
                Ok(out)
            }
        }
    }

    /// Apply the operator to a single vector.
    ///
    /// # Errors
    ///
    /// Same as [`apply`](LinOp::apply).
    pub fn apply_vec(&self, v: &ArrayView1<f64>) -> OpResult<Array1<f64>> {
        let col = v.to_owned().insert_axis(Axis(1));
        let out = self.apply(&col.view())?;
        Ok(out.index_axis(Axis(1), 0).to_owned())
    }

    /// Apply the transpose to a `rows × k` column batch.
    ///
    /// Structural where an adjoint exists; Concat splits the batch at
    /// cumulative row offsets and sums the blocks' transposed actions, and
    /// Jvp delegates to the backend's transposed family.
    ///
    /// # Errors
    ///
    /// Returns [`OpError::ShapeMismatch`] on a wrongly shaped batch, and
    /// propagates nested failures.
    pub fn transposed_apply(&self, v: &ArrayView2<f64>) -> OpResult<Array2<f64>> {
        let (rows, cols) = self.shape();
        if v.nrows() != rows {
            return Err(OpError::shape_mismatch(
                "LinOp::transposed_apply",
                vec![rows, v.ncols()],
                vec![v.nrows(), v.ncols()],
                "input rows must equal operator rows",
            ));
        }
        match self {
            LinOp::Concat(bs) => {
                let k = v.ncols();
                let mut acc = Array2::zeros((cols, k));
                let mut offset = 0;
                for block in bs {
                    let br = block.rows();
                    let chunk = v.slice(s![offset..offset + br, ..]);
                    acc += &block.transposed_apply(&chunk)?;
                    offset += br;
                }
                Ok(acc)
            }
            LinOp::Jvp(backend) => {
                let out = backend.jvp_transpose(v)?;
                if out.dim() != (cols, v.ncols()) {
                    return Err(OpError::shape_mismatch(
                        "LinOp::transposed_apply",
                        vec![cols, v.ncols()],
                        out.shape().to_vec(),
                        "jvp backend returned a wrongly shaped batch",
                    ));
                }
                Ok(out)
            }
            _ => self.adjoint()?.apply(v),
        }
    }

    /// Structural transpose.
    ///
    /// # Errors
    ///
    /// Returns [`OpError::Unsupported`] for Concat (no structural
    /// transpose; use [`transposed_apply`](LinOp::transposed_apply)) and
    /// Jvp (the backend exposes the transposed action only).
    pub fn adjoint(&self) -> OpResult<LinOp> {
        match self {
            LinOp::Identity(n) => Ok(LinOp::Identity(*n)),
            LinOp::Dense(a) => Ok(LinOp::Dense(a.t().to_owned())),
            LinOp::Perm(p) => Ok(LinOp::Perm(dense::invert_permutation(p))),
            LinOp::Kron(fs) => {
                let factors = fs.iter().map(|f| f.adjoint()).collect::<OpResult<Vec<_>>>()?;
                Ok(LinOp::Kron(factors))
            }
            LinOp::KronSum(fs) => {
                let factors = fs.iter().map(|f| f.adjoint()).collect::<OpResult<Vec<_>>>()?;
                Ok(LinOp::KronSum(factors))
            }
            LinOp::DirectSum { blocks, mults } => {
                let adjoints = blocks
                    .iter()
                    .map(|b| b.adjoint())
                    .collect::<OpResult<Vec<_>>>()?;
                Ok(LinOp::DirectSum {
                    blocks: adjoints,
                    mults: mults.clone(),
                })
            }
            LinOp::Concat(_) => Err(OpError::unsupported(
                "adjoint",
                "concatenation has no structural transpose; use transposed_apply",
            )),
            LinOp::Jvp(_) => Err(OpError::unsupported(
                "adjoint",
                "directional-derivative operators expose transposed_apply only",
            )),
        }
    }

    /// Structural inverse-transpose.
    ///
    /// Identity and permutations are their own inverse-transpose; Dense
    /// inverts through `scirs2_linalg::inv`; Kron and DirectSum distribute
    /// over factors and blocks (multiplicities preserved).
    ///
    /// # Errors
    ///
    /// Returns [`OpError::Unsupported`] for a singular Dense matrix and
    /// for KronSum, Concat, and Jvp, which have no closed form.
    pub fn inverse_transpose(&self) -> OpResult<LinOp> {
        match self {
            LinOp::Identity(n) => Ok(LinOp::Identity(*n)),
            LinOp::Perm(p) => Ok(LinOp::Perm(p.clone())),
            LinOp::Dense(a) => {
                let (r, c) = a.dim();
                if r != c {
                    return Err(OpError::shape_mismatch(
                        "LinOp::inverse_transpose",
                        vec![r, r],
                        vec![r, c],
                        "matrix must be square",
                    ));
                }
                let inverse = inv(&a.view(), None).map_err(|e| {
                    OpError::unsupported(
                        "inverse_transpose",
                        format!("matrix is not invertible: {e}"),
                    )
                })?;
                Ok(LinOp::Dense(inverse.t().to_owned()))
            }
            LinOp::Kron(fs) => {
                let factors = fs
                    .iter()
                    .map(|f| f.inverse_transpose())
                    .collect::<OpResult<Vec<_>>>()?;
                Ok(LinOp::Kron(factors))
            }
            LinOp::DirectSum { blocks, mults } => {
                let inverses = blocks
                    .iter()
                    .map(|b| b.inverse_transpose())
                    .collect::<OpResult<Vec<_>>>()?;
                Ok(LinOp::DirectSum {
                    blocks: inverses,
                    mults: mults.clone(),
                })
            }
            LinOp::KronSum(_) => Err(OpError::unsupported(
                "inverse_transpose",
                "a Kronecker sum has no factor-wise inverse",
            )),
            LinOp::Concat(_) => Err(OpError::unsupported(
                "inverse_transpose",
                "concatenation is not square",
            )),
            LinOp::Jvp(_) => Err(OpError::unsupported(
                "inverse_transpose",
                "directional-derivative operators are opaque",
            )),
        }
    }

    /// Materialize as a dense matrix.
    ///
    /// Agrees with [`apply`](LinOp::apply) on standard basis vectors. Jvp
    /// operators materialize by applying the backend to the identity.
    ///
    /// # Errors
    ///
    /// Propagates nested failures.
    pub fn to_dense(&self) -> OpResult<Array2<f64>> {
        match self {
            LinOp::Identity(n) => Ok(Array2::eye(*n)),
            LinOp::Dense(a) => Ok(a.clone()),
            LinOp::Perm(p) => Ok(dense::permutation_matrix(p)),
            LinOp::Kron(fs) => {
                let mut iter = fs.iter();
                let first = match iter.next() {
                    Some(f) => f.to_dense()?,
                    None => return Ok(Array2::eye(1)),
                };
                iter.try_fold(first, |acc, f| {
                    let fd = f.to_dense()?;
                    Ok(dense::kronecker(&acc.view(), &fd.view()))
                })
            }
            LinOp::KronSum(fs) => {
                let mut iter = fs.iter();
                let first = match iter.next() {
                    Some(f) => f.to_dense()?,
                    None => return Ok(Array2::zeros((1, 1))),
                };
                iter.try_fold(first, |acc, f| {
                    let fd = f.to_dense()?;
                    dense::kron_sum(&acc.view(), &fd.view())
                })
            }
            LinOp::DirectSum { blocks, mults } => {
                let mut denses = Vec::new();
                for (block, &mult) in blocks.iter().zip(mults) {
                    let d = block.to_dense()?;
                    for _ in 0..mult {
                        denses.push(d.clone());
                    }
                }
                let views: Vec<ArrayView2<f64>> = denses.iter().map(|d| d.view()).collect();
                Ok(dense::block_diag(&views))
            }
            LinOp::Concat(bs) => {
                let mut parts = Vec::new();
                for block in bs {
                    parts.push(block.to_dense()?);
                }
                vconcat(&parts, "LinOp::to_dense")
            }
            LinOp::Jvp(_) => {
                let eye = Array2::eye(self.cols());
                self.apply(&eye.view())
            }
        }
    }

    /// Export as a COO sparse matrix.
    ///
    /// # Errors
    ///
    /// Returns [`OpError::Unsupported`] for KronSum, DirectSum, and Jvp;
    /// there is no silent dense fallback.
    pub fn to_sparse(&self) -> OpResult<CooMatrix> {
        match self {
            LinOp::Identity(n) => Ok(CooMatrix::identity(*n)),
            LinOp::Dense(a) => Ok(CooMatrix::from_dense(&a.view())),
            LinOp::Perm(p) => Ok(CooMatrix::permutation(p)),
            LinOp::Kron(fs) => {
                let mut iter = fs.iter();
                let first = match iter.next() {
                    Some(f) => f.to_sparse()?,
                    None => return Ok(CooMatrix::identity(1)),
                };
                iter.try_fold(first, |acc, f| {
                    let fsp = f.to_sparse()?;
                    Ok(acc.kron(&fsp))
                })
            }
            LinOp::Concat(bs) => {
                let mut parts = Vec::new();
                for block in bs {
                    parts.push(block.to_sparse()?);
                }
                CooMatrix::vstack(&parts)
            }
            LinOp::KronSum(_) => Err(OpError::unsupported(
                "to_sparse",
                "Kronecker sums are applied lazily or exported dense",
            )),
            LinOp::DirectSum { .. } => Err(OpError::unsupported(
                "to_sparse",
                "direct sums are applied lazily or exported dense",
            )),
            LinOp::Jvp(_) => Err(OpError::unsupported(
                "to_sparse",
                "directional-derivative operators are opaque",
            )),
        }
    }
}

/// Apply a Kronecker product by contracting one factor axis at a time.
///
/// The batch is viewed with one axis per factor's column count plus a
/// trailing batch axis; each contraction moves its axis to the front,
/// flattens the rest, and applies the factor.
fn apply_kron(factors: &[LinOp], v: &ArrayView2<f64>) -> OpResult<Array2<f64>> {
    let k = v.ncols();
    let mut dims: Vec<usize> = factors.iter().map(|f| f.cols()).collect();
    dims.push(k);
    let mut ev = v
        .to_owned()
        .into_shape_with_order(IxDyn(&dims))
        .map_err(|e| reshape_error("kron apply", &dims, e))?;
    for (axis, factor) in factors.iter().enumerate() {
        ev = contract_axis(&ev, factor, axis)?;
    }
    let rows: usize = factors.iter().map(|f| f.rows()).product();
    ev.into_shape_with_order((rows, k))
        .map_err(|e| reshape_error("kron apply", &[rows, k], e))
}

/// Apply a Kronecker sum: the per-axis contractions of the same batch,
/// accumulated.
fn apply_kron_sum(factors: &[LinOp], v: &ArrayView2<f64>) -> OpResult<Array2<f64>> {
    for f in factors {
        let (r, c) = f.shape();
        if r != c {
            return Err(OpError::shape_mismatch(
                "kron_sum apply",
                vec![r, r],
                vec![r, c],
                "factors must be square",
            ));
        }
    }
    let k = v.ncols();
    let mut dims: Vec<usize> = factors.iter().map(|f| f.cols()).collect();
    dims.push(k);
    let ev = v
        .to_owned()
        .into_shape_with_order(IxDyn(&dims))
        .map_err(|e| reshape_error("kron_sum apply", &dims, e))?;
    let mut acc = ArrayD::<f64>::zeros(IxDyn(&dims));
    for (axis, factor) in factors.iter().enumerate() {
        acc += &contract_axis(&ev, factor, axis)?;
    }
    let n: usize = factors.iter().map(|f| f.rows()).product();
    acc.into_shape_with_order((n, k))
        .map_err(|e| reshape_error("kron_sum apply", &[n, k], e))
}

/// Contract `axis` of `ev` with `factor`: move the axis to the front,
/// flatten the rest, apply, restore the axis order.
fn contract_axis(ev: &ArrayD<f64>, factor: &LinOp, axis: usize) -> OpResult<ArrayD<f64>> {
    let ndim = ev.ndim();
    let mut perm = Vec::with_capacity(ndim);
    perm.push(axis);
    for i in 0..ndim {
        if i != axis {
            perm.push(i);
        }
    }
    let fronted = ev.view().permuted_axes(IxDyn(&perm));
    let front_shape: Vec<usize> = fronted.shape().to_vec();
    let rest: usize = front_shape[1..].iter().product();
    let mat = fronted
        .as_standard_layout()
        .into_owned()
        .into_shape_with_order((front_shape[0], rest))
        .map_err(|e| reshape_error("axis contraction", &front_shape, e))?;

    let applied = factor.apply(&mat.view())?;

    let mut out_shape = front_shape;
    out_shape[0] = applied.nrows();
    let out = if applied.is_standard_layout() {
        applied
            .into_shape_with_order(IxDyn(&out_shape))
            .map_err(|e| reshape_error("axis contraction", &out_shape, e))?
    } else {
        applied
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order(IxDyn(&out_shape))
            .map_err(|e| reshape_error("axis contraction", &out_shape, e))?
    };

    let mut inverse = vec![0usize; ndim];
    let mut next = 1;
    for (i, slot) in inverse.iter_mut().enumerate() {
        if i == axis {
            *slot = 0;
        } else {
            *slot = next;
            next += 1;
        }
    }
    Ok(out
        .permuted_axes(IxDyn(&inverse))
        .as_standard_layout()
        .into_owned())
}

fn vconcat(parts: &[Array2<f64>], operation: &str) -> OpResult<Array2<f64>> {
    let views: Vec<ArrayView2<f64>> = parts.iter().map(|p| p.view()).collect();
    concatenate(Axis(0), &views).map_err(|e| {
        OpError::shape_mismatch(
            operation,
            vec![],
            views.iter().map(|v| v.ncols()).collect(),
            format!("row concatenation failed: {e}"),
        )
    })
}

fn reshape_error(operation: &str, dims: &[usize], err: impl fmt::Display) -> OpError {
    OpError::shape_mismatch(
        operation,
        dims.to_vec(),
        vec![],
        format!("reshape failed: {err}"),
    )
}
