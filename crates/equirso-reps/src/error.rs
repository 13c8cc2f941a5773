//! Error types for subspace computation.

use equirso_ops::OpError;
use thiserror::Error;

/// Errors surfaced by the representation and subspace layers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubspaceError {
    /// Failure in the underlying operator algebra
    #[error(transparent)]
    Operator(#[from] OpError),

    /// Dimensions do not line up
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A singular value fell inside the guard band around the rank
    /// threshold, so the numerical rank decision is not trustworthy
    #[error(
        "numerical rank is ambiguous at threshold {threshold:e}: \
         rank {rank} with singular value {sigma:e} inside the guard band"
    )]
    RankAmbiguity {
        /// Threshold the rank decision was made against
        threshold: f64,
        /// Rank that would have been reported
        rank: usize,
        /// The offending singular value
        sigma: f64,
    },

    /// A matrix factorization backend failed
    #[error("factorization failed: {0}")]
    Factorization(String),

    /// The requested operation is not available in this configuration
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Result type for subspace operations.
pub type SubspaceResult<T> = Result<T, SubspaceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use equirso_ops::LinOp;

    #[test]
    fn test_operator_errors_convert() {
        let err = LinOp::kron(vec![]).unwrap_err();
        let converted: SubspaceError = err.into();
        assert!(matches!(converted, SubspaceError::Operator(_)));
    }

    #[test]
    fn test_rank_ambiguity_display() {
        let err = SubspaceError::RankAmbiguity {
            threshold: 1e-5,
            rank: 3,
            sigma: 2.4e-5,
        };
        let msg = err.to_string();
        assert!(msg.contains("1e-5"));
        assert!(msg.contains("rank 3"));
        assert!(msg.contains("2.4e-5"));
    }

    #[test]
    fn test_shape_mismatch_display() {
        let err = SubspaceError::ShapeMismatch("expected 4 rows".into());
        assert_eq!(err.to_string(), "shape mismatch: expected 4 rows");
    }
}
