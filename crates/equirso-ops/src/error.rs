//! Error types for the operator algebra.

/// Errors produced by operator construction and application.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OpError {
    /// Dimensions do not line up for the requested operation.
    #[error("shape mismatch in {operation}: expected {expected:?}, got {actual:?} ({context})")]
    ShapeMismatch {
        /// Operation that detected the mismatch
        operation: String,
        /// Expected dimensions
        expected: Vec<usize>,
        /// Actual dimensions
        actual: Vec<usize>,
        /// Additional context
        context: String,
    },

    /// The operator does not support the requested capability.
    #[error("unsupported operation {operation}: {reason}")]
    Unsupported {
        /// Operation that was requested
        operation: String,
        /// Why it is not available
        reason: String,
    },
}

impl OpError {
    /// Create a shape mismatch error.
    pub fn shape_mismatch(
        operation: impl Into<String>,
        expected: Vec<usize>,
        actual: Vec<usize>,
        context: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch {
            operation: operation.into(),
            expected,
            actual,
            context: context.into(),
        }
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for operator operations.
pub type OpResult<T> = Result<T, OpError>;
