//! Tensor ranks over a base dimension.

use std::fmt;

/// The rank (p, q) of a tensor space: `p` covariant and `q` contravariant
/// indices over a base space of dimension d, for a total dimension of
/// `d^(p+q)`.
///
/// Ranks are plain value types; they carry no group. Binding to a group
/// happens at the representation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TensorRank {
    /// Covariant index count
    pub p: usize,
    /// Contravariant index count
    pub q: usize,
}

impl TensorRank {
    /// The scalar rank T(0, 0).
    pub const SCALAR: TensorRank = TensorRank { p: 0, q: 0 };

    /// Construct the rank (p, q).
    pub fn new(p: usize, q: usize) -> Self {
        Self { p, q }
    }

    /// Total index count `p + q`.
    pub fn order(&self) -> usize {
        self.p + self.q
    }

    /// Dimension `d^(p+q)` of this rank over base dimension `d`.
    pub fn size(&self, d: usize) -> usize {
        d.pow(self.order() as u32)
    }

    /// The dual rank (q, p).
    pub fn dual(&self) -> Self {
        Self { p: self.q, q: self.p }
    }

    /// Collapse to (p+q, 0) under a unimodular group, where covariant and
    /// contravariant indices transform identically; otherwise unchanged.
    pub fn grouped(&self, unimodular: bool) -> Self {
        if unimodular {
            Self { p: self.order(), q: 0 }
        } else {
            *self
        }
    }

    /// Whether this is the scalar rank.
    pub fn is_scalar(&self) -> bool {
        self.order() == 0
    }
}

impl fmt::Display for TensorRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T({},{})", self.p, self.q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size() {
        assert_eq!(TensorRank::SCALAR.size(3), 1);
        assert_eq!(TensorRank::new(1, 0).size(3), 3);
        assert_eq!(TensorRank::new(1, 1).size(3), 9);
        assert_eq!(TensorRank::new(2, 1).size(2), 8);
    }

    #[test]
    fn test_dual() {
        assert_eq!(TensorRank::new(2, 1).dual(), TensorRank::new(1, 2));
        assert_eq!(TensorRank::SCALAR.dual(), TensorRank::SCALAR);
    }

    #[test]
    fn test_grouped() {
        let rank = TensorRank::new(1, 1);
        assert_eq!(rank.grouped(true), TensorRank::new(2, 0));
        assert_eq!(rank.grouped(false), rank);
        assert_eq!(TensorRank::SCALAR.grouped(true), TensorRank::SCALAR);
    }

    #[test]
    fn test_is_scalar() {
        assert!(TensorRank::SCALAR.is_scalar());
        assert!(!TensorRank::new(0, 1).is_scalar());
    }

    #[test]
    fn test_display() {
        assert_eq!(TensorRank::new(2, 1).to_string(), "T(2,1)");
        assert_eq!(TensorRank::SCALAR.to_string(), "T(0,0)");
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        assert!(TensorRank::new(0, 2) < TensorRank::new(1, 0));
        assert!(TensorRank::new(1, 0) < TensorRank::new(1, 1));
    }
}
