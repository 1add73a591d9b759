//! Error taxonomy for index construction and evaluation.
//!
//! Every variant is a caller-contract violation detected while building a
//! domain, an adjacency table, a hash index or a bucket map. None of them is
//! raised from inside the pair loop, and none is retryable.

use thiserror::Error;

use crate::domain::Cell;
use crate::hashed::HashKey;

/// Errors produced by the FRNN kernel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// Search radius or domain size cannot describe a grid.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Human-readable description of the rejected parameter.
        reason: String,
    },

    /// A point lies outside `[0, domain_size]` on at least one axis.
    #[error("point {index} at ({x}, {y}) lies outside the domain [0, {domain_size}]")]
    PointOutOfDomain {
        /// Positional index of the offending point.
        index: usize,
        /// X coordinate of the point.
        x: f64,
        /// Y coordinate of the point.
        y: f64,
        /// Side length of the square domain.
        domain_size: f64,
    },

    /// Buckets, adjacency and domain were not built from the same grid.
    #[error("inconsistent index: {reason}")]
    InconsistentIndex {
        /// What did not match.
        reason: String,
    },

    /// Two distinct cells map to the same spatial hash key.
    #[error("hash collision: cells {first:?} and {second:?} both hash to {hash:#x}")]
    HashCollision {
        /// The shared hash key.
        hash: HashKey,
        /// The cell that claimed the key first.
        first: Cell,
        /// The cell that collided with it.
        second: Cell,
    },
}

impl SearchError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        Self::InconsistentIndex {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let err = SearchError::PointOutOfDomain {
            index: 3,
            x: 1.5,
            y: 0.25,
            domain_size: 1.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("point 3"), "{msg}");
        assert!(msg.contains("1.5"), "{msg}");

        let err = SearchError::HashCollision {
            hash: 0xff,
            first: Cell { row: 0, col: 1 },
            second: Cell { row: 2, col: 3 },
        };
        assert!(err.to_string().contains("0xff"));
    }
}
