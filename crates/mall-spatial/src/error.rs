//! Spatial-subsystem error type.
//!
//! Every variant describes a malformed or degenerate environment.  None of
//! them are transient: a simulation that hits one is misconfigured.

use thiserror::Error;

use mall_core::LocationId;

/// Errors produced by `mall-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("environment has no locations")]
    NoLocations,

    #[error("{matrix} matrix has dimension {got}, expected {expected} (one per location)")]
    DimensionMismatch {
        matrix:   &'static str,
        expected: usize,
        got:      usize,
    },

    #[error("location {0} not found in environment")]
    LocationNotFound(LocationId),

    #[error("distance from {0} to itself must be zero")]
    NonZeroDiagonal(LocationId),

    #[error("distance between {a} and {b} is negative or NaN")]
    InvalidDistance { a: LocationId, b: LocationId },

    #[error("distance matrix is not symmetric between {a} and {b}")]
    NotSymmetric { a: LocationId, b: LocationId },

    #[error("direction matrix is not antisymmetric between {a} and {b}")]
    NotAntisymmetric { a: LocationId, b: LocationId },

    #[error("no location within {radius} of {from} (not even itself)")]
    EmptyReachableSet { from: LocationId, radius: f64 },
}

pub type SpatialResult<T> = Result<T, SpatialError>;
