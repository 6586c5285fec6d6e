//! Error types for timegraph operations.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TimegraphError>;

/// Errors surfaced by entry operations.
///
/// Queries never fail: a relation that cannot be derived is reported as
/// `unknown` and an underivable duration as `(0, +inf)`. Inconsistent
/// assertions are not errors either; they are weakened locally (see
/// [`TimeGraph::enter`](crate::TimeGraph::enter)).
#[derive(Error, Debug)]
pub enum TimegraphError {
    /// A named time point required by the operation does not exist.
    #[error("time point not found: {0}")]
    MissingPoint(String),

    /// The predicate string has an unrecognized stem.
    #[error("unsupported predicate: {0}")]
    UnsupportedPredicate(String),

    /// An argument has the wrong shape for the operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An absolute-time literal is ill-formed.
    #[error("invalid absolute time: {0}")]
    InvalidAbsTime(String),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
