//! Error types for model validation and numerical failures.

use ndarray_linalg::error::LinalgError;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type JcResult<T> = Result<T, JcError>;

/// Everything that can abort a simulation run.
#[derive(Debug, Error)]
pub enum JcError {
    /// A decay, dephasing, or thermal rate was negative or non-finite.
    #[error("rate `{name}` must be finite and non-negative, got {value}")]
    InvalidRate { name: &'static str, value: f64 },

    /// A frequency-like parameter was non-finite.
    #[error("parameter `{name}` must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    /// The cavity truncation cannot hold the expected photon occupation.
    #[error(
        "cavity truncation of {nmax} Fock states is too small for the \
        expected occupation; need at least {required}"
    )]
    Truncation { nmax: usize, required: usize },

    /// The time grid was empty.
    #[error("time grid must contain at least {min} sample(s), got {len}")]
    ShortTimeGrid { min: usize, len: usize },

    /// The time grid contained a non-finite value or was not strictly
    /// increasing.
    #[error("time grid must be finite and strictly increasing (sample {index})")]
    NonMonotonicTime { index: usize },

    /// An operation needed a uniformly spaced grid.
    #[error("time grid must be uniformly spaced (sample {index})")]
    NonUniformTimeGrid { index: usize },

    /// A requested snapshot time was non-finite.
    #[error("snapshot time must be finite, got {0}")]
    InvalidSnapshotTime(f64),

    /// A trajectory sample index was out of range.
    #[error("sample index {index} out of range for trajectory of length {len}")]
    SampleIndex { index: usize, len: usize },

    /// An initial-state description could not be turned into a valid state.
    #[error("invalid initial state: {0}")]
    InvalidState(&'static str),

    /// Two arrays had incompatible shapes.
    #[error("dimension mismatch in {context}: expected {expected}, got {got}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    /// A phase-space grid was empty.
    #[error("phase-space grid must be non-empty")]
    EmptyGrid,

    /// The steady state is not unique without at least one collapse operator.
    #[error("steady state is undefined without dissipation")]
    NoDissipation,

    /// The dissipators leave more than one stationary state.
    #[error(
        "steady state is not unique: constrained Liouvillian is singular \
        (reciprocal condition number {rcond:e})"
    )]
    NonUniqueSteadyState { rcond: f64 },

    /// The integrator produced a non-finite state.
    #[error("integration diverged at t = {0}")]
    Diverged(f64),

    #[error(transparent)]
    Linalg(#[from] LinalgError),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}
