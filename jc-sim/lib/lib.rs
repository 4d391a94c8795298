#![allow(non_snake_case, non_upper_case_globals)]

//! Simulation of the Jaynes-Cummings model: a single two-level atom coupled to
//! one truncated cavity mode, with cavity leakage, atomic decay, pure
//! dephasing, and a thermal bath.
//!
//! The pipeline runs strictly forward:
//! - [`dynamics`] builds the Hamiltonian and collapse operators,
//! - [`rabi`] integrates the master equation into a [`trajectory::Trajectory`],
//! - [`trajectory`], [`correlation`], [`spectrum`], and [`wigner`] derive
//!   reduced states, Bloch vectors, two-time correlations, power spectra, and
//!   phase-space quasi-probabilities.

pub mod utils;
pub mod error;
pub mod hilbert;
pub mod operators;
pub mod dynamics;
pub mod rabi;
pub mod trajectory;
pub mod correlation;
pub mod spectrum;
pub mod wigner;

pub use error::{ JcError, JcResult };
