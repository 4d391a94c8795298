//! Hamiltonian builders.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::JcResult,
    hilbert::StateIter,
};

pub mod jaynes_cummings;
pub use jaynes_cummings::{ HBuilderJc, HJcParams };

/// Basic requirements for any Hamiltonian builder.
pub trait HBuild<'a, S> {
    /// Initialization data type.
    type Params;

    /// Basis type containing state energies.
    type Basis: PartialEq + StateIter<'a, State = S>;

    /// Initialize `self`, checking that the parameters are valid.
    fn new_builder(params: Self::Params) -> JcResult<Self>
    where Self: Sized;

    /// Build a time-independent Hamiltonian matrix, if possible.
    fn build_static(&self) -> Option<nd::Array2<C64>>;

    /// Build the Hamiltonian matrix at a given time.
    fn build_at(&self, t: f64) -> nd::Array2<C64>;

    /// Build the Hamiltonian array, with the last axis corresponding to time.
    fn build(&self, time: &nd::Array1<f64>) -> nd::Array3<C64> {
        let H0 = self.build_at(time.first().copied().unwrap_or(0.0));
        let n = H0.shape()[0];
        let mut H: nd::Array3<C64> = nd::Array3::zeros((n, n, time.len()));
        for (&t, mut Hk) in time.iter().zip(H.axis_iter_mut(nd::Axis(2))) {
            Hk.assign(&self.build_at(t));
        }
        H
    }

    /// Return a reference to the basis.
    fn get_basis(&self) -> &Self::Basis;
}
