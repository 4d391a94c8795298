//! Lindbladian operators.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    hilbert::StateIter,
    operators::dag,
    rabi::anti_commutator,
};

pub mod jaynes_cummings;
pub use jaynes_cummings::{ LOperatorJc, LJcParams };

/// Basic requirements for any implementation of a Lindbladian operator.
pub trait LOp<'a, S> {
    /// Initialization data type.
    type Params;

    /// Basis type containing state energies.
    type Basis: PartialEq + StateIter<'a, State = S>;

    /// Initialize `self`.
    fn new_operator(params: Self::Params) -> Self;

    /// Operate on a density matrix.
    fn op(&self, rho: &nd::Array2<C64>) -> nd::Array2<C64>;

    /// Return the collapse operators in Lindblad form, i.e. each scaled by the
    /// square root of its rate.
    fn jump_ops(&self) -> Vec<nd::Array2<C64>>;

    /// Return a reference to the basis.
    fn get_basis(&self) -> &Self::Basis;
}

/// A single dissipation channel: an unscaled operator `op` acting at `rate`.
#[derive(Clone, Debug, PartialEq)]
pub struct CollapseOp {
    pub name: &'static str,
    pub rate: f64,
    pub op: nd::Array2<C64>,
}

impl CollapseOp {
    /// The operator in Lindblad form, `sqrt(rate) * op`.
    pub fn scaled(&self) -> nd::Array2<C64> {
        &self.op * C64::from(self.rate.sqrt())
    }

    /// Apply the dissipator `C ρ C† - ½{C†C, ρ}` with `C = sqrt(rate) * op`.
    pub fn dissipator(&self, rho: &nd::Array2<C64>) -> nd::Array2<C64> {
        let c = self.scaled();
        let cd = dag(&c);
        c.dot(rho).dot(&cd) - anti_commutator(&cd.dot(&c), rho) / 2.0
    }
}
