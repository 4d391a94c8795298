//! Cavity leakage, thermal pumping, atomic decay, and pure dephasing for the
//! Jaynes-Cummings model.
//!
//! See also [`hamiltonians::jaynes_cummings`][super::super::hamiltonians::jaynes_cummings].

use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    dynamics::{
        hamiltonians::HBuilderJc,
        lindbladians::{ CollapseOp, LOp },
        JcParams,
    },
    hilbert::{ Basis, JcState },
    operators::{ atom_lower, atom_op, cavity_destroy, dag, sigmaz },
};

/// Implements the Lindbladian operator for a Jaynes-Cummings system.
///
/// Channels are generated in the fixed order cavity decay `κ (1 + n_th)`,
/// thermal excitation `κ n_th`, atomic decay `γ`, dephasing `γ_φ`, and only
/// those with a strictly positive rate are kept.
#[derive(Clone, Debug)]
pub struct LOperatorJc<'a> {
    pub(crate) basis: &'a Basis<JcState>,
    pub(crate) ops: Vec<CollapseOp>,
}

impl<'a> LOperatorJc<'a> {
    /// Create a new `LOperatorJc` from a basis and a set of (validated)
    /// parameters.
    pub fn new_raw(basis: &'a Basis<JcState>, params: &JcParams) -> Self {
        let nmax = basis.nmax();
        let a = cavity_destroy(nmax);
        let channels = [
            ("cavity decay", params.kappa * (1.0 + params.n_th), a.clone()),
            ("thermal excitation", params.kappa * params.n_th, dag(&a)),
            ("atomic decay", params.gamma, atom_lower(nmax)),
            ("dephasing", params.gamma_phi, atom_op(nmax, &sigmaz())),
        ];
        let ops: Vec<CollapseOp>
            = channels.into_iter()
            .filter(|(_, rate, _)| *rate > 0.0)
            .map(|(name, rate, op)| CollapseOp { name, rate, op })
            .collect();
        debug!(
            channels = ?ops.iter().map(|c| (c.name, c.rate)).collect::<Vec<_>>(),
            "built collapse operators"
        );
        Self { basis, ops }
    }

    /// Create a new `LOperatorJc` using data from a borrowed [`HBuilderJc`].
    pub fn new(hbuilder: &'a HBuilderJc) -> Self {
        Self::new_raw(&hbuilder.basis, &hbuilder.params)
    }

    /// Get a reference to the basis.
    pub fn basis(&self) -> &Basis<JcState> { self.basis }

    /// Get the active dissipation channels.
    pub fn channels(&self) -> &[CollapseOp] { &self.ops }

    /// Return `true` if there are no active dissipation channels.
    pub fn is_empty(&self) -> bool { self.ops.is_empty() }

    /// Get the collapse operators in Lindblad form, `sqrt(rate) * op`.
    pub fn jump_ops(&self) -> Vec<nd::Array2<C64>> {
        self.ops.iter().map(CollapseOp::scaled).collect()
    }

    /// Perform the operator action on a density matrix.
    pub fn op(&self, rho: &nd::Array2<C64>) -> nd::Array2<C64> {
        let n = rho.shape()[0];
        self.ops.iter()
            .fold(nd::Array2::zeros((n, n)), |acc, c| acc + c.dissipator(rho))
    }
}

/// Initialization data for [`LOperatorJc`].
#[derive(Copy, Clone, Debug)]
pub enum LJcParams<'a> {
    Raw {
        basis: &'a Basis<JcState>,
        params: &'a JcParams,
    },
    JaynesCummings {
        builder: &'a HBuilderJc,
    },
}

impl<'a> LOp<'a, JcState> for LOperatorJc<'a> {
    type Params = LJcParams<'a>;
    type Basis = Basis<JcState>;

    fn new_operator(params: Self::Params) -> Self {
        match params {
            LJcParams::Raw { basis, params } => Self::new_raw(basis, params),
            LJcParams::JaynesCummings { builder } => Self::new(builder),
        }
    }

    fn op(&self, rho: &nd::Array2<C64>) -> nd::Array2<C64> { self.op(rho) }

    fn jump_ops(&self) -> Vec<nd::Array2<C64>> { self.jump_ops() }

    fn get_basis(&self) -> &Self::Basis { self.basis }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hilbert::Atom;

    #[test]
    fn no_rates_means_no_channels() {
        let mut params = JcParams::new(0.2);
        params.nmax = 3;
        let builder = HBuilderJc::new(&params).unwrap();
        let lop = LOperatorJc::new(&builder);
        assert!(lop.is_empty());
        assert!(lop.jump_ops().is_empty());
        let rho = builder.basis().get_density(&JcState::new(0, Atom::E)).unwrap();
        assert!(lop.op(&rho).iter().all(|x| x.norm() == 0.0));
    }

    #[test]
    fn channel_order_and_weights() {
        let mut params = JcParams::new(0.2);
        params.nmax = 4;
        params.kappa = 0.5;
        params.n_th = 0.25;
        params.gamma = 0.1;
        params.gamma_phi = 0.01;
        let builder = HBuilderJc::new(&params).unwrap();
        let lop = LOperatorJc::new_operator(LJcParams::JaynesCummings { builder: &builder });
        let names: Vec<&str> = lop.channels().iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            ["cavity decay", "thermal excitation", "atomic decay", "dephasing"],
        );
        let rates: Vec<f64> = lop.channels().iter().map(|c| c.rate).collect();
        assert_eq!(rates, [0.625, 0.125, 0.1, 0.01]);
        // |1, G⟩ (index 2) → |0, G⟩ (index 0) under sqrt(κ (1 + n_th)) a
        let c0 = &lop.jump_ops()[0];
        assert!((c0[[0, 2]].re - 0.625_f64.sqrt()).abs() < 1e-12);

        params.kappa = 0.0;
        let lop = LOperatorJc::new_raw(builder.basis(), &params);
        let names: Vec<&str> = lop.channels().iter().map(|c| c.name).collect();
        assert_eq!(names, ["atomic decay", "dephasing"]);
    }

    #[test]
    fn dissipator_is_traceless() {
        let mut params = JcParams::new(0.2);
        params.nmax = 3;
        params.kappa = 0.3;
        params.gamma = 0.2;
        let builder = HBuilderJc::new(&params).unwrap();
        let lop = LOperatorJc::new(&builder);
        let psi = builder.state_vector(1, Atom::E).unwrap();
        let rho = crate::hilbert::outer_prod(&psi, &psi);
        let tr: C64 = lop.op(&rho).diag().sum();
        assert!(tr.norm() < 1e-12);
    }
}
