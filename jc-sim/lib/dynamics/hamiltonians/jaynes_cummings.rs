//! A single two-level atom coupled to one truncated cavity mode.
//!
//! See also [`lindbladians::jaynes_cummings`][super::super::lindbladians::jaynes_cummings].

use ndarray as nd;
use ndarray_linalg::{ EighInto, UPLO };
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    dynamics::{ hamiltonians::HBuild, JcParams },
    error::JcResult,
    hilbert::{ Atom, Basis, JcState },
    operators::{ atom_lower, cavity_destroy, dag },
};

/// Hamiltonian builder for the Jaynes-Cummings model
/// `H = ω_c a†a + ω_a σ+σ- + g (a† σ- + a σ+)`.
#[derive(Clone, Debug, PartialEq)]
pub struct HBuilderJc {
    pub(crate) params: JcParams,
    pub(crate) basis: Basis<JcState>,
    pub(crate) g: f64,
}

impl HBuilderJc {
    /// Create a new `HBuilderJc`, validating `params` first.
    pub fn new(params: &JcParams) -> JcResult<Self> {
        params.validate()?;
        let (omega_c, omega_a, g) = params.frequencies();
        let basis = Basis::jaynes_cummings(params.nmax, omega_c, omega_a);
        debug!(omega_c, omega_a, g, dim = basis.len(), "built Jaynes-Cummings basis");
        Ok(Self { params: *params, basis, g })
    }

    /// Return a reference to the run parameters.
    pub fn params(&self) -> &JcParams { &self.params }

    /// Return a reference to the composite cavity ⊗ atom basis.
    pub fn basis(&self) -> &Basis<JcState> { &self.basis }

    /// Number of cavity Fock states.
    pub fn nmax(&self) -> usize { self.params.nmax }

    /// Dimension of the composite space.
    pub fn dim(&self) -> usize { self.basis.len() }

    /// Atom-cavity coupling in units of angular frequency.
    pub fn coupling(&self) -> f64 { self.g }

    /// Compute the (time-independent) Hamiltonian matrix.
    ///
    /// Bare energies are placed on the diagonal and the exchange interaction
    /// couples `|n, E⟩ ↔ |n + 1, G⟩` with strength `g sqrt(n + 1)`.
    pub fn gen(&self) -> nd::Array2<C64> {
        let n = self.basis.len();
        let mut H: nd::Array2<C64> = nd::Array2::zeros((n, n));
        H.diag_mut().iter_mut()
            .zip(self.basis.values())
            .for_each(|(h, e)| { *h = (*e).into(); });
        if self.g != 0.0 {
            self.basis.pairs_with(|s1, s2| s1.ladder_element(s2))
                .into_iter()
                .for_each(|((i, j), x)| { H[[i, j]] += self.g * x; });
        }
        H
    }

    /// Diagonalize the Hamiltonian, returning energies in ascending order and
    /// eigenvectors as columns.
    pub fn diagonalize(&self) -> JcResult<(nd::Array1<f64>, nd::Array2<C64>)> {
        Ok(self.gen().eigh_into(UPLO::Lower)?)
    }

    /// State vector of the composite basis state `|n, atom⟩`, if `n` lies
    /// within the truncation.
    pub fn state_vector(&self, n: usize, atom: Atom) -> Option<nd::Array1<C64>> {
        self.basis.get_vector(&JcState::new(n, atom))
    }

    /// Cavity annihilation operator `a ⊗ I`.
    pub fn cavity_destroy(&self) -> nd::Array2<C64> { cavity_destroy(self.nmax()) }

    /// Atomic lowering operator `I ⊗ σ-`.
    pub fn atom_lower(&self) -> nd::Array2<C64> { atom_lower(self.nmax()) }

    /// Cavity photon number operator `a†a`.
    pub fn cavity_number(&self) -> nd::Array2<C64> {
        let a = self.cavity_destroy();
        dag(&a).dot(&a)
    }

    /// Atomic excitation number operator `σ+σ-`.
    pub fn atom_number(&self) -> nd::Array2<C64> {
        let sm = self.atom_lower();
        dag(&sm).dot(&sm)
    }
}

/// Initialization data for [`HBuilderJc`].
#[derive(Copy, Clone, Debug)]
pub struct HJcParams<'a> {
    pub params: &'a JcParams,
}

impl<'a> HBuild<'a, JcState> for HBuilderJc {
    type Params = HJcParams<'a>;
    type Basis = Basis<JcState>;

    fn new_builder(params: Self::Params) -> JcResult<Self> {
        Self::new(params.params)
    }

    fn build_static(&self) -> Option<nd::Array2<C64>> { Some(self.gen()) }

    fn build_at(&self, _t: f64) -> nd::Array2<C64> { self.gen() }

    fn get_basis(&self) -> &Self::Basis { &self.basis }
}

#[cfg(test)]
mod test {
    use std::f64::consts::TAU;
    use super::*;
    use crate::operators::{ create, destroy, num, qeye, sigmam, sigmap, tensor };

    fn close(A: &nd::Array2<C64>, B: &nd::Array2<C64>) -> bool {
        A.shape() == B.shape()
            && A.iter().zip(B).all(|(a, b)| (a - b).norm() < 1e-12)
    }

    #[test]
    fn basis_hamiltonian_matches_operator_algebra() {
        let mut params = JcParams::new(0.3);
        params.nmax = 5;
        params.detuning = 0.4;
        let builder = HBuilderJc::new(&params).unwrap();
        let (wc, wa, g) = params.frequencies();
        let a = tensor(&destroy(5), &qeye(2));
        let ad = tensor(&create(5), &qeye(2));
        let sm = tensor(&qeye(5), &sigmam());
        let sp = tensor(&qeye(5), &sigmap());
        let H_ops
            = tensor(&num(5), &qeye(2)) * C64::from(wc)
            + sp.dot(&sm) * C64::from(wa)
            + (ad.dot(&sm) + a.dot(&sp)) * C64::from(g);
        assert!(close(&builder.gen(), &H_ops));
        assert!(close(&builder.cavity_number(), &ad.dot(&a)));
    }

    #[test]
    fn dressed_splitting_in_one_excitation_manifold() {
        let mut params = JcParams::new(0.1);
        params.nmax = 3;
        let builder = HBuilderJc::new(&params).unwrap();
        let (E, _) = builder.diagonalize().unwrap();
        // resonant: |0,E⟩, |1,G⟩ split symmetrically about ω by ±g
        let g = TAU * 0.1;
        assert!(E.iter().any(|e| (e - (TAU - g)).abs() < 1e-9));
        assert!(E.iter().any(|e| (e - (TAU + g)).abs() < 1e-9));
        assert!(E.iter().any(|e| e.abs() < 1e-12));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let mut params = JcParams::new(0.1);
        params.gamma = -1.0;
        assert!(HBuilderJc::new(&params).is_err());
        params.gamma = 0.0;
        let hparams = HJcParams { params: &params };
        let builder = HBuilderJc::new_builder(hparams).unwrap();
        assert_eq!(builder.dim(), 2 * params.nmax);
        assert!(builder.state_vector(params.nmax, Atom::G).is_none());
        let time = nd::Array1::linspace(0.0, 1.0, 3);
        let H = builder.build(&time);
        assert_eq!(H.shape(), &[2 * params.nmax, 2 * params.nmax, 3]);
        assert_eq!(H.index_axis(nd::Axis(2), 2), builder.gen());
    }
}
