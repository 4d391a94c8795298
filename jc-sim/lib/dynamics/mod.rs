//! Constructs to build the Jaynes-Cummings Hamiltonian and its collapse
//! operators from a set of run parameters.

use std::f64::consts::TAU;
use tracing::debug;
use crate::error::{ JcError, JcResult };

pub mod hamiltonians;
pub use hamiltonians::{
    jaynes_cummings::{ HBuilderJc, HJcParams },
    HBuild,
};

pub mod lindbladians;
pub use lindbladians::{
    jaynes_cummings::{ LOperatorJc, LJcParams },
    CollapseOp,
    LOp,
};

/// Largest acceptable thermal population of the highest retained Fock level,
/// used to decide whether a cavity truncation is large enough.
pub const TRUNCATION_TAIL: f64 = 1e-2;

/// Immutable parameters of a single Jaynes-Cummings run.
///
/// All frequencies and rates are in units of angular frequency, except for
/// `g`, which is given in cycles and converted to `2π g` when the Hamiltonian
/// is built.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JcParams {
    /// Atom-cavity coupling strength (cycles).
    pub g: f64,
    /// Bare cavity frequency.
    pub omega_c: f64,
    /// Bare atomic transition frequency.
    pub omega_a: f64,
    /// Shift added to the cavity frequency.
    pub detuning: f64,
    /// Cavity field decay rate.
    pub kappa: f64,
    /// Atomic spontaneous decay rate.
    pub gamma: f64,
    /// Atomic pure dephasing rate.
    pub gamma_phi: f64,
    /// Mean thermal photon number of the cavity bath.
    pub n_th: f64,
    /// Number of cavity Fock states retained.
    pub nmax: usize,
    /// Apply the `0.1 g²` frequency correction to both cavity and atom.
    pub nonlinear: bool,
}

impl Default for JcParams {
    fn default() -> Self {
        Self {
            g: 0.0,
            omega_c: TAU,
            omega_a: TAU,
            detuning: 0.0,
            kappa: 0.0,
            gamma: 0.0,
            gamma_phi: 0.0,
            n_th: 0.0,
            nmax: 15,
            nonlinear: false,
        }
    }
}

impl JcParams {
    /// Create a new `JcParams` with coupling `g` and default values elsewhere.
    pub fn new(g: f64) -> Self { Self { g, ..Self::default() } }

    /// Coupling strength in units of angular frequency.
    pub fn g_rad(&self) -> f64 { TAU * self.g }

    /// Compute the effective `(ω_c, ω_a, g)` entering the Hamiltonian, all in
    /// units of angular frequency.
    pub fn frequencies(&self) -> (f64, f64, f64) {
        let g = self.g_rad();
        if self.nonlinear {
            (
                self.omega_c + self.detuning + 0.1 * g.powi(2),
                self.omega_a + 0.1 * g.powi(2),
                g,
            )
        } else {
            (self.omega_c + self.detuning, self.omega_a, g)
        }
    }

    /// Smallest number of Fock states that can hold one atomic excitation on
    /// top of the thermal occupation `n_th` without a significant population
    /// reaching the truncation edge.
    pub fn min_fock_dim(&self) -> usize {
        let mut k: usize = 1;
        if self.n_th > 0.0 {
            let r = self.n_th / (1.0 + self.n_th);
            let mut tail = r;
            while tail > TRUNCATION_TAIL {
                tail *= r;
                k += 1;
            }
        }
        k + 1
    }

    /// Check all parameter preconditions.
    pub fn validate(&self) -> JcResult<()> {
        let finite = [
            ("g", self.g),
            ("omega_c", self.omega_c),
            ("omega_a", self.omega_a),
            ("detuning", self.detuning),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(JcError::NonFinite { name, value });
            }
        }
        let rates = [
            ("kappa", self.kappa),
            ("gamma", self.gamma),
            ("gamma_phi", self.gamma_phi),
            ("n_th", self.n_th),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(JcError::InvalidRate { name, value });
            }
        }
        let required = self.min_fock_dim();
        if self.nmax < required {
            return Err(JcError::Truncation { nmax: self.nmax, required });
        }
        debug!(params = ?self, "validated model parameters");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nonlinear_toggle_shifts_both_frequencies() {
        let mut params = JcParams::new(0.5);
        params.detuning = 0.3;
        let (wc, wa, g) = params.frequencies();
        assert_eq!((wc, wa, g), (TAU + 0.3, TAU, TAU * 0.5));
        params.nonlinear = true;
        let (wc_nl, wa_nl, _) = params.frequencies();
        let shift = 0.1 * (TAU * 0.5).powi(2);
        assert!((wc_nl - (TAU + 0.3 + shift)).abs() < 1e-12);
        assert!((wa_nl - (TAU + shift)).abs() < 1e-12);
    }

    #[test]
    fn negative_rates_are_rejected() {
        let mut params = JcParams::new(0.1);
        params.kappa = -0.1;
        assert!(matches!(
            params.validate(),
            Err(JcError::InvalidRate { name: "kappa", .. })
        ));
        params.kappa = 0.1;
        params.gamma_phi = f64::NAN;
        assert!(matches!(
            params.validate(),
            Err(JcError::InvalidRate { name: "gamma_phi", .. })
        ));
        params.gamma_phi = 0.0;
        params.detuning = f64::INFINITY;
        assert!(matches!(
            params.validate(),
            Err(JcError::NonFinite { name: "detuning", .. })
        ));
    }

    #[test]
    fn truncation_must_exceed_occupation() {
        let mut params = JcParams::new(0.1);
        params.nmax = 1;
        assert!(matches!(
            params.validate(),
            Err(JcError::Truncation { nmax: 1, required: 2 })
        ));
        params.nmax = 4;
        assert!(params.validate().is_ok());
        // r = 0.2: 0.2^3 = 0.008 is the first tail below 1e-2
        params.n_th = 0.25;
        assert_eq!(params.min_fock_dim(), 4);
        assert!(params.validate().is_ok());
        params.n_th = 2.0;
        assert!(matches!(
            params.validate(),
            Err(JcError::Truncation { nmax: 4, .. })
        ));
        params.nmax = 15;
        assert!(params.validate().is_ok());
    }
}
