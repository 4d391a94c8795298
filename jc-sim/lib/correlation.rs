//! Liouvillian superoperators, steady states, and two-time correlation
//! functions.
//!
//! Superoperators act on density matrices flattened in row-major order, so that
//! `vec(A ρ B) = (A ⊗ Bᵀ) vec(ρ)`.

use ndarray::{ self as nd, linalg::kron };
use ndarray_linalg::{
    FactorizeInto,
    ReciprocalConditionNum,
    Solve,
    error::LinalgError,
};
use num_complex::Complex64 as C64;
use tracing::{ debug, warn };
use crate::{
    error::{ JcError, JcResult },
    operators::{ dag, qeye },
    rabi::lindblad,
    trajectory::expect,
};

/// Build the Liouvillian superoperator of the Lindblad equation for
/// Hamiltonian `H` and collapse operators (in Lindblad form) `jump_ops`.
pub fn liouvillian(H: &nd::Array2<C64>, jump_ops: &[nd::Array2<C64>])
    -> JcResult<nd::Array2<C64>>
{
    let n = H.shape()[0];
    if let Some(c) = jump_ops.iter().find(|c| c.shape() != [n, n]) {
        return Err(JcError::DimensionMismatch {
            context: "Liouvillian",
            expected: n,
            got: c.shape()[0],
        });
    }
    let eye = qeye(n);
    let mut L: nd::Array2<C64>
        = (kron(H, &eye) - kron(&eye, &H.t())) * (-C64::i());
    for c in jump_ops.iter() {
        let cdc = dag(c).dot(c);
        L += &kron(c, &c.mapv(|x| x.conj()));
        L.scaled_add(C64::from(-0.5), &kron(&cdc, &eye));
        L.scaled_add(C64::from(-0.5), &kron(&eye, &cdc.t()));
    }
    Ok(L)
}

/// Row-major flattening of a square matrix.
pub(crate) fn vectorize(rho: &nd::Array2<C64>) -> nd::Array1<C64> {
    rho.iter().copied().collect()
}

/// Inverse of [`vectorize`].
pub(crate) fn unvectorize(v: nd::Array1<C64>, n: usize)
    -> JcResult<nd::Array2<C64>>
{
    Ok(v.into_shape((n, n))?)
}

/// Smallest reciprocal condition number accepted for the trace-constrained
/// Liouvillian before the steady state is considered non-unique.
pub const STEADY_RCOND: f64 = 1e-12;

/// Compute the unique steady state of the Lindblad equation.
///
/// The stationarity condition `L vec(ρ) = 0` is solved with one (redundant)
/// equation replaced by `Tr ρ = 1`. Fails with [`JcError::NoDissipation`] if
/// there are no collapse operators, and with
/// [`JcError::NonUniqueSteadyState`] if the constrained system is singular,
/// e.g. when dissipation leaves some subspace untouched (pure dephasing, or an
/// uncoupled cavity without cavity decay).
pub fn steady_state(H: &nd::Array2<C64>, jump_ops: &[nd::Array2<C64>])
    -> JcResult<nd::Array2<C64>>
{
    if jump_ops.is_empty() {
        return Err(JcError::NoDissipation);
    }
    let n = H.shape()[0];
    let mut L = liouvillian(H, jump_ops)?;
    let mut row0 = L.row_mut(0);
    row0.fill(C64::from(0.0));
    (0..n).for_each(|i| { row0[i * n + i] = C64::from(1.0); });
    // a vanishing row is a matrix element that nothing drives or damps
    let null_row
        = L.rows().into_iter()
        .position(|r| r.iter().all(|x| *x == C64::from(0.0)));
    if let Some(row) = null_row {
        debug!(row, "constrained Liouvillian has a null row");
        return Err(JcError::NonUniqueSteadyState { rcond: 0.0 });
    }
    let lu = match L.factorize_into() {
        Ok(lu) => lu,
        Err(LinalgError::Lapack(_)) => {
            return Err(JcError::NonUniqueSteadyState { rcond: 0.0 });
        },
        Err(err) => { return Err(err.into()); },
    };
    let rcond = lu.rcond()?;
    if !(rcond > STEADY_RCOND) {
        return Err(JcError::NonUniqueSteadyState { rcond });
    }
    let mut b: nd::Array1<C64> = nd::Array1::zeros(n * n);
    b[0] = C64::from(1.0);
    let x = lu.solve_into(b)?;
    let rho = unvectorize(x, n)?;
    // remove round-off anti-Hermitian parts
    let mut rho = (&rho + &dag(&rho)) * C64::from(0.5);
    let tr: C64 = rho.diag().sum();
    rho /= tr;
    debug!(dim = n, rcond, "computed steady state");
    Ok(rho)
}

/// Compute the two-time correlation function `⟨A(τ) B(0)⟩` for all delays in
/// `taus`.
///
/// The state at zero delay is `rho0`, or the steady state if `rho0` is `None`.
/// `taus` is measured from its first element, which is taken as zero delay; it
/// must be finite and strictly increasing.
pub fn correlation_2op_1t(
    H: &nd::Array2<C64>,
    jump_ops: &[nd::Array2<C64>],
    rho0: Option<&nd::Array2<C64>>,
    taus: &nd::Array1<f64>,
    A: &nd::Array2<C64>,
    B: &nd::Array2<C64>,
) -> JcResult<nd::Array1<C64>>
{
    let n = H.shape()[0];
    if let Some(op) = [A, B].into_iter().find(|op| op.shape() != [n, n]) {
        return Err(JcError::DimensionMismatch {
            context: "correlation operator",
            expected: n,
            got: op.shape()[0],
        });
    }
    let rho0 = match rho0 {
        Some(rho) => rho.clone(),
        None => steady_state(H, jump_ops)?,
    };
    let chi0 = B.dot(&rho0);
    let corr: nd::Array1<C64>
        = lindblad::propagate(&chi0, H, jump_ops, taus, |chi| expect(A, chi))?
        .into_iter()
        .collect();
    if corr.iter().all(|c| c.norm() == 0.0) {
        warn!("correlation function vanishes identically");
    }
    Ok(corr)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        dynamics::{ HBuilderJc, JcParams, LOperatorJc },
        rabi::lindblad::Generator,
    };

    fn cavity_model(g: f64, kappa: f64, n_th: f64) -> HBuilderJc {
        let mut params = JcParams::new(g);
        params.nmax = 4;
        params.kappa = kappa;
        params.n_th = n_th;
        params.gamma = 0.1;
        HBuilderJc::new(&params).unwrap()
    }

    #[test]
    fn liouvillian_matches_generator() {
        let builder = cavity_model(0.2, 0.5, 0.25);
        let lop = LOperatorJc::new(&builder);
        let H = builder.gen();
        let jumps = lop.jump_ops();
        let L = liouvillian(&H, &jumps).unwrap();
        let n = H.shape()[0];
        let rho = nd::Array2::from_shape_fn((n, n), |(i, j)| {
            C64::new((i + 2 * j) as f64, i as f64 - j as f64)
        });
        let lhs = unvectorize(L.dot(&vectorize(&rho)), n).unwrap();
        let rhs = Generator::new(&H, &jumps).apply(&rho);
        assert!((lhs - rhs).iter().all(|x| x.norm() < 1e-10));
    }

    #[test]
    fn thermal_cavity_steady_state() {
        // uncoupled: the cavity relaxes to a (truncated) thermal state and the
        // atom decays to its ground state
        let builder = cavity_model(0.0, 0.5, 0.25);
        let lop = LOperatorJc::new(&builder);
        let rho = steady_state(&builder.gen(), &lop.jump_ops()).unwrap();
        let r: f64 = 0.25 / 1.25;
        let z: f64 = (0..4).map(|k| r.powi(k)).sum();
        let n_expected: f64 = (0..4).map(|k| k as f64 * r.powi(k)).sum::<f64>() / z;
        assert!((expect(&builder.cavity_number(), &rho).re - n_expected).abs() < 1e-10);
        assert!(expect(&builder.atom_number(), &rho).re.abs() < 1e-10);
        assert!((rho.diag().sum() - 1.0).norm() < 1e-12);
    }

    #[test]
    fn steady_state_requires_dissipation() {
        let params = JcParams { nmax: 3, ..JcParams::new(0.1) };
        let builder = HBuilderJc::new(&params).unwrap();
        assert!(matches!(
            steady_state(&builder.gen(), &[]),
            Err(JcError::NoDissipation)
        ));
    }

    #[test]
    fn dephasing_alone_has_no_unique_steady_state() {
        let params = JcParams {
            nmax: 4,
            gamma_phi: 0.001,
            ..JcParams::new(0.1)
        };
        let builder = HBuilderJc::new(&params).unwrap();
        let lop = LOperatorJc::new(&builder);
        let jumps = lop.jump_ops();
        assert_eq!(jumps.len(), 1);
        assert!(matches!(
            steady_state(&builder.gen(), &jumps),
            Err(JcError::NonUniqueSteadyState { .. })
        ));
        let a = builder.cavity_destroy();
        let taus = nd::Array1::linspace(0.0, 1.0, 11);
        assert!(matches!(
            correlation_2op_1t(&builder.gen(), &jumps, None, &taus, &dag(&a), &a),
            Err(JcError::NonUniqueSteadyState { .. })
        ));
    }

    #[test]
    fn uncoupled_cavity_without_decay_is_degenerate() {
        // every photon number is conserved, so each |n, G⟩ is stationary
        let params = JcParams {
            nmax: 3,
            gamma: 0.3,
            ..JcParams::new(0.0)
        };
        let builder = HBuilderJc::new(&params).unwrap();
        let lop = LOperatorJc::new(&builder);
        assert!(matches!(
            steady_state(&builder.gen(), &lop.jump_ops()),
            Err(JcError::NonUniqueSteadyState { .. })
        ));
    }

    #[test]
    fn single_photon_field_correlation() {
        // ⟨a†(τ) a(0)⟩ for |1, G⟩ with g = 0 is exp((i ω_c - κ / 2) τ)
        let mut params = JcParams::new(0.0);
        params.nmax = 3;
        params.kappa = 0.4;
        params.gamma = 0.3;
        let builder = HBuilderJc::new(&params).unwrap();
        let lop = LOperatorJc::new(&builder);
        let a = builder.cavity_destroy();
        let ad = dag(&a);
        let psi = builder.state_vector(1, crate::hilbert::Atom::G).unwrap();
        let rho0 = crate::hilbert::outer_prod(&psi, &psi);
        let taus = nd::Array1::linspace(0.0, 5.0, 101);
        let corr = correlation_2op_1t(
            &builder.gen(), &lop.jump_ops(), Some(&rho0), &taus, &ad, &a,
        ).unwrap();
        let wc = params.frequencies().0;
        for (&tau, c) in taus.iter().zip(&corr) {
            let expected = (C64::new(-0.2, wc) * tau).exp();
            assert!((c - expected).norm() < 1e-4);
        }
        // the steady state is |0, G⟩, where a ρ vanishes
        let corr_ss = correlation_2op_1t(
            &builder.gen(), &lop.jump_ops(), None, &taus, &ad, &a,
        ).unwrap();
        assert!(corr_ss.iter().all(|c| c.norm() < 1e-10));
    }
}
