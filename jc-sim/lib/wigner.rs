//! Wigner quasi-probability distributions of a single bosonic mode.

use std::f64::consts::{ PI, SQRT_2 };
use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::error::{ JcError, JcResult };

// L_m^α(x) for all m < len, by upward recurrence in m
fn laguerre_column(alpha: usize, x: f64, len: usize) -> Vec<f64> {
    let a = alpha as f64;
    let mut L: Vec<f64> = Vec::with_capacity(len);
    if len > 0 { L.push(1.0); }
    if len > 1 { L.push(1.0 + a - x); }
    for k in 1..len.saturating_sub(1) {
        let kf = k as f64;
        let next
            = ((2.0 * kf + 1.0 + a - x) * L[k] - (kf + a) * L[k - 1])
            / (kf + 1.0);
        L.push(next);
    }
    L
}

// sqrt(m! / n!) for n ≥ m
fn factorial_ratio_sqrt(m: usize, n: usize) -> f64 {
    (m + 1..=n).map(|k| (k as f64).sqrt().recip()).product()
}

/// Compute the Wigner function of the single-mode density matrix `rho` (in the
/// Fock basis) on the phase-space grid spanned by `xvec` and `yvec`.
///
/// Grid points are mapped to coherent amplitudes `α = (x + i y) / √2` and the
/// normalization is such that `∫ dx dy W = 1`. The result has shape
/// `(yvec.len(), xvec.len())`, i.e. rows run over `y`.
pub fn wigner<S>(
    rho: &nd::ArrayBase<S, nd::Ix2>,
    xvec: &nd::Array1<f64>,
    yvec: &nd::Array1<f64>,
) -> JcResult<nd::Array2<f64>>
where S: nd::Data<Elem = C64>
{
    if xvec.is_empty() || yvec.is_empty() {
        return Err(JcError::EmptyGrid);
    }
    let M = rho.shape()[0];
    if rho.shape()[1] != M {
        return Err(JcError::DimensionMismatch {
            context: "Wigner density matrix",
            expected: M,
            got: rho.shape()[1],
        });
    }
    let g2: f64 = 2.0;
    let mut W: nd::Array2<f64> = nd::Array2::zeros((yvec.len(), xvec.len()));
    for ((iy, ix), Wyx) in W.indexed_iter_mut() {
        let A = C64::new(xvec[ix], yvec[iy]) / SQRT_2;
        let B = 4.0 * A.norm_sqr();
        let mut w = 0.0;
        for d in 0..M {
            let L = laguerre_column(d, B, M - d);
            let two_a_d = (A * 2.0).powu(d as u32);
            for (m, &Lm) in L.iter().enumerate() {
                let n = m + d;
                let r = rho[[m, n]];
                if r.norm() == 0.0 { continue; }
                let sign = if m % 2 == 0 { 1.0 } else { -1.0 };
                if d == 0 {
                    w += (r * sign * Lm).re;
                } else {
                    let c = factorial_ratio_sqrt(m, n);
                    w += 2.0 * (r * sign * two_a_d * c * Lm).re;
                }
            }
        }
        *Wyx = 0.5 * w * (-B / 2.0).exp() * g2 / PI;
    }
    debug!(dim = M, nx = xvec.len(), ny = yvec.len(), "computed Wigner function");
    Ok(W)
}
