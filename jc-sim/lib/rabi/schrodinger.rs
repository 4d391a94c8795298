//! Exact coherent evolution for time-independent Hamiltonians.

use ndarray_linalg::{ Eigh, Solve };
use super::*;

fn phases(E: &nd::Array1<f64>, t: f64) -> nd::Array1<C64> {
    E.mapv(|e| (-C64::i() * e * t).exp())
}

/// Compute the Schrödinger coherent evolution of the initial state `psi0` for
/// Hamiltonian `H`.
///
/// `psi0` is taken to be the state at the first time in `t`. The returned array
/// has one column per time.
pub fn eigen(
    psi0: &nd::Array1<C64>,
    H: &nd::Array2<C64>,
    t: &nd::Array1<f64>,
) -> JcResult<nd::Array2<C64>>
{
    let (E, V): (nd::Array1<f64>, nd::Array2<C64>) = H.eigh(UPLO::Lower)?;
    let c: nd::Array1<C64> = V.solve(psi0)?;
    let t0 = t.first().copied().unwrap_or(0.0);
    let mut psi: nd::Array2<C64> = nd::Array::zeros((psi0.len(), t.len()));
    let iter = t.iter().zip(psi.axis_iter_mut(nd::Axis(1)));
    for (&tk, psik) in iter {
        V.dot(&(&c * &phases(&E, tk - t0))).move_into(psik);
    }
    Ok(psi)
}

/// Compute the coherent evolution `U(t) ρ0 U(t)†` of the initial density matrix
/// `rho0` for Hamiltonian `H`.
///
/// `rho0` is taken to be the state at the first time in `t`. The returned array
/// has time along its last axis.
pub fn eigen_density(
    rho0: &nd::Array2<C64>,
    H: &nd::Array2<C64>,
    t: &nd::Array1<f64>,
) -> JcResult<nd::Array3<C64>>
{
    let (E, V): (nd::Array1<f64>, nd::Array2<C64>) = H.eigh(UPLO::Lower)?;
    let Vd = dag(&V);
    // initial state in the energy eigenbasis
    let r0: nd::Array2<C64> = Vd.dot(rho0).dot(&V);
    let t0 = t.first().copied().unwrap_or(0.0);
    let n = rho0.shape()[0];
    let mut rho: nd::Array3<C64> = nd::Array3::zeros((n, n, t.len()));
    let iter = t.iter().zip(rho.axis_iter_mut(nd::Axis(2)));
    for (&tk, rhok) in iter {
        let p = phases(&E, tk - t0);
        let rk = nd::Array2::from_shape_fn((n, n), |(i, j)| {
            p[i] * r0[[i, j]] * p[j].conj()
        });
        V.dot(&rk).dot(&Vd).move_into(rhok);
    }
    Ok(rho)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operators::{ sigmax, sigmaz };

    #[test]
    fn spin_precession() {
        // H = (ω / 2) σx rotates |0⟩ into |1⟩ at frequency ω
        let w: f64 = 1.3;
        let H = sigmax() * C64::from(w / 2.0);
        let t = nd::Array1::linspace(1.0, 4.0, 31);
        let psi0 = nd::array![C64::from(1.0), C64::from(0.0)];
        let psi = eigen(&psi0, &H, &t).unwrap();
        let rho0 = outer_prod(&psi0, &psi0);
        let rho = eigen_density(&rho0, &H, &t).unwrap();
        for (k, &tk) in t.iter().enumerate() {
            let p0 = psi[[0, k]].norm_sqr();
            assert!((p0 - (w * (tk - 1.0) / 2.0).cos().powi(2)).abs() < 1e-12);
            let z = sigmaz().dot(&rho.slice(s![.., .., k])).diag().sum();
            assert!((z.re - (w * (tk - 1.0)).cos()).abs() < 1e-12);
        }
    }
}
