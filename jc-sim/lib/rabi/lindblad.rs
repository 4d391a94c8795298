//! Evolution functions for the Lindblad equation.

use super::*;

/// Right-hand side of the Lindblad equation,
/// `-i (H_eff ρ - ρ H_eff†) + Σ_k C_k ρ C_k†` with
/// `H_eff = H - (i/2) Σ_k C_k† C_k`.
///
/// The map is linear and is also valid for non-Hermitian arguments.
#[derive(Clone, Debug)]
pub struct Generator {
    heff: nd::Array2<C64>,
    heff_dag: nd::Array2<C64>,
    jumps: Vec<(nd::Array2<C64>, nd::Array2<C64>)>,
}

impl Generator {
    /// Create a new `Generator` from a Hamiltonian and collapse operators in
    /// Lindblad form.
    pub fn new(H: &nd::Array2<C64>, jump_ops: &[nd::Array2<C64>]) -> Self {
        let mut heff = H.clone();
        let jumps: Vec<(nd::Array2<C64>, nd::Array2<C64>)>
            = jump_ops.iter()
            .map(|c| (c.clone(), dag(c)))
            .collect();
        for (c, cd) in jumps.iter() {
            heff.scaled_add(C64::new(0.0, -0.5), &cd.dot(c));
        }
        let heff_dag = dag(&heff);
        Self { heff, heff_dag, jumps }
    }

    /// Apply the generator to `rho`.
    pub fn apply(&self, rho: &nd::Array2<C64>) -> nd::Array2<C64> {
        let mut drho
            = (self.heff.dot(rho) - rho.dot(&self.heff_dag)) * (-C64::i());
        for (c, cd) in self.jumps.iter() {
            drho += &c.dot(rho).dot(cd);
        }
        drho
    }
}

fn check_dims(
    rho0: &nd::Array2<C64>,
    H: &nd::Array2<C64>,
    jump_ops: &[nd::Array2<C64>],
) -> JcResult<()>
{
    let n = H.shape()[0];
    let bad
        = std::iter::once(rho0)
        .chain(jump_ops.iter())
        .find(|a| a.shape() != [n, n]);
    match bad {
        Some(a) => Err(JcError::DimensionMismatch {
            context: "Lindblad evolution",
            expected: n,
            got: a.shape()[0],
        }),
        None => Ok(()),
    }
}

/// Numerically integrate the Lindblad equation for a time-independent
/// Hamiltonian and collapse operators in Lindblad form.
///
/// The state is trace-renormalized after every step.
pub fn evolve(
    rho0: &nd::Array2<C64>,
    H: &nd::Array2<C64>,
    jump_ops: &[nd::Array2<C64>],
    t: &nd::Array1<f64>,
) -> JcResult<nd::Array3<C64>>
{
    validate_time(t, 1)?;
    check_dims(rho0, H, jump_ops)?;
    let gen = Generator::new(H, jump_ops);
    let max_dt = max_step(H, jump_ops)?;
    debug!(max_dt, "integrating Lindblad equation");
    do_evolve(rho0, |rho| gen.apply(rho), t, max_dt, true)
}

/// Numerically integrate the Lindblad equation for a time-independent
/// Hamiltonian.
///
/// Fails if the initial state description is invalid or a time-independent
/// Hamiltonian cannot be built.
pub fn evolve_with<'a, S, D, H, L>(
    rho0: D,
    hbuilder: &'a H,
    loperator: &'a L,
    t: &nd::Array1<f64>,
) -> JcResult<nd::Array3<C64>>
where
    S: Clone + PartialEq + 'a,
    D: Into<Density<'a, S>>,
    H: HBuild<'a, S>,
    L: LOp<'a, S>,
{
    let rho0 = rho0.into().into_array(hbuilder.get_basis())?;
    let H = hbuilder.build_static()
        .ok_or(JcError::InvalidState("Hamiltonian is time-dependent"))?;
    evolve(&rho0, &H, &loperator.jump_ops(), t)
}

/// Numerically integrate the Lindblad equation for a time-independent
/// Hamiltonian with reduced integration output.
///
/// `x` is applied to the (trace-normalized) state at every time in `t`.
pub fn evolve_reduced<X, T>(
    rho0: &nd::Array2<C64>,
    H: &nd::Array2<C64>,
    jump_ops: &[nd::Array2<C64>],
    t: &nd::Array1<f64>,
    x: X,
) -> JcResult<Vec<T>>
where X: Fn(&nd::Array2<C64>) -> T
{
    validate_time(t, 1)?;
    check_dims(rho0, H, jump_ops)?;
    let gen = Generator::new(H, jump_ops);
    let max_dt = max_step(H, jump_ops)?;
    debug!(max_dt, "integrating Lindblad equation (reduced output)");
    do_evolve_reduced(rho0, |rho| gen.apply(rho), t, max_dt, true, x)
}

/// Apply the Lindblad propagator to an arbitrary (not necessarily Hermitian or
/// normalized) operator `chi0`, returning `x(chi(t))` at every time in `t`.
///
/// No renormalization is performed, which makes this suitable for propagating
/// the operators that appear in two-time correlation functions.
pub fn propagate<X, T>(
    chi0: &nd::Array2<C64>,
    H: &nd::Array2<C64>,
    jump_ops: &[nd::Array2<C64>],
    t: &nd::Array1<f64>,
    x: X,
) -> JcResult<Vec<T>>
where X: Fn(&nd::Array2<C64>) -> T
{
    validate_time(t, 1)?;
    check_dims(chi0, H, jump_ops)?;
    let gen = Generator::new(H, jump_ops);
    let max_dt = max_step(H, jump_ops)?;
    debug!(max_dt, "propagating operator");
    do_evolve_reduced(chi0, |chi| gen.apply(chi), t, max_dt, false, x)
}
