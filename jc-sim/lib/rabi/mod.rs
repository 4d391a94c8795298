//! Functions for numerical integration of the Schrödinger and Lindblad
//! equations.
//!
//! Where unspecified, the last index of a 2D or 3D array corresponds to time,
//! all Hamiltonians and decay rates should be in units of angular frequency,
//! and integration is via fourth-order Runge-Kutta.

use std::rc::Rc;
use ndarray::{ self as nd, s, Dimension };
use ndarray_linalg::{ EigValsh, UPLO };
use num_complex::Complex64 as C64;
use tracing::{ debug, info };
use crate::{
    dynamics::{ HBuild, LOp },
    error::{ JcError, JcResult },
    hilbert::{ StateIter, outer_prod },
    operators::{ dag, norm_inf },
    trajectory::{ Trajectory, expect },
};

pub mod schrodinger;
pub mod lindblad;

/// Largest phase accumulated by the fastest mode of the generator over a
/// single Runge-Kutta step.
pub const MAX_PHASE_STEP: f64 = 0.25;

pub(crate) trait NewAxis: nd::Dimension {
    fn new_axis(self, size: usize) -> <Self::Larger as Dimension>::Pattern;
}

impl NewAxis for nd::Ix2 {
    fn new_axis(self, new_size: usize) -> (usize, usize, usize) {
        let (a, b) = self.into_pattern();
        (a, b, new_size)
    }
}

pub(crate) trait TimeView<D>
where D: nd::Dimension
{
    type ViewMut<'a> where Self: 'a;

    fn view_time_mut(&mut self, k: usize) -> Self::ViewMut<'_>;
}

impl TimeView<nd::Ix2> for nd::Array3<C64> {
    type ViewMut<'a> = nd::ArrayViewMut2<'a, C64> where Self: 'a;

    fn view_time_mut(&mut self, k: usize) -> Self::ViewMut<'_> {
        self.slice_mut(s![.., .., k])
    }
}

/// Compute a "norm" of an object, treating it as a representation of a quantum
/// state.
pub trait StateNorm {
    fn norm(&self) -> C64;
}

/// The norm of an `ndarray::Array1<num_complex::Complex64>` is the quadrature
/// sum of its elements.
impl StateNorm for nd::Array1<C64> {
    fn norm(&self) -> C64 { self.mapv(|a| a * a.conj()).sum().sqrt() }
}

/// The norm of an `ndarray::Array2<num_complex::Complex64>` is the sum of its
/// main diagonal.
impl StateNorm for nd::Array2<C64> {
    fn norm(&self) -> C64 { self.diag().iter().sum() }
}

/// Different descriptions for a pure state vector, convertible to the standard
/// 1D complex-valued array representation.
#[derive(Clone, Debug)]
pub enum Pure<S> {
    /// A single basis state.
    Single(S),
    /// A pre-constructed array. Will be renormalized.
    Array(nd::Array1<C64>),
}

impl<S> From<nd::Array1<C64>> for Pure<S> {
    fn from(a: nd::Array1<C64>) -> Self { Self::Array(a) }
}

impl<S> Pure<S> {
    /// Create a new [`Self::Single`].
    pub fn from_single(state: S) -> Self { Self::Single(state) }

    /// Create a new [`Self::Array`].
    pub fn from_array(array: nd::Array1<C64>) -> Self { array.into() }

    /// Convert to a 1D complex-valued array.
    ///
    /// The following conditions must be met by the resulting array.
    /// - must have length equal to that of `basis`
    /// - must have elements summing in quadrature to a non-zero value
    pub fn into_array<'b, I>(self, basis: &'b I) -> JcResult<nd::Array1<C64>>
    where
        S: PartialEq + 'b,
        I: StateIter<'b, State = S>,
    {
        match self {
            Self::Single(s0) => {
                let a: nd::Array1<C64>
                    = basis.state_iter()
                    .map(|s| if s == &s0 { 1.0.into() } else { 0.0.into() })
                    .collect();
                (a.sum() != 0.0.into()).then_some(a)
                    .ok_or(JcError::InvalidState("basis state not in basis"))
            },
            Self::Array(mut a) => {
                if a.len() != basis.num_states() {
                    return Err(JcError::DimensionMismatch {
                        context: "pure state",
                        expected: basis.num_states(),
                        got: a.len(),
                    });
                }
                let norm = a.norm();
                if norm == 0.0.into() || !norm.re.is_finite() {
                    return Err(JcError::InvalidState("state vector has zero norm"));
                }
                a /= norm;
                Ok(a)
            },
        }
    }
}

/// Heap-allocated [`Fn`] trait object computing a main-diagonal density matrix
/// element, given a particular basis state.
pub type MixedFn<'a, S> = Rc<dyn Fn(&S) -> f64 + 'a>;

/// Different descriptions for a density matrix, convertible to the standard
/// 2D complex-valued array representation.
#[derive(Clone)]
pub enum Density<'a, S> {
    /// A single basis state.
    Single(S),
    /// A pre-constructed array. Will be renormalized.
    Array(nd::Array2<C64>),
    /// A description of a pure state.
    Pure(Pure<S>),
    /// A functional form giving a (completely) classical mixture of single
    /// basis states. Normalized upon instantiation as an array.
    Mixed(MixedFn<'a, S>),
}

impl<'a, S> std::fmt::Debug for Density<'a, S>
where S: std::fmt::Debug
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(s) => write!(f, "Single({:?})", s),
            Self::Array(a) => write!(f, "Array({:?})", a),
            Self::Pure(p) => write!(f, "Pure({:?})", p),
            Self::Mixed(_) => write!(f, "Mixed(...)"),
        }
    }
}

impl<S> From<nd::Array2<C64>> for Density<'_, S> {
    fn from(a: nd::Array2<C64>) -> Self { Self::Array(a) }
}

impl<S> From<Pure<S>> for Density<'_, S> {
    fn from(pure: Pure<S>) -> Self { Self::Pure(pure) }
}

impl<'a, S> From<MixedFn<'a, S>> for Density<'a, S> {
    fn from(f: MixedFn<'a, S>) -> Self { Self::Mixed(f) }
}

impl<'a, S> Density<'a, S> {
    /// Create a new [`Self::Single`].
    pub fn from_single(state: S) -> Self { Self::Single(state) }

    /// Create a new [`Self::Array`].
    pub fn from_array(array: nd::Array2<C64>) -> Self { array.into() }

    /// Create a new [`Self::Pure`].
    pub fn from_pure(pure: Pure<S>) -> Self { pure.into() }

    /// Create a new [`Self::Mixed`].
    pub fn from_mixture<F: Fn(&S) -> f64 + 'a>(f: F) -> Self {
        Self::Mixed(Rc::new(f))
    }

    /// Return the pure-state description of `self`, if it has one without
    /// further computation.
    pub fn as_pure(&self) -> Option<Pure<S>>
    where S: Clone
    {
        match self {
            Self::Single(s) => Some(Pure::Single(s.clone())),
            Self::Pure(p) => Some(p.clone()),
            _ => None,
        }
    }

    /// Convert to a 2D complex-valued array.
    ///
    /// The following conditions must be met by the resulting array:
    /// - must be square with dimension equal to the length of `basis`
    /// - must have all real, non-negative main-diagonal elements
    /// - must have trace not equal to zero
    /// - must be Hermitian
    pub fn into_array<'b, I>(self, basis: &'b I) -> JcResult<nd::Array2<C64>>
    where
        S: Clone + PartialEq + 'b,
        I: StateIter<'b, State = S>,
    {
        match self {
            Self::Single(s0) => {
                Pure::Single(s0).into_array(basis)
                    .map(|a| nd::Array2::from_diag(&a))
            },
            Self::Array(mut a) => {
                let n = basis.num_states();
                if a.shape() != [n, n] {
                    return Err(JcError::DimensionMismatch {
                        context: "density matrix",
                        expected: n,
                        got: a.shape()[0],
                    });
                }
                if !a.diag().iter().all(|p| p.im.abs() < 1e-12 && p.re >= 0.0) {
                    return Err(JcError::InvalidState(
                        "density matrix has negative or complex populations"));
                }
                if (&a - &dag(&a)).iter().any(|x| x.norm() > 1e-12) {
                    return Err(JcError::InvalidState("density matrix is not Hermitian"));
                }
                let norm = a.norm();
                if norm == 0.0.into() {
                    return Err(JcError::InvalidState("density matrix has zero trace"));
                }
                a /= norm;
                Ok(a)
            },
            Self::Pure(pure) => {
                pure.into_array(basis)
                    .map(|a| outer_prod(&a, &a))
            },
            Self::Mixed(f) => {
                let a: nd::Array1<f64>
                    = basis.state_iter()
                    .map(f.as_ref())
                    .collect();
                let norm = a.sum();
                if a.iter().any(|p| !p.is_finite() || *p < 0.0) {
                    return Err(JcError::InvalidState("mixture has negative weights"));
                }
                if norm == 0.0 {
                    return Err(JcError::InvalidState("mixture has zero total weight"));
                }
                Ok(nd::Array2::from_diag(&a.mapv(|p| C64::from(p / norm))))
            },
        }
    }
}

/// Compute the anti-commutator `{A, B} = A B + B A`.
pub fn anti_commutator<SA, SB>(
    A: &nd::ArrayBase<SA, nd::Ix2>,
    B: &nd::ArrayBase<SB, nd::Ix2>,
) -> nd::Array2<C64>
where
    SA: nd::Data<Elem = C64>,
    SB: nd::Data<Elem = C64>,
{
    A.dot(B) + B.dot(A)
}

pub(crate) fn array_diff<A>(arr: &nd::Array1<A>) -> nd::Array1<A>
where A: Copy + std::ops::Sub<A, Output = A>
{
    arr.iter().zip(arr.iter().skip(1))
        .map(|(ak, akp1)| *akp1 - *ak)
        .collect()
}

/// Check that a time grid has at least `min` samples and is finite and
/// strictly increasing.
pub fn validate_time(t: &nd::Array1<f64>, min: usize) -> JcResult<()> {
    if t.len() < min.max(1) {
        return Err(JcError::ShortTimeGrid { min: min.max(1), len: t.len() });
    }
    if let Some(index) = t.iter().position(|tk| !tk.is_finite()) {
        return Err(JcError::NonMonotonicTime { index });
    }
    if let Some(k) = array_diff(t).iter().position(|dt| *dt <= 0.0) {
        return Err(JcError::NonMonotonicTime { index: k + 1 });
    }
    Ok(())
}

/// Compute the spread `E_max - E_min` of the spectrum of a Hermitian matrix.
pub fn energy_spread(H: &nd::Array2<C64>) -> JcResult<f64> {
    let E = H.eigvalsh(UPLO::Lower)?;
    let spread
        = E.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        - E.iter().copied().fold(f64::INFINITY, f64::min);
    Ok(spread.max(0.0))
}

/// Compute the largest Runge-Kutta step for the Lindblad generator built from
/// `H` and `jump_ops`, based on an upper bound on the magnitude of its
/// eigenvalues.
///
/// Returns `f64::INFINITY` if the generator is identically zero.
pub fn max_step(H: &nd::Array2<C64>, jump_ops: &[nd::Array2<C64>])
    -> JcResult<f64>
{
    let dissipation: f64
        = jump_ops.iter()
        .map(|c| norm_inf(&dag(c).dot(c)))
        .sum();
    let bound = energy_spread(H)? + 2.0 * dissipation;
    Ok(if bound > 0.0 { MAX_PHASE_STEP / bound } else { f64::INFINITY })
}

fn substeps(dt: f64, max_dt: f64) -> usize {
    if max_dt.is_finite() && max_dt > 0.0 {
        ((dt / max_dt).ceil() as usize).max(1)
    } else {
        1
    }
}

fn is_finite<D>(z: &nd::Array<C64, D>) -> bool
where D: nd::Dimension
{
    z.iter().all(|a| a.re.is_finite() && a.im.is_finite())
}

// advance a state over a single grid interval using as many equal RK4 steps as
// needed to keep each step below `max_dt`
fn rk4_interval<D, F>(
    mut z: nd::Array<C64, D>,
    rhs: &F,
    dt: f64,
    max_dt: f64,
    normalize: bool,
    t_end: f64,
) -> JcResult<nd::Array<C64, D>>
where
    D: nd::Dimension,
    nd::Array<C64, D>: StateNorm,
    F: Fn(&nd::Array<C64, D>) -> nd::Array<C64, D>,
{
    let m = substeps(dt, max_dt);
    let h = dt / m as f64;
    let mut k1: nd::Array<C64, D>;
    let mut k2: nd::Array<C64, D>;
    let mut k3: nd::Array<C64, D>;
    let mut k4: nd::Array<C64, D>;
    let mut norm: C64;
    for _ in 0..m {
        k1 = rhs(&z);
        k2 = rhs(&(&z + &k1 * (h / 2.0)));
        k3 = rhs(&(&z + &k2 * (h / 2.0)));
        k4 = rhs(&(&z + &k3 * h));
        z = &z + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0);
        if normalize {
            norm = z.norm();
            z /= norm;
        }
    }
    if is_finite(&z) { Ok(z) } else { Err(JcError::Diverged(t_end)) }
}

// fourth-order Runge-Kutta for a time-independent generator, generic over the
// dimension of the quantum state array and the RHS of the ODE being solved
pub(crate) fn do_evolve<D, F>(
    z0: &nd::Array<C64, D>,
    rhs: F,
    t: &nd::Array1<f64>,
    max_dt: f64,
    normalize: bool,
) -> JcResult<nd::Array<C64, D::Larger>>
where
    D: nd::Dimension + NewAxis + Copy,
    D::Larger: Copy,
    nd::Array<C64, D>: StateNorm,
    for<'a> nd::Array<C64, D::Larger>:
        TimeView<D, ViewMut<'a> = nd::ArrayViewMut<'a, C64, D>>,
    F: Fn(&nd::Array<C64, D>) -> nd::Array<C64, D>,
{
    let n = t.len();
    let dt = array_diff(t);
    let mut z: nd::Array<C64, D::Larger>
        = nd::Array::zeros(z0.raw_dim().new_axis(n));
    let mut z_old: nd::Array<C64, D> = z0.clone();
    z.view_time_mut(0).assign(z0);
    let iter = dt.iter().zip(t.iter().skip(1)).enumerate();
    for (k, (&dtk, &tk)) in iter {
        z_old = rk4_interval(z_old, &rhs, dtk, max_dt, normalize, tk)?;
        z.view_time_mut(k + 1).assign(&z_old);
    }
    Ok(z)
}

// fourth-order Runge-Kutta for a time-independent generator with reduced
// integration output, generic over the dimension of the quantum state array and
// the RHS of the ODE being solved
pub(crate) fn do_evolve_reduced<D, F, X, T>(
    z0: &nd::Array<C64, D>,
    rhs: F,
    t: &nd::Array1<f64>,
    max_dt: f64,
    normalize: bool,
    x: X,
) -> JcResult<Vec<T>>
where
    D: nd::Dimension,
    nd::Array<C64, D>: StateNorm,
    F: Fn(&nd::Array<C64, D>) -> nd::Array<C64, D>,
    X: Fn(&nd::Array<C64, D>) -> T,
{
    let dt = array_diff(t);
    let mut z_old: nd::Array<C64, D> = z0.clone();
    let mut x_t: Vec<T> = Vec::with_capacity(t.len());
    x_t.push(x(&z_old));
    for (&dtk, &tk) in dt.iter().zip(t.iter().skip(1)) {
        z_old = rk4_interval(z_old, &rhs, dtk, max_dt, normalize, tk)?;
        x_t.push(x(&z_old));
    }
    Ok(x_t)
}

/// Solve the master equation for the system described by `hbuilder` and
/// `loperator`, returning the full state trajectory.
///
/// With no active collapse operators the evolution is unitary and is computed
/// exactly by diagonalizing the Hamiltonian; otherwise the Lindblad equation is
/// integrated numerically.
pub fn mesolve<'a, S, D, H, L>(
    hbuilder: &'a H,
    loperator: &'a L,
    rho0: D,
    t: &nd::Array1<f64>,
) -> JcResult<Trajectory>
where
    S: Clone + PartialEq + 'a,
    D: Into<Density<'a, S>>,
    H: HBuild<'a, S>,
    L: LOp<'a, S>,
{
    validate_time(t, 1)?;
    let rho0: Density<'a, S> = rho0.into();
    let H = hbuilder.build_static()
        .ok_or(JcError::InvalidState("Hamiltonian is time-dependent"))?;
    let jump_ops = loperator.jump_ops();
    info!(dim = H.shape()[0], samples = t.len(), channels = jump_ops.len(), "solving master equation");
    let states = if jump_ops.is_empty() {
        match rho0.as_pure() {
            Some(pure) => {
                debug!("unitary evolution of a pure state");
                let psi0 = pure.into_array(hbuilder.get_basis())?;
                let psi = schrodinger::eigen(&psi0, &H, t)?;
                let n = psi0.len();
                let mut rho: nd::Array3<C64> = nd::Array3::zeros((n, n, t.len()));
                for (psik, mut rhok)
                    in psi.axis_iter(nd::Axis(1)).zip(rho.axis_iter_mut(nd::Axis(2)))
                {
                    let psik = psik.to_owned();
                    rhok.assign(&outer_prod(&psik, &psik));
                }
                rho
            },
            None => {
                debug!("unitary evolution of a mixed state");
                let rho0 = rho0.into_array(hbuilder.get_basis())?;
                schrodinger::eigen_density(&rho0, &H, t)?
            },
        }
    } else {
        let rho0 = rho0.into_array(hbuilder.get_basis())?;
        lindblad::evolve(&rho0, &H, &jump_ops, t)?
    };
    Trajectory::new(t.clone(), states)
}

/// Like [`mesolve`], but return only the expectation values of `observables`
/// at each time, as an array with one row per observable.
pub fn mesolve_expect<'a, S, D, H, L>(
    hbuilder: &'a H,
    loperator: &'a L,
    rho0: D,
    t: &nd::Array1<f64>,
    observables: &[nd::Array2<C64>],
) -> JcResult<nd::Array2<f64>>
where
    S: Clone + PartialEq + 'a,
    D: Into<Density<'a, S>>,
    H: HBuild<'a, S>,
    L: LOp<'a, S>,
{
    validate_time(t, 1)?;
    let H = hbuilder.build_static()
        .ok_or(JcError::InvalidState("Hamiltonian is time-dependent"))?;
    let n = H.shape()[0];
    if let Some(op) = observables.iter().find(|op| op.shape() != [n, n]) {
        return Err(JcError::DimensionMismatch {
            context: "observable",
            expected: n,
            got: op.shape()[0],
        });
    }
    let jump_ops = loperator.jump_ops();
    let rho0 = rho0.into().into_array(hbuilder.get_basis())?;
    info!(dim = n, samples = t.len(), observables = observables.len(), "solving master equation for expectation values");
    let values: Vec<Vec<f64>>
        = if jump_ops.is_empty() {
            let rho = schrodinger::eigen_density(&rho0, &H, t)?;
            rho.axis_iter(nd::Axis(2))
                .map(|rhok| {
                    observables.iter()
                        .map(|op| expect(op, &rhok).re)
                        .collect()
                })
                .collect()
        } else {
            lindblad::evolve_reduced(
                &rho0, &H, &jump_ops, t,
                |rho| observables.iter().map(|op| expect(op, rho).re).collect(),
            )?
        };
    let mut out: nd::Array2<f64> = nd::Array2::zeros((observables.len(), t.len()));
    for (k, vk) in values.into_iter().enumerate() {
        out.slice_mut(s![.., k]).assign(&nd::Array1::from(vk));
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        dynamics::{ HBuilderJc, JcParams, LOperatorJc },
        hilbert::{ Atom, JcState },
    };

    fn small_params(g: f64) -> JcParams {
        let mut params = JcParams::new(g);
        params.nmax = 3;
        params
    }

    #[test]
    fn time_grids_are_validated() {
        assert!(validate_time(&nd::array![0.0, 1.0, 2.0], 1).is_ok());
        assert!(matches!(
            validate_time(&nd::Array1::zeros(0), 1),
            Err(JcError::ShortTimeGrid { min: 1, len: 0 })
        ));
        assert!(matches!(
            validate_time(&nd::array![0.0, 1.0, 1.0], 1),
            Err(JcError::NonMonotonicTime { index: 2 })
        ));
        assert!(matches!(
            validate_time(&nd::array![0.0, f64::NAN], 1),
            Err(JcError::NonMonotonicTime { index: 1 })
        ));
    }

    #[test]
    fn density_descriptions() {
        let builder = HBuilderJc::new(&small_params(0.1)).unwrap();
        let basis = builder.basis();
        let rho = Density::from_single(JcState::new(0, Atom::E))
            .into_array(basis).unwrap();
        assert_eq!(rho[[1, 1]], C64::from(1.0));
        let mixed = Density::from_mixture(|s: &JcState| s.n as f64)
            .into_array(basis).unwrap();
        assert!((mixed.norm() - 1.0).norm() < 1e-12);
        assert!(Density::<JcState>::from_array(nd::Array2::zeros((2, 2)))
            .into_array(basis).is_err());
        let mut bad: nd::Array2<C64> = nd::Array2::eye(6);
        bad[[0, 1]] = C64::i();
        assert!(matches!(
            Density::<JcState>::from_array(bad).into_array(basis),
            Err(JcError::InvalidState(_))
        ));
        let pure = Pure::<JcState>::from_array(nd::Array1::ones(6));
        let rho = Density::from_pure(pure).into_array(basis).unwrap();
        assert!((rho.norm() - 1.0).norm() < 1e-12);
        assert!(Pure::from_single(JcState::new(7, Atom::G)).into_array(basis).is_err());
    }

    #[test]
    fn zero_coupling_keeps_occupations_constant() {
        let mut params = small_params(0.0);
        params.gamma_phi = 0.05;
        let builder = HBuilderJc::new(&params).unwrap();
        let lop = LOperatorJc::new(&builder);
        let t = nd::Array1::linspace(0.0, 5.0, 51);
        let rho0 = Density::from_pure(Pure::from_single(JcState::new(1, Atom::E)));
        let obs = [builder.cavity_number(), builder.atom_number()];
        let values = mesolve_expect(&builder, &lop, rho0, &t, &obs).unwrap();
        assert_eq!(values.shape(), &[2, 51]);
        assert!(values.row(0).iter().all(|n| (n - 1.0).abs() < 1e-10));
        assert!(values.row(1).iter().all(|p| (p - 1.0).abs() < 1e-10));
    }

    #[test]
    fn unitary_and_integrated_evolution_agree() {
        let mut params = small_params(0.1);
        let builder = HBuilderJc::new(&params).unwrap();
        let lop = LOperatorJc::new(&builder);
        let t = nd::Array1::linspace(0.0, 4.0, 81);
        let psi0 = JcState::new(0, Atom::E);
        let exact = mesolve_expect(&builder, &lop, Density::from_single(psi0), &t, &[builder.atom_number()])
            .unwrap();
        // vacuum Rabi oscillation: P_E = cos²(g t)
        let g = params.g_rad();
        for (&tk, p) in t.iter().zip(exact.row(0)) {
            assert!((p - (g * tk).cos().powi(2)).abs() < 1e-9);
        }

        // a vanishingly small decay forces the Runge-Kutta path
        params.gamma = 1e-12;
        let builder = HBuilderJc::new(&params).unwrap();
        let lop = LOperatorJc::new(&builder);
        let rk4 = mesolve_expect(&builder, &lop, Density::from_single(psi0), &t, &[builder.atom_number()])
            .unwrap();
        for (a, b) in exact.row(0).iter().zip(rk4.row(0)) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn evolution_is_deterministic() {
        let mut params = small_params(0.2);
        params.kappa = 0.3;
        params.gamma = 0.1;
        params.n_th = 0.1;
        let builder = HBuilderJc::new(&params).unwrap();
        let lop = LOperatorJc::new(&builder);
        let t = nd::Array1::linspace(0.0, 3.0, 31);
        let run = || {
            mesolve(&builder, &lop, Density::from_single(JcState::new(0, Atom::E)), &t)
                .unwrap()
        };
        let a = run();
        let b = run();
        assert_eq!(a.states(), b.states());
        assert!(a.states().axis_iter(nd::Axis(2))
            .all(|rho| (rho.diag().sum() - 1.0).norm() < 1e-12));
    }
}
