//! Solver output and the quantities derived from it: reduced states,
//! expectation values, Bloch vectors, and snapshot lookup.

use ndarray::{ self as nd, s };
use num_complex::Complex64 as C64;
use rustc_hash::FxHashMap as HashMap;
use tracing::trace;
use crate::{
    error::{ JcError, JcResult },
    operators::{ sigmax, sigmay, sigmaz },
    rabi::validate_time,
};

/// Compute the expectation value `Tr[op ρ]`.
///
/// The result is real for Hermitian `op` and `ρ`.
pub fn expect<SA, SB>(
    op: &nd::ArrayBase<SA, nd::Ix2>,
    rho: &nd::ArrayBase<SB, nd::Ix2>,
) -> C64
where
    SA: nd::Data<Elem = C64>,
    SB: nd::Data<Elem = C64>,
{
    op.rows().into_iter()
        .zip(rho.columns())
        .map(|(op_i, rho_i)| op_i.dot(&rho_i))
        .sum()
}

/// Partial trace of a bipartite density matrix with subsystem dimensions
/// `dims`, keeping subsystem `keep` (0 or 1).
pub fn ptrace<S>(
    rho: &nd::ArrayBase<S, nd::Ix2>,
    dims: [usize; 2],
    keep: usize,
) -> JcResult<nd::Array2<C64>>
where S: nd::Data<Elem = C64>
{
    let n = dims[0] * dims[1];
    if rho.shape() != [n, n] {
        return Err(JcError::DimensionMismatch {
            context: "partial trace",
            expected: n,
            got: rho.shape()[0],
        });
    }
    let [d0, d1] = dims;
    match keep {
        0 => Ok(nd::Array2::from_shape_fn((d0, d0), |(i, j)| {
            (0..d1).map(|k| rho[[i * d1 + k, j * d1 + k]]).sum()
        })),
        1 => Ok(nd::Array2::from_shape_fn((d1, d1), |(i, j)| {
            (0..d0).map(|k| rho[[k * d1 + i, k * d1 + j]]).sum()
        })),
        _ => Err(JcError::DimensionMismatch {
            context: "partial trace subsystem",
            expected: 2,
            got: keep,
        }),
    }
}

/// Compute the Bloch vector `(⟨σx⟩, ⟨σy⟩, ⟨σz⟩)` of a single-atom density
/// matrix.
pub fn bloch_vector<S>(rho: &nd::ArrayBase<S, nd::Ix2>) -> JcResult<[f64; 3]>
where S: nd::Data<Elem = C64>
{
    if rho.shape() != [2, 2] {
        return Err(JcError::DimensionMismatch {
            context: "Bloch vector",
            expected: 2,
            got: rho.shape()[0],
        });
    }
    Ok([
        expect(&sigmax(), rho).re,
        expect(&sigmay(), rho).re,
        expect(&sigmaz(), rho).re,
    ])
}

/// One of the two factors of the cavity ⊗ atom space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Cavity,
    Atom,
}

impl Subsystem {
    fn keep(self) -> usize {
        match self {
            Self::Cavity => 0,
            Self::Atom => 1,
        }
    }
}

/// Time-ordered sequence of composite cavity ⊗ atom density matrices, with time
/// along the last axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    time: nd::Array1<f64>,
    states: nd::Array3<C64>,
}

impl Trajectory {
    /// Create a new `Trajectory`, checking that `time` is a valid grid matching
    /// the last axis of `states`, and that the states live in a cavity ⊗ atom
    /// space.
    pub fn new(time: nd::Array1<f64>, states: nd::Array3<C64>) -> JcResult<Self> {
        validate_time(&time, 1)?;
        let (n, m, nt) = states.dim();
        if nt != time.len() {
            return Err(JcError::DimensionMismatch {
                context: "trajectory time axis",
                expected: time.len(),
                got: nt,
            });
        }
        if n != m || n % 2 != 0 || n == 0 {
            return Err(JcError::DimensionMismatch {
                context: "trajectory state",
                expected: 2 * (n / 2).max(1),
                got: n.max(m),
            });
        }
        Ok(Self { time, states })
    }

    /// Sample times.
    pub fn time(&self) -> &nd::Array1<f64> { &self.time }

    /// All states, with time along the last axis.
    pub fn states(&self) -> &nd::Array3<C64> { &self.states }

    /// Number of samples.
    pub fn len(&self) -> usize { self.time.len() }

    /// Return `true` if there are no samples.
    pub fn is_empty(&self) -> bool { self.time.is_empty() }

    /// Dimension of the composite space.
    pub fn dim(&self) -> usize { self.states.shape()[0] }

    /// Number of cavity Fock states.
    pub fn nmax(&self) -> usize { self.dim() / 2 }

    /// Composite state at sample `k`.
    pub fn state(&self, k: usize) -> JcResult<nd::ArrayView2<'_, C64>> {
        if k >= self.len() {
            return Err(JcError::SampleIndex { index: k, len: self.len() });
        }
        Ok(self.states.slice(s![.., .., k]))
    }

    /// Find the sample nearest to time `t`.
    ///
    /// Ties resolve to the earlier sample and times outside the grid clamp to
    /// its first or last sample. No interpolation is performed, so distinct
    /// off-grid requests may alias to the same sample.
    pub fn nearest_index(&self, t: f64) -> JcResult<usize> {
        if !t.is_finite() {
            return Err(JcError::InvalidSnapshotTime(t));
        }
        let len = self.time.len();
        let i = self.time.iter().position(|&tk| tk >= t).unwrap_or(len);
        let k
            = if i == 0 {
                0
            } else if i == len {
                len - 1
            } else if t - self.time[i - 1] <= self.time[i] - t {
                i - 1
            } else {
                i
            };
        trace!(t, k, tk = self.time[k], "nearest sample");
        Ok(k)
    }

    /// Find the samples nearest to each of `times`, in order.
    pub fn snapshot_indices(&self, times: &[f64]) -> JcResult<Vec<usize>> {
        times.iter().map(|&t| self.nearest_index(t)).collect()
    }

    /// Reduced state of `subsystem` at sample `k`.
    pub fn reduced_state(&self, k: usize, subsystem: Subsystem)
        -> JcResult<nd::Array2<C64>>
    {
        ptrace(&self.state(k)?, [self.nmax(), 2], subsystem.keep())
    }

    /// Reduced cavity state at sample `k`.
    pub fn cavity_state(&self, k: usize) -> JcResult<nd::Array2<C64>> {
        self.reduced_state(k, Subsystem::Cavity)
    }

    /// Reduced atomic state at sample `k`.
    pub fn atom_state(&self, k: usize) -> JcResult<nd::Array2<C64>> {
        self.reduced_state(k, Subsystem::Atom)
    }

    /// Expectation values of `op` over the whole trajectory.
    pub fn expect(&self, op: &nd::Array2<C64>) -> JcResult<nd::Array1<f64>> {
        if op.shape() != [self.dim(), self.dim()] {
            return Err(JcError::DimensionMismatch {
                context: "observable",
                expected: self.dim(),
                got: op.shape()[0],
            });
        }
        Ok(
            self.states.axis_iter(nd::Axis(2))
                .map(|rho| expect(op, &rho).re)
                .collect()
        )
    }

    /// Bloch vectors of the atom at every sample, as a `3 × len` array.
    pub fn bloch_vectors(&self) -> JcResult<nd::Array2<f64>> {
        let mut b: nd::Array2<f64> = nd::Array2::zeros((3, self.len()));
        for (k, mut bk) in b.axis_iter_mut(nd::Axis(1)).enumerate() {
            let v = bloch_vector(&self.atom_state(k)?)?;
            bk.assign(&nd::ArrayView1::from(&v[..]));
        }
        Ok(b)
    }
}

/// Memoizing view over the reduced states of a [`Trajectory`].
///
/// Each `(sample, subsystem)` pair is traced out at most once.
#[derive(Clone, Debug)]
pub struct ReducedStates<'a> {
    traj: &'a Trajectory,
    cache: HashMap<(usize, Subsystem), nd::Array2<C64>>,
}

impl<'a> ReducedStates<'a> {
    pub fn new(traj: &'a Trajectory) -> Self {
        Self { traj, cache: HashMap::default() }
    }

    /// Return the underlying trajectory.
    pub fn trajectory(&self) -> &'a Trajectory { self.traj }

    /// Number of reduced states computed so far.
    pub fn cached(&self) -> usize { self.cache.len() }

    /// Reduced state of `subsystem` at sample `k`.
    pub fn get(&mut self, k: usize, subsystem: Subsystem)
        -> JcResult<&nd::Array2<C64>>
    {
        let key = (k, subsystem);
        if !self.cache.contains_key(&key) {
            let rho = self.traj.reduced_state(k, subsystem)?;
            self.cache.insert(key, rho);
        }
        self.cache.get(&key)
            .ok_or(JcError::SampleIndex { index: k, len: self.traj.len() })
    }

    /// Reduced states of `subsystem` nearest to each of `times`, in order.
    pub fn snapshots(&mut self, times: &[f64], subsystem: Subsystem)
        -> JcResult<Vec<(usize, nd::Array2<C64>)>>
    {
        let indices = self.traj.snapshot_indices(times)?;
        indices.into_iter()
            .map(|k| self.get(k, subsystem).map(|rho| (k, rho.clone())))
            .collect()
    }
}
