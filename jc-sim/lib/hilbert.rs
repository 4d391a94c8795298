//! Definitions to describe states, bases, and combinations thereof.

use std::{ hash::Hash, ops::{ Deref, DerefMut } };
use ndarray as nd;
use indexmap::IndexMap;
use itertools::Itertools;
use num_complex::Complex64 as C64;
use num_traits::{ Zero, One };

/* States *********************************************************************/

/// A single basis state.
pub trait BasisState: Clone + Eq + Hash + std::fmt::Debug {
    /// Return `true` if two states are coupled by the atom-cavity interaction.
    ///
    /// This method should be reflexive in its inputs.
    fn couples_to(&self, other: &Self) -> bool;
}

/// State of a two-level atom.
///
/// Variant order matches the array index: `G` is index 0 and `E` is index 1,
/// so that the lowering operator is `|G⟩⟨E|`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Atom {
    /// Ground state
    G,
    /// Excited state
    E,
}

impl Atom {
    /// Index of the state in the two-dimensional atomic space.
    pub fn index(&self) -> usize {
        match *self {
            Self::G => 0,
            Self::E => 1,
        }
    }

    /// Return `true` if `self` is the excited state.
    pub fn is_excited(&self) -> bool { matches!(self, Self::E) }
}

impl BasisState for Atom {
    fn couples_to(&self, other: &Self) -> bool { self != other }
}

/// Combination of a cavity Fock state index with an atomic state.
///
/// The composite space is ordered cavity ⊗ atom, so the flat index of
/// `JcState { n, atom }` is `2 * n + atom.index()`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct JcState {
    /// Number of photons in the cavity mode.
    pub n: usize,
    /// Atomic state.
    pub atom: Atom,
}

impl JcState {
    pub fn new(n: usize, atom: Atom) -> Self { Self { n, atom } }

    /// Flat index of the state in the composite space.
    pub fn index(&self) -> usize { 2 * self.n + self.atom.index() }

    /// Total number of excitations (photons plus atomic excitation), which is
    /// conserved by the Jaynes-Cummings interaction.
    pub fn excitations(&self) -> usize {
        self.n + usize::from(self.atom.is_excited())
    }

    /// Matrix element of the interaction `a† σ- + a σ+` between two states,
    /// in units of the coupling strength.
    ///
    /// Nonzero only for `|n, E⟩ ↔ |n + 1, G⟩`, where it is `sqrt(n + 1)`.
    pub fn ladder_element(&self, other: &Self) -> Option<f64> {
        match (self.atom, other.atom) {
            (Atom::E, Atom::G) if other.n == self.n + 1
                => Some((other.n as f64).sqrt()),
            (Atom::G, Atom::E) if self.n == other.n + 1
                => Some((self.n as f64).sqrt()),
            _ => None,
        }
    }
}

impl BasisState for JcState {
    fn couples_to(&self, other: &Self) -> bool {
        self.ladder_element(other).is_some()
    }
}

impl From<(usize, Atom)> for JcState {
    fn from(na: (usize, Atom)) -> Self {
        let (n, atom) = na;
        Self { n, atom }
    }
}

/// Compute the outer product `|a⟩⟨b|` of two state vectors.
pub fn outer_prod(a: &nd::Array1<C64>, b: &nd::Array1<C64>)
    -> nd::Array2<C64>
{
    let nb = b.len();
    nd::Array2::from_shape_fn(
        (a.len(), nb),
        |(i, j)| a[i] * b[j].conj(),
    )
}

/* Bases **********************************************************************/

#[derive(Clone)]
pub struct States<'a, S> {
    iter: indexmap::map::Keys<'a, S, f64>
}

impl<'a, S> Iterator for States<'a, S> {
    type Item = &'a S;

    fn next(&mut self) -> Option<Self::Item> { self.iter.next() }
}

pub trait StateIter<'a> {
    type State;

    fn num_states(&'a self) -> usize;

    fn state_iter(&'a self) -> States<'a, Self::State>;
}

/// A collection of unique [`BasisState`]s with associated energies in units of
/// angular frequency.
///
/// This collection is backed by a single [`IndexMap`], which can be accessed
/// via [`AsRef`], [`AsMut`], [`Deref`] and [`DerefMut`].
#[derive(Clone, Debug, PartialEq)]
pub struct Basis<S>
where S: Clone + Eq + Hash
{
    energies: IndexMap<S, f64>,
}

impl<S> AsRef<IndexMap<S, f64>> for Basis<S>
where S: Clone + Eq + Hash
{
    fn as_ref(&self) -> &IndexMap<S, f64> { &self.energies }
}

impl<S> AsMut<IndexMap<S, f64>> for Basis<S>
where S: Clone + Eq + Hash
{
    fn as_mut(&mut self) -> &mut IndexMap<S, f64> { &mut self.energies }
}

impl<S> Deref for Basis<S>
where S: Clone + Eq + Hash
{
    type Target = IndexMap<S, f64>;

    fn deref(&self) -> &Self::Target { &self.energies }
}

impl<S> DerefMut for Basis<S>
where S: Clone + Eq + Hash
{
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.energies }
}

impl<S> Default for Basis<S>
where S: Clone + Eq + Hash
{
    fn default() -> Self { Self { energies: IndexMap::default() } }
}

impl<S> FromIterator<(S, f64)> for Basis<S>
where S: Clone + Eq + Hash
{
    fn from_iter<I>(iter: I) -> Self
    where I: IntoIterator<Item = (S, f64)>
    {
        Self { energies: iter.into_iter().collect() }
    }
}

impl<'a, S> StateIter<'a> for Basis<S>
where S: Clone + Eq + Hash
{
    type State = S;

    fn num_states(&'a self) -> usize { self.energies.len() }

    fn state_iter(&'a self) -> States<'a, Self::State> {
        States { iter: self.energies.keys() }
    }
}

impl<S> Basis<S>
where S: Clone + Eq + Hash
{
    /// Create a new, empty basis.
    pub fn new() -> Self { Self::default() }

    /// Get the energy in units of angular frequency of a particular basis
    /// state.
    pub fn get_energy(&self, state: &S) -> Option<f64> {
        self.energies.get(state).copied()
    }

    /// Get an array representation of a particular basis state.
    ///
    /// The array is sized to match the number of states currently in `self`.
    pub fn get_vector(&self, state: &S) -> Option<nd::Array1<C64>> {
        self.energies.get_index_of(state)
            .and_then(|k| self.get_vector_index(k))
    }

    /// Get an array representation of a particular basis state by index.
    ///
    /// The array is sized to match the number of states currently in `self`.
    pub fn get_vector_index(&self, index: usize) -> Option<nd::Array1<C64>> {
        let n = self.energies.len();
        (index < n).then(|| {
            (0..n).map(|j| if j == index { C64::one() } else { C64::zero() })
                .collect()
        })
    }

    /// Get an array representation of the density matrix for a particular basis
    /// state.
    pub fn get_density(&self, state: &S) -> Option<nd::Array2<C64>> {
        self.get_vector(state)
            .map(|diag| nd::Array2::from_diag(&diag))
    }

    /// Return all pairs of states for which `f` returns `Some`, along with
    /// their indices and the returned value.
    pub fn pairs_with<F, T>(&self, f: F) -> Vec<((usize, usize), T)>
    where F: Fn(&S, &S) -> Option<T>
    {
        self.energies.keys().enumerate()
            .cartesian_product(self.energies.keys().enumerate())
            .filter_map(|((i, si), (j, sj))| f(si, sj).map(|x| ((i, j), x)))
            .collect()
    }
}

impl Basis<JcState> {
    /// Build the composite cavity ⊗ atom basis with `nmax` Fock states and
    /// bare energies `n ω_c + ω_a [atom = E]`.
    pub fn jaynes_cummings(nmax: usize, omega_c: f64, omega_a: f64) -> Self {
        (0..nmax).cartesian_product([Atom::G, Atom::E])
            .map(|(n, atom)| {
                let energy
                    = n as f64 * omega_c
                    + if atom.is_excited() { omega_a } else { 0.0 };
                (JcState::new(n, atom), energy)
            })
            .collect()
    }

    /// Number of cavity Fock states in the basis.
    pub fn nmax(&self) -> usize { self.len() / 2 }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn composite_ordering_is_cavity_major() {
        let basis = Basis::jaynes_cummings(3, 1.0, 0.5);
        assert_eq!(basis.len(), 6);
        assert_eq!(basis.nmax(), 3);
        for (k, state) in basis.keys().enumerate() {
            assert_eq!(state.index(), k);
        }
        assert_eq!(basis.get_energy(&JcState::new(2, Atom::E)), Some(2.5));
        assert_eq!(basis.get_index_of(&JcState::new(1, Atom::G)), Some(2));
    }

    #[test]
    fn ladder_elements_conserve_excitations() {
        let e0 = JcState::new(0, Atom::E);
        let g1 = JcState::new(1, Atom::G);
        let e1 = JcState::new(1, Atom::E);
        let g2 = JcState::new(2, Atom::G);
        assert_eq!(e0.ladder_element(&g1), Some(1.0));
        assert_eq!(g1.ladder_element(&e0), Some(1.0));
        assert_eq!(e1.ladder_element(&g2), Some(2.0_f64.sqrt()));
        assert!(!e0.couples_to(&e1));
        assert!(!g1.couples_to(&g2));
        let basis = Basis::jaynes_cummings(4, 1.0, 1.0);
        for ((_, _), (si, sj)) in basis.pairs_with(|a, b| {
            a.couples_to(b).then_some((*a, *b))
        }) {
            assert_eq!(si.excitations(), sj.excitations());
        }
    }

    #[test]
    fn outer_product_is_projector() {
        let basis = Basis::jaynes_cummings(2, 1.0, 1.0);
        let psi = basis.get_vector(&JcState::new(0, Atom::E)).unwrap();
        let rho = outer_prod(&psi, &psi);
        assert_eq!(rho, basis.get_density(&JcState::new(0, Atom::E)).unwrap());
        assert_eq!(rho.dot(&rho), rho);
    }
}
