//! Dense operator constructors on the truncated cavity, the two-level atom, and
//! their composite space.
//!
//! Matrices follow the index conventions of [`crate::hilbert`]: Fock state `n`
//! is index `n`, and the atomic ground/excited states are indices 0/1. Pauli
//! matrices are written in that same index basis, so the excited state has
//! `⟨σz⟩ = -1`.

use ndarray::{ self as nd, s, linalg::kron };
use num_complex::Complex64 as C64;
use num_traits::{ One, Zero };

/// Truncated bosonic annihilation operator on `n` Fock states.
pub fn destroy(n: usize) -> nd::Array2<C64> {
    let mut a: nd::Array2<C64> = nd::Array2::zeros((n, n));
    if n > 1 {
        a.slice_mut(s![..n - 1, 1..])
            .diag_mut().iter_mut().enumerate()
            .for_each(|(k, elem)| { *elem = C64::from((k as f64 + 1.0).sqrt()); });
    }
    a
}

/// Truncated bosonic creation operator on `n` Fock states.
pub fn create(n: usize) -> nd::Array2<C64> { dag(&destroy(n)) }

/// Identity on `n` states.
pub fn qeye(n: usize) -> nd::Array2<C64> { nd::Array2::eye(n) }

/// Number operator `a† a` on `n` Fock states.
pub fn num(n: usize) -> nd::Array2<C64> {
    let diag: nd::Array1<C64> = (0..n).map(|k| C64::from(k as f64)).collect();
    nd::Array2::from_diag(&diag)
}

/// Pauli X.
pub fn sigmax() -> nd::Array2<C64> {
    nd::array![
        [C64::zero(), C64::one() ],
        [C64::one(),  C64::zero()],
    ]
}

/// Pauli Y.
pub fn sigmay() -> nd::Array2<C64> {
    nd::array![
        [C64::zero(), -C64::i()  ],
        [C64::i(),    C64::zero()],
    ]
}

/// Pauli Z.
pub fn sigmaz() -> nd::Array2<C64> {
    nd::array![
        [C64::one(),  C64::zero()],
        [C64::zero(), -C64::one()],
    ]
}

/// Atomic lowering operator `|G⟩⟨E|`.
pub fn sigmam() -> nd::Array2<C64> { destroy(2) }

/// Atomic raising operator `|E⟩⟨G|`.
pub fn sigmap() -> nd::Array2<C64> { create(2) }

/// Kronecker product `A ⊗ B`.
pub fn tensor<SA, SB>(
    A: &nd::ArrayBase<SA, nd::Ix2>,
    B: &nd::ArrayBase<SB, nd::Ix2>,
) -> nd::Array2<C64>
where
    SA: nd::Data<Elem = C64>,
    SB: nd::Data<Elem = C64>,
{
    kron(A, B)
}

/// Hermitian conjugate.
pub fn dag<S>(A: &nd::ArrayBase<S, nd::Ix2>) -> nd::Array2<C64>
where S: nd::Data<Elem = C64>
{
    A.t().mapv(|a| a.conj())
}

/// Cavity annihilation operator `a ⊗ I` on the composite space with `nmax`
/// Fock states.
pub fn cavity_destroy(nmax: usize) -> nd::Array2<C64> {
    tensor(&destroy(nmax), &qeye(2))
}

/// Atomic lowering operator `I ⊗ σ-` on the composite space with `nmax` Fock
/// states.
pub fn atom_lower(nmax: usize) -> nd::Array2<C64> {
    tensor(&qeye(nmax), &sigmam())
}

/// Embed a single-atom operator into the composite space as `I ⊗ op`.
pub fn atom_op(nmax: usize, op: &nd::Array2<C64>) -> nd::Array2<C64> {
    tensor(&qeye(nmax), op)
}

/// Matrix infinity norm (maximum absolute row sum), an upper bound on the
/// spectral radius.
pub fn norm_inf<S>(A: &nd::ArrayBase<S, nd::Ix2>) -> f64
where S: nd::Data<Elem = C64>
{
    A.rows().into_iter()
        .map(|row| row.iter().map(|a| a.norm()).sum::<f64>())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod test {
    use super::*;

    fn close(A: &nd::Array2<C64>, B: &nd::Array2<C64>) -> bool {
        A.shape() == B.shape()
            && A.iter().zip(B).all(|(a, b)| (a - b).norm() < 1e-12)
    }

    #[test]
    fn ladder_operators() {
        let a = destroy(4);
        let ad = create(4);
        assert!(close(&ad.dot(&a), &num(4)));
        // [a, a†] = 1 except in the last (truncated) level
        let comm = a.dot(&ad) - ad.dot(&a);
        for k in 0..3 {
            assert!((comm[[k, k]] - 1.0).norm() < 1e-12);
        }
        assert!((comm[[3, 3]] + 3.0).norm() < 1e-12);
    }

    #[test]
    fn pauli_algebra() {
        let xy = sigmax().dot(&sigmay());
        assert!(close(&xy, &(sigmaz() * C64::i())));
        assert!(close(&sigmap().dot(&sigmam()), &nd::array![
            [C64::zero(), C64::zero()],
            [C64::zero(), C64::one() ],
        ]));
    }

    #[test]
    fn composite_operators_act_on_the_right_factor() {
        let a = cavity_destroy(3);
        let sm = atom_lower(3);
        assert_eq!(a.shape(), &[6, 6]);
        // a and σ- act on different factors and commute
        assert!(close(&a.dot(&sm), &sm.dot(&a)));
        // |1, G⟩ (index 2) is lowered to |0, G⟩ (index 0) by a
        assert!((a[[0, 2]] - 1.0).norm() < 1e-12);
        // |0, E⟩ (index 1) is lowered to |0, G⟩ (index 0) by σ-
        assert!((sm[[0, 1]] - 1.0).norm() < 1e-12);
        assert!(norm_inf(&a) >= 2.0_f64.sqrt() - 1e-12);
    }
}
