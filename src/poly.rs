// Dense integer polynomials in Z[x]/(x^N - 1), the workhorse representation for public
// keys, ciphertexts and every intermediate value of encryption and decryption.

use crate::helpers::mod_pm;
use alloc::vec;
use alloc::vec::Vec;
use zeroize::{Zeroize, ZeroizeOnDrop};


/// Coefficient vector of length `N`; coefficient `i` multiplies `x^i`.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub(crate) struct IntPoly {
    pub(crate) coeffs: Vec<i32>,
}


impl IntPoly {
    pub(crate) fn zero(n: usize) -> Self { IntPoly { coeffs: vec![0; n] } }

    pub(crate) fn one(n: usize) -> Self {
        let mut p = Self::zero(n);
        p.coeffs[0] = 1;
        p
    }

    pub(crate) fn from_coeffs(coeffs: Vec<i32>) -> Self { IntPoly { coeffs } }

    pub(crate) fn n(&self) -> usize { self.coeffs.len() }


    /// Cyclic convolution `self * other mod (x^N - 1, modulus)`, result in `[0, modulus)`.
    /// Accumulates in `i64`, so inputs need only be bounded by `2^16` in magnitude.
    pub(crate) fn mult(&self, other: &IntPoly, modulus: i32) -> IntPoly {
        let n = self.n();
        debug_assert_eq!(n, other.n(), "IntPoly::mult: length mismatch");
        let mut acc = vec![0i64; n];
        for (i, &a) in self.coeffs.iter().enumerate() {
            let a = i64::from(a);
            let (lo, hi) = other.coeffs.split_at(n - i);
            // x^i * x^j lands at i+j, wrapping past N
            acc[i..].iter_mut().zip(lo).for_each(|(c, &b)| *c += a * i64::from(b));
            acc[..i].iter_mut().zip(hi).for_each(|(c, &b)| *c += a * i64::from(b));
        }
        let m = i64::from(modulus);
        #[allow(clippy::cast_possible_truncation)] // result is below modulus
        let coeffs = acc.iter().map(|&c| c.rem_euclid(m) as i32).collect();
        acc.zeroize();
        IntPoly { coeffs }
    }


    /// `self += other mod modulus`, result in `[0, modulus)`.
    pub(crate) fn add(&mut self, other: &IntPoly, modulus: i32) {
        debug_assert_eq!(self.n(), other.n(), "IntPoly::add: length mismatch");
        self.coeffs.iter_mut().zip(other.coeffs.iter()).for_each(|(a, &b)| *a = (*a + b).rem_euclid(modulus));
    }


    /// `self -= other mod modulus`, result in `[0, modulus)`.
    pub(crate) fn sub(&mut self, other: &IntPoly, modulus: i32) {
        debug_assert_eq!(self.n(), other.n(), "IntPoly::sub: length mismatch");
        self.coeffs.iter_mut().zip(other.coeffs.iter()).for_each(|(a, &b)| *a = (*a - b).rem_euclid(modulus));
    }


    /// `self *= s mod modulus`, result in `[0, modulus)`.
    pub(crate) fn mult_scalar(&mut self, s: i32, modulus: i32) {
        let m = i64::from(modulus);
        #[allow(clippy::cast_possible_truncation)]
        self.coeffs.iter_mut().for_each(|a| *a = (i64::from(*a) * i64::from(s)).rem_euclid(m) as i32);
    }


    /// Reduce every coefficient into `[0, modulus)`.
    pub(crate) fn mod_positive(&mut self, modulus: i32) {
        self.coeffs.iter_mut().for_each(|a| *a = a.rem_euclid(modulus));
    }


    /// Reduce every coefficient into `(-modulus/2, modulus/2]`.
    pub(crate) fn center0(&mut self, modulus: i32) {
        self.coeffs.iter_mut().for_each(|a| *a = mod_pm(*a, modulus));
    }


    /// Reduce every coefficient into `{-1, 0, 1}`.
    pub(crate) fn mod3(&mut self) { self.center0(3); }


    /// Number of coefficients equal to `value`.
    pub(crate) fn count(&self, value: i32) -> usize {
        self.coeffs.iter().map(|&c| usize::from(c == value)).sum()
    }


    pub(crate) fn sum_coeffs(&self) -> i64 { self.coeffs.iter().map(|&c| i64::from(c)).sum() }


    /// True when the coefficients are `1, 0, 0, ...` after reduction modulo `modulus`.
    pub(crate) fn is_one_mod(&self, modulus: i32) -> bool {
        self.coeffs.iter().enumerate().all(|(i, &c)| c.rem_euclid(modulus) == i32::from(i == 0))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    // Schoolbook reference with explicit index wrap
    fn naive_mult(a: &[i32], b: &[i32], modulus: i32) -> Vec<i32> {
        let n = a.len();
        let mut c = vec![0i64; n];
        for i in 0..n {
            for j in 0..n {
                c[(i + j) % n] += i64::from(a[i]) * i64::from(b[j]);
            }
        }
        c.iter().map(|&x| x.rem_euclid(i64::from(modulus)) as i32).collect()
    }

    #[test]
    fn test_mult_small() {
        // (1 + x) * (1 + x^2) in Z[x]/(x^3 - 1) = 1 + x + x^2 + x^3 = 2 + x + x^2
        let a = IntPoly::from_coeffs(vec![1, 1, 0]);
        let b = IntPoly::from_coeffs(vec![1, 0, 1]);
        assert_eq!(a.mult(&b, 2048).coeffs, vec![2, 1, 1]);
        assert_eq!(a.mult(&b, 2).coeffs, vec![0, 1, 1]);
    }

    #[test]
    fn test_mult_matches_reference() {
        let n = 107;
        let a: Vec<i32> = (0..n).map(|_| rand::random::<i32>().rem_euclid(2048)).collect();
        let b: Vec<i32> = (0..n).map(|_| rand::random::<i32>().rem_euclid(3) - 1).collect();
        let c = IntPoly::from_coeffs(a.clone()).mult(&IntPoly::from_coeffs(b.clone()), 2048);
        assert_eq!(c.coeffs, naive_mult(&a, &b, 2048));
        let c = IntPoly::from_coeffs(b.clone()).mult(&IntPoly::from_coeffs(a.clone()), 3);
        assert_eq!(c.coeffs, naive_mult(&b, &a, 3));
    }

    #[test]
    fn test_reductions() {
        let mut p = IntPoly::from_coeffs(vec![-1, 2048, 1025, 1024, -2049]);
        p.mod_positive(2048);
        assert_eq!(p.coeffs, vec![2047, 0, 1025, 1024, 2047]);
        p.center0(2048);
        assert_eq!(p.coeffs, vec![-1, 0, -1023, 1024, -1]);
        p.mod3();
        assert_eq!(p.coeffs, vec![-1, 0, 0, 1, -1]);
        assert_eq!(p.count(-1), 2);
        assert_eq!(p.count(0), 2);
        assert_eq!(p.count(1), 1);
        assert_eq!(p.sum_coeffs(), -1);
    }

    #[test]
    fn test_add_sub_scalar() {
        let mut a = IntPoly::from_coeffs(vec![1, 2, 3]);
        let b = IntPoly::from_coeffs(vec![2, 2, 2]);
        a.add(&b, 3);
        assert_eq!(a.coeffs, vec![0, 1, 2]);
        a.sub(&b, 3);
        assert_eq!(a.coeffs, vec![1, 2, 0]);
        a.mult_scalar(3, 4);
        assert_eq!(a.coeffs, vec![3, 2, 0]);
        assert!(!IntPoly::from_coeffs(vec![4, 8, -4]).is_one_mod(3));
        assert!(IntPoly::from_coeffs(vec![4, 6, -3]).is_one_mod(3));
    }
}
