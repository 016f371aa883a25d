// Ternary polynomial representations: dense coefficient vectors, sparse index lists and the
// product form f1*f2 + f3. All three multiply an IntPoly identically; the storage choice is
// a per-parameter-set performance decision only.

use crate::helpers::ensure;
use crate::poly::IntPoly;
use crate::types::Error;
use alloc::vec;
use alloc::vec::Vec;
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};


/// Ring operations shared by every ternary representation.
pub(crate) trait TernaryPolynomial {
    /// Ring dimension.
    fn n(&self) -> usize;

    /// `self * b mod (x^N - 1, modulus)`, result in `[0, modulus)`.
    fn mult(&self, b: &IntPoly, modulus: i32) -> IntPoly;

    /// Expanded integer coefficients.
    fn to_int_poly(&self) -> IntPoly;
}


/// Full coefficient vector with entries in `{-1, 0, 1}`.
#[derive(Clone, Zeroize)]
pub(crate) struct DenseTernary(pub(crate) IntPoly);

impl TernaryPolynomial for DenseTernary {
    fn n(&self) -> usize { self.0.n() }

    fn mult(&self, b: &IntPoly, modulus: i32) -> IntPoly { self.0.mult(b, modulus) }

    fn to_int_poly(&self) -> IntPoly { self.0.clone() }
}


/// Sorted positions of the `+1` and `-1` coefficients.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct SparseTernary {
    #[zeroize(skip)]
    n: usize,
    ones: Vec<usize>,
    neg_ones: Vec<usize>,
}

impl SparseTernary {
    /// Builds from index lists, which must be strictly increasing, below `n` and disjoint.
    pub(crate) fn try_from_indices(n: usize, ones: Vec<usize>, neg_ones: Vec<usize>) -> Result<Self, Error> {
        let sorted = |v: &[usize]| v.windows(2).all(|w| w[0] < w[1]) & v.iter().all(|&i| i < n);
        ensure!(sorted(&ones) & sorted(&neg_ones), Error::KeyFormat("SparseTernary: bad index list"));
        ensure!(
            ones.iter().all(|i| neg_ones.binary_search(i).is_err()),
            Error::KeyFormat("SparseTernary: index lists overlap")
        );
        Ok(SparseTernary { n, ones, neg_ones })
    }

    /// Collects the nonzero positions of a ternary `IntPoly`.
    pub(crate) fn from_int_poly(p: &IntPoly) -> Self {
        debug_assert!(crate::helpers::is_in_range(&p.coeffs, 1, 1), "SparseTernary: not ternary");
        let pick = |v: i32| -> Vec<usize> {
            p.coeffs.iter().enumerate().filter(|&(_, &c)| c == v).map(|(i, _)| i).collect()
        };
        SparseTernary { n: p.n(), ones: pick(1), neg_ones: pick(-1) }
    }

    pub(crate) fn ones(&self) -> &[usize] { &self.ones }

    pub(crate) fn neg_ones(&self) -> &[usize] { &self.neg_ones }

    // Sum of rotations of b, one per nonzero position
    fn mult_unreduced(&self, b: &IntPoly) -> Vec<i64> {
        let n = self.n;
        debug_assert_eq!(n, b.n(), "SparseTernary::mult: length mismatch");
        let mut acc = vec![0i64; n];
        for (indices, sign) in [(&self.ones, 1i64), (&self.neg_ones, -1i64)] {
            for &i in indices {
                let (lo, hi) = b.coeffs.split_at(n - i);
                acc[i..].iter_mut().zip(lo).for_each(|(c, &x)| *c += sign * i64::from(x));
                acc[..i].iter_mut().zip(hi).for_each(|(c, &x)| *c += sign * i64::from(x));
            }
        }
        acc
    }
}

impl TernaryPolynomial for SparseTernary {
    fn n(&self) -> usize { self.n }

    fn mult(&self, b: &IntPoly, modulus: i32) -> IntPoly {
        let mut acc = self.mult_unreduced(b);
        let m = i64::from(modulus);
        #[allow(clippy::cast_possible_truncation)]
        let coeffs = acc.iter().map(|&c| c.rem_euclid(m) as i32).collect();
        acc.zeroize();
        IntPoly::from_coeffs(coeffs)
    }

    fn to_int_poly(&self) -> IntPoly {
        let mut p = IntPoly::zero(self.n);
        self.ones.iter().for_each(|&i| p.coeffs[i] = 1);
        self.neg_ones.iter().for_each(|&i| p.coeffs[i] = -1);
        p
    }
}


/// Product form with logical value `f1*f2 + f3`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct ProductForm {
    pub(crate) f1: SparseTernary,
    pub(crate) f2: SparseTernary,
    pub(crate) f3: SparseTernary,
}

impl TernaryPolynomial for ProductForm {
    fn n(&self) -> usize { self.f1.n() }

    fn mult(&self, b: &IntPoly, modulus: i32) -> IntPoly {
        let c = self.f1.mult(b, modulus);
        let mut c = self.f2.mult(&c, modulus);
        let c3 = self.f3.mult(b, modulus);
        c.add(&c3, modulus);
        c
    }

    // Exact integer value; the coefficients are small so no reduction is needed
    fn to_int_poly(&self) -> IntPoly {
        let f1 = self.f1.to_int_poly();
        let mut acc = self.f2.mult_unreduced(&f1);
        let f3 = self.f3.to_int_poly();
        #[allow(clippy::cast_possible_truncation)]
        let coeffs = acc.iter().zip(f3.coeffs.iter()).map(|(&c, &d)| c as i32 + d).collect();
        acc.zeroize();
        IntPoly::from_coeffs(coeffs)
    }
}


/// A private or blinding polynomial in any of the three representations.
#[derive(Clone)]
pub(crate) enum Ternary {
    Dense(DenseTernary),
    Sparse(SparseTernary),
    Product(ProductForm),
}

impl Ternary {
    /// Wraps a ternary `IntPoly` in dense or sparse storage.
    pub(crate) fn from_int_poly(p: IntPoly, sparse: bool) -> Self {
        if sparse {
            Ternary::Sparse(SparseTernary::from_int_poly(&p))
        } else {
            Ternary::Dense(DenseTernary(p))
        }
    }
}

impl TernaryPolynomial for Ternary {
    fn n(&self) -> usize {
        match self {
            Ternary::Dense(p) => p.n(),
            Ternary::Sparse(p) => p.n(),
            Ternary::Product(p) => p.n(),
        }
    }

    fn mult(&self, b: &IntPoly, modulus: i32) -> IntPoly {
        match self {
            Ternary::Dense(p) => p.mult(b, modulus),
            Ternary::Sparse(p) => p.mult(b, modulus),
            Ternary::Product(p) => p.mult(b, modulus),
        }
    }

    fn to_int_poly(&self) -> IntPoly {
        match self {
            Ternary::Dense(p) => p.to_int_poly(),
            Ternary::Sparse(p) => p.to_int_poly(),
            Ternary::Product(p) => p.to_int_poly(),
        }
    }
}

impl Zeroize for Ternary {
    fn zeroize(&mut self) {
        match self {
            Ternary::Dense(p) => p.zeroize(),
            Ternary::Sparse(p) => p.zeroize(),
            Ternary::Product(p) => p.zeroize(),
        }
    }
}

// Equal expanded coefficients mean equal polynomials, whatever the storage
impl PartialEq for Ternary {
    fn eq(&self, other: &Self) -> bool { self.to_int_poly() == other.to_int_poly() }
}

impl Eq for Ternary {}


// ----- RANDOM SAMPLING -----

/// Uniform index in `[0, n)` by rejection sampling 32-bit words.
pub(crate) fn random_index(n: usize, rng: &mut impl CryptoRngCore) -> Result<usize, Error> {
    debug_assert!((1..1 << 16).contains(&n), "random_index: n out of range");
    #[allow(clippy::cast_possible_truncation)]
    let n32 = n as u32;
    let limit = u32::MAX - u32::MAX % n32;
    loop {
        let mut bytes = [0u8; 4];
        rng.try_fill_bytes(&mut bytes).map_err(|_| Error::Rng("NTRU: random number generator failed"))?;
        let x = u32::from_le_bytes(bytes);
        if x < limit {
            return Ok((x % n32) as usize);
        }
    }
}


/// Dense ternary polynomial with exactly `num_ones` coefficients `1` and `num_neg_ones`
/// coefficients `-1`, at uniformly random positions.
pub(crate) fn random_ternary(
    n: usize, num_ones: usize, num_neg_ones: usize, rng: &mut impl CryptoRngCore,
) -> Result<IntPoly, Error> {
    debug_assert!(num_ones + num_neg_ones <= n, "random_ternary: weight exceeds N");
    let mut p = IntPoly::zero(n);
    for (count, value) in [(num_ones, 1), (num_neg_ones, -1)] {
        let mut placed = 0;
        while placed < count {
            let i = random_index(n, rng)?;
            if p.coeffs[i] == 0 {
                p.coeffs[i] = value;
                placed += 1;
            }
        }
    }
    Ok(p)
}


/// Random simple-form polynomial in dense or sparse storage.
pub(crate) fn random_simple(
    n: usize, num_ones: usize, num_neg_ones: usize, sparse: bool, rng: &mut impl CryptoRngCore,
) -> Result<Ternary, Error> {
    let p = random_ternary(n, num_ones, num_neg_ones, rng)?;
    Ok(Ternary::from_int_poly(p, sparse))
}


/// Random product-form polynomial; factor `i` has `weights[i]` ones and `weights[i]` minus ones.
pub(crate) fn random_product(n: usize, weights: [usize; 3], rng: &mut impl CryptoRngCore) -> Result<Ternary, Error> {
    let mut factor = |d: usize| -> Result<SparseTernary, Error> {
        Ok(SparseTernary::from_int_poly(&random_ternary(n, d, d, rng)?))
    };
    let f1 = factor(weights[0])?;
    let f2 = factor(weights[1])?;
    let f3 = factor(weights[2])?;
    Ok(Ternary::Product(ProductForm { f1, f2, f3 }))
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;

    fn random_dense(n: usize, q: i32, rng: &mut impl CryptoRngCore) -> IntPoly {
        let coeffs = (0..n).map(|_| random_index(q as usize, rng).unwrap() as i32).collect();
        IntPoly::from_coeffs(coeffs)
    }

    #[test]
    fn test_representations_agree() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let n = 439;
        for _i in 0..8 {
            let t = random_ternary(n, 30, 29, &mut rng).unwrap();
            assert_eq!(t.count(1), 30);
            assert_eq!(t.count(-1), 29);
            let b = random_dense(n, 2048, &mut rng);
            let dense = Ternary::from_int_poly(t.clone(), false);
            let sparse = Ternary::from_int_poly(t.clone(), true);
            assert!(dense == sparse);
            assert_eq!(dense.mult(&b, 2048), sparse.mult(&b, 2048));
            assert_eq!(dense.mult(&b, 3), t.mult(&b, 3));
            assert_eq!(sparse.to_int_poly(), t);
        }
    }

    #[test]
    fn test_product_form() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(8);
        let n = 439;
        let pf = random_product(n, [9, 8, 5], &mut rng).unwrap();
        let b = random_dense(n, 2048, &mut rng);
        let expanded = pf.to_int_poly();
        // f1*f2 + f3 evaluated at x = 1 is 0*0 + 0
        assert_eq!(expanded.sum_coeffs(), 0);
        assert_eq!(pf.mult(&b, 2048), expanded.mult(&b, 2048));
        assert_eq!(pf.mult(&b, 3), expanded.mult(&b, 3));
        if let Ternary::Product(p) = &pf {
            assert_eq!(p.f1.ones().len(), 9);
            assert_eq!(p.f2.neg_ones().len(), 8);
            assert_eq!(p.f3.ones().len(), 5);
        } else {
            panic!("expected product form");
        }
    }

    #[test]
    fn test_try_from_indices() {
        assert!(SparseTernary::try_from_indices(11, vec![1, 4, 9], vec![0, 2]).is_ok());
        assert!(SparseTernary::try_from_indices(11, vec![1, 4, 11], vec![0]).is_err());
        assert!(SparseTernary::try_from_indices(11, vec![4, 1], vec![0]).is_err());
        assert!(SparseTernary::try_from_indices(11, vec![1, 4], vec![4]).is_err());
        assert!(SparseTernary::try_from_indices(11, vec![1, 1], vec![]).is_err());
    }

    #[test]
    fn test_zeroize() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(9);
        let mut t = random_simple(107, 10, 10, true, &mut rng).unwrap();
        t.zeroize();
        assert_eq!(t.to_int_poly(), IntPoly::zero(107));
    }
}
