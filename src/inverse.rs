// Inversion in Z[x]/(x^N - 1) modulo 3, 2 and a power of two. Non-invertible inputs are an
// expected outcome (callers resample), so these return Option rather than Result.

use crate::poly::IntPoly;
use alloc::vec;
use alloc::vec::Vec;
use zeroize::Zeroize;


fn degree(v: &[i32]) -> usize { v.iter().rposition(|&c| c != 0).unwrap_or(0) }


/// Almost-inverse algorithm for a prime `p` in `{2, 3}`. Works on length `N + 1` vectors so
/// that `x^N - 1` itself fits; `b` and `c` track the Bezout cofactor and `k` the accumulated
/// power of `x` to divide out at the end.
fn almost_inverse(a: &IntPoly, p: i32) -> Option<IntPoly> {
    debug_assert!((p == 2) | (p == 3), "almost_inverse: p must be 2 or 3");
    let n = a.n();
    let mut f = vec![0i32; n + 1];
    f[..n].iter_mut().zip(a.coeffs.iter()).for_each(|(x, &y)| *x = y.rem_euclid(p));
    let mut g = vec![0i32; n + 1];
    g[0] = p - 1;
    g[n] = 1;
    let mut b = vec![0i32; n + 1];
    b[0] = 1;
    let mut c = vec![0i32; n + 1];
    let mut k = 0usize;

    let result = loop {
        if f.iter().all(|&x| x == 0) {
            break None;
        }
        while f[0] == 0 {
            // f /= x, c *= x
            f.rotate_left(1);
            c.rotate_right(1);
            c[0] = 0;
            k += 1;
        }
        let deg_f = degree(&f);
        if deg_f == 0 {
            break Some(());
        }
        if deg_f < degree(&g) {
            core::mem::swap(&mut f, &mut g);
            core::mem::swap(&mut b, &mut c);
        }
        // Cancel the constant term of f
        let sign = if f[0] == g[0] { p - 1 } else { 1 };
        f.iter_mut().zip(g.iter()).for_each(|(x, &y)| *x = (*x + sign * y) % p);
        b.iter_mut().zip(c.iter()).for_each(|(x, &y)| *x = (*x + sign * y) % p);
    };

    let inverse = match result {
        Some(()) if b[n] == 0 => {
            // f0^-1 = f0 for p in {2, 3}, and x^-k shifts indices down
            let f0 = f[0];
            let k = k % n;
            let mut out = IntPoly::zero(n);
            for (i, &bi) in b[..n].iter().enumerate() {
                out.coeffs[(i + n - k) % n] = (f0 * bi) % p;
            }
            Some(out)
        }
        _ => None,
    };
    for v in [&mut f, &mut g, &mut b, &mut c] {
        v.zeroize();
    }
    inverse
}


/// `a^-1 mod (x^N - 1, 3)` with coefficients in `[0, 3)`, or `None` if `a` is not invertible.
pub(crate) fn invert_f3(a: &IntPoly) -> Option<IntPoly> { almost_inverse(a, 3) }


/// `a^-1 mod (x^N - 1, 2)`, or `None` if `a` is not invertible. Invertibility mod 2 is
/// equivalent to invertibility modulo any power of two.
pub(crate) fn invert_mod2(a: &IntPoly) -> Option<IntPoly> { almost_inverse(a, 2) }


/// `a^-1 mod (x^N - 1, q)` for a power of two `q`: invert mod 2, then lift with
/// `b <- b(2 - ab)` while the working modulus squares (2, 4, 16, 256, ...) up to `q`.
pub(crate) fn invert_fq(a: &IntPoly, q: i32) -> Option<IntPoly> {
    debug_assert!(q.count_ones() == 1, "invert_fq: q must be a power of two");
    let mut b = invert_mod2(a)?;
    let mut v = 2i32;
    while v < q {
        v = i32::try_from((i64::from(v) * i64::from(v)).min(i64::from(q))).ok()?;
        let mut t = a.mult(&b, v);
        t.coeffs.iter_mut().for_each(|x| *x = -*x);
        t.coeffs[0] += 2;
        t.mod_positive(v);
        b = b.mult(&t, v);
    }
    Some(b)
}
