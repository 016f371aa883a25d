/// If the condition is not met, return the given error. Borrowed from the `anyhow` crate.
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err);
        }
    };
}

pub(crate) use ensure; // make available throughout crate


/// Bit length required to express `a` in bits (`a > 0`)
pub(crate) const fn bit_length(a: usize) -> usize { a.ilog2() as usize + 1 }


/// Trial division; only ever applied to ring dimensions below 2^16.
pub(crate) const fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}


/// Ensure every coefficient is within -lo to +hi (inclusive)
pub(crate) fn is_in_range(w: &[i32], lo: i32, hi: i32) -> bool {
    w.iter().all(|&e| (e >= -lo) & (e <= hi))
}


/// Mod +/-. Returns the unique `m′` in `(−α/2, α/2]` congruent to `m` modulo `α`.
#[inline]
pub(crate) fn mod_pm(m: i32, a: i32) -> i32 {
    let t = m.rem_euclid(a);
    if t <= (a / 2) {
        t
    } else {
        t - a
    }
}


/// Constant-time-ish byte slice comparison; length is public.
pub(crate) fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_length() {
        assert_eq!(bit_length(1), 1);
        assert_eq!(bit_length(438), 9);
        assert_eq!(bit_length(1498), 11);
        assert_eq!(bit_length(2048), 12);
    }

    #[test]
    fn test_is_prime() {
        let primes = [2usize, 3, 5, 11, 439, 743, 1087, 1171, 1499];
        assert!(primes.iter().all(|&p| is_prime(p)));
        let composites = [0usize, 1, 4, 9, 441, 1089, 2048];
        assert!(composites.iter().all(|&c| !is_prime(c)));
    }

    #[test]
    fn test_mod_pm() {
        assert_eq!(mod_pm(2, 3), -1);
        assert_eq!(mod_pm(-2, 3), 1);
        assert_eq!(mod_pm(1024, 2048), 1024);
        assert_eq!(mod_pm(1025, 2048), -1023);
        assert_eq!(mod_pm(-1024, 2048), 1024);
    }

    #[test]
    fn test_ct_eq() {
        assert!(ct_eq(&[1, 2, 3], &[1, 2, 3]));
        assert!(!ct_eq(&[1, 2, 3], &[1, 2, 4]));
        assert!(!ct_eq(&[1, 2], &[1, 2, 3]));
    }
}
