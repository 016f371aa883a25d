// Key generation, encryption and decryption over a runtime parameter set.

use crate::conversion::{decode_sves, encode_sves, pack_bits};
use crate::encodings::{ct_decode, ct_encode};
use crate::hashing::{generate_blinding_poly, mgf_tp_1, public_key_hash};
use crate::helpers::{ct_eq, ensure};
use crate::inverse::{invert_f3, invert_fq, invert_mod2};
use crate::params::ParameterSet;
use crate::poly::IntPoly;
use crate::ternary::{random_product, random_simple, random_ternary, Ternary, TernaryPolynomial};
use crate::traits::HashFn;
use crate::types::{Error, KeyPair, PolyType, PrivateKey, PublicKey};
use alloc::vec;
use alloc::vec::Vec;
use core::marker::PhantomData;
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, Zeroizing};


// ----- KEY GENERATION -----

/// Samples `g` with `dg` ones and `dg - 1` minus ones until it is invertible mod 2.
fn gen_g(params: &ParameterSet, rng: &mut impl CryptoRngCore) -> Result<IntPoly, Error> {
    let dg = params.dg();
    loop {
        let g = random_ternary(params.n(), dg, dg - 1, rng)?;
        if invert_mod2(&g).is_some() {
            return Ok(g);
        }
    }
}


/// Samples `t` until `f` (`t`, or `1 + 3t` under `fastFp`) is invertible mod 3 and mod `Q`.
/// Returns `(t, fp, fq)`.
fn gen_f(params: &ParameterSet, rng: &mut impl CryptoRngCore) -> Result<(Ternary, IntPoly, IntPoly), Error> {
    let n = params.n();
    loop {
        let t = match params.poly_type() {
            PolyType::Simple => {
                let neg = if params.fast_fp() { params.df() } else { params.df() - 1 };
                random_simple(n, params.df(), neg, params.sparse(), rng)?
            }
            PolyType::Product => random_product(n, params.df_product(), rng)?,
        };
        let mut f = t.to_int_poly();
        if params.fast_fp() {
            f.coeffs.iter_mut().for_each(|c| *c *= 3);
            f.coeffs[0] += 1;
        }
        let fp = if params.fast_fp() { Some(IntPoly::one(n)) } else { invert_f3(&f) };
        let Some(fp) = fp else { continue };
        let Some(fq) = invert_fq(&f, params.q()) else { continue };
        debug_assert!(f.mult(&fq, params.q()).is_one_mod(params.q()), "gen_f: fq is not an inverse of f");
        return Ok((t, fp, fq));
    }
}


// h = 3 * g * fq mod Q
fn assemble<H: HashFn>(params: &ParameterSet, g: &IntPoly, t: Ternary, fp: IntPoly, fq: &IntPoly) -> KeyPair<H> {
    let mut h = g.mult(fq, params.q());
    h.mult_scalar(3, params.q());
    KeyPair {
        public: PublicKey { params: *params, h, _hash: PhantomData },
        private: PrivateKey { params: *params, t, fp },
    }
}


/// Sequential key generation: `g` first, then `f`, from one generator. The only path used
/// with deterministic generators.
pub(crate) fn key_gen<H: HashFn>(params: &ParameterSet, rng: &mut impl CryptoRngCore) -> Result<KeyPair<H>, Error> {
    params.validate()?;
    params.check_digest::<H>()?;
    let g = gen_g(params, rng)?;
    let (t, fp, fq) = gen_f(params, rng)?;
    Ok(assemble(params, &g, t, fp, &fq))
}


/// Key generation with the `g` search on a scoped worker thread and the `f` search on the
/// calling thread, each with its own generator.
#[cfg(feature = "std")]
pub(crate) fn key_gen_parallel<H: HashFn>(
    params: &ParameterSet, rng_g: &mut (impl CryptoRngCore + Send), rng_f: &mut (impl CryptoRngCore + Send),
) -> Result<KeyPair<H>, Error> {
    params.validate()?;
    params.check_digest::<H>()?;
    let (g, f) = std::thread::scope(|s| {
        let worker = s.spawn(|| gen_g(params, rng_g));
        let f = gen_f(params, rng_f);
        let g = worker.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        (g, f)
    });
    let g = g?;
    let (t, fp, fq) = f?;
    Ok(assemble(params, &g, t, fp, &fq))
}


// ----- ENCRYPTION AND DECRYPTION -----

// oid || m || b || htrunc
fn blinding_seed(params: &ParameterSet, m: &[u8], b: &[u8], htrunc: &[u8]) -> Zeroizing<Vec<u8>> {
    let mut seed = Zeroizing::new(Vec::with_capacity(3 + m.len() + b.len() + htrunc.len()));
    seed.extend_from_slice(&params.oid());
    seed.extend_from_slice(m);
    seed.extend_from_slice(b);
    seed.extend_from_slice(htrunc);
    seed
}


// R mod 4 packed two bits per coefficient; Q is a power of two of at least 4
fn mask_seed(big_r: &IntPoly) -> Zeroizing<Vec<u8>> {
    let low: Zeroizing<Vec<i32>> = Zeroizing::new(big_r.coeffs.iter().map(|&c| c & 3).collect());
    Zeroizing::new(pack_bits(&low, 2))
}


fn dm0_ok(m: &IntPoly, dm0: usize) -> bool { (m.count(-1) >= dm0) & (m.count(0) >= dm0) & (m.count(1) >= dm0) }


// Signed cap on the coefficient sum; 0 disables it
fn max_m1_ok(m: &IntPoly, max_m1: usize) -> bool {
    max_m1 == 0 || m.sum_coeffs() <= i64::try_from(max_m1).unwrap_or(i64::MAX)
}


/// Encrypts `m` under `pk`. Resamples fresh `b` whenever the masked message fails the `maxM1`
/// or `dm0` checks; `max_attempts` optionally bounds the number of tries.
pub(crate) fn encrypt<H: HashFn>(
    pk: &PublicKey<H>, rng: &mut impl CryptoRngCore, m: &[u8], max_attempts: Option<u32>,
) -> Result<Vec<u8>, Error> {
    let params = &pk.params;
    ensure!(m.len() <= params.max_msg_len_bytes(), Error::Encoding("NTRU.Encrypt: message too long"));
    let (n, q) = (params.n(), params.q());
    let db_bytes = params.db() / 8;
    let htrunc = public_key_hash::<H>(&pk.h, params);

    let mut attempts = 0u32;
    loop {
        if let Some(max) = max_attempts {
            ensure!(attempts < max, Error::RetryLimit);
        }
        attempts += 1;

        // 1: b || len || m || padding
        let mut b = Zeroizing::new(vec![0u8; db_bytes]);
        rng.try_fill_bytes(&mut b).map_err(|_| Error::Rng("NTRU.Encrypt: random number generator failed"))?;
        let mut buffer = Zeroizing::new(Vec::with_capacity(params.buffer_len_bytes()));
        buffer.extend_from_slice(&b);
        #[allow(clippy::cast_possible_truncation)] // max_msg_len_bytes < 256
        buffer.push(m.len() as u8);
        buffer.extend_from_slice(m);
        buffer.resize(params.buffer_len_bytes(), 0);

        // 2: message trits occupy coefficients 1..N-1
        let mut m_trin = IntPoly::zero(n);
        let mut trits = encode_sves(&buffer, n - 1);
        m_trin.coeffs[1..].copy_from_slice(&trits);
        trits.zeroize();

        // 3-4: r from the seed, R = r * h
        let seed = blinding_seed(params, m, &b, &htrunc);
        let r = generate_blinding_poly::<H>(&seed, params);
        let big_r = r.mult(&pk.h, q);

        // 5: mask
        let mask = mgf_tp_1::<H>(&mask_seed(&big_r), params);
        m_trin.add(&mask, 3);
        m_trin.mod3();

        // 6: coefficient-sum cap
        if !max_m1_ok(&m_trin, params.max_m1()) {
            continue;
        }
        if params.max_m1() > 0 {
            m_trin.coeffs[0] = 0;
        }

        // 7: every ternary value must appear at least dm0 times
        if !dm0_ok(&m_trin, params.dm0()) {
            continue;
        }

        // 8: e = R + mTrin
        let mut e = big_r;
        e.add(&m_trin, q);
        return Ok(ct_encode(params, &e));
    }
}


/// Decrypts `ct` with the key pair. Every failure is reported as [`Error::Decryption`].
pub(crate) fn decrypt<H: HashFn>(kp: &KeyPair<H>, ct: &[u8]) -> Result<Vec<u8>, Error> {
    let params = &kp.public.params;
    let sk = &kp.private;
    let q = params.q();
    let db_bytes = params.db() / 8;

    // 1: e
    let e = ct_decode(params, ct)?;

    // 2: a = f * e, with f * e = 3(t * e) + e under fastFp
    let mut a = sk.t.mult(&e, q);
    if params.fast_fp() {
        a.mult_scalar(3, q);
        a.add(&e, q);
    }
    a.center0(q);
    a.mod3();
    let ci = if params.fast_fp() {
        a
    } else {
        let mut ci = sk.fp.mult(&a, 3);
        ci.mod3();
        ci
    };

    // 3: structural check; a zeroed constant coefficient must still be zero
    ensure!(dm0_ok(&ci, params.dm0()), Error::Decryption);
    ensure!((params.max_m1() == 0) | (ci.coeffs[0] == 0), Error::Decryption);

    // 4: unmask
    let mut c_r = e.clone();
    c_r.sub(&ci, q);
    let mask = mgf_tp_1::<H>(&mask_seed(&c_r), params);
    let mut c_m_trin = ci;
    c_m_trin.sub(&mask, 3);
    c_m_trin.mod3();

    // 5: coefficient 0 carries no message, so it must unmask to zero
    ensure!((params.max_m1() > 0) | (c_m_trin.coeffs[0] == 0), Error::Decryption);

    // 6: b || len || m || padding
    let buffer = Zeroizing::new(decode_sves(&c_m_trin.coeffs[1..]).map_err(|_| Error::Decryption)?);
    let len = usize::from(buffer[db_bytes]);
    ensure!(len <= params.max_msg_len_bytes(), Error::Decryption);
    let b = &buffer[..db_bytes];
    let m = &buffer[db_bytes + 1..db_bytes + 1 + len];
    ensure!(buffer[db_bytes + 1 + len..].iter().all(|&x| x == 0), Error::Decryption);

    // 7: re-derive r and confirm r * h = cR
    let htrunc = public_key_hash::<H>(&kp.public.h, params);
    let seed = blinding_seed(params, m, b, &htrunc);
    let r = generate_blinding_poly::<H>(&seed, params);
    let r_h = r.mult(&kp.public.h, q);
    ensure!(ct_eq(&ct_encode(params, &r_h), &ct_encode(params, &c_r)), Error::Decryption);

    // 8: m
    Ok(m.to_vec())
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use sha2::{Sha256, Sha512};

    #[test]
    fn test_key_validity() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(31);
        for params in [ParameterSet::APR2011_439, ParameterSet::APR2011_439_FAST] {
            let kp = key_gen::<Sha256>(&params, &mut rng).unwrap();
            let mut f = kp.private.t.to_int_poly();
            if params.fast_fp() {
                f.coeffs.iter_mut().for_each(|c| *c *= 3);
                f.coeffs[0] += 1;
            }
            assert!(f.mult(&kp.private.fp, 3).is_one_mod(3));
            let fq = invert_fq(&f, 2048).unwrap();
            assert!(f.mult(&fq, 2048).is_one_mod(2048));
            // h * f = 3g, whose coefficients are all in {-3, 0, 3}
            let mut g3 = kp.public.h.mult(&f, 2048);
            g3.center0(2048);
            assert!(g3.coeffs.iter().all(|&c| (c == 0) | (c == 3) | (c == -3)));
            assert!(kp.public.h.coeffs.iter().all(|&c| (0..2048).contains(&c)));
        }
    }

    #[test]
    fn test_round_trip_and_shape() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(32);
        let params = ParameterSet::APR2011_439;
        let kp = key_gen::<Sha256>(&params, &mut rng).unwrap();
        for len in [0usize, 1, 17, 64] {
            let m: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let ct = encrypt(&kp.public, &mut rng, &m, None).unwrap();
            assert_eq!(ct.len(), 604);
            assert_eq!(decrypt(&kp, &ct).unwrap(), m);
        }
        assert_eq!(
            encrypt(&kp.public, &mut rng, &[0u8; 65], None),
            Err(Error::Encoding("NTRU.Encrypt: message too long"))
        );
    }

    #[test]
    fn test_retry_limit() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(33);
        let params = ParameterSet::APR2011_439;
        let kp = key_gen::<Sha256>(&params, &mut rng).unwrap();
        assert_eq!(encrypt(&kp.public, &mut rng, b"hi!", Some(0)), Err(Error::RetryLimit));
        assert!(encrypt(&kp.public, &mut rng, b"hi!", Some(1000)).is_ok());
    }

    #[test]
    fn test_wrong_digest_rejected() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(34);
        assert!(key_gen::<Sha512>(&ParameterSet::APR2011_439, &mut rng).is_err());
    }

    #[test]
    fn test_decrypt_garbage() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(35);
        let params = ParameterSet::APR2011_439_FAST;
        let kp = key_gen::<Sha256>(&params, &mut rng).unwrap();
        assert_eq!(decrypt(&kp, &[0u8; 604]), Err(Error::Decryption));
        assert_eq!(decrypt(&kp, &[0u8; 603]), Err(Error::Decryption));
        let ct = encrypt(&kp.public, &mut rng, b"abc", None).unwrap();
        let mut other = ct.clone();
        other[100] ^= 0x10;
        assert_eq!(decrypt(&kp, &other), Err(Error::Decryption));
    }

    // +-1 on e[0] moves ci[0] in step, leaving cR and the mask unchanged
    #[test]
    fn test_constant_coefficient_bound() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(38);
        let capped = ParameterSet::APR2011_439.with_max_m1(439).unwrap();
        for params in [ParameterSet::APR2011_439, ParameterSet::APR2011_439_FAST, capped] {
            let kp = key_gen::<Sha256>(&params, &mut rng).unwrap();
            let ct = encrypt(&kp.public, &mut rng, b"hi!", None).unwrap();
            for delta in [1, -1, 2, 2047] {
                let mut e = ct_decode(&params, &ct).unwrap();
                e.coeffs[0] = (e.coeffs[0] + delta).rem_euclid(2048);
                assert_eq!(decrypt(&kp, &ct_encode(&params, &e)), Err(Error::Decryption), "delta {delta}");
            }
            assert_eq!(decrypt(&kp, &ct).unwrap(), b"hi!");
        }
    }

    #[test]
    fn test_mask_seed() {
        let r = IntPoly::from_coeffs(vec![5, 2047, 4, 1026, 3]);
        let seed: Zeroizing<Vec<u8>> = mask_seed(&r);
        assert_eq!(seed[..], pack_bits(&[1, 3, 0, 2, 3], 2)[..]);
    }

    #[test]
    fn test_max_m1_is_signed() {
        let mut m = IntPoly::zero(439);
        m.coeffs[..50].iter_mut().for_each(|c| *c = -1);
        assert!(max_m1_ok(&m, 10));
        m.coeffs[..50].iter_mut().for_each(|c| *c = 1);
        assert!(!max_m1_ok(&m, 10));
        assert!(max_m1_ok(&m, 50));
        assert!(max_m1_ok(&m, 0));
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_parallel_keygen() {
        let mut rng1 = rand_chacha::ChaCha8Rng::seed_from_u64(36);
        let mut rng2 = rand_chacha::ChaCha8Rng::seed_from_u64(37);
        let params = ParameterSet::APR2011_743_FAST;
        let kp = key_gen_parallel::<Sha512>(&params, &mut rng1, &mut rng2).unwrap();
        let ct = encrypt(&kp.public, &mut rng1, b"parallel", None).unwrap();
        assert_eq!(decrypt(&kp, &ct).unwrap(), b"parallel");
    }
}
