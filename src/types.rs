use crate::params::ParameterSet;
use crate::poly::IntPoly;
use crate::ternary::Ternary;
use crate::traits::HashFn;
use core::fmt;
use core::marker::PhantomData;
use zeroize::{Zeroize, ZeroizeOnDrop};


/// Errors surfaced by this crate. Sampling failures (non-invertible polynomials, rejected
/// message encodings) are retried internally and never appear here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// Malformed parameter stream, unknown object identifier or inconsistent parameters.
    Config(&'static str),
    /// The plaintext cannot be encoded, e.g., it exceeds `max_msg_len_bytes`.
    Encoding(&'static str),
    /// Malformed public or private key bytes.
    KeyFormat(&'static str),
    /// The ciphertext is invalid and cannot be decrypted. The cause is deliberately not reported.
    Decryption,
    /// The random number generator failed.
    Rng(&'static str),
    /// A caller-supplied attempt cap was exhausted before encryption succeeded.
    RetryLimit,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) | Error::Encoding(msg) | Error::KeyFormat(msg) | Error::Rng(msg) => {
                f.write_str(msg)
            }
            Error::Decryption => f.write_str("NTRU.Decrypt: invalid ciphertext"),
            Error::RetryLimit => f.write_str("NTRU.Encrypt: attempt limit reached"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}


/// Representation of the private and blinding polynomials.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolyType {
    /// A single ternary polynomial (dense or sparse storage per the `sparse` flag).
    Simple,
    /// `f1*f2 + f3` with three sparse ternary factors.
    Product,
}

impl PolyType {
    pub(crate) const fn to_i32(self) -> i32 {
        match self {
            PolyType::Simple => 0,
            PolyType::Product => 1,
        }
    }

    pub(crate) fn try_from_i32(v: i32) -> Result<Self, Error> {
        match v {
            0 => Ok(PolyType::Simple),
            1 => Ok(PolyType::Product),
            _ => Err(Error::Config("ParameterSet: unknown polynomial type")),
        }
    }
}


/// Digest engine identity. The engine itself is supplied as a [`crate::traits::HashFn`]
/// type parameter; this selector only records which one a parameter set expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlg {
    /// SHA-256 (`sha2::Sha256`)
    Sha256,
    /// SHA-512 (`sha2::Sha512`)
    Sha512,
    /// SHA3-256 (`sha3::Sha3_256`)
    Sha3_256,
    /// SHA3-512 (`sha3::Sha3_512`)
    Sha3_512,
}

impl HashAlg {
    pub(crate) const fn to_i32(self) -> i32 {
        match self {
            HashAlg::Sha256 => 0,
            HashAlg::Sha512 => 1,
            HashAlg::Sha3_256 => 2,
            HashAlg::Sha3_512 => 3,
        }
    }

    pub(crate) fn try_from_i32(v: i32) -> Result<Self, Error> {
        match v {
            0 => Ok(HashAlg::Sha256),
            1 => Ok(HashAlg::Sha512),
            2 => Ok(HashAlg::Sha3_256),
            3 => Ok(HashAlg::Sha3_512),
            _ => Err(Error::Config("ParameterSet: unknown digest selector")),
        }
    }
}


/// Random generator identity recorded in a parameter set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrngAlg {
    /// The operating system generator (or any caller-supplied `CryptoRngCore`).
    System,
    /// The hash-based deterministic generator in [`crate::prng::HashDrbg`].
    HashDrbg,
}

impl PrngAlg {
    pub(crate) const fn to_i32(self) -> i32 {
        match self {
            PrngAlg::System => 0,
            PrngAlg::HashDrbg => 1,
        }
    }

    pub(crate) fn try_from_i32(v: i32) -> Result<Self, Error> {
        match v {
            0 => Ok(PrngAlg::System),
            1 => Ok(PrngAlg::HashDrbg),
            _ => Err(Error::Config("ParameterSet: unknown PRNG selector")),
        }
    }
}


/// Public key: the polynomial `h = 3·g·fq mod Q`, bound to a parameter set and the digest
/// engine `H` used by encryption. <br>
/// Implements the [`crate::traits::Encryptor`] and [`crate::traits::SerDes`] traits.
pub struct PublicKey<H: HashFn> {
    pub(crate) params: ParameterSet,
    pub(crate) h: IntPoly,
    pub(crate) _hash: PhantomData<fn() -> H>,
}

impl<H: HashFn> PublicKey<H> {
    /// The parameter set this key belongs to.
    #[must_use]
    pub fn params(&self) -> &ParameterSet { &self.params }
}

impl<H: HashFn> Clone for PublicKey<H> {
    fn clone(&self) -> Self {
        PublicKey { params: self.params, h: self.h.clone(), _hash: PhantomData }
    }
}

impl<H: HashFn> PartialEq for PublicKey<H> {
    fn eq(&self, other: &Self) -> bool { (self.params == other.params) & (self.h == other.h) }
}

impl<H: HashFn> Eq for PublicKey<H> {}

impl<H: HashFn> fmt::Debug for PublicKey<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey").field("params", &self.params).finish_non_exhaustive()
    }
}


/// Private key: the sampled polynomial `t` (so `f = t`, or `f = 1 + 3t` under `fast_fp`)
/// together with `fp = f^-1 mod 3` (the constant `1` under `fast_fp`). Zeroized on drop.
/// Implements the [`crate::traits::SerDes`] trait.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    #[zeroize(skip)]
    pub(crate) params: ParameterSet,
    pub(crate) t: Ternary,
    pub(crate) fp: IntPoly,
}

impl PrivateKey {
    /// The parameter set this key belongs to.
    #[must_use]
    pub fn params(&self) -> &ParameterSet { &self.params }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        (self.params == other.params) & (self.t == other.t) & (self.fp == other.fp)
    }
}

impl Eq for PrivateKey {}


/// A matching public and private key. Decryption needs both halves because the
/// recovered message is re-encrypted against the public key as an integrity check. <br>
/// Implements the [`crate::traits::Decryptor`] and [`crate::traits::SerDes`] traits.
pub struct KeyPair<H: HashFn> {
    pub(crate) public: PublicKey<H>,
    pub(crate) private: PrivateKey,
}

impl<H: HashFn> KeyPair<H> {
    /// The public half.
    #[must_use]
    pub fn public_key(&self) -> &PublicKey<H> { &self.public }

    /// The private half.
    #[must_use]
    pub fn private_key(&self) -> &PrivateKey { &self.private }

    /// Joins a public and private key, checking that both use the same parameter set.
    ///
    /// # Errors
    /// Returns an error when the parameter sets differ.
    pub fn try_from_parts(public: PublicKey<H>, private: PrivateKey) -> Result<Self, Error> {
        crate::helpers::ensure!(
            public.params == private.params,
            Error::KeyFormat("KeyPair: public and private key parameter sets differ")
        );
        Ok(KeyPair { public, private })
    }
}

impl<H: HashFn> Clone for KeyPair<H> {
    fn clone(&self) -> Self { KeyPair { public: self.public.clone(), private: self.private.clone() } }
}

impl<H: HashFn> PartialEq for KeyPair<H> {
    fn eq(&self, other: &Self) -> bool { (self.public == other.public) & (self.private == other.private) }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_codes() {
        for alg in [HashAlg::Sha256, HashAlg::Sha512, HashAlg::Sha3_256, HashAlg::Sha3_512] {
            assert_eq!(HashAlg::try_from_i32(alg.to_i32()), Ok(alg));
        }
        for p in [PrngAlg::System, PrngAlg::HashDrbg] {
            assert_eq!(PrngAlg::try_from_i32(p.to_i32()), Ok(p));
        }
        for t in [PolyType::Simple, PolyType::Product] {
            assert_eq!(PolyType::try_from_i32(t.to_i32()), Ok(t));
        }
        assert!(HashAlg::try_from_i32(4).is_err());
        assert!(PrngAlg::try_from_i32(-1).is_err());
        assert!(PolyType::try_from_i32(2).is_err());
    }

    #[test]
    fn test_error_display_hides_cause() {
        use alloc::string::ToString;
        assert_eq!(Error::Decryption.to_string(), "NTRU.Decrypt: invalid ciphertext");
        assert_eq!(Error::Encoding("NTRU.Encrypt: message too long").to_string(),
                   "NTRU.Encrypt: message too long");
    }
}
