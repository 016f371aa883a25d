#![no_std]
#![deny(unsafe_code)]
#![warn(clippy::pedantic, missing_docs)]
// Almost all of the 'allow' category...
#![warn(absolute_paths_not_starting_with_crate, dead_code)]
#![warn(elided_lifetimes_in_paths, explicit_outlives_requirements, keyword_idents)]
#![warn(let_underscore_drop, macro_use_extern_crate, meta_variable_misuse, missing_abi)]
#![warn(non_ascii_idents, rust_2021_incompatible_closure_captures)]
#![warn(rust_2021_incompatible_or_patterns, rust_2021_prefixes_incompatible_syntax)]
#![warn(rust_2021_prelude_collisions, single_use_lifetimes, trivial_casts)]
#![warn(trivial_numeric_casts, unreachable_pub, unsafe_op_in_unsafe_fn, unstable_features)]
#![warn(unused_extern_crates, unused_import_braces, unused_lifetimes, unused_macro_rules)]
#![warn(unused_qualifications, variant_size_differences)]
#![allow(clippy::module_name_repetitions, clippy::many_single_char_names)]
//
#![doc = include_str!("../README.md")]


// TODO Roadmap
//  1. Sparse-times-sparse multiplication for the product-form f1*f2 step
//  2. Constant-time IGF index placement


// Implements NTRUEncrypt (EES family, IEEE 1363.1 style) over Z[x]/(x^N - 1), p = 3, Q = 2^k.

// Functionality map
//
// ParameterSet, named sets, OID lookup, 66-byte stream   --> params.rs
// Dense ring arithmetic, center0, mod3, count            --> poly.rs
// Dense / sparse / product-form ternary polynomials      --> ternary.rs
// Inversion mod 3, mod 2 and mod Q (Newton lifting)      --> inverse.rs
// Bit packing, tight trits, sves 3-bit <-> 2-trit        --> conversion.rs
// Public key, private key, ciphertext encodings          --> encodings.rs
// IGF, blinding polynomial, MGF-TP-1, public key hash    --> hashing.rs
// KeyGen (sequential and parallel), Encrypt, Decrypt     --> ntru.rs
// Digest engines behind the HashFn trait                 --> digest.rs
// Passphrase-derived deterministic generator             --> prng.rs
// Per-parameter-set namespaces                           --> lib.rs
// Types are in types.rs, traits are in traits.rs...

// Note that debug_assert! statements enforce correct program construction and are not involved
// in any operational dataflow (so are good fuzz targets). The ensure! statements implement
// conservative dataflow validation and do not panic. Unlike lattice schemes with fixed
// dimensions, the parameter set here is a runtime value: every operation is generic over the
// digest only, and sizes are computed from the `ParameterSet`.

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

/// The `rand_core` types are re-exported so that users of ntru-ees do not
/// have to worry about using the exact correct version of `rand_core`.
pub use rand_core::{CryptoRng, Error as RngError, RngCore};
/// The digest engines implementing [`traits::HashFn`].
pub use sha2::{Sha256, Sha512};
/// The digest engines implementing [`traits::HashFn`].
pub use sha3::{Sha3_256, Sha3_512};

mod conversion;
mod digest;
mod encodings;
mod hashing;
mod helpers;
mod inverse;
mod ntru;
mod params;
mod poly;
mod ternary;
mod types;

/// Hash-based deterministic generator for passphrase-derived keys.
pub mod prng;
/// All functionality is covered by traits, such that consumers can utilize trait objects as desired.
pub mod traits;

pub use crate::params::{ParameterSet, PARAMS_STREAM_LEN};
pub use crate::types::{Error, HashAlg, KeyPair, PolyType, PrivateKey, PrngAlg, PublicKey};

use crate::traits::{Decryptor, Encryptor, HashFn, SerDes};
use alloc::vec::Vec;
use rand_core::CryptoRngCore;


// ----- RUNTIME PARAMETER SET API -----

impl<H: HashFn> KeyPair<H> {
    /// Generates a key pair for `params` using the OS random number generator. With the
    /// `std` feature, the `g` and `f` searches run on two threads with independent generators.
    ///
    /// # Errors
    /// Returns an error when `params` does not name digest `H` or the generator fails.
    #[cfg(feature = "default-rng")]
    pub fn try_keygen(params: &ParameterSet) -> Result<Self, Error> {
        #[cfg(feature = "std")]
        {
            ntru::key_gen_parallel(params, &mut rand_core::OsRng, &mut rand_core::OsRng)
        }
        #[cfg(not(feature = "std"))]
        {
            ntru::key_gen(params, &mut rand_core::OsRng)
        }
    }

    /// Generates a key pair for `params` sequentially from the supplied generator.
    ///
    /// # Errors
    /// Returns an error when `params` does not name digest `H` or the generator fails.
    pub fn try_keygen_with_rng(params: &ParameterSet, rng: &mut impl CryptoRngCore) -> Result<Self, Error> {
        ntru::key_gen(params, rng)
    }

    /// Generates a key pair for `params`, searching for `g` on a worker thread driven by
    /// `rng_g` while searching for `f` on the calling thread driven by `rng_f`.
    ///
    /// # Errors
    /// Returns an error when `params` does not name digest `H` or either generator fails.
    #[cfg(feature = "std")]
    pub fn try_keygen_parallel_with_rng(
        params: &ParameterSet, rng_g: &mut (impl CryptoRngCore + Send), rng_f: &mut (impl CryptoRngCore + Send),
    ) -> Result<Self, Error> {
        ntru::key_gen_parallel(params, rng_g, rng_f)
    }

    /// Derives a key pair deterministically from `passphrase` and `salt` using
    /// [`prng::HashDrbg`] over `H`. Always sequential, so the result is reproducible.
    ///
    /// # Errors
    /// Returns an error when `params` does not name digest `H`.
    pub fn try_keygen_from_passphrase(params: &ParameterSet, passphrase: &[u8], salt: &[u8]) -> Result<Self, Error> {
        let mut drbg = prng::HashDrbg::<H>::from_passphrase(passphrase, salt);
        ntru::key_gen(params, &mut drbg)
    }
}


impl<H: HashFn> PublicKey<H> {
    /// As [`Encryptor::try_encrypt_with_rng`], but gives up with [`Error::RetryLimit`] after
    /// `max_attempts` rejected encodings.
    ///
    /// # Errors
    /// Returns an error when the message is too long, the generator fails or the cap is reached.
    pub fn try_encrypt_with_max_attempts(
        &self, rng: &mut impl CryptoRngCore, message: &[u8], max_attempts: u32,
    ) -> Result<Vec<u8>, Error> {
        ntru::encrypt(self, rng, message, Some(max_attempts))
    }
}


impl<H: HashFn> Encryptor for PublicKey<H> {
    fn try_encrypt_with_rng(&self, rng: &mut impl CryptoRngCore, message: &[u8]) -> Result<Vec<u8>, Error> {
        ntru::encrypt(self, rng, message, None)
    }
}


impl<H: HashFn> Decryptor for KeyPair<H> {
    fn try_decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, Error> { ntru::decrypt(self, ciphertext) }
}


// ----- SERIALIZATION AND DESERIALIZATION ---

impl<H: HashFn> SerDes for PublicKey<H> {
    fn into_bytes(self) -> Vec<u8> { encodings::pk_encode(&self.params, &self.h) }

    fn try_from_bytes(params: &ParameterSet, bytes: &[u8]) -> Result<Self, Error> {
        params.validate()?;
        params.check_digest::<H>()?;
        let h = encodings::pk_decode(params, bytes)?;
        Ok(PublicKey { params: *params, h, _hash: core::marker::PhantomData })
    }
}


impl SerDes for PrivateKey {
    fn into_bytes(self) -> Vec<u8> { encodings::sk_encode(&self.params, &self.t) }

    fn try_from_bytes(params: &ParameterSet, bytes: &[u8]) -> Result<Self, Error> {
        params.validate()?;
        let (t, fp) = encodings::sk_decode(params, bytes)?;
        Ok(PrivateKey { params: *params, t, fp })
    }
}


// Public key bytes followed by private key bytes
impl<H: HashFn> SerDes for KeyPair<H> {
    fn into_bytes(self) -> Vec<u8> {
        let KeyPair { public, private } = self;
        let mut out = public.into_bytes();
        out.extend_from_slice(&private.into_bytes());
        out
    }

    fn try_from_bytes(params: &ParameterSet, bytes: &[u8]) -> Result<Self, Error> {
        helpers::ensure!(bytes.len() > params.public_key_len(), Error::KeyFormat("KeyPair: too short"));
        let (pk, sk) = bytes.split_at(params.public_key_len());
        let public = PublicKey::try_from_bytes(params, pk)?;
        let private = PrivateKey::try_from_bytes(params, sk)?;
        KeyPair::try_from_parts(public, private)
    }
}


// This common functionality is injected into each parameter set namespace, and is
// largely a lightweight wrapper into the ntru functions.
macro_rules! functionality {
    () => {
        use crate::ntru;
        use crate::traits::{KeyGen, SerDes};
        use crate::types;
        use crate::Error;
        use rand_core::CryptoRngCore;
        use zeroize::{Zeroize, ZeroizeOnDrop};

        /// Maximum plaintext length in bytes.
        pub const MAX_MSG_LEN: usize = PARAMS.max_msg_len_bytes();
        /// Ciphertext length in bytes.
        pub const CT_LEN: usize = PARAMS.ciphertext_len();
        /// Public key length in bytes.
        pub const PK_LEN: usize = PARAMS.public_key_len();


        // ----- 'EXTERNAL' DATA TYPES -----

        /// Empty struct to enable `KeyGen` trait objects across parameter sets.
        /// Implements the [`crate::traits::KeyGen`] trait.
        #[derive(Zeroize, ZeroizeOnDrop)]
        pub struct KG();

        /// Public key for this parameter set.
        ///
        /// Implements the [`crate::traits::Encryptor`] and [`crate::traits::SerDes`] traits.
        pub type PublicKey = types::PublicKey<Hash>;

        /// Private key for this parameter set.
        ///
        /// Implements the [`crate::traits::SerDes`] trait.
        // Note: #[derive(Zeroize, ZeroizeOnDrop)] is implemented on the underlying struct.
        pub type PrivateKey = types::PrivateKey;

        /// Key pair for this parameter set.
        ///
        /// Implements the [`crate::traits::Decryptor`] and [`crate::traits::SerDes`] traits.
        pub type KeyPair = types::KeyPair<Hash>;


        // ----- PRIMARY FUNCTIONS ---

        /// Generates a key pair specific to this parameter set.
        ///
        /// This function utilizes the **default OS** random number generator, with the two
        /// independent polynomial searches on two threads when the `std` feature is enabled.
        ///
        /// # Errors
        /// Returns an error if the random number generator fails.
        #[cfg(feature = "default-rng")]
        pub fn try_keygen() -> Result<KeyPair, Error> { KG::try_keygen() }


        /// Generates a key pair specific to this parameter set.
        ///
        /// This function utilizes the **provided** random number generator, sequentially.
        ///
        /// # Errors
        /// Returns an error if the random number generator fails.
        pub fn try_keygen_with_rng(rng: &mut impl CryptoRngCore) -> Result<KeyPair, Error> {
            KG::try_keygen_with_rng(rng)
        }


        /// Generates a key pair with the `g` search driven by `rng_g` on a worker thread and
        /// the `f` search driven by `rng_f` on the calling thread.
        ///
        /// # Errors
        /// Returns an error if either random number generator fails.
        #[cfg(feature = "std")]
        pub fn try_keygen_parallel_with_rng(
            rng_g: &mut (impl CryptoRngCore + Send), rng_f: &mut (impl CryptoRngCore + Send),
        ) -> Result<KeyPair, Error> {
            ntru::key_gen_parallel(&PARAMS, rng_g, rng_f)
        }


        /// Derives a key pair deterministically from a passphrase and salt.
        ///
        /// # Errors
        /// Propagates internal errors.
        pub fn try_keygen_from_passphrase(passphrase: &[u8], salt: &[u8]) -> Result<KeyPair, Error> {
            KG::try_keygen_from_passphrase(passphrase, salt)
        }


        impl KeyGen for KG {
            type KeyPair = KeyPair;

            #[cfg(all(feature = "default-rng", feature = "std"))]
            fn try_keygen() -> Result<KeyPair, Error> { KeyPair::try_keygen(&PARAMS) }

            fn try_keygen_with_rng(rng: &mut impl CryptoRngCore) -> Result<KeyPair, Error> {
                ntru::key_gen(&PARAMS, rng)
            }

            fn try_keygen_from_passphrase(passphrase: &[u8], salt: &[u8]) -> Result<KeyPair, Error> {
                KeyPair::try_keygen_from_passphrase(&PARAMS, passphrase, salt)
            }
        }


        // ----- SERIALIZATION AND DESERIALIZATION ---

        /// Deserializes a public key for this parameter set.
        ///
        /// # Errors
        /// Returns an error on malformed input.
        pub fn public_key_from_bytes(bytes: &[u8]) -> Result<PublicKey, Error> {
            PublicKey::try_from_bytes(&PARAMS, bytes)
        }


        /// Deserializes a key pair (public key bytes followed by private key bytes).
        ///
        /// # Errors
        /// Returns an error on malformed input.
        pub fn key_pair_from_bytes(bytes: &[u8]) -> Result<KeyPair, Error> {
            KeyPair::try_from_bytes(&PARAMS, bytes)
        }


        #[cfg(test)]
        mod tests {
            use super::*;
            use crate::traits::{Decryptor, Encryptor};
            use alloc::vec::Vec;
            use rand_chacha::rand_core::SeedableRng;

            #[test]
            fn smoke_test() {
                let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
                let message1 = [0u8, 1, 2, 3, 4, 5, 6, 7];
                let message2: Vec<u8> = (0..MAX_MSG_LEN).map(|i| i as u8).collect();

                for _i in 0..2 {
                    let kp = try_keygen_with_rng(&mut rng).unwrap();
                    for m in [&message1[..], &message2[..], &[]] {
                        let ct = kp.public_key().try_encrypt_with_rng(&mut rng, m).unwrap();
                        assert_eq!(ct.len(), CT_LEN);
                        assert_eq!(kp.try_decrypt(&ct).unwrap(), m);
                    }
                    let too_long = [0u8; MAX_MSG_LEN + 1];
                    assert!(kp.public_key().try_encrypt_with_rng(&mut rng, &too_long).is_err());

                    let pk_bytes = kp.public_key().clone().into_bytes();
                    assert_eq!(pk_bytes.len(), PK_LEN);
                    assert!(public_key_from_bytes(&pk_bytes).unwrap() == *kp.public_key());
                    let kp2 = key_pair_from_bytes(&kp.clone().into_bytes()).unwrap();
                    assert!(kp2 == kp);
                }

                #[cfg(feature = "default-rng")]
                {
                    let kp = try_keygen().unwrap();
                    let ct = kp.public_key().try_encrypt(&message1).unwrap();
                    assert_eq!(kp.try_decrypt(&ct).unwrap(), message1);
                }

                assert_eq!(PARAMS.check_digest::<Hash>(), Ok(()));
            }
        }
    };
}


/// # Functionality for the **EES1087EP2** parameter set.
///
/// `N = 1087`, `Q = 2048`, sparse simple-form private keys, SHA-512.
///
/// **1)** Start with [`ees1087ep2::try_keygen`] to generate a [`ees1087ep2::KeyPair`].
/// The public half implements [`traits::Encryptor`]; the pair implements [`traits::Decryptor`].
///
/// **2)** Keys implement [`traits::SerDes`] for storage and transmission.
#[cfg(feature = "ees1087ep2")]
pub mod ees1087ep2 {
    use crate::ParameterSet;
    /// The parameter set behind this namespace.
    pub const PARAMS: ParameterSet = ParameterSet::EES1087EP2;
    /// Digest engine named by [`PARAMS`].
    pub type Hash = sha2::Sha512;

    functionality!();
}


/// # Functionality for the **EES1171EP1** parameter set.
///
/// `N = 1171`, `Q = 2048`, sparse simple-form private keys, SHA-512.
///
/// See [`ees1087ep2`] for the usage flow.
#[cfg(feature = "ees1171ep1")]
pub mod ees1171ep1 {
    use crate::ParameterSet;
    /// The parameter set behind this namespace.
    pub const PARAMS: ParameterSet = ParameterSet::EES1171EP1;
    /// Digest engine named by [`PARAMS`].
    pub type Hash = sha2::Sha512;

    functionality!();
}


/// # Functionality for the **EES1499EP1** parameter set.
///
/// `N = 1499`, `Q = 2048`, sparse simple-form private keys, SHA-512.
///
/// See [`ees1087ep2`] for the usage flow.
#[cfg(feature = "ees1499ep1")]
pub mod ees1499ep1 {
    use crate::ParameterSet;
    /// The parameter set behind this namespace.
    pub const PARAMS: ParameterSet = ParameterSet::EES1499EP1;
    /// Digest engine named by [`PARAMS`].
    pub type Hash = sha2::Sha512;

    functionality!();
}


/// # Functionality for the **APR2011_439** parameter set.
///
/// `N = 439`, `Q = 2048`, sparse simple-form private keys, SHA-256.
///
/// See [`ees1087ep2`] for the usage flow.
#[cfg(feature = "apr2011-439")]
pub mod apr2011_439 {
    use crate::ParameterSet;
    /// The parameter set behind this namespace.
    pub const PARAMS: ParameterSet = ParameterSet::APR2011_439;
    /// Digest engine named by [`PARAMS`].
    pub type Hash = sha2::Sha256;

    functionality!();
}


/// # Functionality for the **APR2011_439_FAST** parameter set.
///
/// `N = 439`, `Q = 2048`, product-form private keys with `f = 1 + 3t`, SHA-256.
///
/// See [`ees1087ep2`] for the usage flow.
#[cfg(feature = "apr2011-439-fast")]
pub mod apr2011_439_fast {
    use crate::ParameterSet;
    /// The parameter set behind this namespace.
    pub const PARAMS: ParameterSet = ParameterSet::APR2011_439_FAST;
    /// Digest engine named by [`PARAMS`].
    pub type Hash = sha2::Sha256;

    functionality!();
}


/// # Functionality for the **APR2011_743** parameter set.
///
/// `N = 743`, `Q = 2048`, dense simple-form private keys, SHA-512.
///
/// See [`ees1087ep2`] for the usage flow.
#[cfg(feature = "apr2011-743")]
pub mod apr2011_743 {
    use crate::ParameterSet;
    /// The parameter set behind this namespace.
    pub const PARAMS: ParameterSet = ParameterSet::APR2011_743;
    /// Digest engine named by [`PARAMS`].
    pub type Hash = sha2::Sha512;

    functionality!();
}


/// # Functionality for the **APR2011_743_FAST** parameter set.
///
/// `N = 743`, `Q = 2048`, product-form private keys with `f = 1 + 3t`, SHA-512.
///
/// See [`ees1087ep2`] for the usage flow.
#[cfg(feature = "apr2011-743-fast")]
pub mod apr2011_743_fast {
    use crate::ParameterSet;
    /// The parameter set behind this namespace.
    pub const PARAMS: ParameterSet = ParameterSet::APR2011_743_FAST;
    /// Digest engine named by [`PARAMS`].
    pub type Hash = sha2::Sha512;

    functionality!();
}
