use crate::params::ParameterSet;
use crate::types::{Error, HashAlg};
use alloc::vec::Vec;
use rand_core::CryptoRngCore;
#[cfg(feature = "default-rng")]
use rand_core::OsRng;


/// Digest engine contract. Implemented in this crate for `sha2::Sha256`, `sha2::Sha512`,
/// `sha3::Sha3_256` and `sha3::Sha3_512`; the cipher logic only ever goes through this trait.
pub trait HashFn: Clone + Default {
    /// Which algorithm this is, matched against [`ParameterSet::hash_alg`].
    const ALG: HashAlg;
    /// Internal block size in bytes.
    const BLOCK_SIZE: usize;
    /// Output size in bytes.
    const DIGEST_SIZE: usize;

    /// Absorbs `data`.
    fn update(&mut self, data: &[u8]);

    /// Returns the digest of everything absorbed since the last reset, then resets.
    fn finish(&mut self) -> Vec<u8>;

    /// Discards absorbed data.
    fn reset(&mut self);

    /// PBKDF2 with HMAC over this digest; fills `out` from `password` and `salt`.
    fn pbkdf2_hmac(password: &[u8], salt: &[u8], rounds: u32, out: &mut [u8]);

    /// One-shot digest of `data`.
    #[must_use]
    fn compute_hash(data: &[u8]) -> Vec<u8> {
        let mut h = Self::default();
        h.update(data);
        h.finish()
    }
}


/// The `KeyGen` trait is defined to allow trait objects.
pub trait KeyGen {
    /// The key pair type specific to the chosen parameter set, e.g., apr2011_439 or ees1087ep2
    type KeyPair;

    /// Generates a key pair specific to this parameter set. <br>
    /// This function utilizes the OS default random number generator (two independent
    /// instances on two threads when the `std` feature is enabled).
    /// # Errors
    /// Returns an error when the random number generator fails.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(all(feature = "apr2011-439", feature = "default-rng"))] {
    /// use ntru_ees::apr2011_439; // Could also be apr2011_743_fast, ees1087ep2, etc.
    /// use ntru_ees::traits::{Decryptor, Encryptor, KeyGen};
    ///
    /// let message = b"attack at dawn";
    ///
    /// let kp = apr2011_439::KG::try_keygen()?; // Generate a key pair
    /// let ct = kp.public_key().try_encrypt(message)?; // Encrypt with the public key
    /// let pt = kp.try_decrypt(&ct)?; // Decrypt with the key pair
    /// assert_eq!(&pt[..], &message[..]);
    /// # }
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_keygen() -> Result<Self::KeyPair, Error> { Self::try_keygen_with_rng(&mut OsRng) }

    /// Generates a key pair specific to this parameter set, sequentially, from the
    /// supplied random number generator.
    /// # Errors
    /// Returns an error when the random number generator fails.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(feature = "apr2011-439-fast")] {
    /// use ntru_ees::apr2011_439_fast; // Could also be apr2011_439, ees1087ep2, etc.
    /// use ntru_ees::traits::{Decryptor, Encryptor, KeyGen};
    /// use rand_chacha::rand_core::SeedableRng;
    ///
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    ///
    /// let kp = apr2011_439_fast::KG::try_keygen_with_rng(&mut rng)?;
    /// let ct = kp.public_key().try_encrypt_with_rng(&mut rng, b"hi!")?;
    /// assert_eq!(kp.try_decrypt(&ct)?, b"hi!");
    /// # }
    /// # Ok(())}
    /// ```
    fn try_keygen_with_rng(rng: &mut impl CryptoRngCore) -> Result<Self::KeyPair, Error>;

    /// Derives a key pair deterministically from a passphrase and salt via
    /// [`crate::prng::HashDrbg`]. Always runs sequentially so the result is reproducible.
    /// # Errors
    /// Propagates internal errors.
    fn try_keygen_from_passphrase(passphrase: &[u8], salt: &[u8]) -> Result<Self::KeyPair, Error>;
}


/// The `Encryptor` trait is implemented for `PublicKey` on each of the parameter sets
pub trait Encryptor {
    /// Encrypts `message` (at most `max_msg_len_bytes` long) using the OS default random
    /// number generator.
    ///
    /// # Errors
    /// Returns an error when the message is too long or the random number generator fails.
    #[cfg(feature = "default-rng")]
    fn try_encrypt(&self, message: &[u8]) -> Result<Vec<u8>, Error> {
        self.try_encrypt_with_rng(&mut OsRng, message)
    }

    /// Encrypts `message` (at most `max_msg_len_bytes` long) using the supplied random number
    /// generator. The ciphertext is always `ciphertext_len` bytes.
    ///
    /// # Errors
    /// Returns an error when the message is too long or the random number generator fails.
    fn try_encrypt_with_rng(&self, rng: &mut impl CryptoRngCore, message: &[u8]) -> Result<Vec<u8>, Error>;
}


/// The `Decryptor` trait is implemented for `KeyPair` on each of the parameter sets. Decryption
/// re-encrypts the recovered message under the public key, so both halves are needed.
pub trait Decryptor {
    /// Decrypts `ciphertext`.
    ///
    /// # Errors
    /// Returns [`Error::Decryption`] for any invalid ciphertext; the cause is not reported.
    fn try_decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, Error>;
}


/// The `SerDes` trait provides for validated serialization and deserialization of keys.
pub trait SerDes: Sized {
    /// Produces a byte vector from a key.
    fn into_bytes(self) -> Vec<u8>;

    /// Consumes a byte slice and produces a key belonging to `params`, or an error.
    /// # Errors
    /// Returns an error on malformed input or a parameter set mismatch.
    fn try_from_bytes(params: &ParameterSet, bytes: &[u8]) -> Result<Self, Error>;
}
