// Hash-based deterministic random generator for passphrase-derived keys.

use crate::traits::HashFn;
use alloc::vec::Vec;
use core::marker::PhantomData;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;


/// PBKDF2 iteration count for passphrase-derived keys.
pub const PASSPHRASE_ITERATIONS: u32 = 10_000;


/// Deterministic generator over the digest `H`. The output stream is
/// `H(key || 0) || H(key || 1) || ...` with big-endian u64 counters, where `key` is derived
/// from a passphrase and salt (or a raw seed). Identical inputs give identical streams.
///
/// A generator is `&mut`-borrowed by one sampling loop at a time.
/// Use [`HashDrbg::branch`] to obtain an independent generator for a second thread.
pub struct HashDrbg<H: HashFn> {
    key: Vec<u8>,
    counter: u64,
    pool: Vec<u8>,
    pos: usize,
    _hash: PhantomData<fn() -> H>,
}


impl<H: HashFn> HashDrbg<H> {
    /// Derives a digest-sized key with PBKDF2-HMAC-`H` over [`PASSPHRASE_ITERATIONS`] rounds.
    #[must_use]
    pub fn from_passphrase(passphrase: &[u8], salt: &[u8]) -> Self {
        let mut key = alloc::vec![0u8; H::DIGEST_SIZE];
        H::pbkdf2_hmac(passphrase, salt, PASSPHRASE_ITERATIONS, &mut key);
        Self::with_key(key)
    }


    /// Seeds directly from `seed` (hashed once).
    #[must_use]
    pub fn from_seed_bytes(seed: &[u8]) -> Self { Self::with_key(H::compute_hash(seed)) }


    fn with_key(key: Vec<u8>) -> Self { HashDrbg { key, counter: 0, pool: Vec::new(), pos: 0, _hash: PhantomData } }


    /// Derives an independent child generator from this generator's own output. The parent
    /// advances, so repeated calls yield distinct children, deterministically.
    #[must_use]
    pub fn branch(&mut self) -> Self {
        let mut seed = alloc::vec![0u8; H::DIGEST_SIZE];
        self.fill(&mut seed);
        let child = Self::from_seed_bytes(&seed);
        seed.zeroize();
        child
    }


    fn refill(&mut self) {
        let mut hasher = H::default();
        hasher.update(&self.key);
        hasher.update(&self.counter.to_be_bytes());
        self.pool.zeroize();
        self.pool = hasher.finish();
        self.pos = 0;
        self.counter += 1;
    }


    fn fill(&mut self, dest: &mut [u8]) {
        let mut written = 0;
        while written < dest.len() {
            if self.pos == self.pool.len() {
                self.refill();
            }
            let take = (dest.len() - written).min(self.pool.len() - self.pos);
            dest[written..written + take].copy_from_slice(&self.pool[self.pos..self.pos + take]);
            self.pos += take;
            written += take;
        }
    }
}


impl<H: HashFn> RngCore for HashDrbg<H> {
    fn next_u32(&mut self) -> u32 { rand_core::impls::next_u32_via_fill(self) }

    fn next_u64(&mut self) -> u64 { rand_core::impls::next_u64_via_fill(self) }

    fn fill_bytes(&mut self, dest: &mut [u8]) { self.fill(dest); }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill(dest);
        Ok(())
    }
}

impl<H: HashFn> CryptoRng for HashDrbg<H> {}


impl<H: HashFn> Drop for HashDrbg<H> {
    fn drop(&mut self) {
        self.key.zeroize();
        self.pool.zeroize();
        self.counter = 0;
    }
}
