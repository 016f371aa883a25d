// HashFn implementations for the RustCrypto digest engines.

use crate::traits::HashFn;
use crate::types::HashAlg;
use alloc::vec::Vec;
use sha2::{Digest, Sha256, Sha512};
use sha3::{Sha3_256, Sha3_512};


macro_rules! hash_fn {
    ($hasher:ty, $alg:expr, $block:expr, $digest:expr) => {
        impl HashFn for $hasher {
            const ALG: HashAlg = $alg;
            const BLOCK_SIZE: usize = $block;
            const DIGEST_SIZE: usize = $digest;

            fn update(&mut self, data: &[u8]) { Digest::update(self, data); }

            fn finish(&mut self) -> Vec<u8> { self.finalize_reset().to_vec() }

            fn reset(&mut self) { Digest::reset(self); }

            fn pbkdf2_hmac(password: &[u8], salt: &[u8], rounds: u32, out: &mut [u8]) {
                pbkdf2::pbkdf2_hmac::<$hasher>(password, salt, rounds, out);
            }
        }
    };
}

hash_fn!(Sha256, HashAlg::Sha256, 64, 32);
hash_fn!(Sha512, HashAlg::Sha512, 128, 64);
hash_fn!(Sha3_256, HashAlg::Sha3_256, 136, 32);
hash_fn!(Sha3_512, HashAlg::Sha3_512, 72, 64);


#[cfg(test)]
mod tests {
    use super::*;

    fn incremental_matches<H: HashFn>() {
        let mut h = H::default();
        h.update(b"ab");
        h.update(b"c");
        let d = h.finish();
        assert_eq!(d.len(), H::DIGEST_SIZE);
        assert_eq!(d, H::compute_hash(b"abc"));
        // finish resets
        h.update(b"abc");
        assert_eq!(h.finish(), d);
        h.update(b"junk");
        h.reset();
        assert_eq!(h.finish(), H::compute_hash(b""));
    }

    #[test]
    fn test_incremental() {
        incremental_matches::<Sha256>();
        incremental_matches::<Sha512>();
        incremental_matches::<Sha3_256>();
        incremental_matches::<Sha3_512>();
    }

    // RFC 7914 section 11, first PBKDF2-HMAC-SHA256 vector
    #[test]
    fn test_pbkdf2() {
        let mut out = [0u8; 64];
        Sha256::pbkdf2_hmac(b"passwd", b"salt", 1, &mut out);
        assert_eq!(
            hex::encode(out),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc\
             49ca9cccf179b645991664b39d77ef317c71b845b1e30bd509112041d3a19783"
        );
    }

    #[test]
    fn test_known_answer() {
        assert_eq!(
            hex::encode(Sha256::compute_hash(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            hex::encode(Sha3_256::compute_hash(b"abc")),
            "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"
        );
    }
}
