use dudect_bencher::{ctbench_main, BenchRng, Class, CtRunner};
use ntru_ees::apr2011_439; // Could also be apr2011_743 or ees1087ep2.
use ntru_ees::traits::{Decryptor, Encryptor};
use rand_core::{CryptoRng, RngCore};

// Test RNG to regurgitate incremented values when 'asked'
#[derive(Clone)]
#[repr(align(8))]
struct TestRng { value: u32 }

impl RngCore for TestRng {
    fn next_u32(&mut self) -> u32 { unimplemented!() }

    fn next_u64(&mut self) -> u64 { unimplemented!() }

    fn fill_bytes(&mut self, _out: &mut [u8]) { unimplemented!() }

    fn try_fill_bytes(&mut self, out: &mut [u8]) -> Result<(), rand_core::Error> {
        out.iter_mut().for_each(|b| *b = self.value.to_le_bytes()[0]);
        out[0..4].copy_from_slice(&self.value.to_be_bytes());
        self.value = self.value.wrapping_add(1);
        Ok(())
    }
}

impl CryptoRng for TestRng {}


// Left: a valid ciphertext. Right: the same ciphertext with one coefficient nudged, which
// fails only at the final re-encryption comparison.
fn decrypt_valid_vs_tampered(runner: &mut CtRunner, mut _rng: &mut BenchRng) {
    const ITERATIONS_INNER: usize = 5;
    const ITERATIONS_OUTER: usize = 20_000;

    let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    let kp = apr2011_439::try_keygen_from_passphrase(b"dudect", b"salt").unwrap();
    let ct = kp.public_key().try_encrypt_with_rng(&mut TestRng { value: 12 }, &message).unwrap();
    let mut tampered = ct.clone();
    tampered[300] ^= 0x08;

    let mut classes = [Class::Right; ITERATIONS_OUTER];

    // Interleave left and right
    for i in (0..ITERATIONS_OUTER).step_by(2) {
        classes[i] = Class::Left;
    }

    for class in classes {
        let input = match class { Class::Left => &ct, Class::Right => &tampered };
        runner.run_one(class, || {
            for _ in 0..ITERATIONS_INNER {
                let _ = kp.try_decrypt(input);
            }
        })
    }
}

ctbench_main!(decrypt_valid_vs_tampered);
