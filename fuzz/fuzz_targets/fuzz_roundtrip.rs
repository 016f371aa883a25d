#![no_main]
use libfuzzer_sys::fuzz_target;
use ntru_ees::traits::{Decryptor, Encryptor, KeyGen};
use ntru_ees::{apr2011_439, apr2011_439_fast, apr2011_743};
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;


// Helper function to test a specific key pair
fn fuzz_roundtrip_for_kp<K, E>(data: &[u8], kp: &K, max_len: usize, encrypt: E)
where
    K: Decryptor,
    E: Fn(&mut ChaCha8Rng, &[u8]) -> Vec<u8>,
{
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(data[0]));
    let msg = &data[1..data.len().min(max_len + 1)];
    let ct = encrypt(&mut rng, msg);

    // Valid ciphertext should decrypt
    assert_eq!(kp.try_decrypt(&ct).unwrap(), msg);

    // Modified ciphertext should not decrypt
    let mut modified = ct.clone();
    let i = usize::from(data[0]) % modified.len();
    modified[i] ^= 1;
    assert!(kp.try_decrypt(&modified).is_err());
}


fuzz_target!(|data: &[u8]| {
    // Skip empty inputs
    if data.is_empty() {
        return;
    }

    // Generate static key pairs (for speed)
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let kp439 = apr2011_439::KG::try_keygen_with_rng(&mut rng).unwrap();
    let kp439f = apr2011_439_fast::KG::try_keygen_with_rng(&mut rng).unwrap();
    let kp743 = apr2011_743::KG::try_keygen_with_rng(&mut rng).unwrap();

    fuzz_roundtrip_for_kp(data, &kp439, apr2011_439::MAX_MSG_LEN, |r, m| {
        kp439.public_key().try_encrypt_with_rng(r, m).unwrap()
    });
    fuzz_roundtrip_for_kp(data, &kp439f, apr2011_439_fast::MAX_MSG_LEN, |r, m| {
        kp439f.public_key().try_encrypt_with_rng(r, m).unwrap()
    });
    fuzz_roundtrip_for_kp(data, &kp743, apr2011_743::MAX_MSG_LEN, |r, m| {
        kp743.public_key().try_encrypt_with_rng(r, m).unwrap()
    });
});
