#![no_main]

use libfuzzer_sys::fuzz_target;
use ntru_ees::apr2011_439;
use ntru_ees::traits::{Decryptor, Encryptor, SerDes};

// sk_len (sparse simple form) + ct_len + pk_len = 93 + 604 + 608
fuzz_target!(|data: [u8; 93 + 604 + 608]| {

    // Deserialize a 'fuzzy' private key; almost all are rejected on weights
    let sk = apr2011_439::PrivateKey::try_from_bytes(&apr2011_439::PARAMS, &data[0..93]);
    let kp = apr2011_439::try_keygen_from_passphrase(b"fuzz", b"salt").unwrap(); // Get a good key pair
    if let Ok(sk) = sk {
        if let Ok(kp2) = apr2011_439::KeyPair::try_from_parts(kp.public_key().clone(), sk) {
            let _m = kp2.try_decrypt(&data[93..93 + 604]);
        }
    }

    // Decrypt a 'fuzzy' ciphertext; must fail without panicking
    assert!(kp.try_decrypt(&data[93..93 + 604]).is_err());

    // Deserialize a 'fuzzy' public key (a decent proportion of headers will be patched OK)
    let mut pk_bytes = data[93 + 604..].to_vec();
    pk_bytes[0..4].copy_from_slice(&[0x01, 0xb7, 0x08, 0x00]);
    let last = pk_bytes.len() - 1;
    pk_bytes[last] &= 0x1f;
    if let Ok(pk) = apr2011_439::public_key_from_bytes(&pk_bytes) {
        let _ct = pk.try_encrypt(&[0u8, 1, 2, 3]);
    }
});
