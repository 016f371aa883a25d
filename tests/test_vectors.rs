// This file checks the named parameter sets and the deterministic generator against
// independently computed values in tests/test_vectors/vectors.json.

use hex::decode;
use ntru_ees::apr2011_439;
use ntru_ees::prng::HashDrbg;
use ntru_ees::traits::{Decryptor, Encryptor};
use ntru_ees::{CryptoRng, ParameterSet, RngCore, Sha256, PARAMS_STREAM_LEN};
use serde_json::Value;
use std::fs;


// ----- CUSTOM RNG TO REPLAY VALUES -----

struct MyRng {
    data: Vec<Vec<u8>>,
}

impl RngCore for MyRng {
    fn next_u32(&mut self) -> u32 { unimplemented!() }

    fn next_u64(&mut self) -> u64 { unimplemented!() }

    fn fill_bytes(&mut self, out: &mut [u8]) {
        let x = self.data.pop().expect("test rng problem");
        out.copy_from_slice(&x)
    }

    fn try_fill_bytes(&mut self, out: &mut [u8]) -> Result<(), ntru_ees::RngError> {
        self.fill_bytes(out);
        Ok(())
    }
}

impl CryptoRng for MyRng {}

impl MyRng {
    fn new() -> Self { MyRng { data: Vec::new() } }

    fn push(&mut self, new_data: &[u8]) {
        let x = new_data.to_vec();
        self.data.push(x);
    }
}


fn load() -> Value {
    let data = fs::read_to_string("./tests/test_vectors/vectors.json").expect("Unable to read file");
    serde_json::from_str(&data).expect("Unable to parse json")
}


fn named(name: &str) -> ParameterSet {
    match name {
        "ees1087ep2" => ParameterSet::EES1087EP2,
        "ees1171ep1" => ParameterSet::EES1171EP1,
        "ees1499ep1" => ParameterSet::EES1499EP1,
        "apr2011_439" => ParameterSet::APR2011_439,
        "apr2011_439_fast" => ParameterSet::APR2011_439_FAST,
        "apr2011_743" => ParameterSet::APR2011_743,
        "apr2011_743_fast" => ParameterSet::APR2011_743_FAST,
        _ => panic!("unknown parameter set {name}"),
    }
}


#[test]
fn test_parameter_sets() {
    let v = load();
    let sets = v["parameter_sets"].as_array().unwrap();
    assert_eq!(sets.len(), 7);
    for set in sets {
        let params = named(set["name"].as_str().unwrap());
        assert_eq!(params.n() as u64, set["n"].as_u64().unwrap());
        assert_eq!(i64::from(params.q()), set["q"].as_i64().unwrap());
        assert_eq!(params.max_msg_len_bytes() as u64, set["max_msg_len"].as_u64().unwrap());
        assert_eq!(params.ciphertext_len() as u64, set["ct_len"].as_u64().unwrap());
        assert_eq!(params.public_key_len() as u64, set["pk_len"].as_u64().unwrap());

        let oid = decode(set["oid"].as_str().unwrap()).unwrap();
        assert_eq!(params.oid()[..], oid[..]);
        assert_eq!(ParameterSet::from_oid(&oid).unwrap(), params);

        let stream = decode(set["stream"].as_str().unwrap()).unwrap();
        assert_eq!(stream.len(), PARAMS_STREAM_LEN);
        assert_eq!(params.to_bytes()[..], stream[..]);
        assert_eq!(ParameterSet::try_from_bytes(&stream).unwrap(), params);
    }
}


#[test]
fn test_parameter_stream_rejects() {
    let v = load();
    let stream = decode(v["parameter_sets"][3]["stream"].as_str().unwrap()).unwrap();
    assert!(ParameterSet::try_from_bytes(&stream[..65]).is_err());

    // N = 440 is not prime
    let mut bad = stream.clone();
    bad[3] = 0xb8;
    assert!(ParameterSet::try_from_bytes(&bad).is_err());

    // hashSeed flag must be 0 or 1
    let mut bad = stream.clone();
    bad[48] = 2;
    assert!(ParameterSet::try_from_bytes(&bad).is_err());

    // unknown digest selector
    let mut bad = stream;
    bad[61] = 9;
    assert!(ParameterSet::try_from_bytes(&bad).is_err());
}


#[test]
fn test_hash_drbg_passphrase() {
    let v = load();
    let drbg = &v["hash_drbg_sha256"];
    let passphrase = decode(drbg["passphrase"].as_str().unwrap()).unwrap();
    let salt = decode(drbg["salt"].as_str().unwrap()).unwrap();
    let expected = decode(drbg["output"].as_str().unwrap()).unwrap();

    let mut rng = HashDrbg::<Sha256>::from_passphrase(&passphrase, &salt);
    let mut out = vec![0u8; expected.len()];
    rng.fill_bytes(&mut out[..7]);
    rng.fill_bytes(&mut out[7..]);
    assert_eq!(out, expected);
}


// With the random prefix b fixed, encryption is a pure function of the key and message
#[test]
fn test_encrypt_replayed_prefix() {
    let kp = apr2011_439::try_keygen_from_passphrase(b"vectors", b"salt").unwrap();
    let encrypt_once = |b: &[u8]| {
        let mut rng = MyRng::new();
        rng.push(b);
        kp.public_key().try_encrypt_with_max_attempts(&mut rng, b"replay", 1)
    };

    // Some prefixes are rejected by the dm0 check; collect the first few that are not
    let mut accepted = Vec::new();
    for k in 0u8..64 {
        let b = [k; 16];
        if let Ok(ct) = encrypt_once(&b) {
            assert_eq!(encrypt_once(&b).unwrap(), ct);
            assert_eq!(kp.try_decrypt(&ct).unwrap(), b"replay");
            accepted.push(ct);
        }
    }
    assert!(accepted.len() > 1);
    assert_ne!(accepted[0], accepted[1]);
}
