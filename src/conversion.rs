// Bit and trit packing: fixed-width positive coefficient packing (ciphertexts, public keys,
// the 2-bit mask seed, sparse indices), tight base-3 trit packing (private keys), and the
// 3-bits-to-2-trits sves packing of the padded message buffer.

use crate::helpers::ensure;
use crate::types::Error;
use alloc::vec;
use alloc::vec::Vec;


/// Packs each value into `bits` bits, least significant bit first, into `ceil(len*bits/8)`
/// bytes. Trailing padding bits of the final byte are zero. Inputs must lie in `[0, 2^bits)`.
pub(crate) fn pack_bits(w: &[i32], bits: usize) -> Vec<u8> {
    debug_assert!((1..=16).contains(&bits), "pack_bits: bits out of range");
    debug_assert!(crate::helpers::is_in_range(w, 0, (1 << bits) - 1), "pack_bits: w out of range");

    let mut bytes_out = vec![0u8; (w.len() * bits + 7) / 8];
    let mut temp = 0u32; // New values enter at the MSB side, bytes leave from the LSB side
    let mut byte_index = 0;
    let mut bit_index = 0; // Number of bits accumulated in temp

    #[allow(clippy::cast_sign_loss)]
    for &coeff in w {
        temp |= (coeff as u32) << bit_index;
        bit_index += bits;
        while bit_index > 7 {
            bytes_out[byte_index] = temp.to_le_bytes()[0];
            temp >>= 8;
            byte_index += 1;
            bit_index -= 8;
        }
    }
    if bit_index > 0 {
        bytes_out[byte_index] = temp.to_le_bytes()[0];
    }
    bytes_out
}


/// Reverses [`pack_bits`], producing exactly `len` values in `[0, 2^bits)`. Takes untrusted
/// input, so the byte length must be exact and any trailing padding bits must be zero.
///
/// # Errors
/// Returns an error on a length mismatch or nonzero padding.
pub(crate) fn unpack_bits(v: &[u8], len: usize, bits: usize) -> Result<Vec<i32>, Error> {
    debug_assert!((1..=16).contains(&bits), "unpack_bits: bits out of range");
    ensure!(v.len() == (len * bits + 7) / 8, Error::KeyFormat("unpack_bits: length mismatch"));

    let mut w_out = Vec::with_capacity(len);
    let mut temp = 0u32;
    let mut bit_index = 0;
    let mask = (1u32 << bits) - 1;

    for &byte in v {
        temp |= u32::from(byte) << bit_index;
        bit_index += 8;
        while (bit_index >= bits) & (w_out.len() < len) {
            #[allow(clippy::cast_possible_wrap)] // at most 16 bits
            w_out.push((temp & mask) as i32);
            temp >>= bits;
            bit_index -= bits;
        }
    }
    ensure!(temp == 0, Error::KeyFormat("unpack_bits: nonzero padding"));
    Ok(w_out)
}


/// Packs ternary coefficients five per byte in base 3 (first coefficient least significant),
/// with `-1` stored as digit `2`.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub(crate) fn encode_trits(w: &[i32]) -> Vec<u8> {
    debug_assert!(crate::helpers::is_in_range(w, 1, 1), "encode_trits: not ternary");
    w.chunks(5)
        .map(|chunk| chunk.iter().rev().fold(0u8, |acc, &t| acc * 3 + t.rem_euclid(3) as u8))
        .collect()
}


/// Reverses [`encode_trits`], producing `len` coefficients in `{-1, 0, 1}`.
///
/// # Errors
/// Returns an error on a length mismatch, a byte of 243 or more, or nonzero trailing trits.
pub(crate) fn decode_trits(v: &[u8], len: usize) -> Result<Vec<i32>, Error> {
    ensure!(v.len() == (len + 4) / 5, Error::KeyFormat("decode_trits: length mismatch"));
    let mut w_out = Vec::with_capacity(v.len() * 5);
    for &byte in v {
        ensure!(byte < 243, Error::KeyFormat("decode_trits: byte out of range"));
        let mut b = byte;
        for _j in 0..5 {
            let digit = i32::from(b % 3);
            w_out.push(if digit == 2 { -1 } else { digit });
            b /= 3;
        }
    }
    ensure!(w_out[len..].iter().all(|&t| t == 0), Error::KeyFormat("decode_trits: nonzero padding"));
    w_out.truncate(len);
    Ok(w_out)
}


// Index is the 3-bit value b1*4 + b2*2 + b3; the pair (-1, -1) has no code
const SVES_PAIRS: [(i32, i32); 8] = [(0, 0), (0, 1), (0, -1), (1, 0), (1, 1), (1, -1), (-1, 0), (-1, 1)];


/// Encodes bytes into `num_trits` ternary coefficients, three bits per pair of trits. Bits are
/// read least significant first within each byte; bits past the end of `v` read as zero.
pub(crate) fn encode_sves(v: &[u8], num_trits: usize) -> Vec<i32> {
    debug_assert!(num_trits % 2 == 0, "encode_sves: odd trit count");
    let bit = |i: usize| v.get(i / 8).map_or(0, |&b| usize::from((b >> (i % 8)) & 1));
    let mut w_out = vec![0i32; num_trits];
    for (p, pair) in w_out.chunks_exact_mut(2).enumerate() {
        let index = bit(3 * p) * 4 + bit(3 * p + 1) * 2 + bit(3 * p + 2);
        (pair[0], pair[1]) = SVES_PAIRS[index];
    }
    w_out
}


/// Reverses [`encode_sves`], producing `ceil(3 * len / 16)` bytes from `len` trits.
///
/// # Errors
/// Returns an error on the illegal pair `(-1, -1)`.
pub(crate) fn decode_sves(w: &[i32]) -> Result<Vec<u8>, Error> {
    debug_assert!(w.len() % 2 == 0, "decode_sves: odd trit count");
    let num_bits = 3 * (w.len() / 2);
    let mut bytes_out = vec![0u8; (num_bits + 7) / 8];
    for (p, pair) in w.chunks_exact(2).enumerate() {
        let code = 3 * pair[0].rem_euclid(3) + pair[1].rem_euclid(3);
        ensure!(code < 8, Error::Decryption);
        for (j, shift) in [2, 1, 0].iter().enumerate() {
            let i = 3 * p + j;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let b = ((code >> shift) & 1) as u8;
            bytes_out[i / 8] |= b << (i % 8);
        }
    }
    Ok(bytes_out)
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, RngCore};

    #[test]
    fn test_pack_bits_roundtrip() {
        let mut rng = rand::thread_rng();
        for bits in [1usize, 2, 9, 11, 16] {
            for len in [1usize, 7, 439, 743] {
                let w: Vec<i32> = (0..len).map(|_| rng.gen_range(0..(1 << bits))).collect();
                let packed = pack_bits(&w, bits);
                assert_eq!(packed.len(), (len * bits + 7) / 8);
                assert_eq!(unpack_bits(&packed, len, bits).unwrap(), w);
            }
        }
    }

    #[test]
    fn test_pack_bits_known() {
        assert_eq!(pack_bits(&[1, 2, 3, 0], 2), vec![0b0011_1001]);
        assert_eq!(pack_bits(&[0x7FF, 1], 11), vec![0xFF, 0x0F, 0x00]);
    }

    #[test]
    fn test_unpack_bits_validation() {
        // 439 * 11 bits leaves 3 padding bits in the final byte
        let mut packed = pack_bits(&[5; 439], 11);
        assert!(unpack_bits(&packed, 439, 11).is_ok());
        assert!(unpack_bits(&packed[1..], 439, 11).is_err());
        let last = packed.len() - 1;
        packed[last] |= 0x80;
        assert!(unpack_bits(&packed, 439, 11).is_err());
    }

    #[test]
    fn test_trits() {
        let mut rng = rand::thread_rng();
        for len in [1usize, 5, 439, 743] {
            let w: Vec<i32> = (0..len).map(|_| rng.gen_range(-1..=1)).collect();
            let packed = encode_trits(&w);
            assert_eq!(packed.len(), (len + 4) / 5);
            assert!(packed.iter().all(|&b| b < 243));
            assert_eq!(decode_trits(&packed, len).unwrap(), w);
        }
        assert_eq!(encode_trits(&[1, -1, 0, 0, 1]), vec![1 + 2 * 3 + 81]);
        assert!(decode_trits(&[243], 5).is_err());
        assert!(decode_trits(&[0, 0], 5).is_err());
        // Second trit set on a one-trit polynomial
        assert!(decode_trits(&[3], 1).is_err());
    }

    #[test]
    fn test_sves() {
        let mut bytes = [0u8; 82];
        rand::thread_rng().fill_bytes(&mut bytes);
        let trits = encode_sves(&bytes, 438);
        assert!(trits.chunks_exact(2).all(|p| (p[0], p[1]) != (-1, -1)));
        let decoded = decode_sves(&trits).unwrap();
        // 219 pairs carry 657 bits: the 82 bytes plus one zero bit
        assert_eq!(decoded.len(), 83);
        assert_eq!(&decoded[..82], &bytes[..]);
        assert_eq!(decoded[82], 0);

        // First byte 0b0000_0101: bits 1,0,1 -> index 5 -> (1, -1); then 0,0,0 -> (0, 0)
        assert_eq!(&encode_sves(&[0b0000_0101], 4), &[1, -1, 0, 0]);
        assert!(decode_sves(&[-1, -1, 0, 0]).is_err());
        assert!(decode_sves(&[2, 2]).is_err());
    }
}
