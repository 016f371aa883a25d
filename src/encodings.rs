// Key and ciphertext byte encodings. All multi-byte integers are big-endian.
//
// Public key:  u16 N || u16 Q || h packed at log2(Q) bits per coefficient
// Private key: u16 N || u16 Q || flags || t, where flags bit 0 = sparse, bit 1 = fastFp and
//              bit 2 = product form; t is three sparse factors (product form) or tight trits
// Sparse:      u16 #ones || u16 #minus-ones || indices packed at bitlen(N - 1) bits each
// Ciphertext:  e packed at log2(Q) bits per coefficient

use crate::conversion::{decode_trits, encode_trits, pack_bits, unpack_bits};
use crate::helpers::ensure;
use crate::inverse::invert_f3;
use crate::params::ParameterSet;
use crate::poly::IntPoly;
use crate::ternary::{ProductForm, SparseTernary, Ternary, TernaryPolynomial};
use crate::types::{Error, PolyType};
use alloc::vec::Vec;
use zeroize::Zeroize;


const HEADER_LEN: usize = 4;


#[allow(clippy::cast_possible_truncation)] // validated: N < 2^16, Q <= 2^15
fn header(params: &ParameterSet) -> [u8; HEADER_LEN] {
    let mut out = [0u8; HEADER_LEN];
    out[0..2].copy_from_slice(&(params.n() as u16).to_be_bytes());
    out[2..4].copy_from_slice(&(params.q() as u16).to_be_bytes());
    out
}


fn check_header(params: &ParameterSet, bytes: &[u8]) -> Result<(), Error> {
    ensure!(bytes.len() >= HEADER_LEN, Error::KeyFormat("Key decode: too short"));
    ensure!(bytes[0..HEADER_LEN] == header(params), Error::KeyFormat("Key decode: N or Q mismatch"));
    Ok(())
}


fn flags(params: &ParameterSet) -> u8 {
    let product = params.poly_type() == PolyType::Product;
    u8::from(params.sparse()) | (u8::from(params.fast_fp()) << 1) | (u8::from(product) << 2)
}


/// Encodes the public polynomial `h`.
pub(crate) fn pk_encode(params: &ParameterSet, h: &IntPoly) -> Vec<u8> {
    debug_assert_eq!(h.n(), params.n(), "pk_encode: length mismatch");
    let mut out = Vec::with_capacity(params.public_key_len());
    out.extend_from_slice(&header(params));
    out.extend_from_slice(&pack_bits(&h.coeffs, params.log_q()));
    out
}


/// Decodes a public polynomial, checking the header against `params`.
///
/// # Errors
/// Returns [`Error::KeyFormat`] on a header mismatch, wrong length or nonzero padding.
pub(crate) fn pk_decode(params: &ParameterSet, bytes: &[u8]) -> Result<IntPoly, Error> {
    check_header(params, bytes)?;
    ensure!(bytes.len() == params.public_key_len(), Error::KeyFormat("pk_decode: length mismatch"));
    let coeffs = unpack_bits(&bytes[HEADER_LEN..], params.n(), params.log_q())?;
    Ok(IntPoly::from_coeffs(coeffs))
}


fn sparse_encode(s: &SparseTernary, index_bits: usize, out: &mut Vec<u8>) {
    #[allow(clippy::cast_possible_truncation)] // counts are at most N < 2^16
    {
        out.extend_from_slice(&(s.ones().len() as u16).to_be_bytes());
        out.extend_from_slice(&(s.neg_ones().len() as u16).to_be_bytes());
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let mut indices: Vec<i32> = s.ones().iter().chain(s.neg_ones()).map(|&i| i as i32).collect();
    let mut packed = pack_bits(&indices, index_bits);
    out.extend_from_slice(&packed);
    indices.zeroize();
    packed.zeroize();
}


// Decodes one sparse factor from the front of `bytes`, returning it and the bytes consumed
fn sparse_decode(params: &ParameterSet, bytes: &[u8], weight: usize) -> Result<(SparseTernary, usize), Error> {
    ensure!(bytes.len() >= 4, Error::KeyFormat("sk_decode: truncated factor"));
    let num_ones = usize::from(u16::from_be_bytes([bytes[0], bytes[1]]));
    let num_neg_ones = usize::from(u16::from_be_bytes([bytes[2], bytes[3]]));
    ensure!((num_ones == weight) & (num_neg_ones == weight), Error::KeyFormat("sk_decode: factor weight mismatch"));
    let bits = params.index_bits();
    let len = ((num_ones + num_neg_ones) * bits + 7) / 8;
    ensure!(bytes.len() >= 4 + len, Error::KeyFormat("sk_decode: truncated factor"));
    let mut indices = unpack_bits(&bytes[4..4 + len], num_ones + num_neg_ones, bits)?;
    #[allow(clippy::cast_sign_loss)]
    let (ones, neg_ones) = {
        let all: Vec<usize> = indices.iter().map(|&i| i as usize).collect();
        let (a, b) = all.split_at(num_ones);
        (a.to_vec(), b.to_vec())
    };
    indices.zeroize();
    let s = SparseTernary::try_from_indices(params.n(), ones, neg_ones)?;
    Ok((s, 4 + len))
}


/// Encodes the private polynomial `t`. `fp` is not stored; it is recomputed on decode.
pub(crate) fn sk_encode(params: &ParameterSet, t: &Ternary) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&header(params));
    out.push(flags(params));
    match t {
        Ternary::Product(p) => {
            for f in [&p.f1, &p.f2, &p.f3] {
                sparse_encode(f, params.index_bits(), &mut out);
            }
        }
        Ternary::Dense(_) | Ternary::Sparse(_) => {
            let mut coeffs = t.to_int_poly();
            out.extend_from_slice(&encode_trits(&coeffs.coeffs));
            coeffs.zeroize();
        }
    }
    out
}


/// Decodes the private polynomial `t` and recomputes `fp` (the constant `1` under `fastFp`).
///
/// # Errors
/// Returns [`Error::KeyFormat`] on a header or flags mismatch, malformed body, weights that do
/// not match `params`, or a `t` that is not invertible mod 3.
pub(crate) fn sk_decode(params: &ParameterSet, bytes: &[u8]) -> Result<(Ternary, IntPoly), Error> {
    check_header(params, bytes)?;
    ensure!(bytes.len() > HEADER_LEN, Error::KeyFormat("sk_decode: too short"));
    ensure!(bytes[HEADER_LEN] == flags(params), Error::KeyFormat("sk_decode: flags mismatch"));
    let body = &bytes[HEADER_LEN + 1..];
    let n = params.n();

    let t = match params.poly_type() {
        PolyType::Product => {
            let [d1, d2, d3] = params.df_product();
            let (f1, used1) = sparse_decode(params, body, d1)?;
            let (f2, used2) = sparse_decode(params, &body[used1..], d2)?;
            let (f3, used3) = sparse_decode(params, &body[used1 + used2..], d3)?;
            ensure!(used1 + used2 + used3 == body.len(), Error::KeyFormat("sk_decode: trailing bytes"));
            Ternary::Product(ProductForm { f1, f2, f3 })
        }
        PolyType::Simple => {
            let coeffs = decode_trits(body, n)?;
            let t = IntPoly::from_coeffs(coeffs);
            let neg = if params.fast_fp() { params.df() } else { params.df() - 1 };
            ensure!(
                (t.count(1) == params.df()) & (t.count(-1) == neg),
                Error::KeyFormat("sk_decode: weight mismatch")
            );
            Ternary::from_int_poly(t, params.sparse())
        }
    };

    let fp = if params.fast_fp() {
        IntPoly::one(n)
    } else {
        invert_f3(&t.to_int_poly()).ok_or(Error::KeyFormat("sk_decode: private key not invertible"))?
    };
    Ok((t, fp))
}


/// Packs a ciphertext polynomial (coefficients in `[0, Q)`).
pub(crate) fn ct_encode(params: &ParameterSet, e: &IntPoly) -> Vec<u8> { pack_bits(&e.coeffs, params.log_q()) }


/// Unpacks a ciphertext polynomial.
///
/// # Errors
/// Returns [`Error::Decryption`] on a wrong length or nonzero padding.
pub(crate) fn ct_decode(params: &ParameterSet, bytes: &[u8]) -> Result<IntPoly, Error> {
    let coeffs = unpack_bits(bytes, params.n(), params.log_q()).map_err(|_| Error::Decryption)?;
    Ok(IntPoly::from_coeffs(coeffs))
}
