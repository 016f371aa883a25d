// Deterministic digest-driven sampling: the index generation function (IGF), the
// blinding-polynomial generator built on it, mask generation MGF-TP-1 and the truncated
// public-key hash mixed into every blinding seed.

use crate::conversion::pack_bits;
use crate::params::ParameterSet;
use crate::poly::IntPoly;
use crate::ternary::{ProductForm, SparseTernary, Ternary};
use crate::traits::HashFn;
use crate::types::PolyType;
use alloc::vec::Vec;
use zeroize::Zeroize;


// Appends H(seed || counter) to buf, counter as a big-endian u32
fn append_hash<H: HashFn>(hasher: &mut H, seed: &[u8], counter: &mut u32, buf: &mut Vec<u8>) {
    hasher.update(seed);
    hasher.update(&counter.to_be_bytes());
    let mut digest = hasher.finish();
    buf.extend_from_slice(&digest);
    digest.zeroize();
    *counter += 1;
}


/// Index generation function. Produces a deterministic stream of uniform indices in `[0, N)`
/// from a seed. Construction always performs `minIGFHashCalls` digest invocations, whether or
/// not the output is consumed.
pub(crate) struct IndexGenerator<H: HashFn> {
    seed: Vec<u8>,
    n: usize,
    c_bits: usize,
    limit: u32,
    counter: u32,
    buf: Vec<u8>,
    bit_pos: usize,
    hasher: H,
}

impl<H: HashFn> IndexGenerator<H> {
    pub(crate) fn new(seed: &[u8], params: &ParameterSet) -> Self {
        let c_bits = params.c_bits() as usize;
        let range = 1u32 << c_bits;
        #[allow(clippy::cast_possible_truncation)]
        let n32 = params.n() as u32;
        let mut igf = IndexGenerator {
            seed: seed.to_vec(),
            n: params.n(),
            c_bits,
            limit: range - range % n32,
            counter: 0,
            buf: Vec::new(),
            bit_pos: 0,
            hasher: H::default(),
        };
        while igf.counter < params.min_igf_hash_calls() {
            append_hash(&mut igf.hasher, &igf.seed, &mut igf.counter, &mut igf.buf);
        }
        igf
    }

    /// Next index. Candidates are read `cBits` at a time, most significant bit first; values
    /// at or above the largest multiple of `N` below `2^cBits` are rejected and the rest are
    /// reduced mod `N`.
    pub(crate) fn next_index(&mut self) -> usize {
        loop {
            while self.buf.len() * 8 - self.bit_pos < self.c_bits {
                append_hash(&mut self.hasher, &self.seed, &mut self.counter, &mut self.buf);
            }
            let mut candidate = 0u32;
            for _j in 0..self.c_bits {
                let bit = (self.buf[self.bit_pos / 8] >> (7 - self.bit_pos % 8)) & 1;
                candidate = (candidate << 1) | u32::from(bit);
                self.bit_pos += 1;
            }
            if candidate < self.limit {
                return candidate as usize % self.n;
            }
        }
    }
}

impl<H: HashFn> Drop for IndexGenerator<H> {
    fn drop(&mut self) {
        self.seed.zeroize();
        self.buf.zeroize();
        self.hasher.reset();
    }
}


// Places num_neg_ones coefficients -1 then num_ones coefficients +1, skipping occupied slots
fn igf_ternary<H: HashFn>(igf: &mut IndexGenerator<H>, n: usize, num_ones: usize, num_neg_ones: usize) -> IntPoly {
    let mut p = IntPoly::zero(n);
    for (count, value) in [(num_neg_ones, -1), (num_ones, 1)] {
        let mut placed = 0;
        while placed < count {
            let i = igf.next_index();
            if p.coeffs[i] == 0 {
                p.coeffs[i] = value;
                placed += 1;
            }
        }
    }
    p
}


/// Builds the blinding polynomial `r` from `seed` using one IGF stream: `dr` ones and `dr`
/// minus ones in simple form, or three sparse factors of weights `dr1, dr2, dr3` in product
/// form. Identical seeds give identical polynomials.
pub(crate) fn generate_blinding_poly<H: HashFn>(seed: &[u8], params: &ParameterSet) -> Ternary {
    let n = params.n();
    let mut igf = IndexGenerator::<H>::new(seed, params);
    match params.poly_type() {
        PolyType::Simple => {
            let r = igf_ternary(&mut igf, n, params.dr(), params.dr());
            Ternary::from_int_poly(r, params.sparse())
        }
        PolyType::Product => {
            let [dr1, dr2, dr3] = params.dr_product();
            let mut factor = |d: usize| SparseTernary::from_int_poly(&igf_ternary(&mut igf, n, d, d));
            let f1 = factor(dr1);
            let f2 = factor(dr2);
            let f3 = factor(dr3);
            Ternary::Product(ProductForm { f1, f2, f3 })
        }
    }
}


/// MGF-TP-1: expands `seed` into a length-`N` polynomial with coefficients in `{-1, 0, 1}`.
/// `Z = H(seed)` when `hashSeed` is set, else `Z = seed`. `minMGFHashCalls` digests of
/// `Z || counter` are always computed; each byte below 243 then yields five base-3 digits
/// (digit 2 maps to -1) and bytes of 243 or more are skipped.
pub(crate) fn mgf_tp_1<H: HashFn>(seed: &[u8], params: &ParameterSet) -> IntPoly {
    let n = params.n();
    let mut z = if params.hash_seed() { H::compute_hash(seed) } else { seed.to_vec() };
    let mut hasher = H::default();
    let mut counter = 0u32;
    let mut buf = Vec::new();
    while counter < params.min_mgf_hash_calls() {
        append_hash(&mut hasher, &z, &mut counter, &mut buf);
    }

    let mut coeffs = Vec::with_capacity(n + 4);
    let mut pos = 0;
    while coeffs.len() < n {
        if pos == buf.len() {
            append_hash(&mut hasher, &z, &mut counter, &mut buf);
        }
        let mut o = buf[pos];
        pos += 1;
        if o >= 243 {
            continue;
        }
        for _j in 0..5 {
            let digit = i32::from(o % 3);
            coeffs.push(if digit == 2 { -1 } else { digit });
            o /= 3;
        }
    }
    coeffs.truncate(n);
    z.zeroize();
    buf.zeroize();
    IntPoly::from_coeffs(coeffs)
}


/// First `db/8` bytes of `H(packed h)`, mixed into every blinding seed.
pub(crate) fn public_key_hash<H: HashFn>(h: &IntPoly, params: &ParameterSet) -> Vec<u8> {
    let mut digest = H::compute_hash(&pack_bits(&h.coeffs, params.log_q()));
    digest.truncate(params.pk_len_bits() / 8);
    digest
}
