// Parameter sets: the immutable description of one cryptosystem instance, the table of named
// sets addressable by object identifier, and the 66-byte big-endian parameter stream.

use crate::helpers::{bit_length, ensure, is_prime};
use crate::traits::HashFn;
use crate::types::{Error, HashAlg, PolyType, PrngAlg};


/// Length in bytes of the serialized parameter stream.
pub const PARAMS_STREAM_LEN: usize = 66;


/// Description of a cryptosystem instance. Values are only ever constructed via the named
/// constants, [`ParameterSet::from_oid`], the validated constructors, or the byte stream, so
/// every live instance satisfies [`ParameterSet::validate`]. Derived sizes are computed on
/// demand rather than stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParameterSet {
    n: usize,
    q: i32,
    df: usize,
    df1: usize,
    df2: usize,
    df3: usize,
    db: usize,
    dm0: usize,
    max_m1: usize,
    c_bits: u32,
    min_igf_hash_calls: u32,
    min_mgf_hash_calls: u32,
    hash_seed: bool,
    oid: [u8; 3],
    sparse: bool,
    fast_fp: bool,
    poly_type: PolyType,
    hash_alg: HashAlg,
    prng_alg: PrngAlg,
}


impl ParameterSet {
    // ----- NAMED SETS -----

    /// EES1087EP2: N=1087, simple form, sparse, SHA-512. Object identifier `{0, 6, 3}`.
    pub const EES1087EP2: ParameterSet =
        Self::simple(1087, 2048, 120, 256, 120, 13, 25, 14, [0, 6, 3], true, false, HashAlg::Sha512);

    /// EES1171EP1: N=1171, simple form, sparse, SHA-512. Object identifier `{0, 6, 4}`.
    pub const EES1171EP1: ParameterSet =
        Self::simple(1171, 2048, 106, 256, 106, 13, 20, 15, [0, 6, 4], true, false, HashAlg::Sha512);

    /// EES1499EP1: N=1499, simple form, sparse, SHA-512. Object identifier `{0, 6, 5}`.
    pub const EES1499EP1: ParameterSet =
        Self::simple(1499, 2048, 79, 256, 79, 13, 17, 19, [0, 6, 5], true, false, HashAlg::Sha512);

    /// APR2011_439: N=439, simple form, sparse, SHA-256. Object identifier `{0, 7, 101}`.
    pub const APR2011_439: ParameterSet =
        Self::simple(439, 2048, 146, 128, 130, 9, 32, 9, [0, 7, 101], true, false, HashAlg::Sha256);

    /// APR2011_439_FAST: N=439, product form with `f = 1 + 3t`, SHA-256. Object identifier `{0, 7, 102}`.
    pub const APR2011_439_FAST: ParameterSet =
        Self::product(439, 2048, [9, 8, 5], 128, 130, 9, 32, 9, [0, 7, 102], true, HashAlg::Sha256);

    /// APR2011_743: N=743, simple form, dense, SHA-512. Object identifier `{0, 7, 105}`.
    pub const APR2011_743: ParameterSet =
        Self::simple(743, 2048, 248, 256, 220, 10, 27, 14, [0, 7, 105], false, false, HashAlg::Sha512);

    /// APR2011_743_FAST: N=743, product form with `f = 1 + 3t`, SHA-512. Object identifier `{0, 7, 106}`.
    pub const APR2011_743_FAST: ParameterSet =
        Self::product(743, 2048, [11, 11, 15], 256, 220, 10, 27, 14, [0, 7, 106], false, HashAlg::Sha512);

    const NAMED: [ParameterSet; 7] = [
        Self::EES1087EP2,
        Self::EES1171EP1,
        Self::EES1499EP1,
        Self::APR2011_439,
        Self::APR2011_439_FAST,
        Self::APR2011_743,
        Self::APR2011_743_FAST,
    ];


    #[allow(clippy::too_many_arguments)]
    const fn simple(
        n: usize, q: i32, df: usize, db: usize, dm0: usize, c_bits: u32, min_igf: u32, min_mgf: u32,
        oid: [u8; 3], sparse: bool, fast_fp: bool, hash_alg: HashAlg,
    ) -> Self {
        ParameterSet {
            n,
            q,
            df,
            df1: 0,
            df2: 0,
            df3: 0,
            db,
            dm0,
            max_m1: 0,
            c_bits,
            min_igf_hash_calls: min_igf,
            min_mgf_hash_calls: min_mgf,
            hash_seed: true,
            oid,
            sparse,
            fast_fp,
            poly_type: PolyType::Simple,
            hash_alg,
            prng_alg: PrngAlg::System,
        }
    }


    #[allow(clippy::too_many_arguments)]
    const fn product(
        n: usize, q: i32, df: [usize; 3], db: usize, dm0: usize, c_bits: u32, min_igf: u32,
        min_mgf: u32, oid: [u8; 3], sparse: bool, hash_alg: HashAlg,
    ) -> Self {
        let mut p = Self::simple(n, q, 0, db, dm0, c_bits, min_igf, min_mgf, oid, sparse, true, hash_alg);
        p.df1 = df[0];
        p.df2 = df[1];
        p.df3 = df[2];
        p.poly_type = PolyType::Product;
        p
    }


    // ----- CONSTRUCTION -----

    /// Builds and validates a simple-form parameter set. `max_m1` starts disabled and the PRNG
    /// selector at [`PrngAlg::System`]; see [`ParameterSet::with_max_m1`] and
    /// [`ParameterSet::with_prng`].
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the values fail [`ParameterSet::validate`].
    #[allow(clippy::too_many_arguments)]
    pub fn try_new_simple(
        n: usize, q: i32, df: usize, db: usize, dm0: usize, c_bits: u32, min_igf_hash_calls: u32,
        min_mgf_hash_calls: u32, hash_seed: bool, oid: [u8; 3], sparse: bool, fast_fp: bool,
        hash_alg: HashAlg,
    ) -> Result<Self, Error> {
        let mut p = Self::simple(
            n, q, df, db, dm0, c_bits, min_igf_hash_calls, min_mgf_hash_calls, oid, sparse, fast_fp, hash_alg,
        );
        p.hash_seed = hash_seed;
        p.validate()?;
        Ok(p)
    }


    /// Builds and validates a product-form parameter set with factor weights `df = [df1, df2, df3]`.
    /// Product form always uses `f = 1 + 3t`.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the values fail [`ParameterSet::validate`].
    #[allow(clippy::too_many_arguments)]
    pub fn try_new_product(
        n: usize, q: i32, df: [usize; 3], db: usize, dm0: usize, c_bits: u32, min_igf_hash_calls: u32,
        min_mgf_hash_calls: u32, hash_seed: bool, oid: [u8; 3], sparse: bool, hash_alg: HashAlg,
    ) -> Result<Self, Error> {
        let mut p = Self::product(
            n, q, df, db, dm0, c_bits, min_igf_hash_calls, min_mgf_hash_calls, oid, sparse, hash_alg,
        );
        p.hash_seed = hash_seed;
        p.validate()?;
        Ok(p)
    }


    /// Returns a copy with the coefficient-sum cap set (`0` disables it). When enabled,
    /// encryption resamples whenever `sum(mTrin) > max_m1` and zeroes the constant coefficient.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when `max_m1` exceeds `N`.
    pub fn with_max_m1(self, max_m1: usize) -> Result<Self, Error> {
        let p = ParameterSet { max_m1, ..self };
        p.validate()?;
        Ok(p)
    }


    /// Returns a copy with a different PRNG selector. The selector is recorded in the parameter
    /// stream; generators are always supplied by the caller.
    #[must_use]
    pub const fn with_prng(self, prng_alg: PrngAlg) -> Self { ParameterSet { prng_alg, ..self } }


    /// Looks up a named parameter set by its 3-byte object identifier.
    ///
    /// # Errors
    /// Returns [`Error::Config`] for an unknown identifier.
    pub fn from_oid(oid: &[u8]) -> Result<Self, Error> {
        Self::NAMED
            .iter()
            .find(|p| p.oid[..] == *oid)
            .copied()
            .ok_or(Error::Config("ParameterSet: unknown object identifier"))
    }


    /// Checks every structural constraint the algorithms rely upon.
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the first violated constraint.
    pub fn validate(&self) -> Result<(), Error> {
        let n = self.n;
        ensure!(
            is_prime(n) & (n >= 5) & (n < (1 << 16)),
            Error::Config("ParameterSet: N must be a prime in [5, 2^16)")
        );
        ensure!(
            (self.q >= 4) & (self.q <= 1 << 15) & (self.q.count_ones() == 1),
            Error::Config("ParameterSet: Q must be a power of two in [4, 2^15]")
        );
        ensure!((self.db > 0) & (self.db % 8 == 0), Error::Config("ParameterSet: db must be a positive multiple of 8"));
        match self.poly_type {
            PolyType::Simple => {
                ensure!((self.df >= 1) & (2 * self.df <= n), Error::Config("ParameterSet: df out of range"));
            }
            PolyType::Product => {
                ensure!(
                    [self.df1, self.df2, self.df3].iter().all(|&d| (d >= 1) & (2 * d <= n)),
                    Error::Config("ParameterSet: df1, df2 or df3 out of range")
                );
                // f(1) = 0 for a product-form f = t, so only f = 1 + 3t is invertible mod 3
                ensure!(self.fast_fp, Error::Config("ParameterSet: product form requires fastFp"));
            }
        }
        ensure!(3 * self.dm0 <= n, Error::Config("ParameterSet: dm0 too large"));
        ensure!(self.max_m1 <= n, Error::Config("ParameterSet: maxM1 too large"));
        ensure!(
            (self.c_bits >= 1) & (self.c_bits <= 31) && ((1usize << self.c_bits) >= n),
            Error::Config("ParameterSet: cBits out of range")
        );
        ensure!(
            (self.min_igf_hash_calls >= 1) & (self.min_mgf_hash_calls >= 1),
            Error::Config("ParameterSet: minimum hash call counts must be positive")
        );
        ensure!(
            self.checked_max_msg_len().is_some_and(|len| (1..=255).contains(&len)),
            Error::Config("ParameterSet: N too small for db")
        );
        Ok(())
    }


    /// Confirms the digest engine `H` is the one this set names and is wide enough for the
    /// public-key hash truncation.
    ///
    /// # Errors
    /// Returns [`Error::Config`] on mismatch.
    pub fn check_digest<H: HashFn>(&self) -> Result<(), Error> {
        ensure!(H::ALG == self.hash_alg, Error::Config("ParameterSet: digest does not match the parameter set"));
        ensure!(self.db / 8 <= H::DIGEST_SIZE, Error::Config("ParameterSet: digest too short for db"));
        Ok(())
    }


    // ----- STREAM -----

    /// Serializes to the 66-byte big-endian parameter stream.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)] // validated values are below 2^17
    pub fn to_bytes(&self) -> [u8; PARAMS_STREAM_LEN] {
        let ints = [
            self.n as i32,
            self.q,
            self.df as i32,
            self.df1 as i32,
            self.df2 as i32,
            self.df3 as i32,
            self.db as i32,
            self.dm0 as i32,
            self.max_m1 as i32,
            self.c_bits as i32,
            self.min_igf_hash_calls as i32,
            self.min_mgf_hash_calls as i32,
        ];
        let mut out = [0u8; PARAMS_STREAM_LEN];
        for (chunk, v) in out[0..48].chunks_exact_mut(4).zip(ints) {
            chunk.copy_from_slice(&v.to_be_bytes());
        }
        out[48] = u8::from(self.hash_seed);
        out[49..52].copy_from_slice(&self.oid);
        out[52] = u8::from(self.sparse);
        out[53] = u8::from(self.fast_fp);
        out[54..58].copy_from_slice(&self.poly_type.to_i32().to_be_bytes());
        out[58..62].copy_from_slice(&self.hash_alg.to_i32().to_be_bytes());
        out[62..66].copy_from_slice(&self.prng_alg.to_i32().to_be_bytes());
        out
    }


    /// Parses and validates the 66-byte big-endian parameter stream.
    ///
    /// # Errors
    /// Returns [`Error::Config`] on a wrong length, negative or unknown field values, flags other
    /// than 0/1, or a set that fails [`ParameterSet::validate`].
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        ensure!(bytes.len() == PARAMS_STREAM_LEN, Error::Config("ParameterSet: stream length mismatch"));
        let int_at = |i: usize| i32::from_be_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        let uint_at = |i: usize| {
            usize::try_from(int_at(i)).map_err(|_| Error::Config("ParameterSet: negative field in stream"))
        };
        let u32_at = |i: usize| {
            u32::try_from(int_at(i)).map_err(|_| Error::Config("ParameterSet: negative field in stream"))
        };
        let flag_at = |i: usize| match bytes[i] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(Error::Config("ParameterSet: flag byte must be 0 or 1")),
        };

        let p = ParameterSet {
            n: uint_at(0)?,
            q: int_at(4),
            df: uint_at(8)?,
            df1: uint_at(12)?,
            df2: uint_at(16)?,
            df3: uint_at(20)?,
            db: uint_at(24)?,
            dm0: uint_at(28)?,
            max_m1: uint_at(32)?,
            c_bits: u32_at(36)?,
            min_igf_hash_calls: u32_at(40)?,
            min_mgf_hash_calls: u32_at(44)?,
            hash_seed: flag_at(48)?,
            oid: [bytes[49], bytes[50], bytes[51]],
            sparse: flag_at(52)?,
            fast_fp: flag_at(53)?,
            poly_type: PolyType::try_from_i32(int_at(54))?,
            hash_alg: HashAlg::try_from_i32(int_at(58))?,
            prng_alg: PrngAlg::try_from_i32(int_at(62))?,
        };
        // Each form carries zero for the other form's weights
        match p.poly_type {
            PolyType::Simple => ensure!(
                (p.df1 | p.df2 | p.df3) == 0,
                Error::Config("ParameterSet: product weights set on a simple-form set")
            ),
            PolyType::Product => {
                ensure!(p.df == 0, Error::Config("ParameterSet: df set on a product-form set"));
            }
        }
        p.validate()?;
        Ok(p)
    }


    // ----- FIELDS -----

    /// Ring dimension `N`.
    #[must_use]
    pub const fn n(&self) -> usize { self.n }

    /// Big modulus `Q`.
    #[must_use]
    pub const fn q(&self) -> i32 { self.q }

    /// Bits per coefficient modulo `Q`.
    #[must_use]
    pub const fn log_q(&self) -> usize { self.q.trailing_zeros() as usize }

    /// Simple-form private key weight (`0` for product form).
    #[must_use]
    pub const fn df(&self) -> usize { self.df }

    /// Product-form factor weights (`[0; 3]` for simple form).
    #[must_use]
    pub const fn df_product(&self) -> [usize; 3] { [self.df1, self.df2, self.df3] }

    /// Simple-form blinding weight.
    #[must_use]
    pub const fn dr(&self) -> usize { self.df }

    /// Product-form blinding factor weights.
    #[must_use]
    pub const fn dr_product(&self) -> [usize; 3] { [self.df1, self.df2, self.df3] }

    /// Weight of `g`: `dg` ones and `dg - 1` minus ones.
    #[must_use]
    pub const fn dg(&self) -> usize { self.n / 3 }

    /// Random prefix bits.
    #[must_use]
    pub const fn db(&self) -> usize { self.db }

    /// Minimum count of each of `-1, 0, 1` in a masked message polynomial.
    #[must_use]
    pub const fn dm0(&self) -> usize { self.dm0 }

    /// Coefficient-sum cap (`0` disables).
    #[must_use]
    pub const fn max_m1(&self) -> usize { self.max_m1 }

    /// Bits per IGF candidate.
    #[must_use]
    pub const fn c_bits(&self) -> u32 { self.c_bits }

    /// Digest invocations the IGF always performs.
    #[must_use]
    pub const fn min_igf_hash_calls(&self) -> u32 { self.min_igf_hash_calls }

    /// Digest invocations MGF-TP-1 always performs.
    #[must_use]
    pub const fn min_mgf_hash_calls(&self) -> u32 { self.min_mgf_hash_calls }

    /// Whether MGF-TP-1 hashes its seed before expansion.
    #[must_use]
    pub const fn hash_seed(&self) -> bool { self.hash_seed }

    /// 3-byte object identifier.
    #[must_use]
    pub const fn oid(&self) -> [u8; 3] { self.oid }

    /// Sparse (index list) storage for simple-form private and blinding polynomials.
    #[must_use]
    pub const fn sparse(&self) -> bool { self.sparse }

    /// `f = 1 + 3t`, so `f^-1 mod 3 = 1`.
    #[must_use]
    pub const fn fast_fp(&self) -> bool { self.fast_fp }

    /// Simple or product form.
    #[must_use]
    pub const fn poly_type(&self) -> PolyType { self.poly_type }

    /// Digest this set expects.
    #[must_use]
    pub const fn hash_alg(&self) -> HashAlg { self.hash_alg }

    /// Random generator selector.
    #[must_use]
    pub const fn prng_alg(&self) -> PrngAlg { self.prng_alg }


    // ----- DERIVED -----

    /// Bytes used to carry the plaintext length.
    #[must_use]
    pub const fn llen(&self) -> usize { 1 }

    const fn checked_max_msg_len(&self) -> Option<usize> {
        let cap = (3 * self.n / 2) / 8;
        let overhead = self.llen() + self.db / 8 + 1;
        cap.checked_sub(overhead)
    }

    /// Longest plaintext in bytes.
    #[must_use]
    pub const fn max_msg_len_bytes(&self) -> usize {
        match self.checked_max_msg_len() {
            Some(len) => len,
            None => 0,
        }
    }

    /// Length of the padded message buffer `b || len || m || padding`.
    #[must_use]
    pub const fn buffer_len_bytes(&self) -> usize { self.db / 8 + self.llen() + self.max_msg_len_bytes() + 1 }

    /// Bits of the public-key hash mixed into the blinding seed.
    #[must_use]
    pub const fn pk_len_bits(&self) -> usize { self.db }

    /// Ciphertext length in bytes.
    #[must_use]
    pub const fn ciphertext_len(&self) -> usize { (self.n * self.log_q() + 7) / 8 }

    /// Public key length in bytes (4-byte header plus packed `h`).
    #[must_use]
    pub const fn public_key_len(&self) -> usize { 4 + self.ciphertext_len() }

    /// Bits per index in the sparse (product-form) private-key encoding.
    pub(crate) const fn index_bits(&self) -> usize { bit_length(self.n - 1) }
}
