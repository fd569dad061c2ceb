//! Scalar arithmetic modulo the secp256k1 group order.
//!
//! Scalars are integers modulo
//!
//! ```text
//! n = FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141
//! ```
//!
//! used as secret keys, nonces, challenges and multiplication inputs.
//!
//! ## Representation
//!
//! Four unsigned 64-bit limbs, least significant first. Unlike field
//! elements, scalars are kept **canonical at all times**: every
//! constructor and every arithmetic operation fully reduces its result
//! modulo `n`. There is no magnitude tracking.
//!
//! ## Implemented operations
//!
//! - 32-byte big-endian encoding and decoding with overflow reporting
//! - Addition, negation, multiplication, conditional negation
//! - Constant-time inversion (Fermat ladder over the fixed exponent
//!   `n − 2`)
//! - Bit-window extraction for w-NAF recoding
//! - The GLV decomposition `k = k₁ + k₂·λ` used by variable-base
//!   multiplication
//!
//! ## Security properties
//!
//! All operations are constant-time with respect to scalar values except
//! the explicitly `_var`-suffixed helpers, which are reserved for public
//! inputs. Reductions use branch-free masked additions of `2²⁵⁶ − n`.

use zeroize::Zeroize;

/// The group order `n`, least significant limb first.
const N: [u64; 4] = [
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// `⌊n / 2⌋`, for the low-S check.
const N_HALF: [u64; 4] = [
    0xDFE9_2F46_681B_20A0,
    0x5D57_6E73_57A4_501D,
    0xFFFF_FFFF_FFFF_FFFF,
    0x7FFF_FFFF_FFFF_FFFF,
];

/// `2²⁵⁶ − n`, the folding constant for reductions (129 bits).
const NC: [u64; 3] = [0x402D_A173_2FC9_BEBF, 0x4551_2319_50B7_5FC4, 1];

/// A scalar modulo the secp256k1 group order, always canonical.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scalar {
    d: [u64; 4],
}

impl Scalar {
    /// The scalar zero.
    pub const ZERO: Self = Scalar { d: [0; 4] };

    /// The scalar one.
    pub const ONE: Self = Scalar { d: [1, 0, 0, 0] };

    /// Builds a scalar from four 64-bit words, most significant first.
    ///
    /// For constants only; the value must be below `n`.
    pub const fn from_words(w: [u64; 4]) -> Self {
        Scalar { d: [w[3], w[2], w[1], w[0]] }
    }

    /// Builds a scalar from a small unsigned integer.
    pub fn from_u64(v: u64) -> Self {
        Scalar { d: [v, 0, 0, 0] }
    }

    fn check_overflow(&self) -> bool {
        let d = &self.d;
        let mut yes = false;
        let mut no = false;
        no |= d[3] < N[3];
        no |= d[2] < N[2];
        yes |= (d[2] > N[2]) & !no;
        no |= d[1] < N[1];
        yes |= (d[1] > N[1]) & !no;
        yes |= (d[0] >= N[0]) & !no;
        yes
    }

    /// Adds `overflow · (2²⁵⁶ − n)` without branching; used to complete
    /// reductions.
    fn reduce(&mut self, overflow: bool) {
        let o = overflow as u128;
        let mut t = self.d[0] as u128 + o * NC[0] as u128;
        self.d[0] = t as u64;
        t >>= 64;
        t += self.d[1] as u128 + o * NC[1] as u128;
        self.d[1] = t as u64;
        t >>= 64;
        t += self.d[2] as u128 + o * NC[2] as u128;
        self.d[2] = t as u64;
        t >>= 64;
        t += self.d[3] as u128;
        self.d[3] = t as u64;
    }

    /// Decodes a 32-byte big-endian integer, reducing it modulo `n`.
    ///
    /// Returns `true` when the input was not canonical (≥ n). The stored
    /// value is reduced either way, matching the original semantics of
    /// "report overflow but keep the value usable".
    pub fn set_b32(&mut self, bytes: &[u8; 32]) -> bool {
        self.d[3] = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
        self.d[2] = u64::from_be_bytes(bytes[8..16].try_into().unwrap());
        self.d[1] = u64::from_be_bytes(bytes[16..24].try_into().unwrap());
        self.d[0] = u64::from_be_bytes(bytes[24..32].try_into().unwrap());
        let overflow = self.check_overflow();
        self.reduce(overflow);
        overflow
    }

    /// Encodes the scalar as 32 big-endian bytes.
    pub fn b32(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[0..8].copy_from_slice(&self.d[3].to_be_bytes());
        out[8..16].copy_from_slice(&self.d[2].to_be_bytes());
        out[16..24].copy_from_slice(&self.d[1].to_be_bytes());
        out[24..32].copy_from_slice(&self.d[0].to_be_bytes());
        out
    }

    /// Constant-time zero test.
    #[inline(always)]
    pub fn is_zero(&self) -> bool {
        (self.d[0] | self.d[1] | self.d[2] | self.d[3]) == 0
    }

    /// Constant-time one test.
    #[inline(always)]
    pub fn is_one(&self) -> bool {
        ((self.d[0] ^ 1) | self.d[1] | self.d[2] | self.d[3]) == 0
    }

    /// Constant-time parity test.
    #[inline(always)]
    pub fn is_even(&self) -> bool {
        self.d[0] & 1 == 0
    }

    /// Returns whether the scalar exceeds `⌊n / 2⌋` ("high-S" test).
    pub fn is_high(&self) -> bool {
        let d = &self.d;
        let mut yes = false;
        let mut no = false;
        no |= d[3] < N_HALF[3];
        yes |= (d[3] > N_HALF[3]) & !no;
        no |= (d[2] < N_HALF[2]) & !yes;
        no |= (d[1] < N_HALF[1]) & !yes;
        yes |= (d[1] > N_HALF[1]) & !no;
        yes |= (d[0] > N_HALF[0]) & !no;
        yes
    }

    /// Adds another scalar, returning whether the sum wrapped modulo `n`.
    pub fn add_assign_scalar(&mut self, rhs: &Scalar) -> bool {
        let mut t = self.d[0] as u128 + rhs.d[0] as u128;
        self.d[0] = t as u64;
        t >>= 64;
        t += self.d[1] as u128 + rhs.d[1] as u128;
        self.d[1] = t as u64;
        t >>= 64;
        t += self.d[2] as u128 + rhs.d[2] as u128;
        self.d[2] = t as u64;
        t >>= 64;
        t += self.d[3] as u128 + rhs.d[3] as u128;
        self.d[3] = t as u64;
        t >>= 64;
        let overflow = t != 0 || self.check_overflow();
        self.reduce(overflow);
        overflow
    }

    /// Returns `self + rhs (mod n)`.
    pub fn add(&self, rhs: &Scalar) -> Scalar {
        let mut r = *self;
        r.add_assign_scalar(rhs);
        r
    }

    /// Conditionally adds the power of two `2^bit`, without branching on
    /// `flag`.
    ///
    /// The caller must guarantee the result cannot overflow `n`.
    pub fn cadd_bit(&mut self, bit: u32, flag: bool) {
        debug_assert!(bit < 256);
        let inc = (flag as u64) << (bit & 0x3F);
        let limb = (bit >> 6) as usize;
        let mut t: u128 = 0;
        for i in 0..4 {
            t += self.d[i] as u128 + if i == limb { inc as u128 } else { 0 };
            self.d[i] = t as u64;
            t >>= 64;
        }
        debug_assert!(t == 0);
        debug_assert!(!self.check_overflow());
    }

    /// Returns the additive inverse `n − self`, or zero for zero.
    pub fn neg(&self) -> Scalar {
        let nonzero = (!self.is_zero() as u64).wrapping_neg();
        let mut r = Scalar::ZERO;
        let mut t = (!self.d[0]) as u128 + N[0] as u128 + 1;
        r.d[0] = (t as u64) & nonzero;
        t >>= 64;
        t += (!self.d[1]) as u128 + N[1] as u128;
        r.d[1] = (t as u64) & nonzero;
        t >>= 64;
        t += (!self.d[2]) as u128 + N[2] as u128;
        r.d[2] = (t as u64) & nonzero;
        t >>= 64;
        t += (!self.d[3]) as u128 + N[3] as u128;
        r.d[3] = (t as u64) & nonzero;
        r
    }

    /// Conditionally negates the scalar in place; returns `-1` when the
    /// negation was applied and `1` otherwise.
    pub fn cond_neg(&mut self, flag: bool) -> i32 {
        let neg = self.neg();
        self.cmov(&neg, flag);
        1 - 2 * (flag as i32)
    }

    /// Constant-time conditional move.
    pub fn cmov(&mut self, other: &Scalar, flag: bool) {
        let mask = (flag as u64).wrapping_neg();
        for (s, o) in self.d.iter_mut().zip(other.d.iter()) {
            *s ^= (*s ^ o) & mask;
        }
    }

    /// Schoolbook 256×256→512-bit multiply.
    fn mul_wide(&self, rhs: &Scalar) -> [u64; 8] {
        let mut l = [0u64; 8];
        for i in 0..4 {
            let mut carry: u128 = 0;
            for j in 0..4 {
                let t = l[i + j] as u128 + self.d[i] as u128 * rhs.d[j] as u128 + carry;
                l[i + j] = t as u64;
                carry = t >> 64;
            }
            l[i + 4] = carry as u64;
        }
        l
    }

    /// Reduces a 512-bit value modulo `n` by repeatedly folding the high
    /// limbs through `2²⁵⁶ ≡ 2²⁵⁶ − n (mod n)`.
    fn reduce_wide(l: &[u64; 8]) -> Scalar {
        // acc += a * b << 64·off, carry rippled through the full width.
        fn muladd(acc: &mut [u64], a: &[u64], b: u64, off: usize) {
            let mut carry: u128 = 0;
            for (i, &ai) in a.iter().enumerate() {
                let t = acc[off + i] as u128 + ai as u128 * b as u128 + carry;
                acc[off + i] = t as u64;
                carry = t >> 64;
            }
            for slot in acc.iter_mut().skip(off + a.len()) {
                let t = *slot as u128 + carry;
                *slot = t as u64;
                carry = t >> 64;
            }
            debug_assert!(carry == 0);
        }

        // 512 -> 386 bits.
        let mut m = [0u64; 7];
        m[0..4].copy_from_slice(&l[0..4]);
        muladd(&mut m, &l[4..8], NC[0], 0);
        muladd(&mut m, &l[4..8], NC[1], 1);
        muladd(&mut m, &l[4..8], NC[2], 2);

        // 386 -> 260 bits.
        let mut p = [0u64; 5];
        p[0..4].copy_from_slice(&m[0..4]);
        muladd(&mut p, &m[4..7], NC[0], 0);
        muladd(&mut p, &m[4..7], NC[1], 1);
        muladd(&mut p, &m[4..7], NC[2], 2);

        // 260 -> at most 257 bits.
        let hi = [p[4]];
        let mut q = [0u64; 5];
        q[0..4].copy_from_slice(&p[0..4]);
        q[4] = 0;
        muladd(&mut q, &hi, NC[0], 0);
        muladd(&mut q, &hi, NC[1], 1);
        muladd(&mut q, &hi, NC[2], 2);

        let mut r = Scalar { d: [q[0], q[1], q[2], q[3]] };
        let overflow = q[4] != 0 || r.check_overflow();
        r.reduce(overflow);
        r
    }

    /// Returns `self · rhs (mod n)`.
    pub fn mul(&self, rhs: &Scalar) -> Scalar {
        Scalar::reduce_wide(&self.mul_wide(rhs))
    }

    /// Returns `self² (mod n)`.
    #[inline(always)]
    pub fn sqr(&self) -> Scalar {
        self.mul(self)
    }

    /// Computes the multiplicative inverse in constant time.
    ///
    /// Square-and-multiply ladder over the fixed public exponent `n − 2`
    /// (Fermat's little theorem); the control flow depends only on the
    /// exponent constant, never on the input. The inverse of zero is
    /// zero.
    pub fn inverse(&self) -> Scalar {
        let mut exponent = Scalar { d: N };
        // n is odd, so subtracting 2 only touches the low limb.
        exponent.d[0] -= 2;
        let e = exponent.b32();

        let mut r = Scalar::ONE;
        for byte in e.iter() {
            for i in (0..8).rev() {
                r = r.sqr();
                if (byte >> i) & 1 != 0 {
                    r = r.mul(self);
                }
            }
        }
        r
    }

    /// Variable-time inverse for public inputs; same route as
    /// [`Self::inverse`].
    #[inline(always)]
    pub fn inverse_var(&self) -> Scalar {
        self.inverse()
    }

    /// Extracts `count` bits starting at `offset`, which must not cross
    /// a limb boundary.
    #[inline(always)]
    pub fn bits(&self, offset: usize, count: usize) -> u32 {
        debug_assert!((offset + count - 1) >> 6 == offset >> 6);
        ((self.d[offset >> 6] >> (offset & 0x3F)) as u32) & ((1 << count) - 1)
    }

    /// Extracts `count` bits starting at `offset`, allowing the window to
    /// straddle a limb boundary. Variable time.
    pub fn bits_var(&self, offset: usize, count: usize) -> u32 {
        debug_assert!(count <= 32);
        debug_assert!(offset + count <= 256);
        if (offset + count - 1) >> 6 == offset >> 6 {
            self.bits(offset, count)
        } else {
            (((self.d[offset >> 6] >> (offset & 0x3F))
                | (self.d[(offset >> 6) + 1] << (64 - (offset & 0x3F)))) as u32)
                & ((1 << count) - 1)
        }
    }

    /// Shifts the scalar right by `n` bits (1..=15), returning the bits
    /// shifted out.
    pub fn shr_int(&mut self, n: u32) -> u32 {
        debug_assert!(n > 0 && n < 16);
        let ret = (self.d[0] as u32) & ((1 << n) - 1);
        self.d[0] = (self.d[0] >> n) | (self.d[1] << (64 - n));
        self.d[1] = (self.d[1] >> n) | (self.d[2] << (64 - n));
        self.d[2] = (self.d[2] >> n) | (self.d[3] << (64 - n));
        self.d[3] >>= n;
        ret
    }

    /// Computes `round((self · b) / 2^shift)` for `shift ≥ 256`.
    ///
    /// Variable time in the (public, constant) shift only; used by the
    /// GLV decomposition with its fixed rounding constants.
    pub fn mul_shift_var(&self, b: &Scalar, shift: usize) -> Scalar {
        debug_assert!(shift >= 256);
        let l = self.mul_wide(b);
        let limbs = shift >> 6;
        let low = shift & 0x3F;
        let take = |i: usize| -> u64 {
            let mut v = if i + limbs < 8 { l[i + limbs] >> low } else { 0 };
            if low > 0 && i + limbs + 1 < 8 {
                v |= l[i + limbs + 1] << (64 - low);
            }
            v
        };
        let mut r = Scalar { d: [take(0), take(1), take(2), take(3)] };
        let round = (l[(shift - 1) >> 6] >> ((shift - 1) & 0x3F)) & 1;
        r.cadd_bit(0, round != 0);
        r
    }
}

/// The eigenvalue λ of the secp256k1 endomorphism, acting on scalars.
pub const LAMBDA: Scalar = Scalar::from_words([
    0x5363_AD4C_C05C_30E0,
    0xA526_1C02_8812_645A,
    0x122E_22EA_2081_6678,
    0xDF02_967C_1B23_BD72,
]);

const MINUS_LAMBDA: Scalar = Scalar::from_words([
    0xAC9C_52B3_3FA3_CF1F,
    0x5AD9_E3FD_77ED_9BA4,
    0xA880_B9FC_8EC7_39C2,
    0xE0CF_C810_B512_83CF,
]);

const MINUS_B1: Scalar = Scalar::from_words([
    0x0000_0000_0000_0000,
    0x0000_0000_0000_0000,
    0xE443_7ED6_010E_8828,
    0x6F54_7FA9_0ABF_E4C3,
]);

const MINUS_B2: Scalar = Scalar::from_words([
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFE,
    0x8A28_0AC5_0774_346D,
    0xD765_CDA8_3DB1_562C,
]);

const G1: Scalar = Scalar::from_words([
    0x0000_0000_0000_0000,
    0x0000_0000_0000_3086,
    0xD221_A7D4_6BCD_E86C,
    0x90E4_9284_EB15_3DAB,
]);

const G2: Scalar = Scalar::from_words([
    0x0000_0000_0000_0000,
    0x0000_0000_0000_E443,
    0x7ED6_010E_8828_6F54,
    0x7FA9_0ABF_E4C4_2212,
]);

/// Decomposes `k` into `(k₁, k₂)` with `k = k₁ + k₂·λ (mod n)` and both
/// parts roughly 128 bits.
///
/// Uses the lattice rounding constants for secp256k1; the `mul_shift_var`
/// calls are constant time because the shift amount is a constant.
pub fn split_lambda(k: &Scalar) -> (Scalar, Scalar) {
    let c1 = k.mul_shift_var(&G1, 272);
    let c2 = k.mul_shift_var(&G2, 272);
    let c1 = c1.mul(&MINUS_B1);
    let c2 = c2.mul(&MINUS_B2);
    let k2 = c1.add(&c2);
    let mut k1 = k2.mul(&MINUS_LAMBDA);
    k1 = k1.add(k);
    (k1, k2)
}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.d.zeroize();
    }
}
