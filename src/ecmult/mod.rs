//! Scalar multiplication engines.
//!
//! Three multipliers cover the library's needs:
//!
//! - [`EcmultContext::ecmult`] — `a·A + b·G` for arbitrary `A`, used by
//!   verification. Variable time: it may branch on its (public) inputs.
//!   `a` is split through the GLV endomorphism into two half-length
//!   scalars so the table of odd multiples of `A` is reused for `λ·A`
//!   at no extra doubling cost; `b·G` streams over a window-8 table of
//!   odd multiples of `G` precomputed at context creation.
//! - [`ecmult_const`] — secret-scalar × variable-point multiplication
//!   for key agreement. Constant time: signed-digit recoding with a
//!   skew, a full table scan per digit, and only complete additions.
//! - `ecmult_gen`/`ecmult_gen2` (submodules [`gen`], [`gen2`]) — fixed
//!   base multiplications by `G` and `H` from comb tables, constant
//!   time, with additive blinding for the signing path.
//!
//! The w-NAF recoders live here as free functions; the signed-digit
//! tables are built with the shared-Z isomorphism trick so table
//! construction costs no field inversions.

pub mod r#gen;
pub mod gen2;

use crate::field::FieldElement;
use crate::group::{
    AFFINE_G, Affine, AffineStorage, Jacobian, globalz_set_table_gej, set_table_gej_var,
};
use crate::scalar::{Scalar, split_lambda};

/// Window size for the per-point odd-multiples table.
pub const WINDOW_A: usize = 5;

/// Window size for the precomputed generator table.
pub const WINDOW_G: usize = 8;

/// Entries in the odd-multiples table of A: 1·A, 3·A, …, 15·A.
pub const ECMULT_TABLE_SIZE_A: usize = 1 << (WINDOW_A - 2);

/// Entries in the odd-multiples table of G.
pub const ECMULT_TABLE_SIZE_G: usize = 1 << (WINDOW_G - 2);

const WNAF_BITS: usize = 256;

/// Digits of the constant-time signed recoding at window `WINDOW_A − 1`.
const WNAF_SIZE: usize = (WNAF_BITS + (WINDOW_A - 1) - 1) / (WINDOW_A - 1);

/// Fills `prej` with the odd multiples `1·a, 3·a, …, (2n−1)·a`.
///
/// `zr[0]` receives `prej[0].z / a.z` and `zr[i]` the ratio
/// `prej[i].z / prej[i−1].z`. Except for the last entry, the Z
/// coordinates of `prej` are not directly meaningful; consumers must go
/// through the ratio-aware conversions.
pub fn odd_multiples_table(prej: &mut [Jacobian], zr: &mut [FieldElement], a: &Jacobian) {
    debug_assert!(prej.len() == zr.len());
    debug_assert!(!prej.is_empty());
    debug_assert!(!a.is_infinity());

    let d = a.double_var(None);

    // Treat d.z as the unit of an isomorphic curve so the additions
    // below can use the mixed formula against an affine d.
    let d_ge = Affine { x: d.x, y: d.y, infinity: false };
    let mut a_ge = Affine::default();
    a_ge.set_gej_zinv(a, &d.z);

    prej[0].x = a_ge.x;
    prej[0].y = a_ge.y;
    prej[0].z = a.z;
    prej[0].infinity = false;
    zr[0] = d.z;

    for i in 1..prej.len() {
        let mut ratio = FieldElement::default();
        prej[i] = prej[i - 1].add_ge_var(&d_ge, Some(&mut ratio));
        zr[i] = ratio;
    }

    // Undo the isomorphism on the final Z so at least one entry carries
    // a true coordinate for the ratio chain to anchor on.
    let last = prej.last().unwrap().z.mul(&d.z);
    prej.last_mut().unwrap().z = last;
}

/// Odd-multiples table of `a` expressed over a single global Z, for the
/// window-A tables rebuilt per multiplication.
fn odd_multiples_table_globalz_windowa(
    pre: &mut [Affine; ECMULT_TABLE_SIZE_A],
    globalz: &mut FieldElement,
    a: &Jacobian,
) {
    let mut prej = [Jacobian::default(); ECMULT_TABLE_SIZE_A];
    let mut zr = [FieldElement::default(); ECMULT_TABLE_SIZE_A];
    odd_multiples_table(&mut prej, &mut zr, a);
    globalz_set_table_gej(pre, globalz, &prej, &zr);
}

/// Looks up the table entry for an odd signed digit. Variable time.
fn table_get_ge(pre: &[Affine], n: i32, w: usize) -> Affine {
    debug_assert!(n & 1 == 1);
    debug_assert!(n >= -((1 << (w - 1)) - 1));
    debug_assert!(n <= (1 << (w - 1)) - 1);
    if n > 0 {
        pre[((n - 1) / 2) as usize]
    } else {
        pre[((-n - 1) / 2) as usize].neg()
    }
}

/// Looks up the table entry for an odd signed digit by scanning every
/// entry with conditional moves. Constant time; safe for secret digits.
fn table_get_ge_const(pre: &[Affine], n: i32, w: usize) -> Affine {
    let sign = 2 * ((n > 0) as i32) - 1;
    let abs_n = n * sign;
    let idx = (abs_n >> 1) as usize;
    debug_assert!(n & 1 == 1);
    debug_assert!(n >= -((1 << (w - 1)) - 1));
    debug_assert!(n <= (1 << (w - 1)) - 1);

    let mut r = Affine::default();
    for (m, entry) in pre.iter().enumerate() {
        r.x.cmov(&entry.x, m == idx);
        r.y.cmov(&entry.y, m == idx);
    }
    r.infinity = false;
    let neg_y = r.y.neg(1);
    r.y.cmov(&neg_y, n != abs_n);
    r
}

/// Storage-table variant of [`table_get_ge`]. Variable time.
fn table_get_ge_storage(pre: &[AffineStorage], n: i32, w: usize) -> Affine {
    debug_assert!(n & 1 == 1);
    debug_assert!(n >= -((1 << (w - 1)) - 1));
    debug_assert!(n <= (1 << (w - 1)) - 1);
    if n > 0 {
        Affine::from_storage(&pre[((n - 1) / 2) as usize])
    } else {
        Affine::from_storage(&pre[((-n - 1) / 2) as usize]).neg()
    }
}

/// Computes the width-`w` NAF of a scalar: signed odd digits, at most
/// one non-zero in any `w` consecutive positions. Returns the number of
/// significant digit positions. Variable time.
pub fn ecmult_wnaf(wnaf: &mut [i32], a: &Scalar, w: usize) -> i32 {
    debug_assert!(wnaf.len() <= 256);
    debug_assert!((2..=31).contains(&w));

    for digit in wnaf.iter_mut() {
        *digit = 0;
    }

    let mut s = *a;
    let mut last_set_bit: i32 = -1;
    let mut bit = 0;
    let mut sign = 1;
    let mut carry: i32 = 0;

    // Work with the low half; a "negative" scalar is negated and the
    // digit signs flipped.
    if s.bits(255, 1) > 0 {
        s = s.neg();
        sign = -1;
    }

    while bit < wnaf.len() {
        if s.bits(bit, 1) == carry as u32 {
            bit += 1;
            continue;
        }

        let mut now = w;
        if now > wnaf.len() - bit {
            now = wnaf.len() - bit;
        }

        let mut word = s.bits_var(bit, now) as i32 + carry;
        carry = (word >> (w - 1)) & 1;
        word -= carry << w;

        wnaf[bit] = sign * word;
        last_set_bit = bit as i32;

        bit += now;
    }
    debug_assert!(carry == 0);

    last_set_bit + 1
}

/// Signed-digit recoding for the constant-time multiplier.
///
/// Every digit is odd and non-zero, so the main loop performs the same
/// sequence of operations for every scalar. Even inputs are skewed by 1
/// and odd ones by 2 (negation flips parity); the returned skew (1 or 2)
/// tells the caller what to subtract afterwards.
pub fn ecmult_wnaf_const(wnaf: &mut [i32], a: &Scalar, w: u32) -> i32 {
    let mut s = *a;

    let flip = s.is_high();
    let bit = flip ^ !s.is_even();
    let neg_s = s.neg();
    let not_neg_one = !neg_s.is_one();
    s.cadd_bit(if bit { 1 } else { 0 }, not_neg_one);
    // For -1 the skew-by-two and the flip coincide; report a plain skew.
    let mut global_sign = s.cond_neg(flip);
    global_sign *= 2 * (not_neg_one as i32) - 1;
    let skew = 1 << (bit as u32);

    let mut u_last = s.shr_int(w) as i32;
    let mut u: i32 = 0;
    let mut word = 0;
    while word * (w as usize) < WNAF_BITS {
        u = s.shr_int(w) as i32;
        let even = (u & 1) == 0;
        let sign = 2 * ((u_last > 0) as i32) - 1;
        u += sign * (even as i32);
        u_last -= sign * (even as i32) * (1 << w);

        wnaf[word] = u_last * global_sign;
        word += 1;
        u_last = u;
    }
    wnaf[word] = u * global_sign;

    debug_assert!(s.is_zero());
    debug_assert!(word == WNAF_BITS.div_ceil(w as usize));

    skew
}

/// Precomputed odd multiples of the generator, for the `b·G` half of
/// verification-side multiplications.
#[derive(Clone)]
pub struct EcmultContext {
    pre_g: Box<[AffineStorage]>,
}

impl EcmultContext {
    /// Builds the window-8 generator table (64 points, batch-converted
    /// to affine storage with a single inversion).
    pub fn new() -> Self {
        let mut gj = Jacobian::default();
        gj.set_ge(&AFFINE_G);

        let mut prej = vec![Jacobian::default(); ECMULT_TABLE_SIZE_G];
        let mut zr = vec![FieldElement::default(); ECMULT_TABLE_SIZE_G];
        odd_multiples_table(&mut prej, &mut zr, &gj);
        let pre = set_table_gej_var(&prej, &zr);

        EcmultContext { pre_g: pre.iter().map(|p| p.to_storage()).collect() }
    }

    /// Computes `na·A + ng·G`. Variable time; verification only.
    pub fn ecmult(&self, a: &Jacobian, na: &Scalar, ng: &Scalar) -> Jacobian {
        let mut pre_a = [Affine::default(); ECMULT_TABLE_SIZE_A];
        let mut z = FieldElement::default();

        // Split na = na_1 + na_lam·λ; both halves fit 129 bits (as
        // signed values), halving the doubling range for the A part.
        let (na_1, na_lam) = split_lambda(na);
        let mut wnaf_na_1 = [0i32; 130];
        let mut wnaf_na_lam = [0i32; 130];
        let bits_na_1 = ecmult_wnaf(&mut wnaf_na_1, &na_1, WINDOW_A);
        let bits_na_lam = ecmult_wnaf(&mut wnaf_na_lam, &na_lam, WINDOW_A);

        odd_multiples_table_globalz_windowa(&mut pre_a, &mut z, a);
        let mut pre_a_lam = [Affine::default(); ECMULT_TABLE_SIZE_A];
        for (lam, plain) in pre_a_lam.iter_mut().zip(pre_a.iter()) {
            *lam = plain.mul_lambda();
        }

        let mut wnaf_ng = [0i32; 256];
        let bits_ng = ecmult_wnaf(&mut wnaf_ng, ng, WINDOW_G);

        let mut bits = bits_na_1.max(bits_na_lam);
        bits = bits.max(bits_ng);

        let mut r = Jacobian::default();
        r.set_infinity();
        for i in (0..bits).rev() {
            r = r.double_var(None);

            if i < bits_na_1 {
                let n = wnaf_na_1[i as usize];
                if n != 0 {
                    let tmpa = table_get_ge(&pre_a, n, WINDOW_A);
                    r = r.add_ge_var(&tmpa, None);
                }
            }
            if i < bits_na_lam {
                let n = wnaf_na_lam[i as usize];
                if n != 0 {
                    let tmpa = table_get_ge(&pre_a_lam, n, WINDOW_A);
                    r = r.add_ge_var(&tmpa, None);
                }
            }
            if i < bits_ng {
                let n = wnaf_ng[i as usize];
                if n != 0 {
                    let tmpa = table_get_ge_storage(&self.pre_g, n, WINDOW_G);
                    r = r.add_zinv_var(&tmpa, &z);
                }
            }
        }

        if !r.infinity {
            r.z = r.z.mul(&z);
        }
        r
    }
}

impl Default for EcmultContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes `scalar·a` in constant time.
///
/// The digit sequence, table accesses and additions are identical for
/// every scalar; table selection goes through full cmov scans and the
/// group operations are the complete constant-time formulas.
pub fn ecmult_const(a: &Affine, scalar: &Scalar) -> Jacobian {
    debug_assert!(!a.infinity);

    let mut pre_a = [Affine::default(); ECMULT_TABLE_SIZE_A];
    let mut z = FieldElement::default();
    let mut wnaf_1 = [0i32; 1 + WNAF_SIZE];

    let skew_1 = ecmult_wnaf_const(&mut wnaf_1, scalar, (WINDOW_A - 1) as u32);

    // All odd multiples share one Z denominator; operations below
    // pretend that denominator is 1 and the true Z is restored at the
    // end.
    let mut r = Jacobian::default();
    r.set_ge(a);
    odd_multiples_table_globalz_windowa(&mut pre_a, &mut z, &r);
    for entry in pre_a.iter_mut() {
        entry.y.normalize_weak();
    }

    // First digit initializes r directly instead of doubling infinity.
    let n = wnaf_1[WNAF_SIZE];
    debug_assert!(n != 0);
    let tmpa = table_get_ge_const(&pre_a, n, WINDOW_A);
    r.set_ge(&tmpa);

    for i in (0..WNAF_SIZE).rev() {
        for _ in 0..WINDOW_A - 1 {
            r = r.double_nonzero();
        }

        let n = wnaf_1[i];
        debug_assert!(n != 0);
        let tmpa = table_get_ge_const(&pre_a, n, WINDOW_A);
        r = r.add_ge(&tmpa);
    }

    r.z = r.z.mul(&z);

    // Undo the recoding skew: subtract a for skew 1, 2a for skew 2,
    // selected without branching.
    let mut tmpj = Jacobian::default();
    tmpj.set_ge(a);
    tmpj = tmpj.double_var(None);
    let mut a2 = Affine::default();
    a2.set_gej(&tmpj);

    let mut correction_stor = a.to_storage();
    let a2_stor = a2.to_storage();
    correction_stor.cmov(&a2_stor, skew_1 == 2);

    let correction = Affine::from_storage(&correction_stor).neg();
    r.add_ge(&correction)
}
