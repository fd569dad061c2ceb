//! Group operations on the secp256k1 curve.
//!
//! The curve is the short Weierstrass curve
//!
//! ```text
//! y² = x³ + 7  over 𝔽ₚ, p = 2²⁵⁶ − 2³² − 977
//! ```
//!
//! ## Coordinate systems
//!
//! - **`Affine`** — a point `(x, y)` or the point at infinity. Used at
//!   API boundaries and inside precomputed tables.
//! - **`Jacobian`** — `(X : Y : Z)` representing the affine point
//!   `(X/Z², Y/Z³)`. All group arithmetic runs in Jacobian form to avoid
//!   per-operation field inversions; affine coordinates are recovered at
//!   boundaries, either one point at a time or in batch via Montgomery's
//!   trick.
//! - **`AffineStorage`** — a packed 64-byte form of a normalized affine
//!   point, used for table entries and constant-time table scans.
//!
//! ## Operations
//!
//! Doubling, mixed and general addition (with variable-time variants and
//! optional Z-ratio outputs for building tables), negation, decompression
//! from an x coordinate, on-curve validation, batch affine conversion,
//! projection re-randomization, and the β·x endomorphism map.
//!
//! The variable-time formulas branch on the exceptional cases (P+P,
//! P+(−P), ∞ operands) and may only see public data. The constant-time
//! `add_ge` handles every case branchlessly with conditional moves and is
//! the only addition reachable from secret scalars.

use zeroize::Zeroize;

use crate::field::{FieldElement, FieldElementStorage};

/// x coordinate of the generator G.
pub const G_X: FieldElement = FieldElement::from_words([
    0x79BE_667E_F9DC_BBAC,
    0x55A0_6295_CE87_0B07,
    0x029B_FCDB_2DCE_28D9,
    0x59F2_815B_16F8_1798,
]);

/// y coordinate of the generator G.
pub const G_Y: FieldElement = FieldElement::from_words([
    0x483A_DA77_26A3_C465,
    0x5DA4_FBFC_0E11_08A8,
    0xFD17_B448_A685_5419,
    0x9C47_D08F_FB10_D4B8,
]);

/// The standard generator G.
pub const AFFINE_G: Affine = Affine { x: G_X, y: G_Y, infinity: false };

/// The alternate generator H used for value commitments: the
/// nothing-up-my-sleeve point whose x coordinate is the SHA-256 image of
/// the serialization of G, with no known discrete log relative to G.
pub const AFFINE_H: Affine = Affine {
    x: FieldElement::from_words([
        0x5092_9B74_C1A0_4954,
        0xB78B_4B60_35E9_7A5E,
        0x078A_5A0F_28EC_96D5,
        0x47BF_EE9A_CE80_3AC0,
    ]),
    y: FieldElement::from_words([
        0x31D3_C686_3973_926E,
        0x049E_637C_B1B5_F40A,
        0x36DA_C28A_F176_6968,
        0xC30C_2313_F3A3_8904,
    ]),
    infinity: false,
};

/// The curve constant b = 7.
pub const CURVE_B: FieldElement = FieldElement::from_int(7);

/// β, the cube root of unity acting as `x ↦ β·x` under the endomorphism.
pub const BETA: FieldElement = FieldElement::from_words([
    0x7AE9_6A2B_657C_0710,
    0x6E64_479E_AC34_34E9,
    0x9CF0_4975_12F5_8995,
    0xC139_6C28_7195_01EE,
]);

/// A point on the curve in affine coordinates, or infinity.
#[derive(Clone, Copy, Debug, Default)]
pub struct Affine {
    pub x: FieldElement,
    pub y: FieldElement,
    pub infinity: bool,
}

/// A point on the curve in Jacobian coordinates, or infinity.
#[derive(Clone, Copy, Debug, Default)]
pub struct Jacobian {
    pub x: FieldElement,
    pub y: FieldElement,
    pub z: FieldElement,
    pub infinity: bool,
}

/// Packed storage form of a normalized affine point (64 bytes).
#[derive(Clone, Copy, Debug, Default)]
pub struct AffineStorage {
    pub x: FieldElementStorage,
    pub y: FieldElementStorage,
}

impl Affine {
    /// Builds the point `(x, y)` without validation.
    pub fn set_xy(&mut self, x: &FieldElement, y: &FieldElement) {
        self.infinity = false;
        self.x = *x;
        self.y = *y;
    }

    /// Marks the point as infinity.
    pub fn set_infinity(&mut self) {
        self.infinity = true;
        self.x = FieldElement::ZERO;
        self.y = FieldElement::ZERO;
    }

    #[inline(always)]
    pub fn is_infinity(&self) -> bool {
        self.infinity
    }

    /// Checks `y² = x³ + 7` in variable time.
    pub fn is_valid_var(&self) -> bool {
        if self.infinity {
            return false;
        }
        let y2 = self.y.sqr();
        let mut x3 = self.x.sqr();
        x3 = x3.mul(&self.x);
        x3 += &CURVE_B;
        y2.equal_var(&x3)
    }

    /// Returns the negation of the point.
    pub fn neg(&self) -> Affine {
        let mut y = self.y;
        y.normalize_weak();
        Affine { x: self.x, y: y.neg(1), infinity: self.infinity }
    }

    /// Recovers the point with the given x coordinate whose y is a
    /// square root of `x³ + 7`; fails when x is not on the curve.
    /// Variable time.
    pub fn set_xquad_var(&mut self, x: &FieldElement) -> bool {
        let x2 = x.sqr();
        let mut x3 = x.mul(&x2);
        x3 += &CURVE_B;
        self.x = *x;
        self.infinity = false;
        let (y, ok) = x3.sqrt();
        self.y = y;
        ok
    }

    /// Recovers a point from an x coordinate and the parity of y.
    /// Variable time.
    pub fn set_xo_var(&mut self, x: &FieldElement, odd: bool) -> bool {
        if !self.set_xquad_var(x) {
            return false;
        }
        self.y.normalize_var();
        if self.y.is_odd() != odd {
            self.y = self.y.neg(1);
        }
        true
    }

    /// Converts a Jacobian point to affine with one field inversion.
    pub fn set_gej(&mut self, a: &Jacobian) {
        let mut a = *a;
        self.infinity = a.infinity;
        a.z = a.z.inv();
        let z2 = a.z.sqr();
        let z3 = a.z.mul(&z2);
        a.x = a.x.mul(&z2);
        a.y = a.y.mul(&z3);
        self.x = a.x;
        self.y = a.y;
    }

    /// Variable-time conversion from Jacobian; leaves the coordinates
    /// normalized.
    pub fn set_gej_var(&mut self, a: &Jacobian) {
        let mut a = *a;
        self.infinity = a.infinity;
        if a.infinity {
            return;
        }
        a.z = a.z.inv_var();
        let z2 = a.z.sqr();
        let z3 = a.z.mul(&z2);
        a.x = a.x.mul(&z2);
        a.y = a.y.mul(&z3);
        self.x = a.x;
        self.y = a.y;
        self.x.normalize_var();
        self.y.normalize_var();
    }

    /// Rescales a Jacobian point by a known `1/z` factor.
    pub fn set_gej_zinv(&mut self, a: &Jacobian, zi: &FieldElement) {
        let zi2 = zi.sqr();
        let zi3 = zi2.mul(zi);
        self.x = a.x.mul(&zi2);
        self.y = a.y.mul(&zi3);
        self.infinity = a.infinity;
    }

    /// Applies the endomorphism map `(x, y) ↦ (β·x, y)`.
    pub fn mul_lambda(&self) -> Affine {
        Affine { x: self.x.mul(&BETA), y: self.y, infinity: self.infinity }
    }

    /// Packs a normalized point into storage form.
    pub fn to_storage(&self) -> AffineStorage {
        debug_assert!(!self.infinity);
        let mut x = self.x;
        let mut y = self.y;
        x.normalize();
        y.normalize();
        AffineStorage { x: x.to_storage(), y: y.to_storage() }
    }

    /// Unpacks a point from storage form.
    pub fn from_storage(s: &AffineStorage) -> Affine {
        Affine {
            x: FieldElement::from_storage(&s.x),
            y: FieldElement::from_storage(&s.y),
            infinity: false,
        }
    }
}

impl AffineStorage {
    /// Constant-time conditional move between storage entries.
    pub fn cmov(&mut self, other: &AffineStorage, flag: bool) {
        self.x.cmov(&other.x, flag);
        self.y.cmov(&other.y, flag);
    }
}

impl Jacobian {
    /// Marks the point as infinity.
    pub fn set_infinity(&mut self) {
        self.infinity = true;
        self.x = FieldElement::ZERO;
        self.y = FieldElement::ZERO;
        self.z = FieldElement::ZERO;
    }

    #[inline(always)]
    pub fn is_infinity(&self) -> bool {
        self.infinity
    }

    /// Embeds an affine point with Z = 1.
    pub fn set_ge(&mut self, a: &Affine) {
        self.infinity = a.infinity;
        self.x = a.x;
        self.y = a.y;
        self.z = FieldElement::ONE;
    }

    /// Returns the negation of the point.
    pub fn neg(&self) -> Jacobian {
        let mut y = self.y;
        y.normalize_weak();
        Jacobian { x: self.x, y: y.neg(1), z: self.z, infinity: self.infinity }
    }

    /// Multiplies the projection by `s`: `(X·s², Y·s³, Z·s)`.
    ///
    /// The represented point is unchanged; used to randomize the
    /// projective representation against multiplier side channels.
    pub fn rescale(&mut self, s: &FieldElement) {
        let zz = s.sqr();
        self.x = self.x.mul(&zz);
        self.y = self.y.mul(&zz);
        self.y = self.y.mul(s);
        self.z = self.z.mul(s);
    }

    /// Point doubling, variable time only in the infinity flag.
    ///
    /// When `rzr` is requested it receives the ratio `Z_out / Z_in`
    /// (here `2·Y`), used by table construction for batched inversion.
    pub fn double_var(&self, rzr: Option<&mut FieldElement>) -> Jacobian {
        let mut r = Jacobian::default();
        r.infinity = self.infinity;
        if r.infinity {
            if let Some(zr) = rzr {
                zr.set_int(1);
            }
            return r;
        }

        if let Some(zr) = rzr {
            *zr = self.y;
            zr.normalize_weak();
            zr.mul_int(2);
        }

        r.z = self.z.mul(&self.y);
        r.z.mul_int(2);
        let mut t1 = self.x.sqr();
        t1.mul_int(3);
        let t2 = t1.sqr();
        let mut t3 = self.y.sqr();
        t3.mul_int(2);
        let mut t4 = t3.sqr();
        t4.mul_int(2);
        t3 = t3.mul(&self.x);
        r.x = t3;
        r.x.mul_int(4);
        r.x = r.x.neg(4);
        r.x += &t2;
        let mut t2 = t2.neg(1);
        t3.mul_int(6);
        t3 += &t2;
        r.y = t1.mul(&t3);
        t2 = t4.neg(2);
        r.y += &t2;
        r
    }

    /// Doubling for a point known not to be infinity; identical formulas
    /// with the infinity branch asserted away (safe on secret paths).
    pub fn double_nonzero(&self) -> Jacobian {
        debug_assert!(!self.infinity);
        self.double_var(None)
    }

    /// General Jacobian addition, variable time. `rzr` receives
    /// `Z_out / Z_in(a)` when both operands are finite.
    pub fn add_var(&self, b: &Jacobian, rzr: Option<&mut FieldElement>) -> Jacobian {
        if self.infinity {
            debug_assert!(rzr.is_none());
            return *b;
        }
        if b.infinity {
            if let Some(zr) = rzr {
                zr.set_int(1);
            }
            return *self;
        }

        let z22 = b.z.sqr();
        let z12 = self.z.sqr();
        let u1 = self.x.mul(&z22);
        let u2 = b.x.mul(&z12);
        let mut s1 = self.y.mul(&z22);
        s1 = s1.mul(&b.z);
        let mut s2 = b.y.mul(&z12);
        s2 = s2.mul(&self.z);
        let mut h = u1.neg(1);
        h += &u2;
        let mut i = s1.neg(1);
        i += &s2;

        if h.normalizes_to_zero_var() {
            if i.normalizes_to_zero_var() {
                return self.double_var(rzr);
            }
            if let Some(zr) = rzr {
                zr.set_int(0);
            }
            let mut r = Jacobian::default();
            r.set_infinity();
            return r;
        }

        let mut r = Jacobian::default();
        r.infinity = false;
        let i2 = i.sqr();
        let h2 = h.sqr();
        let mut h3 = h.mul(&h2);
        h = h.mul(&b.z);
        if let Some(zr) = rzr {
            *zr = h;
        }
        r.z = self.z.mul(&h);
        let t = u1.mul(&h2);
        r.x = t;
        r.x.mul_int(2);
        r.x += &h3;
        r.x = r.x.neg(3);
        r.x += &i2;
        r.y = r.x.neg(5);
        r.y += &t;
        r.y = r.y.mul(&i);
        h3 = h3.mul(&s1);
        h3 = h3.neg(1);
        r.y += &h3;
        r
    }

    /// Mixed Jacobian/affine addition, variable time. `rzr` receives
    /// `Z_out / Z_in` when both operands are finite.
    pub fn add_ge_var(&self, b: &Affine, rzr: Option<&mut FieldElement>) -> Jacobian {
        if self.infinity {
            debug_assert!(rzr.is_none());
            let mut r = Jacobian::default();
            r.set_ge(b);
            return r;
        }
        if b.infinity {
            if let Some(zr) = rzr {
                zr.set_int(1);
            }
            return *self;
        }

        let z12 = self.z.sqr();
        let mut u1 = self.x;
        u1.normalize_weak();
        let u2 = b.x.mul(&z12);
        let mut s1 = self.y;
        s1.normalize_weak();
        let mut s2 = b.y.mul(&z12);
        s2 = s2.mul(&self.z);
        let mut h = u1.neg(1);
        h += &u2;
        let mut i = s1.neg(1);
        i += &s2;

        if h.normalizes_to_zero_var() {
            if i.normalizes_to_zero_var() {
                return self.double_var(rzr);
            }
            if let Some(zr) = rzr {
                zr.set_int(0);
            }
            let mut r = Jacobian::default();
            r.set_infinity();
            return r;
        }

        let mut r = Jacobian::default();
        r.infinity = false;
        let i2 = i.sqr();
        let h2 = h.sqr();
        let mut h3 = h.mul(&h2);
        if let Some(zr) = rzr {
            *zr = h;
        }
        r.z = self.z.mul(&h);
        let t = u1.mul(&h2);
        r.x = t;
        r.x.mul_int(2);
        r.x += &h3;
        r.x = r.x.neg(3);
        r.x += &i2;
        r.y = r.x.neg(5);
        r.y += &t;
        r.y = r.y.mul(&i);
        h3 = h3.mul(&s1);
        h3 = h3.neg(1);
        r.y += &h3;
        r
    }

    /// Mixed addition against a point with known `1/z`, variable time.
    ///
    /// `b` is an affine view of a Jacobian point whose inverse Z
    /// coordinate is `bzinv`; this lets the w-NAF loop add table entries
    /// that all share one denominator without per-entry inversions.
    pub fn add_zinv_var(&self, b: &Affine, bzinv: &FieldElement) -> Jacobian {
        if b.infinity {
            return *self;
        }
        if self.infinity {
            let bzinv2 = bzinv.sqr();
            let bzinv3 = bzinv2.mul(bzinv);
            let mut r = Jacobian::default();
            r.infinity = false;
            r.x = b.x.mul(&bzinv2);
            r.y = b.y.mul(&bzinv3);
            r.z = FieldElement::ONE;
            return r;
        }

        // Treat b as having z = 1/bzinv: scale our own z instead.
        let az = self.z.mul(bzinv);
        let z12 = az.sqr();
        let mut u1 = self.x;
        u1.normalize_weak();
        let u2 = b.x.mul(&z12);
        let mut s1 = self.y;
        s1.normalize_weak();
        let mut s2 = b.y.mul(&z12);
        s2 = s2.mul(&az);
        let mut h = u1.neg(1);
        h += &u2;
        let mut i = s1.neg(1);
        i += &s2;

        if h.normalizes_to_zero_var() {
            if i.normalizes_to_zero_var() {
                return self.double_var(None);
            }
            let mut r = Jacobian::default();
            r.set_infinity();
            return r;
        }

        let mut r = Jacobian::default();
        r.infinity = false;
        let i2 = i.sqr();
        let h2 = h.sqr();
        let mut h3 = h.mul(&h2);
        r.z = self.z.mul(&h);
        let t = u1.mul(&h2);
        r.x = t;
        r.x.mul_int(2);
        r.x += &h3;
        r.x = r.x.neg(3);
        r.x += &i2;
        r.y = r.x.neg(5);
        r.y += &t;
        r.y = r.y.mul(&i);
        h3 = h3.mul(&s1);
        h3 = h3.neg(1);
        r.y += &h3;
        r
    }

    /// Constant-time mixed addition covering every exceptional case.
    ///
    /// Degenerate denominators (the P + (−P)-shaped cases reachable via
    /// the cube-root-of-unity symmetry) are replaced by the alternate
    /// lambda expression with conditional moves, so no branch ever
    /// depends on the operand values. `b` must not be infinity.
    pub fn add_ge(&self, b: &Affine) -> Jacobian {
        debug_assert!(!b.infinity);

        let zz = self.z.sqr();
        let mut u1 = self.x;
        u1.normalize_weak();
        let u2 = b.x.mul(&zz);
        let mut s1 = self.y;
        s1.normalize_weak();
        let mut s2 = b.y.mul(&zz);
        s2 = s2.mul(&self.z);
        let mut t = u1;
        t += &u2;
        let mut m = s1;
        m += &s2;
        let mut rr = t.sqr();
        let mut m_alt = u2.neg(1);
        let tt = u1.mul(&m_alt);
        rr += &tt;

        let degenerate = m.normalizes_to_zero() & rr.normalizes_to_zero();

        // In the degenerate case lambda is 0/0; the equivalent
        // (y1 - y2)/(x1 - x2) expression is picked instead.
        let mut rr_alt = s1;
        rr_alt.mul_int(2);
        m_alt += &u1;

        rr_alt.cmov(&rr, !degenerate);
        m_alt.cmov(&m, !degenerate);

        let mut n = m_alt.sqr();
        let mut q = n.mul(&t);

        // Either m == m_alt or m normalizes to zero, so m³·m_alt is
        // either m_alt⁴ or zero.
        n = n.sqr();
        n.cmov(&m, degenerate);
        let mut t = rr_alt.sqr();
        let mut r = Jacobian::default();
        r.z = self.z.mul(&m_alt);
        let infinity = r.z.normalizes_to_zero() & !self.infinity;
        r.z.mul_int(2);
        q = q.neg(1);
        t += &q;
        t.normalize_weak();
        r.x = t;
        t.mul_int(2);
        t += &q;
        t = t.mul(&rr_alt);
        t += &n;
        r.y = t.neg(3);
        r.y.normalize_weak();
        r.x.mul_int(4);
        r.y.mul_int(4);

        // If a was infinity, the result is simply b.
        r.x.cmov(&b.x, self.infinity);
        r.y.cmov(&b.y, self.infinity);
        r.z.cmov(&FieldElement::ONE, self.infinity);
        r.infinity = infinity;
        r
    }

    /// Compares the x coordinate of this Jacobian point against a field
    /// element, without converting to affine. Variable time.
    pub fn eq_x_var(&self, x: &FieldElement) -> bool {
        debug_assert!(!self.infinity);
        let mut r = self.z.sqr();
        r = r.mul(x);
        let mut r2 = self.x;
        r2.normalize_weak();
        r.equal_var(&r2)
    }
}

impl Zeroize for Affine {
    fn zeroize(&mut self) {
        self.x.zeroize();
        self.y.zeroize();
        self.infinity = false;
    }
}

impl Zeroize for Jacobian {
    fn zeroize(&mut self) {
        self.x.zeroize();
        self.y.zeroize();
        self.z.zeroize();
        self.infinity = false;
    }
}

/// Inverts a batch of field elements with a single inversion
/// (Montgomery's trick). Variable time; inputs must be non-zero.
pub fn inv_all_var(fields: &[FieldElement]) -> Vec<FieldElement> {
    if fields.is_empty() {
        return Vec::new();
    }

    let mut ret = Vec::with_capacity(fields.len());
    ret.push(fields[0]);
    for i in 1..fields.len() {
        let prod = ret[i - 1].mul(&fields[i]);
        ret.push(prod);
    }

    let mut u = ret[fields.len() - 1].inv_var();
    for i in (1..fields.len()).rev() {
        ret[i] = u.mul(&ret[i - 1]);
        u = u.mul(&fields[i]);
    }
    ret[0] = u;
    ret
}

/// Converts a batch of Jacobian points to affine, sharing one inversion
/// across the whole batch. Variable time.
pub fn set_all_gej_var(a: &[Jacobian]) -> Vec<Affine> {
    let az: Vec<FieldElement> = a.iter().filter(|p| !p.infinity).map(|p| p.z).collect();
    let azi = inv_all_var(&az);

    let mut out = vec![Affine::default(); a.len()];
    let mut count = 0;
    for (r, p) in out.iter_mut().zip(a.iter()) {
        r.infinity = p.infinity;
        if !p.infinity {
            r.set_gej_zinv(p, &azi[count]);
            count += 1;
        }
    }
    out
}

/// Converts a table of Jacobian points produced with Z-ratio tracking to
/// true affine coordinates with a single inversion.
///
/// `zr[i]` must hold `a[i].z / a[i-1].z`; only the final entry of `a` is
/// required to carry a valid Z. Variable time.
pub fn set_table_gej_var(a: &[Jacobian], zr: &[FieldElement]) -> Vec<Affine> {
    debug_assert!(a.len() == zr.len());
    let mut r = vec![Affine::default(); a.len()];
    if a.is_empty() {
        return r;
    }

    let mut i = a.len() - 1;
    let mut zi = a[i].z.inv_var();
    r[i].set_gej_zinv(&a[i], &zi);

    while i > 0 {
        zi = zi.mul(&zr[i]);
        i -= 1;
        r[i].set_gej_zinv(&a[i], &zi);
    }
    r
}

/// Rewrites a table of Jacobian points that share accumulated Z ratios
/// into affine points over one common denominator, which is returned in
/// `globalz`.
///
/// `zr[i]` must hold `a[i].z / a[i-1].z`; the final point's own Z becomes
/// the global denominator.
pub fn globalz_set_table_gej(
    r: &mut [Affine],
    globalz: &mut FieldElement,
    a: &[Jacobian],
    zr: &[FieldElement],
) {
    debug_assert!(r.len() == a.len() && a.len() == zr.len());

    let len = a.len();
    if len == 0 {
        return;
    }

    let mut i = len - 1;
    r[i].x = a[i].x;
    r[i].y = a[i].y;
    r[i].infinity = false;
    *globalz = a[i].z;
    let mut zs = zr[i];

    while i > 0 {
        if i != len - 1 {
            zs = zs.mul(&zr[i]);
        }
        i -= 1;
        let (ri, ai) = (&mut r[i], &a[i]);
        ri.set_gej_zinv(ai, &zs);
    }
}
