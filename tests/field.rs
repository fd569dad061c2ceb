use secp256k1zkp::field::FieldElement;

/// p − 1, the largest canonical field element.
const P_MINUS_ONE: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE, 0xFF, 0xFF,
    0xFC, 0x2E,
];

fn fe(bytes: &[u8; 32]) -> FieldElement {
    let mut f = FieldElement::default();
    assert!(f.set_b32(bytes), "input must be canonical");
    f
}

#[test]
fn field_round_trip() {
    let mut bytes = [0u8; 32];
    bytes[31] = 1;
    bytes[0] = 0x7F;
    let f = fe(&bytes);
    assert_eq!(f.b32(), bytes);

    let f = fe(&P_MINUS_ONE);
    assert_eq!(f.b32(), P_MINUS_ONE);
}

#[test]
fn field_overflow_reported_iff_not_below_p() {
    let mut f = FieldElement::default();
    assert!(f.set_b32(&P_MINUS_ONE));

    // p itself and p + 1 overflow.
    let mut p = P_MINUS_ONE;
    p[31] = 0x2F;
    assert!(!f.set_b32(&p));
    p[31] = 0x30;
    assert!(!f.set_b32(&p));

    // All-ones overflows.
    assert!(!f.set_b32(&[0xFF; 32]));
}

#[test]
fn field_add_mul_agree_with_small_integers() {
    let a = FieldElement::from_int(1234);
    let b = FieldElement::from_int(4321);

    let mut sum = a;
    sum += &b;
    sum.normalize();
    assert_eq!(sum.b32(), FieldElement::from_int(5555).b32());

    let mut prod = a.mul(&b);
    prod.normalize();
    assert_eq!(prod.b32(), FieldElement::from_int(1234 * 4321).b32());

    let mut sq = a.sqr();
    sq.normalize();
    assert_eq!(sq.b32(), FieldElement::from_int(1234 * 1234).b32());
}

#[test]
fn field_negation_cancels() {
    let a = fe(&P_MINUS_ONE);
    let mut sum = a.neg(1);
    sum += &a;
    assert!(sum.normalizes_to_zero());
}

#[test]
fn field_inverse() {
    let mut bytes = [0u8; 32];
    bytes[5] = 0xAB;
    bytes[31] = 0x0D;
    let a = fe(&bytes);

    let mut prod = a.mul(&a.inv());
    prod.normalize();
    assert_eq!(prod.b32(), FieldElement::ONE.b32());

    // The inverse of zero is zero by convention.
    let mut zero_inv = FieldElement::ZERO.inv();
    zero_inv.normalize();
    assert!(zero_inv.is_zero());
}

#[test]
fn field_sqrt_of_square_succeeds() {
    let mut bytes = [0u8; 32];
    bytes[7] = 0x11;
    bytes[30] = 0x42;
    let k = fe(&bytes);
    let square = k.sqr();

    let (root, ok) = square.sqrt();
    assert!(ok, "a square must be a quadratic residue");

    // The root is ±k.
    let mut root_sq = root.sqr();
    root_sq.normalize();
    let mut k_sq = square;
    k_sq.normalize();
    assert_eq!(root_sq.b32(), k_sq.b32());
}

#[test]
fn field_sqrt_of_non_residue_fails() {
    // Either c or -c is a non-residue for any c with c a residue times
    // a non-residue; try a handful of small constants and require at
    // least one failure (p ≡ 3 mod 4 makes exactly one of {c, -c} a
    // residue for c ≠ 0).
    let c = FieldElement::from_int(5);
    let minus_c = {
        let mut m = c.neg(1);
        m.normalize();
        m
    };
    let ok_pos = c.sqrt().1;
    let ok_neg = minus_c.sqrt().1;
    assert!(ok_pos != ok_neg, "exactly one of c and -c has a root");
}

#[test]
fn field_cmov_selects_branchlessly() {
    let a = FieldElement::from_int(1);
    let b = FieldElement::from_int(2);

    let mut r = a;
    r.cmov(&b, false);
    assert_eq!(r.b32(), a.b32());
    r.cmov(&b, true);
    assert_eq!(r.b32(), b.b32());
}

#[test]
fn field_normalize_weak_preserves_value() {
    let a = fe(&P_MINUS_ONE);
    let mut sum = a;
    sum += &a;
    sum += &a;

    let mut weak = sum;
    weak.normalize_weak();
    let mut full = sum;
    full.normalize();

    // Weak and full normalization agree once the weak result is fully
    // normalized too.
    weak.normalize();
    assert_eq!(weak.b32(), full.b32());
}

#[test]
fn field_storage_round_trip() {
    let mut f = fe(&P_MINUS_ONE);
    f.normalize();
    let s = f.to_storage();
    let back = FieldElement::from_storage(&s);
    assert_eq!(back.b32(), f.b32());
}
