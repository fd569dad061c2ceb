use secp256k1zkp::scalar::{LAMBDA, Scalar, split_lambda};

/// The group order n, big endian.
const N: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

fn scalar(bytes: &[u8; 32]) -> Scalar {
    let mut s = Scalar::ZERO;
    assert!(!s.set_b32(bytes), "input must be canonical");
    s
}

#[test]
fn scalar_round_trip_below_n() {
    let mut bytes = [0u8; 32];
    bytes[0] = 0x7F;
    bytes[31] = 0x55;
    let s = scalar(&bytes);
    assert_eq!(s.b32(), bytes);
}

#[test]
fn scalar_overflow_reduces_mod_n() {
    // n itself reduces to zero, with the overflow reported.
    let mut s = Scalar::ZERO;
    assert!(s.set_b32(&N));
    assert!(s.is_zero());

    // n + 5 reduces to 5.
    let mut bytes = N;
    bytes[31] += 5;
    let mut s = Scalar::ZERO;
    assert!(s.set_b32(&bytes));
    assert_eq!(s.b32(), Scalar::from_u64(5).b32());
}

#[test]
fn scalar_add_wraps_mod_n() {
    // (n - 1) + 2 = 1.
    let mut n_minus_one = N;
    n_minus_one[31] -= 1;
    let a = scalar(&n_minus_one);
    let b = Scalar::from_u64(2);

    let mut sum = a;
    let wrapped = sum.add_assign_scalar(&b);
    assert!(wrapped);
    assert_eq!(sum.b32(), Scalar::ONE.b32());
}

#[test]
fn scalar_negate_cancels() {
    let mut bytes = [0u8; 32];
    bytes[10] = 0xDE;
    bytes[31] = 0x03;
    let a = scalar(&bytes);

    let mut sum = a.neg();
    let wrapped = sum.add_assign_scalar(&a);
    assert!(wrapped || sum.is_zero());
    assert!(sum.is_zero());

    assert!(Scalar::ZERO.neg().is_zero());
}

#[test]
fn scalar_mul_matches_small_integers() {
    let a = Scalar::from_u64(0xFFFF_FFFF);
    let b = Scalar::from_u64(0x1_0001);
    let prod = a.mul(&b);
    assert_eq!(prod.b32(), Scalar::from_u64(0xFFFF_FFFF * 0x1_0001).b32());
}

#[test]
fn scalar_inverse() {
    let mut bytes = [0u8; 32];
    bytes[3] = 0x99;
    bytes[31] = 0x01;
    let a = scalar(&bytes);

    let prod = a.mul(&a.inverse());
    assert!(prod.is_one());

    assert!(Scalar::ZERO.inverse().is_zero());
}

#[test]
fn scalar_is_high_flips_under_negation() {
    let low = Scalar::from_u64(12345);
    assert!(!low.is_high());
    assert!(low.neg().is_high());

    assert!(!Scalar::ZERO.is_high());
    assert!(!Scalar::ONE.is_high());
}

#[test]
fn scalar_parity() {
    assert!(Scalar::ZERO.is_even());
    assert!(!Scalar::ONE.is_even());
    assert!(Scalar::from_u64(42).is_even());
}

#[test]
fn scalar_bit_extraction() {
    let s = Scalar::from_u64(0b1011_0110);
    assert_eq!(s.bits(0, 4), 0b0110);
    assert_eq!(s.bits(4, 4), 0b1011);
    assert_eq!(s.bits_var(3, 5), 0b10110);
    assert_eq!(s.bits_var(62, 4), 0);
}

#[test]
fn scalar_shr_int() {
    let mut s = Scalar::from_u64(0b1011_0110);
    let out = s.shr_int(4);
    assert_eq!(out, 0b0110);
    assert_eq!(s.b32(), Scalar::from_u64(0b1011).b32());
}

#[test]
fn lambda_split_recombines() {
    let mut bytes = [0u8; 32];
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = (i as u8).wrapping_mul(37).wrapping_add(11);
    }
    bytes[0] &= 0x7F;
    let k = scalar(&bytes);

    let (k1, k2) = split_lambda(&k);
    // k = k1 + k2·λ (mod n)
    let recombined = k1.add(&k2.mul(&LAMBDA));
    assert_eq!(recombined.b32(), k.b32());

    // Both halves (or their negations) fit in roughly 128 bits.
    for half in [k1, k2] {
        let small = if half.is_high() { half.neg() } else { half };
        let b = small.b32();
        assert!(b[..15].iter().all(|&x| x == 0), "split half too large");
    }
}
