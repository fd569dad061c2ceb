use secp256k1zkp::{Context, Error, PublicKey, SecretKey, context};

fn test_context() -> Context {
    Context::new(context::SIGN | context::VERIFY)
}

/// Compressed encoding of the generator.
const G_COMPRESSED: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

#[test]
fn pubkey_of_one_is_the_generator() {
    let ctx = test_context();
    let mut sk_bytes = [0u8; 32];
    sk_bytes[31] = 1;
    let sk = SecretKey::parse(&sk_bytes).unwrap();
    let pk = PublicKey::from_secret_key(&ctx, &sk);
    assert_eq!(hex::encode(pk.serialize()), G_COMPRESSED);
}

#[test]
fn seckey_parse_rejects_zero_and_order() {
    assert_eq!(SecretKey::parse(&[0u8; 32]), Err(Error::InvalidSecretKey));

    let n: [u8; 32] = hex::decode("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141")
        .unwrap()
        .try_into()
        .unwrap();
    assert_eq!(SecretKey::parse(&n), Err(Error::InvalidSecretKey));

    let mut n_minus_one = n;
    n_minus_one[31] -= 1;
    assert!(SecretKey::parse(&n_minus_one).is_ok());
}

#[test]
fn pubkey_parse_all_formats() {
    let ctx = test_context();
    let sk = SecretKey::parse(&[0x11; 32]).unwrap();
    let pk = PublicKey::from_secret_key(&ctx, &sk);

    let compressed = pk.serialize();
    let uncompressed = pk.serialize_uncompressed();

    let from_compressed = PublicKey::parse(&compressed).unwrap();
    assert_eq!(from_compressed.serialize(), compressed);

    let from_uncompressed = PublicKey::parse(&uncompressed).unwrap();
    assert_eq!(from_uncompressed.serialize(), compressed);

    // Hybrid form: 0x06/0x07 by y parity, same coordinate payload.
    let mut hybrid = uncompressed;
    hybrid[0] = 0x06 | (compressed[0] & 1);
    let from_hybrid = PublicKey::parse(&hybrid).unwrap();
    assert_eq!(from_hybrid.serialize(), compressed);
}

#[test]
fn pubkey_parse_rejects_malformed() {
    let ctx = test_context();
    let sk = SecretKey::parse(&[0x12; 32]).unwrap();
    let pk = PublicKey::from_secret_key(&ctx, &sk);
    let compressed = pk.serialize();
    let uncompressed = pk.serialize_uncompressed();

    // Bad prefix.
    let mut bad = compressed;
    bad[0] = 0x05;
    assert!(PublicKey::parse(&bad).is_err());

    // Wrong length.
    assert!(PublicKey::parse(&compressed[..32]).is_err());

    // Hybrid with mismatched parity.
    let mut hybrid = uncompressed;
    hybrid[0] = 0x06 | ((compressed[0] & 1) ^ 1);
    assert!(PublicKey::parse(&hybrid).is_err());

    // Uncompressed point off the curve.
    let mut off = uncompressed;
    off[64] ^= 1;
    assert!(PublicKey::parse(&off).is_err());
}

#[test]
fn tweak_add_linearity() {
    let ctx = test_context();
    let sk = SecretKey::parse(&[0x21; 32]).unwrap();
    let tweak = [0x07; 32];

    let mut tweaked_sk = sk.clone();
    tweaked_sk.tweak_add(&tweak).unwrap();
    let from_secret = PublicKey::from_secret_key(&ctx, &tweaked_sk);

    let mut tweaked_pk = PublicKey::from_secret_key(&ctx, &sk);
    tweaked_pk.tweak_add(&ctx, &tweak).unwrap();

    assert_eq!(from_secret.serialize(), tweaked_pk.serialize());
}

#[test]
fn tweak_mul_linearity() {
    let ctx = test_context();
    let sk = SecretKey::parse(&[0x23; 32]).unwrap();
    let mut tweak = [0u8; 32];
    tweak[31] = 3;
    tweak[15] = 0x5D;

    let mut tweaked_sk = sk.clone();
    tweaked_sk.tweak_mul(&tweak).unwrap();
    let from_secret = PublicKey::from_secret_key(&ctx, &tweaked_sk);

    let mut tweaked_pk = PublicKey::from_secret_key(&ctx, &sk);
    tweaked_pk.tweak_mul(&ctx, &tweak).unwrap();

    assert_eq!(from_secret.serialize(), tweaked_pk.serialize());
}

#[test]
fn tweak_with_complement_fails() {
    let ctx = test_context();
    let sk = SecretKey::parse(&[0x31; 32]).unwrap();

    // n − d: adding it to d gives zero, adding its point gives
    // infinity. Both sides must refuse.
    let mut complement = sk.clone();
    complement.negate();
    let complement_bytes = complement.serialize();

    let mut tweaked = sk.clone();
    assert_eq!(tweaked.tweak_add(&complement_bytes), Err(Error::InvalidTweak));

    let mut pk = PublicKey::from_secret_key(&ctx, &sk);
    assert_eq!(pk.tweak_add(&ctx, &complement_bytes), Err(Error::InvalidTweak));
}

#[test]
fn tweak_rejects_out_of_range_and_zero_mul() {
    let sk = SecretKey::parse(&[0x35; 32]).unwrap();

    let mut over = [0xFF; 32];
    let mut tweaked = sk.clone();
    assert_eq!(tweaked.tweak_add(&over), Err(Error::InvalidTweak));
    assert_eq!(tweaked.tweak_mul(&over), Err(Error::InvalidTweak));

    over = [0u8; 32];
    let mut tweaked = sk.clone();
    assert_eq!(tweaked.tweak_mul(&over), Err(Error::InvalidTweak));
    // A zero additive tweak is a no-op but legal.
    assert!(tweaked.tweak_add(&over).is_ok());
    assert_eq!(tweaked.serialize(), sk.serialize());
}

#[test]
fn der_export_import_round_trip() {
    let ctx = test_context();
    let sk = SecretKey::parse(&[0x41; 32]).unwrap();

    let compressed = sk.export_der(&ctx, true);
    assert_eq!(compressed.len(), 214);
    assert_eq!(&compressed[..2], &[0x30, 0x81]);
    let back = SecretKey::import_der(&compressed).unwrap();
    assert_eq!(back.serialize(), sk.serialize());

    let uncompressed = sk.export_der(&ctx, false);
    assert_eq!(uncompressed.len(), 279);
    assert_eq!(&uncompressed[..2], &[0x30, 0x82]);
    let back = SecretKey::import_der(&uncompressed).unwrap();
    assert_eq!(back.serialize(), sk.serialize());
}

#[test]
fn der_import_rejects_garbage() {
    assert!(SecretKey::import_der(&[]).is_err());
    assert!(SecretKey::import_der(&[0x30, 0x81]).is_err());
    assert!(SecretKey::import_der(&[0x02, 0x01, 0x01]).is_err());
}

#[test]
fn random_keys_are_valid() {
    let mut rng = rand::thread_rng();
    for _ in 0..8 {
        let sk = SecretKey::random(&mut rng);
        assert!(SecretKey::parse(&sk.serialize()).is_ok());
    }
}
