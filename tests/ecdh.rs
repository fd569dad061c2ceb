use secp256k1zkp::ecdh::{SharedSecret, point_multiply};
use secp256k1zkp::{Context, PublicKey, SecretKey, context};

fn test_context() -> Context {
    Context::new(context::SIGN)
}

#[test]
fn point_multiplication_commutes() {
    let ctx = test_context();
    let a = SecretKey::parse(&[0x0A; 32]).unwrap();
    let b = SecretKey::parse(&[0x0B; 32]).unwrap();

    let pub_a = PublicKey::from_secret_key(&ctx, &a);
    let pub_b = PublicKey::from_secret_key(&ctx, &b);

    let ab = point_multiply(&pub_b, &a).unwrap();
    let ba = point_multiply(&pub_a, &b).unwrap();
    assert_eq!(ab.serialize(), ba.serialize());

    // And both equal (a·b)·G.
    let mut prod = a.clone();
    prod.tweak_mul(&b.serialize()).unwrap();
    let direct = PublicKey::from_secret_key(&ctx, &prod);
    assert_eq!(ab.serialize(), direct.serialize());
}

#[test]
fn shared_secrets_agree() {
    let ctx = test_context();
    let a = SecretKey::parse(&[0x51; 32]).unwrap();
    let b = SecretKey::parse(&[0x52; 32]).unwrap();

    let pub_a = PublicKey::from_secret_key(&ctx, &a);
    let pub_b = PublicKey::from_secret_key(&ctx, &b);

    let ab = SharedSecret::new(&pub_b, &a).unwrap();
    let ba = SharedSecret::new(&pub_a, &b).unwrap();
    assert_eq!(ab, ba);
    assert_eq!(ab.as_ref().len(), 32);
}

#[test]
fn multiply_by_one_is_identity() {
    let ctx = test_context();
    let one = {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        SecretKey::parse(&bytes).unwrap()
    };
    let k = SecretKey::parse(&[0x66; 32]).unwrap();
    let pk = PublicKey::from_secret_key(&ctx, &k);

    let product = point_multiply(&pk, &one).unwrap();
    assert_eq!(product.serialize(), pk.serialize());
}
