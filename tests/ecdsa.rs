use secp256k1zkp::ecdsa::{self, Message, RecoveryId, Rfc6979ExtraNonce, Signature};
use secp256k1zkp::hash::sha256;
use secp256k1zkp::{Context, Error, PublicKey, SecretKey, context};

fn test_context() -> Context {
    Context::new(context::SIGN | context::VERIFY)
}

fn keypair(ctx: &Context, byte: u8) -> (SecretKey, PublicKey) {
    let sk = SecretKey::parse(&[byte; 32]).expect("valid key");
    let pk = PublicKey::from_secret_key(ctx, &sk);
    (sk, pk)
}

#[test]
fn sign_and_verify() {
    let ctx = test_context();
    let (sk, pk) = keypair(&ctx, 0x01);
    let msg = Message::parse(&sha256(b"abc"));

    let (sig, _recid) = ecdsa::sign(&ctx, &msg, &sk).expect("signing succeeds");
    assert!(ecdsa::verify(&ctx, &msg, &sig, &pk).is_ok());

    // A different message must not verify.
    let other = Message::parse(&sha256(b"abd"));
    assert_eq!(ecdsa::verify(&ctx, &other, &sig, &pk), Err(Error::InvalidSignature));

    // A corrupted signature must not verify.
    let mut bytes = sig.serialize_compact();
    bytes[17] ^= 0x20;
    let bad = Signature::parse_compact(&bytes);
    assert_eq!(ecdsa::verify(&ctx, &msg, &bad, &pk), Err(Error::InvalidSignature));
}

#[test]
fn signing_is_deterministic() {
    let ctx = test_context();
    let (sk, _) = keypair(&ctx, 0x42);
    let msg = Message::parse(&sha256(b"determinism"));

    let (sig1, recid1) = ecdsa::sign(&ctx, &msg, &sk).unwrap();
    let (sig2, recid2) = ecdsa::sign(&ctx, &msg, &sk).unwrap();
    assert_eq!(sig1, sig2);
    assert_eq!(recid1, recid2);

    // Extra entropy changes the signature but not its validity.
    let pk = PublicKey::from_secret_key(&ctx, &sk);
    let (sig3, _) =
        ecdsa::sign_with_nonce(&ctx, &msg, &sk, &Rfc6979ExtraNonce([0xAB; 32])).unwrap();
    assert_ne!(sig1, sig3);
    assert!(ecdsa::verify(&ctx, &msg, &sig3, &pk).is_ok());
}

#[test]
fn signatures_are_low_s() {
    let ctx = test_context();
    let (sk, pk) = keypair(&ctx, 0x33);

    for i in 0u8..8 {
        let msg = Message::parse(&sha256(&[i]));
        let (mut sig, _) = ecdsa::sign(&ctx, &msg, &sk).unwrap();
        assert!(!sig.s.is_high(), "signing must produce low-S");
        assert!(!sig.normalize_s());

        // The high-S sibling verifies the same equation but must be
        // rejected.
        let mut high = sig;
        high.s = high.s.neg();
        assert_eq!(ecdsa::verify(&ctx, &msg, &high, &pk), Err(Error::InvalidSignature));
    }
}

#[test]
fn recovery_round_trip() {
    let ctx = test_context();
    let (sk, pk) = keypair(&ctx, 0x77);

    for i in 0u8..4 {
        let msg = Message::parse(&sha256(&[0xF0 | i]));
        let (sig, recid) = ecdsa::sign(&ctx, &msg, &sk).unwrap();
        let recovered = ecdsa::recover(&ctx, &msg, &sig, recid).expect("recovery succeeds");
        assert_eq!(recovered.serialize(), pk.serialize());
    }
}

#[test]
fn recovery_with_wrong_id_gives_wrong_key() {
    let ctx = test_context();
    let (sk, pk) = keypair(&ctx, 0x55);
    let msg = Message::parse(&sha256(b"recid"));

    let (sig, recid) = ecdsa::sign(&ctx, &msg, &sk).unwrap();
    let flipped = RecoveryId::parse(recid.serialize() ^ 1).unwrap();
    match ecdsa::recover(&ctx, &msg, &sig, flipped) {
        Ok(other) => assert_ne!(other.serialize(), pk.serialize()),
        Err(e) => assert_eq!(e, Error::InvalidRecoveryId),
    }

    assert!(RecoveryId::parse(4).is_err());
}

#[test]
fn der_round_trip() {
    let ctx = test_context();
    let (sk, _) = keypair(&ctx, 0x29);
    let msg = Message::parse(&sha256(b"der"));

    let (sig, _) = ecdsa::sign(&ctx, &msg, &sk).unwrap();
    let der = sig.serialize_der();
    assert!(der.len() <= 72);
    assert_eq!(der[0], 0x30);
    let parsed = Signature::parse_der(&der).expect("own encoding parses");
    assert_eq!(parsed, sig);
}

#[test]
fn der_rejects_malformed_encodings() {
    let ctx = test_context();
    let (sk, _) = keypair(&ctx, 0x2A);
    let msg = Message::parse(&sha256(b"der-neg"));
    let (sig, _) = ecdsa::sign(&ctx, &msg, &sk).unwrap();
    let der = sig.serialize_der();

    // Truncation.
    assert!(Signature::parse_der(&der[..der.len() - 1]).is_err());
    // Trailing garbage.
    let mut extended = der.clone();
    extended.push(0);
    assert!(Signature::parse_der(&extended).is_err());
    // Wrong outer tag.
    let mut wrong = der.clone();
    wrong[0] = 0x31;
    assert!(Signature::parse_der(&wrong).is_err());
    // Non-minimal integer: inject a padding zero into r.
    let mut padded = Vec::new();
    padded.push(0x30);
    padded.push(der[1] + 1);
    padded.push(0x02);
    padded.push(der[3] + 1);
    padded.push(0x00);
    padded.extend_from_slice(&der[4..]);
    assert!(Signature::parse_der(&padded).is_err());
}

#[test]
fn compact_round_trip() {
    let ctx = test_context();
    let (sk, _) = keypair(&ctx, 0x61);
    let msg = Message::parse(&sha256(b"compact"));

    let (sig, _) = ecdsa::sign(&ctx, &msg, &sk).unwrap();
    let compact = sig.serialize_compact();
    assert_eq!(Signature::parse_compact(&compact), sig);
}

#[test]
fn randomized_context_signs_identically() {
    let mut ctx = Context::new(context::SIGN | context::VERIFY);
    let (sk, pk) = keypair(&ctx, 0x13);
    let msg = Message::parse(&sha256(b"blinding"));

    let (before, _) = ecdsa::sign(&ctx, &msg, &sk).unwrap();
    ctx.randomize(&[0x5A; 32]);
    let (after, _) = ecdsa::sign(&ctx, &msg, &sk).unwrap();

    // Blinding is an implementation detail; signatures cannot change.
    assert_eq!(before, after);
    assert!(ecdsa::verify(&ctx, &msg, &after, &pk).is_ok());
}
