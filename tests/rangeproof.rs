use secp256k1zkp::pedersen::commit;
use secp256k1zkp::rangeproof;
use secp256k1zkp::{Context, Error, context};

fn test_context() -> Context {
    Context::new(context::RANGEPROOF)
}

fn blind(byte: u8) -> [u8; 32] {
    let mut b = [0u8; 32];
    b[31] = byte;
    b[7] = byte.wrapping_add(13);
    b
}

#[test]
fn thirty_two_bit_proof_verifies() {
    let ctx = test_context();
    let b = blind(1);
    let nonce = [0x17; 32];
    let value = 100u64;

    let commitment = commit(&ctx, &b, value).unwrap();
    let proof =
        rangeproof::sign(&ctx, 0, &commitment, &b, &nonce, 0, 32, value, &[], &[]).unwrap();
    assert!(proof.len() <= 5134);

    let (min, max) = rangeproof::verify(&ctx, &commitment, &proof, &[]).unwrap();
    assert_eq!(min, 0);
    assert!(max >= (1u64 << 32) - 1);

    let info = rangeproof::info(&proof).unwrap();
    assert_eq!(info.exp, 0);
    assert!(info.mantissa >= 32);
    assert_eq!(info.min_value, 0);
    assert!(info.max_value >= (1u64 << 32) - 1);
}

#[test]
fn rewind_recovers_value_blind_and_message() {
    let ctx = test_context();
    let b = blind(2);
    let nonce = [0x23; 32];
    let value = 86_000u64;
    let message = b"when the going gets weird, the weird turn pro";

    let commitment = commit(&ctx, &b, value).unwrap();
    let proof =
        rangeproof::sign(&ctx, 0, &commitment, &b, &nonce, 0, 32, value, message, &[]).unwrap();

    let rewound = rangeproof::rewind(&ctx, &commitment, &proof, &nonce, &[]).unwrap();
    assert_eq!(rewound.value, value);
    assert_eq!(rewound.blind, b);
    assert_eq!(&rewound.message[..message.len()], message);
    assert!(rewound.message[message.len()..].iter().all(|&x| x == 0));
    assert_eq!(rewound.min_value, 0);
}

#[test]
fn rewind_with_wrong_nonce_fails() {
    let ctx = test_context();
    let b = blind(3);
    let nonce = [0x31; 32];
    let value = 42u64;

    let commitment = commit(&ctx, &b, value).unwrap();
    let proof =
        rangeproof::sign(&ctx, 0, &commitment, &b, &nonce, 0, 16, value, &[], &[]).unwrap();

    let wrong = [0x32; 32];
    assert_eq!(
        rangeproof::rewind(&ctx, &commitment, &proof, &wrong, &[]).err(),
        Some(Error::InvalidRangeProof)
    );
}

#[test]
fn tampering_invalidates_the_proof() {
    let ctx = test_context();
    let b = blind(4);
    let nonce = [0x47; 32];
    let value = 7777u64;

    let commitment = commit(&ctx, &b, value).unwrap();
    let proof =
        rangeproof::sign(&ctx, 0, &commitment, &b, &nonce, 0, 16, value, &[], &[]).unwrap();
    assert!(rangeproof::verify(&ctx, &commitment, &proof, &[]).is_ok());

    // Flip one bit anywhere past the header.
    for position in [proof.len() / 2, proof.len() - 1] {
        let mut bad = proof.clone();
        bad[position] ^= 0x04;
        assert!(
            rangeproof::verify(&ctx, &commitment, &bad, &[]).is_err(),
            "bit flip at {position} must invalidate"
        );
    }

    // Truncation fails structurally.
    assert!(rangeproof::verify(&ctx, &commitment, &proof[..proof.len() - 32], &[]).is_err());
}

#[test]
fn proof_binds_the_commitment() {
    let ctx = test_context();
    let b = blind(5);
    let nonce = [0x55; 32];

    let commitment = commit(&ctx, &b, 1234).unwrap();
    let other = commit(&ctx, &b, 1235).unwrap();
    let proof =
        rangeproof::sign(&ctx, 0, &commitment, &b, &nonce, 0, 16, 1234, &[], &[]).unwrap();

    assert!(rangeproof::verify(&ctx, &commitment, &proof, &[]).is_ok());
    assert!(rangeproof::verify(&ctx, &other, &proof, &[]).is_err());
}

#[test]
fn extra_commitment_data_is_bound() {
    let ctx = test_context();
    let b = blind(6);
    let nonce = [0x63; 32];

    let commitment = commit(&ctx, &b, 99).unwrap();
    let proof =
        rangeproof::sign(&ctx, 0, &commitment, &b, &nonce, 0, 8, 99, &[], b"side data").unwrap();

    assert!(rangeproof::verify(&ctx, &commitment, &proof, b"side data").is_ok());
    assert!(rangeproof::verify(&ctx, &commitment, &proof, b"other data").is_err());
    assert!(rangeproof::verify(&ctx, &commitment, &proof, &[]).is_err());
}

#[test]
fn exact_value_proof() {
    let ctx = test_context();
    let b = blind(7);
    let nonce = [0x71; 32];
    let value = 555_000u64;

    let commitment = commit(&ctx, &b, value).unwrap();
    let proof =
        rangeproof::sign(&ctx, 0, &commitment, &b, &nonce, -1, 0, value, &[], &[]).unwrap();

    let (min, max) = rangeproof::verify(&ctx, &commitment, &proof, &[]).unwrap();
    assert_eq!(min, value);
    assert_eq!(max, value);

    let rewound = rangeproof::rewind(&ctx, &commitment, &proof, &nonce, &[]).unwrap();
    assert_eq!(rewound.value, value);
    assert_eq!(rewound.blind, b);
    assert!(rewound.message.is_empty());
}

#[test]
fn nonzero_minimum_brackets_the_value() {
    let ctx = test_context();
    let b = blind(8);
    let nonce = [0x77; 32];
    let value = 10_000u64;
    let min_value = 9_000u64;

    let commitment = commit(&ctx, &b, value).unwrap();
    let proof = rangeproof::sign(
        &ctx, min_value, &commitment, &b, &nonce, 0, 10, value, &[], &[],
    )
    .unwrap();

    let (min, max) = rangeproof::verify(&ctx, &commitment, &proof, &[]).unwrap();
    assert_eq!(min, min_value);
    assert!(max >= value);

    let rewound = rangeproof::rewind(&ctx, &commitment, &proof, &nonce, &[]).unwrap();
    assert_eq!(rewound.value, value);
}

#[test]
fn base_ten_exponent_proofs() {
    let ctx = test_context();
    let b = blind(9);
    let nonce = [0x7A; 32];
    let value = 12_300u64;

    let commitment = commit(&ctx, &b, value).unwrap();
    let proof =
        rangeproof::sign(&ctx, 0, &commitment, &b, &nonce, 2, 8, value, &[], &[]).unwrap();

    let info = rangeproof::info(&proof).unwrap();
    assert_eq!(info.exp, 2);

    let (min, max) = rangeproof::verify(&ctx, &commitment, &proof, &[]).unwrap();
    assert!(min <= value && value <= max);

    let rewound = rangeproof::rewind(&ctx, &commitment, &proof, &nonce, &[]).unwrap();
    assert_eq!(rewound.value, value);
    assert_eq!(rewound.blind, b);
}

#[test]
fn message_too_long_is_rejected() {
    let ctx = test_context();
    let b = blind(10);
    let commitment = commit(&ctx, &b, 3).unwrap();

    // A two-bit range has a single ring and no message capacity.
    let big = [0u8; 64];
    assert!(
        rangeproof::sign(&ctx, 0, &commitment, &b, &[0x11; 32], 0, 2, 3, &big, &[]).is_err()
    );
}
