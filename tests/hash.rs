use secp256k1zkp::hash::{HmacSha256, Rfc6979HmacSha256, Sha256, sha256};

use sha2::Digest;

#[test]
fn sha256_empty_input() {
    assert_eq!(
        hex::encode(sha256(b"")),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn sha256_abc() {
    assert_eq!(
        hex::encode(sha256(b"abc")),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn sha256_matches_reference_implementation() {
    // Exercise every padding branch: short, block-boundary-straddling
    // and multi-block inputs.
    for len in [0usize, 1, 54, 55, 56, 63, 64, 65, 119, 127, 128, 1000] {
        let data: Vec<u8> = (0..len).map(|i| (i * 31 + 7) as u8).collect();
        let expected: [u8; 32] = sha2::Sha256::digest(&data).into();
        assert_eq!(sha256(&data), expected, "mismatch at length {len}");
    }
}

#[test]
fn sha256_streaming_matches_one_shot() {
    let data: Vec<u8> = (0..300).map(|i| (i * 13) as u8).collect();

    let mut h = Sha256::new();
    for chunk in data.chunks(7) {
        h.write(chunk);
    }
    assert_eq!(h.finalize(), sha256(&data));
}

#[test]
fn hmac_rfc4231_case_1() {
    let mut mac = HmacSha256::new(&[0x0B; 20]);
    mac.write(b"Hi There");
    assert_eq!(
        hex::encode(mac.finalize()),
        "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
    );
}

#[test]
fn hmac_rfc4231_case_2() {
    let mut mac = HmacSha256::new(b"Jefe");
    mac.write(b"what do ya want for nothing?");
    assert_eq!(
        hex::encode(mac.finalize()),
        "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
    );
}

#[test]
fn hmac_long_key_is_hashed_down() {
    // Keys over one block must give the same tag as their digest.
    let long_key = [0xAA; 131];
    let mut direct = HmacSha256::new(&long_key);
    direct.write(b"message");
    let digest_key = sha256(&long_key);
    let mut via_digest = HmacSha256::new(&digest_key);
    via_digest.write(b"message");
    assert_eq!(direct.finalize(), via_digest.finalize());
}

#[test]
fn rfc6979_stream_is_deterministic() {
    let mut a = Rfc6979HmacSha256::new(b"some fixed key material");
    let mut b = Rfc6979HmacSha256::new(b"some fixed key material");

    let mut out_a = [0u8; 96];
    let mut out_b = [0u8; 96];
    a.generate(&mut out_a);
    b.generate(&mut out_b);
    assert_eq!(out_a, out_b);

    // Subsequent draws continue the same stream and differ from the
    // first draw.
    let mut next_a = [0u8; 96];
    let mut next_b = [0u8; 96];
    a.generate(&mut next_a);
    b.generate(&mut next_b);
    assert_eq!(next_a, next_b);
    assert_ne!(out_a, next_a);

    a.finalize();
    b.finalize();
}

#[test]
fn rfc6979_streams_with_different_keys_diverge() {
    let mut a = Rfc6979HmacSha256::new(b"key material A");
    let mut b = Rfc6979HmacSha256::new(b"key material B");

    let mut out_a = [0u8; 32];
    let mut out_b = [0u8; 32];
    a.generate(&mut out_a);
    b.generate(&mut out_b);
    assert_ne!(out_a, out_b);

    a.finalize();
    b.finalize();
}
