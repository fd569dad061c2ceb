use secp256k1zkp::ecdsa::{self, Message};
use secp256k1zkp::hash::sha256;
use secp256k1zkp::{Context, PublicKey, SecretKey, context};

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

pub fn bench_sign(c: &mut Criterion) {
    let ctx = Context::new(context::SIGN);
    let sk = SecretKey::parse(&[0x42; 32]).unwrap();
    let msg = Message::parse(&sha256(b"bench message"));

    c.bench_function("ecdsa sign", |b| {
        b.iter(|| ecdsa::sign(&ctx, black_box(&msg), black_box(&sk)).unwrap())
    });
}

pub fn bench_verify(c: &mut Criterion) {
    let ctx = Context::new(context::SIGN | context::VERIFY);
    let sk = SecretKey::parse(&[0x42; 32]).unwrap();
    let pk = PublicKey::from_secret_key(&ctx, &sk);
    let msg = Message::parse(&sha256(b"bench message"));
    let (sig, _) = ecdsa::sign(&ctx, &msg, &sk).unwrap();

    c.bench_function("ecdsa verify", |b| {
        b.iter(|| ecdsa::verify(&ctx, black_box(&msg), black_box(&sig), black_box(&pk)).unwrap())
    });
}

criterion_group!(benches, bench_sign, bench_verify);
criterion_main!(benches);
