use secp256k1zkp::pedersen::commit;
use secp256k1zkp::rangeproof;
use secp256k1zkp::{Context, context};

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

pub fn bench_commit(c: &mut Criterion) {
    let ctx = Context::new(context::SIGN | context::COMMIT);
    let blind = [0x24; 32];

    c.bench_function("pedersen commit", |b| {
        b.iter(|| commit(&ctx, black_box(&blind), black_box(123_456_789)).unwrap())
    });
}

pub fn bench_rangeproof(c: &mut Criterion) {
    let ctx = Context::new(context::RANGEPROOF);
    let blind = [0x24; 32];
    let nonce = [0x59; 32];
    let value = 123_456_789u64;
    let commitment = commit(&ctx, &blind, value).unwrap();
    let proof = rangeproof::sign(&ctx, 0, &commitment, &blind, &nonce, 0, 32, value, &[], &[])
        .unwrap();

    c.bench_function("rangeproof sign 32-bit", |b| {
        b.iter(|| {
            rangeproof::sign(
                &ctx,
                0,
                black_box(&commitment),
                black_box(&blind),
                &nonce,
                0,
                32,
                value,
                &[],
                &[],
            )
            .unwrap()
        })
    });

    c.bench_function("rangeproof verify 32-bit", |b| {
        b.iter(|| rangeproof::verify(&ctx, black_box(&commitment), black_box(&proof), &[]).unwrap())
    });
}

criterion_group!(benches, bench_commit, bench_rangeproof);
criterion_main!(benches);
