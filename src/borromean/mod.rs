//! Borromean ring signatures.
//!
//! A compact multi-ring signature: `nrings` rings run concurrently and
//! share a single closing challenge `e0`, so the signature is one
//! 32-byte challenge plus one 32-byte `s` per ring member.
//!
//! Verification recomputes, for each ring `i` with per-member chained
//! challenges,
//!
//! ```text
//! e(i,0) = H(e0 ‖ m ‖ i ‖ 0)
//! R(i,j) = s(i,j)·G + e(i,j)·P(i,j)
//! e(i,j+1) = H(R(i,j) ‖ m ‖ i ‖ j+1)
//! ```
//!
//! and accepts iff `H(R(0,last) ‖ … ‖ R(n−1,last) ‖ m) = e0`. The signer
//! knows one secret key per ring; the members after the known index are
//! forged forward from the nonce point, `e0` closes over the final
//! R-points, and the known member's `s` is then solved as
//! `s = k − e·sec`.
//!
//! Signing is not memory-uniform across ring members: which member is
//! the non-forgery can show up in cache behavior. That is a privacy
//! concern only; the secret keys themselves stay on constant-time
//! scalar and fixed-base paths.

use zeroize::Zeroize;

use crate::context::Context;
use crate::group::{Affine, Jacobian};
use crate::hash::Sha256;
use crate::keys::serialize_compressed;
use crate::scalar::Scalar;

/// The per-member challenge hash: `H(e ‖ m ‖ ridx ‖ eidx)` with 4-byte
/// big-endian indices.
pub fn borromean_hash(m: &[u8; 32], e: &[u8], ridx: u32, eidx: u32) -> [u8; 32] {
    let mut sha = Sha256::new();
    sha.write(e);
    sha.write(m);
    sha.write(&ridx.to_be_bytes());
    sha.write(&eidx.to_be_bytes());
    sha.finalize()
}

/// Computes `s·G + e·P` and serializes it, failing on infinity.
fn member_point(ctx: &Context, pubkey: &Affine, e: &Scalar, s: &Scalar) -> Option<[u8; 33]> {
    let mut pubj = Jacobian::default();
    pubj.set_ge(pubkey);
    let rgej = ctx.ecmult().ecmult(&pubj, e, s);
    if rgej.is_infinity() {
        return None;
    }
    let mut rge = Affine::default();
    rge.set_gej_var(&rgej);
    Some(serialize_compressed(&rge))
}

/// Signs `nrings` concurrent rings over message `m`.
///
/// - `s` holds one slot per ring member; the forged members must be
///   pre-filled with the signer's random values and the slots at
///   `secidx` are written by this function.
/// - `k` holds one nonce per ring, `sec` one secret key per ring.
///
/// Returns the closing challenge `e0`, or `None` when a degenerate
/// challenge or point forces the caller to retry with fresh randomness.
#[allow(clippy::too_many_arguments)]
pub fn borromean_sign(
    ctx: &Context,
    s: &mut [Scalar],
    pubs: &[Affine],
    k: &[Scalar],
    sec: &[Scalar],
    rsizes: &[usize],
    secidx: &[usize],
    m: &[u8; 32],
) -> Option<[u8; 32]> {
    debug_assert!(rsizes.len() == k.len());
    debug_assert!(rsizes.len() == sec.len());
    debug_assert!(rsizes.len() == secidx.len());
    debug_assert!(rsizes.iter().sum::<usize>() == pubs.len());
    debug_assert!(pubs.len() == s.len());

    // First pass: walk each ring forward from the nonce point, forging
    // the members after the known index, and close over the final
    // R-points.
    let mut sha_e0 = Sha256::new();
    let mut count = 0;
    for (i, &rsize) in rsizes.iter().enumerate() {
        let rgej = ctx.ecmult_gen().ecmult_gen(&k[i]);
        let mut rge = Affine::default();
        rge.set_gej(&rgej);
        let mut tmp = serialize_compressed(&rge);

        for j in secidx[i] + 1..rsize {
            let digest = borromean_hash(m, &tmp, i as u32, j as u32);
            let mut ens = Scalar::ZERO;
            let overflow = ens.set_b32(&digest);
            if overflow || ens.is_zero() {
                return None;
            }
            tmp = member_point(ctx, &pubs[count + j], &ens, &s[count + j])?;
        }
        sha_e0.write(&tmp);
        count += rsize;
    }
    sha_e0.write(m);
    let e0 = sha_e0.finalize();

    // Second pass: walk from e0 up to the known member of each ring and
    // solve its s.
    let mut count = 0;
    for (i, &rsize) in rsizes.iter().enumerate() {
        let digest = borromean_hash(m, &e0, i as u32, 0);
        let mut ens = Scalar::ZERO;
        let overflow = ens.set_b32(&digest);
        if overflow || ens.is_zero() {
            return None;
        }

        for j in 0..secidx[i] {
            let tmp = member_point(ctx, &pubs[count + j], &ens, &s[count + j])?;
            let digest = borromean_hash(m, &tmp, i as u32, j as u32 + 1);
            let overflow = ens.set_b32(&digest);
            if overflow || ens.is_zero() {
                return None;
            }
        }

        // s = k − e·sec closes the ring at the known member.
        let mut es = ens.mul(&sec[i]);
        let mut closing = es.neg();
        closing.add_assign_scalar(&k[i]);
        es.zeroize();
        if closing.is_zero() {
            return None;
        }
        s[count + secidx[i]] = closing;
        closing.zeroize();

        count += rsize;
    }
    Some(e0)
}

/// Verifies `nrings` concurrent rings against the closing challenge.
///
/// When `evalues` is provided it receives every per-member challenge,
/// in member order; proof rewinding consumes these.
pub fn borromean_verify(
    ctx: &Context,
    evalues: Option<&mut Vec<Scalar>>,
    e0: &[u8; 32],
    s: &[Scalar],
    pubs: &[Affine],
    rsizes: &[usize],
    m: &[u8; 32],
) -> bool {
    debug_assert!(rsizes.iter().sum::<usize>() == pubs.len());
    debug_assert!(pubs.len() == s.len());

    let mut ev = evalues;
    let mut sha_e0 = Sha256::new();
    let mut count = 0;
    for (i, &rsize) in rsizes.iter().enumerate() {
        let digest = borromean_hash(m, e0, i as u32, 0);
        let mut ens = Scalar::ZERO;
        let mut overflow = ens.set_b32(&digest);

        for j in 0..rsize {
            if overflow || ens.is_zero() || s[count + j].is_zero() || pubs[count + j].is_infinity()
            {
                return false;
            }
            if let Some(list) = ev.as_deref_mut() {
                list.push(ens);
            }
            let Some(serialized) = member_point(ctx, &pubs[count + j], &ens, &s[count + j]) else {
                return false;
            };
            if j != rsize - 1 {
                let digest = borromean_hash(m, &serialized, i as u32, j as u32 + 1);
                overflow = ens.set_b32(&digest);
            } else {
                sha_e0.write(&serialized);
            }
        }
        count += rsize;
    }
    sha_e0.write(m);
    let computed = sha_e0.finalize();

    // Public data; a plain comparison is fine here.
    computed == *e0
}
