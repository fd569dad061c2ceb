//! Zero-knowledge range proofs over Pedersen commitments.
//!
//! A proof shows that a committed value lies in `[min_value,
//! min_value + (2^mantissa − 1)·10^exp]` without revealing it. The
//! mantissa `v = (value − min_value) / 10^exp` is decomposed into
//! base-4 digits; each digit position `i` gets its own Pedersen
//! sub-commitment `Cᵢ`, and a Borromean ring signature over the four
//! candidate keys `(Cᵢ, Cᵢ − 4ⁱ·s·H, Cᵢ − 2·4ⁱ·s·H, Cᵢ − 3·4ⁱ·s·H)`
//! (s the exponent scaling) proves each digit is in `{0,1,2,3}` —
//! exactly one candidate is `blindᵢ·G`, and only for that one can the
//! ring close. The digit blinds sum to the outer commitment's blind, so
//! the published sub-commitments (all but the last, which the verifier
//! derives) tie the rings to the commitment being proven.
//!
//! ## Proof layout
//!
//! ```text
//! header ‖ parity bitmap ‖ (rings−1)·32 sub-commitment x's ‖ e0 ‖ npub·32 s-values
//! ```
//!
//! Header byte 0 packs `0x40|exp` when a range is present and `0x20`
//! when a minimum is present; then the mantissa bit count minus one,
//! then the minimum as a big-endian integer whose width is implied by
//! the range ceiling (8 bytes for exact-value proofs). At most 5134
//! bytes in total.
//!
//! ## Rewinding
//!
//! All random values in the proof come from an RFC 6979 stream seeded
//! with `nonce ‖ commitment ‖ header`. Whoever knows the nonce can
//! replay the stream, solve the one non-forged member of each ring, and
//! recover the value, the blinding factor, and up to `128·(rings−1)`
//! bytes of message steganographically folded into the s-values. A
//! marker slot in the final ring (`0x80`, zero padding, the mantissa
//! bytes written three times) authenticates the value against a wrong
//! nonce.

use zeroize::Zeroize;

use crate::borromean::{borromean_sign, borromean_verify};
use crate::context::Context;
use crate::error::Error;
use crate::field::FieldElement;
use crate::group::{AFFINE_H, Affine, Jacobian, set_all_gej_var};
use crate::hash::{Rfc6979HmacSha256, Sha256};
use crate::keys::serialize_compressed;
use crate::pedersen::{Commitment, from_ge, pedersen_ecmult};
use crate::scalar::Scalar;

/// Hard upper bound on digit rings (64-bit mantissa, base 4).
const MAX_RINGS: usize = 32;

/// Hard upper bound on ring members across all rings.
const MAX_PUBS: usize = 128;

/// Decoded range-proof header, as reported by [`info`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeProofInfo {
    /// Base-10 exponent, `-1` for exact-value proofs.
    pub exp: i32,
    /// Mantissa bit count (0 for exact-value proofs).
    pub mantissa: usize,
    /// Lower bound of the proven range.
    pub min_value: u64,
    /// Upper bound of the proven range.
    pub max_value: u64,
}

/// Everything a successful rewind recovers.
#[derive(Clone)]
pub struct RangeProofRewind {
    /// The committed value.
    pub value: u64,
    /// The blinding factor of the outer commitment.
    pub blind: [u8; 32],
    /// The embedded message bytes (zero-padded to ring capacity).
    pub message: Vec<u8>,
    /// Lower bound of the proven range.
    pub min_value: u64,
    /// Upper bound of the proven range.
    pub max_value: u64,
}

struct Header {
    exp: i32,
    mantissa: usize,
    scale: u64,
    min_value: u64,
    max_value: u64,
    offset: usize,
}

struct RewindData {
    v: u64,
    blind: [u8; 32],
    message: Vec<u8>,
}

/// Bytes needed for a big-endian encoding of `ceiling` (at least one).
fn min_value_width(has_range: bool, ceiling: u64) -> usize {
    if !has_range {
        return 8;
    }
    let bits = 64 - (ceiling | 1).leading_zeros() as usize;
    bits.div_ceil(8)
}

/// Parses the proof header.
fn getheader(proof: &[u8]) -> Result<Header, Error> {
    if proof.len() < 65 || proof[0] & 0x80 != 0 {
        return Err(Error::InvalidRangeProof);
    }
    let b0 = proof[0];
    let has_range = b0 & 0x40 != 0;
    let has_min = b0 & 0x20 != 0;
    let mut offset = 1;

    let mut exp = -1i32;
    let mut mantissa = 0usize;
    let mut max_value = 0u64;
    if has_range {
        exp = (b0 & 0x1F) as i32;
        if exp > 18 {
            return Err(Error::InvalidRangeProof);
        }
        mantissa = proof[offset] as usize + 1;
        offset += 1;
        if mantissa > 64 {
            return Err(Error::InvalidRangeProof);
        }
        max_value = u64::MAX >> (64 - mantissa);
    }

    let mut scale = 1u64;
    for _ in 0..exp.max(0) {
        if max_value > u64::MAX / 10 {
            return Err(Error::InvalidRangeProof);
        }
        max_value *= 10;
        scale *= 10;
    }

    let mut min_value = 0u64;
    if has_min {
        let width = min_value_width(has_range, max_value);
        if proof.len() < offset + width {
            return Err(Error::InvalidRangeProof);
        }
        for &b in &proof[offset..offset + width] {
            min_value = (min_value << 8) | b as u64;
        }
        offset += width;
    }

    if max_value > u64::MAX - min_value {
        return Err(Error::InvalidRangeProof);
    }
    max_value += min_value;

    Ok(Header { exp, mantissa, scale, min_value, max_value, offset })
}

/// Ring sizes implied by a mantissa bit count.
fn rings_from_mantissa(mantissa: usize) -> (usize, [usize; MAX_RINGS], usize) {
    let mut rsizes = [0usize; MAX_RINGS];
    if mantissa == 0 {
        rsizes[0] = 1;
        return (1, rsizes, 1);
    }

    let mut rings = mantissa >> 1;
    let mut npub = rings * 4;
    for size in rsizes.iter_mut().take(rings) {
        *size = 4;
    }
    if mantissa & 1 != 0 {
        rsizes[rings] = 2;
        rings += 1;
        npub += 2;
    }
    (rings, rsizes, npub)
}

/// Derives every random value of a proof from the rewind nonce.
///
/// Ring blinds (the final one is the negated sum, completed by the
/// caller) and per-member s-values come from one RFC 6979 stream seeded
/// with `nonce ‖ commitment ‖ header`. The `message` buffer is XOR-folded
/// into the s-values and receives the masked bytes back, which is how
/// both the steganographic embedding and its recovery work.
fn genrand(
    sec: &mut [Scalar],
    s: &mut [Scalar],
    message: &mut [u8],
    rsizes: &[usize],
    nonce: &[u8; 32],
    commit: &Affine,
    header: &[u8],
) -> bool {
    debug_assert!(header.len() <= 10);

    let mut seed = [0u8; 75];
    seed[..32].copy_from_slice(nonce);
    seed[32..65].copy_from_slice(&serialize_compressed(commit));
    seed[65..65 + header.len()].copy_from_slice(header);
    let mut rng = Rfc6979HmacSha256::new(&seed[..65 + header.len()]);
    seed.zeroize();

    let rings = rsizes.len();
    let mut acc = Scalar::ZERO;
    let mut ret = true;
    let mut npub = 0;
    let mut tmp = [0u8; 32];
    for i in 0..rings {
        if i < rings - 1 {
            loop {
                rng.generate(&mut tmp);
                let overflow = sec[i].set_b32(&tmp);
                if !overflow && !sec[i].is_zero() {
                    break;
                }
            }
            acc.add_assign_scalar(&sec[i]);
        } else {
            sec[i] = acc.neg();
        }
        for _ in 0..rsizes[i] {
            rng.generate(&mut tmp);
            let base = npub * 32;
            for (b, slot) in message[base..base + 32].iter_mut().enumerate() {
                tmp[b] ^= *slot;
                *slot = tmp[b];
            }
            let overflow = s[npub].set_b32(&tmp);
            ret &= !(overflow || s[npub].is_zero());
            npub += 1;
        }
    }
    rng.finalize();
    acc.zeroize();
    tmp.zeroize();
    ret
}

/// Expands digit commitments into full ring public keys:
/// `P(i,j) = Cᵢ − j·4ⁱ·10^exp·H`, walking each ring by repeatedly
/// adding the negated, scaled generator.
fn pub_expand(pubs: &mut [Jacobian], exp: i32, rsizes: &[usize]) {
    let exp = exp.max(0);
    debug_assert!(exp < 19);

    let mut base = Jacobian::default();
    base.set_ge(&AFFINE_H);
    base = base.neg();
    for _ in 0..exp {
        // Multiply by ten: b → 8b + 2b.
        let tmp = base.double_var(None);
        base = tmp.double_var(None);
        base = base.double_var(None);
        base = base.add_var(&tmp, None);
    }

    let rings = rsizes.len();
    let mut npub = 0;
    for i in 0..rings {
        for j in 1..rsizes[i] {
            pubs[npub + j] = pubs[npub + j - 1].add_var(&base, None);
        }
        if i < rings - 1 {
            base = base.double_var(None);
            base = base.double_var(None);
        }
        npub += rsizes[i];
    }
}

/// Solves the ring secret from a known nonce: `x = (k − s) / e`.
fn recover_x(k: &Scalar, e: &Scalar, s: &Scalar) -> Scalar {
    let mut x = s.neg();
    x.add_assign_scalar(k);
    x.mul(&e.inverse_var())
}

/// Reconstructs the nonce of a non-forged member: `k = s + e·x`.
fn recover_k(x: &Scalar, e: &Scalar, s: &Scalar) -> Scalar {
    let t = e.mul(x);
    s.add(&t)
}

/// Creates a range proof for `value` inside the given commitment.
///
/// - `blind` must be the commitment's blinding factor and `nonce` the
///   secret enabling later rewinds.
/// - `exp` selects base-10 scaling (`-1` requests an exact-value
///   proof), `min_bits` a floor on the proven mantissa width.
/// - Up to `128·(rings−1)` bytes of `message` are embedded recoverably.
/// - `extra_commit` binds arbitrary extra data into the proof.
///
/// Requires range-proof capability.
#[allow(clippy::too_many_arguments)]
pub fn sign(
    ctx: &Context,
    min_value: u64,
    commit: &Commitment,
    blind: &[u8; 32],
    nonce: &[u8; 32],
    exp: i32,
    min_bits: usize,
    value: u64,
    message: &[u8],
    extra_commit: &[u8],
) -> Result<Vec<u8>, Error> {
    ctx.assert_rangeproof();
    if min_bits > 64 || !(-1..=18).contains(&exp) || value < min_value {
        return Err(Error::InvalidRangeProof);
    }
    let commit_ge = commit.as_ge();

    let mut exp = exp;
    let mut min_bits = min_bits;
    let mut min_value = min_value;
    let mut rings = 1usize;
    let mut rsizes = [0usize; MAX_RINGS];
    rsizes[0] = 1;
    let mut secidx = [0usize; MAX_RINGS];
    let mut scale = 1u64;
    let mut mantissa = 0usize;
    let mut npub = 1usize;
    let mut v = 0u64;

    if exp >= 0 {
        // Cap the mantissa floor so min + range ceiling stays in range.
        let max_bits = if min_value > 0 { min_value.leading_zeros() as usize } else { 64 };
        if min_bits > max_bits {
            min_bits = max_bits;
        }
        // Base ten is not a power of two; disable the exponent rather
        // than risk understating the proven range on huge values.
        if min_bits > 61 || value > i64::MAX as u64 {
            exp = 0;
        }

        v = value - min_value;
        let mut v2 = if min_bits > 0 { u64::MAX >> (64 - min_bits) } else { 0 };
        let mut used_exp = 0;
        while used_exp < exp as usize && v2 <= u64::MAX / 10 {
            v /= 10;
            v2 *= 10;
            used_exp += 1;
        }
        exp = used_exp as i32;
        let mut v2 = v;
        for _ in 0..exp {
            v2 *= 10;
            scale *= 10;
        }
        min_value = value - v2;

        mantissa = 64 - (v | 1).leading_zeros() as usize;
        if min_bits > mantissa {
            mantissa = min_bits;
        }

        rings = (mantissa + 1) >> 1;
        npub = 0;
        for i in 0..rings {
            rsizes[i] = if i < rings - 1 || mantissa & 1 == 0 { 4 } else { 2 };
            secidx[i] = ((v >> (i * 2)) & (rsizes[i] as u64 - 1)) as usize;
            npub += rsizes[i];
        }
        debug_assert!(mantissa > 0);
    } else {
        // Exact-value proof: a single one-member ring.
        min_value = value;
    }
    debug_assert!(rings <= MAX_RINGS && npub <= MAX_PUBS);

    // Header.
    let has_range = rsizes[0] > 1;
    let mut proof = Vec::with_capacity(5134);
    proof.push(
        (if has_range { 0x40 | exp as u8 } else { 0 }) | (if min_value > 0 { 0x20 } else { 0 }),
    );
    if has_range {
        proof.push((mantissa - 1) as u8);
    }
    if min_value > 0 {
        let ceiling = {
            let mut c = u64::MAX >> (64 - mantissa.max(1));
            for _ in 0..exp.max(0) {
                c = c.checked_mul(10).ok_or(Error::InvalidRangeProof)?;
            }
            c
        };
        let width = min_value_width(has_range, ceiling);
        if width < 8 && min_value >> (8 * width) != 0 {
            return Err(Error::InvalidRangeProof);
        }
        let be = min_value.to_be_bytes();
        proof.extend_from_slice(&be[8 - width..]);
    }
    let header_len = proof.len();

    if !message.is_empty() && message.len() > 128 * (rings - 1) {
        return Err(Error::InvalidRangeProof);
    }

    let mut sha_m = Sha256::new();
    sha_m.write(&serialize_compressed(&commit_ge));
    sha_m.write(&proof);
    if !extra_commit.is_empty() {
        sha_m.write(extra_commit);
    }

    // Plaintext buffer folded into the s-values: the caller message,
    // plus the value sidechannel slot in the final ring.
    let mut prep = vec![0u8; 4096];
    prep[..message.len()].copy_from_slice(message);
    if rsizes[rings - 1] > 1 {
        let mut vslot = rsizes[rings - 1] - 1;
        if secidx[rings - 1] == vslot {
            vslot -= 1;
        }
        let idx = ((rings - 1) * 4 + vslot) * 32;
        let vbytes = v.to_be_bytes();
        for b in 0..8 {
            prep[idx + b] = 0;
            prep[idx + 8 + b] = vbytes[b];
            prep[idx + 16 + b] = vbytes[b];
            prep[idx + 24 + b] = vbytes[b];
        }
        prep[idx] = 0x80;
    }

    let mut sec = [Scalar::ZERO; MAX_RINGS];
    let mut s = [Scalar::ZERO; MAX_PUBS];
    let ok = genrand(
        &mut sec[..rings],
        &mut s[..npub],
        &mut prep,
        &rsizes[..rings],
        nonce,
        &commit_ge,
        &proof[..header_len],
    );
    prep.zeroize();
    if !ok {
        return Err(Error::NonceFailure);
    }

    // The random value at each ring's true index becomes that ring's
    // nonce; its s slot is rewritten when the ring closes. Every ring
    // before the last has four members, so ring i starts at slot 4i.
    let mut k = [Scalar::ZERO; MAX_RINGS];
    for i in 0..rings {
        let idx = i * 4 + secidx[i];
        k[i] = s[idx];
        s[idx] = Scalar::ZERO;
    }

    // Fold the commitment's blind into the final ring blind so the
    // digit blinds tally to it.
    let mut stmp = Scalar::ZERO;
    if stmp.set_b32(blind) {
        return Err(Error::InvalidCommitment);
    }
    sec[rings - 1].add_assign_scalar(&stmp);
    stmp.zeroize();

    // Parity bitmap for the published sub-commitments.
    let signs_offset = proof.len();
    let nsign_bytes = (rings + 6) >> 3;
    proof.resize(proof.len() + nsign_bytes, 0);

    // Digit sub-commitments; all but the last are published.
    let mut pubs = vec![Jacobian::default(); npub];
    let mut cursor = 0;
    for i in 0..rings {
        let ring_value = ((secidx[i] as u64) << (2 * i)) * scale;
        pubs[cursor] = pedersen_ecmult(ctx, &sec[i], ring_value);
        if pubs[cursor].is_infinity() {
            return Err(Error::InvalidRangeProof);
        }
        if i < rings - 1 {
            let mut c = Affine::default();
            c.set_gej_var(&pubs[cursor]);
            let ser = serialize_compressed(&c);
            sha_m.write(&ser);
            proof[signs_offset + (i >> 3)] |= (ser[0] & 1) << (i & 7);
            proof.extend_from_slice(&ser[1..33]);
        }
        cursor += rsizes[i];
    }

    pub_expand(&mut pubs, exp, &rsizes[..rings]);
    let m = sha_m.finalize();
    let pubs_ge = set_all_gej_var(&pubs);

    let e0 = borromean_sign(
        ctx,
        &mut s[..npub],
        &pubs_ge,
        &k[..rings],
        &sec[..rings],
        &rsizes[..rings],
        &secidx[..rings],
        &m,
    )
    .ok_or(Error::NonceFailure)?;

    proof.extend_from_slice(&e0);
    for slot in s[..npub].iter() {
        proof.extend_from_slice(&slot.b32());
    }

    for x in sec.iter_mut() {
        x.zeroize();
    }
    for x in k.iter_mut() {
        x.zeroize();
    }
    for x in s.iter_mut() {
        x.zeroize();
    }

    debug_assert!(proof.len() <= 5134);
    Ok(proof)
}

/// Verifies a range proof against a commitment, returning the proven
/// `(min_value, max_value)` bounds. Requires range-proof capability.
pub fn verify(
    ctx: &Context,
    commit: &Commitment,
    proof: &[u8],
    extra_commit: &[u8],
) -> Result<(u64, u64), Error> {
    let (header, _) = verify_impl(ctx, commit, proof, extra_commit, None)?;
    Ok((header.min_value, header.max_value))
}

/// Verifies a range proof and rewinds it with the prover's nonce,
/// recovering the value, blind and embedded message.
pub fn rewind(
    ctx: &Context,
    commit: &Commitment,
    proof: &[u8],
    nonce: &[u8; 32],
    extra_commit: &[u8],
) -> Result<RangeProofRewind, Error> {
    let (header, rew) = verify_impl(ctx, commit, proof, extra_commit, Some(nonce))?;
    let rew = rew.expect("rewind data present when a nonce was supplied");
    let value = rew
        .v
        .checked_mul(header.scale)
        .and_then(|scaled| scaled.checked_add(header.min_value))
        .ok_or(Error::InvalidRangeProof)?;
    Ok(RangeProofRewind {
        value,
        blind: rew.blind,
        message: rew.message,
        min_value: header.min_value,
        max_value: header.max_value,
    })
}

/// Decodes a proof header without verifying anything.
pub fn info(proof: &[u8]) -> Result<RangeProofInfo, Error> {
    let header = getheader(proof)?;
    Ok(RangeProofInfo {
        exp: header.exp,
        mantissa: header.mantissa,
        min_value: header.min_value,
        max_value: header.max_value,
    })
}

fn verify_impl(
    ctx: &Context,
    commit: &Commitment,
    proof: &[u8],
    extra_commit: &[u8],
    rewind_nonce: Option<&[u8; 32]>,
) -> Result<(Header, Option<RewindData>), Error> {
    ctx.assert_rangeproof();
    let commit_ge = commit.as_ge();
    let header = getheader(proof)?;
    let (rings, rsizes, npub) = rings_from_mantissa(header.mantissa);
    let nsign_bytes = (rings + 6) >> 3;

    let mut offset = header.offset;
    let expected = offset + nsign_bytes + 32 * (rings - 1) + 32 + 32 * npub;
    if proof.len() != expected {
        return Err(Error::InvalidRangeProof);
    }

    let mut sha_m = Sha256::new();
    sha_m.write(&serialize_compressed(&commit_ge));
    sha_m.write(&proof[..header.offset]);
    if !extra_commit.is_empty() {
        sha_m.write(extra_commit);
    }

    let signs = &proof[offset..offset + nsign_bytes];
    offset += nsign_bytes;

    // Reconstruct the digit commitments; the verifier derives the last
    // one from the outer commitment so the published set is forced to
    // tally.
    let mut pubs = vec![Jacobian::default(); npub];
    let mut accj = Jacobian::default();
    accj.set_infinity();
    if header.min_value > 0 {
        accj = ctx.ecmult_gen2().ecmult_gen2_small_var(header.min_value);
    }
    let mut cursor = 0;
    for i in 0..rings - 1 {
        let mut x = FieldElement::default();
        if !x.set_b32(proof[offset..offset + 32].try_into().unwrap()) {
            return Err(Error::InvalidRangeProof);
        }
        let sign_bit = (signs[i >> 3] >> (i & 7)) & 1;
        let mut c = Affine::default();
        if !c.set_xo_var(&x, sign_bit == 1) {
            return Err(Error::InvalidRangeProof);
        }

        let mut ser = [0u8; 33];
        ser[0] = 0x02 | sign_bit;
        ser[1..33].copy_from_slice(&proof[offset..offset + 32]);
        sha_m.write(&ser);

        pubs[cursor].set_ge(&c);
        accj = accj.add_ge_var(&c, None);
        offset += 32;
        cursor += rsizes[i];
    }
    accj = accj.neg();
    accj = accj.add_ge_var(&commit_ge, None);
    if accj.is_infinity() {
        return Err(Error::InvalidRangeProof);
    }
    pubs[cursor] = accj;

    let e0: [u8; 32] = proof[offset..offset + 32].try_into().unwrap();
    offset += 32;

    let mut s = vec![Scalar::ZERO; npub];
    for slot in s.iter_mut() {
        if slot.set_b32(proof[offset..offset + 32].try_into().unwrap()) {
            return Err(Error::InvalidRangeProof);
        }
        offset += 32;
    }
    debug_assert!(offset == proof.len());

    pub_expand(&mut pubs, header.exp, &rsizes[..rings]);
    let m = sha_m.finalize();
    let pubs_ge = set_all_gej_var(&pubs);

    let mut evalues = rewind_nonce.map(|_| Vec::with_capacity(npub));
    if !borromean_verify(ctx, evalues.as_mut(), &e0, &s, &pubs_ge, &rsizes[..rings], &m) {
        return Err(Error::InvalidRangeProof);
    }

    match rewind_nonce {
        Some(nonce) => {
            let ev = evalues.expect("challenges recorded during verification");
            let rew =
                rewind_inner(ctx, &commit_ge, commit, &header, proof, &rsizes[..rings], &ev, &s, nonce)?;
            Ok((header, Some(rew)))
        }
        None => Ok((header, None)),
    }
}

/// Replays the prover's random stream and solves the rings backwards.
#[allow(clippy::too_many_arguments)]
fn rewind_inner(
    ctx: &Context,
    commit_ge: &Affine,
    commit: &Commitment,
    header: &Header,
    proof: &[u8],
    rsizes: &[usize],
    ev: &[Scalar],
    s: &[Scalar],
    nonce: &[u8; 32],
) -> Result<RewindData, Error> {
    let rings = rsizes.len();

    let npub = 4 * (rings - 1) + rsizes[rings - 1];
    let mut prep = vec![0u8; 4096];
    let mut sec = [Scalar::ZERO; MAX_RINGS];
    let mut s_orig = [Scalar::ZERO; MAX_PUBS];
    // With a zeroed buffer, genrand leaves the raw stream bytes of
    // every slot in `prep`.
    genrand(
        &mut sec[..rings],
        &mut s_orig[..npub],
        &mut prep,
        rsizes,
        nonce,
        commit_ge,
        &proof[..header.offset],
    );

    if rings == 1 && rsizes[0] == 1 {
        // Exact-value proof: only the blind is recoverable.
        let blind = recover_x(&s_orig[0], &ev[0], &s[0]);
        check_commitment(ctx, commit, &blind, header.min_value)?;
        return Ok(RewindData { v: 0, blind: blind.b32(), message: Vec::new() });
    }

    let last = rings - 1;
    let mut found: Option<(Scalar, u64)> = None;
    for j0 in 0..rsizes[last] {
        let idx = last * 4 + j0;
        let candidate = recover_x(&s_orig[idx], &ev[idx], &s[idx]);

        // The marker slot avoids the candidate's own position.
        let mut vslot = rsizes[last] - 1;
        if j0 == vslot {
            vslot -= 1;
        }
        let vidx = last * 4 + vslot;

        let sbytes = s[vidx].b32();
        let mut dec = [0u8; 32];
        for (b, out) in dec.iter_mut().enumerate() {
            *out = sbytes[b] ^ prep[vidx * 32 + b];
        }

        if dec[0] != 0x80 || dec[1..8] != [0u8; 7] {
            continue;
        }
        if dec[8..16] != dec[16..24] || dec[8..16] != dec[24..32] {
            continue;
        }
        let v = u64::from_be_bytes(dec[8..16].try_into().unwrap());
        if header.mantissa < 64 && v >> header.mantissa != 0 {
            continue;
        }
        if ((v >> (2 * last)) & (rsizes[last] as u64 - 1)) as usize != j0 {
            continue;
        }
        found = Some((candidate, v));
        break;
    }
    let Some((sec_last, v)) = found else {
        return Err(Error::InvalidRangeProof);
    };

    // The genrand convention makes the final ring blind −Σ(others), so
    // the commitment blind is the recovered secret minus that.
    let mut blind = sec_last;
    blind.add_assign_scalar(&sec[last].neg());

    let value = v
        .checked_mul(header.scale)
        .and_then(|scaled| scaled.checked_add(header.min_value))
        .ok_or(Error::InvalidRangeProof)?;
    check_commitment(ctx, commit, &blind, value)?;

    // Message recovery across the non-final rings: forged members XOR
    // directly, the true member goes through its reconstructed nonce.
    let mut message = vec![0u8; 128 * (rings - 1)];
    for i in 0..rings - 1 {
        let digit = ((v >> (2 * i)) & 3) as usize;
        for j in 0..rsizes[i] {
            let idx = i * 4 + j;
            let bytes = if j == digit {
                recover_k(&sec[i], &ev[idx], &s[idx]).b32()
            } else {
                s[idx].b32()
            };
            for (b, &byte) in bytes.iter().enumerate() {
                message[idx * 32 + b] = byte ^ prep[idx * 32 + b];
            }
        }
    }

    for x in sec.iter_mut() {
        x.zeroize();
    }
    for x in s_orig.iter_mut() {
        x.zeroize();
    }
    prep.zeroize();

    Ok(RewindData { v, blind: blind.b32(), message })
}

/// Confirms recovered `(blind, value)` reproduce the commitment.
fn check_commitment(
    ctx: &Context,
    commit: &Commitment,
    blind: &Scalar,
    value: u64,
) -> Result<(), Error> {
    let rj = pedersen_ecmult(ctx, blind, value);
    if rj.is_infinity() {
        return Err(Error::InvalidRangeProof);
    }
    let mut ge = Affine::default();
    ge.set_gej(&rj);
    if from_ge(&ge) != *commit {
        return Err(Error::InvalidRangeProof);
    }
    Ok(())
}
