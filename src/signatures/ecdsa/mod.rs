//! ECDSA over secp256k1.
//!
//! Signing is deterministic by default (RFC 6979) and constant-time
//! with respect to the secret key and nonce: the only point
//! multiplication on the signing path is the blinded fixed-base comb.
//! Produced signatures are always low-S, and verification rejects
//! high-S encodings, so each message/key pair accepts exactly one of
//! the two algebraically valid S values.
//!
//! Verification and public-key recovery run on public data and use the
//! variable-time multiplication engine.
//!
//! ## Recovery ids
//!
//! Signing can report a 2-bit recovery id: bit 0 is the parity of the
//! nonce point's y coordinate, bit 1 records whether its x coordinate
//! overflowed the group order. Together with `(r, s)` and the message
//! this pins down the public key exactly.

pub mod der;

use zeroize::Zeroize;

use crate::context::Context;
use crate::error::Error;
use crate::field::FieldElement;
use crate::group::{Affine, Jacobian};
use crate::hash::Rfc6979HmacSha256;
use crate::keys::{PublicKey, SecretKey};
use crate::scalar::Scalar;

/// `p − n`, as a field element: the largest value by which a reduced
/// x coordinate may have wrapped.
const P_MINUS_ORDER: FieldElement =
    FieldElement::from_words([0, 1, 0x4551_2319_50B7_5FC4, 0x402D_A172_2FC9_BAEE]);

/// The group order, as a field element.
const ORDER_AS_FE: FieldElement = FieldElement::from_words([
    0xFFFF_FFFF_FFFF_FFFF,
    0xFFFF_FFFF_FFFF_FFFE,
    0xBAAE_DCE6_AF48_A03B,
    0xBFD2_5E8C_D036_4141,
]);

/// An ECDSA signature: the scalar pair `(r, s)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    pub r: Scalar,
    pub s: Scalar,
}

impl Signature {
    /// Parses the 64-byte compact `r ‖ s` encoding. Out-of-range halves
    /// are reduced, matching the permissive compact parser of the
    /// original; verification will reject them anyway.
    pub fn parse_compact(bytes: &[u8; 64]) -> Signature {
        let mut r = Scalar::ZERO;
        let mut s = Scalar::ZERO;
        r.set_b32(bytes[0..32].try_into().unwrap());
        s.set_b32(bytes[32..64].try_into().unwrap());
        Signature { r, s }
    }

    /// Returns the 64-byte compact `r ‖ s` encoding.
    pub fn serialize_compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[0..32].copy_from_slice(&self.r.b32());
        out[32..64].copy_from_slice(&self.s.b32());
        out
    }

    /// Parses a strict-DER encoding.
    pub fn parse_der(bytes: &[u8]) -> Result<Signature, Error> {
        der::parse(bytes)
    }

    /// Returns the strict-DER encoding.
    pub fn serialize_der(&self) -> Vec<u8> {
        der::serialize(self)
    }

    /// Replaces a high S with `n − s`; returns whether a change was
    /// made.
    pub fn normalize_s(&mut self) -> bool {
        if self.s.is_high() {
            self.s = self.s.neg();
            true
        } else {
            false
        }
    }
}

/// Tag enabling public-key recovery from a signature and message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoveryId(u8);

impl RecoveryId {
    /// Validates a recovery id; only 0–3 exist.
    pub fn parse(id: u8) -> Result<RecoveryId, Error> {
        if id < 4 { Ok(RecoveryId(id)) } else { Err(Error::InvalidRecoveryId) }
    }

    /// Returns the id as a byte.
    pub fn serialize(&self) -> u8 {
        self.0
    }
}

/// A message hash, interpreted modulo the group order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Message(pub Scalar);

impl Message {
    /// Interprets 32 bytes as a scalar; reduction is deliberate and
    /// reported nowhere, matching the ECDSA convention.
    pub fn parse(bytes: &[u8; 32]) -> Message {
        let mut m = Scalar::ZERO;
        m.set_b32(bytes);
        Message(m)
    }

    /// Returns the reduced 32-byte encoding.
    pub fn serialize(&self) -> [u8; 32] {
        self.0.b32()
    }
}

/// A source of signing nonces.
///
/// `attempt` counts the retries of the signing loop; a generator must
/// return a different candidate for each attempt, or `None` to refuse
/// (which aborts signing with [`Error::NonceFailure`]).
pub trait NonceGenerator {
    fn generate(&self, msg32: &[u8; 32], key32: &[u8; 32], attempt: u32) -> Option<[u8; 32]>;
}

/// The default RFC 6979 nonce source.
pub struct Rfc6979Nonce;

/// RFC 6979 with 32 bytes of additional data mixed into the seeding.
pub struct Rfc6979ExtraNonce(pub [u8; 32]);

fn rfc6979_nonce(key32: &[u8; 32], msg32: &[u8; 32], extra: Option<&[u8; 32]>, attempt: u32) -> [u8; 32] {
    let mut keydata = [0u8; 96];
    keydata[..32].copy_from_slice(key32);
    keydata[32..64].copy_from_slice(msg32);
    let keylen = match extra {
        Some(data) => {
            keydata[64..96].copy_from_slice(data);
            96
        }
        None => 64,
    };

    let mut rng = Rfc6979HmacSha256::new(&keydata[..keylen]);
    keydata.zeroize();

    let mut nonce = [0u8; 32];
    for _ in 0..=attempt {
        rng.generate(&mut nonce);
    }
    rng.finalize();
    nonce
}

impl NonceGenerator for Rfc6979Nonce {
    fn generate(&self, msg32: &[u8; 32], key32: &[u8; 32], attempt: u32) -> Option<[u8; 32]> {
        Some(rfc6979_nonce(key32, msg32, None, attempt))
    }
}

impl NonceGenerator for Rfc6979ExtraNonce {
    fn generate(&self, msg32: &[u8; 32], key32: &[u8; 32], attempt: u32) -> Option<[u8; 32]> {
        Some(rfc6979_nonce(key32, msg32, Some(&self.0), attempt))
    }
}

/// Raw signing step for one nonce candidate. Returns `None` when the
/// candidate leads to a degenerate `r` or `s` and must be retried.
pub(crate) fn sig_sign(
    ctx: &Context,
    seckey: &Scalar,
    message: &Scalar,
    nonce: &Scalar,
) -> Option<(Scalar, Scalar, u8)> {
    let mut rp = ctx.ecmult_gen().ecmult_gen(nonce);
    let mut r = Affine::default();
    r.set_gej(&rp);
    r.x.normalize();
    r.y.normalize();

    let b = r.x.b32();
    let mut sigr = Scalar::ZERO;
    let overflow = sigr.set_b32(&b);
    let recid_parity = r.y.is_odd() as u8;
    rp.zeroize();
    r.zeroize();
    if sigr.is_zero() {
        return None;
    }
    let mut recid = (if overflow { 2 } else { 0 }) | recid_parity;

    let mut n = sigr.mul(seckey);
    n.add_assign_scalar(message);
    let mut sigs = nonce.inverse();
    sigs = sigs.mul(&n);
    n.zeroize();

    if sigs.is_zero() {
        return None;
    }
    if sigs.is_high() {
        sigs = sigs.neg();
        recid ^= 1;
    }
    Some((sigr, sigs, recid))
}

/// Raw verification step; assumes low-S was already enforced.
pub(crate) fn sig_verify(
    ctx: &Context,
    sigr: &Scalar,
    sigs: &Scalar,
    pubkey: &Affine,
    message: &Scalar,
) -> bool {
    if sigr.is_zero() || sigs.is_zero() {
        return false;
    }

    let sn = sigs.inverse_var();
    let u1 = sn.mul(message);
    let u2 = sn.mul(sigr);
    let mut pubkeyj = Jacobian::default();
    pubkeyj.set_ge(pubkey);
    let pr = ctx.ecmult().ecmult(&pubkeyj, &u2, &u1);
    if pr.is_infinity() {
        return false;
    }

    // Compare r against the x coordinate of pr without leaving
    // Jacobian space: check r·Z² = X, then retry with r + n for the
    // case where the x coordinate wrapped past the group order.
    let c = sigr.b32();
    let mut xr = FieldElement::default();
    xr.set_b32(&c);

    if pr.eq_x_var(&xr) {
        return true;
    }
    if xr.cmp_var(&P_MINUS_ORDER) >= 0 {
        return false;
    }
    xr += &ORDER_AS_FE;
    xr.normalize_var();
    pr.eq_x_var(&xr)
}

/// Raw public-key recovery step.
pub(crate) fn sig_recover(
    ctx: &Context,
    sigr: &Scalar,
    sigs: &Scalar,
    recid: u8,
    message: &Scalar,
) -> Option<Affine> {
    if sigr.is_zero() || sigs.is_zero() {
        return None;
    }

    let brx = sigr.b32();
    let mut fx = FieldElement::default();
    // A scalar is always below p, so this cannot overflow.
    let ok = fx.set_b32(&brx);
    debug_assert!(ok);

    if recid & 2 != 0 {
        if fx.cmp_var(&P_MINUS_ORDER) >= 0 {
            return None;
        }
        fx += &ORDER_AS_FE;
        fx.normalize_var();
    }
    let mut x = Affine::default();
    if !x.set_xo_var(&fx, recid & 1 != 0) {
        return None;
    }

    let mut xj = Jacobian::default();
    xj.set_ge(&x);
    let rn = sigr.inverse_var();
    let mut u1 = rn.mul(message);
    u1 = u1.neg();
    let u2 = rn.mul(sigs);
    let qj = ctx.ecmult().ecmult(&xj, &u2, &u1);
    if qj.is_infinity() {
        return None;
    }
    let mut pubkey = Affine::default();
    pubkey.set_gej_var(&qj);
    Some(pubkey)
}

/// Signs a message hash with the default RFC 6979 nonce source.
///
/// Requires signing capability.
pub fn sign(ctx: &Context, message: &Message, seckey: &SecretKey) -> Result<(Signature, RecoveryId), Error> {
    sign_with_nonce(ctx, message, seckey, &Rfc6979Nonce)
}

/// Signs a message hash, drawing nonces from the given source.
///
/// Retries with an incremented attempt counter until the nonce yields a
/// valid signature or the source refuses. Requires signing capability.
pub fn sign_with_nonce(
    ctx: &Context,
    message: &Message,
    seckey: &SecretKey,
    noncefn: &impl NonceGenerator,
) -> Result<(Signature, RecoveryId), Error> {
    let seckey_b32 = seckey.serialize();
    let msg_b32 = message.serialize();

    let mut attempt = 0u32;
    loop {
        let Some(mut nonce32) = noncefn.generate(&msg_b32, &seckey_b32, attempt) else {
            return Err(Error::NonceFailure);
        };

        let mut non = Scalar::ZERO;
        let overflow = non.set_b32(&nonce32);
        nonce32.zeroize();
        if !overflow && !non.is_zero() {
            if let Some((r, s, recid)) = sig_sign(ctx, &seckey.0, &message.0, &non) {
                non.zeroize();
                return Ok((Signature { r, s }, RecoveryId(recid)));
            }
        }
        non.zeroize();
        attempt += 1;
    }
}

/// Verifies a signature over a message hash.
///
/// Rejects high-S signatures. Requires verification capability.
pub fn verify(
    ctx: &Context,
    message: &Message,
    signature: &Signature,
    pubkey: &PublicKey,
) -> Result<(), Error> {
    if signature.s.is_high() {
        return Err(Error::InvalidSignature);
    }
    if sig_verify(ctx, &signature.r, &signature.s, &pubkey.0, &message.0) {
        Ok(())
    } else {
        Err(Error::InvalidSignature)
    }
}

/// Recovers the signing public key from a signature, message hash and
/// recovery id. Requires verification capability.
pub fn recover(
    ctx: &Context,
    message: &Message,
    signature: &Signature,
    recovery_id: RecoveryId,
) -> Result<PublicKey, Error> {
    sig_recover(ctx, &signature.r, &signature.s, recovery_id.0, &message.0)
        .map(PublicKey)
        .ok_or(Error::InvalidRecoveryId)
}
