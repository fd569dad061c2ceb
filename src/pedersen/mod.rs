//! Pedersen commitments and commitment tallies.
//!
//! A commitment to a 64-bit value `v` under blinding factor `b` is the
//! point `b·G + v·H`, where H is the alternate generator with no known
//! discrete log relative to G. Commitments are additively homomorphic:
//! sums of commitments commit to the sums of values under the sums of
//! blinds, which is what makes the blind-sum and tally operations work.
//!
//! ## Wire format
//!
//! 33 bytes: `(0x08 | y-parity) ‖ x`. The header range is disjoint from
//! public-key prefixes, so commitments and keys cannot be confused on
//! the wire.

use zeroize::Zeroize;

use crate::context::Context;
use crate::error::Error;
use crate::field::FieldElement;
use crate::group::{Affine, Jacobian};
use crate::scalar::Scalar;

/// A serialized Pedersen commitment.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Commitment(pub(crate) [u8; 33]);

impl Commitment {
    /// Parses and validates the 33-byte encoding.
    pub fn parse(bytes: &[u8; 33]) -> Result<Commitment, Error> {
        if bytes[0] & 0xFE != 0x08 {
            return Err(Error::InvalidCommitment);
        }
        to_ge(bytes)?;
        Ok(Commitment(*bytes))
    }

    /// Returns the 33-byte encoding.
    pub fn serialize(&self) -> [u8; 33] {
        self.0
    }

    pub(crate) fn as_ge(&self) -> Affine {
        // Validated at construction.
        to_ge(&self.0).expect("commitment holds a valid point")
    }
}

/// Decompresses a commitment encoding.
fn to_ge(bytes: &[u8; 33]) -> Result<Affine, Error> {
    let mut x = FieldElement::default();
    if !x.set_b32(bytes[1..33].try_into().unwrap()) {
        return Err(Error::InvalidCommitment);
    }
    let mut ge = Affine::default();
    if !ge.set_xo_var(&x, bytes[0] & 1 == 1) {
        return Err(Error::InvalidCommitment);
    }
    Ok(ge)
}

/// Serializes a commitment point.
pub(crate) fn from_ge(ge: &Affine) -> Commitment {
    debug_assert!(!ge.infinity);
    let mut elem = *ge;
    elem.x.normalize_var();
    elem.y.normalize_var();

    let mut out = [0u8; 33];
    out[0] = 0x08 | elem.y.is_odd() as u8;
    out[1..33].copy_from_slice(&elem.x.b32());
    Commitment(out)
}

/// Computes `blind·G + value·H` as a Jacobian point. Constant time;
/// both inputs are treated as secrets.
pub(crate) fn pedersen_ecmult(ctx: &Context, blind: &Scalar, value: u64) -> Jacobian {
    let rj = ctx.ecmult_gen().ecmult_gen(blind);
    ctx.ecmult_gen2().ecmult_gen2_acc(rj, value)
}

/// Creates a commitment to `value` under the given blinding factor.
///
/// Requires signing and commitment capability. Fails on an out-of-range
/// blind or the (unreachable in practice) zero commitment.
pub fn commit(ctx: &Context, blind: &[u8; 32], value: u64) -> Result<Commitment, Error> {
    let mut sec = Scalar::ZERO;
    if sec.set_b32(blind) {
        return Err(Error::InvalidCommitment);
    }

    let rj = pedersen_ecmult(ctx, &sec, value);
    sec.zeroize();
    if rj.is_infinity() {
        return Err(Error::InvalidCommitment);
    }
    let mut ge = Affine::default();
    ge.set_gej(&rj);
    Ok(from_ge(&ge))
}

/// Computes the signed sum of blinding factors:
/// the first `npositive` enter positively, the rest negatively.
///
/// Fails when any input is not a canonical scalar.
pub fn blind_sum(blinds: &[[u8; 32]], npositive: usize) -> Result<[u8; 32], Error> {
    debug_assert!(npositive <= blinds.len());

    let mut acc = Scalar::ZERO;
    for (i, blind) in blinds.iter().enumerate() {
        let mut x = Scalar::ZERO;
        if x.set_b32(blind) {
            return Err(Error::InvalidCommitment);
        }
        if i >= npositive {
            x = x.neg();
        }
        acc.add_assign_scalar(&x);
        x.zeroize();
    }
    let out = acc.b32();
    acc.zeroize();
    Ok(out)
}

/// Verifies that commitments and excess balance:
/// `Σ positive − Σ negative − excess·H = ∞`.
///
/// A negative excess enters with opposite sign. Requires commitment
/// capability; all inputs are public, so the variable-time paths are
/// used throughout.
pub fn verify_tally(
    ctx: &Context,
    positive: &[Commitment],
    negative: &[Commitment],
    excess: i64,
) -> bool {
    let mut accj = Jacobian::default();
    accj.set_infinity();

    // Start from the negated negative side: -(Σ negative + excess·H)
    // when the excess is positive.
    if excess != 0 {
        accj = ctx.ecmult_gen2().ecmult_gen2_small_var(excess.unsigned_abs());
        if excess < 0 {
            accj = accj.neg();
        }
    }
    for commitment in negative {
        let ge = commitment.as_ge();
        accj = accj.add_ge_var(&ge, None);
    }
    accj = accj.neg();
    for commitment in positive {
        let ge = commitment.as_ge();
        accj = accj.add_ge_var(&ge, None);
    }
    accj.is_infinity()
}
