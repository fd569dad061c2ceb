//! Strict DER encoding of ECDSA signatures.
//!
//! Two INTEGERs `(r, s)` inside a SEQUENCE, canonical form only:
//! minimum-length values, a leading zero byte permitted solely to clear
//! a sign bit, and short-form lengths (every valid signature encoding
//! fits well under 128 bytes).

use crate::error::Error;
use crate::scalar::Scalar;

use super::Signature;

/// Appends a canonical INTEGER for a scalar.
fn put_integer(out: &mut Vec<u8>, value: &Scalar) {
    let bytes = value.b32();
    let mut start = 0;
    while start < 32 && bytes[start] == 0 {
        start += 1;
    }

    out.push(0x02);
    if start == 32 {
        // Zero is a single zero byte.
        out.push(1);
        out.push(0);
        return;
    }

    let sign_pad = bytes[start] & 0x80 != 0;
    out.push((32 - start) as u8 + sign_pad as u8);
    if sign_pad {
        out.push(0);
    }
    out.extend_from_slice(&bytes[start..]);
}

/// Serializes a signature in strict DER.
pub(crate) fn serialize(sig: &Signature) -> Vec<u8> {
    let mut body = Vec::with_capacity(70);
    put_integer(&mut body, &sig.r);
    put_integer(&mut body, &sig.s);

    let mut out = Vec::with_capacity(body.len() + 2);
    out.push(0x30);
    out.push(body.len() as u8);
    out.extend_from_slice(&body);
    out
}

/// Reads one canonical INTEGER, returning the scalar and the following
/// position.
fn take_integer(bytes: &[u8], pos: usize) -> Result<(Scalar, usize), Error> {
    if bytes.len() < pos + 2 || bytes[pos] != 0x02 {
        return Err(Error::InvalidSignature);
    }
    let len = bytes[pos + 1] as usize;
    if len == 0 || len >= 0x80 || bytes.len() < pos + 2 + len {
        return Err(Error::InvalidSignature);
    }
    let value = &bytes[pos + 2..pos + 2 + len];

    // Negative values never occur, and a leading zero is only valid
    // when it clears a sign bit.
    if value[0] & 0x80 != 0 {
        return Err(Error::InvalidSignature);
    }
    if len > 1 && value[0] == 0 && value[1] & 0x80 == 0 {
        return Err(Error::InvalidSignature);
    }

    let digits = if value[0] == 0 { &value[1..] } else { value };
    if digits.len() > 32 {
        return Err(Error::InvalidSignature);
    }

    let mut b32 = [0u8; 32];
    b32[32 - digits.len()..].copy_from_slice(digits);
    let mut scalar = Scalar::ZERO;
    if scalar.set_b32(&b32) {
        return Err(Error::InvalidSignature);
    }
    Ok((scalar, pos + 2 + len))
}

/// Parses a strict-DER signature; trailing bytes are rejected.
pub(crate) fn parse(bytes: &[u8]) -> Result<Signature, Error> {
    if bytes.len() < 6 || bytes[0] != 0x30 {
        return Err(Error::InvalidSignature);
    }
    let len = bytes[1] as usize;
    if len >= 0x80 || len != bytes.len() - 2 {
        return Err(Error::InvalidSignature);
    }

    let (r, pos) = take_integer(bytes, 2)?;
    let (s, pos) = take_integer(bytes, pos)?;
    if pos != bytes.len() {
        return Err(Error::InvalidSignature);
    }
    Ok(Signature { r, s })
}
