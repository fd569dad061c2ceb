//! Key material and key-level operations.
//!
//! This module defines the secret and public key types, their parsing
//! and serialization rules, and the additive/multiplicative tweak
//! operations used for key derivation schemes.
//!
//! ## Encodings
//!
//! - Secret key: 32 big-endian bytes, required to be in `[1, n−1]`.
//! - Public key, compressed: 33 bytes, `0x02`/`0x03` parity prefix then
//!   the x coordinate.
//! - Public key, uncompressed: 65 bytes, `0x04 ‖ x ‖ y`, verified to be
//!   on the curve.
//! - Public key, hybrid: 65 bytes, `0x06`/`0x07 ‖ x ‖ y`, additionally
//!   verified so the prefix parity matches y.
//! - Secret key export: the historical SEC1 ECPrivateKey DER wrapper
//!   with the full specified-curve parameters embedded, in both
//!   compressed and uncompressed flavors, byte-identical to the
//!   established format.
//!
//! The in-memory types are opaque; none of them is a wire format.

use rand::Rng;
use zeroize::Zeroize;

use crate::context::Context;
use crate::error::Error;
use crate::field::FieldElement;
use crate::group::{Affine, G_X, G_Y, Jacobian};
use crate::scalar::Scalar;

const TAG_PUBKEY_EVEN: u8 = 0x02;
const TAG_PUBKEY_ODD: u8 = 0x03;
const TAG_PUBKEY_UNCOMPRESSED: u8 = 0x04;
const TAG_PUBKEY_HYBRID_EVEN: u8 = 0x06;
const TAG_PUBKEY_HYBRID_ODD: u8 = 0x07;

/// Serializes a (non-infinity) point in compressed form.
pub(crate) fn serialize_compressed(ge: &Affine) -> [u8; 33] {
    debug_assert!(!ge.infinity);
    let mut elem = *ge;
    elem.x.normalize_var();
    elem.y.normalize_var();

    let mut out = [0u8; 33];
    out[0] = if elem.y.is_odd() { TAG_PUBKEY_ODD } else { TAG_PUBKEY_EVEN };
    out[1..33].copy_from_slice(&elem.x.b32());
    out
}

/// A secret key: a non-zero scalar below the group order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SecretKey(pub(crate) Scalar);

impl SecretKey {
    /// Parses 32 big-endian bytes; rejects zero and values ≥ n.
    pub fn parse(bytes: &[u8; 32]) -> Result<SecretKey, Error> {
        let mut elem = Scalar::ZERO;
        let overflow = elem.set_b32(bytes);
        if overflow || elem.is_zero() {
            return Err(Error::InvalidSecretKey);
        }
        Ok(SecretKey(elem))
    }

    /// Draws a uniformly random secret key.
    pub fn random<R: Rng>(rng: &mut R) -> SecretKey {
        loop {
            let mut ret = [0u8; 32];
            rng.fill_bytes(&mut ret);
            if let Ok(key) = Self::parse(&ret) {
                ret.zeroize();
                return key;
            }
        }
    }

    /// Returns the 32-byte big-endian encoding.
    pub fn serialize(&self) -> [u8; 32] {
        self.0.b32()
    }

    /// Replaces the key with `key + tweak (mod n)`.
    ///
    /// Fails when the tweak is out of range or the result is zero, so
    /// the caller can retry with a different tweak.
    pub fn tweak_add(&mut self, tweak: &[u8; 32]) -> Result<(), Error> {
        let mut term = Scalar::ZERO;
        if term.set_b32(tweak) {
            return Err(Error::InvalidTweak);
        }
        let mut r = self.0.add(&term);
        if r.is_zero() {
            return Err(Error::InvalidTweak);
        }
        self.0 = r;
        r.zeroize();
        term.zeroize();
        Ok(())
    }

    /// Replaces the key with `key · tweak (mod n)`; the tweak must be a
    /// non-zero canonical scalar.
    pub fn tweak_mul(&mut self, tweak: &[u8; 32]) -> Result<(), Error> {
        let mut factor = Scalar::ZERO;
        if factor.set_b32(tweak) || factor.is_zero() {
            return Err(Error::InvalidTweak);
        }
        self.0 = self.0.mul(&factor);
        factor.zeroize();
        Ok(())
    }

    /// Negates the key in place.
    pub fn negate(&mut self) {
        self.0 = self.0.neg();
    }

    /// Exports the key in the historical SEC1 ECPrivateKey DER format
    /// with embedded curve parameters and the matching public key.
    ///
    /// Requires signing capability for the public key derivation.
    pub fn export_der(&self, ctx: &Context, compressed: bool) -> Vec<u8> {
        let pubkey = PublicKey::from_secret_key(ctx, self);
        privkey_der(&self.0.b32(), &pubkey.0, compressed)
    }

    /// Imports a key from the SEC1 ECPrivateKey DER format.
    ///
    /// Parsing is lenient beyond the fixed prefix, matching the
    /// historical importer: only the version and the key octet string
    /// are interpreted.
    pub fn import_der(der: &[u8]) -> Result<SecretKey, Error> {
        let key = privkey_from_der(der).ok_or(Error::InvalidSecretKey)?;
        SecretKey::parse(&key)
    }
}

impl Zeroize for SecretKey {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// A validated public key: a curve point other than infinity.
#[derive(Clone, Copy, Debug)]
pub struct PublicKey(pub(crate) Affine);

impl PublicKey {
    /// Derives the public key `seckey·G`. Requires signing capability.
    pub fn from_secret_key(ctx: &Context, seckey: &SecretKey) -> PublicKey {
        let pj = ctx.ecmult_gen().ecmult_gen(&seckey.0);
        let mut p = Affine::default();
        p.set_gej(&pj);
        p.x.normalize();
        p.y.normalize();
        PublicKey(p)
    }

    /// Parses a compressed (33-byte), uncompressed or hybrid (65-byte)
    /// encoding.
    pub fn parse(bytes: &[u8]) -> Result<PublicKey, Error> {
        let mut elem = Affine::default();
        match bytes.len() {
            33 if bytes[0] == TAG_PUBKEY_EVEN || bytes[0] == TAG_PUBKEY_ODD => {
                let mut x = FieldElement::default();
                if !x.set_b32(bytes[1..33].try_into().unwrap()) {
                    return Err(Error::InvalidPublicKey);
                }
                if !elem.set_xo_var(&x, bytes[0] == TAG_PUBKEY_ODD) {
                    return Err(Error::InvalidPublicKey);
                }
                elem.y.normalize_var();
                Ok(PublicKey(elem))
            }
            65 if bytes[0] == TAG_PUBKEY_UNCOMPRESSED
                || bytes[0] == TAG_PUBKEY_HYBRID_EVEN
                || bytes[0] == TAG_PUBKEY_HYBRID_ODD =>
            {
                let mut x = FieldElement::default();
                let mut y = FieldElement::default();
                if !x.set_b32(bytes[1..33].try_into().unwrap())
                    || !y.set_b32(bytes[33..65].try_into().unwrap())
                {
                    return Err(Error::InvalidPublicKey);
                }
                elem.set_xy(&x, &y);
                if (bytes[0] == TAG_PUBKEY_HYBRID_EVEN || bytes[0] == TAG_PUBKEY_HYBRID_ODD)
                    && y.is_odd() != (bytes[0] == TAG_PUBKEY_HYBRID_ODD)
                {
                    return Err(Error::InvalidPublicKey);
                }
                if !elem.is_valid_var() {
                    return Err(Error::InvalidPublicKey);
                }
                Ok(PublicKey(elem))
            }
            _ => Err(Error::InvalidPublicKey),
        }
    }

    /// Returns the 33-byte compressed encoding.
    pub fn serialize(&self) -> [u8; 33] {
        serialize_compressed(&self.0)
    }

    /// Returns the 65-byte uncompressed encoding.
    pub fn serialize_uncompressed(&self) -> [u8; 65] {
        debug_assert!(!self.0.infinity);
        let mut elem = self.0;
        elem.x.normalize_var();
        elem.y.normalize_var();

        let mut out = [0u8; 65];
        out[0] = TAG_PUBKEY_UNCOMPRESSED;
        out[1..33].copy_from_slice(&elem.x.b32());
        out[33..65].copy_from_slice(&elem.y.b32());
        out
    }

    /// Replaces the key with `Q + tweak·G`.
    ///
    /// Requires verification capability. Fails when the tweak is out of
    /// range or the result is infinity.
    pub fn tweak_add(&mut self, ctx: &Context, tweak: &[u8; 32]) -> Result<(), Error> {
        let mut term = Scalar::ZERO;
        if term.set_b32(tweak) {
            return Err(Error::InvalidTweak);
        }
        let mut pj = Jacobian::default();
        pj.set_ge(&self.0);
        let rj = ctx.ecmult().ecmult(&pj, &Scalar::ONE, &term);
        if rj.is_infinity() {
            return Err(Error::InvalidTweak);
        }
        self.0.set_gej_var(&rj);
        Ok(())
    }

    /// Replaces the key with `tweak·Q`; the tweak must be a non-zero
    /// canonical scalar. Requires verification capability.
    pub fn tweak_mul(&mut self, ctx: &Context, tweak: &[u8; 32]) -> Result<(), Error> {
        let mut factor = Scalar::ZERO;
        if factor.set_b32(tweak) || factor.is_zero() {
            return Err(Error::InvalidTweak);
        }
        let mut pj = Jacobian::default();
        pj.set_ge(&self.0);
        let rj = ctx.ecmult().ecmult(&pj, &factor, &Scalar::ZERO);
        if rj.is_infinity() {
            return Err(Error::InvalidTweak);
        }
        self.0.set_gej_var(&rj);
        Ok(())
    }

    /// Negates the key in place.
    pub fn negate(&mut self) {
        self.0 = self.0.neg();
        self.0.y.normalize_var();
    }
}

/// The field prime, big endian, for the embedded curve parameters.
const P_BYTES: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE, 0xFF, 0xFF,
    0xFC, 0x2F,
];

/// The group order, big endian, for the embedded curve parameters.
const N_BYTES: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

/// Appends a DER definite length (short or long form as required).
fn push_der_len(out: &mut Vec<u8>, len: usize) {
    debug_assert!(len < 0x1_0000);
    if len < 0x80 {
        out.push(len as u8);
    } else if len < 0x100 {
        out.push(0x81);
        out.push(len as u8);
    } else {
        out.push(0x82);
        out.push((len >> 8) as u8);
        out.push(len as u8);
    }
}

/// Builds the SEC1 ECPrivateKey DER structure with embedded
/// specified-curve parameters, assembled from the curve constants so the
/// bytes stay in lockstep with them.
fn privkey_der(key32: &[u8; 32], pubkey: &Affine, compressed: bool) -> Vec<u8> {
    let g = Affine { x: G_X, y: G_Y, infinity: false };

    // ECParameters (specifiedCurve) body.
    let mut params = Vec::with_capacity(170);
    // version INTEGER 1
    params.extend_from_slice(&[0x02, 0x01, 0x01]);
    // fieldID: SEQUENCE { prime-field OID, INTEGER p }
    params.extend_from_slice(&[
        0x30, 0x2C, 0x06, 0x07, 0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x01, 0x01, 0x02, 0x21, 0x00,
    ]);
    params.extend_from_slice(&P_BYTES);
    // curve: OCTET STRING a = 0, OCTET STRING b = 7
    params.extend_from_slice(&[0x30, 0x06, 0x04, 0x01, 0x00, 0x04, 0x01, 0x07]);
    // base point G as an OCTET STRING
    if compressed {
        params.extend_from_slice(&[0x04, 0x21]);
        params.extend_from_slice(&serialize_compressed(&g));
    } else {
        params.extend_from_slice(&[0x04, 0x41]);
        params.extend_from_slice(&PublicKey(g).serialize_uncompressed());
    }
    // order INTEGER n
    params.extend_from_slice(&[0x02, 0x21, 0x00]);
    params.extend_from_slice(&N_BYTES);
    // cofactor INTEGER 1
    params.extend_from_slice(&[0x02, 0x01, 0x01]);

    // [0] { SEQUENCE params }
    let mut params_tagged = Vec::with_capacity(params.len() + 6);
    params_tagged.push(0xA0);
    push_der_len(&mut params_tagged, params.len() + 1 + der_len_size(params.len()));
    params_tagged.push(0x30);
    push_der_len(&mut params_tagged, params.len());
    params_tagged.extend_from_slice(&params);

    // [1] { BIT STRING pubkey }
    let pub_bytes: Vec<u8> = if compressed {
        serialize_compressed(pubkey).to_vec()
    } else {
        PublicKey(*pubkey).serialize_uncompressed().to_vec()
    };
    let mut pub_tagged = Vec::with_capacity(pub_bytes.len() + 6);
    pub_tagged.push(0xA1);
    push_der_len(&mut pub_tagged, pub_bytes.len() + 2 + der_len_size(pub_bytes.len() + 1));
    pub_tagged.push(0x03);
    push_der_len(&mut pub_tagged, pub_bytes.len() + 1);
    pub_tagged.push(0x00);
    pub_tagged.extend_from_slice(&pub_bytes);

    // ECPrivateKey ::= SEQUENCE { version 1, key, [0] params, [1] pub }
    let body_len = 3 + 34 + params_tagged.len() + pub_tagged.len();
    let mut out = Vec::with_capacity(body_len + 4);
    out.push(0x30);
    push_der_len(&mut out, body_len);
    out.extend_from_slice(&[0x02, 0x01, 0x01]);
    out.push(0x04);
    out.push(0x20);
    out.extend_from_slice(key32);
    out.extend_from_slice(&params_tagged);
    out.extend_from_slice(&pub_tagged);
    out
}

/// Size in bytes of a DER definite length field.
fn der_len_size(len: usize) -> usize {
    if len < 0x80 {
        1
    } else if len < 0x100 {
        2
    } else {
        3
    }
}

/// Lenient SEC1 ECPrivateKey importer: walks the outer sequence, checks
/// the version, and pulls the key octet string.
fn privkey_from_der(der: &[u8]) -> Option<[u8; 32]> {
    let mut pos = 0;
    // sequence header
    if der.len() < pos + 1 || der[pos] != 0x30 {
        return None;
    }
    pos += 1;
    // definite long-form length, 1 or 2 length bytes
    if der.len() < pos + 1 || der[pos] & 0x80 == 0 {
        return None;
    }
    let lenb = (der[pos] & 0x7F) as usize;
    pos += 1;
    if lenb < 1 || lenb > 2 || der.len() < pos + lenb {
        return None;
    }
    let len = der[pos + lenb - 1] as usize
        + if lenb > 1 { (der[pos + lenb - 2] as usize) << 8 } else { 0 };
    pos += lenb;
    if der.len() < pos + len {
        return None;
    }
    // version INTEGER 1
    if der.len() < pos + 3 || der[pos] != 0x02 || der[pos + 1] != 0x01 || der[pos + 2] != 0x01 {
        return None;
    }
    pos += 3;
    // key OCTET STRING, up to 32 bytes
    if der.len() < pos + 2 || der[pos] != 0x04 {
        return None;
    }
    let klen = der[pos + 1] as usize;
    if klen > 32 || der.len() < pos + 2 + klen {
        return None;
    }
    let mut key = [0u8; 32];
    key[32 - klen..].copy_from_slice(&der[pos + 2..pos + 2 + klen]);
    Some(key)
}
