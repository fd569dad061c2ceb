//! Diffie–Hellman key agreement on secp256k1.
//!
//! The secret scalar drives [`crate::ecmult::ecmult_const`], the
//! constant-time variable-point multiplier, so agreement leaks nothing
//! about the local secret key. No context capability is needed: the
//! constant-time path builds its small table per call.

use zeroize::Zeroize;

use crate::ecmult::ecmult_const;
use crate::error::Error;
use crate::group::Affine;
use crate::hash::sha256;
use crate::keys::{PublicKey, SecretKey, serialize_compressed};

/// Computes the raw product point `seckey·pubkey`.
///
/// Satisfies `point_multiply(b·G, a) = point_multiply(a·G, b)`, the
/// basis of the key agreement.
pub fn point_multiply(pubkey: &PublicKey, seckey: &SecretKey) -> Result<PublicKey, Error> {
    let res = ecmult_const(&pubkey.0, &seckey.0);
    if res.is_infinity() {
        return Err(Error::InvalidSecretKey);
    }
    let mut ge = Affine::default();
    ge.set_gej(&res);
    ge.x.normalize();
    ge.y.normalize();
    Ok(PublicKey(ge))
}

/// An ECDH shared secret: the SHA-256 digest of the compressed product
/// point.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// Derives the shared secret between a local secret key and a remote
    /// public key.
    pub fn new(pubkey: &PublicKey, seckey: &SecretKey) -> Result<SharedSecret, Error> {
        let point = point_multiply(pubkey, seckey)?;
        let mut compressed = serialize_compressed(&point.0);
        let digest = sha256(&compressed);
        compressed.zeroize();
        Ok(SharedSecret(digest))
    }
}

impl AsRef<[u8]> for SharedSecret {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Zeroize for SharedSecret {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}
