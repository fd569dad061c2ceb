//! Error type shared by all fallible operations.

use thiserror::Error;

/// The failure kinds surfaced by the public API.
///
/// Malformed untrusted input and failed verifications are reported as
/// values; contract violations (using a context without the required
/// capability) are programming errors and assert instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A public key encoding was malformed, off-curve, or the point at
    /// infinity.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// A secret key was zero or not below the group order.
    #[error("invalid secret key")]
    InvalidSecretKey,

    /// A signature failed to parse, used an out-of-range or high-S
    /// scalar, or did not verify.
    #[error("invalid signature")]
    InvalidSignature,

    /// A recovery id was outside {0, 1, 2, 3}, or recovery produced no
    /// valid point.
    #[error("invalid recovery id")]
    InvalidRecoveryId,

    /// A tweak was out of range, or tweaking produced the zero scalar or
    /// the point at infinity; the caller may retry with another tweak.
    #[error("invalid tweak")]
    InvalidTweak,

    /// A commitment encoding was malformed or off-curve, or a blind sum
    /// input overflowed.
    #[error("invalid commitment")]
    InvalidCommitment,

    /// A range proof was malformed, did not verify, or could not be
    /// rewound with the given nonce.
    #[error("invalid range proof")]
    InvalidRangeProof,

    /// The nonce source declined to produce a nonce.
    #[error("nonce generation failed")]
    NonceFailure,
}
