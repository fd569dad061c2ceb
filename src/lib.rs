//! secp256k1 signatures and confidential-transaction primitives.
//!
//! This crate is a self-contained implementation of the secp256k1
//! elliptic curve and the cryptographic protocols built on it: ECDSA
//! signing, verification and public-key recovery; key derivation,
//! validation and tweaking; constant-time Diffie–Hellman; and the
//! confidential-transaction stack of Pedersen commitments, blind sums,
//! commitment tallies and Borromean-ring-signature range proofs.
//!
//! The focus is on **clarity, predictability, and auditability**: the
//! numerical core is explicit limb arithmetic with spelled-out carry
//! chains, and every routine that touches secret data is constant-time
//! by construction — no secret-dependent branches, no secret-indexed
//! table lookups, explicit zeroization on every exit path.
//!
//! # Module overview
//!
//! - `field`, `scalar`
//!   Arithmetic modulo the field prime and the group order. These are
//!   the leaves of the crate; everything else is built from them.
//!
//! - `group`
//!   Curve points in affine and Jacobian coordinates, the addition and
//!   doubling formulas, batch affine conversion, and the curve
//!   constants (the generators G and H, the endomorphism β).
//!
//! - `hash`
//!   SHA-256, HMAC-SHA256 and the RFC 6979 DRBG that feeds every
//!   deterministic-randomness consumer in the crate.
//!
//! - `ecmult`
//!   The scalar-multiplication engines: w-NAF variable-base with the
//!   GLV endomorphism split for verification, and blinded fixed-base
//!   combs for the two generators.
//!
//! - `context`
//!   Capability flags and the precomputed tables behind them. Create
//!   one [`Context`] up front and share it; see
//!   [`Context::randomize`] for side-channel re-blinding.
//!
//! - `keys`
//!   Secret and public key types, parsing, serialization, tweaking and
//!   the historical DER export format.
//!
//! - `signatures`
//!   ECDSA with low-S normalization, recovery ids and strict-DER
//!   encoding.
//!
//! - `ecdh`
//!   Constant-time point multiplication and shared-secret derivation.
//!
//! - `pedersen`, `borromean`, `rangeproof`
//!   The confidential-transaction primitives: value commitments and
//!   their tallies, the multi-ring signature, and zero-knowledge range
//!   proofs with nonce-based rewinding.
//!
//! # Design goals
//!
//! - No heap allocations in the arithmetic core
//! - Minimal and explicit APIs; opaque key and signature containers
//! - Stable, well-defined byte encodings distinct from in-memory forms
//! - Constant-time behavior on all secret-dependent paths

pub mod borromean;
pub mod context;
pub mod ecdh;
pub mod ecmult;
pub mod error;
pub mod field;
pub mod group;
pub mod hash;
pub mod keys;
pub mod pedersen;
pub mod rangeproof;
pub mod scalar;
pub mod signatures;

pub use context::Context;
pub use ecdh::SharedSecret;
pub use error::Error;
pub use keys::{PublicKey, SecretKey};
pub use pedersen::Commitment;
pub use signatures::ecdsa;
pub use signatures::ecdsa::{Message, RecoveryId, Signature};
