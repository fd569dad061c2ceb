//! Hash primitives used by the signing and proof protocols.
//!
//! - `sha256` — streaming SHA-256 (FIPS 180-4)
//! - `hmac` — HMAC-SHA256
//! - `rfc6979` — the RFC 6979 §3.2 HMAC-SHA256 DRBG used for
//!   deterministic nonces, context re-blinding and range-proof random
//!   streams

pub mod hmac;
pub mod rfc6979;
pub mod sha256;

pub use hmac::HmacSha256;
pub use rfc6979::Rfc6979HmacSha256;
pub use sha256::{Sha256, sha256};
