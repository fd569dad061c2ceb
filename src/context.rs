//! Library context: capability flags and precomputed tables.
//!
//! A [`Context`] owns the precomputed tables for the operations it was
//! built for. Table construction is the expensive part of context
//! creation, so callers create one context up front and share it;
//! read-only use from multiple threads is safe, while the mutating
//! [`Context::randomize`] requires exclusive access by construction
//! (`&mut self`).
//!
//! Requesting an operation whose capability was not built is a
//! programming error and asserts rather than returning a value.

use crate::ecmult::EcmultContext;
use crate::ecmult::r#gen::EcmultGenContext;
use crate::ecmult::gen2::EcmultGen2Context;

/// Capability flag: signing (generator comb table and blinding).
pub const SIGN: u32 = 1 << 0;

/// Capability flag: signature verification (variable-base tables).
pub const VERIFY: u32 = 1 << 1;

/// Capability flag: Pedersen commitments (generator-H table).
pub const COMMIT: u32 = 1 << 2;

/// Capability flag: range proofs (requires the other three at runtime).
pub const RANGEPROOF: u32 = 1 << 3;

/// All capabilities.
pub const ALL: u32 = SIGN | VERIFY | COMMIT | RANGEPROOF;

/// An owned bundle of precomputed tables, built according to capability
/// flags at creation.
#[derive(Clone)]
pub struct Context {
    ecmult: Option<EcmultContext>,
    ecmult_gen: Option<EcmultGenContext>,
    ecmult_gen2: Option<EcmultGen2Context>,
    rangeproof: bool,
}

impl Context {
    /// Builds a context with the tables required by `flags`.
    ///
    /// Range proofs touch signing, verification and commitment
    /// internals, so the `RANGEPROOF` flag pulls in those tables too.
    pub fn new(flags: u32) -> Self {
        let rangeproof = flags & RANGEPROOF != 0;
        let sign = rangeproof || flags & SIGN != 0;
        let verify = rangeproof || flags & VERIFY != 0;
        let commit = rangeproof || flags & COMMIT != 0;

        Context {
            ecmult: verify.then(EcmultContext::new),
            ecmult_gen: sign.then(EcmultGenContext::new),
            ecmult_gen2: commit.then(EcmultGen2Context::new),
            rangeproof,
        }
    }

    /// Whether this context can sign.
    pub fn can_sign(&self) -> bool {
        self.ecmult_gen.is_some()
    }

    /// Whether this context can verify signatures.
    pub fn can_verify(&self) -> bool {
        self.ecmult.is_some()
    }

    /// Whether this context can create commitments.
    pub fn can_commit(&self) -> bool {
        self.ecmult_gen2.is_some()
    }

    /// Whether this context can produce and verify range proofs.
    pub fn can_rangeproof(&self) -> bool {
        self.rangeproof
    }

    /// Re-blinds the signing tables from 32 bytes of caller entropy.
    ///
    /// Chains the previous blinding state, so a bad seed never makes the
    /// protection worse than before the call.
    pub fn randomize(&mut self, seed32: &[u8; 32]) {
        let r#gen = self
            .ecmult_gen
            .as_mut()
            .expect("context not built for signing");
        r#gen.blind(Some(seed32));
    }

    pub(crate) fn ecmult(&self) -> &EcmultContext {
        self.ecmult
            .as_ref()
            .expect("context not built for verification")
    }

    pub(crate) fn ecmult_gen(&self) -> &EcmultGenContext {
        self.ecmult_gen
            .as_ref()
            .expect("context not built for signing")
    }

    pub(crate) fn ecmult_gen2(&self) -> &EcmultGen2Context {
        self.ecmult_gen2
            .as_ref()
            .expect("context not built for commitments")
    }

    pub(crate) fn assert_rangeproof(&self) {
        assert!(self.rangeproof, "context not built for range proofs");
    }
}
