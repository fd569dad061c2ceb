//! Constant-time fixed-base multiplication by the generator G.
//!
//! The table stores, for each of 64 four-bit windows `j`, the points
//! `U_j + i·16ʲ·G` for all sixteen window values `i`, where the `U_j`
//! offsets are multiples of a point with unknown discrete log chosen so
//! that `Σ U_j = 0`. A multiplication scans all sixteen entries of every
//! window with conditional moves and accumulates one complete addition
//! per window, so the memory access pattern and the operation sequence
//! are independent of the scalar.
//!
//! To blunt differential power analysis the accumulator never holds the
//! true partial product: the context keeps a random blinding scalar
//! `blind` and the precomputed point `initial = −blind·G` with a
//! randomized projection, and computes `s·G` as
//! `initial + (s + blind)·G`. [`EcmultGenContext::blind`] re-derives
//! both from a caller seed through the RFC 6979 stream, chaining the
//! previous blind.

use zeroize::Zeroize;

use crate::field::FieldElement;
use crate::group::{AFFINE_G, Affine, AffineStorage, Jacobian, set_all_gej_var};
use crate::hash::Rfc6979HmacSha256;
use crate::scalar::Scalar;

/// The x coordinate for the offset point is fixed text rather than a
/// number, so it visibly encodes its own provenance.
const NUMS_SEED: &[u8; 32] = b"The scalar for this x is unknown";

/// Precomputed comb table for G with the current blinding pair.
#[derive(Clone)]
pub struct EcmultGenContext {
    prec: Box<[[AffineStorage; 16]; 64]>,
    blind: Scalar,
    initial: Jacobian,
}

impl EcmultGenContext {
    /// Builds the comb table. The initial blinding pair is the trivial
    /// one (`blind = 1`, `initial = −G`); callers are expected to
    /// re-blind with entropy of their own via [`Self::blind`].
    pub fn new() -> Self {
        let mut gj = Jacobian::default();
        gj.set_ge(&AFFINE_G);

        // Offset point with no known scalar relative to G.
        let mut nums_x = FieldElement::default();
        let ok = nums_x.set_b32(NUMS_SEED);
        debug_assert!(ok);
        let mut nums_ge = Affine::default();
        let on_curve = nums_ge.set_xo_var(&nums_x, false);
        debug_assert!(on_curve);
        let mut nums_gej = Jacobian::default();
        nums_gej.set_ge(&nums_ge);
        // Add G so the table entries have no recognizable structure.
        nums_gej = nums_gej.add_ge_var(&AFFINE_G, None);

        // precj[j·16 + i] = numsbase_j + i·gbase_j, with
        // gbase_j = 16ʲ·G and numsbase_j = 2ʲ·nums, except the last
        // window's offset which is (1 − 2⁶³)·nums so that all offsets
        // cancel.
        let mut precj = vec![Jacobian::default(); 1024];
        let mut gbase = gj;
        let mut numsbase = nums_gej;
        for j in 0..64 {
            precj[j * 16] = numsbase;
            for i in 1..16 {
                precj[j * 16 + i] = precj[j * 16 + i - 1].add_var(&gbase, None);
            }
            for _ in 0..4 {
                gbase = gbase.double_var(None);
            }
            numsbase = numsbase.double_var(None);
            if j == 62 {
                numsbase = numsbase.neg();
                numsbase = numsbase.add_var(&nums_gej, None);
            }
        }
        let prec_affine = set_all_gej_var(&precj);

        let mut prec = Box::new([[AffineStorage::default(); 16]; 64]);
        for j in 0..64 {
            for i in 0..16 {
                prec[j][i] = prec_affine[j * 16 + i].to_storage();
            }
        }

        let mut ctx = EcmultGenContext {
            prec,
            blind: Scalar::ONE,
            initial: Jacobian::default(),
        };
        ctx.blind(None);
        ctx
    }

    /// Computes `gn·G` in constant time.
    pub fn ecmult_gen(&self, gn: &Scalar) -> Jacobian {
        let mut r = self.initial;
        let mut gnb = gn.add(&self.blind);

        let mut adds = AffineStorage::default();
        for j in 0..64 {
            let bits = gnb.bits(j * 4, 4);
            for (i, entry) in self.prec[j].iter().enumerate() {
                adds.cmov(entry, i as u32 == bits);
            }
            let add = Affine::from_storage(&adds);
            r = r.add_ge(&add);
        }

        gnb.zeroize();
        r
    }

    /// Installs a fresh blinding pair.
    ///
    /// `None` resets to the trivial pair; a seed mixes the previous
    /// blind and the caller entropy through the RFC 6979 stream, so even
    /// an adversarial seed never weakens the blinding below its prior
    /// state. Retries keep the outputs uniform.
    pub fn blind(&mut self, seed32: Option<&[u8; 32]>) {
        if seed32.is_none() {
            let mut initial = Jacobian::default();
            initial.set_ge(&AFFINE_G);
            self.initial = initial.neg();
            self.blind = Scalar::ONE;
        }

        let mut keydata = [0u8; 64];
        keydata[..32].copy_from_slice(&self.blind.b32());
        let keylen = match seed32 {
            Some(seed) => {
                keydata[32..].copy_from_slice(seed);
                64
            }
            None => 32,
        };
        let mut rng = Rfc6979HmacSha256::new(&keydata[..keylen]);
        keydata.zeroize();

        let mut nonce32 = [0u8; 32];

        // Randomize the projection against multiplier side channels.
        let mut s = FieldElement::default();
        loop {
            rng.generate(&mut nonce32);
            if s.set_b32(&nonce32) && !s.normalizes_to_zero() {
                break;
            }
        }
        self.initial.rescale(&s);
        s.zeroize();

        let mut b = Scalar::ZERO;
        loop {
            rng.generate(&mut nonce32);
            let overflow = b.set_b32(&nonce32);
            if !overflow && !b.is_zero() {
                break;
            }
        }
        rng.finalize();
        nonce32.zeroize();

        let gb = self.ecmult_gen(&b);
        self.blind = b.neg();
        self.initial = gb;
        b.zeroize();
    }
}

impl Default for EcmultGenContext {
    fn default() -> Self {
        Self::new()
    }
}
