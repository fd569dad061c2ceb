//! Fixed-base multiplication by the value generator H.
//!
//! Commitment values are 64-bit integers, so a 16-window comb over
//! 4-bit windows covers the whole range with a much smaller table than
//! the full generator comb. The table layout mirrors [`super::gen`]:
//! entry `(j, i)` holds `U_j + i·16ʲ·H` with offset points `U_j` that
//! sum to zero (correction folded into the final window).
//!
//! Two lookup paths exist: a constant-time cmov scan for commitment
//! creation (the value is a secret there) and a directly indexed
//! variable-time path for tally verification, where the excess value is
//! public.

use crate::field::FieldElement;
use crate::group::{AFFINE_H, Affine, AffineStorage, Jacobian, set_all_gej_var};

const WINDOWS: usize = 16;

/// Precomputed comb table for the alternate generator H.
#[derive(Clone)]
pub struct EcmultGen2Context {
    prec: Box<[[AffineStorage; 16]; WINDOWS]>,
}

impl EcmultGen2Context {
    /// Builds the 16×16 table of `U_j + i·16ʲ·H`.
    pub fn new() -> Self {
        let mut hj = Jacobian::default();
        hj.set_ge(&AFFINE_H);

        // Offset chain with no known discrete log, as in the G comb but
        // anchored to H so the two tables share no structure.
        let mut nums_x = FieldElement::default();
        let ok = nums_x.set_b32(b"The scalar for this x is unknown");
        debug_assert!(ok);
        let mut nums_ge = Affine::default();
        let on_curve = nums_ge.set_xo_var(&nums_x, false);
        debug_assert!(on_curve);
        let mut nums_gej = Jacobian::default();
        nums_gej.set_ge(&nums_ge);
        nums_gej = nums_gej.add_ge_var(&AFFINE_H, None);

        let mut precj = vec![Jacobian::default(); WINDOWS * 16];
        let mut hbase = hj;
        let mut numsbase = nums_gej;
        for j in 0..WINDOWS {
            precj[j * 16] = numsbase;
            for i in 1..16 {
                precj[j * 16 + i] = precj[j * 16 + i - 1].add_var(&hbase, None);
            }
            for _ in 0..4 {
                hbase = hbase.double_var(None);
            }
            numsbase = numsbase.double_var(None);
            if j == WINDOWS - 2 {
                // Final window offset becomes (1 − 2¹⁵)·nums so all
                // offsets cancel.
                numsbase = numsbase.neg();
                numsbase = numsbase.add_var(&nums_gej, None);
            }
        }
        let prec_affine = set_all_gej_var(&precj);

        let mut prec = Box::new([[AffineStorage::default(); 16]; WINDOWS]);
        for j in 0..WINDOWS {
            for i in 0..16 {
                prec[j][i] = prec_affine[j * 16 + i].to_storage();
            }
        }
        EcmultGen2Context { prec }
    }

    /// Computes `value·H` in constant time; for commitment creation
    /// where the value is secret.
    pub fn ecmult_gen2(&self, value: u64) -> Jacobian {
        let mut r = Jacobian::default();
        r.set_infinity();
        self.ecmult_gen2_acc(r, value)
    }

    /// Adds `value·H` onto an accumulator in constant time.
    ///
    /// Folding the accumulation into the window scan keeps commitment
    /// creation on complete additions only; no intermediate point ever
    /// needs a variable-time combine.
    pub fn ecmult_gen2_acc(&self, acc: Jacobian, value: u64) -> Jacobian {
        let mut r = acc;
        let mut adds = AffineStorage::default();
        for j in 0..WINDOWS {
            let bits = (value >> (4 * j)) & 15;
            for (i, entry) in self.prec[j].iter().enumerate() {
                adds.cmov(entry, i as u64 == bits);
            }
            let add = Affine::from_storage(&adds);
            r = r.add_ge(&add);
        }
        r
    }

    /// Computes `value·H` with direct table indexing; for public values
    /// (tally verification).
    pub fn ecmult_gen2_small_var(&self, value: u64) -> Jacobian {
        let mut r = Jacobian::default();
        r.set_infinity();

        // Every window must be added even when its bits are zero: the
        // zero entries carry the offset points that cancel across the
        // full scan.
        for j in 0..WINDOWS {
            let bits = ((value >> (4 * j)) & 15) as usize;
            let add = Affine::from_storage(&self.prec[j][bits]);
            r = r.add_ge_var(&add, None);
        }
        r
    }
}

impl Default for EcmultGen2Context {
    fn default() -> Self {
        Self::new()
    }
}
