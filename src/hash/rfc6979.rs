//! The RFC 6979 §3.2 HMAC-SHA256 deterministic random bit generator.
//!
//! Beyond ECDSA nonces, this stream is reused wherever the library needs
//! deterministic randomness derived from secret material: context
//! re-blinding and the range-proof random values (which must be exactly
//! reproducible for proof rewinding).

use zeroize::Zeroize;

use super::hmac::HmacSha256;

/// DRBG state: the RFC's `V` and `K`, plus whether the
/// retry update (step h.3) is due before the next output.
pub struct Rfc6979HmacSha256 {
    v: [u8; 32],
    k: [u8; 32],
    retry: bool,
}

impl Rfc6979HmacSha256 {
    /// Seeds the generator from arbitrary-length key material
    /// (RFC 6979 3.2.b–f, with the message folded into the key by the
    /// caller).
    pub fn new(key: &[u8]) -> Self {
        let mut rng = Rfc6979HmacSha256 { v: [0x01; 32], k: [0x00; 32], retry: false };

        let mut hmac = HmacSha256::new(&rng.k);
        hmac.write(&rng.v);
        hmac.write(&[0x00]);
        hmac.write(key);
        rng.k = hmac.finalize();

        let mut hmac = HmacSha256::new(&rng.k);
        hmac.write(&rng.v);
        rng.v = hmac.finalize();

        let mut hmac = HmacSha256::new(&rng.k);
        hmac.write(&rng.v);
        hmac.write(&[0x01]);
        hmac.write(key);
        rng.k = hmac.finalize();

        let mut hmac = HmacSha256::new(&rng.k);
        hmac.write(&rng.v);
        rng.v = hmac.finalize();

        rng
    }

    /// Fills `out` with the next bytes of the stream (RFC 6979 3.2.h).
    pub fn generate(&mut self, out: &mut [u8]) {
        if self.retry {
            let mut hmac = HmacSha256::new(&self.k);
            hmac.write(&self.v);
            hmac.write(&[0x00]);
            self.k = hmac.finalize();

            let mut hmac = HmacSha256::new(&self.k);
            hmac.write(&self.v);
            self.v = hmac.finalize();
        }

        for chunk in out.chunks_mut(32) {
            let mut hmac = HmacSha256::new(&self.k);
            hmac.write(&self.v);
            self.v = hmac.finalize();
            chunk.copy_from_slice(&self.v[..chunk.len()]);
        }

        self.retry = true;
    }

    /// Wipes the generator state.
    pub fn finalize(mut self) {
        self.v.zeroize();
        self.k.zeroize();
        self.retry = false;
    }
}
