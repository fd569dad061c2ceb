//! HMAC-SHA256 (RFC 2104 with SHA-256).

use zeroize::Zeroize;

use super::sha256::{Sha256, sha256};

/// Incremental HMAC-SHA256 computation.
pub struct HmacSha256 {
    inner: Sha256,
    outer: Sha256,
}

impl HmacSha256 {
    /// Keys the MAC. Keys longer than the 64-byte block size are hashed
    /// down first, per RFC 2104.
    pub fn new(key: &[u8]) -> Self {
        let mut rkey = [0u8; 64];
        if key.len() <= 64 {
            rkey[..key.len()].copy_from_slice(key);
        } else {
            rkey[..32].copy_from_slice(&sha256(key));
        }

        let mut outer = Sha256::new();
        for b in rkey.iter_mut() {
            *b ^= 0x5c;
        }
        outer.write(&rkey);

        let mut inner = Sha256::new();
        for b in rkey.iter_mut() {
            *b ^= 0x5c ^ 0x36;
        }
        inner.write(&rkey);

        rkey.zeroize();
        HmacSha256 { inner, outer }
    }

    /// Absorbs message bytes.
    pub fn write(&mut self, data: &[u8]) {
        self.inner.write(data);
    }

    /// Returns the authentication tag.
    pub fn finalize(mut self) -> [u8; 32] {
        let temp = self.inner.finalize();
        self.outer.write(&temp);
        self.outer.finalize()
    }
}
