//! Gzip policy seam.
//!
//! The actual DEFLATE/CRC32/GZIP-framing work is an external collaborator
//! per spec.md §1 ("cryptography (AES/HMAC/GZIP/CRC32)" is explicitly out
//! of scope) — this module only owns the *policy*: the named
//! minimum-compression-ratio constant and the decision function, so the
//! threshold lives in one place instead of being hard-coded at every call
//! site (spec.md §9 design note).

/// A compressed body is only worth sending when it shrinks the payload by
/// at least this fraction, per spec.md §6.
pub const MIN_COMPRESSION_RATIO: f32 = 0.10;

/// Whether a compressed candidate is worth using over the raw body.
pub fn should_compress(original_len: usize, compressed_len: usize) -> bool {
    if original_len == 0 {
        return false;
    }
    let saved = original_len.saturating_sub(compressed_len) as f32;
    saved / (original_len as f32) >= MIN_COMPRESSION_RATIO
}

/// Contract a host-supplied compressor must satisfy to back `POST+gzip`
/// publishes. The engine never implements GZIP itself (see module docs).
pub trait Compressor {
    fn compress(&self, input: &[u8], out: &mut alloc::vec::Vec<u8>) -> Result<(), crate::error::PubNubError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_at_least_ten_percent_savings() {
        assert!(!should_compress(100, 95));
        assert!(should_compress(100, 89));
    }

    #[test]
    fn empty_body_never_worth_compressing() {
        assert!(!should_compress(0, 0));
    }
}
